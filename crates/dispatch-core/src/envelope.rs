//! Uniform `{success, error, data}` response envelope and its validation.
//!
//! Every call result passes through [`validate`]: transport failure, non-2xx
//! status, undecodable body and `success: false` each map to their own
//! `DispatchError` variant before any payload is handed back.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{DispatchError, Result};
use crate::resource::ResourceRecord;
use crate::transport::RawResponse;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

/// Check transport outcome, status and envelope, then decode `data` as `T`.
///
/// `data` is held as raw JSON until `success` has been checked, so a
/// rejected request keeps its server message whatever shape `data` has.
pub fn validate<T: DeserializeOwned>(response: Result<RawResponse>) -> Result<Option<T>> {
    let response = response?;
    if !response.is_success() {
        return Err(DispatchError::HttpStatus {
            status: response.status,
        });
    }

    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&response.body)?;
    if !envelope.success {
        return Err(DispatchError::Api {
            message: envelope
                .error
                .unwrap_or_else(|| "request rejected without an error message".to_string()),
        });
    }
    match envelope.data {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
    }
}

pub fn expect_list(response: Result<RawResponse>) -> Result<Vec<ResourceRecord>> {
    Ok(validate::<Vec<ResourceRecord>>(response)?.unwrap_or_default())
}

pub fn expect_object<T: DeserializeOwned>(response: Result<RawResponse>) -> Result<T> {
    validate::<T>(response)?.ok_or(DispatchError::MissingData { expected: "object" })
}

pub fn expect_any(response: Result<RawResponse>) -> Result<serde_json::Value> {
    Ok(validate::<serde_json::Value>(response)?.unwrap_or(serde_json::Value::Null))
}
