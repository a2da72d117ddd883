//! The HTTP seam. Everything above this module deals in `RawResponse`
//! values; only `HttpTransport` knows about reqwest.

use reqwest::Url;

use crate::error::{DispatchError, Result};
use crate::session::Params;

/// Status code and undecoded body of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking request/response exchange. Reads put `params` in the query
/// string; writes send them as a form-url-encoded body.
///
/// Connectivity failures must come back as `DispatchError::Transport`; any
/// response that arrives, whatever its status, is an `Ok(RawResponse)`.
pub trait Transport {
    fn get(&self, url: &Url, params: &Params) -> Result<RawResponse>;
    fn post(&self, url: &Url, params: &Params) -> Result<RawResponse>;
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("dispatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DispatchError::transport)?;
        Ok(HttpTransport { client })
    }

    fn finish(resp: reqwest::blocking::Response) -> Result<RawResponse> {
        let status = resp.status().as_u16();
        let body = resp.text().map_err(DispatchError::transport)?;
        Ok(RawResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url, params: &Params) -> Result<RawResponse> {
        let resp = self
            .client
            .get(url.clone())
            .query(params.pairs())
            .send()
            .map_err(DispatchError::transport)?;
        Self::finish(resp)
    }

    fn post(&self, url: &Url, params: &Params) -> Result<RawResponse> {
        let resp = self
            .client
            .post(url.clone())
            .form(params.pairs())
            .send()
            .map_err(DispatchError::transport)?;
        Self::finish(resp)
    }
}
