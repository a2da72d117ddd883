use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

use crate::envelope;
use crate::error::Result;
use crate::resource::ResourceRecord;
use crate::session::{Endpoint, Session};
use crate::transport::{RawResponse, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// Session plus transport. Each method issues exactly one request and runs
/// the result through the envelope validator.
pub struct ApiClient {
    session: Session,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    pub fn new(session: Session, transport: Box<dyn Transport>) -> Self {
        ApiClient { session, transport }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn list(&self, path: &str, filters: &[(&str, &str)]) -> Result<Vec<ResourceRecord>> {
        envelope::expect_list(self.send(Method::Get, path.into(), filters))
    }

    pub fn get_any<'p>(
        &self,
        endpoint: impl Into<Endpoint<'p>>,
        pairs: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        envelope::expect_any(self.send(Method::Get, endpoint.into(), pairs))
    }

    pub fn post_any<'p>(
        &self,
        endpoint: impl Into<Endpoint<'p>>,
        pairs: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        envelope::expect_any(self.send(Method::Post, endpoint.into(), pairs))
    }

    pub fn post_object<'p, T: DeserializeOwned>(
        &self,
        endpoint: impl Into<Endpoint<'p>>,
        pairs: &[(&str, &str)],
    ) -> Result<T> {
        envelope::expect_object(self.send(Method::Post, endpoint.into(), pairs))
    }

    fn send(
        &self,
        method: Method,
        endpoint: Endpoint<'_>,
        pairs: &[(&str, &str)],
    ) -> Result<RawResponse> {
        let url = self.session.endpoint(endpoint)?;
        let params = self.session.params(pairs.iter().copied());
        debug!(%method, %url, ?params, "request");

        let response = match method {
            Method::Get => self.transport.get(&url, &params),
            Method::Post => self.transport.post(&url, &params),
        };
        if let Ok(r) = &response {
            debug!(status = r.status, body = %r.body, "response");
        }
        response
    }
}
