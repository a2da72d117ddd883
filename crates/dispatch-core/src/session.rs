//! Immutable per-run session context and the authenticated parameter builder.
//!
//! Every request carries `auth=<credential>` and `site=<site id>`. Those two
//! pairs are injected here and nowhere else; callers only supply the
//! endpoint-specific pairs.

use reqwest::Url;
use std::fmt;

use crate::error::{DispatchError, Result};

const API_ROOT: &str = "api/1.0/";

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// API key. `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Credential(key.into())
    }

    /// The raw key. Only the outgoing request should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Session {
    api_root: Url,
    site: String,
    credential: Credential,
}

impl Session {
    /// `server` is either a bare host (`example.com`, HTTPS assumed) or a full
    /// `http(s)://host[:port]` base URL.
    pub fn new(server: &str, site: impl Into<String>, credential: Credential) -> Result<Self> {
        let server = server.trim();
        if server.is_empty() {
            return Err(DispatchError::InvalidUrl("server must not be empty".into()));
        }
        let raw = if server.contains("://") {
            server.to_string()
        } else {
            format!("https://{server}")
        };
        let mut base =
            Url::parse(&raw).map_err(|e| DispatchError::InvalidUrl(format!("{raw}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let api_root = base
            .join(API_ROOT)
            .map_err(|e| DispatchError::InvalidUrl(format!("{raw}: {e}")))?;

        Ok(Session {
            api_root,
            site: site.into(),
            credential,
        })
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    /// Absolute URL for an endpoint such as `areas/`, or a fixed path plus one
    /// caller-supplied segment like `users/clock_in/` + `alice`.
    pub fn endpoint<'p>(&self, endpoint: impl Into<Endpoint<'p>>) -> Result<Url> {
        let endpoint = endpoint.into();
        let mut url = self
            .api_root
            .join(endpoint.path.trim_start_matches('/'))
            .map_err(|e| DispatchError::InvalidUrl(format!("{}: {e}", endpoint.path)))?;

        if let Some(segment) = &endpoint.segment {
            if matches!(segment.as_str(), "" | "." | "..") {
                return Err(DispatchError::InvalidUrl(format!(
                    "invalid path segment '{segment}' after {}",
                    endpoint.path
                )));
            }
            let path = endpoint.path;
            url.path_segments_mut()
                .map_err(|_| DispatchError::InvalidUrl(format!("{path}: cannot take path segments")))?
                .pop_if_empty()
                .push(segment)
                .push("");
        }
        Ok(url)
    }

    /// Build the full parameter set for one call: `auth` and `site` first,
    /// then the caller's pairs in the order given.
    pub fn params<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> Params
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut out = vec![
            ("auth".to_string(), self.credential.expose().to_string()),
            ("site".to_string(), self.site.clone()),
        ];
        out.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        Params(out)
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Path relative to the API root, optionally followed by one value that is
/// percent-encoded as exactly one path segment (`#`, `?` and `/` included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint<'p> {
    path: &'p str,
    segment: Option<String>,
}

impl<'p> Endpoint<'p> {
    pub fn with_segment(path: &'p str, segment: impl Into<String>) -> Self {
        Endpoint {
            path,
            segment: Some(segment.into()),
        }
    }
}

impl<'p> From<&'p str> for Endpoint<'p> {
    fn from(path: &'p str) -> Self {
        Endpoint {
            path,
            segment: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Ordered key/value pairs sent as a query string (GET) or a
/// form-url-encoded body (POST).
#[derive(Clone, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.0 {
            if k == "auth" {
                map.entry(k, &"***");
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}
