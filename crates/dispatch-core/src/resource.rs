use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::Endpoint;

// ---------------------------------------------------------------------------
// ResourceRecord
// ---------------------------------------------------------------------------

/// The `{id, code, description}` shape every listing endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: i64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// ResourceKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Site,
    Area,
    Line,
    Machine,
    DispatchType,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Site,
            ResourceKind::Area,
            ResourceKind::Line,
            ResourceKind::Machine,
            ResourceKind::DispatchType,
        ]
    }

    /// Listing endpoint, relative to the API root.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Site => "sites/",
            ResourceKind::Area => "areas/",
            ResourceKind::Line => "lines/",
            ResourceKind::Machine => "machines/",
            ResourceKind::DispatchType => "dispatchtypes/",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Site => "site",
            ResourceKind::Area => "area",
            ResourceKind::Line => "line",
            ResourceKind::Machine => "machine",
            ResourceKind::DispatchType => "dispatch type",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DispatchHandle
// ---------------------------------------------------------------------------

/// Returned by `dispatches/open/`. Deliberately neither `Clone` nor `Copy`:
/// closing a dispatch consumes its handle.
#[derive(Debug, PartialEq, Eq, Deserialize)]
pub struct DispatchHandle {
    pub id: i64,
}

impl DispatchHandle {
    /// Close action for this dispatch.
    pub fn close_endpoint(&self) -> Endpoint<'static> {
        Endpoint::with_segment("dispatches/close/", self.id.to_string())
    }
}
