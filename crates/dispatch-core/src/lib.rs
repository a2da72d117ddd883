//! `dispatch-core` — client-side orchestration against the Dispatch
//! manufacturing-operations API.
//!
//! # Architecture
//!
//! ```text
//! Workflow        ← twelve ordered steps folded over a RunReport
//!     │
//!     ▼
//! Resolver        ← site/line/machine/type lookups, paged area scan
//!     │
//!     ▼
//! ApiClient       ← Session::params (auth + site) → Transport → envelope
//!     │
//!     ▼
//! Transport       ← HttpTransport (reqwest, blocking) or a test double
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod resolver;
pub mod resource;
pub mod session;
pub mod time;
pub mod transport;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, Method};
pub use config::Config;
pub use error::{DispatchError, Result};
pub use resolver::Resolver;
pub use resource::{DispatchHandle, ResourceKind, ResourceRecord};
pub use session::{Credential, Endpoint, Params, Session};
pub use time::{Clock, LocalClock, OffsetClock, Precision, TimeWindow};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use workflow::{RunReport, StepReport, Workflow, WorkflowOptions};
