use thiserror::Error;

use crate::resource::ResourceKind;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transport error")]
    Transport(#[source] BoxError),

    #[error("unexpected HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("malformed response body")]
    Decode(#[from] serde_json::Error),

    #[error("response envelope has no {expected} payload")]
    MissingData { expected: &'static str },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("{kind} not found: {detail}")]
    ResourceNotFound { kind: ResourceKind, detail: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid time window: start {start} is after end {end}")]
    InvalidTimeWindow { start: String, end: String },

    #[error("step needs the {0} resolved by an earlier step")]
    MissingContext(&'static str),

    #[error("config error: {0}")]
    Config(String),

    #[error("step '{step}' failed")]
    Step {
        step: &'static str,
        #[source]
        source: Box<DispatchError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl DispatchError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        DispatchError::Transport(err.into())
    }

    pub fn not_found(kind: ResourceKind, detail: impl Into<String>) -> Self {
        DispatchError::ResourceNotFound {
            kind,
            detail: detail.into(),
        }
    }

    /// True for both a malformed body and a well-formed envelope whose
    /// payload does not have the expected shape.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            DispatchError::Decode(_) | DispatchError::MissingData { .. }
        )
    }

    /// The innermost error, looking through `Step` wrappers.
    pub fn root(&self) -> &DispatchError {
        match self {
            DispatchError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
