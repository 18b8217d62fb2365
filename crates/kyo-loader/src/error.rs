//! Loader error types.
//!
//! Only failures detected before the first event is emitted surface as a
//! [`LoadError`]. Everything after that is recorded as an `error` event and
//! reflected in the project status.

use std::path::PathBuf;

use kyo_core::enums::ErrorKind;
use kyo_core::errors::Classify;
use kyo_walk::WalkError;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid ignore pattern '{pattern}': {reason}")]
    IgnorePattern { pattern: String, reason: String },

    #[error("invalid load request: {0}")]
    InvalidRequest(String),

    #[error("trail '{path}': {reason}")]
    Trail { path: PathBuf, reason: String },

    #[error("event sequence broken: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("load worker failed: {0}")]
    Worker(String),
}

impl From<WalkError> for LoadError {
    fn from(error: WalkError) -> Self {
        match error {
            WalkError::IgnorePattern { pattern, reason } => Self::IgnorePattern { pattern, reason },
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

impl Classify for LoadError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::IgnorePattern { .. } => ErrorKind::IgnorePattern,
            Self::InvalidRequest(_) | Self::SequenceGap { .. } => ErrorKind::Parse,
            Self::Trail { .. } | Self::Worker(_) => ErrorKind::Io,
        }
    }
}

/// Why one document ended in `error`.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DocumentFailure {
    #[error(transparent)]
    Path(#[from] kyo_walk::PathError),

    #[error(transparent)]
    Parse(#[from] kyo_parser::ParseError),
}

impl Classify for DocumentFailure {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Path(inner) => inner.kind(),
            Self::Parse(inner) => inner.kind(),
        }
    }
}
