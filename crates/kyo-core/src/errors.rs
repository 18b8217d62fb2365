//! Cross-cutting error types for kyo.
//!
//! Domain-specific errors (`PathError`, `ParseError`, `LoadError`) live in
//! their respective crates. Each of them maps onto an [`ErrorKind`] so the
//! loader can report failures uniformly in `error` events.

use thiserror::Error;

use crate::enums::ErrorKind;

/// Errors that can be raised by any kyo crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Implemented by every error that can surface in an `error` load event.
pub trait Classify {
    /// The taxonomy bucket this error belongs to.
    fn kind(&self) -> ErrorKind;
}
