//! Parser error types for kyo-parser.

use kyo_core::enums::ErrorKind;
use kyo_core::errors::Classify;

/// Document-local failures. None of these abort a project load.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid UTF-8 at byte {valid_up_to}")]
    Encoding { valid_up_to: usize },

    #[error("nesting depth {depth} exceeds limit {limit} at line {line}")]
    NestingTooDeep { depth: u32, limit: u32, line: u32 },
}

impl Classify for ParseError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::NestingTooDeep { .. } => ErrorKind::Parse,
        }
    }
}
