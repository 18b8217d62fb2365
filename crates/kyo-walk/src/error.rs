//! Walk and path validation error types.

use std::path::PathBuf;

use kyo_core::enums::ErrorKind;
use kyo_core::errors::Classify;

/// A path rejected by the [`PathValidator`](crate::PathValidator).
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("path '{path}' escapes project root '{root}'")]
    Escape { path: PathBuf, root: PathBuf },

    #[error("path '{path}' resolves to '{target}' outside project root")]
    SymlinkEscape { path: PathBuf, target: PathBuf },

    #[error("path '{0}' is inside a protected system directory")]
    Denylisted(PathBuf),

    #[error("symlink loop detected at '{0}'")]
    SymlinkLoop(PathBuf),

    #[error("file '{path}' is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("path '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PathError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

impl Classify for PathError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Escape { .. } | Self::SymlinkEscape { .. } | Self::Denylisted(_) | Self::SymlinkLoop(_) => {
                ErrorKind::PathSecurity
            }
            Self::TooLarge { .. } => ErrorKind::SizeLimit,
            Self::NotFound(_) | Self::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Errors from building matchers or walking a tree.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("invalid ignore pattern '{pattern}': {reason}")]
    IgnorePattern { pattern: String, reason: String },

    #[error("invalid markdown glob '{pattern}': {reason}")]
    MarkdownGlob { pattern: String, reason: String },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("cannot read '{path}': {reason}")]
    Traversal { path: PathBuf, reason: String },
}

impl Classify for WalkError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::IgnorePattern { .. } | Self::MarkdownGlob { .. } => ErrorKind::IgnorePattern,
            Self::Path(inner) => inner.kind(),
            Self::Traversal { .. } => ErrorKind::Io,
        }
    }
}
