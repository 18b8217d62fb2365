//! Status enums, kinds, identity modes, and event types for kyo.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` so the
//! loader can refuse invalid transitions instead of silently overwriting state.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// ProjectKind / KindHint
// ---------------------------------------------------------------------------

/// What the project root points at once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Directory,
    File,
}

impl ProjectKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied hint for root classification. `Auto` asks the filesystem.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum KindHint {
    #[default]
    Auto,
    Directory,
    File,
}

impl KindHint {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Directory => "directory",
            Self::File => "file",
        }
    }
}

impl fmt::Display for KindHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KindHint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "directory" | "dir" => Ok(Self::Directory),
            "file" => Ok(Self::File),
            other => Err(CoreError::Validation(format!(
                "unknown kind '{other}' (expected auto, directory or file)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Status of a project through a single load.
///
/// ```text
/// loading → loaded
///         → error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Loading,
    Loaded,
    Error,
}

impl ProjectStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Loading => &[Self::Loaded, Self::Error],
            Self::Loaded | Self::Error => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether the project has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded | Self::Error)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DocumentStatus
// ---------------------------------------------------------------------------

/// Status of a single document.
///
/// ```text
/// pending → parsing → parsed
///                   → error
/// pending → error            (rejected before parsing, e.g. size limit)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Parsing,
    Parsed,
    Error,
}

impl DocumentStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Parsing, Self::Error],
            Self::Parsing => &[Self::Parsed, Self::Error],
            Self::Parsed | Self::Error => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Parsing => "parsing",
            Self::Parsed => "parsed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IdentityMode
// ---------------------------------------------------------------------------

/// Granularity of stable identifier assignment for tasks.
///
/// `Auto` is resolved per document: more than one qualifying code block
/// selects `Cell`, otherwise `Document`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    #[default]
    Auto,
    Document,
    Cell,
}

impl IdentityMode {
    /// Resolve `Auto` against the number of qualifying blocks in a document.
    #[must_use]
    pub const fn resolve(self, qualifying_blocks: usize) -> Self {
        match self {
            Self::Auto if qualifying_blocks > 1 => Self::Cell,
            Self::Auto => Self::Document,
            other => other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Document => "document",
            Self::Cell => "cell",
        }
    }
}

impl fmt::Display for IdentityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "document" => Ok(Self::Document),
            "cell" => Ok(Self::Cell),
            other => Err(CoreError::Validation(format!(
                "unknown identity mode '{other}' (expected auto, document or cell)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// LoadEventType
// ---------------------------------------------------------------------------

/// Closed set of load event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoadEventType {
    StartedWalk,
    FoundDir,
    FoundFile,
    FinishedWalk,
    StartedParsingDoc,
    FinishedParsingDoc,
    FoundTask,
    Error,
}

impl LoadEventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartedWalk => "started_walk",
            Self::FoundDir => "found_dir",
            Self::FoundFile => "found_file",
            Self::FinishedWalk => "finished_walk",
            Self::StartedParsingDoc => "started_parsing_doc",
            Self::FinishedParsingDoc => "finished_parsing_doc",
            Self::FoundTask => "found_task",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LoadEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Classification of failures reported through `error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Traversal escape, denylisted location, or symlink leaving the root.
    PathSecurity,
    /// Document larger than the configured cap.
    SizeLimit,
    /// Document bytes are not valid UTF-8.
    Encoding,
    /// Structural parse failure (nesting guard, size guard).
    Parse,
    /// Malformed caller-supplied ignore pattern.
    IgnorePattern,
    /// Filesystem failure not covered above (missing root, unreadable dir).
    Io,
    /// The load was cancelled cooperatively.
    Cancelled,
}

impl ErrorKind {
    /// Whether this error stays confined to one document.
    #[must_use]
    pub const fn is_document_local(self) -> bool {
        matches!(self, Self::SizeLimit | Self::Encoding | Self::Parse)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PathSecurity => "path_security",
            Self::SizeLimit => "size_limit",
            Self::Encoding => "encoding",
            Self::Parse => "parse",
            Self::IgnorePattern => "ignore_pattern",
            Self::Io => "io",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
