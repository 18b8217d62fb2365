use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::IdentityMode;

/// One executable code fragment extracted from a document.
///
/// Immutable once created. Execution results are not part of this type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub document_id: String,
    /// Explicit `name=` directive, or `{language}-{order_index}`.
    pub name: String,
    /// Canonical language tag (`python`, `bash`, ...).
    pub language: String,
    pub code: String,
    pub start_line: u32,
    pub end_line: u32,
    /// 0-based position among qualifying blocks of the owning document.
    pub order_index: u32,
    pub executable: bool,
    pub timeout_seconds: u32,
    /// Resolved identity mode (`document` or `cell`, never `auto`).
    pub identity: IdentityMode,
    /// Unrecognized `key=value` directives from the fence info string.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}
