//! Stable identifier helpers.
//!
//! IDs are `{prefix}-{12 hex}` where the hex is a truncated SHA-256 over the
//! inputs that locate the entity. Loading an unchanged tree twice therefore
//! yields identical IDs.

use sha2::{Digest, Sha256};

pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_DOCUMENT: &str = "doc";
pub const PREFIX_CELL: &str = "cel";

/// Number of hex characters kept from the digest.
const HASH_HEX_LEN: usize = 12;

fn short_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        // Separator keeps ("ab", "c") distinct from ("a", "bc").
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .take(HASH_HEX_LEN / 2)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// ID of the project rooted at `root` (canonical path string).
#[must_use]
pub fn project_id(root: &str) -> String {
    format!("{PREFIX_PROJECT}-{}", short_hash(&[root]))
}

/// ID of the document at `relative_path` inside the project rooted at `root`.
#[must_use]
pub fn document_id(root: &str, relative_path: &str) -> String {
    format!("{PREFIX_DOCUMENT}-{}", short_hash(&[root, relative_path]))
}

/// Per-task ID used in `cell` identity mode.
#[must_use]
pub fn cell_id(root: &str, relative_path: &str, order_index: u32, language: &str) -> String {
    let index = order_index.to_string();
    format!(
        "{PREFIX_CELL}-{}",
        short_hash(&[root, relative_path, &index, language])
    )
}

/// Task ID used in `document` identity mode: the document ID plus the ordinal.
#[must_use]
pub fn document_task_id(document_id: &str, order_index: u32) -> String {
    format!("{document_id}#{order_index}")
}

/// Return the prefix of a kyo ID (`"doc"` for `"doc-1a2b3c4d5e6f"`).
#[must_use]
pub fn prefix_of(id: &str) -> Option<&str> {
    let (prefix, rest) = id.split_once('-')?;
    (!prefix.is_empty() && !rest.is_empty()).then_some(prefix)
}
