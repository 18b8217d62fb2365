//! Defaults for project loads.

use std::path::PathBuf;

use kyo_core::enums::IdentityMode;
use serde::{Deserialize, Serialize};

/// Hard cap on document size: 50 MB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

const fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

const fn default_true() -> bool {
    true
}

fn default_markdown_globs() -> Vec<String> {
    vec!["*.md".into(), "*.markdown".into(), "*.mdx".into()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoadConfig {
    /// Do not read `.gitignore` from the project root.
    #[serde(default)]
    pub skip_gitignore: bool,

    /// Read `info/exclude` of the repository enclosing the project.
    #[serde(default = "default_true")]
    pub use_repository_exclude: bool,

    /// Default identity mode for task IDs.
    #[serde(default)]
    pub identity: IdentityMode,

    /// Extra gitignore-style patterns applied after all other sources.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Documents larger than this are rejected with a size-limit error.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// File-name globs that mark a file as a markdown candidate.
    #[serde(default = "default_markdown_globs")]
    pub markdown_globs: Vec<String>,

    /// Descend into symlinked directories that resolve inside the root.
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,

    /// Boundary every project root must stay inside. Unset means only the
    /// system denylist applies to roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_gitignore: false,
            use_repository_exclude: default_true(),
            identity: IdentityMode::Auto,
            ignore_patterns: Vec::new(),
            max_file_bytes: default_max_file_bytes(),
            markdown_globs: default_markdown_globs(),
            follow_symlinks: default_true(),
            base_dir: None,
        }
    }
}
