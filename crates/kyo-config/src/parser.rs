//! Markdown parser guards.

use serde::{Deserialize, Serialize};

/// Default maximum container nesting (lists inside blockquotes inside ...).
const fn default_max_nesting_depth() -> u32 {
    64
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Nesting depth past which a document is rejected with a parse error.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}
