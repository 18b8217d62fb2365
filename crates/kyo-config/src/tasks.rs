//! Task extraction configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Timeout for languages missing from both the built-in table and overrides.
const fn default_timeout_secs() -> u32 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskConfig {
    /// Fallback timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u32,

    /// Per-language overrides keyed by canonical language (`rust = 600`).
    #[serde(default)]
    pub timeouts: BTreeMap<String, u32>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout_secs(),
            timeouts: BTreeMap::new(),
        }
    }
}
