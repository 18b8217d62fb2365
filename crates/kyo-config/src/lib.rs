//! # kyo-config
//!
//! Layered configuration loading for kyo using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`KYO_*` prefix, `__` as separator)
//! 2. Project-level `.kyo/config.toml`
//! 3. User-level `~/.config/kyo/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `KYO_LOAD__SKIP_GITIGNORE` -> `load.skip_gitignore`,
//! `KYO_TASKS__TIMEOUTS__RUST` -> `tasks.timeouts.rust`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use kyo_config::KyoConfig;
//!
//! let config = KyoConfig::load_with_dotenv().expect("config");
//! println!("size cap: {} bytes", config.load.max_file_bytes);
//! ```

mod error;
mod load;
mod parser;
mod tasks;

pub use error::ConfigError;
pub use load::{DEFAULT_MAX_FILE_BYTES, LoadConfig};
pub use parser::ParserConfig;
pub use tasks::TaskConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KyoConfig {
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub tasks: TaskConfig,
}

impl KyoConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`. Use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a source fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".kyo/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("KYO_").split("__"))
    }

    /// Reject values that would make every load fail.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load.max_file_bytes == 0 {
            return Err(invalid("load.max_file_bytes", "must be greater than zero"));
        }
        if self.load.max_file_bytes > DEFAULT_MAX_FILE_BYTES {
            return Err(invalid(
                "load.max_file_bytes",
                &format!("must not exceed the {DEFAULT_MAX_FILE_BYTES}-byte hard cap"),
            ));
        }
        if self.load.markdown_globs.is_empty() {
            return Err(invalid(
                "load.markdown_globs",
                "at least one glob is required",
            ));
        }
        if self.parser.max_nesting_depth == 0 {
            return Err(invalid(
                "parser.max_nesting_depth",
                "must be greater than zero",
            ));
        }
        if self.tasks.default_timeout_secs == 0 {
            return Err(invalid(
                "tasks.default_timeout_secs",
                "must be greater than zero",
            ));
        }
        if let Some((language, _)) = self.tasks.timeouts.iter().find(|(_, secs)| **secs == 0) {
            return Err(invalid(
                &format!("tasks.timeouts.{language}"),
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("kyo").join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
