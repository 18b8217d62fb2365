use std::path::{Path, PathBuf};

use kyo_config::LoadConfig;
use kyo_core::entities::LoadOptions;
use kyo_core::enums::{IdentityMode, KindHint};

/// Inputs of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub root_path: PathBuf,
    pub kind_hint: KindHint,
    pub skip_gitignore: bool,
    pub ignore_file_patterns: Vec<String>,
    pub identity: IdentityMode,
    pub use_repository_exclude: bool,
}

impl LoadRequest {
    /// A request with the documented defaults.
    #[must_use]
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            kind_hint: KindHint::Auto,
            skip_gitignore: false,
            ignore_file_patterns: Vec::new(),
            identity: IdentityMode::Auto,
            use_repository_exclude: true,
        }
    }

    /// A request seeded from the `[load]` config section.
    #[must_use]
    pub fn from_config(root_path: impl Into<PathBuf>, config: &LoadConfig) -> Self {
        Self {
            skip_gitignore: config.skip_gitignore,
            ignore_file_patterns: config.ignore_patterns.clone(),
            identity: config.identity,
            use_repository_exclude: config.use_repository_exclude,
            ..Self::new(root_path)
        }
    }

    #[must_use]
    pub const fn kind(mut self, hint: KindHint) -> Self {
        self.kind_hint = hint;
        self
    }

    #[must_use]
    pub const fn identity(mut self, identity: IdentityMode) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub const fn skip_gitignore(mut self, skip: bool) -> Self {
        self.skip_gitignore = skip;
        self
    }

    #[must_use]
    pub const fn use_repository_exclude(mut self, enabled: bool) -> Self {
        self.use_repository_exclude = enabled;
        self
    }

    /// Append explicit ignore patterns (applied after config patterns).
    #[must_use]
    pub fn ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_file_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Options as recorded on the project.
    #[must_use]
    pub fn options(&self) -> LoadOptions {
        LoadOptions {
            ignore_patterns: self.ignore_file_patterns.clone(),
            skip_gitignore: self.skip_gitignore,
            use_repository_exclude: self.use_repository_exclude,
        }
    }
}
