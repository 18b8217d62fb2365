//! Gitignore-style exclusion for project traversal.
//!
//! Rules come from four layers. When more than one layer matches a path the
//! later layer wins, and inside a layer the last matching pattern wins, so a
//! `!` pattern re-includes a path an earlier rule excluded:
//!
//! 1. built-in defaults (VCS metadata and the kyo state directory)
//! 2. `.gitignore` files, the root one first and then one per directory
//!    as the walk descends (deeper files override shallower ones)
//! 3. the repository exclude file (`<git_dir>/info/exclude`), anchored at
//!    the repository work tree rather than the project root
//! 4. caller-supplied patterns
//!
//! Every layer is matched against absolute paths so that each file's
//! patterns stay relative to the directory that file belongs to.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::WalkError;
use crate::repo::discover_repo_context;

/// Directories never worth walking.
pub const BUILTIN_PATTERNS: &[&str] = &[".git/", ".hg/", ".svn/", ".jj/", ".kyo/"];

const GITIGNORE: &str = ".gitignore";

/// Which ignore sources to consult.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSources {
    /// Disable `.gitignore` files and repository excludes entirely.
    pub skip_gitignore: bool,
    /// Consult `<git_dir>/info/exclude` when the root is inside a repository.
    pub use_repository_exclude: bool,
    /// Extra patterns, applied last.
    pub patterns: Vec<String>,
}

/// Compiled ignore rules for one project root.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    root: PathBuf,
    builtin: Gitignore,
    root_gitignore: Option<Gitignore>,
    exclude: Option<Gitignore>,
    explicit: Gitignore,
    read_nested: bool,
    files: Vec<PathBuf>,
}

/// `.gitignore` rules of the directories enclosing the current walk
/// position, keyed by walk depth.
#[derive(Debug, Default)]
pub struct NestedRules {
    frames: Vec<(usize, Gitignore)>,
}

impl NestedRules {
    /// Drop rules of directories at `depth` or deeper; they no longer
    /// enclose an entry found at `depth`.
    pub fn leave_to(&mut self, depth: usize) {
        while self.frames.last().is_some_and(|(d, _)| *d >= depth) {
            self.frames.pop();
        }
    }

    pub fn push(&mut self, depth: usize, rules: Gitignore) {
        self.frames.push((depth, rules));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn deepest_first(&self) -> impl Iterator<Item = &Gitignore> {
        self.frames.iter().rev().map(|(_, rules)| rules)
    }
}

impl IgnoreMatcher {
    /// Check caller patterns without building a matcher.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::IgnorePattern`] for the first malformed pattern.
    pub fn validate_patterns(patterns: &[String]) -> Result<(), WalkError> {
        let mut scratch = GitignoreBuilder::new("");
        for pattern in patterns {
            add_pattern(&mut scratch, pattern)?;
        }
        Ok(())
    }

    /// Compile every enabled source for `root`.
    ///
    /// Nested `.gitignore` files are not read here; see
    /// [`IgnoreMatcher::dir_rules`]. Malformed lines inside ignore files are
    /// logged and skipped. Malformed caller patterns are an error.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::IgnorePattern`] for a malformed caller pattern.
    pub fn build(root: &Path, sources: &IgnoreSources) -> Result<Self, WalkError> {
        let mut files = Vec::new();

        let mut builtin = GitignoreBuilder::new(root);
        for pattern in BUILTIN_PATTERNS {
            add_pattern(&mut builtin, pattern)?;
        }
        let builtin = finish(builtin)?;

        let mut root_gitignore = None;
        let mut exclude = None;
        if !sources.skip_gitignore {
            root_gitignore = load_gitignore(root);
            if root_gitignore.is_some() {
                files.push(root.join(GITIGNORE));
            }
            if sources.use_repository_exclude {
                if let Some((rules, file)) = load_exclude(root) {
                    exclude = Some(rules);
                    files.push(file);
                }
            }
        }

        let mut explicit = GitignoreBuilder::new(root);
        for pattern in &sources.patterns {
            add_pattern(&mut explicit, pattern)?;
        }
        let explicit = finish(explicit)?;

        tracing::debug!(
            root = %root.display(),
            patterns = explicit.num_ignores() + explicit.num_whitelists(),
            files = files.len(),
            "compiled ignore rules"
        );
        Ok(Self {
            root: root.to_path_buf(),
            builtin,
            root_gitignore,
            exclude,
            explicit,
            read_nested: !sources.skip_gitignore,
            files,
        })
    }

    /// Ignore files read at build time, in precedence order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Rules from the `.gitignore` inside `relative_dir`, if it has one and
    /// gitignore files are enabled. The root's own file is compiled by
    /// [`IgnoreMatcher::build`].
    #[must_use]
    pub fn dir_rules(&self, relative_dir: &Path) -> Option<Gitignore> {
        if !self.read_nested || relative_dir.as_os_str().is_empty() {
            return None;
        }
        load_gitignore(&self.root.join(relative_dir))
    }

    /// Whether `relative` (project-relative) is excluded.
    ///
    /// A path is excluded when it matches directly or when any parent
    /// directory is excluded; a negation cannot re-include a file whose
    /// parent directory is ignored. `.gitignore` files of the parent
    /// directories are read on the way down.
    #[must_use]
    pub fn matches(&self, relative: &Path, is_dir: bool) -> bool {
        let mut ancestors: Vec<&Path> = relative
            .ancestors()
            .skip(1)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        ancestors.reverse();

        let mut nested = NestedRules::default();
        for (depth, dir) in ancestors.into_iter().enumerate() {
            if self.matches_entry(dir, true, &nested) {
                return true;
            }
            if let Some(rules) = self.dir_rules(dir) {
                nested.push(depth + 1, rules);
            }
        }
        self.matches_entry(relative, is_dir, &nested)
    }

    /// Match only the entry itself, assuming its parents were already
    /// checked. Used during a pruning traversal, which keeps `nested`
    /// current.
    #[must_use]
    pub fn matches_entry(&self, relative: &Path, is_dir: bool, nested: &NestedRules) -> bool {
        let path = self.root.join(relative);
        let layers = [Some(&self.explicit), self.exclude.as_ref()]
            .into_iter()
            .flatten()
            .chain(nested.deepest_first())
            .chain(self.root_gitignore.as_ref())
            .chain(std::iter::once(&self.builtin));
        for rules in layers {
            let matched = rules.matched(&path, is_dir);
            if !matched.is_none() {
                return matched.is_ignore();
            }
        }
        false
    }
}

/// Compile `dir/.gitignore` if it exists and carries any rule.
fn load_gitignore(dir: &Path) -> Option<Gitignore> {
    let file = dir.join(GITIGNORE);
    let mut builder = GitignoreBuilder::new(dir);
    if !add_file(&mut builder, &file) {
        return None;
    }
    let rules = build_file_rules(builder, &file)?;
    tracing::trace!(file = %file.display(), "read ignore file");
    Some(rules)
}

/// Compile the enclosing repository's exclude file, anchored at its work
/// tree.
fn load_exclude(root: &Path) -> Option<(Gitignore, PathBuf)> {
    let repo = discover_repo_context(root)?;
    let work_dir = std::fs::canonicalize(&repo.work_dir).unwrap_or_else(|_| repo.work_dir.clone());
    if !root.starts_with(&work_dir) {
        tracing::debug!(
            root = %root.display(),
            work_dir = %work_dir.display(),
            "project root is outside the repository work tree"
        );
        return None;
    }
    let file = repo.exclude_file();
    let mut builder = GitignoreBuilder::new(&work_dir);
    if !add_file(&mut builder, &file) {
        return None;
    }
    let rules = build_file_rules(builder, &file)?;
    Some((rules, file))
}

fn build_file_rules(builder: GitignoreBuilder, file: &Path) -> Option<Gitignore> {
    match builder.build() {
        Ok(rules) if rules.is_empty() => None,
        Ok(rules) => Some(rules),
        Err(error) => {
            tracing::warn!(file = %file.display(), %error, "skipping unreadable ignore file");
            None
        }
    }
}

fn finish(builder: GitignoreBuilder) -> Result<Gitignore, WalkError> {
    builder.build().map_err(|e| WalkError::IgnorePattern {
        pattern: String::new(),
        reason: e.to_string(),
    })
}

fn add_pattern(builder: &mut GitignoreBuilder, pattern: &str) -> Result<(), WalkError> {
    builder
        .add_line(None, pattern)
        .map(|_| ())
        .map_err(|e| pattern_error(pattern, &e))
}

fn pattern_error(pattern: &str, error: &ignore::Error) -> WalkError {
    WalkError::IgnorePattern {
        pattern: pattern.to_string(),
        reason: error.to_string(),
    }
}

/// Add an ignore file if present. Returns whether it was read.
fn add_file(builder: &mut GitignoreBuilder, path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    if let Some(error) = builder.add(path) {
        tracing::warn!(file = %path.display(), %error, "skipping malformed ignore lines");
    }
    true
}
