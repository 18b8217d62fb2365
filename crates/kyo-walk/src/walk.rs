//! Deterministic depth-first traversal of a project root.
//!
//! Entries come out in pre-order with siblings sorted by file name, so two
//! walks of an unchanged tree produce the same sequence. Ignored directories
//! are pruned without being read, and every entry passes the
//! [`PathValidator`] before it is yielded. Each accepted directory's
//! `.gitignore` is picked up on the way down and applies to its subtree.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::{PathError, WalkError};
use crate::ignore_rules::{IgnoreMatcher, NestedRules};
use crate::validate::PathValidator;

/// Traversal knobs.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub follow_symlinks: bool,
    /// File-name globs that mark a file as markdown.
    pub markdown_globs: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            markdown_globs: vec!["*.md".into(), "*.markdown".into(), "*.mdx".into()],
        }
    }
}

/// One accepted filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    Dir {
        path: PathBuf,
        relative: String,
    },
    File {
        path: PathBuf,
        relative: String,
        size_bytes: u64,
        markdown: bool,
    },
}

impl WalkEntry {
    /// Canonical absolute path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Dir { path, .. } | Self::File { path, .. } => path,
        }
    }

    /// Root-relative path with `/` separators.
    #[must_use]
    pub fn relative(&self) -> &str {
        match self {
            Self::Dir { relative, .. } | Self::File { relative, .. } => relative,
        }
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Dir { .. })
    }

    #[must_use]
    pub const fn is_markdown(&self) -> bool {
        matches!(self, Self::File { markdown: true, .. })
    }
}

/// An entry that was found but could not be accepted.
#[derive(Debug)]
pub struct WalkFailure {
    pub relative: String,
    pub error: WalkError,
}

/// Counters accumulated while walking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories: u32,
    pub files: u32,
    pub markdown_files: u32,
    pub ignored: u32,
    pub rejected: u32,
}

/// Builds [`Walk`] iterators for one validated root.
#[derive(Debug)]
pub struct DirectoryWalker {
    validator: PathValidator,
    matcher: IgnoreMatcher,
    markdown: GlobSet,
    follow_symlinks: bool,
}

impl DirectoryWalker {
    /// # Errors
    ///
    /// Returns [`WalkError::MarkdownGlob`] when a markdown glob does not
    /// compile.
    pub fn new(
        validator: PathValidator,
        matcher: IgnoreMatcher,
        options: &WalkOptions,
    ) -> Result<Self, WalkError> {
        Ok(Self {
            validator,
            matcher,
            markdown: compile_markdown_globs(&options.markdown_globs)?,
            follow_symlinks: options.follow_symlinks,
        })
    }

    #[must_use]
    pub const fn validator(&self) -> &PathValidator {
        &self.validator
    }

    /// Whether a file name looks like markdown.
    #[must_use]
    pub fn is_markdown_name(&self, name: &str) -> bool {
        self.markdown.is_match(name)
    }

    /// Walk every entry under the root, excluding the root itself.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        let inner = WalkDir::new(self.validator.root())
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter();
        Walk {
            walker: self,
            source: Source::Tree(inner),
            nested: NestedRules::default(),
            stats: WalkStats::default(),
        }
    }

    /// Yield exactly one entry for a single-file project whose validator is
    /// rooted at the file's parent directory.
    #[must_use]
    pub fn walk_file(&self, file: &Path) -> Walk<'_> {
        Walk {
            walker: self,
            source: Source::Single(Some(file.to_path_buf())),
            nested: NestedRules::default(),
            stats: WalkStats::default(),
        }
    }
}

fn compile_markdown_globs(globs: &[String]) -> Result<GlobSet, WalkError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in globs {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| WalkError::MarkdownGlob {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| WalkError::MarkdownGlob {
        pattern: globs.join(","),
        reason: e.to_string(),
    })
}

fn relative_string(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

enum Source {
    Tree(walkdir::IntoIter),
    Single(Option<PathBuf>),
}

/// Iterator over one traversal. Not restartable; call
/// [`DirectoryWalker::walk`] again for a fresh pass.
pub struct Walk<'a> {
    walker: &'a DirectoryWalker,
    source: Source,
    nested: NestedRules,
    stats: WalkStats,
}

impl Walk<'_> {
    #[must_use]
    pub const fn stats(&self) -> WalkStats {
        self.stats
    }

    fn reject(&mut self, relative: String, error: WalkError) -> WalkFailure {
        self.stats.rejected += 1;
        tracing::debug!(path = %relative, %error, "rejected entry");
        WalkFailure { relative, error }
    }

    fn accept_file(&mut self, path: PathBuf, relative: String) -> Result<WalkEntry, WalkFailure> {
        let size_bytes = match std::fs::metadata(&path) {
            Ok(metadata) => metadata.len(),
            Err(e) => return Err(self.reject(relative, PathError::io(&path, e).into())),
        };
        let markdown = path
            .file_name()
            .is_some_and(|name| self.walker.markdown.is_match(Path::new(name)));
        self.stats.files += 1;
        if markdown {
            self.stats.markdown_files += 1;
        }
        Ok(WalkEntry::File {
            path,
            relative,
            size_bytes,
            markdown,
        })
    }

    fn next_single(&mut self) -> Option<Result<WalkEntry, WalkFailure>> {
        let Source::Single(slot) = &mut self.source else {
            return None;
        };
        let file = slot.take()?;
        let relative = file
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        Some(match self.walker.validator.validate(&file) {
            Ok(path) => self.accept_file(path, relative),
            Err(error) => Err(self.reject(relative, error.into())),
        })
    }

    fn next_tree(&mut self) -> Option<Result<WalkEntry, WalkFailure>> {
        let root = self.walker.validator.root().to_path_buf();
        loop {
            let Source::Tree(inner) = &mut self.source else {
                return None;
            };
            let entry = match inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    let relative =
                        relative_string(path.strip_prefix(&root).unwrap_or(&path));
                    let error = if err.loop_ancestor().is_some() {
                        PathError::SymlinkLoop(path).into()
                    } else if let Some(io) = err.into_io_error() {
                        PathError::io(path, io).into()
                    } else {
                        WalkError::Traversal {
                            path,
                            reason: "unreadable entry".into(),
                        }
                    };
                    return Some(Err(self.reject(relative, error)));
                }
            };
            let depth = entry.depth();
            if depth == 0 {
                continue;
            }
            self.nested.leave_to(depth);

            let is_dir = entry.file_type().is_dir();
            let rel_path = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or_else(|_| entry.path())
                .to_path_buf();
            let relative = relative_string(&rel_path);

            if self
                .walker
                .matcher
                .matches_entry(&rel_path, is_dir, &self.nested)
            {
                if is_dir {
                    inner.skip_current_dir();
                }
                self.stats.ignored += 1;
                tracing::trace!(path = %relative, "ignored");
                continue;
            }

            let path = match self.walker.validator.validate(&rel_path) {
                Ok(path) => path,
                Err(error) => {
                    if is_dir {
                        inner.skip_current_dir();
                    }
                    return Some(Err(self.reject(relative, error.into())));
                }
            };

            if is_dir {
                if let Some(rules) = self.walker.matcher.dir_rules(&rel_path) {
                    self.nested.push(depth, rules);
                }
                self.stats.directories += 1;
                return Some(Ok(WalkEntry::Dir { path, relative }));
            }
            if entry.file_type().is_file() {
                return Some(self.accept_file(path, relative));
            }
            tracing::trace!(path = %relative, "skipping special file");
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<WalkEntry, WalkFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.source {
            Source::Tree(_) => self.next_tree(),
            Source::Single(_) => self.next_single(),
        }
    }
}
