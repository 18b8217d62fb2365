//! Path validation performed before every filesystem read.
//!
//! A candidate path is accepted only when, after resolving `..` components
//! and symlinks, it still lies under the project root and outside the
//! protected system directories. Files must also respect the size cap.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::PathError;

/// System directories no load may read from, whatever the root.
const SYSTEM_DENYLIST: &[&str] = &[
    "/etc",
    "/proc",
    "/sys",
    "/dev",
    "/boot",
    "/bin",
    "/sbin",
    "/usr/bin",
    "/usr/sbin",
    "/private/etc",
    "/System",
    "C:\\Windows",
];

/// Credential directories under the user's home.
const HOME_DENYLIST: &[&str] = &[".ssh", ".gnupg", ".aws", ".kube"];

/// Whether `path` falls inside a protected directory.
#[must_use]
pub fn is_denylisted(path: &Path) -> bool {
    if SYSTEM_DENYLIST.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    dirs::home_dir().is_some_and(|home| {
        HOME_DENYLIST
            .iter()
            .any(|dir| path.starts_with(home.join(dir)))
    })
}

/// Collapse `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn canonicalize(path: &Path) -> Result<PathBuf, PathError> {
    fs::canonicalize(path).map_err(|e| PathError::io(path, e))
}

/// Resolve a requested project root to its canonical absolute form.
///
/// With a `base_dir`, relative roots are resolved against it and the result
/// must stay inside it. Without one, relative roots resolve against the
/// process working directory. Protected system directories are refused in
/// both cases.
///
/// # Errors
///
/// [`PathError::Escape`] / [`PathError::SymlinkEscape`] when the root leaves
/// `base_dir`, [`PathError::Denylisted`] for protected locations, and
/// [`PathError::NotFound`] when nothing exists at the resolved path.
pub fn resolve_root(candidate: &Path, base_dir: Option<&Path>) -> Result<PathBuf, PathError> {
    let resolved = if let Some(base) = base_dir {
        let base = canonicalize(base)?;
        let joined = normalize_lexically(&base.join(candidate));
        if !joined.starts_with(&base) {
            return Err(PathError::Escape {
                path: candidate.to_path_buf(),
                root: base,
            });
        }
        let canonical = canonicalize(&joined)?;
        if !canonical.starts_with(&base) {
            return Err(PathError::SymlinkEscape {
                path: candidate.to_path_buf(),
                target: canonical,
            });
        }
        canonical
    } else {
        let absolute = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            let cwd = std::env::current_dir().map_err(|e| PathError::io(candidate, e))?;
            cwd.join(candidate)
        };
        if is_denylisted(&normalize_lexically(&absolute)) {
            return Err(PathError::Denylisted(candidate.to_path_buf()));
        }
        canonicalize(&absolute)?
    };

    if is_denylisted(&resolved) {
        return Err(PathError::Denylisted(resolved));
    }
    Ok(resolved)
}

/// Confines reads to one canonical root directory.
#[derive(Debug, Clone)]
pub struct PathValidator {
    root: PathBuf,
    max_file_bytes: u64,
}

impl PathValidator {
    /// Build a validator for `root`, which is canonicalized first.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the root does not exist or is protected.
    pub fn new(root: &Path, max_file_bytes: u64) -> Result<Self, PathError> {
        let root = canonicalize(root)?;
        if is_denylisted(&root) {
            return Err(PathError::Denylisted(root));
        }
        Ok(Self {
            root,
            max_file_bytes,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Resolve `candidate` (absolute, or relative to the root) and confirm it
    /// stays under the root once `..` and symlinks are resolved.
    ///
    /// # Errors
    ///
    /// [`PathError::Escape`] for lexical escapes, [`PathError::SymlinkEscape`]
    /// when a link points outside, [`PathError::Denylisted`] for protected
    /// targets, and [`PathError::NotFound`] / [`PathError::Io`] otherwise.
    pub fn validate(&self, candidate: &Path) -> Result<PathBuf, PathError> {
        let joined = normalize_lexically(&self.root.join(candidate));
        if !joined.starts_with(&self.root) {
            return Err(PathError::Escape {
                path: candidate.to_path_buf(),
                root: self.root.clone(),
            });
        }

        let canonical = canonicalize(&joined)?;
        if !canonical.starts_with(&self.root) {
            return Err(PathError::SymlinkEscape {
                path: candidate.to_path_buf(),
                target: canonical,
            });
        }
        if is_denylisted(&canonical) {
            return Err(PathError::Denylisted(canonical));
        }
        Ok(canonical)
    }

    /// Reject sizes above the configured cap.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::TooLarge`].
    pub fn check_size(&self, path: &Path, size: u64) -> Result<(), PathError> {
        if size > self.max_file_bytes {
            return Err(PathError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_file_bytes,
            });
        }
        Ok(())
    }

    /// Validate, size-check, and read a file.
    ///
    /// # Errors
    ///
    /// Any [`PathError`] from [`Self::validate`] or [`Self::check_size`], or
    /// an I/O failure while reading.
    pub fn read(&self, candidate: &Path) -> Result<Vec<u8>, PathError> {
        let path = self.validate(candidate)?;
        let metadata = fs::metadata(&path).map_err(|e| PathError::io(&path, e))?;
        self.check_size(candidate, metadata.len())?;
        fs::read(&path).map_err(|e| PathError::io(&path, e))
    }
}
