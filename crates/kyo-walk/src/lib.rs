//! # kyo-walk
//!
//! Filesystem side of a project load:
//!
//! - [`validate`]: `PathValidator` rejects traversal escapes, symlinks leaving
//!   the root, protected system directories, and oversized files before any
//!   read happens.
//! - [`ignore_rules`]: `IgnoreMatcher` layers built-in defaults, per-directory
//!   `.gitignore` files, the repository `info/exclude` file and caller
//!   patterns (later layers win).
//! - [`walk`]: `DirectoryWalker` performs a depth-first, name-sorted
//!   traversal that prunes ignored directories and surfaces markdown
//!   candidates.
//! - [`repo`]: repository discovery via `gix`.

pub mod error;
pub mod ignore_rules;
pub mod repo;
pub mod validate;
pub mod walk;

pub use error::{PathError, WalkError};
pub use ignore_rules::{IgnoreMatcher, IgnoreSources, NestedRules};
pub use validate::{PathValidator, resolve_root};
pub use walk::{DirectoryWalker, Walk, WalkEntry, WalkFailure, WalkOptions, WalkStats};
