//! # kyo-parser
//!
//! Turns one markdown document into a [`StructuralTree`] and the tree into
//! [`Task`]s. Nothing is executed and no links are resolved.
//!
//! - [`MarkdownParser`]: block-level structure via `pulldown-cmark`, with
//!   1-based source line numbers and tolerant handling of unterminated fences.
//! - [`TaskExtractor`]: qualifying fences become tasks, named, timed, and
//!   identified according to the active [`IdentityMode`].
//! - [`LanguageTable`]: alias canonicalization, the execution allowlist, and
//!   default timeouts.
//!
//! [`StructuralTree`]: kyo_core::structure::StructuralTree
//! [`Task`]: kyo_core::entities::Task
//! [`IdentityMode`]: kyo_core::enums::IdentityMode

pub mod error;
pub mod extract;
pub mod info;
pub mod languages;
pub mod markdown;
pub mod stats;

pub use error::ParseError;
pub use extract::TaskExtractor;
pub use info::FenceInfo;
pub use languages::{LanguageClass, LanguageTable};
pub use markdown::MarkdownParser;
pub use stats::document_stats;
