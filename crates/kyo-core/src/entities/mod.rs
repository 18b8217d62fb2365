//! Entity structs for the loaded project graph.
//!
//! A [`Project`] owns its [`Document`]s, which own their [`Task`]s. The
//! [`LoadEvent`] stream is the append-only audit trail of how the graph was
//! built. All structs derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod document;
mod event;
mod project;
mod task;

pub use document::{Document, DocumentStats};
pub use event::{LoadEvent, PendingEvent};
pub use project::{Failure, LoadOptions, Project};
pub use task::Task;
