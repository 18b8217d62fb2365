//! # kyo-loader
//!
//! Orchestrates one project load: validate the root, walk it, parse each
//! markdown document, extract its tasks, and record every step as a
//! [`LoadEvent`](kyo_core::entities::LoadEvent) with a gap-free sequence
//! number.
//!
//! Events are delivered two ways. Pull callers read
//! [`LoadOutcome::events`] once the load returns. Push callers attach
//! [`EventSink`]s (a channel, the tracing log, a JSONL trail) that see each
//! event as soon as the [`Sequencer`] stamps it.
//!
//! ```no_run
//! use kyo_loader::{LoadRequest, ProjectLoader};
//! use tokio_util::sync::CancellationToken;
//!
//! let loader = ProjectLoader::default();
//! let outcome = loader
//!     .load(&LoadRequest::new("docs"), &CancellationToken::new())
//!     .expect("valid request");
//! println!("{} tasks", outcome.project.task_count);
//! ```

pub mod error;
pub mod loader;
pub mod request;
pub mod sequencer;
pub mod sink;
pub mod trail;

pub use error::LoadError;
pub use loader::{LoadHandle, LoadOutcome, LoadStats, ProjectLoader};
pub use request::LoadRequest;
pub use sequencer::Sequencer;
pub use sink::{ChannelSink, EventSink, TracingSink, VecSink};
pub use trail::{ReplayOutcome, ReplaySummary, TrailWriter, read_trail, summarize};
pub use tokio_util::sync::CancellationToken;
