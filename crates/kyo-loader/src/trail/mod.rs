//! JSONL event trail: one stamped [`LoadEvent`](kyo_core::entities::LoadEvent)
//! per line, written while the load runs and replayable afterwards.

mod replay;
mod writer;

pub use replay::{ReplayDocument, ReplayIssue, ReplayOutcome, ReplaySummary, ReplayTask, read_trail, summarize};
pub use writer::TrailWriter;
