//! Trail replay.
//!
//! Rebuilds the shape of a finished (or interrupted) load from its events
//! alone: document order, tasks per document, errors, and the terminal
//! outcome.

use std::collections::HashMap;
use std::path::Path;

use kyo_core::entities::LoadEvent;
use kyo_core::enums::{DocumentStatus, ErrorKind, LoadEventType};
use schemars::JsonSchema;
use serde::Serialize;

use crate::error::LoadError;

/// How the recorded load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReplayOutcome {
    Loaded,
    Error,
    /// No terminal event: the writer stopped early.
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ReplayTask {
    pub task_ref: String,
    pub name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ReplayDocument {
    pub path: String,
    pub document_ref: String,
    pub status: Option<DocumentStatus>,
    pub tasks: Vec<ReplayTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ReplayIssue {
    pub sequence_number: u64,
    pub path: String,
    pub document_ref: Option<String>,
    pub kind: Option<ErrorKind>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ReplaySummary {
    pub outcome: ReplayOutcome,
    pub event_count: u64,
    pub documents: Vec<ReplayDocument>,
    pub errors: Vec<ReplayIssue>,
    /// Payload of the `finished_walk` event, if one was recorded.
    pub stats: serde_json::Value,
}

/// Read every event of a JSONL trail.
///
/// # Errors
///
/// Returns [`LoadError::Trail`] when the file is missing or a line does not
/// decode as a [`LoadEvent`].
pub fn read_trail(path: &Path) -> Result<Vec<LoadEvent>, LoadError> {
    let trail_error = |e: std::io::Error| LoadError::Trail {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    serde_jsonlines::json_lines(path)
        .map_err(trail_error)?
        .collect::<Result<Vec<LoadEvent>, _>>()
        .map_err(trail_error)
}

/// Check sequence integrity and rebuild the load summary.
///
/// # Errors
///
/// Returns [`LoadError::SequenceGap`] unless events are numbered `0..N`
/// in order.
pub fn summarize(events: &[LoadEvent]) -> Result<ReplaySummary, LoadError> {
    let mut documents: Vec<ReplayDocument> = Vec::new();
    let mut by_ref: HashMap<String, usize> = HashMap::new();
    let mut errors = Vec::new();
    let mut outcome = ReplayOutcome::Incomplete;
    let mut stats = serde_json::Value::Null;

    for (expected, event) in (0u64..).zip(events) {
        if event.sequence_number != expected {
            return Err(LoadError::SequenceGap {
                expected,
                found: event.sequence_number,
            });
        }

        let slot = event.document_ref.as_ref().map(|doc_ref| {
            *by_ref.entry(doc_ref.clone()).or_insert_with(|| {
                documents.push(ReplayDocument {
                    path: event.path.clone(),
                    document_ref: doc_ref.clone(),
                    status: None,
                    tasks: Vec::new(),
                });
                documents.len() - 1
            })
        });

        match event.event_type {
            LoadEventType::FoundTask => {
                if let (Some(i), Some(task_ref)) = (slot, event.task_ref.as_ref()) {
                    documents[i].tasks.push(ReplayTask {
                        task_ref: task_ref.clone(),
                        name: event.task_name.clone(),
                        language: event.task_language.clone(),
                    });
                }
            }
            LoadEventType::StartedParsingDoc | LoadEventType::FinishedParsingDoc => {
                if let Some(i) = slot {
                    documents[i].status = event.document_status.or(documents[i].status);
                }
            }
            LoadEventType::Error => {
                if let Some(i) = slot {
                    documents[i].status = Some(DocumentStatus::Error);
                }
                if event.is_project_error() {
                    outcome = ReplayOutcome::Error;
                }
                errors.push(ReplayIssue {
                    sequence_number: event.sequence_number,
                    path: event.path.clone(),
                    document_ref: event.document_ref.clone(),
                    kind: event.error_kind,
                    message: event.error_message.clone().unwrap_or_default(),
                });
            }
            LoadEventType::FinishedWalk => {
                outcome = ReplayOutcome::Loaded;
                stats = event.data.clone();
            }
            LoadEventType::StartedWalk | LoadEventType::FoundDir | LoadEventType::FoundFile => {}
        }
    }

    Ok(ReplaySummary {
        outcome,
        event_count: events.len() as u64,
        documents,
        errors,
        stats,
    })
}
