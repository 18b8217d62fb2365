use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::task::Task;
use crate::enums::{DocumentStatus, ErrorKind, LoadEventType};

/// One entry of the append-only load audit trail.
///
/// Sequence numbers start at 0 and are gap-free within a single load.
/// Events are never mutated once stamped.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LoadEvent {
    pub event_type: LoadEventType,
    pub sequence_number: u64,
    /// Project-relative path, or the root path for project-scoped events.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_status: Option<DocumentStatus>,
    pub timestamp: DateTime<Utc>,
    /// Event-specific payload (`finished_walk` carries load statistics).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    /// Set on errors that end the whole load (unusable root, cancellation).
    /// Entry-level errors leave it unset even when they carry no document.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub project_scoped: bool,
}

impl LoadEvent {
    /// Whether this event is a project-level terminal marker.
    #[must_use]
    pub fn is_project_error(&self) -> bool {
        self.event_type == LoadEventType::Error && self.project_scoped
    }
}

/// A candidate event before the sequencer assigns its number.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    pub event_type: LoadEventType,
    pub path: String,
    pub document_ref: Option<String>,
    pub task_ref: Option<String>,
    pub error_message: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub task_name: Option<String>,
    pub task_language: Option<String>,
    pub document_status: Option<DocumentStatus>,
    pub data: serde_json::Value,
    pub project_scoped: bool,
}

impl PendingEvent {
    #[must_use]
    pub fn new(event_type: LoadEventType, path: impl Into<String>) -> Self {
        Self {
            event_type,
            path: path.into(),
            document_ref: None,
            task_ref: None,
            error_message: None,
            error_kind: None,
            task_name: None,
            task_language: None,
            document_status: None,
            data: serde_json::Value::Null,
            project_scoped: false,
        }
    }

    /// An `error` event classified as `kind`.
    #[must_use]
    pub fn error(path: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut event = Self::new(LoadEventType::Error, path);
        event.error_kind = Some(kind);
        event.error_message = Some(message.into());
        event
    }

    /// An `error` event that terminates the load at `root`.
    #[must_use]
    pub fn project_error(root: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut event = Self::error(root, kind, message);
        event.project_scoped = true;
        event
    }

    #[must_use]
    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_ref = Some(document_id.into());
        self
    }

    /// Attach task reference, name and language.
    #[must_use]
    pub fn with_task(mut self, task: &Task) -> Self {
        self.document_ref = Some(task.document_id.clone());
        self.task_ref = Some(task.id.clone());
        self.task_name = Some(task.name.clone());
        self.task_language = Some(task.language.clone());
        self
    }

    #[must_use]
    pub const fn with_document_status(mut self, status: DocumentStatus) -> Self {
        self.document_status = Some(status);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Freeze into a [`LoadEvent`] with the given sequence number.
    #[must_use]
    pub fn stamp(self, sequence_number: u64) -> LoadEvent {
        LoadEvent {
            event_type: self.event_type,
            sequence_number,
            path: self.path,
            document_ref: self.document_ref,
            task_ref: self.task_ref,
            error_message: self.error_message,
            error_kind: self.error_kind,
            task_name: self.task_name,
            task_language: self.task_language,
            document_status: self.document_status,
            timestamp: Utc::now(),
            data: self.data,
            project_scoped: self.project_scoped,
        }
    }
}
