use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Failure;
use super::task::Task;
use crate::enums::{DocumentStatus, ErrorKind};
use crate::errors::CoreError;
use crate::structure::StructuralTree;

/// Words per minute used for `reading_time_minutes`.
const WORDS_PER_MINUTE: f64 = 200.0;

/// Content statistics collected while parsing a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DocumentStats {
    pub word_count: u32,
    pub reading_time_minutes: u32,
    pub heading_count: u32,
    /// All fenced code blocks, qualifying or not.
    pub code_block_count: u32,
    /// Fenced blocks with an absent, plain-text, or unknown language tag.
    pub untagged_block_count: u32,
    pub link_count: u32,
}

impl DocumentStats {
    /// Reading time for a word count, rounded up to whole minutes.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_lossless
    )]
    pub fn reading_time(word_count: u32) -> u32 {
        (f64::from(word_count) / WORDS_PER_MINUTE).ceil() as u32
    }
}

/// One markdown file discovered inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
    pub absolute_path: String,
    pub status: DocumentStatus,
    pub size_bytes: u64,
    #[serde(default)]
    pub line_count: u32,
    #[serde(default)]
    pub task_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tree: StructuralTree,
    #[serde(default)]
    pub stats: DocumentStats,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl Document {
    /// A freshly discovered document in `pending` state.
    #[must_use]
    pub fn pending(
        id: String,
        relative_path: String,
        absolute_path: String,
        size_bytes: u64,
    ) -> Self {
        Self {
            id,
            relative_path,
            absolute_path,
            status: DocumentStatus::Pending,
            size_bytes,
            line_count: 0,
            task_count: 0,
            title: None,
            content: String::new(),
            tree: StructuralTree::default(),
            stats: DocumentStats::default(),
            tasks: Vec::new(),
            error: None,
        }
    }

    /// Move to `next`, refusing transitions the state machine does not allow.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidTransition`] for a disallowed transition.
    pub fn transition(&mut self, next: DocumentStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity_type: "document".to_string(),
                id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Record a successful parse and move to `parsed`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidTransition`] unless the document is `parsing`.
    pub fn complete(
        &mut self,
        content: String,
        tree: StructuralTree,
        stats: DocumentStats,
        tasks: Vec<Task>,
    ) -> Result<(), CoreError> {
        self.transition(DocumentStatus::Parsed)?;
        self.line_count = u32::try_from(content.lines().count()).unwrap_or(u32::MAX);
        self.title = tree.title().map(str::to_string);
        self.task_count = u32::try_from(tasks.len()).unwrap_or(u32::MAX);
        self.content = content;
        self.tree = tree;
        self.stats = stats;
        self.tasks = tasks;
        Ok(())
    }

    /// Record a document-local failure and move to `error`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidTransition`] if the document already
    /// reached a terminal state.
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) -> Result<(), CoreError> {
        self.transition(DocumentStatus::Error)?;
        self.task_count = 0;
        self.tasks.clear();
        self.error = Some(Failure {
            kind,
            message: message.into(),
        });
        Ok(())
    }
}
