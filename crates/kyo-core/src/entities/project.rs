use std::path::Path;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::document::Document;
use super::task::Task;
use crate::enums::{DocumentStatus, ErrorKind, IdentityMode, ProjectKind, ProjectStatus};
use crate::errors::CoreError;

/// A classified failure attached to a project or document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Traversal options recorded on the project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LoadOptions {
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub skip_gitignore: bool,
    #[serde(default = "default_true")]
    pub use_repository_exclude: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            skip_gitignore: false,
            use_repository_exclude: true,
        }
    }
}

/// Root of one load: a directory tree or a single markdown file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub root_path: String,
    /// `None` when the root could not be classified (validation failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProjectKind>,
    pub name: String,
    pub status: ProjectStatus,
    pub identity: IdentityMode,
    #[serde(default)]
    pub options: LoadOptions,
    /// Documents that reached `parsed`.
    pub document_count: u32,
    /// Tasks owned by parsed documents.
    pub task_count: u32,
    /// Documents that ended in `error`.
    #[serde(default)]
    pub failed_document_count: u32,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Project {
    /// A project in `loading` state for `root_path`.
    #[must_use]
    pub fn new(id: String, root_path: &Path, identity: IdentityMode, options: LoadOptions) -> Self {
        Self {
            id,
            root_path: root_path.display().to_string(),
            kind: None,
            name: display_name(root_path),
            status: ProjectStatus::Loading,
            identity,
            options,
            document_count: 0,
            task_count: 0,
            failed_document_count: 0,
            documents: Vec::new(),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Append a document that reached a terminal state and refresh counters.
    ///
    /// # Errors
    /// Returns [`CoreError::Validation`] once the project left `loading`, or
    /// when the document is not terminal.
    pub fn push_document(&mut self, document: Document) -> Result<(), CoreError> {
        if self.status != ProjectStatus::Loading {
            return Err(CoreError::Validation(format!(
                "project {} is {}; documents can only be added while loading",
                self.id, self.status
            )));
        }
        match document.status {
            DocumentStatus::Parsed => {
                self.document_count += 1;
                self.task_count += document.task_count;
            }
            DocumentStatus::Error => self.failed_document_count += 1,
            other => {
                return Err(CoreError::Validation(format!(
                    "document {} is still {other}",
                    document.id
                )));
            }
        }
        self.documents.push(document);
        Ok(())
    }

    /// Move to `next`, stamping `finished_at` on terminal states.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidTransition`] for a disallowed transition.
    pub fn transition(&mut self, next: ProjectStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity_type: "project".to_string(),
                id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Terminate the load with a project-level failure.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidTransition`] if already terminal.
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) -> Result<(), CoreError> {
        self.transition(ProjectStatus::Error)?;
        self.error = Some(Failure {
            kind,
            message: message.into(),
        });
        Ok(())
    }

    /// All tasks of parsed documents, in document then extraction order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Parsed)
            .flat_map(|d| d.tasks.iter())
    }

    /// Look up a document by its project-relative path.
    #[must_use]
    pub fn document(&self, relative_path: &str) -> Option<&Document> {
        self.documents
            .iter()
            .find(|d| d.relative_path == relative_path)
    }
}

/// Display name derived from the last path component.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
