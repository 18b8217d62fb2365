//! Task extraction from parsed documents.

use kyo_config::TaskConfig;
use kyo_core::entities::{Document, Task};
use kyo_core::enums::IdentityMode;
use kyo_core::ids;
use kyo_core::structure::{CodeFence, StructuralTree};

use crate::info::FenceInfo;
use crate::languages::{LanguageClass, LanguageTable};

/// Builds [`Task`]s from the qualifying fences of a document.
#[derive(Debug, Clone, Default)]
pub struct TaskExtractor {
    languages: LanguageTable,
}

/// A fence that will become a task, with its parsed metadata.
struct Qualifying<'a> {
    fence: &'a CodeFence,
    info: FenceInfo,
    language: String,
    executable: bool,
}

impl TaskExtractor {
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        Self {
            languages: LanguageTable::new(config),
        }
    }

    #[must_use]
    pub const fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Extract tasks in document order.
    ///
    /// `identity` is resolved against the number of qualifying fences, so
    /// `auto` becomes `cell` for documents with more than one and `document`
    /// otherwise. `project_root` seeds per-cell identifiers.
    #[must_use]
    pub fn extract(
        &self,
        project_root: &str,
        document: &Document,
        tree: &StructuralTree,
        identity: IdentityMode,
    ) -> Vec<Task> {
        let qualifying: Vec<Qualifying<'_>> = tree
            .code_fences()
            .filter_map(|fence| match self.languages.classify(fence.language.as_deref()) {
                LanguageClass::Known {
                    canonical,
                    executable,
                } => Some(Qualifying {
                    fence,
                    info: FenceInfo::parse(&fence.info),
                    language: canonical,
                    executable,
                }),
                LanguageClass::Plain | LanguageClass::Unknown(_) => None,
            })
            .collect();

        let mode = identity.resolve(qualifying.len());
        let tasks: Vec<Task> = qualifying
            .into_iter()
            .zip(0u32..)
            .map(|(q, order_index)| {
                let id = match mode {
                    IdentityMode::Cell => ids::cell_id(
                        project_root,
                        &document.relative_path,
                        order_index,
                        &q.language,
                    ),
                    IdentityMode::Document | IdentityMode::Auto => {
                        ids::document_task_id(&document.id, order_index)
                    }
                };
                let name = q
                    .info
                    .name
                    .unwrap_or_else(|| format!("{}-{order_index}", q.language));
                let timeout_seconds = q
                    .info
                    .timeout_seconds
                    .unwrap_or_else(|| self.languages.timeout_for(&q.language));
                Task {
                    id,
                    document_id: document.id.clone(),
                    name,
                    language: q.language,
                    code: q.fence.code.clone(),
                    start_line: q.fence.start_line,
                    end_line: q.fence.end_line,
                    order_index,
                    executable: q.executable,
                    timeout_seconds,
                    identity: mode,
                    attributes: q.info.attributes,
                }
            })
            .collect();

        tracing::debug!(
            document = %document.relative_path,
            tasks = tasks.len(),
            identity = %mode,
            "extracted tasks"
        );
        tasks
    }
}
