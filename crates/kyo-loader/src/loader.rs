//! Project load orchestration.
//!
//! A load runs on one thread and emits events in the order work happens:
//!
//! ```text
//! started_walk
//!   found_dir | found_file
//!   found_file -> started_parsing_doc -> found_task* -> finished_parsing_doc
//!   found_file -> error                        (size cap, before parsing)
//!   found_file -> started_parsing_doc -> error -> finished_parsing_doc
//! finished_walk                                (project becomes loaded)
//! ```
//!
//! Root failures and cancellation end the load with a single project-scoped
//! `error` event instead of `finished_walk`.

use std::path::{Path, PathBuf};

use kyo_config::{DEFAULT_MAX_FILE_BYTES, KyoConfig};
use kyo_core::entities::{Document, LoadEvent, PendingEvent, Project};
use kyo_core::enums::{DocumentStatus, ErrorKind, KindHint, LoadEventType, ProjectKind, ProjectStatus};
use kyo_core::errors::Classify;
use kyo_core::ids;
use kyo_core::structure::StructuralTree;
use kyo_parser::{MarkdownParser, TaskExtractor, document_stats};
use kyo_walk::{
    DirectoryWalker, IgnoreMatcher, IgnoreSources, PathValidator, WalkEntry, WalkOptions,
    WalkStats, resolve_root,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{DocumentFailure, LoadError};
use crate::request::LoadRequest;
use crate::sequencer::Sequencer;
use crate::sink::{ChannelSink, EventSink};

/// Totals carried by the `finished_walk` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub directories: u32,
    pub files: u32,
    pub markdown_files: u32,
    pub ignored: u32,
    pub rejected: u32,
    pub documents: u32,
    pub failed_documents: u32,
    pub tasks: u32,
}

impl LoadStats {
    fn collect(walk: WalkStats, project: &Project) -> Self {
        Self {
            directories: walk.directories,
            files: walk.files,
            markdown_files: walk.markdown_files,
            ignored: walk.ignored,
            rejected: walk.rejected,
            documents: project.document_count,
            failed_documents: project.failed_document_count,
            tasks: project.task_count,
        }
    }
}

/// Final state of a load: the project graph plus its full event log.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub project: Project,
    pub events: Vec<LoadEvent>,
    pub stats: LoadStats,
}

impl LoadOutcome {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.project.status == ProjectStatus::Loaded
    }
}

/// A load running on the blocking pool.
pub struct LoadHandle {
    events: mpsc::UnboundedReceiver<LoadEvent>,
    task: JoinHandle<Result<LoadOutcome, LoadError>>,
}

impl LoadHandle {
    /// Next live event. `None` once the load has finished emitting.
    pub async fn recv(&mut self) -> Option<LoadEvent> {
        self.events.recv().await
    }

    /// Wait for the load to finish.
    ///
    /// # Errors
    ///
    /// Returns the load's own [`LoadError`], or [`LoadError::Worker`] if the
    /// worker panicked.
    pub async fn join(self) -> Result<LoadOutcome, LoadError> {
        self.task
            .await
            .map_err(|e| LoadError::Worker(e.to_string()))?
    }
}

/// Loads projects with fixed settings. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProjectLoader {
    max_file_bytes: u64,
    base_dir: Option<PathBuf>,
    walk: WalkOptions,
    parser: MarkdownParser,
    extractor: TaskExtractor,
}

impl Default for ProjectLoader {
    fn default() -> Self {
        Self::new(&KyoConfig::default())
    }
}

impl ProjectLoader {
    #[must_use]
    pub fn new(config: &KyoConfig) -> Self {
        Self {
            max_file_bytes: config.load.max_file_bytes.min(DEFAULT_MAX_FILE_BYTES),
            base_dir: config.load.base_dir.clone(),
            walk: WalkOptions {
                follow_symlinks: config.load.follow_symlinks,
                markdown_globs: config.load.markdown_globs.clone(),
            },
            parser: MarkdownParser::new(&config.parser),
            extractor: TaskExtractor::new(&config.tasks),
        }
    }

    /// Run a load to completion and return the materialized result.
    ///
    /// # Errors
    ///
    /// Only request-level problems found before the first event:
    /// [`LoadError::IgnorePattern`] for a malformed ignore pattern and
    /// [`LoadError::InvalidRequest`] for unusable settings. Root validation
    /// failures are reported through the outcome (status `error`).
    pub fn load(
        &self,
        request: &LoadRequest,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome, LoadError> {
        self.load_into(request, cancel, Vec::new())
    }

    /// Like [`Self::load`], delivering each event to `sinks` as it is stamped.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_into(
        &self,
        request: &LoadRequest,
        cancel: &CancellationToken,
        sinks: Vec<Box<dyn EventSink>>,
    ) -> Result<LoadOutcome, LoadError> {
        IgnoreMatcher::validate_patterns(&request.ignore_file_patterns)?;

        let sequencer = Sequencer::new(sinks);
        tracing::info!(root = %request.root().display(), identity = %request.identity, "load started");

        let root = match resolve_root(request.root(), self.base_dir.as_deref()) {
            Ok(root) => root,
            Err(error) => return Ok(fail_root(request, sequencer, error.kind(), &error.to_string())),
        };
        let kind = match classify(&root, request.kind_hint) {
            Ok(kind) => kind,
            Err(message) => return Ok(fail_root(request, sequencer, ErrorKind::Io, &message)),
        };
        let boundary = match kind {
            ProjectKind::Directory => root.clone(),
            ProjectKind::File => root
                .parent()
                .map_or_else(|| root.clone(), Path::to_path_buf),
        };
        let validator = match PathValidator::new(&boundary, self.max_file_bytes) {
            Ok(validator) => validator,
            Err(error) => return Ok(fail_root(request, sequencer, error.kind(), &error.to_string())),
        };
        let matcher = IgnoreMatcher::build(
            validator.root(),
            &IgnoreSources {
                skip_gitignore: request.skip_gitignore,
                use_repository_exclude: request.use_repository_exclude,
                patterns: request.ignore_file_patterns.clone(),
            },
        )?;
        let walker = DirectoryWalker::new(validator, matcher, &self.walk)?;

        let root_str = root.display().to_string();
        let mut project = Project::new(
            ids::project_id(&root_str),
            &root,
            request.identity,
            request.options(),
        );
        project.kind = Some(kind);

        let mut run = Run {
            loader: self,
            request,
            cancel,
            root_str,
            sequencer,
            project,
        };
        let (walk_stats, cancelled) = run.walk(&walker, &root, kind);
        Ok(run.finish(walk_stats, cancelled))
    }

    /// Run a load on tokio's blocking pool, streaming events as they happen.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(&self, request: LoadRequest, cancel: CancellationToken) -> LoadHandle {
        self.spawn_with(request, cancel, Vec::new())
    }

    /// [`Self::spawn`] with extra sinks (for example a trail writer).
    #[must_use]
    pub fn spawn_with(
        &self,
        request: LoadRequest,
        cancel: CancellationToken,
        mut sinks: Vec<Box<dyn EventSink>>,
    ) -> LoadHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        sinks.insert(0, Box::new(ChannelSink::new(tx)));
        let loader = self.clone();
        let task =
            tokio::task::spawn_blocking(move || loader.load_into(&request, &cancel, sinks));
        LoadHandle { events: rx, task }
    }
}

fn classify(root: &Path, hint: KindHint) -> Result<ProjectKind, String> {
    let actual = if root.is_dir() {
        ProjectKind::Directory
    } else if root.is_file() {
        ProjectKind::File
    } else {
        return Err(format!(
            "'{}' is neither a file nor a directory",
            root.display()
        ));
    };
    match (hint, actual) {
        (KindHint::Auto, _)
        | (KindHint::Directory, ProjectKind::Directory)
        | (KindHint::File, ProjectKind::File) => Ok(actual),
        (hint, actual) => Err(format!(
            "expected a {hint} but '{}' is a {actual}",
            root.display()
        )),
    }
}

/// End a load whose root could not be used.
fn fail_root(
    request: &LoadRequest,
    mut sequencer: Sequencer,
    kind: ErrorKind,
    message: &str,
) -> LoadOutcome {
    let path = request.root().display().to_string();
    let mut project = Project::new(
        ids::project_id(&path),
        request.root(),
        request.identity,
        request.options(),
    );
    sequencer.emit(PendingEvent::project_error(&path, kind, message));
    if let Err(error) = project.fail(kind, message) {
        tracing::error!(%error, "project state");
    }
    tracing::warn!(root = %path, %kind, message, "load failed at root");
    LoadOutcome {
        project,
        events: sequencer.finish(),
        stats: LoadStats::default(),
    }
}

/// State of one in-flight load.
struct Run<'a> {
    loader: &'a ProjectLoader,
    request: &'a LoadRequest,
    cancel: &'a CancellationToken,
    root_str: String,
    sequencer: Sequencer,
    project: Project,
}

impl Run<'_> {
    fn emit(&mut self, event: PendingEvent) {
        self.sequencer.emit(event);
    }

    /// Walk the tree. Returns the walk counters and whether the load was
    /// cancelled before the walk ended.
    fn walk(&mut self, walker: &DirectoryWalker, root: &Path, kind: ProjectKind) -> (WalkStats, bool) {
        self.emit(
            PendingEvent::new(LoadEventType::StartedWalk, self.root_str.clone()).with_data(json!({
                "kind": kind,
                "identity": self.request.identity,
            })),
        );

        let mut walk = match kind {
            ProjectKind::Directory => walker.walk(),
            ProjectKind::File => walker.walk_file(root),
        };
        loop {
            if self.cancel.is_cancelled() {
                return (walk.stats(), true);
            }
            let Some(item) = walk.next() else {
                return (walk.stats(), false);
            };
            match item {
                Ok(WalkEntry::Dir { relative, .. }) => {
                    tracing::debug!(path = %relative, "found dir");
                    self.emit(PendingEvent::new(LoadEventType::FoundDir, relative));
                }
                Ok(WalkEntry::File {
                    path,
                    relative,
                    size_bytes,
                    markdown,
                }) => {
                    let data = json!({ "size_bytes": size_bytes, "markdown": markdown });
                    if !markdown {
                        self.emit(PendingEvent::new(LoadEventType::FoundFile, relative).with_data(data));
                        continue;
                    }
                    let document_id = ids::document_id(&self.root_str, &relative);
                    self.emit(
                        PendingEvent::new(LoadEventType::FoundFile, relative.clone())
                            .with_document(document_id.clone())
                            .with_data(data),
                    );
                    if self.cancel.is_cancelled() {
                        return (walk.stats(), true);
                    }
                    let document =
                        Document::pending(document_id, relative, path.display().to_string(), size_bytes);
                    self.load_document(walker.validator(), &path, document);
                }
                Err(failure) => {
                    let kind = failure.error.kind();
                    tracing::warn!(path = %failure.relative, %kind, error = %failure.error, "entry rejected");
                    self.emit(PendingEvent::error(
                        failure.relative,
                        kind,
                        failure.error.to_string(),
                    ));
                }
            }
        }
    }

    /// Parse one markdown file. `path` is the canonical path the walk
    /// accepted; the document's relative path is lossy for non-UTF-8 names
    /// and only labels events.
    fn load_document(&mut self, validator: &PathValidator, path: &Path, mut document: Document) {
        let relative = document.relative_path.clone();
        let id = document.id.clone();

        if let Err(error) = validator.check_size(Path::new(&relative), document.size_bytes) {
            let kind = error.kind();
            tracing::warn!(path = %relative, %error, "document skipped");
            self.emit(
                PendingEvent::error(relative.clone(), kind, error.to_string())
                    .with_document(id)
                    .with_data(json!({
                        "size_bytes": document.size_bytes,
                        "limit": validator.max_file_bytes(),
                    })),
            );
            self.settle(document, Some((kind, error.to_string())));
            return;
        }

        self.emit(
            PendingEvent::new(LoadEventType::StartedParsingDoc, relative.clone())
                .with_document(id.clone())
                .with_document_status(DocumentStatus::Parsing),
        );
        if let Err(error) = document.transition(DocumentStatus::Parsing) {
            tracing::error!(%error, "document state");
        }

        let parsed = self.parse(validator, path);
        let (content, tree) = match parsed {
            Ok(parsed) => parsed,
            Err(failure) => {
                let kind = failure.kind();
                tracing::warn!(path = %relative, %kind, error = %failure, "document failed");
                self.emit(
                    PendingEvent::error(relative.clone(), kind, failure.to_string())
                        .with_document(id.clone()),
                );
                self.emit(
                    PendingEvent::new(LoadEventType::FinishedParsingDoc, relative)
                        .with_document(id)
                        .with_document_status(DocumentStatus::Error),
                );
                self.settle(document, Some((kind, failure.to_string())));
                return;
            }
        };

        let loader = self.loader;
        let extractor = &loader.extractor;
        let stats = document_stats(&content, &tree, extractor.languages());
        let tasks = extractor.extract(&self.root_str, &document, &tree, self.request.identity);
        for task in &tasks {
            self.emit(PendingEvent::new(LoadEventType::FoundTask, relative.clone()).with_task(task));
        }
        let task_count = tasks.len();
        if let Err(error) = document.complete(content, tree, stats, tasks) {
            tracing::error!(%error, "document state");
        }
        self.emit(
            PendingEvent::new(LoadEventType::FinishedParsingDoc, relative)
                .with_document(id)
                .with_document_status(document.status)
                .with_data(json!({ "task_count": task_count })),
        );
        self.settle(document, None);
    }

    fn parse(
        &self,
        validator: &PathValidator,
        path: &Path,
    ) -> Result<(String, StructuralTree), DocumentFailure> {
        let bytes = validator.read(path)?;
        let content = MarkdownParser::decode(bytes)?;
        let tree = self.loader.parser.parse(&content)?;
        Ok((content, tree))
    }

    /// Record a finished document on the project.
    fn settle(&mut self, mut document: Document, failure: Option<(ErrorKind, String)>) {
        if let Some((kind, message)) = failure
            && let Err(error) = document.fail(kind, message)
        {
            tracing::error!(%error, "document state");
        }
        if let Err(error) = self.project.push_document(document) {
            tracing::error!(%error, "project state");
        }
    }

    fn finish(mut self, walk: WalkStats, cancelled: bool) -> LoadOutcome {
        if cancelled {
            let message = "load cancelled";
            self.emit(PendingEvent::project_error(
                self.root_str.clone(),
                ErrorKind::Cancelled,
                message,
            ));
            if let Err(error) = self.project.fail(ErrorKind::Cancelled, message) {
                tracing::error!(%error, "project state");
            }
            tracing::warn!(root = %self.root_str, "load cancelled");
        }

        let stats = LoadStats::collect(walk, &self.project);
        if !cancelled {
            self.emit(
                PendingEvent::new(LoadEventType::FinishedWalk, self.root_str.clone())
                    .with_data(serde_json::to_value(stats).unwrap_or_default()),
            );
            if let Err(error) = self.project.transition(ProjectStatus::Loaded) {
                tracing::error!(%error, "project state");
            }
            tracing::info!(
                root = %self.root_str,
                documents = stats.documents,
                failed = stats.failed_documents,
                tasks = stats.tasks,
                "load finished"
            );
        }

        LoadOutcome {
            project: self.project,
            events: self.sequencer.finish(),
            stats,
        }
    }
}
