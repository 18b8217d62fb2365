use anyhow::Context;
use kyo_config::KyoConfig;
use kyo_core::entities::{Failure, Task};
use kyo_core::enums::{DocumentStatus, ProjectKind, ProjectStatus};
use kyo_loader::{
    CancellationToken, EventSink, LoadOutcome, LoadRequest, LoadStats, ProjectLoader, TracingSink,
    TrailWriter,
};
use serde::Serialize;

use crate::cli::root_commands::LoadArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct LoadReport {
    id: String,
    root_path: String,
    name: String,
    kind: Option<ProjectKind>,
    status: ProjectStatus,
    document_count: u32,
    failed_document_count: u32,
    task_count: u32,
    stats: LoadStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Failure>,
    documents: Vec<DocumentRow>,
    tasks: Vec<TaskRow>,
}

#[derive(Debug, Serialize)]
struct DocumentRow {
    path: String,
    status: DocumentStatus,
    tasks: u32,
    title: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct TaskRow {
    id: String,
    name: String,
    language: String,
    order_index: u32,
    executable: bool,
    timeout_seconds: u32,
    lines: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            language: task.language.clone(),
            order_index: task.order_index,
            executable: task.executable,
            timeout_seconds: task.timeout_seconds,
            lines: format!("{}-{}", task.start_line, task.end_line),
        }
    }
}

impl From<&LoadOutcome> for LoadReport {
    fn from(outcome: &LoadOutcome) -> Self {
        let project = &outcome.project;
        Self {
            id: project.id.clone(),
            root_path: project.root_path.clone(),
            name: project.name.clone(),
            kind: project.kind,
            status: project.status,
            document_count: project.document_count,
            failed_document_count: project.failed_document_count,
            task_count: project.task_count,
            stats: outcome.stats,
            error: project.error.clone(),
            documents: project
                .documents
                .iter()
                .map(|doc| DocumentRow {
                    path: doc.relative_path.clone(),
                    status: doc.status,
                    tasks: doc.task_count,
                    title: doc.title.clone(),
                    error: doc
                        .error
                        .as_ref()
                        .map(|f| format!("{}: {}", f.kind, f.message)),
                })
                .collect(),
            tasks: project.tasks().map(TaskRow::from).collect(),
        }
    }
}

/// Request from config defaults overridden by command-line flags.
fn build_request(args: &LoadArgs, config: &KyoConfig) -> LoadRequest {
    let mut request = LoadRequest::from_config(&args.path, &config.load).ignore(args.ignore.clone());
    if let Some(kind) = args.kind {
        request = request.kind(kind);
    }
    if let Some(identity) = args.identity {
        request = request.identity(identity);
    }
    if args.skip_gitignore {
        request = request.skip_gitignore(true);
    }
    if args.no_repo_exclude {
        request = request.use_repository_exclude(false);
    }
    request
}

/// Handle `kyo load`.
pub async fn handle(args: &LoadArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = KyoConfig::load_with_dotenv().context("failed to load kyo configuration")?;
    let request = build_request(args, &config);
    let loader = ProjectLoader::new(&config);

    let mut sinks: Vec<Box<dyn EventSink>> = Vec::new();
    if let Some(path) = &args.trail {
        sinks.push(Box::new(TrailWriter::create(path)?));
    }
    if flags.verbose {
        sinks.push(Box::new(TracingSink));
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling load");
            interrupt.cancel();
        }
    });

    let progress = Progress::spinner(&format!("loading {}", args.path.display()));
    let mut handle = loader.spawn_with(request, cancel, sinks);
    while let Some(event) = handle.recv().await {
        if args.stream {
            progress.println(&serde_json::to_string(&event)?);
        }
        progress.tick(&format!("{} {}", event.event_type, event.path));
    }
    ctrl_c.abort();

    let outcome = match handle.join().await {
        Ok(outcome) => outcome,
        Err(error) => {
            progress.finish_err("load failed");
            return Err(error).context("load rejected");
        }
    };
    progress.finish_clear();

    let report = LoadReport::from(&outcome);
    if flags.format == OutputFormat::Table {
        output(&report.documents, flags.format)?;
    } else {
        output(&report, flags.format)?;
    }

    if let Some(failure) = &outcome.project.error {
        anyhow::bail!("load failed ({}): {}", failure.kind, failure.message);
    }
    Ok(())
}
