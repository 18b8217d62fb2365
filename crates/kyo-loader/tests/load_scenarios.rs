//! End-to-end loads over fixture trees.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use kyo_config::KyoConfig;
use kyo_core::entities::LoadEvent;
use kyo_core::enums::{
    DocumentStatus, ErrorKind, IdentityMode, KindHint, LoadEventType, ProjectKind, ProjectStatus,
};
use kyo_loader::{
    CancellationToken, EventSink, LoadError, LoadOutcome, LoadRequest, ProjectLoader,
    ReplayOutcome, TrailWriter, VecSink, read_trail, summarize,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const MIXED: &str = "# Notes\n\n```python\nprint('hi')\n```\n\n```\nplain output\n```\n";

fn load(request: &LoadRequest) -> LoadOutcome {
    ProjectLoader::default()
        .load(request, &CancellationToken::new())
        .unwrap()
}

fn types(events: &[LoadEvent]) -> Vec<LoadEventType> {
    events.iter().map(|e| e.event_type).collect()
}

fn events_for<'a>(events: &'a [LoadEvent], path: &str) -> Vec<&'a LoadEvent> {
    events.iter().filter(|e| e.path == path).collect()
}

/// `a.md` with one python and one untagged fence; `b/` is gitignored.
fn mixed_tree() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join(".gitignore"), "b/\n").unwrap();
    fs::write(tmp.path().join("a.md"), MIXED).unwrap();
    fs::create_dir_all(tmp.path().join("b")).unwrap();
    fs::write(tmp.path().join("b/ignored.md"), "```bash\nrm -rf /\n```\n").unwrap();
    tmp
}

fn assert_gap_free(events: &[LoadEvent]) {
    let numbers: Vec<u64> = events.iter().map(|e| e.sequence_number).collect();
    let expected: Vec<u64> = (0..events.len() as u64).collect();
    assert_eq!(numbers, expected);
}

#[test]
fn gitignored_directory_is_pruned() {
    let tmp = mixed_tree();
    let outcome = load(&LoadRequest::new(tmp.path()));

    assert!(outcome.is_loaded());
    assert_eq!(outcome.project.kind, Some(ProjectKind::Directory));
    assert_eq!(outcome.project.document_count, 1);
    assert_eq!(outcome.project.task_count, 1);

    let tasks: Vec<_> = outcome.project.tasks().collect();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].language, "python");
    assert_eq!(tasks[0].order_index, 0);
    assert_eq!(tasks[0].identity, IdentityMode::Document);

    assert!(
        outcome.events.iter().all(|e| !e.path.starts_with('b')),
        "events leaked from the ignored subtree"
    );
    assert_eq!(outcome.stats.ignored, 1);
}

#[test]
fn document_events_follow_discovery() {
    let tmp = mixed_tree();
    let outcome = load(&LoadRequest::new(tmp.path()));

    let a: Vec<LoadEventType> = events_for(&outcome.events, "a.md")
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        a,
        vec![
            LoadEventType::FoundFile,
            LoadEventType::StartedParsingDoc,
            LoadEventType::FoundTask,
            LoadEventType::FinishedParsingDoc,
        ]
    );

    let all = types(&outcome.events);
    assert_eq!(all.first(), Some(&LoadEventType::StartedWalk));
    assert_eq!(all.last(), Some(&LoadEventType::FinishedWalk));

    let finished = outcome.events.last().unwrap();
    assert_eq!(finished.data["documents"], 1);
    assert_eq!(finished.data["tasks"], 1);
}

#[test]
fn skip_gitignore_loads_everything() {
    let tmp = mixed_tree();
    let outcome = load(&LoadRequest::new(tmp.path()).skip_gitignore(true));

    assert_eq!(outcome.project.document_count, 2);
    assert!(outcome.project.document("b/ignored.md").is_some());
    assert!(
        outcome
            .events
            .iter()
            .any(|e| e.event_type == LoadEventType::FoundDir && e.path == "b")
    );
}

#[test]
fn explicit_patterns_apply_after_gitignore() {
    let tmp = mixed_tree();
    let outcome = load(
        &LoadRequest::new(tmp.path())
            .skip_gitignore(true)
            .ignore(["*.md", "!b/ignored.md"]),
    );

    let paths: Vec<&str> = outcome
        .project
        .documents
        .iter()
        .map(|d| d.relative_path.as_str())
        .collect();
    assert_eq!(paths, vec!["b/ignored.md"]);
}

#[test]
fn single_file_in_cell_mode() {
    let tmp = tempfile::tempdir().unwrap();
    let script = tmp.path().join("script.md");
    fs::write(
        &script,
        "# Deploy\n\n```bash\necho build\n```\n\n```bash\necho ship\n```\n",
    )
    .unwrap();
    fs::write(tmp.path().join("sibling.md"), "# Not part of the project\n").unwrap();

    let outcome = load(
        &LoadRequest::new(&script)
            .kind(KindHint::File)
            .identity(IdentityMode::Cell),
    );

    assert!(outcome.is_loaded());
    assert_eq!(outcome.project.kind, Some(ProjectKind::File));
    assert_eq!(outcome.project.documents.len(), 1);

    let tasks: Vec<_> = outcome.project.tasks().collect();
    assert_eq!(tasks.len(), 2);
    assert_ne!(tasks[0].id, tasks[1].id);
    assert!(tasks[0].id.starts_with("cel-"));
    assert_eq!(
        tasks.iter().map(|t| t.order_index).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert!(tasks.iter().all(|t| t.executable));
    assert!(outcome.events.iter().all(|e| e.path != "sibling.md"));
}

#[rstest]
#[case::file_as_directory(KindHint::Directory, true)]
#[case::directory_as_file(KindHint::File, false)]
fn kind_hint_mismatch_fails_at_root(#[case] hint: KindHint, #[case] use_file: bool) {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("one.md");
    fs::write(&file, "# One\n").unwrap();
    let root = if use_file { file } else { tmp.path().to_path_buf() };

    let outcome = load(&LoadRequest::new(root).kind(hint));

    assert_eq!(outcome.project.status, ProjectStatus::Error);
    assert_eq!(outcome.events.len(), 1);
    assert!(outcome.events[0].is_project_error());
}

#[test]
fn oversized_document_fails_alone() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("a.md"), "```sh\necho ok\n```\n").unwrap();
    let huge = fs::File::create(tmp.path().join("huge.md")).unwrap();
    huge.set_len(60 * 1024 * 1024).unwrap();
    drop(huge);

    let outcome = load(&LoadRequest::new(tmp.path()));

    assert!(outcome.is_loaded());
    let huge_events = events_for(&outcome.events, "huge.md");
    assert_eq!(
        huge_events.iter().map(|e| e.event_type).collect::<Vec<_>>(),
        vec![LoadEventType::FoundFile, LoadEventType::Error]
    );
    assert_eq!(huge_events[1].error_kind, Some(ErrorKind::SizeLimit));
    assert!(!huge_events[1].is_project_error());

    let doc = outcome.project.document("huge.md").unwrap();
    assert_eq!(doc.status, DocumentStatus::Error);
    assert_eq!(outcome.project.document_count, 1);
    assert_eq!(outcome.project.failed_document_count, 1);
    assert_eq!(outcome.project.task_count, 1);
}

#[test]
fn invalid_utf8_is_isolated() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("bad.md"), [b'#', b' ', 0xff, 0xfe, b'\n']).unwrap();
    fs::write(tmp.path().join("good.md"), "# Fine\n").unwrap();

    let outcome = load(&LoadRequest::new(tmp.path()));

    assert!(outcome.is_loaded());
    let bad: Vec<_> = events_for(&outcome.events, "bad.md");
    assert_eq!(
        bad.iter().map(|e| e.event_type).collect::<Vec<_>>(),
        vec![
            LoadEventType::FoundFile,
            LoadEventType::StartedParsingDoc,
            LoadEventType::Error,
            LoadEventType::FinishedParsingDoc,
        ]
    );
    assert_eq!(bad[2].error_kind, Some(ErrorKind::Encoding));
    assert_eq!(bad[3].document_status, Some(DocumentStatus::Error));
    assert_eq!(
        outcome.project.document("good.md").unwrap().status,
        DocumentStatus::Parsed
    );
}

#[test]
fn malformed_pattern_fails_before_any_event() {
    let tmp = mixed_tree();
    let sink = VecSink::new();

    let err = ProjectLoader::default()
        .load_into(
            &LoadRequest::new(tmp.path()).ignore(["a["]),
            &CancellationToken::new(),
            vec![Box::new(sink.clone())],
        )
        .unwrap_err();

    assert!(matches!(err, LoadError::IgnorePattern { .. }));
    assert!(sink.snapshot().is_empty());
}

#[rstest]
#[case::relative_escape("../../etc/passwd")]
#[case::absolute_outside("/etc/passwd")]
fn escaping_root_is_refused(#[case] root: &str) {
    let base = tempfile::tempdir().unwrap();
    fs::write(base.path().join("inside.md"), "# In\n").unwrap();
    let mut config = KyoConfig::default();
    config.load.base_dir = Some(base.path().to_path_buf());

    let outcome = ProjectLoader::new(&config)
        .load(&LoadRequest::new(root), &CancellationToken::new())
        .unwrap();

    assert_eq!(outcome.project.status, ProjectStatus::Error);
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].error_kind, Some(ErrorKind::PathSecurity));
    assert!(outcome.events[0].is_project_error());
    assert!(outcome.project.documents.is_empty());
    assert_eq!(
        outcome.project.error.as_ref().map(|f| f.kind),
        Some(ErrorKind::PathSecurity)
    );
}

#[test]
fn relative_root_resolves_inside_base_dir() {
    let base = tempfile::tempdir().unwrap();
    fs::create_dir_all(base.path().join("docs")).unwrap();
    fs::write(base.path().join("docs/readme.md"), "# Readme\n").unwrap();
    let mut config = KyoConfig::default();
    config.load.base_dir = Some(base.path().to_path_buf());

    let outcome = ProjectLoader::new(&config)
        .load(&LoadRequest::new("docs"), &CancellationToken::new())
        .unwrap();

    assert!(outcome.is_loaded());
    assert_eq!(outcome.project.name, "docs");
    assert_eq!(outcome.project.document_count, 1);
}

#[test]
fn reload_is_idempotent() {
    let tmp = mixed_tree();
    fs::create_dir_all(tmp.path().join("guide/deep")).unwrap();
    fs::write(tmp.path().join("guide/intro.md"), "```js\n1\n```\n```ts\n2\n```\n").unwrap();
    fs::write(tmp.path().join("guide/deep/z.md"), "```go\nmain\n```\n").unwrap();
    let request = LoadRequest::new(tmp.path());

    let first = load(&request);
    let second = load(&request);

    assert_eq!(types(&first.events), types(&second.events));
    assert_eq!(first.project.id, second.project.id);
    let ids = |o: &LoadOutcome| o.project.tasks().map(|t| t.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
    let paths = |o: &LoadOutcome| {
        o.events
            .iter()
            .map(|e| e.path.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(paths(&first), paths(&second));
}

#[test]
fn sequence_numbers_are_gap_free_and_task_counts_match() {
    let tmp = mixed_tree();
    fs::write(tmp.path().join("c.md"), "```rust\nfn main() {}\n```\n```toml\n[a]\n```\n").unwrap();
    fs::write(tmp.path().join("notes.txt"), "not markdown").unwrap();

    let outcome = load(&LoadRequest::new(tmp.path()));
    assert_gap_free(&outcome.events);

    let mut found: HashMap<&str, u32> = HashMap::new();
    for event in &outcome.events {
        if event.event_type == LoadEventType::FoundTask {
            *found.entry(event.document_ref.as_deref().unwrap()).or_default() += 1;
        }
    }
    for doc in &outcome.project.documents {
        assert_eq!(
            found.get(doc.id.as_str()).copied().unwrap_or(0),
            doc.task_count,
            "{}",
            doc.relative_path
        );
        let finished = outcome
            .events
            .iter()
            .find(|e| {
                e.event_type == LoadEventType::FinishedParsingDoc
                    && e.document_ref.as_deref() == Some(doc.id.as_str())
            })
            .unwrap();
        assert_eq!(finished.data["task_count"], doc.task_count);
    }
}

#[test]
fn cancelled_load_ends_in_error() {
    let tmp = mixed_tree();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = ProjectLoader::default()
        .load(&LoadRequest::new(tmp.path()), &cancel)
        .unwrap();

    assert_eq!(outcome.project.status, ProjectStatus::Error);
    assert_eq!(
        types(&outcome.events),
        vec![LoadEventType::StartedWalk, LoadEventType::Error]
    );
    assert_eq!(outcome.events[1].error_kind, Some(ErrorKind::Cancelled));
    assert!(outcome.events[1].is_project_error());
    assert!(outcome.project.documents.is_empty());
}

/// Cancels the load as soon as the first markdown file is announced.
struct CancelOnMarkdown {
    cancel: CancellationToken,
}

impl EventSink for CancelOnMarkdown {
    fn accept(&mut self, event: &LoadEvent) {
        if event.event_type == LoadEventType::FoundFile && event.document_ref.is_some() {
            self.cancel.cancel();
        }
    }
}

#[test]
fn cancel_between_discovery_and_parse_records_nothing() {
    let tmp = mixed_tree();
    fs::write(tmp.path().join("z.md"), MIXED).unwrap();
    let cancel = CancellationToken::new();
    let sink = CancelOnMarkdown {
        cancel: cancel.clone(),
    };

    let outcome = ProjectLoader::default()
        .load_into(&LoadRequest::new(tmp.path()), &cancel, vec![Box::new(sink)])
        .unwrap();

    let all = types(&outcome.events);
    assert_eq!(
        all[all.len() - 2..].to_vec(),
        vec![LoadEventType::FoundFile, LoadEventType::Error]
    );
    assert_eq!(outcome.events[all.len() - 2].path, "a.md");
    let last = outcome.events.last().unwrap();
    assert_eq!(last.error_kind, Some(ErrorKind::Cancelled));
    assert!(last.is_project_error());
    assert!(!all.contains(&LoadEventType::StartedParsingDoc));
    assert!(outcome.project.documents.is_empty());
    assert_eq!(outcome.project.status, ProjectStatus::Error);
    assert_gap_free(&outcome.events);
}

#[test]
fn nested_gitignore_hides_files_below_it() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("sub")).unwrap();
    fs::write(tmp.path().join("sub/.gitignore"), "secret.md\n").unwrap();
    fs::write(tmp.path().join("sub/secret.md"), MIXED).unwrap();
    fs::write(tmp.path().join("sub/open.md"), MIXED).unwrap();

    let outcome = load(&LoadRequest::new(tmp.path()));

    assert!(outcome.is_loaded());
    let paths: Vec<&str> = outcome
        .project
        .documents
        .iter()
        .map(|d| d.relative_path.as_str())
        .collect();
    assert_eq!(paths, vec!["sub/open.md"]);
    assert!(events_for(&outcome.events, "sub/secret.md").is_empty());
    assert_eq!(outcome.stats.ignored, 1);
}

/// Just enough of a `.git` directory for repository discovery.
fn fake_repo(root: &Path) {
    let git = root.join(".git");
    for dir in ["objects", "refs/heads", "info"] {
        fs::create_dir_all(git.join(dir)).unwrap();
    }
    fs::write(git.join("HEAD"), "ref: refs/heads/main\n").unwrap();
    fs::write(
        git.join("config"),
        "[core]\n\trepositoryformatversion = 0\n\tbare = false\n",
    )
    .unwrap();
}

#[test]
fn repository_exclude_is_relative_to_the_work_tree() {
    let tmp = tempfile::tempdir().unwrap();
    fake_repo(tmp.path());
    fs::write(tmp.path().join(".git/info/exclude"), "/proj/drafts/\n").unwrap();
    let project = tmp.path().join("proj");
    fs::create_dir_all(project.join("drafts")).unwrap();
    fs::write(project.join("drafts/x.md"), MIXED).unwrap();
    fs::write(project.join("keep.md"), MIXED).unwrap();

    let outcome = load(&LoadRequest::new(&project));

    assert!(outcome.is_loaded());
    let paths: Vec<&str> = outcome
        .project
        .documents
        .iter()
        .map(|d| d.relative_path.as_str())
        .collect();
    assert_eq!(paths, vec!["keep.md"]);
    assert!(outcome.events.iter().all(|e| !e.path.starts_with("drafts")));

    let without = load(&LoadRequest::new(&project).use_repository_exclude(false));
    assert_eq!(without.project.document_count, 2);
}

#[cfg(unix)]
#[test]
fn non_utf8_file_name_is_parsed() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = tempfile::tempdir().unwrap();
    let name = OsStr::from_bytes(b"caf\xe9.md");
    fs::write(tmp.path().join(name), MIXED).unwrap();

    let outcome = load(&LoadRequest::new(tmp.path()));

    assert!(outcome.is_loaded());
    assert_eq!(outcome.project.documents.len(), 1);
    let doc = &outcome.project.documents[0];
    assert_eq!(doc.status, DocumentStatus::Parsed);
    assert_eq!(doc.tasks.len(), 1);
    assert_eq!(doc.tasks[0].language, "python");
    assert!(
        outcome
            .events
            .iter()
            .all(|e| e.event_type != LoadEventType::Error)
    );
}

#[cfg(unix)]
#[test]
fn rejected_entry_is_not_a_project_error() {
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("leak.md"), MIXED).unwrap();
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("a.md"), MIXED).unwrap();
    std::os::unix::fs::symlink(outside.path(), tmp.path().join("escape")).unwrap();

    let out = tempfile::tempdir().unwrap();
    let trail_path = out.path().join("load.jsonl");
    let writer = TrailWriter::create(&trail_path).unwrap();
    let outcome = ProjectLoader::default()
        .load_into(
            &LoadRequest::new(tmp.path()),
            &CancellationToken::new(),
            vec![Box::new(writer)],
        )
        .unwrap();

    assert!(outcome.is_loaded());
    let rejected = events_for(&outcome.events, "escape");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].error_kind, Some(ErrorKind::PathSecurity));
    assert_eq!(rejected[0].document_ref, None);
    assert!(!rejected[0].is_project_error());

    let mut replayed = read_trail(&trail_path).unwrap();
    assert_eq!(summarize(&replayed).unwrap().outcome, ReplayOutcome::Loaded);
    replayed.pop();
    assert_eq!(
        summarize(&replayed).unwrap().outcome,
        ReplayOutcome::Incomplete
    );
}

#[tokio::test]
async fn spawned_load_streams_events() {
    let tmp = mixed_tree();
    let mut handle =
        ProjectLoader::default().spawn(LoadRequest::new(tmp.path()), CancellationToken::new());

    let mut streamed = Vec::new();
    while let Some(event) = handle.recv().await {
        streamed.push(event);
    }
    let outcome = handle.join().await.unwrap();

    assert!(outcome.is_loaded());
    assert_eq!(streamed, outcome.events);
}

#[test]
fn trail_replays_to_the_same_shape() {
    let tmp = mixed_tree();
    let out = tempfile::tempdir().unwrap();
    let trail_path = out.path().join("trail/load.jsonl");
    let writer = TrailWriter::create(&trail_path).unwrap();

    let outcome = ProjectLoader::default()
        .load_into(
            &LoadRequest::new(tmp.path()),
            &CancellationToken::new(),
            vec![Box::new(writer)],
        )
        .unwrap();

    let replayed = read_trail(&trail_path).unwrap();
    assert_eq!(replayed.len(), outcome.events.len());
    let summary = summarize(&replayed).unwrap();
    assert_eq!(summary.outcome, ReplayOutcome::Loaded);
    assert_eq!(summary.documents.len(), 1);
    assert_eq!(summary.documents[0].path, "a.md");
    assert_eq!(summary.documents[0].tasks.len(), 1);
    assert_eq!(summary.documents[0].tasks[0].language.as_deref(), Some("python"));
    assert!(summary.errors.is_empty());
}

#[test]
fn empty_directory_loads() {
    let tmp = tempfile::tempdir().unwrap();
    let outcome = load(&LoadRequest::new(tmp.path()));
    assert!(outcome.is_loaded());
    assert_eq!(
        types(&outcome.events),
        vec![LoadEventType::StartedWalk, LoadEventType::FinishedWalk]
    );
}

#[test]
fn missing_root_is_an_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let outcome = load(&LoadRequest::new(tmp.path().join("nope")));
    assert_eq!(outcome.project.status, ProjectStatus::Error);
    assert_eq!(outcome.events[0].error_kind, Some(ErrorKind::Io));
    assert!(Path::new(&outcome.project.root_path).ends_with("nope"));
}
