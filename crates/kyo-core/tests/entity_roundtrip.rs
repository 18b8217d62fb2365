//! Serde roundtrip and JsonSchema validation tests for the wire types.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use kyo_core::entities::*;
use kyo_core::enums::*;
use kyo_core::structure::*;
use pretty_assertions::assert_eq;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_task() -> Task {
    let mut attributes = BTreeMap::new();
    attributes.insert("env".to_string(), "dev".to_string());
    Task {
        id: "cel-0123456789ab".into(),
        document_id: "doc-0123456789ab".into(),
        name: "setup".into(),
        language: "python".into(),
        code: "print('hi')\n".into(),
        start_line: 3,
        end_line: 5,
        order_index: 0,
        executable: true,
        timeout_seconds: 60,
        identity: IdentityMode::Cell,
        attributes,
    }
}

fn sample_tree() -> StructuralTree {
    StructuralTree {
        blocks: vec![
            Block::Heading(Heading {
                level: 1,
                text: "Intro".into(),
                start_line: 1,
                end_line: 1,
            }),
            Block::Paragraph(Paragraph {
                text: "Hello".into(),
                start_line: 2,
                end_line: 2,
            }),
            Block::CodeFence(CodeFence {
                info: "python name=setup".into(),
                language: Some("python".into()),
                code: "print('hi')\n".into(),
                start_line: 3,
                end_line: 5,
                terminated: true,
            }),
            Block::Other(OtherBlock {
                kind: OtherKind::List,
                start_line: 6,
                end_line: 7,
            }),
        ],
        links: vec![LinkRef {
            destination: "https://example.com".into(),
            line: 2,
        }],
        frontmatter: Some("title: x".into()),
    }
}

roundtrip_and_validate!(task_roundtrip, Task, sample_task());

roundtrip_and_validate!(tree_roundtrip, StructuralTree, sample_tree());

roundtrip_and_validate!(
    document_roundtrip,
    Document,
    Document {
        id: "doc-0123456789ab".into(),
        relative_path: "guide/intro.md".into(),
        absolute_path: "/work/guide/intro.md".into(),
        status: DocumentStatus::Parsed,
        size_bytes: 64,
        line_count: 7,
        task_count: 1,
        title: Some("Intro".into()),
        content: "# Intro\n".into(),
        tree: sample_tree(),
        stats: DocumentStats {
            word_count: 4,
            reading_time_minutes: 1,
            heading_count: 1,
            code_block_count: 1,
            untagged_block_count: 0,
            link_count: 1,
        },
        tasks: vec![sample_task()],
        error: None,
    }
);

roundtrip_and_validate!(
    load_event_roundtrip,
    LoadEvent,
    LoadEvent {
        event_type: LoadEventType::FoundTask,
        sequence_number: 4,
        path: "guide/intro.md".into(),
        document_ref: Some("doc-0123456789ab".into()),
        task_ref: Some("cel-0123456789ab".into()),
        error_message: None,
        error_kind: None,
        task_name: Some("setup".into()),
        task_language: Some("python".into()),
        document_status: None,
        timestamp: Utc::now(),
        data: serde_json::Value::Null,
        project_scoped: false,
    }
);

roundtrip_and_validate!(
    error_event_roundtrip,
    LoadEvent,
    PendingEvent::error("huge.md", ErrorKind::SizeLimit, "exceeds 52428800 bytes")
        .with_document("doc-0123456789ab")
        .with_data(serde_json::json!({ "size_bytes": 62_914_560 }))
        .stamp(2)
);

roundtrip_and_validate!(
    project_roundtrip,
    Project,
    Project::new(
        "prj-0123456789ab".into(),
        Path::new("/work/guide"),
        IdentityMode::Auto,
        LoadOptions {
            ignore_patterns: vec!["drafts/".into()],
            skip_gitignore: true,
            use_repository_exclude: false,
        },
    )
);

#[test]
fn load_event_wire_shape_uses_documented_field_names() {
    let event = PendingEvent::new(LoadEventType::FoundTask, "a.md")
        .with_task(&sample_task())
        .stamp(7);
    let value = serde_json::to_value(&event).unwrap();
    for key in [
        "event_type",
        "sequence_number",
        "path",
        "document_ref",
        "task_ref",
        "task_name",
        "task_language",
        "timestamp",
    ] {
        assert!(value.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(value["event_type"], "found_task");
    assert_eq!(value["task_language"], "python");
}

#[test]
fn old_events_without_optional_fields_deserialize() {
    let json = r#"{"event_type":"started_walk","sequence_number":0,"path":"/p","timestamp":"2026-01-01T00:00:00Z"}"#;
    let event: LoadEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event.event_type, LoadEventType::StartedWalk);
    assert!(event.data.is_null());
    assert_eq!(event.document_ref, None);
    assert!(!event.project_scoped);
}
