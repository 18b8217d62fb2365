//! End-to-end parsing of realistic literate documents.

use kyo_core::entities::Document;
use kyo_core::enums::IdentityMode;
use kyo_core::ids;
use kyo_parser::{MarkdownParser, TaskExtractor, document_stats};
use pretty_assertions::assert_eq;

const RUNBOOK: &[u8] = b"\xef\xbb\xbf---
owner: ops
---

# Deploy runbook

Check the [status page](https://status.example.com) before starting.

```bash name=preflight timeout=10
./scripts/preflight.sh
```

Expected output:

```console
ok
```

```py
import deploy
deploy.run()
```

```yaml
replicas: 3
```

- rollback notes

  ```bash
  ./scripts/rollback.sh
  ```
";

#[test]
fn runbook_pipeline() {
    let text = MarkdownParser::decode(RUNBOOK.to_vec()).unwrap();
    let tree = MarkdownParser::default().parse(&text).unwrap();
    assert_eq!(tree.frontmatter.as_deref(), Some("owner: ops"));
    assert_eq!(tree.title(), Some("Deploy runbook"));

    let document = Document::pending(
        ids::document_id("/ops", "runbook.md"),
        "runbook.md".into(),
        "/ops/runbook.md".into(),
        RUNBOOK.len() as u64,
    );
    let extractor = TaskExtractor::default();
    let tasks = extractor.extract("/ops", &document, &tree, IdentityMode::Auto);

    let summary: Vec<(&str, &str, bool, u32)> = tasks
        .iter()
        .map(|t| {
            (
                t.name.as_str(),
                t.language.as_str(),
                t.executable,
                t.timeout_seconds,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("preflight", "bash", true, 10),
            ("python-1", "python", true, 60),
            ("yaml-2", "yaml", false, 60),
        ]
    );
    assert!(tasks.iter().all(|t| t.identity == IdentityMode::Cell));
    assert_eq!(tasks[1].code, "import deploy\ndeploy.run()\n");

    let stats = document_stats(&text, &tree, extractor.languages());
    assert_eq!(stats.code_block_count, 4);
    assert_eq!(stats.untagged_block_count, 1);
    assert_eq!(stats.heading_count, 1);
    assert_eq!(stats.link_count, 1);
}

#[test]
fn document_mode_shares_the_document_id() {
    let tree = MarkdownParser::default()
        .parse("```go\npackage main\n```\n\n```rs\nfn main() {}\n```\n")
        .unwrap();
    let document = Document::pending("doc-abc".into(), "x.md".into(), "/x.md".into(), 0);
    let tasks = TaskExtractor::default().extract("/", &document, &tree, IdentityMode::Document);
    assert_eq!(
        tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        vec!["doc-abc#0", "doc-abc#1"]
    );
    assert_eq!(tasks[1].language, "rust");
    assert_eq!(tasks[1].timeout_seconds, 300);
}
