use anyhow::Context;
use kyo_loader::{read_trail, summarize};

use crate::cli::GlobalFlags;
use crate::cli::OutputFormat;
use crate::cli::root_commands::ReplayArgs;
use crate::output::output;

/// Handle `kyo replay`.
pub fn handle(args: &ReplayArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let events = read_trail(&args.trail)
        .with_context(|| format!("failed to read trail {}", args.trail.display()))?;
    let summary = summarize(&events)?;

    if flags.format == OutputFormat::Table {
        let rows: Vec<serde_json::Value> = summary
            .documents
            .iter()
            .map(|doc| {
                serde_json::json!({
                    "path": doc.path,
                    "status": doc.status,
                    "tasks": doc.tasks.len(),
                })
            })
            .collect();
        output(&rows, flags.format)?;
        if !flags.quiet {
            eprintln!(
                "{} events, outcome {}",
                summary.event_count,
                serde_json::to_value(summary.outcome)?
                    .as_str()
                    .unwrap_or("unknown")
            );
        }
        return Ok(());
    }
    output(&summary, flags.format)
}
