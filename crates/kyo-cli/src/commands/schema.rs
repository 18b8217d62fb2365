use kyo_core::entities::{LoadEvent, Project};
use kyo_loader::ReplaySummary;
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `kyo schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::LoadEvent => schema_for!(LoadEvent),
        SchemaType::Project => schema_for!(Project),
        SchemaType::ReplaySummary => schema_for!(ReplaySummary),
    };
    output(&schema, flags.format)
}
