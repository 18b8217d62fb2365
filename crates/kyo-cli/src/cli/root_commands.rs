use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use kyo_core::enums::{IdentityMode, KindHint};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Load a markdown project and report its documents and tasks.
    Load(LoadArgs),
    /// Summarize a JSONL load trail written by `kyo load --trail`.
    Replay(ReplayArgs),
    /// Print the JSON schema of a wire type.
    Schema(SchemaArgs),
}

/// Arguments for `kyo load`.
#[derive(Clone, Debug, Args)]
pub struct LoadArgs {
    /// Project root: a directory or a single markdown file.
    pub path: PathBuf,
    /// Expected root kind: auto, directory, file.
    #[arg(long)]
    pub kind: Option<KindHint>,
    /// Do not read `.gitignore` or the repository exclude file.
    #[arg(long)]
    pub skip_gitignore: bool,
    /// Extra gitignore-style pattern (repeatable).
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,
    /// Task identity mode: auto, document, cell.
    #[arg(long)]
    pub identity: Option<IdentityMode>,
    /// Skip the enclosing repository's `info/exclude`.
    #[arg(long)]
    pub no_repo_exclude: bool,
    /// Append every event to this JSONL file.
    #[arg(long, value_name = "FILE")]
    pub trail: Option<PathBuf>,
    /// Print events as JSON lines while the load runs.
    #[arg(long)]
    pub stream: bool,
}

/// Arguments for `kyo replay`.
#[derive(Clone, Debug, Args)]
pub struct ReplayArgs {
    pub trail: PathBuf,
}

/// Arguments for `kyo schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    pub type_name: SchemaType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    LoadEvent,
    Project,
    ReplaySummary,
}
