//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// extsync - keep installed editor extensions in line with a desired list
#[derive(Parser, Debug)]
#[command(name = "extsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install, update and remove extensions to match a desired list
    Sync(SyncArgs),

    /// Show what a sync would change without touching anything
    Diff(DiffArgs),

    /// List installed extensions
    List(ListArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Overrides applied on top of the loaded configuration
#[derive(Args, Debug, Default)]
pub struct SyncOverrides {
    /// Extensions directory (default: ~/.vscode/extensions)
    #[arg(long, env = "EXTSYNC_EXTENSIONS_DIR")]
    pub extensions_dir: Option<Utf8PathBuf>,

    /// Glob of extension ids never removed (repeatable, case-insensitive)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Query the registry and move desired extensions to their latest version
    #[arg(long)]
    pub auto_update: bool,

    /// Proxy URL for registry queries and downloads
    #[arg(long)]
    pub proxy: Option<String>,
}

// Sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// JSON file listing the desired extensions
    #[arg(short, long)]
    pub desired: Utf8PathBuf,

    #[command(flatten)]
    pub overrides: SyncOverrides,

    /// Do not show a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

// Diff command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// JSON file listing the desired extensions
    #[arg(short, long)]
    pub desired: Utf8PathBuf,

    #[command(flatten)]
    pub overrides: SyncOverrides,

    /// Output the plan as JSON
    #[arg(long)]
    pub json: bool,
}

// List command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Extensions directory (default: ~/.vscode/extensions)
    #[arg(long, env = "EXTSYNC_EXTENSIONS_DIR")]
    pub extensions_dir: Option<Utf8PathBuf>,

    /// Hide extensions matching this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}
