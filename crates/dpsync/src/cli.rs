//! Clap derive structures for the `dpsync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dpsync -- copy distribution point content between nodes
#[derive(Debug, Parser)]
#[command(
    name = "dpsync",
    version,
    about = "Copy content from one distribution point to another",
    long_about = "Walks an operator through copying distribution point content\n\
        between nodes of a management site: pick a source and a target,\n\
        then every content item across the seven standard categories is\n\
        distributed to the target, with per-category and overall accounting.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "DPSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Management server URL (overrides profile)
    #[arg(long, short = 'c', env = "DPSYNC_SERVER", global = true)]
    pub server: Option<String>,

    /// Site code (overrides profile)
    #[arg(long, short = 's', env = "DPSYNC_SITE", global = true)]
    pub site: Option<String>,

    /// API key
    #[arg(long, env = "DPSYNC_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format (config `[defaults]` applies when omitted)
    #[arg(long, short = 'o', env = "DPSYNC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (config `[defaults]` applies when omitted)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DPSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (profile or config default when omitted)
    #[arg(long, env = "DPSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Append run records to this log file
    #[arg(long, env = "DPSYNC_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

impl GlobalOpts {
    /// Effective output format, after config defaults have been merged
    /// (see [`config::apply_defaults`](crate::config::apply_defaults)).
    pub fn output_format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    /// Effective color mode, after config defaults have been merged.
    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy all content from a source node to a target node
    #[command(alias = "s")]
    Sync(SyncArgs),

    /// Inspect distribution points
    #[command(alias = "dp")]
    Nodes(NodesArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sync ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Source node id or name (prompted interactively when omitted)
    #[arg(long)]
    pub source: Option<String>,

    /// Target node id or name (prompted interactively when omitted)
    #[arg(long)]
    pub target: Option<String>,

    /// Pause between items in milliseconds (overrides config default)
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,

    /// Per-item timeout in seconds (no timeout when omitted)
    #[arg(long = "item-timeout")]
    pub item_timeout: Option<u64>,
}

// ── Nodes ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// List the site's distribution points
    #[command(alias = "ls")]
    List,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactively create or update a profile
    Init,

    /// Show the effective configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
