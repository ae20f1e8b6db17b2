//! Clap derive structures for the `nxrm` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nxrm -- reconcile declarative configuration with Sonatype Nexus Repository
#[derive(Debug, Parser)]
#[command(
    name = "nxrm",
    version,
    about = "Manage Sonatype Nexus Repository configuration as code",
    long_about = "Drives the sonatyperepo resource lifecycle from the command line.\n\n\
        Plans and states are JSON documents; every lifecycle command prints the\n\
        resulting state and diagnostics to stdout so a host can persist them.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "NXRM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(long, short = 'p', env = "NXRM_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Nexus base URL (overrides profile)
    #[arg(long, env = "NXRM_URL", global = true)]
    pub url: Option<String>,

    /// Username (overrides profile)
    #[arg(long, short = 'u', env = "NXRM_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password (prefer the keyring or NXRM_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Extra trusted CA certificate (PEM)
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "NXRM_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "NXRM_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "json", global = true)]
    pub output: OutputFormat,

    /// When to use color on stderr
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Pretty table
    Table,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if stderr is a terminal)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every resource and data source type
    #[command(alias = "ls")]
    Types(TypesArgs),

    /// Print the provider schema, or the schema of one type
    Schema(SchemaArgs),

    /// Create a resource from a plan
    Create(PlanArgs),

    /// Refresh a resource's state from the server
    Read(StateArgs),

    /// Apply a plan to an existing resource
    Update(UpdateArgs),

    /// Delete a resource
    #[command(alias = "rm")]
    Delete(StateArgs),

    /// Import an existing remote object by id
    Import(ImportArgs),

    /// Rewrite state saved under an older schema version
    Upgrade(UpgradeArgs),

    /// Read a data source
    #[command(alias = "ds")]
    Data(DataArgs),

    /// Manage the configuration file and stored passwords
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Schema / types ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TypesArgs {
    /// Only list data sources
    #[arg(long, conflicts_with = "resources")]
    pub data_sources: bool,

    /// Only list resources
    #[arg(long)]
    pub resources: bool,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Type name, e.g. sonatyperepo_role
    pub type_name: Option<String>,

    /// Look the name up among data sources
    #[arg(long, requires = "type_name")]
    pub data_source: bool,
}

// ── Lifecycle ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Resource type, e.g. sonatyperepo_repository_maven_hosted
    pub type_name: String,

    /// Plan document (JSON), or `-` for stdin
    #[arg(long)]
    pub plan: PathBuf,
}

#[derive(Debug, Args)]
pub struct StateArgs {
    pub type_name: String,

    /// Prior state document (JSON), or `-` for stdin
    #[arg(long)]
    pub state: PathBuf,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub type_name: String,

    #[arg(long)]
    pub plan: PathBuf,

    #[arg(long)]
    pub state: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub type_name: String,

    /// Import id (name, id, or the fixed key of a singleton)
    pub id: String,
}

#[derive(Debug, Args)]
pub struct UpgradeArgs {
    pub type_name: String,

    /// Schema version the state was written with
    #[arg(long)]
    pub from_version: i64,

    #[arg(long)]
    pub state: PathBuf,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    /// Data source type, e.g. sonatyperepo_repositories
    pub type_name: String,

    /// Data source arguments (JSON), or `-` for stdin
    #[arg(long = "args")]
    pub args: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a profile from the global --url and --username flags
    Init(InitArgs),

    /// Show the resolved configuration (passwords redacted)
    Show,

    /// Print the config file path
    Path,

    /// Store a profile password in the OS keyring, read from stdin
    SetPassword,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Read the password from this environment variable at runtime
    #[arg(long)]
    pub password_env: Option<String>,

    /// Make this the default profile
    #[arg(long)]
    pub default: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    pub shell: clap_complete::Shell,
}
