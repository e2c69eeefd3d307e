//! Clap derive structures for the `pb` CLI.
//!
//! Defines the command tree, global flags, and shared enums. Also compiled
//! by `build.rs` for man page generation, so it depends on clap only.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pb -- Pushbullet from the command line
#[derive(Debug, Parser)]
#[command(
    name = "pb",
    version,
    about = "Send pushes, list devices and listen for events on Pushbullet",
    long_about = "A command-line client for the Pushbullet service.\n\n\
        Push notes and links to your devices, list the devices on your\n\
        account, and watch pushes, mirrored notifications and device\n\
        changes arrive live.",
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
    /// Pushbullet API key (overrides the config file)
    #[arg(long, env = "PB_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// REST API root
    #[arg(long, env = "PB_API_URL", global = true, hide = true)]
    pub api_url: Option<String>,

    /// Realtime stream root
    #[arg(long, env = "PB_STREAM_URL", global = true, hide = true)]
    pub stream_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PB_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase log verbosity (-L, -LL, -LLL)
    #[arg(long = "log", short = 'L', action = clap::ArgAction::Count, global = true)]
    pub log_level: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "PB_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Show or change the stored configuration
    Config(ConfigArgs),

    /// Inspect the devices on your account
    #[command(alias = "devices", alias = "dev")]
    Device(DeviceArgs),

    /// Send a note or a link
    Push(PushArgs),

    /// Print pushes, ephemerals and device changes as they arrive
    Listen,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display every config field with its value and meaning
    Show {
        /// Show secret values instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Set a configuration value
    Set {
        /// Field name (see `pb config show`)
        name: String,

        /// Value to store; an empty string clears the field
        value: String,
    },

    /// Prompt for the API key without echoing it
    SetKey,

    /// Print the config file location
    Path,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// List active devices
    #[command(alias = "ls")]
    List(DeviceListArgs),
}

#[derive(Debug, Args)]
pub struct DeviceListArgs {
    /// Include fingerprints and push tokens
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Only show this device (index, nickname, model or iden)
    #[arg(long, short = 'd')]
    pub device: Option<String>,
}

// ── Pushes ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PushArgs {
    #[command(subcommand)]
    pub command: PushCommand,
}

#[derive(Debug, Subcommand)]
pub enum PushCommand {
    /// Push a note
    Note(NoteArgs),

    /// Push a link
    Link(LinkArgs),
}

#[derive(Debug, Args)]
pub struct NoteArgs {
    /// Target device (index, nickname, model or iden); all devices if omitted
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Title of the note
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Body of the note
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Target device (index, nickname, model or iden); all devices if omitted
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// URL to push
    #[arg(long, short = 'u')]
    pub url: String,

    /// Title of the link
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Message sent along with the link
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
