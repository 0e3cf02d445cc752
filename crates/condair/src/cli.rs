//! Clap derive structures for the `condair` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Shortest polling interval `watch` accepts; the cloud refreshes
/// datapoints no faster than this.
pub const MIN_WATCH_INTERVAL_SECS: u64 = 30;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// condair -- control Condair humidifiers from the command line
#[derive(Debug, Parser)]
#[command(
    name = "condair",
    version,
    about = "Monitor and control Condair humidifiers from the command line",
    long_about = "A CLI for Condair cloud-connected humidifiers.\n\n\
        Reads humidity and temperature, toggles power, and sets the\n\
        target humidity through the Condair cloud API.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "CONDAIR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "CONDAIR_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Account username (overrides profile)
    #[arg(long, short = 'u', env = "CONDAIR_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CONDAIR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CONDAIR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// List humidifiers on the account
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List households (parent instances)
    #[command(alias = "hh")]
    Households,

    /// Show the latest readings for a device
    #[command(alias = "st")]
    Status(DeviceArg),

    /// Turn a device on
    On(DeviceArg),

    /// Turn a device off
    Off(DeviceArg),

    /// Set the target relative humidity
    Humidity(HumidityArgs),

    /// List the remote actions a device exposes
    Actions(DeviceArg),

    /// Poll readings at a fixed interval until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List all devices
    #[command(alias = "ls")]
    List,

    /// Show one device
    Get {
        /// Device unique id
        device_id: String,
    },
}

#[derive(Debug, Args)]
pub struct DeviceArg {
    /// Device unique id
    pub device_id: String,
}

#[derive(Debug, Args)]
pub struct HumidityArgs {
    /// Device unique id
    pub device_id: String,

    /// Target relative humidity in percent (0-100)
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    pub percent: u8,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only watch this device
    pub device_id: Option<String>,

    /// Seconds between polls (minimum 30)
    #[arg(
        long,
        short = 'i',
        default_value = "60",
        value_parser = clap::value_parser!(u64).range(MIN_WATCH_INTERVAL_SECS..)
    )]
    pub interval: u64,

    /// Stop after this many polls
    #[arg(long, short = 'n')]
    pub count: Option<u32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: base_url, username, password_env, timeout
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
