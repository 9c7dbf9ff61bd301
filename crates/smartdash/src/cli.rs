//! Clap derive structures for the `smartdash` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use smartdash_core::{AckFilter, AlertWindow, DeviceStatus, SensorType, Severity};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// smartdash -- IoT devices, telemetry and alerts from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "smartdash",
    version,
    about = "Monitor IoT devices, sensor readings and alerts from the command line",
    long_about = "A terminal client for the Smart Solutions IoT backend.\n\n\
        Sign in once with `smartdash auth login`; the session is kept between\n\
        invocations and re-validated while `dashboard watch` runs.",
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
    /// Backend base URL including /api/v1 (overrides config)
    #[arg(long, short = 'u', env = "SMARTDASH_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format [default: table, or defaults.output from config]
    #[arg(long = "output", short = 'o', env = "SMARTDASH_OUTPUT", global = true)]
    pub output_flag: Option<OutputFormat>,

    /// When to use color output [default: auto, or defaults.color from config]
    #[arg(long = "color", global = true)]
    pub color_flag: Option<ColorMode>,

    /// Effective output format, resolved against the config file.
    #[arg(skip)]
    pub output: OutputFormat,

    /// Effective color mode, resolved against the config file.
    #[arg(skip)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SMARTDASH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "SMARTDASH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
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

#[derive(Debug, Clone, Default, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in, sign out and manage the account
    Auth(AuthArgs),

    /// Manage registered devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Query and record sensor readings
    #[command(alias = "s")]
    Sensors(SensorsArgs),

    /// View and acknowledge alerts
    #[command(alias = "a")]
    Alerts(AlertsArgs),

    /// Overview, map markers and live refresh
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in and store the session
    Login {
        /// Account email
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "SMARTDASH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "SMARTDASH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Drop the stored session
    Logout,

    /// Re-validate the stored session token
    Check,

    /// Show the signed-in user's profile
    Whoami {
        /// Look up another user id instead
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Update profile fields
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Change the account password (prompts for all three fields)
    ChangePassword,

    /// Request a password reset link
    ForgotPassword {
        email: String,
    },
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List {
        /// Only devices with this status
        #[arg(long, value_parser = parse_device_status)]
        status: Option<DeviceStatus>,

        /// Only devices of this type
        #[arg(long = "type")]
        device_type: Option<String>,

        /// Only devices at this location
        #[arg(long)]
        location: Option<String>,

        /// Case-insensitive search over name and location
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show one device
    Get {
        id: i64,
    },

    /// Register a device
    Create(DeviceFields),

    /// Replace a device's editable fields
    Update {
        id: i64,

        #[command(flatten)]
        fields: DeviceFields,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        id: i64,
    },

    /// Online / offline / active counts
    Summary,
}

#[derive(Debug, Args)]
pub struct DeviceFields {
    #[arg(long)]
    pub name: String,

    #[arg(long = "type")]
    pub device_type: String,

    #[arg(long)]
    pub location: String,

    #[arg(long, default_value = "Active", value_parser = parse_device_status)]
    pub status: DeviceStatus,
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorsArgs {
    #[command(subcommand)]
    pub command: SensorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SensorsCommand {
    /// Time series of one device
    Data {
        device: i64,

        /// Only this sensor type
        #[arg(long = "type", short = 't', value_parser = parse_sensor_type)]
        sensor_type: Option<SensorType>,

        /// Window length in days, ending now
        #[arg(long, default_value = "7")]
        days: i64,
    },

    /// Latest reading per device and sensor type
    Latest {
        #[arg(long = "type", short = 't', value_parser = parse_sensor_type)]
        sensor_type: Option<SensorType>,
    },

    /// Sensors available on a device
    List {
        device: i64,
    },

    /// Record a reading
    Add {
        device: i64,

        #[arg(value_parser = parse_sensor_type)]
        sensor_type: SensorType,

        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts
    #[command(alias = "ls")]
    List {
        #[arg(long, value_parser = parse_severity)]
        severity: Option<Severity>,

        /// acknowledged | unacknowledged
        #[arg(long, value_parser = parse_ack)]
        status: Option<AckFilter>,

        #[arg(long)]
        device: Option<i64>,

        /// 1h | 24h | 7d | 30d | all
        #[arg(long, value_parser = parse_window)]
        range: Option<AlertWindow>,
    },

    /// Alerts nobody has acknowledged yet
    Unread,

    /// Acknowledge an alert
    #[command(alias = "ack")]
    Acknowledge {
        id: i64,
    },
}

// ── Dashboard ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(subcommand)]
    pub command: DashboardCommand,
}

#[derive(Debug, Subcommand)]
pub enum DashboardCommand {
    /// Latest readings, device summary and open alerts
    Overview,

    /// Devices that carry coordinates
    Map,

    /// Keep refreshing until interrupted
    Watch {
        /// Refresh period in seconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value
    Set {
        /// Config key (e.g. "api.base_url", "polling.refresh_secs")
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_device_status(s: &str) -> Result<DeviceStatus, String> {
    s.parse()
        .map_err(|_| format!("expected one of: active, inactive, maintenance, retired (got '{s}')"))
}

fn parse_sensor_type(s: &str) -> Result<SensorType, String> {
    s.parse().map_err(|_| format!("unknown sensor type '{s}'"))
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    s.parse()
        .map_err(|_| format!("expected one of: low, medium, high, critical (got '{s}')"))
}

fn parse_ack(s: &str) -> Result<AckFilter, String> {
    s.parse()
        .map_err(|_| format!("expected acknowledged or unacknowledged (got '{s}')"))
}

fn parse_window(s: &str) -> Result<AlertWindow, String> {
    s.parse()
        .map_err(|_| format!("expected one of: 1h, 24h, 7d, 30d, all (got '{s}')"))
}
