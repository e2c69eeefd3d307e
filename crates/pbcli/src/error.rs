//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and the process exit code for each.

use miette::Diagnostic;
use thiserror::Error;

use pbcli_config::ConfigError;
use pbcli_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const SERVICE: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Usage ────────────────────────────────────────────────────────

    #[error("Failed to locate device identified by {identifier}")]
    #[diagnostic(
        code(pb::not_found),
        help(
            "A device can be named by its index, nickname, model or iden.\n\
             Run: pb device list"
        )
    )]
    DeviceNotFound { identifier: String },

    #[error("Unknown config field '{name}'")]
    #[diagnostic(code(pb::unknown_field), help("Available fields: {available}"))]
    UnknownField { name: String, available: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pb::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No API key configured")]
    #[diagnostic(
        code(pb::no_credentials),
        help(
            "Store one with: pb config set key <KEY>  (or: pb config set-key)\n\
             Or set the PB_KEY environment variable.\n\
             Config file: {path}"
        )
    )]
    NoCredentials { path: String },

    #[error("Could not write config file {path}")]
    #[diagnostic(code(pb::config_write), help("Check that the directory exists and is writable."))]
    ConfigWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(pb::config))]
    Config { message: String },

    // ── Service ──────────────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(pb::auth_failed),
        help(
            "Check your API key. A new one can be created under\n\
             Settings > Account on pushbullet.com."
        )
    )]
    AuthFailed { message: String },

    #[error("Could not connect to {url}")]
    #[diagnostic(code(pb::connection_failed), help("Check your network connection."))]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(pb::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(pb::api_error))]
    ApiError { code: String, message: String },

    #[error("No devices found")]
    #[diagnostic(
        code(pb::no_devices),
        help("Install Pushbullet on a device and sign in with this account.")
    )]
    NoDevices,

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceNotFound { .. } | Self::UnknownField { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            Self::NoCredentials { .. } | Self::ConfigWrite { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::AuthFailed { .. }
            | Self::ConnectionFailed { .. }
            | Self::Timeout
            | Self::ApiError { .. }
            | Self::NoDevices => exit_code::SERVICE,
            Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::DeviceNotFound { identifier } => CliError::DeviceNotFound { identifier },
            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownField { name } => CliError::UnknownField {
                name,
                available: pbcli_config::CONFIG_FIELDS
                    .iter()
                    .map(|f| f.name)
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            ConfigError::NoCredentials => CliError::NoCredentials {
                path: pbcli_config::config_path().display().to_string(),
            },
            ConfigError::Write { path, source } => CliError::ConfigWrite {
                path: path.display().to_string(),
                source,
            },
            other @ (ConfigError::Validation { .. }
            | ConfigError::Serialization(_)
            | ConfigError::Figment(_)) => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
