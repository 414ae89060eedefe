//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use adminly_config::ConfigError;
use adminly_core::{CoreError, ErrorKind, MutationOutcome};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PARTIAL: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the admin API")]
    #[diagnostic(
        code(adminly::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(adminly::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not authorized: {message}")]
    #[diagnostic(
        code(adminly::unauthorized),
        help(
            "The token is missing or was rejected.\n\
             Run: adminly config set-token"
        )
    )]
    Unauthorized { message: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(adminly::no_credentials),
        help(
            "Configure credentials with: adminly config init\n\
             Or set the ADMINLY_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(adminly::not_found),
        help("Run: adminly {list_command} to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Page {page} is out of range (last page is {last_page})")]
    #[diagnostic(code(adminly::page_out_of_range))]
    PageOutOfRange { page: u32, last_page: u32 },

    #[error("{failed} of {total} {action} operations failed")]
    #[diagnostic(
        code(adminly::partial_failure),
        help("The ids that failed are listed above; the rest were applied.")
    )]
    PartialFailure {
        action: String,
        failed: usize,
        total: usize,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Server error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    #[diagnostic(code(adminly::server_error))]
    Server { message: String, status: Option<u16> },

    #[error("Unexpected response from the admin API: {message}")]
    #[diagnostic(
        code(adminly::malformed),
        help("Run with -vv to see the request, or check the API version.")
    )]
    Malformed { message: String },

    #[error("Export failed: {message}")]
    #[diagnostic(code(adminly::export))]
    Export { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(adminly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(adminly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: adminly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(adminly::no_config),
        help(
            "Create a profile with: adminly config init\n\
             Expected at: {path}\n\
             Or pass --api-url and --token."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(adminly::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Prompt failed: {reason}")]
    #[diagnostic(
        code(adminly::prompt),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    Prompt { reason: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(adminly::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Unauthorized { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PartialFailure { .. } => exit_code::PARTIAL,
            Self::Validation { .. }
            | Self::PageOutOfRange { .. }
            | Self::Prompt { .. }
            | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// A failed mutation only carries its classification and message.
    pub fn from_outcome<T>(outcome: &MutationOutcome<T>) -> Self {
        let message = outcome
            .message
            .clone()
            .unwrap_or_else(|| "operation failed".into());
        match outcome.error_kind {
            Some(ErrorKind::Unauthorized) => Self::Unauthorized { message },
            Some(ErrorKind::Network) => Self::ConnectionFailed { reason: message },
            Some(ErrorKind::ServerError) => Self::Server {
                message,
                status: None,
            },
            Some(ErrorKind::Malformed) => Self::Malformed { message },
            Some(ErrorKind::ValidationFailed) => Self::Validation {
                field: "draft".into(),
                reason: message,
            },
            Some(ErrorKind::Unknown) | None => Self::Config { message },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { message } => CliError::Unauthorized { message },
            CoreError::Network { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Server { message, status } => CliError::Server { message, status },
            CoreError::Malformed { message } => CliError::Malformed { message },
            CoreError::ValidationFailed { field, reason } => CliError::Validation { field, reason },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Export { message } => CliError::Export { message },
            CoreError::Internal(message) => CliError::Server {
                message,
                status: None,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
