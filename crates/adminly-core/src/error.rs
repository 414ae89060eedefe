// ── Core error types ──
//
// User-facing errors from adminly-core. Consumers never see HTTP status
// codes or JSON parse failures directly; `From<adminly_api::Error>`
// translates transport-layer errors into the dashboard taxonomy, and
// `ErrorKind` is the coarse classification the view layer branches on.

use serde::Serialize;
use strum::{Display, EnumString};
use thiserror::Error;

/// Coarse error classification exposed to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credential absent or rejected.
    Unauthorized,
    /// Transport failure or timeout.
    Network,
    /// Non-2xx response or `success: false` envelope.
    ServerError,
    /// Response did not match the expected envelope shape.
    Malformed,
    /// Client-side payload validation; never reaches the gateway.
    ValidationFailed,
    Unknown,
}

/// Unified error type for the core crate.
///
/// `Clone` so the controller can keep the last failure in its published
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Auth ─────────────────────────────────────────────────────────
    #[error("Not authorized: {message}")]
    Unauthorized { message: String },

    // ── Network ──────────────────────────────────────────────────────
    #[error("Cannot reach backend: {reason}")]
    Network { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Server error: {message}")]
    Server {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Unexpected response shape: {message}")]
    Malformed { message: String },

    // ── Client-side ──────────────────────────────────────────────────
    #[error("Validation failed on {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Export failed: {message}")]
    Export { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Classify this error for the view layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Network { .. } | Self::Timeout { .. } => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::ServerError,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::Config { .. } | Self::Export { .. } | Self::Internal(_) => ErrorKind::Unknown,
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<adminly_api::Error> for CoreError {
    fn from(err: adminly_api::Error) -> Self {
        match err {
            adminly_api::Error::MissingCredential => CoreError::Unauthorized {
                message: "no credential available".into(),
            },
            adminly_api::Error::Unauthorized { status } => CoreError::Unauthorized {
                message: format!("credential rejected (HTTP {status})"),
            },
            adminly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::Network {
                        reason: e.to_string(),
                    }
                }
            }
            adminly_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            adminly_api::Error::Tls(msg) => CoreError::Network {
                reason: format!("TLS error: {msg}"),
            },
            adminly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            adminly_api::Error::Server { status, message } => CoreError::Server {
                message,
                status: Some(status),
            },
            adminly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Malformed { message }
            }
            adminly_api::Error::MalformedEnvelope(message) => CoreError::Malformed { message },
        }
    }
}
