// ── Core error types ──
//
// Errors surfaced by smartdash-core intents. Transport details are
// translated by the `From<smartdash_api::Error>` impl; the server's payload
// message is kept so rejected transitions can show it.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors (never reach the network) ───────────────────────
    #[error("Invalid {field}: {message}")]
    ValidationFailed { field: &'static str, message: String },

    #[error("Not signed in")]
    NotAuthenticated,

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Server rejections ────────────────────────────────────────────
    #[error("Authentication failed: {}", message.as_deref().unwrap_or("credentials rejected"))]
    AuthenticationFailed { status: u16, message: Option<String> },

    #[error("Not found: {}", message.as_deref().unwrap_or(resource))]
    NotFound {
        resource: String,
        message: Option<String>,
    },

    #[error("API error{}: {}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default(), message.as_deref().unwrap_or(detail))]
    Api {
        status: Option<u16>,
        message: Option<String>,
        detail: String,
    },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Session storage error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The human-readable `message` from the server's failure payload.
    pub fn payload_message(&self) -> Option<&str> {
        match self {
            Self::AuthenticationFailed { message, .. }
            | Self::NotFound { message, .. }
            | Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<smartdash_api::Error> for CoreError {
    fn from(err: smartdash_api::Error) -> Self {
        use smartdash_api::Error as ApiError;

        match err {
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        status: e.status().map(|s| s.as_u16()),
                        message: None,
                        detail: e.to_string(),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            ApiError::InvalidHeader { header } => CoreError::Session {
                message: format!("stored session cannot be sent as {header}"),
            },
            ApiError::Rejected {
                status: status @ (401 | 403),
                message,
                ..
            } => CoreError::AuthenticationFailed { status, message },
            ApiError::Rejected {
                status: 404,
                message,
                body: _,
            } => CoreError::NotFound {
                resource: "resource".into(),
                message,
            },
            ApiError::Rejected {
                status,
                message,
                body,
            } => CoreError::Api {
                status: Some(status),
                message,
                detail: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
            },
            ApiError::MissingData { endpoint } => CoreError::Api {
                status: None,
                message: None,
                detail: format!("response from {endpoint} carried no data"),
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
