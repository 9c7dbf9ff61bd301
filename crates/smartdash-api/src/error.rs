use thiserror::Error;

/// Top-level error type for the `smartdash-api` crate.
///
/// Covers every failure mode of the HTTP gateway: transport, URL
/// construction, server rejections, and payload decoding.
/// `smartdash-core` maps these into container error strings.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A header value could not be encoded (e.g. a token with control characters).
    #[error("Invalid header value for {header}")]
    InvalidHeader { header: &'static str },

    // ── Server ──────────────────────────────────────────────────────
    /// Non-2xx response. `message` is the `message` field of the JSON
    /// error body when the server sent one.
    #[error("Request rejected (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// A success envelope arrived without the payload the endpoint promises.
    #[error("Response from {endpoint} carried no data")]
    MissingData { endpoint: &'static str },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The human-readable message carried by the server's error payload.
    pub fn payload_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of a server rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for 401/403 rejections.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if this is a transient error worth re-issuing.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16, message: Option<&str>) -> Error {
        Error::Rejected {
            status,
            message: message.map(String::from),
            body: String::new(),
        }
    }

    #[test]
    fn payload_message_only_for_rejections() {
        assert_eq!(
            rejected(400, Some("Email already in use")).payload_message(),
            Some("Email already in use")
        );
        assert_eq!(rejected(500, None).payload_message(), None);
        assert_eq!(
            Error::MissingData { endpoint: "x" }.payload_message(),
            None
        );
    }

    #[test]
    fn status_classification() {
        assert!(rejected(401, None).is_unauthorized());
        assert!(rejected(403, None).is_unauthorized());
        assert!(rejected(404, None).is_not_found());
        assert!(rejected(503, None).is_transient());
        assert!(!rejected(422, None).is_transient());
    }

    #[test]
    fn display_falls_back_when_no_message() {
        assert_eq!(
            rejected(500, None).to_string(),
            "Request rejected (HTTP 500): no message"
        );
    }
}
