// ── Core error types ──
//
// User-facing errors from condair-core. Consumers never see raw HTTP
// statuses or JSON shape failures; `From<condair_api::Error>` translates
// them into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} (requires {required})")]
    Unsupported { operation: String, required: String },

    #[error("Operation rejected by the cloud: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<condair_api::Error> for CoreError {
    fn from(err: condair_api::Error) -> Self {
        use condair_api::Error as Api;

        match err {
            Api::Authentication { message } | Api::MalformedTokenResponse { message } => {
                CoreError::AuthenticationFailed { message }
            }
            Api::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "not signed in".into(),
            },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            Api::HttpStatus { status: 401 | 403, body } => CoreError::AuthenticationFailed {
                message: if body.is_empty() {
                    "access denied".into()
                } else {
                    body
                },
            },
            Api::HttpStatus { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
                status: Some(status),
            },
            Api::Protocol { message } => CoreError::Internal(format!("Unexpected response: {message}")),
            Api::ActionNotFound { action, device_id } => CoreError::Unsupported {
                operation: action.clone(),
                required: format!("device {device_id} to expose a '{action}' action"),
            },
            Api::ActionRejected { message } => CoreError::Rejected { message },
        }
    }
}

impl CoreError {
    /// Fill in the configured timeout, which the API layer doesn't know.
    pub(crate) fn with_timeout(self, timeout_secs: u64) -> Self {
        match self {
            CoreError::Timeout { .. } => CoreError::Timeout { timeout_secs },
            other => other,
        }
    }
}
