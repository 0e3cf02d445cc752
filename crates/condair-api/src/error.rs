use thiserror::Error;

/// Top-level error type for the `condair-api` crate.
///
/// Covers every failure mode of the cloud client: authentication, transport,
/// HTTP status, response shape, and action lookup/invocation.
/// `condair-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The sign-in or refresh endpoint answered with an `error` field.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A token response without `access_token` / `refresh_token`.
    #[error("Malformed token response: {message}")]
    MalformedTokenResponse { message: String },

    /// No token held -- `authenticate` has not succeeded yet.
    #[error("Not authenticated -- sign in first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be built.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-2xx response, with the raw body for debugging.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The response did not have the expected shape.
    #[error("Unexpected response: {message}")]
    Protocol { message: String },

    // ── Actions ─────────────────────────────────────────────────────
    /// The device does not expose the named action.
    #[error("No '{action}' action found for device {device_id}")]
    ActionNotFound { action: String, device_id: String },

    /// `invoke-action` answered with an `error` field.
    #[error("Action rejected: {message}")]
    ActionRejected { message: String },
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::MalformedTokenResponse { .. } | Self::NotAuthenticated => true,
            Self::HttpStatus { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { status: 404, .. } | Self::ActionNotFound { .. }
        )
    }
}

/// Render the `error` / `error_description` fields of a response body.
pub(crate) fn describe_error_field(
    error: &serde_json::Value,
    description: Option<&serde_json::Value>,
) -> String {
    let render = |v: &serde_json::Value| match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match description.map(render).filter(|d| !d.is_empty()) {
        Some(desc) => format!("{} - {desc}", render(error)),
        None => render(error),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn describe_error_with_description() {
        let msg = describe_error_field(&json!("invalid_grant"), Some(&json!("bad password")));
        assert_eq!(msg, "invalid_grant - bad password");
    }

    #[test]
    fn describe_error_without_description() {
        assert_eq!(describe_error_field(&json!("bad id"), None), "bad id");
        assert_eq!(describe_error_field(&json!("bad id"), Some(&json!(""))), "bad id");
        assert_eq!(describe_error_field(&json!({"code": 7}), None), r#"{"code":7}"#);
    }

    #[test]
    fn classification() {
        assert!(Error::NotAuthenticated.is_auth_error());
        assert!(
            Error::HttpStatus {
                status: 401,
                body: String::new()
            }
            .is_auth_error()
        );
        assert!(
            Error::HttpStatus {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            Error::ActionNotFound {
                action: "Area OnOff".into(),
                device_id: "A1".into()
            }
            .is_not_found()
        );
        assert!(
            !Error::Protocol {
                message: "x".into()
            }
            .is_transient()
        );
    }
}
