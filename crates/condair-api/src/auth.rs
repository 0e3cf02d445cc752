// Token lifecycle
//
// Sign-in, refresh, and the "ensure valid" gate every data call goes
// through. The username/password pair is retained here (and only here) so a
// rejected refresh token can fall back to one fresh sign-in.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::client::CondairClient;
use crate::error::{Error, describe_error_field};

const SIGN_IN: &str = "userapi/users/signin";
const REFRESH: &str = "userapi/users/refresh";

/// Lifetime assumed when `expires_in` is absent or unparsable.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Tokens are treated as expired this long before the server says so.
pub const EXPIRY_MARGIN_SECS: i64 = 30;

/// Username/password kept for re-authentication. Never logged.
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    username: String,
    password: SecretString,
}

/// Access/refresh tokens plus the (margin-adjusted) expiry deadline.
#[derive(Debug, Default)]
pub(crate) struct TokenState {
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
    credentials: Option<Credentials>,
}

impl TokenState {
    pub(crate) fn bearer(&self) -> Option<&str> {
        self.access_token.as_ref().map(ExposeSecret::expose_secret)
    }

    /// Usable for a request at `now`: a token is held and the deadline
    /// has not passed.
    pub(crate) fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && self.expires_at.is_some_and(|deadline| now < deadline)
    }

    /// Store a fresh grant and return the lifetime (seconds) it was issued with.
    fn store(&mut self, grant: TokenGrant, now: DateTime<Utc>) -> i64 {
        self.access_token = Some(grant.access_token);
        self.refresh_token = Some(grant.refresh_token);
        self.expires_at = Some(expiry_deadline(now, grant.expires_in));
        grant.expires_in
    }
}

/// `now + expires_in - margin`, saturating on absurd lifetimes.
pub(crate) fn expiry_deadline(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let usable = expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
    TimeDelta::try_seconds(usable)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if usable < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

// ── Token response parsing ──────────────────────────────────────────

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

struct TokenGrant {
    access_token: SecretString,
    refresh_token: SecretString,
    expires_in: i64,
}

/// Accepts `3600` or `"3600"`; anything else falls back to the default.
fn token_lifetime(raw: Option<&Value>) -> i64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
}

/// Validate a sign-in/refresh response body.
fn parse_token_reply(reply: Value) -> Result<TokenGrant, Error> {
    if !reply.is_object() {
        return Err(Error::MalformedTokenResponse {
            message: format!("expected an object, got {reply}"),
        });
    }
    if let Some(err) = reply.get("error") {
        return Err(Error::Authentication {
            message: describe_error_field(err, reply.get("error_description")),
        });
    }

    let resp: TokenResponse =
        serde_json::from_value(reply).map_err(|e| Error::MalformedTokenResponse {
            message: e.to_string(),
        })?;

    Ok(TokenGrant {
        access_token: SecretString::from(resp.access_token),
        refresh_token: SecretString::from(resp.refresh_token),
        expires_in: token_lifetime(resp.expires_in.as_ref()),
    })
}

// ── Client operations ───────────────────────────────────────────────

impl CondairClient {
    /// Sign in with username/password.
    ///
    /// `POST userapi/users/signin`. On success both tokens are stored and
    /// the credentials are kept for re-authentication.
    pub async fn authenticate(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let grant = self
            .post_redacted(SIGN_IN, &body)
            .await
            .and_then(parse_token_reply)
            .inspect_err(|e| error!("Login failed: {e}"))?;

        self.tokens.credentials = Some(Credentials {
            username: username.to_owned(),
            password: password.clone(),
        });
        let lifetime = self.tokens.store(grant, Utc::now());
        info!(expires_in = lifetime, "authenticated");
        Ok(())
    }

    /// Exchange the refresh token for a new token pair.
    ///
    /// `POST userapi/users/refresh`. A rejected refresh (error field,
    /// non-2xx status, or malformed body) falls back to exactly one
    /// sign-in with the stored credentials. Transport failures do not.
    pub async fn refresh_access_token(&mut self) -> Result<(), Error> {
        let Some(refresh_token) = self.tokens.refresh_token.clone() else {
            error!("No refresh token available.");
            return Err(Error::NotAuthenticated);
        };

        let body = json!({ "refresh_token": refresh_token.expose_secret() });

        let outcome = match self.post_redacted(REFRESH, &body).await {
            Ok(reply) => parse_token_reply(reply),
            Err(e @ (Error::Transport(_) | Error::InvalidUrl(_) | Error::Tls(_))) => {
                error!("Network error refreshing token: {e}");
                return Err(e);
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(grant) => {
                let lifetime = self.tokens.store(grant, Utc::now());
                info!(expires_in = lifetime, "token refreshed");
                Ok(())
            }
            Err(cause) => {
                error!("Refresh token error: {cause}");
                self.reauthenticate(cause).await
            }
        }
    }

    async fn reauthenticate(&mut self, cause: Error) -> Result<(), Error> {
        let Some(creds) = self.tokens.credentials.clone() else {
            error!("No username/password to re-authenticate.");
            return Err(cause);
        };
        warn!("Trying to re-authenticate.");
        self.authenticate(&creds.username, &creds.password).await
    }

    /// Make sure the access token is usable, refreshing it if expired.
    ///
    /// No network traffic while the token is fresh.
    pub async fn ensure_valid(&mut self) -> Result<(), Error> {
        if self.tokens.access_token.is_none() {
            warn!("No access token; must authenticate first.");
            return Err(Error::NotAuthenticated);
        }

        if self.tokens.is_valid_at(Utc::now()) {
            return Ok(());
        }

        debug!("Token expired or expiring soon, refreshing.");
        self.refresh_access_token().await
    }

    /// Whether an access token has been obtained.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token.is_some()
    }

    /// Margin-adjusted expiry of the current access token.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.tokens.expires_at
    }
}
