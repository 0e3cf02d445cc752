// ── Runtime connection configuration ──
//
// Everything needed to reach the cloud and sign in. Carries the password
// but never touches disk; the CLI builds one from a config profile.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one Condair account.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// API gateway (defaults to the production endpoint).
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HubConfig {
    /// Config against the production gateway with the default timeout.
    pub fn new(username: impl Into<String>, password: SecretString) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(condair_api::DEFAULT_BASE_URL)?,
            username: username.into(),
            password,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
