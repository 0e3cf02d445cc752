// Condair cloud HTTP client
//
// Wraps the session manager with base-URL construction, bearer auth, and
// uniform response handling. Endpoint groups (auth, devices, actions) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::TokenState;
use crate::error::Error;
use crate::session::Session;
use crate::transport::TransportConfig;

/// Production API gateway.
pub const DEFAULT_BASE_URL: &str = "https://hlkc-api-management.azure-api.net";

/// Raw HTTP client for the Condair cloud API.
///
/// Every network operation takes `&mut self`: the client does no internal
/// locking, so callers serialize access (see `condair_core::Hub`).
#[derive(Debug)]
pub struct CondairClient {
    base_url: Url,
    session: Session,
    pub(crate) tokens: TokenState,
}

impl CondairClient {
    /// Create a client. No connection is made until the first request.
    pub fn new(base_url: Url, transport: TransportConfig) -> Self {
        Self {
            base_url,
            session: Session::new(transport),
            tokens: TokenState::default(),
        }
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(base_url: Url, http: reqwest::Client) -> Self {
        Self {
            base_url,
            session: Session::with_client(http),
            tokens: TokenState::default(),
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether an HTTP session is currently open.
    pub fn has_session(&self) -> bool {
        self.session.is_open()
    }

    /// Release the HTTP session. Safe to call more than once; a later
    /// request opens a fresh session.
    pub fn close_session(&mut self) {
        if self.session.close() {
            debug!("closed HTTP session");
        } else {
            debug!("HTTP session already closed");
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}/{endpoint}`, tolerant of slashes on either side.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{endpoint}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach the bearer token, if one is held.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send an authenticated GET request.
    pub async fn get(&mut self, endpoint: &str) -> Result<Value, Error> {
        let url = self.endpoint_url(endpoint)?;
        debug!("GET {}", url);

        let http = self.session.acquire()?;
        let resp = self
            .authorize(http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        read_body(resp).await
    }

    /// Send an authenticated POST request with a JSON body.
    pub async fn post(&mut self, endpoint: &str, body: &(impl Serialize + Sync)) -> Result<Value, Error> {
        let url = self.endpoint_url(endpoint)?;
        let payload = serde_json::to_string_pretty(body).unwrap_or_else(|e| format!("<{e}>"));
        debug!("POST {}\nSending JSON:\n{}", url, payload);
        self.send_post(url, body).await
    }

    /// POST without logging the body. Used for credential and token exchanges.
    pub(crate) async fn post_redacted(
        &mut self,
        endpoint: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Value, Error> {
        let url = self.endpoint_url(endpoint)?;
        debug!("POST {} (body redacted)", url);
        self.send_post(url, body).await
    }

    async fn send_post(&mut self, url: Url, body: &(impl Serialize + Sync)) -> Result<Value, Error> {
        let http = self.session.acquire()?;
        let resp = self
            .authorize(http.post(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        read_body(resp).await
    }
}

/// Turn a response into JSON.
///
/// Non-2xx becomes `Error::HttpStatus`. A non-JSON content type (or an
/// empty JSON body) yields an empty object rather than an error; some
/// endpoints answer with plain text or nothing at all.
async fn read_body(resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));

    let body = resp.text().await.map_err(Error::Transport)?;

    if !is_json || body.trim().is_empty() {
        debug!("Non-JSON response, returning empty object. Body: {}", body);
        return Ok(Value::Object(serde_json::Map::new()));
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview = body.chars().take(200).collect::<String>();
        Error::Protocol {
            message: format!("invalid JSON body: {e} (body preview: {preview:?})"),
        }
    })
}
