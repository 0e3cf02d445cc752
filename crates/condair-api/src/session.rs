// HTTP session manager
//
// Owns the `reqwest::Client` for one API client instance. The handle is
// built on first use, dropped on close, and rebuilt if the client is used
// again afterwards.

use tracing::debug;

use crate::error::Error;
use crate::transport::TransportConfig;

#[derive(Debug)]
pub(crate) struct Session {
    transport: TransportConfig,
    http: Option<reqwest::Client>,
}

impl Session {
    /// A session that builds its client lazily from `transport`.
    pub(crate) fn new(transport: TransportConfig) -> Self {
        Self {
            transport,
            http: None,
        }
    }

    /// A session seeded with a pre-built client.
    pub(crate) fn with_client(http: reqwest::Client) -> Self {
        Self {
            transport: TransportConfig::default(),
            http: Some(http),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.http.is_some()
    }

    /// Return the live client, creating it if needed.
    ///
    /// `reqwest::Client` is an `Arc` internally, so the clone is cheap and
    /// keeps the borrow of `self` short.
    pub(crate) fn acquire(&mut self) -> Result<reqwest::Client, Error> {
        if let Some(ref http) = self.http {
            return Ok(http.clone());
        }
        debug!("opening HTTP session");
        let http = self.transport.build_client()?;
        self.http = Some(http.clone());
        Ok(http)
    }

    /// Release the client. Returns `false` if it was already closed.
    pub(crate) fn close(&mut self) -> bool {
        self.http.take().is_some()
    }
}
