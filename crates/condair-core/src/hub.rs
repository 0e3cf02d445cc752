// ── Hub ──
//
// The one place consumers talk to the cloud through. Owns a single
// `CondairClient` behind an async mutex so every call is serialized, and
// translates API errors into `CoreError`. Cheap to clone.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use condair_api::{Action, CondairClient, DatapointSnapshot, Device, ParentGroup, TransportConfig};

use crate::config::HubConfig;
use crate::error::CoreError;

/// Highest accepted target humidity, in percent.
pub const MAX_TARGET_HUMIDITY: u8 = 100;

/// One device's reading from a polling pass.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReading {
    pub device: Device,
    /// `None` when the read failed; see `error`.
    pub snapshot: Option<DatapointSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Entry point for consumers.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

struct HubInner {
    config: HubConfig,
    client: Mutex<CondairClient>,
}

impl Hub {
    /// Create a hub from configuration. Does NOT sign in; call
    /// [`connect()`](Self::connect).
    pub fn new(config: HubConfig) -> Self {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = CondairClient::new(config.base_url.clone(), transport);
        Self::with_client(config, client)
    }

    /// Create a hub around an existing client.
    pub fn with_client(config: HubConfig, client: CondairClient) -> Self {
        Self {
            inner: Arc::new(HubInner {
                config,
                client: Mutex::new(client),
            }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    fn translate(&self, err: condair_api::Error) -> CoreError {
        CoreError::from(err).with_timeout(self.inner.config.timeout.as_secs())
    }

    /// Like `translate`, but a 404 on a per-device endpoint names the device.
    fn translate_for(&self, device_id: &str, err: condair_api::Error) -> CoreError {
        if err.is_not_found() {
            return CoreError::DeviceNotFound {
                identifier: device_id.to_owned(),
            };
        }
        self.translate(err)
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Sign in with the configured credentials.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        self.inner
            .client
            .lock()
            .await
            .authenticate(&config.username, &config.password)
            .await
            .map_err(|e| self.translate(e))?;
        info!(base_url = %config.base_url, "connected to Condair cloud");
        Ok(())
    }

    /// Release the HTTP session. Tokens are kept, so the hub can be
    /// used again afterwards.
    pub async fn disconnect(&self) {
        self.inner.client.lock().await.close_session();
        debug!("disconnected");
    }

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: HubConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Hub) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let hub = Hub::new(config);
        hub.connect().await?;
        let result = f(hub.clone()).await;
        hub.disconnect().await;
        result
    }

    /// Check that the credentials sign in, using a throwaway hub.
    pub async fn validate_credentials(config: &HubConfig) -> Result<(), CoreError> {
        let hub = Hub::new(config.clone());
        let result = hub.connect().await;
        hub.disconnect().await;
        result
    }

    // ── Catalog ──────────────────────────────────────────────────

    pub async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .list_devices()
            .await
            .map_err(|e| self.translate(e))
    }

    /// Look up a single device by id.
    pub async fn device(&self, device_id: &str) -> Result<Device, CoreError> {
        self.devices()
            .await?
            .into_iter()
            .find(|d| d.unique_id == device_id)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: device_id.to_owned(),
            })
    }

    pub async fn households(&self) -> Result<Vec<ParentGroup>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .list_parent_groups()
            .await
            .map_err(|e| self.translate(e))
    }

    pub async fn snapshot(&self, device_id: &str) -> Result<DatapointSnapshot, CoreError> {
        self.read_datapoints(device_id)
            .await
            .map_err(|e| self.translate_for(device_id, e))
    }

    async fn read_datapoints(&self, device_id: &str) -> Result<DatapointSnapshot, condair_api::Error> {
        self.inner.client.lock().await.get_latest_datapoints(device_id).await
    }

    pub async fn actions(&self, device_id: &str) -> Result<Vec<Action>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .list_actions(device_id)
            .await
            .map_err(|e| self.translate_for(device_id, e))
    }

    // ── Commands ─────────────────────────────────────────────────

    pub async fn set_power(&self, device_id: &str, on: bool) -> Result<(), CoreError> {
        self.inner
            .client
            .lock()
            .await
            .set_on_off(device_id, on)
            .await
            .map_err(|e| self.translate(e))
    }

    /// Set the target relative humidity (0 to 100 percent).
    pub async fn set_target_humidity(&self, device_id: &str, percent: u8) -> Result<(), CoreError> {
        if percent > MAX_TARGET_HUMIDITY {
            return Err(CoreError::ValidationFailed {
                message: format!("target humidity must be 0-{MAX_TARGET_HUMIDITY}%, got {percent}%"),
            });
        }
        self.inner
            .client
            .lock()
            .await
            .set_humidity_reference(device_id, percent)
            .await
            .map_err(|e| self.translate(e))
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Read every device (or just `only`) once.
    ///
    /// Listing failures and lost authentication abort the pass. Any other
    /// failed read for one device is recorded in its `DeviceReading` and
    /// the pass moves on.
    pub async fn poll(&self, only: Option<&str>) -> Result<Vec<DeviceReading>, CoreError> {
        let devices = match only {
            Some(id) => vec![self.device(id).await?],
            None => self.devices().await?,
        };

        let mut readings = Vec::with_capacity(devices.len());
        for device in devices {
            let reading = match self.read_datapoints(&device.unique_id).await {
                Ok(snapshot) => DeviceReading {
                    device,
                    snapshot: Some(snapshot),
                    error: None,
                },
                Err(e) if e.is_auth_error() => {
                    return Err(self.translate(e));
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!(device_id = %device.unique_id, error = %e, "datapoint read failed, retrying next pass");
                    } else {
                        error!(device_id = %device.unique_id, error = %e, "datapoint read failed");
                    }
                    let e = self.translate_for(&device.unique_id, e);
                    DeviceReading {
                        device,
                        snapshot: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            readings.push(reading);
        }

        debug!(devices = readings.len(), "poll complete");
        Ok(readings)
    }
}
