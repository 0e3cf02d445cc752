// Device catalog
//
// Sensor-instance listing, household grouping, and latest datapoints.
// Shape mismatches degrade to empty results with a warning; transport,
// HTTP and auth failures propagate.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::CondairClient;
use crate::datapoints::DatapointSnapshot;
use crate::error::Error;
use crate::models::{self, Device, ParentGroup};

const SENSOR_INSTANCES: &str = "api/condair/sensor-instances?pageSize=999";

/// The parent fields of a listing entry, nothing else.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParentRef {
    #[serde(default)]
    parent_serial_number: Option<String>,
    #[serde(default)]
    parent_instance_name: Option<String>,
}

impl CondairClient {
    /// List every sensor instance on the account.
    ///
    /// `GET api/condair/sensor-instances?pageSize=999`
    pub async fn list_devices(&mut self) -> Result<Vec<Device>, Error> {
        self.ensure_valid().await?;
        debug!("listing devices");

        let resp = self.get(SENSOR_INSTANCES).await?;
        let items = match models::listing_data(resp) {
            Ok(items) => items,
            Err(e) => {
                warn!("No device data in response: {e}");
                return Ok(Vec::new());
            }
        };

        Ok(models::decode_entries(items, "device"))
    }

    /// Households, derived from the device listing.
    ///
    /// Grouped by `parentSerialNumber` in first-seen order; the first name
    /// seen for a household wins.
    pub async fn list_parent_groups(&mut self) -> Result<Vec<ParentGroup>, Error> {
        self.ensure_valid().await?;
        debug!("listing parent groups");

        let resp = self.get(SENSOR_INSTANCES).await?;
        let items = match resp {
            Value::Array(items) => items,
            other => match models::listing_data(other) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Unexpected parent instance data: {e}");
                    return Ok(Vec::new());
                }
            },
        };

        let mut groups: IndexMap<Option<String>, ParentGroup> = IndexMap::new();
        for parent in models::decode_entries::<ParentRef>(items, "parent instance") {
            groups
                .entry(parent.parent_serial_number.clone())
                .or_insert_with(|| ParentGroup {
                    parent_instance_number: parent.parent_serial_number,
                    parent_instance_name: parent.parent_instance_name,
                });
        }

        Ok(groups.into_values().collect())
    }

    /// Latest datapoint values for one device.
    ///
    /// `GET api/condair/sensor-instances/{id}/latest-datapoint-values`
    pub async fn get_latest_datapoints(&mut self, device_id: &str) -> Result<DatapointSnapshot, Error> {
        self.ensure_valid().await?;
        debug!(device_id, "fetching latest datapoints");

        let resp = self
            .get(&format!("api/condair/sensor-instances/{device_id}/latest-datapoint-values"))
            .await?;

        match DatapointSnapshot::from_value(&resp) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(device_id, "Unexpected datapoint data: {e}");
                Ok(DatapointSnapshot::default())
            }
        }
    }
}
