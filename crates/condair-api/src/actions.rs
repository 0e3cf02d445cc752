// Action invoker
//
// Actions are discovered per device and looked up by name at call time;
// nothing is cached between calls.

use tracing::{debug, error, info, warn};

use crate::client::CondairClient;
use crate::datapoints::{AREA_ON_OFF, HUMIDITY_REFERENCE};
use crate::error::{Error, describe_error_field};
use crate::models::{self, Action, ActionVariable, InvokeActionRequest, VALUE_PLACEHOLDER};

const INVOKE_ACTION: &str = "api/condair/invoke-action";

impl CondairClient {
    /// Actions a device exposes.
    ///
    /// `GET api/condair/sensor-instances/{id}/actions`
    pub async fn list_actions(&mut self, device_id: &str) -> Result<Vec<Action>, Error> {
        self.ensure_valid().await?;
        debug!(device_id, "listing actions");

        let resp = self
            .get(&format!("api/condair/sensor-instances/{device_id}/actions"))
            .await?;

        match models::array(resp, "actions") {
            Ok(items) => Ok(models::decode_entries(items, "action")),
            Err(e) => {
                warn!(device_id, "Unexpected actions data: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Invoke an action with a single `$value$` substitution.
    ///
    /// `POST api/condair/invoke-action`
    pub async fn invoke_action(&mut self, action_id: &str, device_id: &str, value: &str) -> Result<(), Error> {
        self.ensure_valid().await?;

        let body = InvokeActionRequest {
            action_id,
            unique_id: device_id,
            variables: [ActionVariable {
                value,
                var_name: VALUE_PLACEHOLDER,
            }],
        };

        let resp = self
            .post(INVOKE_ACTION, &body)
            .await
            .inspect_err(|e| error!(device_id, action_id, "Failed to invoke action: {e}"))?;

        if let Some(err) = resp.get("error") {
            let message = describe_error_field(err, resp.get("error_description"));
            error!(device_id, action_id, "Error invoking action: {message}");
            return Err(Error::ActionRejected { message });
        }

        info!(device_id, action_id, value, "action invoked");
        Ok(())
    }

    /// Turn a device on or off via its `Area OnOff` action.
    pub async fn set_on_off(&mut self, device_id: &str, turn_on: bool) -> Result<(), Error> {
        let action = self.find_action(device_id, AREA_ON_OFF).await?;
        let value = if turn_on { "1" } else { "0" };
        self.invoke_action(&action.id, device_id, value).await
    }

    /// Set the target relative humidity via the `Humidity Reference` action.
    pub async fn set_humidity_reference(&mut self, device_id: &str, humidity: u8) -> Result<(), Error> {
        let action = self.find_action(device_id, HUMIDITY_REFERENCE).await?;
        self.invoke_action(&action.id, device_id, &humidity.to_string())
            .await
    }

    async fn find_action(&mut self, device_id: &str, name: &str) -> Result<Action, Error> {
        self.list_actions(device_id)
            .await?
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| {
                error!(device_id, "No '{name}' action found");
                Error::ActionNotFound {
                    action: name.to_owned(),
                    device_id: device_id.to_owned(),
                }
            })
    }
}
