// Condair API response types
//
// Typed views of the JSON the cloud returns. Field presence is inconsistent
// across device generations, so everything except the identity key is
// optional and unknown fields land in `extra`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::Error;

// ── Device ───────────────────────────────────────────────────────────

/// One sensor instance from `api/condair/sensor-instances`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub unique_id: String,
    #[serde(default)]
    pub parent_serial_number: Option<String>,
    #[serde(default)]
    pub parent_instance_name: Option<String>,
    #[serde(default)]
    pub instance_name: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Device {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.instance_name.as_deref().unwrap_or(&self.unique_id)
    }
}

// ── Household ────────────────────────────────────────────────────────

/// A parent instance (household) grouping devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentGroup {
    #[serde(rename = "parentInstanceNumber")]
    pub parent_instance_number: Option<String>,
    #[serde(rename = "parentInstanceName")]
    pub parent_instance_name: Option<String>,
}

// ── Action ───────────────────────────────────────────────────────────

/// A remotely invokable device command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub name: String,
}

/// Body of `POST api/condair/invoke-action`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvokeActionRequest<'a> {
    pub action_id: &'a str,
    pub unique_id: &'a str,
    pub variables: [ActionVariable<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionVariable<'a> {
    pub value: &'a str,
    pub var_name: &'a str,
}

/// Placeholder the cloud substitutes with the action value.
pub(crate) const VALUE_PLACEHOLDER: &str = "$value$";

// ── Response boundary helpers ───────────────────────────────────────

/// The `data` array of a `{ data: [...] }` listing.
pub(crate) fn listing_data(resp: Value) -> Result<Vec<Value>, Error> {
    match resp {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(Error::Protocol {
                message: format!("'data' is not an array: {other}"),
            }),
            None => Err(Error::Protocol {
                message: format!("no 'data' field in {}", Value::Object(map)),
            }),
        },
        other => Err(Error::Protocol {
            message: format!("expected an object with 'data', got {other}"),
        }),
    }
}

/// A bare top-level array.
pub(crate) fn array(resp: Value, what: &str) -> Result<Vec<Value>, Error> {
    match resp {
        Value::Array(items) => Ok(items),
        other => Err(Error::Protocol {
            message: format!("expected a list from {what}, got {other}"),
        }),
    }
}

/// Decode each entry, skipping (and logging) the ones that don't fit.
pub(crate) fn decode_entries<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| {
            if !item.is_object() {
                warn!("skipping {what} entry (not an object): {item}");
                return None;
            }
            match serde_json::from_value::<T>(item.clone()) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("skipping {what} entry ({e}): {item}");
                    None
                }
            }
        })
        .collect()
}
