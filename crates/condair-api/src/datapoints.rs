// Datapoint parser
//
// Maps the `latest-datapoint-values` array onto a sparse, typed snapshot.
// Pure and idempotent: the same raw array always yields the same snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

pub const HUMIDITY_AVERAGE: &str = "Humidity Average";
pub const TEMPERATURE_AVERAGE: &str = "Temperature Average";
pub const HUMIDITY_REFERENCE: &str = "Humidity Reference";
pub const AREA_ON_OFF: &str = "Area OnOff";

/// Latest readings for one device. `None` means "no reading", not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DatapointSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
}

#[derive(Deserialize)]
struct RawDatapoint {
    #[serde(rename = "dataPointName", default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

impl DatapointSnapshot {
    /// Parse a raw response body, which must be an array.
    pub fn from_value(raw: &Value) -> Result<Self, Error> {
        let entries = raw.as_array().ok_or_else(|| Error::Protocol {
            message: format!("expected a list from latest-datapoint-values, got {raw}"),
        })?;
        Ok(Self::from_entries(entries))
    }

    /// Fold datapoint entries into a snapshot. Later entries win.
    pub fn from_entries(entries: &[Value]) -> Self {
        let mut snapshot = Self::default();

        for entry in entries.iter().filter(|e| e.is_object()) {
            let Ok(dp) = RawDatapoint::deserialize(entry) else {
                continue;
            };
            let numeric = numeric_value(dp.value.as_ref());

            match dp.name.as_deref().unwrap_or_default() {
                HUMIDITY_AVERAGE if numeric.is_some() => snapshot.humidity_avg = numeric,
                TEMPERATURE_AVERAGE if numeric.is_some() => snapshot.temperature_avg = numeric,
                HUMIDITY_REFERENCE if numeric.is_some() => snapshot.target_humidity = numeric,
                #[allow(clippy::float_cmp)]
                AREA_ON_OFF => snapshot.is_on = Some(numeric == Some(1.0)),
                _ => {}
            }
        }

        snapshot
    }

    /// No field was populated.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Numeric reading of a datapoint value: numbers as-is, strings parsed
/// after trimming, booleans as 1/0.
fn numeric_value(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
