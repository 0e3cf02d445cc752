//! `status <device-id>`: latest datapoint snapshot.

use serde::Serialize;

use condair_core::{DatapointSnapshot, Hub};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct DeviceStatus<'a> {
    device_id: &'a str,
    #[serde(flatten)]
    snapshot: DatapointSnapshot,
}

fn detail(status: &DeviceStatus<'_>, color: bool) -> String {
    let s = &status.snapshot;
    [
        format!("Device:      {}", status.device_id),
        format!("Power:       {}", output::power_label(s.is_on, color)),
        format!("Humidity:    {}", output::percent(s.humidity_avg)),
        format!("Target:      {}", output::percent(s.target_humidity)),
        format!("Temperature: {}", output::celsius(s.temperature_avg)),
    ]
    .join("\n")
}

pub async fn handle(hub: &Hub, device_id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = hub.snapshot(device_id).await?;
    if snapshot.is_empty() {
        tracing::warn!(device_id, "no readings reported");
    }

    let status = DeviceStatus { device_id, snapshot };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &status,
        |s| detail(s, color),
        |s| output::percent(s.snapshot.humidity_avg),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
