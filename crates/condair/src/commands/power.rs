//! Device commands: power and target humidity.

use condair_core::Hub;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn set_power(hub: &Hub, device_id: &str, on: bool, global: &GlobalOpts) -> Result<(), CliError> {
    hub.set_power(device_id, on).await?;
    let state = if on { "on" } else { "off" };
    output::print_confirmation(&format!("Turned {state} {device_id}"), global.quiet);
    Ok(())
}

pub async fn set_humidity(hub: &Hub, device_id: &str, percent: u8, global: &GlobalOpts) -> Result<(), CliError> {
    hub.set_target_humidity(device_id, percent).await?;
    output::print_confirmation(&format!("Target humidity for {device_id} set to {percent}%"), global.quiet);
    Ok(())
}
