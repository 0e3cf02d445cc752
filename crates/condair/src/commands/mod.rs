//! Command dispatch: bridges CLI args -> hub calls -> output formatting.

pub mod actions;
pub mod config_cmd;
pub mod devices;
pub mod households;
pub mod power;
pub mod status;
pub mod watch;

use condair_core::Hub;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a cloud-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(hub, args, global).await,
        Command::Households => households::handle(hub, global).await,
        Command::Status(args) => status::handle(hub, &args.device_id, global).await,
        Command::On(args) => power::set_power(hub, &args.device_id, true, global).await,
        Command::Off(args) => power::set_power(hub, &args.device_id, false, global).await,
        Command::Humidity(args) => power::set_humidity(hub, &args.device_id, args.percent, global).await,
        Command::Actions(args) => actions::handle(hub, &args.device_id, global).await,
        Command::Watch(args) => watch::handle(hub, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "does not need a cloud session".into(),
        }),
    }
}
