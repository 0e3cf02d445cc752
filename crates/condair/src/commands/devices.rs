//! Device command handlers.

use tabled::Tabled;

use condair_core::{Device, Hub};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Household")]
    household: String,
    #[tabled(rename = "Serial")]
    serial: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.unique_id.clone(),
            name: d.instance_name.clone().unwrap_or_default(),
            household: d.parent_instance_name.clone().unwrap_or_default(),
            serial: d.parent_serial_number.clone().unwrap_or_default(),
        }
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("ID:        {}", d.unique_id),
        format!("Name:      {}", d.instance_name.as_deref().unwrap_or("-")),
        format!("Household: {}", d.parent_instance_name.as_deref().unwrap_or("-")),
        format!("Serial:    {}", d.parent_serial_number.as_deref().unwrap_or("-")),
    ];
    for (key, value) in &d.extra {
        let rendered = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(format!("{key}: {rendered}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &Hub, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let devices = hub.devices().await?;
            let out = output::render_list(&global.output, &devices, |d| DeviceRow::from(d), |d| {
                d.unique_id.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device_id } => {
            let device = hub.device(&device_id).await?;
            let out = output::render_single(&global.output, &device, detail, |d| d.unique_id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
