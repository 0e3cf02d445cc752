//! `watch`: poll readings at a fixed cadence until Ctrl-C.
//!
//! Each pass reads every device once; a device that fails to read shows
//! its error in the row and the pass carries on.

use std::time::Duration;

use chrono::Local;
use tabled::Tabled;
use tracing::info;

use condair_core::{DeviceReading, Hub};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Humidity")]
    humidity: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Temp")]
    temperature: String,
}

fn row(reading: &DeviceReading, color: bool) -> ReadingRow {
    let id = reading.device.unique_id.clone();
    let name = reading.device.display_name().to_owned();
    match reading.snapshot {
        Some(s) => ReadingRow {
            id,
            name,
            power: output::power_label(s.is_on, color),
            humidity: output::percent(s.humidity_avg),
            target: output::percent(s.target_humidity),
            temperature: output::celsius(s.temperature_avg),
        },
        None => ReadingRow {
            id,
            name,
            power: "-".into(),
            humidity: reading.error.clone().unwrap_or_else(|| "unavailable".into()),
            target: "-".into(),
            temperature: "-".into(),
        },
    }
}

fn plain(reading: &DeviceReading) -> String {
    let humidity = reading
        .snapshot
        .map_or_else(|| "-".into(), |s| output::percent(s.humidity_avg));
    format!("{} {humidity}", reading.device.unique_id)
}

pub async fn handle(hub: &Hub, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let interval = Duration::from_secs(args.interval);
    let color = output::should_color(&global.color);
    let mut passes: u32 = 0;

    info!(interval_secs = args.interval, "watching");

    loop {
        let readings = hub.poll(args.device_id.as_deref()).await?;
        passes += 1;

        if matches!(global.output, crate::cli::OutputFormat::Table) && !global.quiet {
            println!("{}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        }
        let out = output::render_list(&global.output, &readings, |r| row(r, color), plain);
        output::print_output(&out, global.quiet);

        if args.count.is_some_and(|n| passes >= n) {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
            () = tokio::time::sleep(interval) => {}
        }
    }
}
