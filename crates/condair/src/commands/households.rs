//! Household listing.

use tabled::Tabled;

use condair_core::{Hub, ParentGroup};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct HouseholdRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    let households = hub.households().await?;
    let out = output::render_list(
        &global.output,
        &households,
        |h: &ParentGroup| HouseholdRow {
            serial: h.parent_instance_number.clone().unwrap_or_else(|| "-".into()),
            name: h.parent_instance_name.clone().unwrap_or_default(),
        },
        |h| h.parent_instance_number.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
