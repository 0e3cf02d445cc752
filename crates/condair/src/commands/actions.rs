//! `actions <device-id>`: remote actions a device exposes.

use tabled::Tabled;

use condair_core::{Action, Hub};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(hub: &Hub, device_id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let actions = hub.actions(device_id).await?;
    let out = output::render_list(
        &global.output,
        &actions,
        |a: &Action| ActionRow {
            id: a.id.clone(),
            name: a.name.clone(),
        },
        |a| a.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
