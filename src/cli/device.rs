use std::error::Error;

use clap::Subcommand;
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::input::source::evdev::list_gamepads;

#[derive(Subcommand, Debug, Clone)]
pub enum DevicesCommand {
    /// List all gamepads that can be used as input
    List,
}

#[derive(Tabled)]
struct GamepadRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Product")]
    product: String,
}

pub async fn handle_devices(cmd: DevicesCommand) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        DevicesCommand::List => {
            let gamepads: Vec<GamepadRow> = list_gamepads()
                .into_iter()
                .map(|info| GamepadRow {
                    path: info.path.display().to_string(),
                    name: info.name,
                    vendor: format!("{:04x}", info.vendor_id),
                    product: format!("{:04x}", info.product_id),
                })
                .collect();
            let count = gamepads.len();

            let mut table = Table::new(gamepads);
            table
                .with(Style::modern_rounded())
                .with(Panel::header("Gamepads"));
            println!("{table}");
            println!("Found {count} gamepad(s)");
        }
    }

    Ok(())
}
