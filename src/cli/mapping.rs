use std::error::Error;

use clap::Subcommand;
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::config::mapping::{load_mappings, DEFAULT_MAPPING_ID};

#[derive(Subcommand, Debug, Clone)]
pub enum MappingsCommand {
    /// List all available mapping tables
    List,
}

#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Entries")]
    entries: usize,
    #[tabled(rename = "Default")]
    default: String,
}

pub async fn handle_mappings(cmd: MappingsCommand) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        MappingsCommand::List => {
            let mut mappings: Vec<MappingRow> = load_mappings()
                .into_values()
                .map(|mapping| MappingRow {
                    default: if mapping.id == DEFAULT_MAPPING_ID {
                        "*".to_string()
                    } else {
                        String::new()
                    },
                    entries: mapping.mapping.len(),
                    id: mapping.id,
                    name: mapping.name,
                })
                .collect();
            mappings.sort_by(|a, b| a.id.cmp(&b.id));
            let count = mappings.len();

            let mut table = Table::new(mappings);
            table
                .with(Style::modern_rounded())
                .with(Panel::header("Mapping Tables"));
            println!("{table}");
            println!("Found {count} mapping table(s)");
        }
    }

    Ok(())
}
