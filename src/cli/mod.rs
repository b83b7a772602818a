pub mod device;
pub mod mapping;
#[cfg(test)]
pub mod mod_test;

use std::{error::Error, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use device::{handle_devices, DevicesCommand};
use mapping::{handle_mappings, MappingsCommand};

use crate::{
    config::mapping::DEFAULT_MAPPING_ID,
    transport::{
        ControllerKind, SessionConfig, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_REPORT_INTERVAL,
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Emulate a Switch controller with a physical gamepad (default)
    Run,
    /// Manage mapping tables
    Mappings {
        #[command(subcommand)]
        cmd: MappingsCommand,
    },
    /// Manage physical gamepads
    Devices {
        #[command(subcommand)]
        cmd: DevicesCommand,
    },
}

/// Options of an emulation run
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Kind of controller to emulate (PRO_CONTROLLER, JOYCON_L or JOYCON_R)
    #[arg(long, default_value_t = ControllerKind::ProController)]
    pub controller: ControllerKind,
    /// Path to the gamepad event device. The first gamepad found is used if
    /// not set.
    #[arg(long, value_name = "PATH")]
    pub device: Option<PathBuf>,
    /// ID of a mapping table or path to a mapping table file
    #[arg(long, default_value = DEFAULT_MAPPING_ID)]
    pub mapping: String,
    /// SPI flash image to serve calibration and colors from
    #[arg(long, value_name = "PATH")]
    pub spi_flash: Option<PathBuf>,
    /// Device id reported to the host (e.g. "98:b6:e9:46:50:6a")
    #[arg(long)]
    pub device_id: Option<String>,
    /// Write every raw report to the given capture file
    #[arg(long = "log", value_name = "PATH")]
    pub capture: Option<PathBuf>,
    /// Time between two input reports in milliseconds
    #[arg(long, default_value_t = DEFAULT_REPORT_INTERVAL.as_millis() as u64)]
    pub report_interval_ms: u64,
    /// Time the host has to complete the handshake in seconds
    #[arg(long, default_value_t = DEFAULT_HANDSHAKE_TIMEOUT.as_secs())]
    pub handshake_timeout_secs: u64,
}

impl RunArgs {
    /// Returns the settings for the emulation session
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            controller: self.controller,
            spi_flash: self.spi_flash.clone(),
            device_id: self.device_id.clone(),
            capture: self.capture.clone(),
            report_interval: Duration::from_millis(self.report_interval_ms.max(1)),
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
        }
    }
}

/// Handle any command that does not start an emulation run
pub async fn main_cli(cmd: Commands) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        Commands::Run => (),
        Commands::Mappings { cmd } => handle_mappings(cmd).await?,
        Commands::Devices { cmd } => handle_devices(cmd).await?,
    }

    Ok(())
}
