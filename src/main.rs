use std::env;
use std::error::Error;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use xbox_to_switch::cli::{main_cli, Args, Commands, RunArgs};
use xbox_to_switch::config::mapping::MappingConfig;
use xbox_to_switch::input::source::evdev::GamepadEventDevice;
use xbox_to_switch::input::translator::InputTranslator;
use xbox_to_switch::session::EmulationSession;
use xbox_to_switch::transport::uhid::UhidTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args = Args::parse();

    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();

    match args.cmd {
        None | Some(Commands::Run) => run(args.run).await,
        Some(cmd) => main_cli(cmd).await,
    }
}

async fn run(args: RunArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting xbox-to-switch v{}", VERSION);

    // Creating virtual devices and grabbing gamepads needs root
    if !nix::unistd::geteuid().is_root() {
        log::error!("xbox-to-switch must be run as root");
        return Err("permission denied: xbox-to-switch must be run as root".into());
    }

    let mapping = MappingConfig::find(&args.mapping)?;
    let translator = InputTranslator::new(&mapping)?;
    log::info!("Using mapping table '{}'", translator.name());

    let source = match args.device.as_ref() {
        Some(path) => GamepadEventDevice::open(path)?,
        None => GamepadEventDevice::discover()?,
    };
    log::info!("Using gamepad at {}", source.path().display());

    let config = args.session_config();
    log::info!("Emulating {}", config.controller.name());
    let session = EmulationSession::new(config, translator);

    // Setup CTRL+C handler
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Unable to listen for shutdown signal: {e}");
            return;
        }
        log::info!("Shutting down");
        token.cancel();
    });

    session.run(&UhidTransport::new(), source, cancel).await?;
    log::info!("xbox-to-switch stopped");

    Ok(())
}
