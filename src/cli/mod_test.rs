use std::{error::Error, path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    cli::{Args, Commands},
    transport::{ControllerKind, SessionConfig},
};

#[tokio::test]
async fn test_default_args() -> Result<(), Box<dyn Error>> {
    let args = Args::try_parse_from(["xbox-to-switch"])?;
    assert!(args.cmd.is_none(), "should default to a run");
    assert_eq!(args.run.mapping, "xbox_one");
    assert_eq!(args.run.session_config(), SessionConfig::default());

    Ok(())
}

#[tokio::test]
async fn test_run_args() -> Result<(), Box<dyn Error>> {
    let args = Args::try_parse_from([
        "xbox-to-switch",
        "--controller",
        "JOYCON_R",
        "--device",
        "/dev/input/event7",
        "--mapping",
        "xbox_one_labels",
        "--log",
        "/tmp/capture.log",
        "--device-id",
        "98:b6:e9:46:50:6b",
        "--report-interval-ms",
        "8",
        "--handshake-timeout-secs",
        "5",
    ])?;
    assert_eq!(args.run.device, Some(PathBuf::from("/dev/input/event7")));
    assert_eq!(args.run.mapping, "xbox_one_labels");

    let config = args.run.session_config();
    assert_eq!(config.controller, ControllerKind::JoyconR);
    assert_eq!(config.capture, Some(PathBuf::from("/tmp/capture.log")));
    assert_eq!(config.device_id.as_deref(), Some("98:b6:e9:46:50:6b"));
    assert_eq!(config.report_interval, Duration::from_millis(8));
    assert_eq!(config.handshake_timeout, Duration::from_secs(5));

    assert!(
        Args::try_parse_from(["xbox-to-switch", "--controller", "GAMECUBE"]).is_err(),
        "unknown controller should be rejected"
    );

    Ok(())
}

#[tokio::test]
async fn test_subcommands() -> Result<(), Box<dyn Error>> {
    let args = Args::try_parse_from(["xbox-to-switch", "mappings", "list"])?;
    assert!(matches!(args.cmd, Some(Commands::Mappings { .. })));
    let args = Args::try_parse_from(["xbox-to-switch", "devices", "list"])?;
    assert!(matches!(args.cmd, Some(Commands::Devices { .. })));

    Ok(())
}
