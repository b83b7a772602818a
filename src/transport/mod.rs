//! Backends that present the emulated controller to a host
pub mod capture;
pub mod flash;
pub mod protocol;
pub mod uhid;

use std::{fmt::Display, io, path::PathBuf, str::FromStr, time::Duration};

use packed_struct::PackingError;
use thiserror::Error;

use crate::{
    controller::SharedControllerState,
    drivers::switch::{PID_JOYCON_L, PID_JOYCON_R, PID_PRO_CONTROLLER},
};

use self::flash::FlashError;

/// Default time between two input reports
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_millis(15);
/// Default time the host has to complete the handshake
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);
/// Identity used when no device id was configured
pub const DEFAULT_DEVICE_ID: [u8; 6] = [0x98, 0xb6, 0xe9, 0x46, 0x50, 0x6a];

/// Possible errors of a [Transport]
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("transport I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("host dropped the connection")]
    HostDisconnected,
    #[error("virtual device was stopped")]
    DeviceStopped,
    #[error("invalid device id '{0}': expected six hex bytes like 98:b6:e9:46:50:6a")]
    InvalidDeviceId(String),
    #[error("invalid SPI flash: {0}")]
    Flash(#[from] FlashError),
    #[error("failed to pack report: {0}")]
    Packing(#[from] PackingError),
    #[error("transport task failed: {0}")]
    Task(String),
}

/// The kind of Switch controller to emulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerKind {
    #[default]
    ProController,
    JoyconL,
    JoyconR,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 3] = [
        ControllerKind::ProController,
        ControllerKind::JoyconL,
        ControllerKind::JoyconR,
    ];

    /// Identifier used on the command line
    pub fn id(&self) -> &'static str {
        match self {
            ControllerKind::ProController => "PRO_CONTROLLER",
            ControllerKind::JoyconL => "JOYCON_L",
            ControllerKind::JoyconR => "JOYCON_R",
        }
    }

    /// Product name reported to the host
    pub fn name(&self) -> &'static str {
        match self {
            ControllerKind::ProController => "Pro Controller",
            ControllerKind::JoyconL => "Joy-Con (L)",
            ControllerKind::JoyconR => "Joy-Con (R)",
        }
    }

    pub fn product_id(&self) -> u16 {
        match self {
            ControllerKind::ProController => PID_PRO_CONTROLLER,
            ControllerKind::JoyconL => PID_JOYCON_L,
            ControllerKind::JoyconR => PID_JOYCON_R,
        }
    }

    /// Controller type byte used in device info replies
    pub fn type_byte(&self) -> u8 {
        match self {
            ControllerKind::ProController => 0x03,
            ControllerKind::JoyconL => 0x01,
            ControllerKind::JoyconR => 0x02,
        }
    }
}

impl Display for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for ControllerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControllerKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let valid: Vec<&str> = ControllerKind::ALL.iter().map(|k| k.id()).collect();
                format!("unknown controller '{s}', expected one of {}", valid.join(", "))
            })
    }
}

/// Parse a MAC style device id like `98:b6:e9:46:50:6a`
pub fn parse_device_id(value: &str) -> Result<[u8; 6], TransportError> {
    let invalid = || TransportError::InvalidDeviceId(value.to_string());
    let parts: Vec<&str> = value.split([':', '-']).collect();
    if parts.len() != 6 {
        return Err(invalid());
    }
    let mut id = [0; 6];
    for (byte, part) in id.iter_mut().zip(parts) {
        if part.len() != 2 {
            return Err(invalid());
        }
        *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
    }
    Ok(id)
}

/// Settings passed through to the transport when a session starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub controller: ControllerKind,
    /// Calibration preset blob to serve SPI flash reads from
    pub spi_flash: Option<PathBuf>,
    /// MAC style identity override
    pub device_id: Option<String>,
    /// Path to write a capture of all raw reports to
    pub capture: Option<PathBuf>,
    pub report_interval: Duration,
    pub handshake_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            controller: ControllerKind::default(),
            spi_flash: None,
            device_id: None,
            capture: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Returns the configured device id or the default one
    pub fn device_id(&self) -> Result<[u8; 6], TransportError> {
        match self.device_id.as_ref() {
            Some(id) => parse_device_id(id),
            None => Ok(DEFAULT_DEVICE_ID),
        }
    }
}

/// A [Transport] presents the emulated controller to a host. Opening it
/// starts a backend that periodically reads snapshots of the given state.
pub trait Transport {
    type Handle: TransportHandle;

    async fn open(
        &self,
        config: &SessionConfig,
        state: SharedControllerState,
    ) -> Result<Self::Handle, TransportError>;
}

/// Handle to an opened [Transport]
pub trait TransportHandle {
    /// Resolves once the host has completed the handshake
    async fn wait_connected(&mut self) -> Result<(), TransportError>;

    /// Resolves with the failure that ended the connection. Only completes
    /// if the backend fails on its own.
    async fn closed(&mut self) -> TransportError;

    /// Stop the backend and release the virtual device
    async fn close(self) -> Result<(), TransportError>;
}
