use std::{
    io,
    os::fd::AsRawFd,
    path::{Path, PathBuf},
};

use evdev::{Device, KeyCode};
use nix::fcntl::{FcntlArg, OFlag};

use crate::input::event::RawInputEvent;

use super::{InputSource, SourceError};

/// Information about an evdev gamepad found on the system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamepadInfo {
    pub path: PathBuf,
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
}

/// Returns all input devices that look like gamepads. A device is considered
/// a gamepad if it reports the south face button.
pub fn list_gamepads() -> Vec<GamepadInfo> {
    let mut gamepads: Vec<GamepadInfo> = evdev::enumerate()
        .filter(|(_, device)| is_gamepad(device))
        .map(|(path, device)| GamepadInfo {
            path,
            name: device.name().unwrap_or("Unknown").to_string(),
            vendor_id: device.input_id().vendor(),
            product_id: device.input_id().product(),
        })
        .collect();
    gamepads.sort_by(|a, b| a.path.cmp(&b.path));
    gamepads
}

fn is_gamepad(device: &Device) -> bool {
    device
        .supported_keys()
        .is_some_and(|keys| keys.contains(KeyCode::BTN_SOUTH))
}

/// Source device implementation for evdev gamepads. The device is grabbed
/// for exclusive access so its events do not also reach other applications.
pub struct GamepadEventDevice {
    path: PathBuf,
    name: String,
    device: Device,
}

impl GamepadEventDevice {
    /// Open the gamepad at the given event device path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening device at: {}", path.display());
        let mut device = Device::open(&path)?;
        device.grab()?;

        // Set the device to do non-blocking reads
        let raw_fd = device.as_raw_fd();
        nix::fcntl::fcntl(raw_fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK)).map_err(io::Error::from)?;

        let name = device.name().unwrap_or("Unknown").to_string();
        log::info!("Opened gamepad '{name}' at {}", path.display());

        Ok(Self { path, name, device })
    }

    /// Open the first gamepad found on the system
    pub fn discover() -> Result<Self, SourceError> {
        let Some(info) = list_gamepads().into_iter().next() else {
            return Err(SourceError::NoDevice);
        };
        log::debug!("Discovered gamepad: {info:?}");
        Self::open(info.path)
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

impl InputSource for GamepadEventDevice {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn poll(&mut self) -> Result<Vec<RawInputEvent>, SourceError> {
        let events = match self.device.fetch_events() {
            Ok(events) => events,
            Err(err) => match err.kind() {
                // Do nothing if this would block
                io::ErrorKind::WouldBlock => return Ok(vec![]),
                _ => {
                    log::debug!("Failed to fetch events: {err:?}");
                    return Err(SourceError::DeviceDisconnected(format!(
                        "{}: {err}",
                        self.path.display()
                    )));
                }
            },
        };

        let events = events
            .filter_map(|event| {
                log::trace!("Received event: {event:?}");
                RawInputEvent::from_evdev(&event)
            })
            .collect();

        Ok(events)
    }
}

impl std::fmt::Debug for GamepadEventDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamepadEventDevice")
            .field("path", &self.path)
            .field("name", &self.name)
            .finish()
    }
}
