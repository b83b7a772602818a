//! Physical input devices that produce [RawInputEvent]s
pub mod evdev;

use std::io;

use thiserror::Error;

use super::event::RawInputEvent;

/// Possible errors reading from an [InputSource]
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("input device disconnected: {0}")]
    DeviceDisconnected(String),
    #[error("no supported gamepad found")]
    NoDevice,
    #[error("failed to open input device: {0}")]
    Io(#[from] io::Error),
}

/// An [InputSource] is a physical device that can be polled for events.
/// Implementations must never block in [InputSource::poll] for longer than
/// a short read, so the caller can check for cancellation between batches.
pub trait InputSource: Send {
    /// Returns a human readable name of the device
    fn name(&self) -> String;

    /// Read all events that are currently available. An empty batch means no
    /// events were ready.
    fn poll(&mut self) -> Result<Vec<RawInputEvent>, SourceError>;
}
