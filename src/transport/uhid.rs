use std::{fs::File, io, thread, time::Duration};

use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uhid_virt::{Bus, CreateParams, OutputEvent, StreamError, UHIDDevice};

use crate::{
    controller::SharedControllerState,
    drivers::switch::{report_descriptor::PRO_CONTROLLER_DESCRIPTOR, VID},
};

use super::{
    capture::{CaptureLog, Direction},
    flash::FlashMemory,
    protocol::{ProtocolEvent, SwitchProtocol},
    SessionConfig, Transport, TransportError, TransportHandle,
};

/// Firmware version reported to the kernel
const VERSION: u32 = 0x0200;

/// [Transport] that creates a virtual Switch controller through the Linux
/// UHID interface.
#[derive(Debug, Default)]
pub struct UhidTransport;

impl UhidTransport {
    pub fn new() -> Self {
        Self
    }

    /// Create the virtual device to emulate
    fn create_virtual_device(
        config: &SessionConfig,
        device_id: &[u8; 6],
    ) -> Result<UHIDDevice<File>, TransportError> {
        let kind = config.controller;
        let device = UHIDDevice::create(CreateParams {
            name: format!("Nintendo Switch {}", kind.name()),
            phys: String::from(""),
            uniq: device_id
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<String>>()
                .join(":"),
            bus: Bus::USB,
            vendor: VID as u32,
            product: kind.product_id() as u32,
            version: VERSION,
            country: 0,
            rd_data: PRO_CONTROLLER_DESCRIPTOR.to_vec(),
        })?;

        Ok(device)
    }
}

impl Transport for UhidTransport {
    type Handle = UhidHandle;

    async fn open(
        &self,
        config: &SessionConfig,
        state: SharedControllerState,
    ) -> Result<Self::Handle, TransportError> {
        let device_id = config.device_id()?;
        let flash = match config.spi_flash.as_ref() {
            Some(path) => FlashMemory::from_file(path)?,
            None => FlashMemory::new(),
        };
        let capture = match config.capture.as_ref() {
            Some(path) => Some(CaptureLog::create(path)?),
            None => None,
        };

        log::debug!("Creating virtual {}", config.controller.name());
        let device = Self::create_virtual_device(config, &device_id)?;
        let protocol = SwitchProtocol::new(config.controller, device_id, flash);

        let (connected_tx, connected_rx) = watch::channel(false);
        let cancel = CancellationToken::new();
        let mut reporter = Reporter {
            device,
            protocol,
            state,
            capture,
            interval: config.report_interval,
            connected_tx,
        };

        // Spawn the device in its own blocking thread
        let token = cancel.clone();
        let task = tokio::task::spawn_blocking(move || {
            let result = reporter.run(&token);
            reporter.finish();
            result
        });

        Ok(UhidHandle {
            cancel,
            connected_rx,
            task: Some(task),
            failure: None,
        })
    }
}

/// Handle to a running [UhidTransport]
#[derive(Debug)]
pub struct UhidHandle {
    cancel: CancellationToken,
    connected_rx: watch::Receiver<bool>,
    task: Option<JoinHandle<Result<(), TransportError>>>,
    failure: Option<TransportError>,
}

impl UhidHandle {
    /// Wait for the reporter task to exit and remember how it ended
    async fn join(&mut self) -> TransportError {
        if let Some(failure) = self.failure.take() {
            return failure;
        }
        let Some(task) = self.task.as_mut() else {
            return TransportError::DeviceStopped;
        };
        let result = task.await;
        self.task = None;
        match result {
            Ok(Ok(())) => TransportError::DeviceStopped,
            Ok(Err(e)) => e,
            Err(e) => TransportError::Task(e.to_string()),
        }
    }
}

impl TransportHandle for UhidHandle {
    async fn wait_connected(&mut self) -> Result<(), TransportError> {
        loop {
            if *self.connected_rx.borrow_and_update() {
                return Ok(());
            }
            // The sender is dropped when the reporter task exits
            if self.connected_rx.changed().await.is_err() {
                return Err(self.join().await);
            }
        }
    }

    async fn closed(&mut self) -> TransportError {
        let error = self.join().await;
        log::debug!("Transport closed: {error}");
        error
    }

    async fn close(mut self) -> Result<(), TransportError> {
        self.cancel.cancel();
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        match task.await {
            Ok(Ok(())) => Ok(()),
            // Failures were already observed by the session at this point
            Ok(Err(e)) => {
                log::debug!("Transport stopped with error: {e}");
                Ok(())
            }
            Err(e) => Err(TransportError::Task(e.to_string())),
        }
    }
}

/// Blocking loop that answers the host and pushes input reports
struct Reporter {
    device: UHIDDevice<File>,
    protocol: SwitchProtocol,
    state: SharedControllerState,
    capture: Option<CaptureLog>,
    interval: Duration,
    connected_tx: watch::Sender<bool>,
}

impl Reporter {
    fn run(&mut self, cancel: &CancellationToken) -> Result<(), TransportError> {
        while !cancel.is_cancelled() {
            // Handle reading from the device
            // https://www.kernel.org/doc/html/latest/hid/uhid.html#read
            loop {
                match self.device.read() {
                    Ok(event) => self.handle_event(event)?,
                    Err(StreamError::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => break,
                    Err(StreamError::Io(e)) => return Err(e.into()),
                    Err(StreamError::UnknownEventType(e)) => {
                        log::debug!("Unknown event type: {:?}", e);
                        break;
                    }
                }
            }

            // Full reports are only pushed after the host asked for them
            if self.protocol.is_connected() {
                let snapshot = self.state.snapshot();
                let report = self.protocol.input_report(&snapshot)?;
                self.write(&report)?;
            }

            thread::sleep(self.interval);
        }

        Ok(())
    }

    fn handle_event(&mut self, event: OutputEvent) -> Result<(), TransportError> {
        match event {
            OutputEvent::Start { dev_flags: _ } => {
                log::debug!("Start event received");
            }
            OutputEvent::Stop => {
                log::debug!("Stop event received");
                if self.protocol.is_connected() {
                    return Err(TransportError::DeviceStopped);
                }
            }
            OutputEvent::Open => {
                log::debug!("Open event received");
            }
            OutputEvent::Close => {
                log::debug!("Close event received");
            }
            OutputEvent::Output { data } => {
                self.handle_output(&data)?;
            }
            OutputEvent::GetReport {
                id,
                report_number,
                report_type,
            } => {
                log::debug!(
                    "Received GetReport event: id: {id}, num: {report_number}, type: {:?}",
                    report_type
                );
                let report = self.protocol.input_report(&self.state.snapshot())?;
                self.device
                    .write_get_report_reply(id, 0, report.to_vec())?;
            }
            OutputEvent::SetReport {
                id,
                report_number,
                report_type,
                data,
            } => {
                log::debug!(
                    "Received SetReport event: id: {id}, num: {report_number}, type: {:?}",
                    report_type
                );
                self.device.write_set_report_reply(id, 0)?;
                self.handle_output(&data)?;
            }
        }

        Ok(())
    }

    fn handle_output(&mut self, data: &[u8]) -> Result<(), TransportError> {
        log::trace!("Got output data: {:02x?}", data);
        self.record(Direction::Received, data);
        let snapshot = self.state.snapshot();
        for event in self.protocol.handle_output(data, &snapshot)? {
            match event {
                ProtocolEvent::Reply(reply) => self.write(&reply)?,
                ProtocolEvent::Connected => {
                    log::info!("Host completed the handshake");
                    self.connected_tx.send_replace(true);
                }
                ProtocolEvent::HostDisconnected => {
                    log::info!("Host dropped the connection");
                    return Err(TransportError::HostDisconnected);
                }
            }
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.device.write(data)?;
        self.record(Direction::Sent, data);
        Ok(())
    }

    fn record(&mut self, direction: Direction, data: &[u8]) {
        let Some(capture) = self.capture.as_mut() else {
            return;
        };
        if let Err(e) = capture.record(direction, data) {
            log::warn!("Failed to write capture, disabling it: {e}");
            self.capture = None;
        }
    }

    /// Flush the capture and release the virtual device
    fn finish(mut self) {
        if let Some(capture) = self.capture.as_mut() {
            if let Err(e) = capture.flush() {
                log::warn!("Failed to flush capture: {e}");
            }
        }
        log::debug!("Destroying HID device");
        if let Err(e) = self.device.destroy() {
            log::error!("Failed to destroy device: {:?}", e);
        }
    }
}
