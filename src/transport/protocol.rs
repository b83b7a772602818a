//! Switch controller protocol spoken over the virtual HID device. The host
//! drives the handshake by sending USB commands (0x80) and subcommands
//! (0x01); every one of them that expects an answer gets an input report
//! in return.
use packed_struct::{PackedStruct, PackingError};

use crate::{
    controller::ControllerState,
    drivers::switch::hid_report::{
        BatteryConnection, PackedInputDataReport, PackedSubcommandReplyReport, ReportType,
        INPUT_REPORT_SIZE,
    },
};

use super::{flash::FlashMemory, ControllerKind};

/// Offset of the subcommand ID in a 0x01 output report. It follows the
/// report ID, the packet counter and 8 bytes of rumble data.
const SUBCOMMAND_OFFSET: usize = 10;

// USB commands
const USB_STATUS: u8 = 0x01;
const USB_HANDSHAKE: u8 = 0x02;
const USB_HIGH_SPEED: u8 = 0x03;
const USB_NO_TIMEOUT: u8 = 0x04;
const USB_DISCONNECT: u8 = 0x05;

// Subcommands
const SUBCMD_DEVICE_INFO: u8 = 0x02;
const SUBCMD_SET_REPORT_MODE: u8 = 0x03;
const SUBCMD_TRIGGER_ELAPSED: u8 = 0x04;
const SUBCMD_SHIPMENT_STATE: u8 = 0x08;
const SUBCMD_SPI_READ: u8 = 0x10;
const SUBCMD_MCU_CONFIG: u8 = 0x21;
const SUBCMD_PLAYER_LIGHTS: u8 = 0x30;
const SUBCMD_HOME_LIGHT: u8 = 0x38;
const SUBCMD_ENABLE_IMU: u8 = 0x40;
const SUBCMD_IMU_SENSITIVITY: u8 = 0x41;
const SUBCMD_ENABLE_VIBRATION: u8 = 0x48;

/// Input report mode that makes the controller push full reports
const STANDARD_REPORT_MODE: u8 = 0x30;

/// Firmware version reported in device info
const FIRMWARE_VERSION: [u8; 2] = [0x03, 0x48];
/// Generic acknowledgement without data
const ACK: u8 = 0x80;

/// Result of handling a report from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// Report that must be written to the host
    Reply(Vec<u8>),
    /// The host completed the handshake
    Connected,
    /// The host dropped the connection
    HostDisconnected,
}

/// Tracks the handshake with the host and builds every input report
#[derive(Debug)]
pub struct SwitchProtocol {
    kind: ControllerKind,
    device_id: [u8; 6],
    flash: FlashMemory,
    timer: u8,
    connected: bool,
}

impl SwitchProtocol {
    pub fn new(kind: ControllerKind, device_id: [u8; 6], flash: FlashMemory) -> Self {
        Self {
            kind,
            device_id,
            flash,
            timer: 0,
            connected: false,
        }
    }

    /// Returns true once the host completed the handshake
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Build the next standard input report from the given state
    pub fn input_report(
        &mut self,
        state: &ControllerState,
    ) -> Result<[u8; INPUT_REPORT_SIZE], PackingError> {
        let mut report = PackedInputDataReport {
            timer: self.next_timer(),
            info: self.battery(),
            ..Default::default()
        };
        report.set_state(state);
        report.pack()
    }

    /// Handle a report sent by the host
    pub fn handle_output(
        &mut self,
        data: &[u8],
        state: &ControllerState,
    ) -> Result<Vec<ProtocolEvent>, PackingError> {
        let Some(id) = data.first() else {
            log::trace!("Ignoring empty output report");
            return Ok(vec![]);
        };
        match ReportType::try_from(*id) {
            Ok(ReportType::UsbCommandOutputReport) => Ok(self.handle_usb_command(data)),
            Ok(ReportType::CommandOutputReport) => self.handle_subcommand(data, state),
            Ok(ReportType::RumbleOutputReport) => {
                log::trace!("Ignoring rumble report");
                Ok(vec![])
            }
            _ => {
                log::debug!("Ignoring unknown output report: 0x{id:02x}");
                Ok(vec![])
            }
        }
    }

    fn handle_usb_command(&mut self, data: &[u8]) -> Vec<ProtocolEvent> {
        let Some(command) = data.get(1) else {
            return vec![];
        };
        match *command {
            USB_STATUS => {
                log::debug!("Host requested controller status");
                let mut reply = vec![
                    ReportType::UsbCommandInputReport as u8,
                    USB_STATUS,
                    0x00,
                    self.kind.type_byte(),
                ];
                // Address is sent in reverse byte order
                reply.extend(self.device_id.iter().rev());
                vec![ProtocolEvent::Reply(pad_report(reply))]
            }
            USB_HANDSHAKE | USB_HIGH_SPEED => {
                log::debug!("Host sent USB command 0x{command:02x}");
                let reply = vec![ReportType::UsbCommandInputReport as u8, *command];
                vec![ProtocolEvent::Reply(pad_report(reply))]
            }
            USB_NO_TIMEOUT => {
                log::debug!("Host enabled USB only mode");
                self.set_connected()
            }
            USB_DISCONNECT => {
                log::debug!("Host re-enabled the Bluetooth timeout");
                self.connected = false;
                vec![ProtocolEvent::HostDisconnected]
            }
            _ => {
                log::debug!("Ignoring unknown USB command: 0x{command:02x}");
                vec![]
            }
        }
    }

    fn handle_subcommand(
        &mut self,
        data: &[u8],
        state: &ControllerState,
    ) -> Result<Vec<ProtocolEvent>, PackingError> {
        let Some(subcommand) = data.get(SUBCOMMAND_OFFSET).copied() else {
            log::debug!("Ignoring truncated subcommand report: {data:02x?}");
            return Ok(vec![]);
        };
        let args = &data[SUBCOMMAND_OFFSET + 1..];
        let mut events = vec![];

        let (ack, reply) = match subcommand {
            SUBCMD_DEVICE_INFO => {
                log::debug!("Host requested device info");
                let mut reply = FIRMWARE_VERSION.to_vec();
                reply.extend([self.kind.type_byte(), 0x02]);
                reply.extend(self.device_id);
                // Use the colors stored in SPI flash
                reply.extend([0x01, 0x01]);
                (0x82, reply)
            }
            SUBCMD_SET_REPORT_MODE => {
                let mode = args.first().copied().unwrap_or_default();
                log::debug!("Host set input report mode: 0x{mode:02x}");
                if mode == STANDARD_REPORT_MODE {
                    events.extend(self.set_connected());
                }
                (ACK, vec![])
            }
            SUBCMD_TRIGGER_ELAPSED => (0x83, vec![]),
            SUBCMD_SPI_READ => match spi_read_args(args) {
                Some((addr, len)) => {
                    log::debug!("Host read {len} bytes of SPI flash at 0x{addr:04x}");
                    let mut reply = addr.to_le_bytes().to_vec();
                    reply.push(len);
                    reply.extend(self.flash.read(addr, len));
                    (0x90, reply)
                }
                None => {
                    log::debug!("Ignoring truncated SPI flash read: {args:02x?}");
                    (ACK, vec![])
                }
            },
            SUBCMD_MCU_CONFIG => (
                0xa0,
                vec![0x01, 0x00, 0xff, 0x00, 0x03, 0x00, 0x05, 0x01],
            ),
            SUBCMD_SHIPMENT_STATE
            | SUBCMD_PLAYER_LIGHTS
            | SUBCMD_HOME_LIGHT
            | SUBCMD_ENABLE_IMU
            | SUBCMD_IMU_SENSITIVITY
            | SUBCMD_ENABLE_VIBRATION => {
                log::trace!("Acknowledging subcommand 0x{subcommand:02x}");
                (ACK, vec![])
            }
            _ => {
                log::debug!("Unknown subcommand: 0x{subcommand:02x}");
                (ACK, vec![])
            }
        };

        let reply = self.subcommand_reply(subcommand, ack, &reply, state)?;
        events.insert(0, ProtocolEvent::Reply(reply.to_vec()));
        Ok(events)
    }

    /// Build a subcommand reply that carries the current state
    pub fn subcommand_reply(
        &mut self,
        subcommand: u8,
        ack: u8,
        data: &[u8],
        state: &ControllerState,
    ) -> Result<[u8; INPUT_REPORT_SIZE], PackingError> {
        let mut report = PackedSubcommandReplyReport {
            timer: self.next_timer(),
            info: self.battery(),
            ack,
            subcommand,
            ..Default::default()
        };
        report.set_state(state);
        report.set_data(data);
        report.pack()
    }

    fn set_connected(&mut self) -> Vec<ProtocolEvent> {
        if self.connected {
            return vec![];
        }
        self.connected = true;
        vec![ProtocolEvent::Connected]
    }

    fn next_timer(&mut self) -> u8 {
        let timer = self.timer;
        self.timer = self.timer.wrapping_add(1);
        timer
    }

    fn battery(&self) -> BatteryConnection {
        match self.kind {
            ControllerKind::ProController => BatteryConnection::pro_controller(),
            ControllerKind::JoyconL | ControllerKind::JoyconR => BatteryConnection::joycon(),
        }
    }
}

/// Parse the little endian address and length of an SPI flash read
fn spi_read_args(args: &[u8]) -> Option<(u32, u8)> {
    let addr: [u8; 4] = args.get(..4)?.try_into().ok()?;
    let len = *args.get(4)?;
    Some((u32::from_le_bytes(addr), len))
}

fn pad_report(mut report: Vec<u8>) -> Vec<u8> {
    report.resize(INPUT_REPORT_SIZE, 0);
    report
}
