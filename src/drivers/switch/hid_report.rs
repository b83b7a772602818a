//! Sources:
//! - https://github.com/dekuNukem/Nintendo_Switch_Reverse_Engineering/blob/master/bluetooth_hid_notes.md
//! - https://github.com/dekuNukem/Nintendo_Switch_Reverse_Engineering/blob/master/USB-HID-Notes.md
//! - https://github.com/torvalds/linux/blob/master/drivers/hid/hid-nintendo.c
use packed_struct::prelude::*;

use crate::controller::{Button, ControllerState, StickState};

/// Size in bytes of every input report sent to the host
pub const INPUT_REPORT_SIZE: usize = 64;
/// Maximum number of reply data bytes in a subcommand reply
pub const SUBCOMMAND_REPLY_DATA_SIZE: usize = 35;

#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReportType {
    /// Rumble and subcommand from the host
    CommandOutputReport = 0x01,
    /// Rumble only from the host
    RumbleOutputReport = 0x10,
    /// Standard input report with a subcommand reply
    CommandInputReport = 0x21,
    /// Standard full mode input report pushed at a fixed rate
    StandardInputReport = 0x30,
    /// USB command from the host
    UsbCommandOutputReport = 0x80,
    /// Reply to a USB command
    UsbCommandInputReport = 0x81,
}

impl TryFrom<u8> for ReportType {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::CommandOutputReport),
            0x10 => Ok(Self::RumbleOutputReport),
            0x21 => Ok(Self::CommandInputReport),
            0x30 => Ok(Self::StandardInputReport),
            0x80 => Ok(Self::UsbCommandOutputReport),
            0x81 => Ok(Self::UsbCommandInputReport),
            _ => Err("Invalid report type"),
        }
    }
}

#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Eq, Debug)]
pub enum BatteryLevel {
    Empty = 0,
    Critical = 1,
    Low = 2,
    Medium = 3,
    Full = 4,
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "1")]
pub struct BatteryConnection {
    #[packed_field(bits = "0..=2", ty = "enum")]
    pub battery_level: BatteryLevel,
    #[packed_field(bits = "3")]
    pub charging: bool,
    /// Connection info. (con_info >> 1) & 3 - 3=JC, 0=Pro/ChrGrip. con_info & 1 - 1=Switch/USB powered.
    #[packed_field(bits = "4..=7")]
    pub conn_info: u8,
}

impl BatteryConnection {
    /// Full battery on a wired Pro Controller
    pub fn pro_controller() -> Self {
        Self {
            battery_level: BatteryLevel::Full,
            charging: true,
            conn_info: 0x1,
        }
    }

    /// Full battery on a Joy-Con attached to the console
    pub fn joycon() -> Self {
        Self {
            battery_level: BatteryLevel::Full,
            charging: false,
            conn_info: 0xE,
        }
    }
}

impl Default for BatteryConnection {
    fn default() -> Self {
        Self::pro_controller()
    }
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "3")]
pub struct ButtonStatus {
    // byte 0 (Right)
    #[packed_field(bits = "7")]
    pub y: bool,
    #[packed_field(bits = "6")]
    pub x: bool,
    #[packed_field(bits = "5")]
    pub b: bool,
    #[packed_field(bits = "4")]
    pub a: bool,
    #[packed_field(bits = "3")]
    pub sr_right: bool,
    #[packed_field(bits = "2")]
    pub sl_right: bool,
    #[packed_field(bits = "1")]
    pub r: bool,
    #[packed_field(bits = "0")]
    pub zr: bool,

    // byte 1 (Shared)
    #[packed_field(bits = "15")]
    pub minus: bool,
    #[packed_field(bits = "14")]
    pub plus: bool,
    #[packed_field(bits = "13")]
    pub r_stick: bool,
    #[packed_field(bits = "12")]
    pub l_stick: bool,
    #[packed_field(bits = "11")]
    pub home: bool,
    #[packed_field(bits = "10")]
    pub capture: bool,
    #[packed_field(bits = "9")]
    pub _unused: bool,
    #[packed_field(bits = "8")]
    pub charging_grip: bool,

    // byte 2 (Left)
    #[packed_field(bits = "23")]
    pub down: bool,
    #[packed_field(bits = "22")]
    pub up: bool,
    #[packed_field(bits = "21")]
    pub right: bool,
    #[packed_field(bits = "20")]
    pub left: bool,
    #[packed_field(bits = "19")]
    pub sr_left: bool,
    #[packed_field(bits = "18")]
    pub sl_left: bool,
    #[packed_field(bits = "17")]
    pub l: bool,
    #[packed_field(bits = "16")]
    pub zl: bool,
}

impl From<&ControllerState> for ButtonStatus {
    fn from(state: &ControllerState) -> Self {
        let sr = state.is_pressed(Button::Sr);
        let sl = state.is_pressed(Button::Sl);
        Self {
            y: state.is_pressed(Button::Y),
            x: state.is_pressed(Button::X),
            b: state.is_pressed(Button::B),
            a: state.is_pressed(Button::A),
            sr_right: sr,
            sl_right: sl,
            r: state.is_pressed(Button::R),
            zr: state.is_pressed(Button::Zr),
            minus: state.is_pressed(Button::Minus),
            plus: state.is_pressed(Button::Plus),
            r_stick: state.is_pressed(Button::RStick),
            l_stick: state.is_pressed(Button::LStick),
            home: state.is_pressed(Button::Home),
            capture: state.is_pressed(Button::Capture),
            _unused: false,
            charging_grip: false,
            down: state.is_pressed(Button::Down),
            up: state.is_pressed(Button::Up),
            right: state.is_pressed(Button::Right),
            left: state.is_pressed(Button::Left),
            sr_left: sr,
            sl_left: sl,
            l: state.is_pressed(Button::L),
            zl: state.is_pressed(Button::Zl),
        }
    }
}

/// Two 12-bit stick coordinates packed into 3 bytes:
/// `[h & 0xFF, (h >> 8) | ((v & 0xF) << 4), v >> 4]`
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "3")]
pub struct StickData {
    #[packed_field(bytes = "0..=2")]
    pub data: [u8; 3],
}

impl StickData {
    pub fn new(horizontal: u16, vertical: u16) -> Self {
        let mut stick = Self { data: [0; 3] };
        stick.set_horizontal(horizontal);
        stick.set_vertical(vertical);
        stick
    }

    pub fn horizontal(&self) -> u16 {
        self.data[0] as u16 | ((self.data[1] as u16 & 0x0F) << 8)
    }

    pub fn vertical(&self) -> u16 {
        (self.data[1] as u16 >> 4) | ((self.data[2] as u16) << 4)
    }

    pub fn set_horizontal(&mut self, value: u16) {
        let value = value & 0x0FFF;
        self.data[0] = (value & 0xFF) as u8;
        self.data[1] = (self.data[1] & 0xF0) | (value >> 8) as u8;
    }

    pub fn set_vertical(&mut self, value: u16) {
        let value = value & 0x0FFF;
        self.data[1] = (self.data[1] & 0x0F) | ((value & 0x0F) << 4) as u8;
        self.data[2] = (value >> 4) as u8;
    }
}

impl Default for StickData {
    fn default() -> Self {
        let center = StickState::default();
        Self::new(center.horizontal, center.vertical)
    }
}

impl From<&StickState> for StickData {
    fn from(stick: &StickState) -> Self {
        Self::new(stick.horizontal, stick.vertical)
    }
}

/// Standard full mode input report (0x30). The 6-axis data that follows the
/// vibrator byte is left zeroed since no motion sensors are emulated.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "64")]
pub struct PackedInputDataReport {
    // byte 0-2
    /// Input report ID
    #[packed_field(bytes = "0", ty = "enum")]
    pub id: ReportType,
    /// Timer. Increments with every report sent.
    #[packed_field(bytes = "1")]
    pub timer: u8,
    /// Battery and connection information
    #[packed_field(bytes = "2")]
    pub info: BatteryConnection,

    // byte 3-5
    /// Button status
    #[packed_field(bytes = "3..=5")]
    pub buttons: ButtonStatus,

    // byte 6-11
    /// Left analog stick
    #[packed_field(bytes = "6..=8")]
    pub left_stick: StickData,
    /// Right analog stick
    #[packed_field(bytes = "9..=11")]
    pub right_stick: StickData,

    // byte 12
    /// Vibrator input report. Decides if next vibration pattern should be sent.
    #[packed_field(bytes = "12")]
    pub vibrator_report: u8,
}

impl Default for PackedInputDataReport {
    fn default() -> Self {
        Self {
            id: ReportType::StandardInputReport,
            timer: 0,
            info: BatteryConnection::default(),
            buttons: ButtonStatus::default(),
            left_stick: StickData::default(),
            right_stick: StickData::default(),
            vibrator_report: 0x80,
        }
    }
}

impl PackedInputDataReport {
    /// Update the buttons and sticks of the report from the given state
    pub fn set_state(&mut self, state: &ControllerState) {
        self.buttons = state.into();
        self.left_stick = (&state.left_stick).into();
        self.right_stick = (&state.right_stick).into();
    }
}

/// Subcommand reply (0x21). Carries the same input data as the standard
/// report followed by the acknowledgement of a subcommand.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "64")]
pub struct PackedSubcommandReplyReport {
    #[packed_field(bytes = "0", ty = "enum")]
    pub id: ReportType,
    #[packed_field(bytes = "1")]
    pub timer: u8,
    #[packed_field(bytes = "2")]
    pub info: BatteryConnection,
    #[packed_field(bytes = "3..=5")]
    pub buttons: ButtonStatus,
    #[packed_field(bytes = "6..=8")]
    pub left_stick: StickData,
    #[packed_field(bytes = "9..=11")]
    pub right_stick: StickData,
    #[packed_field(bytes = "12")]
    pub vibrator_report: u8,

    // byte 13-14
    /// ACK byte. MSB set means the subcommand was accepted; the remaining
    /// bits describe the type of data that follows.
    #[packed_field(bytes = "13")]
    pub ack: u8,
    /// ID of the subcommand being answered
    #[packed_field(bytes = "14")]
    pub subcommand: u8,

    // byte 15-49
    /// Subcommand specific reply data
    #[packed_field(bytes = "15..=49")]
    pub data: [u8; 35],
}

impl Default for PackedSubcommandReplyReport {
    fn default() -> Self {
        Self {
            id: ReportType::CommandInputReport,
            timer: 0,
            info: BatteryConnection::default(),
            buttons: ButtonStatus::default(),
            left_stick: StickData::default(),
            right_stick: StickData::default(),
            vibrator_report: 0x80,
            ack: 0x80,
            subcommand: 0,
            data: [0; SUBCOMMAND_REPLY_DATA_SIZE],
        }
    }
}

impl PackedSubcommandReplyReport {
    pub fn set_state(&mut self, state: &ControllerState) {
        self.buttons = state.into();
        self.left_stick = (&state.left_stick).into();
        self.right_stick = (&state.right_stick).into();
    }

    /// Copy the given reply data into the report. Data beyond the size of
    /// the report is dropped.
    pub fn set_data(&mut self, data: &[u8]) {
        let len = data.len().min(SUBCOMMAND_REPLY_DATA_SIZE);
        if len < data.len() {
            log::warn!(
                "Subcommand 0x{:02x} reply truncated from {} to {len} bytes",
                self.subcommand,
                data.len()
            );
        }
        self.data[..len].copy_from_slice(&data[..len]);
    }
}
