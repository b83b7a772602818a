pub mod hid_report;
pub mod report_descriptor;

/// Nintendo vendor ID
pub const VID: u16 = 0x057e;
/// Product ID of the Joy-Con (L)
pub const PID_JOYCON_L: u16 = 0x2006;
/// Product ID of the Joy-Con (R)
pub const PID_JOYCON_R: u16 = 0x2007;
/// Product ID of the Pro Controller
pub const PID_PRO_CONTROLLER: u16 = 0x2009;
