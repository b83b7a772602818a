use std::{io, path::Path};

use thiserror::Error;

/// Size of the SPI flash of a Switch controller
pub const FLASH_SIZE: usize = 0x80000;

/// Factory IMU calibration
const IMU_CALIBRATION_ADDR: usize = 0x6020;
const IMU_CALIBRATION: [u8; 24] = [
    0xbe, 0xff, 0x3e, 0x00, 0xf0, 0x01, 0x00, 0x40, 0x00, 0x40, 0x00, 0x40, 0xfe, 0xff, 0xfe,
    0xff, 0x08, 0x00, 0xe7, 0x3b, 0xe7, 0x3b, 0xe7, 0x3b,
];

/// Factory stick calibration, left then right
const STICK_CALIBRATION_ADDR: usize = 0x603d;
const STICK_CALIBRATION: [u8; 18] = [
    0x00, 0x07, 0x70, 0x00, 0x08, 0x80, 0x00, 0x07, 0x70, 0x00, 0x08, 0x80, 0x00, 0x07, 0x70,
    0x00, 0x07, 0x70,
];

/// Body, button, left grip and right grip colors
const COLORS_ADDR: usize = 0x6050;
const COLORS: [u8; 12] = [
    0x32, 0x32, 0x32, 0xff, 0xff, 0xff, 0x32, 0x32, 0x32, 0xff, 0xff, 0xff,
];

/// 6-axis horizontal offsets
const SENSOR_PARAMETERS_ADDR: usize = 0x6080;
const SENSOR_PARAMETERS: [u8; 6] = [0x50, 0xfd, 0x00, 0x00, 0xc6, 0x0f];

/// Dead zone and range ratio, written for both sticks
const LEFT_STICK_PARAMETERS_ADDR: usize = 0x6086;
const RIGHT_STICK_PARAMETERS_ADDR: usize = 0x6098;
const STICK_PARAMETERS: [u8; 18] = [
    0x0f, 0x30, 0x61, 0x96, 0x30, 0xf3, 0xd4, 0x14, 0x54, 0x41, 0x15, 0x54, 0xc7, 0x79, 0x9c,
    0x33, 0x36, 0x63,
];

#[derive(Error, Debug)]
pub enum FlashError {
    #[error("could not read flash image: {0}")]
    Io(#[from] io::Error),
    #[error("flash image must be exactly {FLASH_SIZE} bytes, got {0}")]
    InvalidSize(usize),
}

/// Emulated SPI flash of a Switch controller. The host reads calibration and
/// color data from it during the handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct FlashMemory {
    data: Vec<u8>,
}

impl FlashMemory {
    /// Create an erased flash with factory calibration and default colors.
    /// User calibration areas stay erased, which the host reads as "no user
    /// calibration".
    pub fn new() -> Self {
        let mut data = vec![0xff; FLASH_SIZE];
        let defaults: [(usize, &[u8]); 6] = [
            (IMU_CALIBRATION_ADDR, &IMU_CALIBRATION),
            (STICK_CALIBRATION_ADDR, &STICK_CALIBRATION),
            (COLORS_ADDR, &COLORS),
            (SENSOR_PARAMETERS_ADDR, &SENSOR_PARAMETERS),
            (LEFT_STICK_PARAMETERS_ADDR, &STICK_PARAMETERS),
            (RIGHT_STICK_PARAMETERS_ADDR, &STICK_PARAMETERS),
        ];
        for (addr, bytes) in defaults {
            data[addr..addr + bytes.len()].copy_from_slice(bytes);
        }
        Self { data }
    }

    /// Use the given flash image. It replaces the whole flash.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FlashError> {
        if data.len() != FLASH_SIZE {
            return Err(FlashError::InvalidSize(data.len()));
        }
        Ok(Self { data })
    }

    /// Load a flash image from the given file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FlashError> {
        let path = path.as_ref();
        log::debug!("Loading SPI flash image from {}", path.display());
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Read `len` bytes starting at `addr`. Reads past the end of the flash
    /// return erased bytes.
    pub fn read(&self, addr: u32, len: u8) -> Vec<u8> {
        let start = (addr as usize).min(FLASH_SIZE);
        let end = (start + len as usize).min(FLASH_SIZE);
        let mut bytes = self.data[start..end].to_vec();
        bytes.resize(len as usize, 0xff);
        bytes
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for FlashMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FlashMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashMemory")
            .field("len", &self.data.len())
            .finish()
    }
}
