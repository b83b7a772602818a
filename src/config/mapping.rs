use std::{collections::HashMap, io::Read, path::Path};

use evdev::{AbsoluteAxisCode, KeyCode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    path::{get_mappings_paths, get_multidir_sorted_files},
    LoadError,
};

/// Mapping table that is built into the binary and used when no other table
/// was requested.
pub const DEFAULT_MAPPING: &str =
    include_str!("../../rootfs/usr/share/xbox-to-switch/mappings/xbox_one.yaml");

/// Identifier of the built-in mapping table
pub const DEFAULT_MAPPING_ID: &str = "xbox_one";

/// Loads all mapping tables in all default locations and returns a hashmap
/// of the mapping table ID and the [MappingConfig]. The built-in table is
/// always present, but may be overridden by a file with the same ID.
pub fn load_mappings() -> HashMap<String, MappingConfig> {
    let mut mappings = HashMap::new();
    match MappingConfig::from_yaml(DEFAULT_MAPPING.to_string()) {
        Ok(map) => {
            mappings.insert(map.id.clone(), map);
        }
        Err(e) => log::error!("Failed to parse built-in mapping table: {e}"),
    }

    let paths = get_mappings_paths();
    let files = get_multidir_sorted_files(paths.as_slice(), |entry| {
        entry
            .path()
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
    });

    for file in files {
        log::trace!("Found file: {}", file.display());
        let map = match MappingConfig::from_yaml_file(&file) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Failed to parse mapping table {}: {e}", file.display());
                continue;
            }
        };
        mappings.insert(map.id.clone(), map);
    }

    mappings
}

/// The [MappingConfig] defines how events from a physical gamepad are
/// translated into changes of the emulated controller.
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct MappingConfig {
    pub version: u32,
    pub kind: String,
    pub name: String,
    pub id: String,
    pub mapping: Vec<EventMapping>,
}

impl MappingConfig {
    /// Load a [MappingConfig] from the given YAML string
    pub fn from_yaml(content: String) -> Result<Self, LoadError> {
        let config: MappingConfig = serde_yaml::from_str(content.as_str())?;
        Ok(config)
    }

    /// Load a [MappingConfig] from the given YAML file
    pub fn from_yaml_file<P>(path: P) -> Result<Self, LoadError>
    where
        P: AsRef<Path>,
    {
        let mut file = std::fs::File::open(path)?;
        let mut content = String::default();
        file.read_to_string(&mut content)?;
        Self::from_yaml(content)
    }

    /// Returns the built-in mapping table
    pub fn builtin() -> Result<Self, LoadError> {
        Self::from_yaml(DEFAULT_MAPPING.to_string())
    }

    /// Look up a mapping table by either a path to a YAML file or the ID of
    /// a table in one of the default locations.
    pub fn find(id_or_path: &str) -> Result<Self, LoadError> {
        let path = Path::new(id_or_path);
        if path.is_file() {
            return Self::from_yaml_file(path);
        }
        let mut mappings = load_mappings();
        mappings
            .remove(id_or_path)
            .ok_or_else(|| LoadError::NotFound(id_or_path.to_string()))
    }
}

/// A single entry in a mapping table
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct EventMapping {
    pub name: String,
    pub source_event: SourceEventConfig,
    pub target_event: TargetEventConfig,
}

/// The physical event to match. Exactly one field should be set.
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SourceEventConfig {
    pub key: Option<KeyName>,
    pub axis: Option<AxisName>,
    pub hat: Option<AxisName>,
}

/// What the matched event changes on the emulated controller. Exactly one
/// field should be set.
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TargetEventConfig {
    /// Name of a digital button
    pub button: Option<String>,
    pub trigger: Option<TriggerTargetConfig>,
    pub stick: Option<StickTargetConfig>,
    pub dpad: Option<DpadTargetConfig>,
}

/// Translates an analog axis into a digital button. The raw value is shifted
/// right by `shift` bits and the button is pressed only if the result is
/// exactly 1.
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TriggerTargetConfig {
    pub button: String,
    pub shift: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct StickTargetConfig {
    pub side: StickSide,
    pub axis: StickDirection,
    /// Invert the polarity of the source axis
    pub inverted: Option<bool>,
}

/// Pair of buttons driven by one hat axis. A value of -1 presses `negative`,
/// 1 presses `positive` and 0 releases both.
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct DpadTargetConfig {
    pub negative: String,
    pub positive: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StickSide {
    Left,
    Right,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StickDirection {
    Horizontal,
    Vertical,
}

/// Gamepad key codes that can be used in a mapping table
#[derive(Debug, Deserialize, Serialize, Clone, Copy, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyName {
    BtnSouth,
    BtnEast,
    BtnNorth,
    BtnWest,
    BtnTl,
    BtnTr,
    BtnTl2,
    BtnTr2,
    BtnSelect,
    BtnStart,
    BtnMode,
    BtnThumbl,
    BtnThumbr,
    BtnDpadUp,
    BtnDpadDown,
    BtnDpadLeft,
    BtnDpadRight,
}

impl From<KeyName> for KeyCode {
    fn from(value: KeyName) -> Self {
        match value {
            KeyName::BtnSouth => KeyCode::BTN_SOUTH,
            KeyName::BtnEast => KeyCode::BTN_EAST,
            KeyName::BtnNorth => KeyCode::BTN_NORTH,
            KeyName::BtnWest => KeyCode::BTN_WEST,
            KeyName::BtnTl => KeyCode::BTN_TL,
            KeyName::BtnTr => KeyCode::BTN_TR,
            KeyName::BtnTl2 => KeyCode::BTN_TL2,
            KeyName::BtnTr2 => KeyCode::BTN_TR2,
            KeyName::BtnSelect => KeyCode::BTN_SELECT,
            KeyName::BtnStart => KeyCode::BTN_START,
            KeyName::BtnMode => KeyCode::BTN_MODE,
            KeyName::BtnThumbl => KeyCode::BTN_THUMBL,
            KeyName::BtnThumbr => KeyCode::BTN_THUMBR,
            KeyName::BtnDpadUp => KeyCode::BTN_DPAD_UP,
            KeyName::BtnDpadDown => KeyCode::BTN_DPAD_DOWN,
            KeyName::BtnDpadLeft => KeyCode::BTN_DPAD_LEFT,
            KeyName::BtnDpadRight => KeyCode::BTN_DPAD_RIGHT,
        }
    }
}

/// Absolute axis codes that can be used in a mapping table
#[derive(Debug, Deserialize, Serialize, Clone, Copy, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisName {
    AbsX,
    AbsY,
    AbsZ,
    AbsRx,
    AbsRy,
    AbsRz,
    AbsGas,
    AbsBrake,
    AbsHat0x,
    AbsHat0y,
}

impl From<AxisName> for AbsoluteAxisCode {
    fn from(value: AxisName) -> Self {
        match value {
            AxisName::AbsX => AbsoluteAxisCode::ABS_X,
            AxisName::AbsY => AbsoluteAxisCode::ABS_Y,
            AxisName::AbsZ => AbsoluteAxisCode::ABS_Z,
            AxisName::AbsRx => AbsoluteAxisCode::ABS_RX,
            AxisName::AbsRy => AbsoluteAxisCode::ABS_RY,
            AxisName::AbsRz => AbsoluteAxisCode::ABS_RZ,
            AxisName::AbsGas => AbsoluteAxisCode::ABS_GAS,
            AxisName::AbsBrake => AbsoluteAxisCode::ABS_BRAKE,
            AxisName::AbsHat0x => AbsoluteAxisCode::ABS_HAT0X,
            AxisName::AbsHat0y => AbsoluteAxisCode::ABS_HAT0Y,
        }
    }
}
