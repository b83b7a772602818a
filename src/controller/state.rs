use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// Minimum value of a stick coordinate
pub const STICK_MIN: u16 = 0;
/// Maximum value of a stick coordinate
pub const STICK_MAX: u16 = 4095;
/// Neutral value of a stick coordinate
pub const STICK_CENTER: u16 = 2048;

/// Possible errors when mutating a [ControllerState]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown button: {0}")]
    UnknownButton(String),
    #[error("controller state is not connected")]
    NotConnected,
}

/// The fixed set of digital buttons on the virtual controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    Y,
    X,
    B,
    A,
    R,
    Zr,
    Minus,
    Plus,
    RStick,
    LStick,
    Home,
    Capture,
    Down,
    Up,
    Right,
    Left,
    L,
    Zl,
    Sr,
    Sl,
}

impl Button {
    /// Number of buttons in the fixed set
    pub const COUNT: usize = 20;

    /// All buttons, in report order
    pub const ALL: [Button; Button::COUNT] = [
        Button::Y,
        Button::X,
        Button::B,
        Button::A,
        Button::R,
        Button::Zr,
        Button::Minus,
        Button::Plus,
        Button::RStick,
        Button::LStick,
        Button::Home,
        Button::Capture,
        Button::Down,
        Button::Up,
        Button::Right,
        Button::Left,
        Button::L,
        Button::Zl,
        Button::Sr,
        Button::Sl,
    ];

    /// Returns the name used for this button in mapping tables
    pub fn name(&self) -> &'static str {
        match self {
            Button::Y => "y",
            Button::X => "x",
            Button::B => "b",
            Button::A => "a",
            Button::R => "r",
            Button::Zr => "zr",
            Button::Minus => "minus",
            Button::Plus => "plus",
            Button::RStick => "r_stick",
            Button::LStick => "l_stick",
            Button::Home => "home",
            Button::Capture => "capture",
            Button::Down => "down",
            Button::Up => "up",
            Button::Right => "right",
            Button::Left => "left",
            Button::L => "l",
            Button::Zl => "zl",
            Button::Sr => "sr",
            Button::Sl => "sl",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Button {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::ALL
            .iter()
            .find(|button| button.name() == s)
            .copied()
            .ok_or_else(|| StateError::UnknownButton(s.to_string()))
    }
}

/// Identifies one of the two analog sticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickId {
    Left,
    Right,
}

/// Identifies one coordinate of an analog stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickAxis {
    Horizontal,
    Vertical,
}

/// Position of a single analog stick in the range 0-4095
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickState {
    pub horizontal: u16,
    pub vertical: u16,
}

impl Default for StickState {
    fn default() -> Self {
        Self {
            horizontal: STICK_CENTER,
            vertical: STICK_CENTER,
        }
    }
}

impl StickState {
    /// Set the given coordinate, clamping the value into the valid range.
    pub fn set(&mut self, axis: StickAxis, value: i32) {
        let value = value.clamp(STICK_MIN as i32, STICK_MAX as i32) as u16;
        match axis {
            StickAxis::Horizontal => self.horizontal = value,
            StickAxis::Vertical => self.vertical = value,
        }
    }

    pub fn get(&self, axis: StickAxis) -> u16 {
        match axis {
            StickAxis::Horizontal => self.horizontal,
            StickAxis::Vertical => self.vertical,
        }
    }
}

/// A [ButtonAction] presses a single button or releases one or more buttons
/// at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Press(Button),
    Release(Vec<Button>),
}

/// A single change to a [ControllerState]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMutation {
    Button(ButtonAction),
    Stick {
        stick: StickId,
        axis: StickAxis,
        value: i32,
    },
}

/// In-memory representation of the virtual controller. The button set is
/// fixed; sticks are stored as 12-bit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerState {
    buttons: [bool; Button::COUNT],
    pub left_stick: StickState,
    pub right_stick: StickState,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the named button to the given state.
    pub fn set_button(&mut self, name: &str, pressed: bool) -> Result<(), StateError> {
        let button = Button::from_str(name)?;
        self.set(button, pressed);
        Ok(())
    }

    /// Release all of the named buttons. No button is changed if any of the
    /// names are unknown.
    pub fn release_buttons(&mut self, names: &[&str]) -> Result<(), StateError> {
        let buttons = names
            .iter()
            .map(|name| Button::from_str(name))
            .collect::<Result<Vec<Button>, StateError>>()?;
        self.release(&buttons);
        Ok(())
    }

    /// Set the coordinate of the given stick. Values outside of 0-4095 are
    /// clamped.
    pub fn set_stick(&mut self, stick: StickId, axis: StickAxis, value: i32) {
        self.stick_mut(stick).set(axis, value);
    }

    pub fn set(&mut self, button: Button, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    pub fn release(&mut self, buttons: &[Button]) {
        for button in buttons {
            self.set(*button, false);
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons[button.index()]
    }

    /// Returns all currently pressed buttons
    pub fn pressed(&self) -> Vec<Button> {
        Button::ALL
            .into_iter()
            .filter(|button| self.is_pressed(*button))
            .collect()
    }

    pub fn stick(&self, stick: StickId) -> &StickState {
        match stick {
            StickId::Left => &self.left_stick,
            StickId::Right => &self.right_stick,
        }
    }

    fn stick_mut(&mut self, stick: StickId) -> &mut StickState {
        match stick {
            StickId::Left => &mut self.left_stick,
            StickId::Right => &mut self.right_stick,
        }
    }

    /// Apply the given mutation to the state
    pub fn apply(&mut self, mutation: &StateMutation) {
        match mutation {
            StateMutation::Button(ButtonAction::Press(button)) => self.set(*button, true),
            StateMutation::Button(ButtonAction::Release(buttons)) => self.release(buttons),
            StateMutation::Stick { stick, axis, value } => self.set_stick(*stick, *axis, *value),
        }
    }

    /// Release all buttons and center both sticks
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
