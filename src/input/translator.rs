use std::{collections::HashMap, str::FromStr, thread, time::Duration};

use evdev::{AbsoluteAxisCode, KeyCode};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    config::mapping::{
        EventMapping, MappingConfig, StickDirection, StickSide, TargetEventConfig,
    },
    controller::{
        Button, ButtonAction, SharedControllerState, StateError, StateMutation, StickAxis, StickId,
    },
};

use super::{
    event::RawInputEvent,
    source::{InputSource, SourceError},
};

/// Offset applied to signed 16-bit stick values to make them unsigned
const STICK_MIDPOINT_OFFSET: i64 = 32768;
/// Number of bits dropped to fit a 16-bit stick value into 12 bits
const STICK_SHIFT: u32 = 4;
/// Default number of bits dropped from a trigger value. A shifted value of
/// exactly 1 counts as a press.
pub const DEFAULT_TRIGGER_SHIFT: u32 = 9;

/// Possible errors when building or running an [InputTranslator]
#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("invalid controller state change: {0}")]
    State(#[from] StateError),
    #[error("invalid mapping '{0}': {1}")]
    InvalidMapping(String, String),
    #[error("input source failed: {0}")]
    Source(#[from] SourceError),
}

/// How a single axis is translated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisRule {
    Stick {
        stick: StickId,
        axis: StickAxis,
        inverted: bool,
    },
    /// Threshold an analog trigger into a digital button.
    /// The threshold is a binary one: only a shifted value of exactly 1
    /// presses the button.
    Trigger { button: Button, shift: u32 },
}

/// Pair of opposing buttons driven by one hat axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HatRule {
    negative: Button,
    positive: Button,
}

/// Translates [RawInputEvent]s into [StateMutation]s using a mapping table.
/// Translation has no memory of previous events, so the same event always
/// produces the same mutations.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    name: String,
    keys: HashMap<KeyCode, Button>,
    axes: HashMap<AbsoluteAxisCode, AxisRule>,
    hats: HashMap<AbsoluteAxisCode, HatRule>,
}

impl InputTranslator {
    /// Build a translator from the given mapping table. Any button name that
    /// is not part of the controller fails with [StateError::UnknownButton].
    pub fn new(config: &MappingConfig) -> Result<Self, TranslatorError> {
        let mut translator = Self {
            name: config.name.clone(),
            keys: HashMap::new(),
            axes: HashMap::new(),
            hats: HashMap::new(),
        };
        for mapping in config.mapping.iter() {
            translator.add_mapping(mapping)?;
        }
        log::debug!(
            "Loaded mapping table '{}' with {} key, {} axis and {} hat mappings",
            translator.name,
            translator.keys.len(),
            translator.axes.len(),
            translator.hats.len()
        );

        Ok(translator)
    }

    /// Name of the mapping table this translator was built from
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    fn add_mapping(&mut self, mapping: &EventMapping) -> Result<(), TranslatorError> {
        let invalid = |reason: &str| {
            TranslatorError::InvalidMapping(mapping.name.clone(), reason.to_string())
        };
        let source = &mapping.source_event;
        let target = &mapping.target_event;
        let sources = [
            source.key.is_some(),
            source.axis.is_some(),
            source.hat.is_some(),
        ];
        if sources.iter().filter(|set| **set).count() != 1 {
            return Err(invalid("exactly one source event must be defined"));
        }
        let targets = [
            target.button.is_some(),
            target.trigger.is_some(),
            target.stick.is_some(),
            target.dpad.is_some(),
        ];
        if targets.iter().filter(|set| **set).count() != 1 {
            return Err(invalid("exactly one target event must be defined"));
        }

        if let Some(key) = source.key {
            let Some(name) = target.button.as_ref() else {
                return Err(invalid("key events can only target a button"));
            };
            self.keys.insert(key.into(), Button::from_str(name)?);
            return Ok(());
        }

        if let Some(axis) = source.axis {
            let rule = axis_rule(target).ok_or_else(|| {
                invalid("axis events can only target a stick or a trigger")
            })??;
            self.axes.insert(axis.into(), rule);
            return Ok(());
        }

        if let Some(hat) = source.hat {
            let Some(dpad) = target.dpad.as_ref() else {
                return Err(invalid("hat events can only target a dpad"));
            };
            let rule = HatRule {
                negative: Button::from_str(&dpad.negative)?,
                positive: Button::from_str(&dpad.positive)?,
            };
            self.hats.insert(hat.into(), rule);
        }

        Ok(())
    }

    /// Translate the given event into zero or more state mutations. Events
    /// that are not in the mapping table produce no mutations.
    pub fn translate(&self, event: &RawInputEvent) -> Vec<StateMutation> {
        match *event {
            RawInputEvent::Key { code, pressed } => {
                let Some(button) = self.keys.get(&code) else {
                    log::trace!("Ignoring unmapped key: {code:?}");
                    return vec![];
                };
                let action = if pressed {
                    ButtonAction::Press(*button)
                } else {
                    ButtonAction::Release(vec![*button])
                };
                vec![StateMutation::Button(action)]
            }
            RawInputEvent::Axis { code, value } => {
                if let Some(rule) = self.hats.get(&code) {
                    return translate_hat(rule, value);
                }
                let Some(rule) = self.axes.get(&code) else {
                    log::trace!("Ignoring unmapped axis: {code:?}");
                    return vec![];
                };
                match *rule {
                    AxisRule::Stick {
                        stick,
                        axis,
                        inverted,
                    } => vec![StateMutation::Stick {
                        stick,
                        axis,
                        value: scale_stick_value(value, inverted),
                    }],
                    AxisRule::Trigger { button, shift } => {
                        let action = if is_trigger_pressed(value, shift) {
                            ButtonAction::Press(button)
                        } else {
                            ButtonAction::Release(vec![button])
                        };
                        vec![StateMutation::Button(action)]
                    }
                }
            }
            RawInputEvent::Hat { axis, value } => {
                let Some(rule) = self.hats.get(&axis) else {
                    log::trace!("Ignoring unmapped hat: {axis:?}");
                    return vec![];
                };
                translate_hat(rule, value)
            }
        }
    }

    /// Translate every event from the given source and apply the results to
    /// the given state until the source fails or the token is cancelled.
    ///
    /// Cancellation is only checked between batches, so every event of a batch
    /// that was already read is applied before this returns. After each batch
    /// the thread yields so the transport's reporting task is never starved.
    pub fn run<S: InputSource + ?Sized>(
        &self,
        source: &mut S,
        state: &SharedControllerState,
        cancel: &CancellationToken,
        poll_rate: Duration,
    ) -> Result<(), TranslatorError> {
        log::debug!("Starting input translation with table '{}'", self.name);
        while !cancel.is_cancelled() {
            let events = source.poll()?;
            if events.is_empty() {
                thread::sleep(poll_rate);
                continue;
            }

            for event in events.iter() {
                let mutations = self.translate(event);
                log::trace!("Translated {event:?} into {mutations:?}");
                state.apply(&mutations)?;
            }
            thread::yield_now();
        }
        log::debug!("Input translation stopped");

        Ok(())
    }
}

fn axis_rule(target: &TargetEventConfig) -> Option<Result<AxisRule, TranslatorError>> {
    if let Some(stick) = target.stick.as_ref() {
        let rule = AxisRule::Stick {
            stick: match stick.side {
                StickSide::Left => StickId::Left,
                StickSide::Right => StickId::Right,
            },
            axis: match stick.axis {
                StickDirection::Horizontal => StickAxis::Horizontal,
                StickDirection::Vertical => StickAxis::Vertical,
            },
            inverted: stick.inverted.unwrap_or_default(),
        };
        return Some(Ok(rule));
    }
    if let Some(trigger) = target.trigger.as_ref() {
        let rule = Button::from_str(&trigger.button)
            .map(|button| AxisRule::Trigger {
                button,
                shift: trigger.shift.unwrap_or(DEFAULT_TRIGGER_SHIFT),
            })
            .map_err(TranslatorError::from);
        return Some(rule);
    }
    None
}

fn translate_hat(rule: &HatRule, value: i32) -> Vec<StateMutation> {
    let action = match value.signum() {
        -1 => ButtonAction::Press(rule.negative),
        1 => ButtonAction::Press(rule.positive),
        // Release both sides since a previous press may never have been seen
        _ => ButtonAction::Release(vec![rule.negative, rule.positive]),
    };
    vec![StateMutation::Button(action)]
}

/// Scale a signed 16-bit stick value into the 12-bit range 0-4095, with 0
/// mapping to the center value of 2048. Inverted axes are flipped first.
pub fn scale_stick_value(value: i32, inverted: bool) -> i32 {
    let mut value = value as i64;
    if inverted {
        value = -(value + 1);
    }
    let scaled = (value + STICK_MIDPOINT_OFFSET) >> STICK_SHIFT;
    scaled.clamp(0, 4095) as i32
}

/// Returns true if the shifted trigger value is exactly 1
pub fn is_trigger_pressed(value: i32, shift: u32) -> bool {
    value.checked_shr(shift).unwrap_or(0) == 1
}
