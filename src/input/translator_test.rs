use std::{collections::VecDeque, error::Error, time::Duration};

use evdev::{AbsoluteAxisCode, KeyCode};
use tokio_util::sync::CancellationToken;

use crate::{
    config::mapping::MappingConfig,
    controller::{
        Button, ButtonAction, SharedControllerState, StateError, StateMutation, StickAxis, StickId,
    },
    input::{
        event::RawInputEvent,
        source::{InputSource, SourceError},
        translator::{is_trigger_pressed, scale_stick_value, InputTranslator, TranslatorError},
    },
};

/// Input source that returns pre-recorded batches of events
struct ScriptedSource {
    batches: VecDeque<Vec<RawInputEvent>>,
    cancel_on_read: Option<CancellationToken>,
    fail_when_empty: bool,
}

impl ScriptedSource {
    fn new(batches: Vec<Vec<RawInputEvent>>) -> Self {
        Self {
            batches: batches.into(),
            cancel_on_read: None,
            fail_when_empty: false,
        }
    }
}

impl InputSource for ScriptedSource {
    fn name(&self) -> String {
        "scripted".to_string()
    }

    fn poll(&mut self) -> Result<Vec<RawInputEvent>, SourceError> {
        let Some(batch) = self.batches.pop_front() else {
            if self.fail_when_empty {
                return Err(SourceError::DeviceDisconnected("scripted".to_string()));
            }
            return Ok(vec![]);
        };
        // Simulate a shutdown request that arrives while a batch is in flight
        if let Some(token) = self.cancel_on_read.as_ref() {
            token.cancel();
        }
        Ok(batch)
    }
}

fn key(code: KeyCode, pressed: bool) -> RawInputEvent {
    RawInputEvent::Key { code, pressed }
}

fn axis(code: AbsoluteAxisCode, value: i32) -> RawInputEvent {
    RawInputEvent::Axis { code, value }
}

fn hat(axis: AbsoluteAxisCode, value: i32) -> RawInputEvent {
    RawInputEvent::Hat { axis, value }
}

fn builtin_translator() -> InputTranslator {
    let config = MappingConfig::builtin().expect("should parse built-in mapping table");
    InputTranslator::new(&config).expect("should build translator from built-in table")
}

#[tokio::test]
async fn test_translate_buttons() -> Result<(), Box<dyn Error>> {
    let translator = builtin_translator();
    let expected = [
        (KeyCode::BTN_EAST, Button::A),
        (KeyCode::BTN_SOUTH, Button::B),
        (KeyCode::BTN_WEST, Button::X),
        (KeyCode::BTN_NORTH, Button::Y),
        (KeyCode::BTN_TR, Button::R),
        (KeyCode::BTN_TL, Button::L),
        (KeyCode::BTN_SELECT, Button::Minus),
        (KeyCode::BTN_START, Button::Plus),
        (KeyCode::BTN_MODE, Button::Home),
    ];
    for (code, button) in expected {
        let pressed = translator.translate(&key(code, true));
        assert_eq!(
            pressed,
            vec![StateMutation::Button(ButtonAction::Press(button))],
            "{code:?} should press {button}"
        );
        let released = translator.translate(&key(code, false));
        assert_eq!(
            released,
            vec![StateMutation::Button(ButtonAction::Release(vec![button]))],
            "{code:?} should release {button}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_translate_unmapped() -> Result<(), Box<dyn Error>> {
    let translator = builtin_translator();
    assert!(translator.translate(&key(KeyCode::BTN_TL2, true)).is_empty());
    assert!(translator
        .translate(&axis(AbsoluteAxisCode::ABS_GAS, 100))
        .is_empty());
    assert!(translator
        .translate(&hat(AbsoluteAxisCode::ABS_HAT1X, 1))
        .is_empty());

    Ok(())
}

#[tokio::test]
async fn test_stick_scaling() -> Result<(), Box<dyn Error>> {
    assert_eq!(scale_stick_value(0, false), 2048);
    assert_eq!(scale_stick_value(-32768, false), 0);
    assert_eq!(scale_stick_value(32767, false), 4095);
    assert_eq!(scale_stick_value(16, false), 2049);

    // Inverted axes flip the polarity before scaling
    assert_eq!(scale_stick_value(-32768, true), 4095);
    assert_eq!(scale_stick_value(32767, true), 0);
    assert_eq!(scale_stick_value(0, true), 2047);

    // Values outside of the 16-bit range are clamped
    assert_eq!(scale_stick_value(100_000, false), 4095);
    assert_eq!(scale_stick_value(-100_000, false), 0);
    assert_eq!(scale_stick_value(i32::MIN, true), 4095);

    for value in [-32768, -1000, -1, 0, 1, 1000, 32767] {
        for inverted in [false, true] {
            let scaled = scale_stick_value(value, inverted);
            assert!(
                (0..=4095).contains(&scaled),
                "{value} should scale into range, got {scaled}"
            );
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_translate_sticks() -> Result<(), Box<dyn Error>> {
    let translator = builtin_translator();
    let mutations = translator.translate(&axis(AbsoluteAxisCode::ABS_X, -32768));
    assert_eq!(
        mutations,
        vec![StateMutation::Stick {
            stick: StickId::Left,
            axis: StickAxis::Horizontal,
            value: 0
        }]
    );

    // Vertical axes are inverted so pushing up moves the stick up
    let mutations = translator.translate(&axis(AbsoluteAxisCode::ABS_RY, -32768));
    assert_eq!(
        mutations,
        vec![StateMutation::Stick {
            stick: StickId::Right,
            axis: StickAxis::Vertical,
            value: 4095
        }]
    );

    Ok(())
}

#[tokio::test]
async fn test_trigger_threshold() -> Result<(), Box<dyn Error>> {
    assert!(!is_trigger_pressed(0, 9), "0 should be released");
    assert!(!is_trigger_pressed(511, 9), "511 should be released");
    assert!(is_trigger_pressed(512, 9), "512 should be pressed");
    assert!(is_trigger_pressed(1023, 9), "1023 should be pressed");
    assert!(!is_trigger_pressed(1024, 9), "1024 should be released");
    assert!(!is_trigger_pressed(-512, 9), "negative should be released");
    assert!(!is_trigger_pressed(1, 40), "oversized shift should be released");

    let translator = builtin_translator();
    assert_eq!(
        translator.translate(&axis(AbsoluteAxisCode::ABS_Z, 512)),
        vec![StateMutation::Button(ButtonAction::Press(Button::Zl))]
    );
    assert_eq!(
        translator.translate(&axis(AbsoluteAxisCode::ABS_RZ, 1024)),
        vec![StateMutation::Button(ButtonAction::Release(vec![Button::Zr]))]
    );

    Ok(())
}

#[tokio::test]
async fn test_translate_hat() -> Result<(), Box<dyn Error>> {
    let translator = builtin_translator();
    let state = SharedControllerState::new();
    state.connect();

    state.apply(&translator.translate(&hat(AbsoluteAxisCode::ABS_HAT0X, -1)))?;
    assert_eq!(state.snapshot().pressed(), vec![Button::Left]);

    // Switching sides without passing through zero only presses the new side
    let mutations = translator.translate(&hat(AbsoluteAxisCode::ABS_HAT0X, 1));
    assert_eq!(
        mutations,
        vec![StateMutation::Button(ButtonAction::Press(Button::Right))]
    );
    state.apply(&mutations)?;
    assert_eq!(state.snapshot().pressed(), vec![Button::Right, Button::Left]);

    state.apply(&translator.translate(&hat(AbsoluteAxisCode::ABS_HAT0Y, 1)))?;
    assert!(state.snapshot().is_pressed(Button::Down));

    // Zero releases both directions of the axis
    let mutations = translator.translate(&hat(AbsoluteAxisCode::ABS_HAT0X, 0));
    assert_eq!(
        mutations,
        vec![StateMutation::Button(ButtonAction::Release(vec![
            Button::Left,
            Button::Right
        ]))]
    );
    state.apply(&mutations)?;
    state.apply(&translator.translate(&hat(AbsoluteAxisCode::ABS_HAT0Y, 0)))?;
    assert!(state.snapshot().pressed().is_empty(), "dpad should be released");

    // Some drivers report hats as plain axes
    let mutations = translator.translate(&axis(AbsoluteAxisCode::ABS_HAT0Y, -1));
    assert_eq!(
        mutations,
        vec![StateMutation::Button(ButtonAction::Press(Button::Up))]
    );

    Ok(())
}

#[tokio::test]
async fn test_translate_is_deterministic() -> Result<(), Box<dyn Error>> {
    let translator = builtin_translator();
    let events = [
        key(KeyCode::BTN_NORTH, true),
        axis(AbsoluteAxisCode::ABS_Y, 1234),
        axis(AbsoluteAxisCode::ABS_RZ, 600),
        hat(AbsoluteAxisCode::ABS_HAT0X, 1),
    ];
    for event in events {
        let first = translator.translate(&event);
        let second = translator.translate(&event);
        assert_eq!(first, second, "{event:?} should always translate the same");
    }

    Ok(())
}

#[tokio::test]
async fn test_invalid_mapping() -> Result<(), Box<dyn Error>> {
    let yaml = r#"
version: 1
kind: MappingTable
name: Broken
id: broken
mapping:
  - name: Turbo
    source_event:
      key: BTN_SOUTH
    target_event:
      button: turbo
"#;
    let config = MappingConfig::from_yaml(yaml.to_string())?;
    let result = InputTranslator::new(&config);
    assert!(
        matches!(
            result,
            Err(TranslatorError::State(StateError::UnknownButton(ref name))) if name == "turbo"
        ),
        "unknown button should fail fast: {result:?}"
    );

    let yaml = r#"
version: 1
kind: MappingTable
name: Broken
id: broken
mapping:
  - name: Key to stick
    source_event:
      key: BTN_SOUTH
    target_event:
      stick:
        side: left
        axis: horizontal
"#;
    let config = MappingConfig::from_yaml(yaml.to_string())?;
    let result = InputTranslator::new(&config);
    assert!(
        matches!(result, Err(TranslatorError::InvalidMapping(..))),
        "key to stick should be rejected: {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn test_run_applies_batches() -> Result<(), Box<dyn Error>> {
    let translator = builtin_translator();
    let state = SharedControllerState::new();
    state.connect();
    let cancel = CancellationToken::new();

    let mut source = ScriptedSource::new(vec![vec![
        key(KeyCode::BTN_SOUTH, true),
        axis(AbsoluteAxisCode::ABS_X, 0),
        key(KeyCode::BTN_SOUTH, false),
    ]]);
    source.cancel_on_read = Some(cancel.clone());

    translator.run(&mut source, &state, &cancel, Duration::from_millis(1))?;

    let snapshot = state.snapshot();
    assert!(!snapshot.is_pressed(Button::B), "b should be released");
    assert_eq!(snapshot.left_stick.horizontal, 2048);

    Ok(())
}

#[tokio::test]
async fn test_run_finishes_batch_after_cancel() -> Result<(), Box<dyn Error>> {
    let translator = builtin_translator();
    let state = SharedControllerState::new();
    state.connect();
    let cancel = CancellationToken::new();

    let batch = vec![
        key(KeyCode::BTN_EAST, true),
        key(KeyCode::BTN_NORTH, true),
        key(KeyCode::BTN_WEST, true),
        key(KeyCode::BTN_TL, true),
        key(KeyCode::BTN_TR, true),
        axis(AbsoluteAxisCode::ABS_X, 32767),
        axis(AbsoluteAxisCode::ABS_Y, 32767),
        axis(AbsoluteAxisCode::ABS_Z, 512),
        hat(AbsoluteAxisCode::ABS_HAT0X, 1),
        key(KeyCode::BTN_WEST, false),
    ];
    let mut source = ScriptedSource::new(vec![batch, vec![key(KeyCode::BTN_MODE, true)]]);
    source.cancel_on_read = Some(cancel.clone());

    translator.run(&mut source, &state, &cancel, Duration::from_millis(1))?;

    let snapshot = state.snapshot();
    assert_eq!(
        snapshot.pressed(),
        vec![Button::Y, Button::A, Button::R, Button::Right, Button::L, Button::Zl]
    );
    assert_eq!(snapshot.left_stick.horizontal, 4095);
    assert_eq!(snapshot.left_stick.vertical, 0);
    assert!(
        !snapshot.is_pressed(Button::Home),
        "batch after cancellation should not be read"
    );

    Ok(())
}

#[tokio::test]
async fn test_run_errors() -> Result<(), Box<dyn Error>> {
    let translator = builtin_translator();
    let cancel = CancellationToken::new();

    // Mutations are rejected before the state is connected
    let state = SharedControllerState::new();
    let mut source = ScriptedSource::new(vec![vec![key(KeyCode::BTN_EAST, true)]]);
    let result = translator.run(&mut source, &state, &cancel, Duration::from_millis(1));
    assert!(
        matches!(result, Err(TranslatorError::State(StateError::NotConnected))),
        "should reject mutation while disconnected: {result:?}"
    );

    // A failing source stops the loop
    state.connect();
    let mut source = ScriptedSource::new(vec![vec![key(KeyCode::BTN_EAST, true)]]);
    source.fail_when_empty = true;
    let result = translator.run(&mut source, &state, &cancel, Duration::from_millis(1));
    assert!(
        matches!(
            result,
            Err(TranslatorError::Source(SourceError::DeviceDisconnected(_)))
        ),
        "should stop when the device goes away: {result:?}"
    );
    assert!(state.snapshot().is_pressed(Button::A), "a should be pressed");

    Ok(())
}
