use std::{
    error::Error,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use evdev::AbsoluteAxisCode;

use crate::{
    config::mapping::MappingConfig,
    controller::{
        state::{STICK_CENTER, STICK_MAX, STICK_MIN},
        Button, ButtonAction, ControllerState, SharedControllerState, StateError, StateMutation,
        StickAxis, StickId,
    },
    input::{event::RawInputEvent, translator::InputTranslator},
};

#[tokio::test]
async fn test_button_round_trip() -> Result<(), Box<dyn Error>> {
    for button in Button::ALL {
        let mut state = ControllerState::new();
        let before = state;
        state
            .set_button(button.name(), true)
            .expect("should press known button");
        assert!(state.is_pressed(button), "{button} should be pressed");
        state
            .set_button(button.name(), false)
            .expect("should release known button");
        assert_eq!(state, before, "{button} round trip should restore state");
    }

    Ok(())
}

#[tokio::test]
async fn test_unknown_button() -> Result<(), Box<dyn Error>> {
    let mut state = ControllerState::new();
    let result = state.set_button("turbo", true);
    assert_eq!(result, Err(StateError::UnknownButton("turbo".to_string())));
    assert_eq!(state, ControllerState::new());

    // A release with one bad name must not release anything
    state.set(Button::Left, true);
    let result = state.release_buttons(&["left", "sideways"]);
    assert!(result.is_err(), "should reject unknown name");
    assert!(state.is_pressed(Button::Left), "left should still be pressed");

    Ok(())
}

#[tokio::test]
async fn test_button_names() -> Result<(), Box<dyn Error>> {
    assert_eq!(Button::ALL.len(), Button::COUNT);
    for button in Button::ALL {
        let parsed = Button::from_str(button.name()).expect("should parse own name");
        assert_eq!(parsed, button);
    }
    assert_eq!(Button::from_str("zl"), Ok(Button::Zl));
    assert_eq!(Button::from_str("r_stick"), Ok(Button::RStick));

    Ok(())
}

#[tokio::test]
async fn test_release_buttons() -> Result<(), Box<dyn Error>> {
    let mut state = ControllerState::new();
    state.set(Button::Left, true);
    state
        .release_buttons(&["left", "right"])
        .expect("should release both");
    assert!(!state.is_pressed(Button::Left));
    assert!(!state.is_pressed(Button::Right));

    Ok(())
}

#[tokio::test]
async fn test_stick_clamp() -> Result<(), Box<dyn Error>> {
    let mut state = ControllerState::new();
    assert_eq!(state.left_stick.horizontal, STICK_CENTER);
    assert_eq!(state.right_stick.vertical, STICK_CENTER);

    state.set_stick(StickId::Left, StickAxis::Horizontal, -50);
    assert_eq!(state.left_stick.horizontal, STICK_MIN);
    state.set_stick(StickId::Left, StickAxis::Vertical, 9000);
    assert_eq!(state.left_stick.vertical, STICK_MAX);
    state.set_stick(StickId::Right, StickAxis::Horizontal, 1000);
    assert_eq!(state.right_stick.horizontal, 1000);
    assert_eq!(
        state.right_stick.vertical, STICK_CENTER,
        "channels should be independent"
    );

    Ok(())
}

#[tokio::test]
async fn test_shared_state_requires_connection() -> Result<(), Box<dyn Error>> {
    let shared = SharedControllerState::new();
    let result = shared.set_button("a", true);
    assert_eq!(result, Err(StateError::NotConnected));
    let result = shared.apply(&[StateMutation::Button(ButtonAction::Press(Button::A))]);
    assert_eq!(result, Err(StateError::NotConnected));
    assert!(!shared.snapshot().is_pressed(Button::A));

    shared.connect();
    shared.set_button("a", true).expect("should press once connected");
    assert!(shared.snapshot().is_pressed(Button::A));

    // Disconnecting returns the controller to neutral
    shared.disconnect();
    assert_eq!(shared.snapshot(), ControllerState::new());

    Ok(())
}

#[tokio::test]
async fn test_shared_state_batches() -> Result<(), Box<dyn Error>> {
    let shared = SharedControllerState::new();
    shared.connect();

    let reader = shared.clone();
    let batch = vec![
        StateMutation::Button(ButtonAction::Press(Button::Right)),
        StateMutation::Stick {
            stick: StickId::Right,
            axis: StickAxis::Vertical,
            value: 10,
        },
    ];
    shared.apply(&batch).expect("should apply batch");

    let snapshot = reader.snapshot();
    assert!(snapshot.is_pressed(Button::Right));
    assert_eq!(snapshot.right_stick.vertical, 10);

    Ok(())
}

/// Returns true if the dpad and left stick were written by the same batch
fn is_consistent(state: &ControllerState) -> bool {
    let left = state.is_pressed(Button::Left);
    let right = state.is_pressed(Button::Right);
    let horizontal = state.stick(StickId::Left).get(StickAxis::Horizontal);
    match (left, right) {
        (false, false) => horizontal == STICK_CENTER,
        (true, false) => horizontal == STICK_MIN,
        (false, true) => horizontal == STICK_MAX,
        (true, true) => false,
    }
}

#[tokio::test]
async fn test_shared_state_concurrent_reader() -> Result<(), Box<dyn Error>> {
    let config = MappingConfig::builtin().expect("should parse built-in mapping table");
    let translator = InputTranslator::new(&config).expect("should build translator");

    // Each batch releases the dpad, presses one side and pushes the stick
    // to the same side
    let batch = |direction: i32| -> Vec<StateMutation> {
        let events = [
            RawInputEvent::Hat {
                axis: AbsoluteAxisCode::ABS_HAT0X,
                value: 0,
            },
            RawInputEvent::Hat {
                axis: AbsoluteAxisCode::ABS_HAT0X,
                value: direction,
            },
            RawInputEvent::Axis {
                code: AbsoluteAxisCode::ABS_X,
                value: if direction < 0 { i16::MIN as i32 } else { i16::MAX as i32 },
            },
        ];
        events.iter().flat_map(|e| translator.translate(e)).collect()
    };
    let batches = [batch(-1), batch(1)];

    let shared = SharedControllerState::new();
    shared.connect();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let shared = shared.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut reads = 0usize;
            let mut torn = Vec::new();
            while !done.load(Ordering::Acquire) {
                let snapshot = shared.snapshot();
                if !is_consistent(&snapshot) {
                    torn.push(snapshot);
                }
                reads += 1;
            }
            (reads, torn)
        })
    };

    for i in 0..20_000 {
        shared
            .apply(&batches[i % 2])
            .expect("should apply batch while connected");
        if i % 64 == 0 {
            thread::yield_now();
        }
    }
    done.store(true, Ordering::Release);

    let (reads, torn) = reader.join().expect("reader thread should not panic");
    assert!(reads > 0, "reader should have taken snapshots");
    assert!(torn.is_empty(), "reader saw partial batches: {:?}", torn.first());
    assert!(is_consistent(&shared.snapshot()));
    assert!(shared.snapshot().is_pressed(Button::Right));

    Ok(())
}
