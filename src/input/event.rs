use evdev::{AbsoluteAxisCode, EventType, InputEvent, KeyCode};

/// A raw event read from a physical input device. Events are consumed by the
/// translator as soon as they are read and are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    /// Digital button
    Key { code: KeyCode, pressed: bool },
    /// Analog axis such as a stick or trigger
    Axis { code: AbsoluteAxisCode, value: i32 },
    /// One dimension of a hat switch with the values -1, 0 or 1
    Hat { axis: AbsoluteAxisCode, value: i32 },
}

impl RawInputEvent {
    /// Convert the given evdev event into a [RawInputEvent]. Returns `None`
    /// for event types that are never mapped, like sync or misc events.
    pub fn from_evdev(event: &InputEvent) -> Option<Self> {
        match event.event_type() {
            EventType::KEY => Some(Self::Key {
                code: KeyCode(event.code()),
                // Key repeat (2) is still a held button
                pressed: event.value() != 0,
            }),
            EventType::ABSOLUTE => {
                let code = AbsoluteAxisCode(event.code());
                if is_hat(code) {
                    Some(Self::Hat {
                        axis: code,
                        value: event.value(),
                    })
                } else {
                    Some(Self::Axis {
                        code,
                        value: event.value(),
                    })
                }
            }
            _ => None,
        }
    }
}

/// Returns true if the given axis belongs to a hat switch
fn is_hat(code: AbsoluteAxisCode) -> bool {
    (AbsoluteAxisCode::ABS_HAT0X.0..=AbsoluteAxisCode::ABS_HAT3Y.0).contains(&code.0)
}
