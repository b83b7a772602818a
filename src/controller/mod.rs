//! Model of the emulated controller that is shared between the input
//! translator and the transport.
#[cfg(test)]
pub mod state_test;

pub mod shared;
pub mod state;

pub use shared::SharedControllerState;
pub use state::{
    Button, ButtonAction, ControllerState, StateError, StateMutation, StickAxis, StickId,
    StickState,
};
