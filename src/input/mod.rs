//! Reading physical gamepads and translating their events into changes of
//! the emulated controller.
pub mod event;
pub mod source;
pub mod translator;

#[cfg(test)]
pub mod translator_test;
