use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use super::state::{ControllerState, StateError, StateMutation, StickAxis, StickId};

/// Thread-safe handle to the [ControllerState] of a session. The input
/// translator writes through this handle while the transport reads snapshots
/// of it at its own report cadence.
///
/// Mutations are rejected with [StateError::NotConnected] until the owning
/// session marks the state as connected.
#[derive(Debug, Clone, Default)]
pub struct SharedControllerState {
    state: Arc<RwLock<ControllerState>>,
    connected: Arc<AtomicBool>,
}

impl SharedControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow mutations of the state
    pub fn connect(&self) {
        log::debug!("Controller state connected");
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Reject any further mutations and return the state to neutral
    pub fn disconnect(&self) {
        log::debug!("Controller state disconnected");
        self.connected.store(false, Ordering::SeqCst);
        self.write().reset();
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Returns a copy of the full controller state
    pub fn snapshot(&self) -> ControllerState {
        *self.read()
    }

    /// Apply all of the given mutations while holding the lock once, so a
    /// reader never observes a partially applied batch.
    pub fn apply(&self, mutations: &[StateMutation]) -> Result<(), StateError> {
        if mutations.is_empty() {
            return Ok(());
        }
        self.check_connected()?;
        let mut state = self.write();
        for mutation in mutations {
            state.apply(mutation);
        }
        Ok(())
    }

    pub fn set_button(&self, name: &str, pressed: bool) -> Result<(), StateError> {
        self.check_connected()?;
        self.write().set_button(name, pressed)
    }

    pub fn release_buttons(&self, names: &[&str]) -> Result<(), StateError> {
        self.check_connected()?;
        self.write().release_buttons(names)
    }

    pub fn set_stick(&self, stick: StickId, axis: StickAxis, value: i32) -> Result<(), StateError> {
        self.check_connected()?;
        self.write().set_stick(stick, axis, value);
        Ok(())
    }

    fn check_connected(&self) -> Result<(), StateError> {
        if !self.is_connected() {
            return Err(StateError::NotConnected);
        }
        Ok(())
    }

    // The state is plain data, so a writer that panicked cannot leave it in
    // an invalid shape.
    fn read(&self) -> RwLockReadGuard<'_, ControllerState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ControllerState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
