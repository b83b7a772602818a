//! Lifecycle of one emulation run: open the transport, wait for the host to
//! complete the handshake, translate input until something stops the run and
//! then tear everything down in order.

use std::{fmt::Display, time::Duration};

use thiserror::Error;
use tokio::{sync::watch, task::JoinError};
use tokio_util::sync::CancellationToken;

use crate::{
    controller::{SharedControllerState, StateError},
    input::{
        source::{InputSource, SourceError},
        translator::{InputTranslator, TranslatorError},
    },
    transport::{SessionConfig, Transport, TransportError, TransportHandle},
};

/// How long the translator sleeps when no input events were ready
pub const DEFAULT_POLL_RATE: Duration = Duration::from_millis(4);

/// Possible errors that end an [EmulationSession]
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("handshake with host failed: {0}")]
    HandshakeFailed(String),
    #[error("transport failed: {0}")]
    TransportIo(#[from] TransportError),
    #[error("input device disconnected: {0}")]
    DeviceDisconnected(String),
    #[error("input translation failed: {0}")]
    Translator(String),
    #[error("invalid controller state change: {0}")]
    State(#[from] StateError),
}

impl From<TranslatorError> for SessionError {
    fn from(value: TranslatorError) -> Self {
        match value {
            TranslatorError::Source(SourceError::DeviceDisconnected(device)) => {
                Self::DeviceDisconnected(device)
            }
            TranslatorError::State(e) => Self::State(e),
            e => Self::Translator(e.to_string()),
        }
    }
}

/// Current phase of an [EmulationSession]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Handshaking,
    Connected,
    Closed,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Disconnected => "Disconnected",
            SessionState::Handshaking => "Handshaking",
            SessionState::Connected => "Connected",
            SessionState::Closed => "Closed",
        };
        write!(f, "{name}")
    }
}

/// Ties a physical [InputSource] to a [Transport] through a shared
/// controller state.
#[derive(Debug)]
pub struct EmulationSession {
    config: SessionConfig,
    translator: InputTranslator,
    controller: SharedControllerState,
    state_tx: watch::Sender<SessionState>,
    poll_rate: Duration,
}

impl EmulationSession {
    pub fn new(config: SessionConfig, translator: InputTranslator) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        Self {
            config,
            translator,
            controller: SharedControllerState::new(),
            state_tx,
            poll_rate: DEFAULT_POLL_RATE,
        }
    }

    /// Set how long the translator waits when no input is ready
    pub fn with_poll_rate(mut self, poll_rate: Duration) -> Self {
        self.poll_rate = poll_rate;
        self
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Returns a receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Returns the controller state shared with the transport
    pub fn controller(&self) -> SharedControllerState {
        self.controller.clone()
    }

    fn set_state(&self, state: SessionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            log::info!("Session state changed: {previous} -> {state}");
        }
    }

    /// Run the session until the given token is cancelled, the input device
    /// goes away or the transport fails. The transport is always closed
    /// before this returns.
    pub async fn run<T, S>(
        &self,
        transport: &T,
        source: S,
        cancel: CancellationToken,
    ) -> Result<(), SessionError>
    where
        T: Transport,
        S: InputSource + 'static,
    {
        self.set_state(SessionState::Handshaking);
        let mut handle = match transport.open(&self.config, self.controller.clone()).await {
            Ok(handle) => handle,
            Err(e) => {
                self.set_state(SessionState::Closed);
                let error = SessionError::HandshakeFailed(e.to_string());
                log::error!("Session ended: {error}");
                return Err(error);
            }
        };

        // Wait for the host to complete the handshake
        let timeout = self.config.handshake_timeout;
        let handshake = tokio::select! {
            _ = cancel.cancelled() => None,
            result = tokio::time::timeout(timeout, handle.wait_connected()) => Some(result),
        };
        let handshake = match handshake {
            None => {
                log::info!("Shutdown requested during handshake");
                Err(None)
            }
            Some(Ok(Ok(()))) => Ok(()),
            Some(Ok(Err(e))) => Err(Some(SessionError::HandshakeFailed(e.to_string()))),
            Some(Err(_)) => Err(Some(SessionError::HandshakeFailed(format!(
                "no handshake within {:.1}s",
                timeout.as_secs_f64()
            )))),
        };
        if let Err(error) = handshake {
            self.close(handle).await;
            return match error {
                Some(e) => {
                    log::error!("Session ended: {e}");
                    Err(e)
                }
                None => Ok(()),
            };
        }

        self.controller.connect();
        self.set_state(SessionState::Connected);

        // Translate input on its own thread
        let token = cancel.child_token();
        let mut translator_task = {
            let translator = self.translator.clone();
            let controller = self.controller.clone();
            let token = token.clone();
            let poll_rate = self.poll_rate;
            let mut source = source;
            log::info!("Reading input from {}", source.name());
            tokio::task::spawn_blocking(move || {
                translator.run(&mut source, &controller, &token, poll_rate)
            })
        };

        let (result, translator_done) = tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("Shutdown requested");
                (Ok(()), false)
            }
            joined = &mut translator_task => (translator_result(joined), true),
            error = handle.closed() => (Err(SessionError::TransportIo(error)), false),
        };

        // Let the translator finish the batch in flight before closing
        token.cancel();
        if !translator_done {
            if let Err(e) = translator_result(translator_task.await) {
                log::debug!("Input translation stopped with error: {e}");
            }
        }

        self.close(handle).await;
        if let Err(e) = result.as_ref() {
            log::error!("Session ended: {e}");
        }
        result
    }

    async fn close<H: TransportHandle>(&self, handle: H) {
        log::debug!("Closing transport");
        if let Err(e) = handle.close().await {
            log::error!("Failed to close transport: {e}");
        }
        self.controller.disconnect();
        self.set_state(SessionState::Closed);
    }
}

fn translator_result(
    joined: Result<Result<(), TranslatorError>, JoinError>,
) -> Result<(), SessionError> {
    match joined {
        Ok(result) => result.map_err(SessionError::from),
        Err(e) => Err(SessionError::Translator(e.to_string())),
    }
}
