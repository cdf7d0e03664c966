//! Session runtime actor.
//!
//! One task owns the [`SessionCoordinator`], the [`FrameDecoder`] and the
//! transport, and processes backend events and user intents strictly one
//! at a time. Everything else talks to it through a [`SessionHandle`].
//!
//! # Architecture
//!
//! - Intents are sent over an mpsc channel and answered over a oneshot
//! - Snapshots are read from an `Arc<RwLock<_>>` refreshed after every step
//! - UI updates fan out through the [`PresentationHub`]

use crate::codec::{self, FrameDecoder};
use crate::config::AppConfig;
use crate::error::CoreError;
use crate::error::session::SessionError;
use crate::session::coordinator::{SessionCoordinator, SessionSnapshot};
use crate::session::intent::Intent;
use crate::session::presentation::{PresentationHub, UpdateKind, UpdateSubscription};
use crate::transport::{BackendCommand, BackendProcess, Transport, TransportEvent, TransportEvents};

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::spawn as TokioSpawn;
use tokio::sync::{RwLock, mpsc, oneshot};

const COMMAND_CHANNEL_CAPACITY: usize = 100;
const RUNTIME_STOPPED: &str = "Session runtime has stopped";

enum RuntimeCommand {
    Dispatch {
        intent: Intent,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

pub struct SessionRuntime;

impl SessionRuntime {
    /// Launch the configured backend and start the session task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Transport`] if the backend cannot be spawned.
    pub fn start(config: &AppConfig) -> Result<SessionHandle, CoreError> {
        let command = BackendCommand::from(&config.backend);
        info!("Starting session with backend: {}", command.display());

        let mut process = BackendProcess::new();
        let events = process.start(&command)?;

        Ok(Self::with_transport(process, events, config))
    }

    /// Start the session task over an already running transport.
    pub fn with_transport<T>(transport: T, events: TransportEvents, config: &AppConfig) -> SessionHandle
    where
        T: Transport + 'static,
    {
        let hub = PresentationHub::new();
        let coordinator = SessionCoordinator::new(transport, hub.clone(), config.calls.clone());
        let decoder = FrameDecoder::new(config.framing.max_frame_bytes);
        let snapshot = Arc::new(RwLock::new(coordinator.snapshot()));

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        TokioSpawn(session_actor(
            coordinator,
            decoder,
            events,
            command_rx,
            Arc::clone(&snapshot),
        ));

        SessionHandle {
            command_tx,
            snapshot,
            hub,
        }
    }
}

/// Cloneable handle to the session task.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<RuntimeCommand>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    hub: PresentationHub,
}

impl SessionHandle {
    /// Run one intent on the session task and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RuntimeStopped`] once the backend has exited
    /// or the session was shut down, otherwise whatever the intent returned.
    pub async fn dispatch(&self, intent: Intent) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();

        self.command_tx
            .send(RuntimeCommand::Dispatch { intent, reply })
            .await
            .map_err(|_| SessionError::runtime_stopped(RUNTIME_STOPPED))?;

        rx.await
            .map_err(|_| SessionError::runtime_stopped(RUNTIME_STOPPED))?
    }

    /// Latest session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().await.clone()
    }

    pub fn subscribe(&self) -> UpdateSubscription {
        self.hub.subscribe()
    }

    pub fn subscribe_to(&self, kinds: &[UpdateKind]) -> UpdateSubscription {
        self.hub.subscribe_to(kinds)
    }

    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Kill the backend and stop the session task. Idempotent.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();

        if self
            .command_tx
            .send(RuntimeCommand::Shutdown { reply })
            .await
            .is_err()
        {
            debug!("Session already stopped");
            return;
        }

        let _ = rx.await;
    }
}

async fn session_actor<T: Transport>(
    mut coordinator: SessionCoordinator<T>,
    mut decoder: FrameDecoder,
    mut events: TransportEvents,
    mut commands: mpsc::Receiver<RuntimeCommand>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
) {
    info!("Session actor started");

    loop {
        let stop = tokio::select! {
            event = events.recv() => match event {
                Some(TransportEvent::Data(bytes)) => {
                    for frame in decoder.push(&bytes) {
                        apply_frame(&mut coordinator, &frame);
                    }
                    false
                }
                Some(TransportEvent::Error(e)) => {
                    coordinator.on_transport_error(e);
                    false
                }
                Some(TransportEvent::Exited { code }) => {
                    flush_decoder(&mut coordinator, &mut decoder);
                    coordinator.on_backend_exit(code);
                    true
                }
                None => {
                    warn!("Transport event stream closed without exit notice");
                    flush_decoder(&mut coordinator, &mut decoder);
                    coordinator.on_backend_exit(None);
                    true
                }
            },
            command = commands.recv() => match command {
                Some(RuntimeCommand::Dispatch { intent, reply }) => {
                    let result = coordinator.handle_intent(intent);
                    if let Err(ref e) = result {
                        debug!("Intent refused ({})", e.error_category());
                    }
                    let _ = reply.send(result);
                    false
                }
                Some(RuntimeCommand::Shutdown { reply }) => {
                    coordinator.shutdown();
                    *snapshot.write().await = coordinator.snapshot();
                    let _ = reply.send(());
                    true
                }
                None => {
                    debug!("All session handles dropped");
                    coordinator.shutdown();
                    true
                }
            },
        };

        *snapshot.write().await = coordinator.snapshot();

        if stop {
            break;
        }
    }

    info!("Session actor stopped");
}

fn apply_frame<T: Transport>(coordinator: &mut SessionCoordinator<T>, frame: &str) {
    if let Some(event) = codec::decode(frame) {
        coordinator.handle_event(event);
    }
}

fn flush_decoder<T: Transport>(coordinator: &mut SessionCoordinator<T>, decoder: &mut FrameDecoder) {
    if let Some(frame) = decoder.finish() {
        apply_frame(coordinator, &frame);
    }
}
