//! Transport channel to the backend call-control process.
//!
//! The session talks to the backend only through the [`Transport`] trait.
//! [`BackendProcess`] is the production implementation over a child
//! process's stdio pipes; everything the process emits arrives on a
//! [`TransportEvents`] stream.

pub mod process;
pub mod spawn;

pub use process::{BackendProcess, TransportEvents};
pub use spawn::BackendCommand;

use crate::error::transport::TransportError;

/// Write side of the channel, as seen by the session coordinator.
pub trait Transport: Send {
    /// Queue one encoded command for writing.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotRunning`] when no backend is live.
    fn send(&self, bytes: Vec<u8>) -> Result<(), TransportError>;

    fn is_running(&self) -> bool;

    /// Hard-kill the backend. Calling it with nothing running is a no-op.
    fn stop(&mut self);
}

/// Notification from the backend process.
#[derive(Debug)]
pub enum TransportEvent {
    /// One read from stdout, exactly as the pipe delivered it.
    Data(Vec<u8>),

    /// A write to stdin failed; the command was dropped.
    Error(TransportError),

    /// The process has exited and all of its stdout has been delivered.
    Exited { code: Option<i32> },
}
