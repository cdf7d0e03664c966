//! Backend process lifecycle.
//!
//! # Tasks
//!
//! Starting a backend spawns four tasks around the child:
//! - **stdout reader**: one [`TransportEvent::Data`] per pipe read
//! - **stderr reader**: lines logged at `trace`
//! - **stdin writer**: one `write_all` + `flush` per queued command
//! - **exit watcher**: waits for exit or a kill request, lets the stdout
//!   reader drain, then emits [`TransportEvent::Exited`]
//!
//! Commands queue on an unbounded channel so [`Transport::send`] never
//! blocks the coordinating task.

use crate::error::spawn::SpawnError;
use crate::error::transport::TransportError;
use crate::transport::spawn::{BackendCommand, spawn_backend};
use crate::transport::{Transport, TransportEvent};

use models::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, error, info, trace, warn};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child as TokioChild, ChildStderr, ChildStdin, ChildStdout};
use tokio::spawn as TokioSpawn;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout as TokioTimeout;

const READ_BUFFER_BYTES: usize = 4096;
const STDOUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Stream of [`TransportEvent`]s for one backend run.
///
/// Ends after [`TransportEvent::Exited`].
#[derive(Debug)]
pub struct TransportEvents {
    rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl TransportEvents {
    /// Wrap an existing event channel, for transports other than a child process.
    pub fn new(rx: mpsc::UnboundedReceiver<TransportEvent>) -> Self {
        Self { rx }
    }

    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }
}

/// Handle to the backend child process.
///
/// At most one process is live per handle. Once it exits the handle may
/// be started again.
#[derive(Debug, Default)]
pub struct BackendProcess {
    pid: Option<u32>,
    stdin_tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
    kill_tx: Option<oneshot::Sender<()>>,
    alive: Arc<AtomicBool>,
}

impl BackendProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the backend and start its I/O tasks.
    ///
    /// # Errors
    ///
    /// - [`TransportError::AlreadyRunning`] if this handle's process is live
    /// - [`TransportError::Spawn`] if the program cannot be launched
    pub fn start(&mut self, command: &BackendCommand) -> Result<TransportEvents, TransportError> {
        if self.is_running() {
            return Err(TransportError::already_running(self.pid));
        }

        let mut child = spawn_backend(command)?;
        let pid = child.id();

        let stdin = child.stdin.take().ok_or_else(|| pipe_error("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| pipe_error("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| pipe_error("stderr"))?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (stdin_tx, stdin_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = oneshot::channel();

        // Fresh flag per run so a previous run's watcher cannot clear it.
        let alive = Arc::new(AtomicBool::new(true));

        let reader = TokioSpawn(read_stdout(stdout, event_tx.clone()));
        TokioSpawn(log_stderr(stderr));
        TokioSpawn(write_stdin(
            stdin,
            stdin_rx,
            event_tx.clone(),
            Arc::clone(&alive),
        ));
        TokioSpawn(watch_exit(child, kill_rx, reader, event_tx, Arc::clone(&alive)));

        self.pid = pid;
        self.stdin_tx = Some(stdin_tx);
        self.kill_tx = Some(kill_tx);
        self.alive = alive;

        info!("Backend started (PID: {pid:?})");
        Ok(TransportEvents { rx: event_rx })
    }

    pub fn pid(&self) -> Option<u32> {
        if self.is_running() { self.pid } else { None }
    }
}

impl Transport for BackendProcess {
    fn send(&self, bytes: Vec<u8>) -> Result<(), TransportError> {
        if !self.is_running() {
            return Err(TransportError::not_running());
        }

        let tx = self.stdin_tx.as_ref().ok_or_else(TransportError::not_running)?;
        tx.send(bytes).map_err(|_| TransportError::not_running())
    }

    fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        let Some(kill_tx) = self.kill_tx.take() else {
            return;
        };

        info!("Stopping backend (PID: {:?})", self.pid);
        let _ = kill_tx.send(());
        self.stdin_tx = None;
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[track_caller]
fn pipe_error(pipe: &str) -> TransportError {
    TransportError::Spawn(SpawnError::Pipe {
        message: format!("Child process has no {pipe}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

async fn read_stdout(mut stdout: ChildStdout, events: mpsc::UnboundedSender<TransportEvent>) {
    let mut buf = vec![0u8; READ_BUFFER_BYTES];

    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => {
                debug!("Backend stdout closed");
                break;
            }
            Ok(n) => {
                trace!("Backend stdout: {n} bytes");
                if events.send(TransportEvent::Data(buf[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Failed to read backend stdout: {e}");
                break;
            }
        }
    }
}

async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        trace!("Backend stderr: {line}");
    }
}

async fn write_stdin(
    mut stdin: ChildStdin,
    mut commands: mpsc::UnboundedReceiver<Vec<u8>>,
    events: mpsc::UnboundedSender<TransportEvent>,
    alive: Arc<AtomicBool>,
) {
    while let Some(bytes) = commands.recv().await {
        let result = match stdin.write_all(&bytes).await {
            Ok(()) => stdin.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            error!("Failed to write to backend stdin: {e}");
            alive.store(false, Ordering::SeqCst);
            let _ = events.send(TransportEvent::Error(TransportError::write(format!(
                "Failed to write to backend: {e}"
            ))));
            break;
        }
    }
}

async fn watch_exit(
    mut child: TokioChild,
    kill_rx: oneshot::Receiver<()>,
    mut reader: JoinHandle<()>,
    events: mpsc::UnboundedSender<TransportEvent>,
    alive: Arc<AtomicBool>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = kill_rx => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill backend: {e}");
            }
            child.wait().await
        }
    };

    // A descendant can hold stdout open past the exit; no data may follow `Exited`
    if TokioTimeout(STDOUT_DRAIN_TIMEOUT, &mut reader).await.is_err() {
        warn!("Backend stdout did not drain within {STDOUT_DRAIN_TIMEOUT:?}");
        reader.abort();
        let _ = reader.await;
    }

    alive.store(false, Ordering::SeqCst);

    let code = match status {
        Ok(status) => status.code(),
        Err(e) => {
            warn!("Failed to wait for backend exit: {e}");
            None
        }
    };

    info!("Backend exited (code: {code:?})");
    let _ = events.send(TransportEvent::Exited { code });
}
