use crate::config::BackendConfig;
use crate::error::spawn::SpawnError;

use models::ErrorLocation;

use std::env::current_exe;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;
use std::path::PathBuf;
use std::process::Stdio;

use log::{debug, info};
use tokio::process::Child as TokioChild;
use tokio::process::Command as TokioCommand;

/// Program and arguments used to launch the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl BackendCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[track_caller]
    pub fn validate(&self) -> Result<(), SpawnError> {
        if self.program.trim().is_empty() {
            return Err(SpawnError::Validation {
                message: "Backend program must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(dir) = &self.working_dir
            && !dir.is_dir()
        {
            return Err(SpawnError::Validation {
                message: format!("Backend working directory not found: {}", dir.display()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Command line for log output.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl From<&BackendConfig> for BackendCommand {
    fn from(config: &BackendConfig) -> Self {
        let command = BackendCommand::new(config.program.clone()).with_args(config.args.clone());

        match &config.working_dir {
            Some(dir) => command.with_working_dir(dir),
            None => command,
        }
    }
}

pub(crate) fn build_spawn_command(command: &BackendCommand) -> TokioCommand {
    let mut cmd = TokioCommand::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = &command.working_dir {
        cmd.current_dir(dir);
    }

    cmd
}

/// Spawn the backend, falling back to a binary next to our own executable
/// when the program is not on `PATH`.
pub(crate) fn spawn_backend(command: &BackendCommand) -> Result<TokioChild, SpawnError> {
    command.validate()?;

    debug!("Attempting to spawn backend: {}", command.display());

    match build_spawn_command(command).spawn() {
        Ok(child) => {
            info!("Spawned backend {} (PID: {:?})", command.display(), child.id());
            Ok(child)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("{} not in PATH, trying local binary", command.program);
            spawn_local_binary(command)
        }
        Err(err) => Err(SpawnError::Spawn {
            message: format!("Failed to spawn {}: {err}", command.program),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(err),
        }),
    }
}

fn spawn_local_binary(command: &BackendCommand) -> Result<TokioChild, SpawnError> {
    let exe = current_exe().map_err(|e| SpawnError::Spawn {
        message: format!("Failed to get current executable path: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })?;

    let dir = exe.parent().ok_or_else(|| SpawnError::Spawn {
        message: format!("Executable has no parent directory: {}", exe.display()),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::NotFound, "no parent dir")),
    })?;

    let local_path = dir.join(&command.program);
    debug!("Attempting to spawn from {}", local_path.display());

    let mut local = command.clone();
    local.program = local_path.to_string_lossy().into_owned();

    build_spawn_command(&local).spawn().map_err(|e| SpawnError::Spawn {
        message: format!(
            "Failed to spawn {} from {}: {e}",
            command.program,
            local_path.display()
        ),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })
}
