use crate::error::spawn::SpawnError;

use models::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Not Running Error: {message} {location}")]
    NotRunning {
        message: String,
        location: ErrorLocation,
    },

    #[error("Already Running Error: {message} {location}")]
    AlreadyRunning {
        message: String,
        location: ErrorLocation,
    },

    #[error("Write Error: {message} {location}")]
    Write {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

impl TransportError {
    #[track_caller]
    pub fn not_running() -> Self {
        TransportError::NotRunning {
            message: "Backend process not running".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn already_running(pid: Option<u32>) -> Self {
        TransportError::AlreadyRunning {
            message: format!("Backend process already running (PID: {pid:?})"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn write(message: impl Into<String>) -> Self {
        TransportError::Write {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
