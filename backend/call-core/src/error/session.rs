//! Errors returned by user intents.
//!
//! None of these change session state: a refused intent sends nothing
//! and leaves the registry untouched.

use crate::error::codec::CodecError;
use crate::error::transport::TransportError;

use models::{ErrorLocation, ModelError};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unknown Call Error: {call_id} {location}")]
    UnknownCall {
        call_id: String,
        location: ErrorLocation,
    },

    #[error("No Active Call Error {location}")]
    NoActiveCall { location: ErrorLocation },

    #[error("Second Call Declined Error: {message} {location}")]
    SecondCallDeclined {
        message: String,
        location: ErrorLocation,
    },

    #[error("Runtime Stopped Error: {message} {location}")]
    RuntimeStopped {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl SessionError {
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        SessionError::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unknown_call(call_id: impl Into<String>) -> Self {
        SessionError::UnknownCall {
            call_id: call_id.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn no_active_call() -> Self {
        SessionError::NoActiveCall {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn runtime_stopped(message: impl Into<String>) -> Self {
        SessionError::RuntimeStopped {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Get error category for status reporting.
    pub fn error_category(&self) -> &'static str {
        match self {
            SessionError::Validation { .. } => "validation",
            SessionError::UnknownCall { .. } => "unknown_call",
            SessionError::NoActiveCall { .. } => "no_active_call",
            SessionError::SecondCallDeclined { .. } => "declined",
            SessionError::RuntimeStopped { .. } => "stopped",
            SessionError::Transport(TransportError::NotRunning { .. }) => "not_running",
            SessionError::Transport(TransportError::Write { .. }) => "write",
            SessionError::Transport(_) => "transport",
            SessionError::Codec(_) => "codec",
        }
    }
}

impl From<ModelError> for SessionError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::Validation { message, .. } => SessionError::Validation {
                message,
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }
}
