use call_core::error::CoreError;
use call_core::error::config::ConfigError;
use call_core::error::session::SessionError;

use models::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors surfaced by the softphone binary.
///
/// Core errors are flattened to their message here; the location records
/// where the application observed them.
#[derive(Debug, Error)]
pub enum SoftphoneError {
    /// Error from this App
    #[error("Softphone Error: {message} {location}")]
    Softphone {
        message: String,
        location: ErrorLocation,
    },

    /// Error from call-core operations (config, spawn, session)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// A console line that does not parse as a command
    #[error("Console Error: {message} {location}")]
    Console {
        message: String,
        location: ErrorLocation,
    },
}

impl SoftphoneError {
    #[track_caller]
    pub fn console(message: impl Into<String>) -> Self {
        SoftphoneError::Console {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for SoftphoneError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        SoftphoneError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for SoftphoneError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        SoftphoneError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<SessionError> for SoftphoneError {
    #[track_caller]
    fn from(error: SessionError) -> Self {
        SoftphoneError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
