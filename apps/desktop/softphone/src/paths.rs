use crate::error::SoftphoneError;

use call_core::{CONFIG_DIR_NAME, LOG_DIR_NAME};

use models::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::{Path, PathBuf};

/// `{config_dir}/softphone`, where `config.json` lives.
#[track_caller]
pub fn config_dir() -> Result<PathBuf, SoftphoneError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| SoftphoneError::Softphone {
            message: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// `{data_local_dir}/softphone/logs`, created if missing.
#[track_caller]
pub fn log_dir() -> Result<PathBuf, SoftphoneError> {
    let dir = dirs::data_local_dir()
        .map(|dir| dir.join(LOG_DIR_NAME))
        .ok_or_else(|| SoftphoneError::Softphone {
            message: "Failed to get log directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    ensure_dir(&dir)?;
    Ok(dir)
}

#[track_caller]
pub fn ensure_dir(dir: &Path) -> Result<(), SoftphoneError> {
    create_dir_all(dir).map_err(|e| SoftphoneError::Softphone {
        message: format!("Failed to create directory {}: {e}", dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })
}
