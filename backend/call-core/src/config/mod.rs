use crate::codec::frame::DEFAULT_MAX_FRAME_BYTES;
use crate::error::config::ConfigError;

use models::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::str::FromStr;

use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

pub const BACKEND_PROGRAM_ENV: &str = "SOFTPHONE_BACKEND_PROGRAM";
pub const BACKEND_ARGS_ENV: &str = "SOFTPHONE_BACKEND_ARGS";
pub const LOG_LEVEL_ENV: &str = "SOFTPHONE_LOG_LEVEL";
pub const WIRE_TRACE_ENV: &str = "SOFTPHONE_WIRE_TRACE";

const MIN_FRAME_BYTES: usize = 256;
const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;
const MAX_STATUS_MESSAGE_MS: u64 = 60_000;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            working_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallPolicyConfig {
    /// Placing a call while another is active needs an explicit confirmation.
    #[serde(default = "default_confirm_second_call")]
    pub confirm_second_call: bool,
}

impl Default for CallPolicyConfig {
    fn default() -> Self {
        Self {
            confirm_second_call: default_confirm_second_call(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramingConfig {
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_status_message_ms")]
    pub status_message_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            status_message_ms: default_status_message_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`. Unset keeps
    /// the build default.
    #[serde(default)]
    pub level: Option<String>,
    /// Log every stdout chunk, stderr line and discarded payload exchanged
    /// with the backend.
    #[serde(default)]
    pub wire_trace: bool,
}

impl LoggingConfig {
    /// The configured level, if set and valid.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.level
            .as_deref()
            .and_then(|level| LevelFilter::from_str(level.trim()).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub calls: CallPolicyConfig,

    #[serde(default)]
    pub framing: FramingConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: BackendConfig::default(),
            calls: CallPolicyConfig::default(),
            framing: FramingConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_program() -> String {
    "python".to_string()
}
fn default_args() -> Vec<String> {
    vec!["python/softphone.py".to_string()]
}
fn default_confirm_second_call() -> bool {
    true
}
fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}
fn default_status_message_ms() -> u64 {
    3000
}

// ============================================
// IMPLEMENTATION
// ============================================

impl AppConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(AppConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: AppConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - Validation fails
    /// - Directory creation fails
    /// - Serialization fails
    /// - Write or rename fails
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        // Atomic rename (POSIX guarantees atomicity)
        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Apply `SOFTPHONE_BACKEND_PROGRAM` / `SOFTPHONE_BACKEND_ARGS` and the
    /// logging overrides `SOFTPHONE_LOG_LEVEL` / `SOFTPHONE_WIRE_TRACE`.
    ///
    /// Args are split on whitespace. Unset variables leave the loaded
    /// values alone; a set but empty program, an unknown level or a
    /// non-boolean wire trace flag is rejected.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(program) = std::env::var(BACKEND_PROGRAM_ENV) {
            if program.trim().is_empty() {
                return Err(ConfigError::EnvOverride {
                    location: ErrorLocation::from(Location::caller()),
                    variable: BACKEND_PROGRAM_ENV.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            info!("Backend program overridden by {BACKEND_PROGRAM_ENV}");
            self.backend.program = program.trim().to_string();
        }

        if let Ok(args) = std::env::var(BACKEND_ARGS_ENV) {
            info!("Backend args overridden by {BACKEND_ARGS_ENV}");
            self.backend.args = args.split_whitespace().map(str::to_string).collect();
        }

        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            if LevelFilter::from_str(level.trim()).is_err() {
                return Err(ConfigError::EnvOverride {
                    location: ErrorLocation::from(Location::caller()),
                    variable: LOG_LEVEL_ENV.to_string(),
                    reason: format!("unknown log level '{level}'"),
                });
            }
            self.logging.level = Some(level.trim().to_string());
        }

        if let Ok(flag) = std::env::var(WIRE_TRACE_ENV) {
            self.logging.wire_trace = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => true,
                "0" | "false" | "off" => false,
                _ => {
                    return Err(ConfigError::EnvOverride {
                        location: ErrorLocation::from(Location::caller()),
                        variable: WIRE_TRACE_ENV.to_string(),
                        reason: format!("expected true or false, got '{flag}'"),
                    });
                }
            };
        }

        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.backend.program.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "backend.program cannot be empty".to_string(),
            });
        }

        if !(MIN_FRAME_BYTES..=MAX_FRAME_BYTES).contains(&self.framing.max_frame_bytes) {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid max_frame_bytes: {} (must be {}-{})",
                    self.framing.max_frame_bytes, MIN_FRAME_BYTES, MAX_FRAME_BYTES
                ),
            });
        }

        if let Some(level) = &self.logging.level
            && self.logging.level_filter().is_none()
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid logging.level: '{level}'"),
            });
        }

        if self.ui.status_message_ms > MAX_STATUS_MESSAGE_MS {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid status_message_ms: {} (must be at most {})",
                    self.ui.status_message_ms, MAX_STATUS_MESSAGE_MS
                ),
            });
        }

        Ok(())
    }
}
