//! Logging for the softphone.
//!
//! Colored lines on stdout and plain lines in `softphone.log`. Raw backend
//! traffic from [`WIRE_LOG_TARGETS`] is logged at trace level only when
//! `logging.wire_trace` is enabled; otherwise those targets stop at debug
//! so a trace session still reads as call flow.

use crate::error::SoftphoneError;

use call_core::config::LoggingConfig;
use call_core::{LOG_FILE_NAME, WIRE_LOG_TARGETS};

use models::ErrorLocation;

use std::fmt::{Arguments, Display};
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

#[cfg(debug_assertions)]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Levels resolved from [`LoggingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Level for [`WIRE_LOG_TARGETS`].
    pub wire_level: LevelFilter,
}

impl LogSettings {
    pub fn from_config(config: &LoggingConfig) -> Self {
        let level = config.level_filter().unwrap_or(DEFAULT_LEVEL);
        let wire_level = if config.wire_trace {
            LevelFilter::Trace
        } else {
            level.min(LevelFilter::Debug)
        };

        Self { level, wire_level }
    }

    /// Per-target overrides applied on top of [`LogSettings::level`].
    pub fn target_levels(&self) -> Vec<(&'static str, LevelFilter)> {
        WIRE_LOG_TARGETS
            .iter()
            .map(|target| (*target, self.wire_level))
            .collect()
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::from_config(&LoggingConfig::default())
    }
}

/// Install the global logger.
///
/// Safe to call more than once: later calls log a warning and return Ok,
/// keeping the settings of the first call.
///
/// # Errors
///
/// Returns [`SoftphoneError::Softphone`] if the log file cannot be created
/// or another logger is already installed.
pub fn initialize(log_dir: &Path, settings: LogSettings) -> Result<(), SoftphoneError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = install(log_dir, settings);
        if result.is_ok() {
            info!(
                "Logger initialized with level {:?} (backend wire: {:?})",
                settings.level, settings.wire_level
            );
        }
    });

    result
}

#[track_caller]
fn install(log_dir: &Path, settings: LogSettings) -> Result<(), SoftphoneError> {
    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let log_file = fern::log_file(log_dir.join(LOG_FILE_NAME)).map_err(|e| {
        SoftphoneError::Softphone {
            message: format!("Failed to create log file: {e}"),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let base = settings
        .target_levels()
        .into_iter()
        .fold(Dispatch::new().level(settings.level), |dispatch, (target, level)| {
            dispatch.level_for(target, level)
        });

    base.chain(
        Dispatch::new()
            .format(move |out, message, record| {
                write_line(out, message, record, &colors.color(record.level()))
            })
            .chain(stdout()),
    )
    .chain(
        Dispatch::new()
            .format(|out, message, record| write_line(out, message, record, &record.level()))
            .chain(log_file),
    )
    .apply()
    .map_err(|e| SoftphoneError::Softphone {
        message: format!("Failed to initialize logger: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn write_line(out: FormatCallback, message: &Arguments, record: &Record, level: &dyn Display) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}
