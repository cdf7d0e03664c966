pub mod codec;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;


pub const APP_NAME: &str = "softphone";
pub const CONFIG_DIR_NAME: &str = APP_NAME;
pub const LOG_DIR_NAME: &str = const_format::concatcp!(APP_NAME, "/logs");
pub const LOG_FILE_NAME: &str = const_format::concatcp!(APP_NAME, ".log");

/// Log targets carrying raw backend traffic.
pub const WIRE_LOG_TARGETS: [&str; 2] = ["call_core::codec", "call_core::transport"];
