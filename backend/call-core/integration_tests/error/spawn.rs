use call_core::error::CoreError;
use call_core::error::spawn::SpawnError;
use call_core::error::transport::TransportError;
use call_core::transport::BackendCommand;

use models::ErrorLocation;

use std::error::Error;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;

/// **VALUE**: Verifies that `SpawnError::Spawn` includes file/line/column location tracking.
///
/// **WHY THIS MATTERS**: Spawning can fail at the configured program or at the local
/// binary fallback. The location tells which attempt produced the error.
///
/// **BUG THIS CATCHES**: Would catch if the location field were dropped from the
/// error's Display output.
#[test]
#[track_caller]
fn given_spawn_error_when_formatted_then_includes_location() {
    // GIVEN
    let io_err = IoError::new(ErrorKind::NotFound, "program not found");
    let err = SpawnError::Spawn {
        message: "Failed to spawn python".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(io_err),
    };

    // WHEN
    let error_string = format!("{}", err);

    // THEN
    assert!(error_string.contains("Spawn Error"));
    assert!(error_string.contains("Failed to spawn python"));
    assert!(error_string.contains("spawn.rs"));
}

/// **VALUE**: Verifies the underlying I/O error is kept as the source.
#[test]
fn given_spawn_error_when_source_requested_then_io_error_returned() {
    let err = SpawnError::Spawn {
        message: "Failed to spawn python".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::PermissionDenied, "denied")),
    };

    let source = err.source().expect("source should be set");

    assert_eq!(source.to_string(), "denied");
}

/// **VALUE**: Verifies that validation errors pass through the transport and core
/// wrappers with their message intact.
#[test]
fn given_invalid_command_when_wrapped_then_message_preserved() {
    // GIVEN
    let spawn_error = BackendCommand::new("")
        .validate()
        .expect_err("blank program should be rejected");

    // WHEN
    let core_error = CoreError::from(TransportError::from(spawn_error));

    // THEN
    let text = core_error.to_string();
    assert!(text.contains("Validation Error"));
    assert!(text.contains("Backend program must not be empty"));
}
