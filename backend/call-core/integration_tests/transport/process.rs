use call_core::error::spawn::SpawnError;
use call_core::error::transport::TransportError;
use call_core::transport::{
    BackendCommand, BackendProcess, Transport, TransportEvent, TransportEvents,
};

use std::time::Duration;

use tokio::time::timeout;
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(10);

// ============================================================================
// BackendProcess against real child processes
// ============================================================================

async fn next_event(events: &mut TransportEvents) -> Option<TransportEvent> {
    timeout(WAIT, events.recv())
        .await
        .expect("transport event should arrive")
}

async fn wait_for_exit(events: &mut TransportEvents) -> (Vec<u8>, Option<i32>) {
    let mut data = Vec::new();
    loop {
        match next_event(events).await {
            Some(TransportEvent::Data(bytes)) => data.extend(bytes),
            Some(TransportEvent::Exited { code }) => return (data, code),
            Some(TransportEvent::Error(e)) => panic!("unexpected transport error: {e}"),
            None => panic!("event stream ended without exit"),
        }
    }
}

/// **VALUE**: Verifies that bytes written to the backend come back from its stdout.
///
/// **WHY THIS MATTERS**: This is the whole transport: commands go in on stdin, events
/// come out on stdout. `cat` echoes what it reads, so a round trip proves both pipes.
///
/// **BUG THIS CATCHES**: Would catch a writer that never flushes, which leaves commands
/// sitting in a buffer while the backend waits for them.
#[tokio::test]
async fn given_cat_backend_when_line_sent_then_echoed_on_stdout() {
    // GIVEN
    let mut process = BackendProcess::new();
    let mut events = process
        .start(&BackendCommand::new("cat"))
        .expect("cat should start");
    assert!(process.is_running());
    assert!(process.pid().is_some());

    // WHEN
    process
        .send(b"{\"command\":\"get_audio_devices\"}\n".to_vec())
        .expect("send should succeed");

    // THEN
    let mut echoed = Vec::new();
    while !echoed.ends_with(b"\n") {
        match next_event(&mut events).await {
            Some(TransportEvent::Data(bytes)) => echoed.extend(bytes),
            other => panic!("expected data, got {other:?}"),
        }
    }
    assert_eq!(echoed, b"{\"command\":\"get_audio_devices\"}\n");

    process.stop();
}

/// **VALUE**: Verifies that a backend exiting on its own reports its exit code after
/// its remaining output.
///
/// **BUG THIS CATCHES**: Would catch the exit notice overtaking the last stdout bytes,
/// which would drop the backend's final events.
#[tokio::test]
async fn given_backend_that_prints_and_exits_when_running_then_output_then_exit_code() {
    // GIVEN
    let command = BackendCommand::new("sh").with_args(["-c", "printf 'last words\\n'; exit 3"]);
    let mut process = BackendProcess::new();

    // WHEN
    let mut events = process.start(&command).expect("sh should start");
    let (output, code) = wait_for_exit(&mut events).await;

    // THEN
    assert_eq!(output, b"last words\n");
    assert_eq!(code, Some(3));
    assert!(!process.is_running());
    assert!(process.pid().is_none());
}

/// **VALUE**: Verifies that sending after the backend is gone is an error, not a hang.
#[tokio::test]
async fn given_exited_backend_when_sending_then_not_running() {
    let mut process = BackendProcess::new();
    let mut events = process
        .start(&BackendCommand::new("sh").with_args(["-c", "exit 0"]))
        .expect("sh should start");
    wait_for_exit(&mut events).await;

    let result = process.send(b"{}\n".to_vec());

    assert!(matches!(result, Err(TransportError::NotRunning { .. })));
}

/// **VALUE**: Verifies that stopping kills the child, reports the exit and can be repeated.
///
/// **WHY THIS MATTERS**: Shutdown paths call `stop` from more than one place. A second
/// call must not panic or block.
#[tokio::test]
async fn given_running_backend_when_stopped_twice_then_exit_reported_once() {
    // GIVEN
    let mut process = BackendProcess::new();
    let mut events = process
        .start(&BackendCommand::new("sleep").with_args(["30"]))
        .expect("sleep should start");

    // WHEN
    process.stop();
    process.stop();

    // THEN
    assert!(!process.is_running());
    let (_, code) = wait_for_exit(&mut events).await;
    assert_eq!(code, None, "killed process has no exit code");
    assert!(next_event(&mut events).await.is_none());
}

#[tokio::test]
async fn given_running_backend_when_started_again_then_already_running() {
    let mut process = BackendProcess::new();
    let _events = process
        .start(&BackendCommand::new("sleep").with_args(["30"]))
        .expect("sleep should start");

    let result = process.start(&BackendCommand::new("sleep").with_args(["30"]));

    assert!(matches!(result, Err(TransportError::AlreadyRunning { .. })));
    process.stop();
}

/// **VALUE**: Verifies that a missing backend program fails to start with a spawn error.
///
/// **BUG THIS CATCHES**: Would catch the local-binary fallback swallowing the failure,
/// leaving the softphone running with no backend.
#[tokio::test]
async fn given_missing_program_when_started_then_spawn_error() {
    // GIVEN
    let program = format!("softphone-backend-missing-{}", Uuid::new_v4());

    // WHEN
    let result = BackendProcess::new().start(&BackendCommand::new(program));

    // THEN
    assert!(matches!(
        result,
        Err(TransportError::Spawn(SpawnError::Spawn { .. }))
    ));
}

/// **VALUE**: Verifies that nothing is read from stdout once the exit has been reported,
/// even when a child of the backend keeps the pipe open and writes later.
///
/// **WHY THIS MATTERS**: The session flushes its frame buffer and resets on `Exited`.
/// Data arriving afterwards would be decoded against a session that no longer exists.
///
/// **BUG THIS CATCHES**: Would catch the stdout reader being left running after the
/// drain timeout gives up on it.
#[tokio::test]
async fn given_descendant_holding_stdout_when_backend_exits_then_no_data_after_exit() {
    // GIVEN: A backend whose background child writes after the backend is gone
    let command =
        BackendCommand::new("sh").with_args(["-c", "(sleep 3; echo late) & exit 0"]);
    let mut process = BackendProcess::new();
    let mut events = process.start(&command).expect("sh should start");

    // WHEN: The backend exits
    let (_, code) = wait_for_exit(&mut events).await;
    assert_eq!(code, Some(0));

    // THEN: The late write never surfaces
    match timeout(Duration::from_secs(3), events.recv()).await {
        Ok(Some(TransportEvent::Data(bytes))) => {
            panic!("data after exit: {:?}", String::from_utf8_lossy(&bytes))
        }
        Ok(_) | Err(_) => {}
    }

    process.stop();
}
