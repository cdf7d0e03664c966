// Unit tests for the session runtime actor

use crate::config::AppConfig;
use crate::error::session::SessionError;
use crate::session::{
    Intent, Screen, SessionHandle, SessionRuntime, SessionSnapshot, UiUpdate, UpdateKind,
};
use crate::tests::helpers::RecordingTransport;
use crate::transport::{TransportEvent, TransportEvents};

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn wait_for_snapshot(
    handle: &SessionHandle,
    ready: impl Fn(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    timeout(WAIT, async {
        loop {
            let snapshot = handle.snapshot().await;
            if ready(&snapshot) {
                return snapshot;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("snapshot should settle")
}

/// **VALUE**: Verifies that stdout bytes flow through framing and decoding into the
/// session, including a payload split across reads.
///
/// **BUG THIS CATCHES**: Would catch the runtime decoding each read on its own, which
/// loses events that straddle a read boundary.
#[tokio::test]
async fn given_split_stdout_when_runtime_reads_then_incoming_call_tracked() {
    // GIVEN
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = SessionRuntime::with_transport(
        RecordingTransport::new(),
        TransportEvents::new(rx),
        &AppConfig::default(),
    );
    let mut screens = handle.subscribe_to(&[UpdateKind::Screen]);

    // WHEN
    tx.send(TransportEvent::Data(b"pjsua: ringing\n{\"type\":\"incoming_".to_vec()))
        .expect("send");
    tx.send(TransportEvent::Data(b"call\",\"id\":\"5\",\"number\":\"555\"}\n".to_vec()))
        .expect("send");

    // THEN
    let update = timeout(WAIT, screens.recv()).await.expect("screen update");
    assert_eq!(update, Some(UiUpdate::Screen(Screen::IncomingCall)));
    let snapshot = wait_for_snapshot(&handle, |snapshot| snapshot.active_call_id.is_some()).await;
    assert_eq!(snapshot.active_call_id.as_deref(), Some("5"));
    assert_eq!(snapshot.calls[0].number, "555");
}

/// **VALUE**: Verifies that intents are answered with the coordinator's result.
#[tokio::test]
async fn given_running_session_when_intents_dispatched_then_results_returned() {
    // GIVEN
    let (_tx, rx) = mpsc::unbounded_channel();
    let transport = RecordingTransport::new();
    let handle = SessionRuntime::with_transport(
        transport.clone(),
        TransportEvents::new(rx),
        &AppConfig::default(),
    );

    // WHEN
    let placed = handle
        .dispatch(Intent::PlaceCall {
            number: "555".to_string(),
            confirmed: false,
        })
        .await;
    let refused = handle.dispatch(Intent::ToggleMute).await;

    // THEN
    assert!(placed.is_ok());
    assert!(matches!(refused, Err(SessionError::NoActiveCall { .. })));
    assert_eq!(transport.sent(), vec![json!({"command": "make_call", "number": "555"})]);
}

/// **VALUE**: Verifies that backend exit ends the session and later intents are refused.
///
/// **WHY THIS MATTERS**: Once the backend is gone no command can be delivered. The UI
/// must learn that instead of waiting for replies that never come.
///
/// **BUG THIS CATCHES**: Would catch a hung `dispatch` after the actor stopped, or a
/// final payload lost because the decoder was not flushed on exit.
#[tokio::test]
async fn given_backend_exit_when_dispatching_then_runtime_stopped() {
    // GIVEN
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = SessionRuntime::with_transport(
        RecordingTransport::new(),
        TransportEvents::new(rx),
        &AppConfig::default(),
    );
    let mut resets = handle.subscribe_to(&[UpdateKind::SessionReset, UpdateKind::BackendError]);

    // WHEN: Last payload has no newline, then the backend exits
    tx.send(TransportEvent::Data(br#"{"type":"error","message":"bye"}"#.to_vec()))
        .expect("send");
    tx.send(TransportEvent::Exited { code: Some(0) }).expect("send");

    // THEN: Tail flushed, then reset
    let first = timeout(WAIT, resets.recv()).await.expect("update");
    assert_eq!(
        first,
        Some(UiUpdate::BackendError {
            message: "bye".to_string()
        })
    );
    let second = timeout(WAIT, resets.recv()).await.expect("update");
    assert_eq!(second, Some(UiUpdate::SessionReset));

    timeout(WAIT, async {
        while handle.is_running() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("runtime should stop");

    let result = handle.dispatch(Intent::RequestContacts).await;
    assert!(matches!(result, Err(SessionError::RuntimeStopped { .. })));
}

#[tokio::test]
async fn given_session_when_shutdown_twice_then_transport_stopped() {
    let (_tx, rx) = mpsc::unbounded_channel();
    let transport = RecordingTransport::new();
    let handle = SessionRuntime::with_transport(
        transport.clone(),
        TransportEvents::new(rx),
        &AppConfig::default(),
    );

    handle.shutdown().await;
    handle.shutdown().await;

    let snapshot = handle.snapshot().await;
    assert!(!snapshot.backend_running);
    assert_eq!(snapshot.screen, Screen::Dialer);
}
