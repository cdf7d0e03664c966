use call_core::config::AppConfig;
use call_core::error::session::SessionError;
use call_core::session::{Intent, Screen, SessionRuntime, UiUpdate, UpdateKind};

use std::time::Duration;

use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(10);

fn scripted_backend(script: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.backend.program = "sh".to_string();
    config.backend.args = vec!["-c".to_string(), script.to_string()];
    config
}

/// **VALUE**: Verifies the whole pipeline against a real child process: spawn, stdout
/// framing, decoding, registry updates and cleanup when the backend exits.
///
/// **WHY THIS MATTERS**: Unit tests fake the transport. This is the one place where the
/// real pipes, the framing and the coordinator run together.
///
/// **BUG THIS CATCHES**: Would catch events lost between the process and the session,
/// or calls left behind after the backend died.
#[tokio::test]
async fn given_scripted_backend_when_call_rings_and_backend_exits_then_session_reset() {
    // GIVEN: A backend that rings, logs, then exits after a pause
    let config = scripted_backend(
        r#"printf 'pjsua ready\n{"type":"incoming_call","id":1,"remote_uri":"sip:1002@pbx"}\n'; sleep 1"#,
    );
    let handle = SessionRuntime::start(&config).expect("backend should start");
    let mut updates = handle.subscribe_to(&[UpdateKind::Ring, UpdateKind::SessionReset]);

    // WHEN / THEN: The call rings
    let ring = timeout(WAIT, updates.recv()).await.expect("ring should arrive");
    assert_eq!(
        ring,
        Some(UiUpdate::Ring {
            call_id: "1".to_string(),
            number: "1002".to_string()
        })
    );

    // WHEN / THEN: The backend exits and the session resets
    let reset = timeout(WAIT, updates.recv()).await.expect("reset should arrive");
    assert_eq!(reset, Some(UiUpdate::SessionReset));

    timeout(WAIT, async {
        while handle.is_running() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("runtime should stop");

    let snapshot = handle.snapshot().await;
    assert!(snapshot.calls.is_empty());
    assert_eq!(snapshot.screen, Screen::Dialer);

    let result = handle.dispatch(Intent::RequestSipSettings).await;
    assert!(matches!(result, Err(SessionError::RuntimeStopped { .. })));
}

/// **VALUE**: Verifies that shutting down kills a backend that would otherwise run on.
#[tokio::test]
async fn given_long_running_backend_when_shutdown_then_backend_stopped() {
    // GIVEN
    let handle = SessionRuntime::start(&scripted_backend("cat > /dev/null")).expect("start");
    assert!(handle.snapshot().await.backend_running);

    // WHEN
    timeout(WAIT, handle.shutdown()).await.expect("shutdown");

    // THEN
    assert!(!handle.snapshot().await.backend_running);
}

#[tokio::test]
async fn given_missing_backend_when_session_started_then_error() {
    let mut config = AppConfig::default();
    config.backend.program = "   ".to_string();

    let result = SessionRuntime::start(&config);

    assert!(result.is_err());
}
