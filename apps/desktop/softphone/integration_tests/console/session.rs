use softphone::console::{ConsoleCommand, ConsoleView, parse_command};

use call_core::codec::{InboundEvent, decode};
use call_core::config::CallPolicyConfig;
use call_core::session::{PresentationHub, SessionCoordinator};
use call_core::error::transport::TransportError;
use call_core::transport::Transport;

use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Console commands driven through a real coordinator
// ============================================================================

#[derive(Clone, Default)]
struct CapturingTransport {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transport for CapturingTransport {
    fn send(&self, bytes: Vec<u8>) -> Result<(), TransportError> {
        self.lines
            .lock()
            .unwrap()
            .push(String::from_utf8(bytes).unwrap());
        Ok(())
    }

    fn is_running(&self) -> bool {
        true
    }

    fn stop(&mut self) {}
}

fn run(coordinator: &mut SessionCoordinator<CapturingTransport>, line: &str) {
    match parse_command(line).expect("line should parse") {
        Some(ConsoleCommand::Intent(intent)) => {
            let _ = coordinator.handle_intent(intent);
        }
        other => panic!("expected an intent for {line:?}, got {other:?}"),
    }
}

/// **VALUE**: Verifies that typed commands reach the backend as the expected JSON lines
/// and that the console prints what the session publishes.
///
/// **WHY THIS MATTERS**: This is the path a user exercises: type, send, see the result.
///
/// **BUG THIS CATCHES**: Would catch the console and the core disagreeing on an intent's
/// shape, such as `hangup all` being sent as a call id.
#[tokio::test]
async fn given_console_lines_when_run_against_coordinator_then_backend_receives_commands() {
    // GIVEN
    let transport = CapturingTransport::default();
    let hub = PresentationHub::new();
    let mut updates = hub.subscribe();
    let mut coordinator =
        SessionCoordinator::new(transport.clone(), hub, CallPolicyConfig::default());
    let mut view = ConsoleView::new(Duration::from_secs(60));

    // WHEN
    run(&mut coordinator, "call 555");
    coordinator.handle_event(
        decode(r#"{"type":"call_init","id":"1"}"#).expect("call_init should decode"),
    );
    run(&mut coordinator, "hangup all");

    // THEN: Commands on the wire
    let lines = transport.lines.lock().unwrap().clone();
    assert_eq!(
        lines,
        vec![
            "{\"command\":\"make_call\",\"number\":\"555\"}\n".to_string(),
            "{\"command\":\"hangup_call\",\"call_id\":\"all\"}\n".to_string(),
        ]
    );

    // THEN: Console output
    let printed: Vec<String> = std::iter::from_fn(|| updates.try_recv())
        .filter_map(|update| view.apply(&update))
        .collect();
    assert!(printed.contains(&"* Calling 555...".to_string()));
    assert!(printed.contains(&"Call 1 555 Dialing".to_string()));
    assert!(printed.contains(&"== Call ==".to_string()));
}

/// **VALUE**: Verifies that a backend error with a log prefix ends up as a console line.
#[tokio::test]
async fn given_prefixed_error_payload_when_handled_then_console_prints_error() {
    // GIVEN
    let hub = PresentationHub::new();
    let mut updates = hub.subscribe();
    let mut coordinator = SessionCoordinator::new(
        CapturingTransport::default(),
        hub,
        CallPolicyConfig::default(),
    );
    let mut view = ConsoleView::new(Duration::from_secs(60));

    // WHEN
    let event = decode(r#"backend: {"type":"error","message":"No SIP account"}"#);
    assert_eq!(
        event,
        Some(InboundEvent::Error {
            message: "No SIP account".to_string()
        })
    );
    coordinator.handle_event(event.expect("event"));

    // THEN
    let printed: Vec<String> = std::iter::from_fn(|| updates.try_recv())
        .filter_map(|update| view.apply(&update))
        .collect();
    assert_eq!(printed, vec!["* Error: No SIP account".to_string()]);
    assert_eq!(view.status(), Some("Error: No SIP account"));
}
