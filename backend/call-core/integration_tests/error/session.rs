use call_core::error::session::SessionError;
use call_core::error::transport::TransportError;

/// **VALUE**: Verifies every refusal maps to a stable category for status reporting.
///
/// **WHY THIS MATTERS**: Frontends choose their message from the category, not from the
/// formatted text, which carries a source location.
#[test]
fn given_session_errors_when_categorised_then_stable_names() {
    let cases = [
        (SessionError::validation("empty"), "validation"),
        (SessionError::unknown_call("9"), "unknown_call"),
        (SessionError::no_active_call(), "no_active_call"),
        (SessionError::runtime_stopped("gone"), "stopped"),
        (
            SessionError::from(TransportError::not_running()),
            "not_running",
        ),
        (SessionError::from(TransportError::write("pipe")), "write"),
    ];

    for (error, category) in cases {
        assert_eq!(error.error_category(), category, "{error}");
    }
}

/// **VALUE**: Verifies the formatted error names the call and where it was raised.
#[test]
fn given_unknown_call_error_when_formatted_then_includes_id_and_location() {
    let error = SessionError::unknown_call("42");

    let text = error.to_string();

    assert!(text.contains("Unknown Call Error: 42"));
    assert!(text.contains("session.rs"));
}
