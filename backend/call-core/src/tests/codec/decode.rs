// Unit tests for payload extraction and event decoding

use crate::codec::{InboundEvent, decode, get_payload_regex};
use crate::codec::event::number_from_remote_uri;

use models::{CallState, HistoryKind};

/// **VALUE**: Verifies that text with no `{`/`}` pair decodes to nothing.
///
/// **WHY THIS MATTERS**: The backend prints human-readable log lines on the same
/// stream as its payloads. Those lines must be ignored, not reported as errors.
///
/// **BUG THIS CATCHES**: Would catch if plain log text produced an event or panicked.
#[test]
fn given_plain_log_line_when_decoded_then_returns_none() {
    // GIVEN: Backend log output without a payload
    let chunk = "Registering account sip:alice@example.com";

    // WHEN: Decoding
    let event = decode(chunk);

    // THEN: Nothing
    assert_eq!(event, None);
}

/// **VALUE**: Verifies that log text before a payload is skipped.
///
/// **WHY THIS MATTERS**: The backend sometimes prefixes a flush with diagnostic
/// text. The payload after it must still be delivered.
///
/// **BUG THIS CATCHES**: Would catch if decoding required the chunk to start with `{`.
#[test]
fn given_log_prefix_before_error_payload_when_decoded_then_returns_error_event() {
    // GIVEN: A log prefix and an error payload
    let chunk = r#"log line {"type":"error","message":"x"}"#;

    // WHEN: Decoding
    let event = decode(chunk);

    // THEN: The error event, prefix ignored
    assert_eq!(
        event,
        Some(InboundEvent::Error {
            message: "x".to_string()
        })
    );
}

/// **VALUE**: Verifies that a payload pretty-printed over several lines still decodes.
///
/// **BUG THIS CATCHES**: Would catch if the span regex loses its dot-matches-newline flag.
#[test]
fn given_payload_spanning_lines_when_decoded_then_returns_event() {
    // GIVEN: A multi-line payload
    let chunk = "{\n  \"type\": \"call_ended\",\n  \"call_id\": \"7\"\n}\n";

    // WHEN: Decoding
    let event = decode(chunk);

    // THEN: Decoded
    assert_eq!(
        event,
        Some(InboundEvent::CallEnded {
            call_id: "7".to_string()
        })
    );
}

/// **VALUE**: Verifies the span runs from the first `{` to the last `}`.
#[test]
fn given_nested_objects_when_regex_applied_then_span_covers_outer_object() {
    // GIVEN: A payload with a nested object and trailing text
    let chunk = r#"x {"a":{"b":1}} y"#;

    // WHEN: Matching
    let span = get_payload_regex().find(chunk).map(|m| m.as_str());

    // THEN: The outer object
    assert_eq!(span, Some(r#"{"a":{"b":1}}"#));
}

/// **VALUE**: Verifies that malformed JSON decodes to nothing rather than failing.
///
/// **BUG THIS CATCHES**: Would catch if a broken payload were surfaced as an error
/// instead of being dropped.
#[test]
fn given_malformed_json_when_decoded_then_returns_none() {
    assert_eq!(decode(r#"{"type": "call_state", "id": }"#), None);
    assert_eq!(decode("{ not json }"), None);
}

/// **VALUE**: Verifies that event kinds this client does not know are tolerated.
///
/// **WHY THIS MATTERS**: A newer backend may add events. They must not be confused
/// with undecodable text or break decoding of known events.
#[test]
fn given_unknown_event_type_when_decoded_then_returns_unrecognized() {
    let event = decode(r#"{"type":"presence_update","status":"away"}"#);

    assert_eq!(event, Some(InboundEvent::Unrecognized));
}

/// **VALUE**: Verifies that a JSON object without a `type` field is not an event.
#[test]
fn given_object_without_type_when_decoded_then_returns_none() {
    assert_eq!(decode(r#"{"id":"1","state":"confirmed"}"#), None);
}

/// **VALUE**: Verifies `call_state` decoding with the numeric ids and upper-case
/// states pjsua produces.
///
/// **BUG THIS CATCHES**: Would catch if ids were only accepted as JSON strings, or if
/// the `code` field were dropped.
#[test]
fn given_call_state_with_numeric_id_when_decoded_then_id_is_text() {
    // GIVEN: A call_state payload as the backend emits it
    let chunk = r#"{"type":"call_state","id":3,"state":"CONFIRMED","number":"555","code":200}"#;

    // WHEN: Decoding
    let Some(InboundEvent::CallState(payload)) = decode(chunk) else {
        panic!("expected call_state");
    };

    // THEN: Fields mapped
    assert_eq!(payload.id, "3");
    assert_eq!(payload.state, CallState::Confirmed);
    assert_eq!(payload.caller_number(), Some("555".to_string()));
    assert_eq!(payload.code, Some(200));
}

/// **VALUE**: Verifies the caller number falls back to the SIP user of `remote_uri`.
///
/// **WHY THIS MATTERS**: Incoming calls often carry only a remote URI. Without the
/// fallback the user sees an unknown caller.
#[test]
fn given_incoming_call_with_remote_uri_only_when_decoded_then_number_from_uri() {
    // GIVEN: An incoming call without a number
    let chunk = r#"{"type":"incoming_call","id":"9","remote_uri":"\"Bob\" <sip:1002@pbx.local>"}"#;

    // WHEN: Decoding
    let Some(InboundEvent::IncomingCall(payload)) = decode(chunk) else {
        panic!("expected incoming_call");
    };

    // THEN: Number taken from the URI
    assert_eq!(payload.caller_number(), Some("1002".to_string()));
}

/// **VALUE**: Verifies an explicit number wins over the remote URI.
#[test]
fn given_number_and_remote_uri_when_resolved_then_number_wins() {
    let chunk = r#"{"type":"incoming_call","id":"9","number":"555","remote_uri":"sip:1002@pbx"}"#;

    let Some(InboundEvent::IncomingCall(payload)) = decode(chunk) else {
        panic!("expected incoming_call");
    };

    assert_eq!(payload.caller_number(), Some("555".to_string()));
}

#[test]
fn given_uri_without_user_when_extracting_number_then_none() {
    assert_eq!(number_from_remote_uri("pbx.local"), None);
    assert_eq!(
        number_from_remote_uri("<sip:alice@example.com>"),
        Some("alice".to_string())
    );
}

/// **VALUE**: Verifies a conference snapshot with member details decodes into a group.
#[test]
fn given_conference_state_when_decoded_then_members_and_name_kept() {
    // GIVEN: A conference snapshot
    let chunk = r#"{"type":"conference_state","group_name":"Team","message":"Merged",
        "calls":[{"id":"1","number":"555","state":"CONFIRMED"},{"id":"2","number":"777"}]}"#;

    // WHEN: Decoding
    let Some(InboundEvent::ConferenceState(payload)) = decode(chunk) else {
        panic!("expected conference_state");
    };
    let group = payload.into_group();

    // THEN: Members in order
    assert_eq!(group.display_name(), "Team");
    assert_eq!(group.member_ids().collect::<Vec<_>>(), vec!["1", "2"]);
    assert_eq!(group.members[0].state, Some(CallState::Confirmed));
    assert_eq!(group.members[1].state, None);
}

/// **VALUE**: Verifies that `calls: null` is read as an empty conference.
///
/// **BUG THIS CATCHES**: Would catch if a null list dropped the whole event, leaving a
/// stale conference on screen.
#[test]
fn given_conference_state_with_null_calls_when_decoded_then_empty() {
    let Some(InboundEvent::ConferenceState(payload)) =
        decode(r#"{"type":"conference_state","calls":null}"#)
    else {
        panic!("expected conference_state");
    };

    assert!(payload.calls.is_empty());
}

/// **VALUE**: Verifies forwarded payloads (history, search results, sip settings) decode.
#[test]
fn given_forwarded_payloads_when_decoded_then_contents_kept() {
    // GIVEN / WHEN: History
    let history = decode(
        r#"{"type":"call_history","history":[{"number":"555","type":"missed","timestamp":"2024-01-01 10:00:00","duration":0}]}"#,
    );

    // THEN
    let Some(InboundEvent::CallHistory { history }) = history else {
        panic!("expected call_history");
    };
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, HistoryKind::Missed);

    // GIVEN / WHEN: Search results
    let results = decode(
        r#"{"type":"contact_search_results","results":[{"id":"c1","name":"Ann","number":"555"}]}"#,
    );

    // THEN
    let Some(InboundEvent::ContactSearchResults { results }) = results else {
        panic!("expected contact_search_results");
    };
    assert_eq!(results[0].name, "Ann");

    // GIVEN / WHEN: SIP settings
    let settings = decode(
        r#"{"type":"sip_settings","settings":{"username":"alice","password":"pw","domain":"example.com","proxy":""}}"#,
    );

    // THEN: Password kept but not printable
    let Some(InboundEvent::SipSettings { settings }) = settings else {
        panic!("expected sip_settings");
    };
    assert_eq!(settings.password.as_str(), "pw");
    assert!(!format!("{settings:?}").contains("pw\""));
}

/// **VALUE**: Verifies mute and hold notifications decode with their optional message.
#[test]
fn given_mute_and_hold_states_when_decoded_then_flags_kept() {
    assert_eq!(
        decode(r#"{"type":"call_mute_state","message":"Call muted","muted":true}"#),
        Some(InboundEvent::CallMuteState {
            muted: true,
            message: Some("Call muted".to_string())
        })
    );
    assert_eq!(
        decode(r#"{"type":"call_hold_state","on_hold":false}"#),
        Some(InboundEvent::CallHoldState {
            on_hold: false,
            message: None
        })
    );
}
