// Unit tests for outbound command serialization

use crate::codec::{AdminRequest, CallCommand, HangupTarget, OutboundCommand, encode};

use models::{ContactBuilder, HistoryFilter, SipSettings};

use serde_json::{Value, json};

fn encoded(command: impl Into<OutboundCommand>) -> (Vec<u8>, Value) {
    let bytes = encode(&command.into()).expect("command should encode");
    let value = serde_json::from_slice(&bytes).expect("encoded bytes should be JSON");
    (bytes, value)
}

/// **VALUE**: Verifies that every encoded command is exactly one line.
///
/// **WHY THIS MATTERS**: The backend reads commands line by line. An embedded newline
/// would split a command in two, and a missing one would stall the backend.
///
/// **BUG THIS CATCHES**: Would catch pretty-printing or a missing terminator.
#[test]
fn given_call_command_when_encoded_then_single_newline_terminated_line() {
    // GIVEN / WHEN
    let (bytes, value) = encoded(CallCommand::MakeCall {
        number: "555".to_string(),
    });

    // THEN: One trailing newline and nothing else
    assert_eq!(bytes.last(), Some(&b'\n'));
    assert_eq!(bytes.iter().filter(|byte| **byte == b'\n').count(), 1);
    assert_eq!(value, json!({"command": "make_call", "number": "555"}));
}

/// **VALUE**: Verifies that call commands use `command` and admin requests use `type`.
///
/// **WHY THIS MATTERS**: The backend routes on the discriminant key. A request sent with
/// the wrong key is silently ignored.
#[test]
fn given_admin_and_call_commands_when_encoded_then_discriminant_keys_differ() {
    // GIVEN / WHEN
    let (_, admin) = encoded(AdminRequest::GetSipSettings);
    let (_, call) = encoded(CallCommand::GetAudioDevices);

    // THEN
    assert_eq!(admin, json!({"type": "get_sip_settings"}));
    assert_eq!(call, json!({"command": "get_audio_devices"}));
}

/// **VALUE**: Verifies the hangup target serializes as the id or the literal `all`.
#[test]
fn given_hangup_targets_when_encoded_then_id_or_all() {
    let (_, one) = encoded(CallCommand::HangupCall {
        call_id: HangupTarget::parse("12"),
    });
    let (_, every) = encoded(CallCommand::HangupCall {
        call_id: HangupTarget::parse(" ALL "),
    });

    assert_eq!(one, json!({"command": "hangup_call", "call_id": "12"}));
    assert_eq!(every, json!({"command": "hangup_call", "call_id": "all"}));
}

/// **VALUE**: Verifies that registration carries the clear password on the wire.
///
/// **WHY THIS MATTERS**: The password type refuses plain serialization so it never
/// leaks into logs. The one request that must carry it has to opt in explicitly.
///
/// **BUG THIS CATCHES**: Would catch if registration failed to encode, or sent a
/// redacted placeholder instead of the password.
#[test]
fn given_sip_settings_when_register_encoded_then_password_exposed() {
    // GIVEN
    let settings = SipSettings::new("alice", "s3cret", "example.com", "");

    // WHEN
    let (_, value) = encoded(AdminRequest::register_sip(&settings));

    // THEN
    assert_eq!(
        value,
        json!({
            "type": "register_sip",
            "username": "alice",
            "password": "s3cret",
            "domain": "example.com",
            "proxy": ""
        })
    );
}

#[test]
fn given_optional_fields_absent_when_encoded_then_keys_omitted() {
    let (_, history) = encoded(CallCommand::GetCallHistory { filter_type: None });
    let (_, missed) = encoded(CallCommand::GetCallHistory {
        filter_type: Some(HistoryFilter::Missed),
    });
    let (_, end) = encoded(CallCommand::EndConference { group_id: None });

    assert_eq!(history, json!({"command": "get_call_history"}));
    assert_eq!(
        missed,
        json!({"command": "get_call_history", "filter_type": "missed"})
    );
    assert_eq!(end, json!({"command": "end_conference"}));
}

#[test]
fn given_contact_when_save_encoded_then_contact_nested() {
    let contact = ContactBuilder::default()
        .with_name("Ann")
        .with_number("555")
        .build()
        .expect("contact should build");

    let (_, value) = encoded(AdminRequest::SaveContact { contact });

    assert_eq!(value["type"], "save_contact");
    assert_eq!(value["contact"]["name"], "Ann");
    assert_eq!(value["contact"]["number"], "555");
}

#[test]
fn given_commands_when_kind_requested_then_matches_wire_name() {
    let command: OutboundCommand = CallCommand::SetupConference {
        call_ids: vec!["1".to_string(), "2".to_string()],
    }
    .into();
    let (_, value) = encoded(command.clone());

    assert_eq!(command.kind(), "setup_conference");
    assert_eq!(value["command"], command.kind());
    assert_eq!(value["call_ids"], json!(["1", "2"]));
}
