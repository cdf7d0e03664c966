//! Inbound events emitted by the backend.
//!
//! Every payload is a JSON object discriminated by its `type` field.
//! Unknown discriminants decode to [`InboundEvent::Unrecognized`] so that
//! a newer backend never breaks an older client.

use models::{
    AudioDevices, AudioSettings, CallHistoryEntry, CallState, ConferenceGroup, ConferenceMember,
    Contact, SipSettings,
};

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};

const SIP_USER_PATTERN: &str = r"sip:(?P<user>[^@]+)@";
const SIP_USER_CAPTURE: &str = "user";

static SIP_USER_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_sip_user_regex() -> &'static Regex {
    SIP_USER_REGEX.get_or_init(|| Regex::new(SIP_USER_PATTERN).expect("valid regex pattern"))
}

/// Extract the user part of a `sip:user@host` URI.
pub fn number_from_remote_uri(remote_uri: &str) -> Option<String> {
    get_sip_user_regex()
        .captures(remote_uri)
        .and_then(|cap| cap.name(SIP_USER_CAPTURE))
        .map(|user| user.as_str().to_string())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    RegistrationState {
        #[serde(default)]
        registered: bool,
        #[serde(default)]
        message: Option<String>,
    },
    Registered {
        #[serde(default)]
        message: Option<String>,
    },
    CallState(CallStatePayload),
    IncomingCall(IncomingCallPayload),
    CallInit {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
    },
    CallEnded {
        #[serde(deserialize_with = "deserialize_id")]
        call_id: String,
    },
    ConferenceState(ConferencePayload),
    ConferenceEnded {
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        group_id: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
    CallSwitch {
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        active_call: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
    CallMuteState {
        muted: bool,
        #[serde(default)]
        message: Option<String>,
    },
    CallHoldState {
        on_hold: bool,
        #[serde(default)]
        message: Option<String>,
    },
    AudioDevices {
        #[serde(default)]
        devices: AudioDevices,
    },
    AudioSettings {
        #[serde(default)]
        settings: AudioSettings,
    },
    AudioTest {
        #[serde(default)]
        status: String,
    },
    SipSettings {
        #[serde(default)]
        settings: SipSettings,
    },
    Contacts {
        #[serde(default, deserialize_with = "deserialize_list")]
        contacts: Vec<Contact>,
    },
    ContactSearchResults {
        #[serde(default, deserialize_with = "deserialize_list")]
        results: Vec<Contact>,
    },
    CallHistory {
        #[serde(default, deserialize_with = "deserialize_list")]
        history: Vec<CallHistoryEntry>,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unrecognized,
}

impl InboundEvent {
    /// Wire name of the event, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::RegistrationState { .. } => "registration_state",
            InboundEvent::Registered { .. } => "registered",
            InboundEvent::CallState(_) => "call_state",
            InboundEvent::IncomingCall(_) => "incoming_call",
            InboundEvent::CallInit { .. } => "call_init",
            InboundEvent::CallEnded { .. } => "call_ended",
            InboundEvent::ConferenceState(_) => "conference_state",
            InboundEvent::ConferenceEnded { .. } => "conference_ended",
            InboundEvent::CallSwitch { .. } => "call_switch",
            InboundEvent::CallMuteState { .. } => "call_mute_state",
            InboundEvent::CallHoldState { .. } => "call_hold_state",
            InboundEvent::AudioDevices { .. } => "audio_devices",
            InboundEvent::AudioSettings { .. } => "audio_settings",
            InboundEvent::AudioTest { .. } => "audio_test",
            InboundEvent::SipSettings { .. } => "sip_settings",
            InboundEvent::Contacts { .. } => "contacts",
            InboundEvent::ContactSearchResults { .. } => "contact_search_results",
            InboundEvent::CallHistory { .. } => "call_history",
            InboundEvent::Error { .. } => "error",
            InboundEvent::Unrecognized => "unrecognized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallStatePayload {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub state: CallState,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub number: Option<String>,
    #[serde(default)]
    pub remote_uri: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

impl CallStatePayload {
    /// Reported number, falling back to the SIP user of `remote_uri`.
    pub fn caller_number(&self) -> Option<String> {
        resolve_number(self.number.as_deref(), self.remote_uri.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomingCallPayload {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub number: Option<String>,
    #[serde(default)]
    pub remote_uri: Option<String>,
}

impl IncomingCallPayload {
    pub fn caller_number(&self) -> Option<String> {
        resolve_number(self.number.as_deref(), self.remote_uri.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConferencePayload {
    #[serde(default, deserialize_with = "deserialize_list")]
    pub calls: Vec<ConferenceMember>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConferencePayload {
    pub fn into_group(self) -> ConferenceGroup {
        ConferenceGroup::new(self.group_name, self.calls)
    }
}

fn resolve_number(number: Option<&str>, remote_uri: Option<&str>) -> Option<String> {
    number
        .map(str::trim)
        .filter(|number| !number.is_empty())
        .map(str::to_string)
        .or_else(|| remote_uri.and_then(number_from_remote_uri))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            Scalar::Integer(number) => number.to_string(),
        }
    }
}

/// Ids are opaque strings, but test harnesses and older backends send integers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(String::from)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

/// `null` lists are reported by the backend when nothing is stored yet.
fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
