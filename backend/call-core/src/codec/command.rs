//! Outbound commands sent to the backend.
//!
//! The backend dispatches administrative requests on a `type` field and
//! call-control commands on a `command` field. The two families are kept
//! as separate enums so each serializes with the discriminant the backend
//! expects for that kind.

use models::{Contact, HistoryFilter, RedactedSecret, SipSettings};

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutboundCommand {
    Admin(AdminRequest),
    Call(CallCommand),
}

impl OutboundCommand {
    /// Wire name of the command, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundCommand::Admin(request) => request.kind(),
            OutboundCommand::Call(command) => command.kind(),
        }
    }
}

impl From<AdminRequest> for OutboundCommand {
    fn from(request: AdminRequest) -> Self {
        OutboundCommand::Admin(request)
    }
}

impl From<CallCommand> for OutboundCommand {
    fn from(command: CallCommand) -> Self {
        OutboundCommand::Call(command)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdminRequest {
    GetSipSettings,
    RegisterSip {
        username: String,
        #[serde(serialize_with = "RedactedSecret::serialize_exposed")]
        password: RedactedSecret,
        domain: String,
        proxy: String,
    },
    UnregisterSip,
    SaveContact {
        contact: Contact,
    },
    DeleteContact {
        contact_id: String,
    },
    SearchContacts {
        query: String,
    },
    ClearCallHistory,
    GetContacts,
}

impl AdminRequest {
    pub fn register_sip(settings: &SipSettings) -> Self {
        AdminRequest::RegisterSip {
            username: settings.username.clone(),
            password: settings.password.clone(),
            domain: settings.domain.clone(),
            proxy: settings.proxy.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AdminRequest::GetSipSettings => "get_sip_settings",
            AdminRequest::RegisterSip { .. } => "register_sip",
            AdminRequest::UnregisterSip => "unregister_sip",
            AdminRequest::SaveContact { .. } => "save_contact",
            AdminRequest::DeleteContact { .. } => "delete_contact",
            AdminRequest::SearchContacts { .. } => "search_contacts",
            AdminRequest::ClearCallHistory => "clear_call_history",
            AdminRequest::GetContacts => "get_contacts",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CallCommand {
    MakeCall {
        number: String,
    },
    HangupCall {
        call_id: HangupTarget,
    },
    AnswerCall {
        call_id: String,
    },
    SetMute {
        call_id: String,
        muted: bool,
    },
    SetHold {
        call_id: String,
        on_hold: bool,
    },
    SetupConference {
        call_ids: Vec<String>,
    },
    SwitchCall {
        call_id: String,
    },
    EndConference {
        #[serde(skip_serializing_if = "Option::is_none")]
        group_id: Option<String>,
    },
    GetAudioDevices,
    GetAudioSettings,
    SetAudioDevices {
        input_device: i64,
        output_device: i64,
    },
    TestAudio,
    GetCallHistory {
        #[serde(skip_serializing_if = "Option::is_none")]
        filter_type: Option<HistoryFilter>,
    },
}

impl CallCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            CallCommand::MakeCall { .. } => "make_call",
            CallCommand::HangupCall { .. } => "hangup_call",
            CallCommand::AnswerCall { .. } => "answer_call",
            CallCommand::SetMute { .. } => "set_mute",
            CallCommand::SetHold { .. } => "set_hold",
            CallCommand::SetupConference { .. } => "setup_conference",
            CallCommand::SwitchCall { .. } => "switch_call",
            CallCommand::EndConference { .. } => "end_conference",
            CallCommand::GetAudioDevices => "get_audio_devices",
            CallCommand::GetAudioSettings => "get_audio_settings",
            CallCommand::SetAudioDevices { .. } => "set_audio_devices",
            CallCommand::TestAudio => "test_audio",
            CallCommand::GetCallHistory { .. } => "get_call_history",
        }
    }
}

/// Target of `hangup_call`: one call, or every call the backend holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HangupTarget {
    Call(String),
    All,
}

const HANGUP_ALL: &str = "all";

impl HangupTarget {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case(HANGUP_ALL) {
            HangupTarget::All
        } else {
            HangupTarget::Call(raw.trim().to_string())
        }
    }
}

impl Serialize for HangupTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            HangupTarget::Call(call_id) => serializer.serialize_str(call_id),
            HangupTarget::All => serializer.serialize_str(HANGUP_ALL),
        }
    }
}
