use crate::codec::HangupTarget;

use models::{Contact, HistoryFilter, SipSettings};

/// User-initiated request handled by the session coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// `confirmed` acknowledges placing a call while another is active.
    PlaceCall { number: String, confirmed: bool },
    Hangup(HangupTarget),
    Answer { call_id: String },
    SetMute { call_id: String, muted: bool },
    SetHold { call_id: String, on_hold: bool },
    ToggleMute,
    ToggleHold,
    MergeToConference { call_ids: Vec<String> },
    /// Merge every standalone call.
    MergeActiveCalls,
    AddToConference { call_id: String },
    EndConference,
    SwitchActive { call_id: String },
    RequestSipSettings,
    RegisterSip(SipSettings),
    UnregisterSip,
    RequestAudioDevices,
    SetAudioDevices { input_device: i64, output_device: i64 },
    TestAudio,
    RequestCallHistory(HistoryFilter),
    ClearCallHistory,
    RequestContacts,
    SaveContact(Contact),
    DeleteContact { contact_id: String },
    SearchContacts { query: String },
}

impl Intent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::PlaceCall { .. } => "place_call",
            Intent::Hangup(_) => "hangup",
            Intent::Answer { .. } => "answer",
            Intent::SetMute { .. } => "set_mute",
            Intent::SetHold { .. } => "set_hold",
            Intent::ToggleMute => "toggle_mute",
            Intent::ToggleHold => "toggle_hold",
            Intent::MergeToConference { .. } => "merge_to_conference",
            Intent::MergeActiveCalls => "merge_active_calls",
            Intent::AddToConference { .. } => "add_to_conference",
            Intent::EndConference => "end_conference",
            Intent::SwitchActive { .. } => "switch_active",
            Intent::RequestSipSettings => "request_sip_settings",
            Intent::RegisterSip(_) => "register_sip",
            Intent::UnregisterSip => "unregister_sip",
            Intent::RequestAudioDevices => "request_audio_devices",
            Intent::SetAudioDevices { .. } => "set_audio_devices",
            Intent::TestAudio => "test_audio",
            Intent::RequestCallHistory(_) => "request_call_history",
            Intent::ClearCallHistory => "clear_call_history",
            Intent::RequestContacts => "request_contacts",
            Intent::SaveContact(_) => "save_contact",
            Intent::DeleteContact { .. } => "delete_contact",
            Intent::SearchContacts { .. } => "search_contacts",
        }
    }
}
