//! Session coordinator.
//!
//! Applies decoded backend events to the [`CallRegistry`] and turns user
//! intents into outbound commands. All mutation happens here, on one task;
//! the registry is never shared.
//!
//! # Refused intents
//!
//! An intent that fails validation, or whose command cannot be written,
//! sends nothing and leaves the registry untouched. The refusal is
//! surfaced as a status message and returned as a [`SessionError`].

use crate::codec::{
    self, AdminRequest, CallCommand, CallStatePayload, ConferencePayload, HangupTarget,
    InboundEvent, IncomingCallPayload, OutboundCommand,
};
use crate::config::CallPolicyConfig;
use crate::error::session::SessionError;
use crate::error::transport::TransportError;
use crate::session::intent::Intent;
use crate::session::presentation::{PresentationHub, Screen, UiUpdate};
use crate::session::registry::CallRegistry;
use crate::session::timer::CallTimer;
use crate::transport::Transport;

use models::{
    Call, CallDirection, CallState, ConferenceGroup, Contact, ContactBuilder, ErrorLocation,
    HistoryFilter, SipSettings,
};

use std::panic::Location;

use log::{debug, error, info, warn};

const NEED_TWO_CALLS: &str = "Need at least two calls to create a conference";
const BACKEND_STOPPED: &str = "Calls ended: backend stopped";

/// Point-in-time copy of the session for readers outside the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub calls: Vec<Call>,
    pub conference: Option<ConferenceGroup>,
    pub active_call_id: Option<String>,
    pub screen: Screen,
    pub registered: bool,
    pub backend_running: bool,
}

impl SessionSnapshot {
    pub fn active_call(&self) -> Option<&Call> {
        let call_id = self.active_call_id.as_deref()?;
        self.calls.iter().find(|call| call.id == call_id)
    }
}

pub struct SessionCoordinator<T: Transport> {
    transport: T,
    registry: CallRegistry,
    timer: CallTimer,
    hub: PresentationHub,
    policy: CallPolicyConfig,
    screen: Screen,
    registered: bool,
    /// Number of the last `make_call`, claimed by the next `call_init`.
    pending_number: Option<String>,
    /// Call targeted by the last `set_mute`; backend mute events carry no id.
    mute_target: Option<String>,
    hold_target: Option<String>,
}

impl<T: Transport> SessionCoordinator<T> {
    pub fn new(transport: T, hub: PresentationHub, policy: CallPolicyConfig) -> Self {
        Self {
            transport,
            registry: CallRegistry::new(),
            timer: CallTimer::new(hub.clone()),
            hub,
            policy,
            screen: Screen::Dialer,
            registered: false,
            pending_number: None,
            mute_target: None,
            hold_target: None,
        }
    }

    pub fn registry(&self) -> &CallRegistry {
        &self.registry
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn timer(&self) -> &CallTimer {
        &self.timer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn hub(&self) -> &PresentationHub {
        &self.hub
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut calls = self.registry.calls().to_vec();
        if let Some(group) = self.registry.conference() {
            calls.extend(group.member_ids().filter_map(|id| self.registry.get(id)).cloned());
        }

        SessionSnapshot {
            calls,
            conference: self.registry.conference().cloned(),
            active_call_id: self.registry.active_call_id().map(str::to_string),
            screen: self.screen,
            registered: self.registered,
            backend_running: self.transport.is_running(),
        }
    }

    // ============================================
    // INBOUND EVENTS
    // ============================================

    pub fn handle_event(&mut self, event: InboundEvent) {
        debug!("Handling {} event", event.kind());

        match event {
            InboundEvent::RegistrationState { registered, .. } => self.on_registration(registered),
            InboundEvent::Registered { .. } => self.on_registration(true),
            InboundEvent::CallState(payload) => self.on_call_state(payload),
            InboundEvent::IncomingCall(payload) => self.on_incoming_call(payload),
            InboundEvent::CallInit { id } => self.on_call_init(&id),
            InboundEvent::CallEnded { call_id } => self.teardown(&call_id),
            InboundEvent::ConferenceState(payload) => self.on_conference_state(payload),
            InboundEvent::ConferenceEnded { message, .. } => {
                self.on_conference_state(ConferencePayload {
                    calls: Vec::new(),
                    group_name: None,
                    message,
                })
            }
            InboundEvent::CallSwitch {
                active_call,
                message,
            } => self.on_call_switch(active_call, message),
            InboundEvent::CallMuteState { muted, message } => self.on_mute_state(muted, message),
            InboundEvent::CallHoldState { on_hold, message } => {
                self.on_hold_state(on_hold, message)
            }
            InboundEvent::AudioDevices { devices } => {
                self.hub.publish(UiUpdate::AudioDevices(devices))
            }
            InboundEvent::AudioSettings { settings } => {
                self.hub.publish(UiUpdate::AudioSettings(settings))
            }
            InboundEvent::AudioTest { status } => self.on_audio_test(status),
            InboundEvent::SipSettings { settings } => {
                self.hub.publish(UiUpdate::SipSettings(settings))
            }
            InboundEvent::Contacts { contacts }
            | InboundEvent::ContactSearchResults { results: contacts } => {
                self.hub.publish(UiUpdate::Contacts(contacts))
            }
            InboundEvent::CallHistory { history } => {
                self.hub.publish(UiUpdate::CallHistory(history))
            }
            InboundEvent::Error { message } => {
                warn!("Backend error: {message}");
                self.status(format!("Error: {message}"));
                self.hub.publish(UiUpdate::BackendError { message });
            }
            InboundEvent::Unrecognized => debug!("Ignoring unrecognized backend event"),
        }
    }

    fn on_registration(&mut self, registered: bool) {
        self.registered = registered;
        self.hub.publish(UiUpdate::Registration { registered });
        self.status(if registered {
            "SIP account registered"
        } else {
            "SIP account not registered"
        });
    }

    fn on_incoming_call(&mut self, payload: IncomingCallPayload) {
        let number = payload.caller_number().unwrap_or_default();
        info!("Incoming call {} from {number}", payload.id);

        let call = self
            .registry
            .upsert_call(
                &payload.id,
                &number,
                CallState::Incoming,
                CallDirection::Incoming,
            )
            .clone();
        self.hub.publish(UiUpdate::CallUpdated(call.clone()));

        if self.registry.active_call_id().is_none() {
            self.activate(&call.id);
        }

        self.hub.publish(UiUpdate::Ring {
            call_id: call.id,
            number: call.number,
        });
        self.show(Screen::IncomingCall);
    }

    fn on_call_state(&mut self, payload: CallStatePayload) {
        let number = payload.caller_number().unwrap_or_default();
        let call_id = payload.id;
        let state = payload.state;

        if state.is_terminal() {
            debug!("Call {call_id} reached terminal state {state}");
            self.teardown(&call_id);
            return;
        }

        let previous = self.registry.get(&call_id).map(|call| call.state.clone());
        let call = self
            .registry
            .upsert_call(&call_id, &number, state.clone(), CallDirection::Outgoing)
            .clone();
        self.hub.publish(UiUpdate::CallUpdated(call));

        let is_active = match self.registry.active_call_id() {
            None => true,
            Some(active) => active == call_id,
        };
        if is_active {
            self.activate(&call_id);
        }

        if state == CallState::Confirmed && previous != Some(CallState::Confirmed) && is_active {
            self.timer.start(&call_id);
        }

        if state.is_progressing() {
            self.show(Screen::Call);
        }
    }

    fn on_call_init(&mut self, call_id: &str) {
        let number = self.pending_number.take().unwrap_or_default();

        if self.registry.contains(call_id) {
            if let Some(call) = self.registry.get_mut(call_id)
                && call.number.is_empty()
            {
                call.number = number;
            }
        } else {
            self.registry
                .upsert_call(call_id, &number, CallState::Dialing, CallDirection::Outgoing);
        }

        if let Some(call) = self.registry.get(call_id).cloned() {
            self.hub.publish(UiUpdate::CallUpdated(call));
        }
        self.activate(call_id);
        self.show(Screen::Call);
    }

    fn on_conference_state(&mut self, payload: ConferencePayload) {
        let previous_active = self.registry.active_call_id().map(str::to_string);
        let message = payload.message.clone();
        let group = payload.into_group();

        if group.is_empty() {
            self.registry.set_conference(None);
        } else {
            self.registry.set_conference(Some(group));
            if let Some(call_id) = self.registry.collapse_conference_if_singular()
                && let Some(call) = self.registry.get(&call_id).cloned()
            {
                self.hub.publish(UiUpdate::CallUpdated(call));
            }
        }

        self.hub.publish(UiUpdate::ConferenceUpdated(
            self.registry.conference().cloned(),
        ));
        self.status(message.unwrap_or_else(|| "Conference call updated".to_string()));

        self.after_removal(previous_active);
    }

    fn on_call_switch(&mut self, active_call: Option<String>, message: Option<String>) {
        if let Some(call_id) = active_call
            && self.registry.contains(&call_id)
        {
            self.activate(&call_id);
        }

        if let Some(message) = message {
            self.status(message);
        }
    }

    fn on_mute_state(&mut self, muted: bool, message: Option<String>) {
        let target = self.take_target(TargetKind::Mute);

        if let Some(call) = target.as_deref().and_then(|id| self.registry.get_mut(id)) {
            call.muted = muted;
        }

        self.hub.publish(UiUpdate::MuteState {
            call_id: target,
            muted,
        });
        self.status(message.unwrap_or_else(|| mute_text(muted).to_string()));
    }

    fn on_hold_state(&mut self, on_hold: bool, message: Option<String>) {
        let target = self.take_target(TargetKind::Hold);

        if let Some(call) = target.as_deref().and_then(|id| self.registry.get_mut(id)) {
            call.on_hold = on_hold;
        }

        self.hub.publish(UiUpdate::HoldState {
            call_id: target,
            on_hold,
        });
        self.status(message.unwrap_or_else(|| hold_text(on_hold).to_string()));
    }

    fn on_audio_test(&mut self, status: String) {
        match status.as_str() {
            "playing" => self.status("Playing test audio..."),
            "completed" => self.status("Audio test completed"),
            _ => {}
        }
        self.hub.publish(UiUpdate::AudioTest { status });
    }

    /// Remove a call from every place it is tracked.
    ///
    /// Shared by `call_ended` and disconnect-variant `call_state`.
    fn teardown(&mut self, call_id: &str) {
        let previous_active = self.registry.active_call_id().map(str::to_string);
        let standalone = self.registry.remove_call(call_id).is_some();
        let member = self.registry.remove_from_conference(call_id);

        if !standalone && !member {
            debug!("Teardown of unknown call {call_id}");
        } else {
            info!("Call {call_id} ended");
            self.hub.publish(UiUpdate::CallRemoved {
                call_id: call_id.to_string(),
            });
        }

        if self.timer.call_id() == Some(call_id) {
            self.timer.stop();
        }
        if self.mute_target.as_deref() == Some(call_id) {
            self.mute_target = None;
        }
        if self.hold_target.as_deref() == Some(call_id) {
            self.hold_target = None;
        }

        if member {
            if let Some(demoted) = self.registry.collapse_conference_if_singular()
                && let Some(call) = self.registry.get(&demoted).cloned()
            {
                self.hub.publish(UiUpdate::CallUpdated(call));
            }
            self.hub.publish(UiUpdate::ConferenceUpdated(
                self.registry.conference().cloned(),
            ));
        }

        self.after_removal(previous_active);
    }

    /// Re-establish the active call after calls disappeared, or fall back
    /// to the empty baseline.
    fn after_removal(&mut self, previous_active: Option<String>) {
        if self.registry.is_empty() {
            self.reset_session();
            return;
        }

        let current = self.registry.repair_active().map(str::to_string);
        if current != previous_active {
            debug!("Active call is now {current:?}");
            self.hub
                .publish(UiUpdate::ActiveCallChanged { call_id: current });
        }

        if let Some(timed) = self.timer.call_id()
            && !self.registry.contains(timed)
        {
            self.timer.stop();
        }

        let ringing = self
            .registry
            .calls()
            .iter()
            .any(|call| call.state == CallState::Incoming);
        if self.screen != Screen::Call && !ringing {
            self.show(Screen::Call);
        }
    }

    fn reset_session(&mut self) {
        let had_state = !self.registry.is_empty() || self.screen != Screen::Dialer;

        self.registry.clear();
        self.timer.stop();
        self.pending_number = None;
        self.mute_target = None;
        self.hold_target = None;

        if had_state {
            debug!("Session reset to baseline");
        }
        self.hub.publish(UiUpdate::SessionReset);
        self.hub
            .publish(UiUpdate::ActiveCallChanged { call_id: None });
        self.show(Screen::Dialer);
    }

    // ============================================
    // USER INTENTS
    // ============================================

    pub fn handle_intent(&mut self, intent: Intent) -> Result<(), SessionError> {
        debug!("Handling {} intent", intent.name());

        match intent {
            Intent::PlaceCall { number, confirmed } => self.place_call(&number, confirmed),
            Intent::Hangup(target) => self.hangup(target),
            Intent::Answer { call_id } => self.answer(&call_id),
            Intent::SetMute { call_id, muted } => self.set_mute(&call_id, muted),
            Intent::SetHold { call_id, on_hold } => self.set_hold(&call_id, on_hold),
            Intent::ToggleMute => self.toggle_mute(),
            Intent::ToggleHold => self.toggle_hold(),
            Intent::MergeToConference { call_ids } => self.merge_to_conference(&call_ids),
            Intent::MergeActiveCalls => self.merge_active_calls(),
            Intent::AddToConference { call_id } => self.add_to_conference(&call_id),
            Intent::EndConference => self.end_conference(),
            Intent::SwitchActive { call_id } => self.switch_active(&call_id),
            Intent::RequestSipSettings => self.request_sip_settings(),
            Intent::RegisterSip(settings) => self.register_sip(&settings),
            Intent::UnregisterSip => self.unregister_sip(),
            Intent::RequestAudioDevices => self.request_audio_devices(),
            Intent::SetAudioDevices {
                input_device,
                output_device,
            } => self.set_audio_devices(input_device, output_device),
            Intent::TestAudio => self.test_audio(),
            Intent::RequestCallHistory(filter) => self.request_call_history(filter),
            Intent::ClearCallHistory => self.clear_call_history(),
            Intent::RequestContacts => self.request_contacts(),
            Intent::SaveContact(contact) => self.save_contact(contact),
            Intent::DeleteContact { contact_id } => self.delete_contact(&contact_id),
            Intent::SearchContacts { query } => self.search_contacts(&query),
        }
    }

    /// Dial `number`.
    ///
    /// With a call already in progress and `confirm_second_call` set, the
    /// call is only placed when `confirmed` is true.
    pub fn place_call(&mut self, number: &str, confirmed: bool) -> Result<(), SessionError> {
        let number = number.trim();
        if number.is_empty() {
            self.status("Please enter a number");
            return Err(SessionError::validation("Number to call is empty"));
        }

        if !self.registry.is_empty() && self.policy.confirm_second_call && !confirmed {
            warn!("Refusing second call to {number} without confirmation");
            self.status("You already have an active call");
            return Err(SessionError::SecondCallDeclined {
                message: format!("Call to {number} needs confirmation"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.send(CallCommand::MakeCall {
            number: number.to_string(),
        })?;

        self.pending_number = Some(number.to_string());
        self.status(format!("Calling {number}..."));
        Ok(())
    }

    /// Request a hangup. The registry changes only when the backend
    /// confirms with `call_ended` or a disconnect state.
    pub fn hangup(&mut self, target: HangupTarget) -> Result<(), SessionError> {
        if matches!(&target, HangupTarget::Call(call_id) if call_id.is_empty()) {
            return Err(SessionError::validation("Call id to hang up is empty"));
        }

        self.send(CallCommand::HangupCall { call_id: target })
    }

    pub fn answer(&mut self, call_id: &str) -> Result<(), SessionError> {
        if !self.registry.contains(call_id) {
            return Err(SessionError::unknown_call(call_id));
        }

        self.send(CallCommand::AnswerCall {
            call_id: call_id.to_string(),
        })?;
        self.show(Screen::Call);
        Ok(())
    }

    /// Mute or unmute `call_id`. The flag flips immediately; the backend's
    /// `call_mute_state` reply is authoritative.
    pub fn set_mute(&mut self, call_id: &str, muted: bool) -> Result<(), SessionError> {
        if !self.registry.contains(call_id) {
            return Err(SessionError::unknown_call(call_id));
        }

        self.send(CallCommand::SetMute {
            call_id: call_id.to_string(),
            muted,
        })?;

        if let Some(call) = self.registry.get_mut(call_id) {
            call.muted = muted;
        }
        self.mute_target = Some(call_id.to_string());

        self.hub.publish(UiUpdate::MuteState {
            call_id: Some(call_id.to_string()),
            muted,
        });
        self.status(mute_text(muted));
        Ok(())
    }

    pub fn set_hold(&mut self, call_id: &str, on_hold: bool) -> Result<(), SessionError> {
        if !self.registry.contains(call_id) {
            return Err(SessionError::unknown_call(call_id));
        }

        self.send(CallCommand::SetHold {
            call_id: call_id.to_string(),
            on_hold,
        })?;

        if let Some(call) = self.registry.get_mut(call_id) {
            call.on_hold = on_hold;
        }
        self.hold_target = Some(call_id.to_string());

        self.hub.publish(UiUpdate::HoldState {
            call_id: Some(call_id.to_string()),
            on_hold,
        });
        self.status(hold_text(on_hold));
        Ok(())
    }

    pub fn toggle_mute(&mut self) -> Result<(), SessionError> {
        let call = self
            .registry
            .active_call()
            .ok_or_else(SessionError::no_active_call)?;
        let (call_id, muted) = (call.id.clone(), !call.muted);

        self.set_mute(&call_id, muted)
    }

    pub fn toggle_hold(&mut self) -> Result<(), SessionError> {
        let call = self
            .registry
            .active_call()
            .ok_or_else(SessionError::no_active_call)?;
        let (call_id, on_hold) = (call.id.clone(), !call.on_hold);

        self.set_hold(&call_id, on_hold)
    }

    /// Ask the backend to bridge `call_ids`. Needs two distinct ids.
    pub fn merge_to_conference(&mut self, call_ids: &[String]) -> Result<(), SessionError> {
        let call_ids = distinct(call_ids.iter().map(String::as_str));

        if call_ids.len() < 2 {
            self.status(NEED_TWO_CALLS);
            return Err(SessionError::validation(NEED_TWO_CALLS));
        }

        self.send(CallCommand::SetupConference { call_ids })?;
        self.status("Setting up conference call...");
        Ok(())
    }

    /// Merge every standalone call.
    pub fn merge_active_calls(&mut self) -> Result<(), SessionError> {
        let call_ids: Vec<String> = self
            .registry
            .calls()
            .iter()
            .map(|call| call.id.clone())
            .collect();

        self.merge_to_conference(&call_ids)
    }

    /// Merge `call_id` together with every standalone call.
    pub fn add_to_conference(&mut self, call_id: &str) -> Result<(), SessionError> {
        if !self.registry.contains(call_id) {
            return Err(SessionError::unknown_call(call_id));
        }

        let call_ids = distinct(
            self.registry
                .calls()
                .iter()
                .map(|call| call.id.as_str())
                .chain(std::iter::once(call_id)),
        );

        if call_ids.len() < 2 {
            self.status(NEED_TWO_CALLS);
            return Err(SessionError::validation(NEED_TWO_CALLS));
        }

        self.send(CallCommand::SetupConference { call_ids })?;
        self.status("Merging call into conference...");
        Ok(())
    }

    pub fn end_conference(&mut self) -> Result<(), SessionError> {
        let group = self
            .registry
            .conference()
            .ok_or_else(|| SessionError::validation("No conference in progress"))?;
        let group_id = group.group_name.clone();

        self.send(CallCommand::EndConference { group_id })
    }

    /// Select another known call. Unknown ids are ignored.
    ///
    /// Mute and hold are tracked per call, so the selected call's own
    /// flags are published rather than reset.
    pub fn switch_active(&mut self, call_id: &str) -> Result<(), SessionError> {
        if !self.registry.contains(call_id) {
            debug!("Ignoring switch to unknown call {call_id}");
            return Ok(());
        }

        self.send(CallCommand::SwitchCall {
            call_id: call_id.to_string(),
        })?;

        self.activate(call_id);

        if let Some(call) = self.registry.get(call_id) {
            self.hub.publish(UiUpdate::MuteState {
                call_id: Some(call.id.clone()),
                muted: call.muted,
            });
            self.hub.publish(UiUpdate::HoldState {
                call_id: Some(call.id.clone()),
                on_hold: call.on_hold,
            });
        }
        Ok(())
    }

    pub fn request_sip_settings(&mut self) -> Result<(), SessionError> {
        self.send(AdminRequest::GetSipSettings)
    }

    pub fn register_sip(&mut self, settings: &SipSettings) -> Result<(), SessionError> {
        if let Err(e) = settings.validate() {
            self.status("Please fill all required fields");
            return Err(e.into());
        }

        self.send(AdminRequest::register_sip(settings))?;
        self.status("Registering SIP account...");
        Ok(())
    }

    pub fn unregister_sip(&mut self) -> Result<(), SessionError> {
        self.send(AdminRequest::UnregisterSip)?;
        self.status("Unregistering SIP account...");
        Ok(())
    }

    /// Fetch the device lists and the current selection.
    pub fn request_audio_devices(&mut self) -> Result<(), SessionError> {
        self.send(CallCommand::GetAudioDevices)?;
        self.send(CallCommand::GetAudioSettings)
    }

    pub fn set_audio_devices(
        &mut self,
        input_device: i64,
        output_device: i64,
    ) -> Result<(), SessionError> {
        self.send(CallCommand::SetAudioDevices {
            input_device,
            output_device,
        })?;
        self.status("Audio settings saved");
        Ok(())
    }

    pub fn test_audio(&mut self) -> Result<(), SessionError> {
        self.send(CallCommand::TestAudio)
    }

    pub fn request_call_history(&mut self, filter: HistoryFilter) -> Result<(), SessionError> {
        let filter_type = match filter {
            HistoryFilter::All => None,
            other => Some(other),
        };

        self.send(CallCommand::GetCallHistory { filter_type })
    }

    pub fn clear_call_history(&mut self) -> Result<(), SessionError> {
        self.send(AdminRequest::ClearCallHistory)
    }

    pub fn request_contacts(&mut self) -> Result<(), SessionError> {
        self.send(AdminRequest::GetContacts)
    }

    /// Validate and save a contact. A contact with an id is an update.
    pub fn save_contact(&mut self, contact: Contact) -> Result<(), SessionError> {
        let mut builder = ContactBuilder::default()
            .with_name(contact.name)
            .with_number(contact.number);
        if let Some(id) = contact.id {
            builder = builder.with_id(id);
        }
        if let Some(email) = contact.email {
            builder = builder.with_email(email);
        }

        let contact = match builder.build() {
            Ok(contact) => contact,
            Err(e) => {
                self.status("Please fill all required fields");
                return Err(e.into());
            }
        };

        let updated = contact.id.is_some();
        self.send(AdminRequest::SaveContact { contact })?;
        self.status(if updated {
            "Contact updated"
        } else {
            "Contact added"
        });
        Ok(())
    }

    pub fn delete_contact(&mut self, contact_id: &str) -> Result<(), SessionError> {
        if contact_id.trim().is_empty() {
            return Err(SessionError::validation("Contact id is empty"));
        }

        self.send(AdminRequest::DeleteContact {
            contact_id: contact_id.trim().to_string(),
        })?;
        self.status("Contact deleted");
        Ok(())
    }

    /// Search contacts; an empty query lists them all.
    pub fn search_contacts(&mut self, query: &str) -> Result<(), SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return self.request_contacts();
        }

        self.send(AdminRequest::SearchContacts {
            query: query.to_string(),
        })
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    /// Stop the backend and return to the empty baseline.
    pub fn shutdown(&mut self) {
        info!("Shutting down session");
        self.transport.stop();
        self.reset_session();
    }

    /// The backend process is gone; every call went with it.
    pub fn on_backend_exit(&mut self, code: Option<i32>) {
        warn!("Backend exited (code: {code:?}), ending all calls");
        self.reset_session();
        self.status(BACKEND_STOPPED);
    }

    pub fn on_transport_error(&mut self, error: TransportError) {
        error!("Transport error: {error}");
        self.status("Failed to send command to backend");
    }

    // ============================================
    // HELPERS
    // ============================================

    fn send(&self, command: impl Into<OutboundCommand>) -> Result<(), SessionError> {
        let command = command.into();
        let bytes = codec::encode(&command)?;

        debug!("Sending {} command", command.kind());
        if let Err(e) = self.transport.send(bytes) {
            warn!("Dropped {} command: {e}", command.kind());
            self.status(match e {
                TransportError::NotRunning { .. } => "Backend not running",
                _ => "Failed to send command to backend",
            });
            return Err(e.into());
        }

        Ok(())
    }

    fn activate(&mut self, call_id: &str) {
        let changed = self.registry.active_call_id() != Some(call_id);
        if self.registry.set_active(call_id) && changed {
            debug!("Active call is now {call_id}");
            self.hub.publish(UiUpdate::ActiveCallChanged {
                call_id: Some(call_id.to_string()),
            });
        }
    }

    fn show(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.hub.publish(UiUpdate::Screen(screen));
        }
    }

    fn status(&self, message: impl Into<String>) {
        self.hub.publish(UiUpdate::Status(message.into()));
    }

    fn take_target(&mut self, kind: TargetKind) -> Option<String> {
        let pending = match kind {
            TargetKind::Mute => self.mute_target.take(),
            TargetKind::Hold => self.hold_target.take(),
        };

        pending
            .filter(|call_id| self.registry.contains(call_id))
            .or_else(|| self.registry.active_call_id().map(str::to_string))
    }
}

#[derive(Debug, Clone, Copy)]
enum TargetKind {
    Mute,
    Hold,
}

fn mute_text(muted: bool) -> &'static str {
    if muted { "Call muted" } else { "Call unmuted" }
}

fn hold_text(on_hold: bool) -> &'static str {
    if on_hold {
        "Call on hold"
    } else {
        "Call resumed"
    }
}

fn distinct<'a>(call_ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for call_id in call_ids.map(str::trim).filter(|id| !id.is_empty()) {
        if !unique.iter().any(|seen| seen == call_id) {
            unique.push(call_id.to_string());
        }
    }
    unique
}
