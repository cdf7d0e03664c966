//! Presentation surface of the session.
//!
//! The core never renders. Everything a UI needs is published as a
//! [`UiUpdate`] on a broadcast channel; consumers subscribe to all updates
//! or only to the kinds they render.

use models::{
    AudioDevices, AudioSettings, Call, CallHistoryEntry, ConferenceGroup, Contact, SipSettings,
};

use log::trace;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Dialer,
    Call,
    IncomingCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    Screen(Screen),
    Status(String),
    Ring { call_id: String, number: String },
    CallUpdated(Call),
    CallRemoved { call_id: String },
    ActiveCallChanged { call_id: Option<String> },
    ConferenceUpdated(Option<ConferenceGroup>),
    SessionReset,
    Duration { call_id: String, text: String },
    Registration { registered: bool },
    AudioDevices(AudioDevices),
    AudioSettings(AudioSettings),
    AudioTest { status: String },
    SipSettings(SipSettings),
    Contacts(Vec<Contact>),
    CallHistory(Vec<CallHistoryEntry>),
    MuteState { call_id: Option<String>, muted: bool },
    HoldState { call_id: Option<String>, on_hold: bool },
    BackendError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Screen,
    Status,
    Ring,
    CallUpdated,
    CallRemoved,
    ActiveCallChanged,
    ConferenceUpdated,
    SessionReset,
    Duration,
    Registration,
    AudioDevices,
    AudioSettings,
    AudioTest,
    SipSettings,
    Contacts,
    CallHistory,
    MuteState,
    HoldState,
    BackendError,
}

impl UiUpdate {
    pub fn kind(&self) -> UpdateKind {
        match self {
            UiUpdate::Screen(_) => UpdateKind::Screen,
            UiUpdate::Status(_) => UpdateKind::Status,
            UiUpdate::Ring { .. } => UpdateKind::Ring,
            UiUpdate::CallUpdated(_) => UpdateKind::CallUpdated,
            UiUpdate::CallRemoved { .. } => UpdateKind::CallRemoved,
            UiUpdate::ActiveCallChanged { .. } => UpdateKind::ActiveCallChanged,
            UiUpdate::ConferenceUpdated(_) => UpdateKind::ConferenceUpdated,
            UiUpdate::SessionReset => UpdateKind::SessionReset,
            UiUpdate::Duration { .. } => UpdateKind::Duration,
            UiUpdate::Registration { .. } => UpdateKind::Registration,
            UiUpdate::AudioDevices(_) => UpdateKind::AudioDevices,
            UiUpdate::AudioSettings(_) => UpdateKind::AudioSettings,
            UiUpdate::AudioTest { .. } => UpdateKind::AudioTest,
            UiUpdate::SipSettings(_) => UpdateKind::SipSettings,
            UiUpdate::Contacts(_) => UpdateKind::Contacts,
            UiUpdate::CallHistory(_) => UpdateKind::CallHistory,
            UiUpdate::MuteState { .. } => UpdateKind::MuteState,
            UiUpdate::HoldState { .. } => UpdateKind::HoldState,
            UiUpdate::BackendError { .. } => UpdateKind::BackendError,
        }
    }
}

/// Broadcast hub for [`UiUpdate`]s. Clones share one channel.
#[derive(Debug, Clone)]
pub struct PresentationHub {
    tx: broadcast::Sender<UiUpdate>,
}

impl PresentationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, update: UiUpdate) {
        trace!("UI update: {:?}", update.kind());
        let _ = self.tx.send(update);
    }

    pub fn subscribe(&self) -> UpdateSubscription {
        UpdateSubscription {
            rx: self.tx.subscribe(),
            kinds: None,
        }
    }

    /// Subscribe to the listed kinds only.
    pub fn subscribe_to(&self, kinds: &[UpdateKind]) -> UpdateSubscription {
        UpdateSubscription {
            rx: self.tx.subscribe(),
            kinds: Some(kinds.to_vec()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for PresentationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct UpdateSubscription {
    rx: broadcast::Receiver<UiUpdate>,
    kinds: Option<Vec<UpdateKind>>,
}

impl UpdateSubscription {
    /// Next matching update, or `None` once the hub is gone.
    ///
    /// A subscriber that falls behind skips what it missed.
    pub async fn recv(&mut self) -> Option<UiUpdate> {
        loop {
            match self.rx.recv().await {
                Ok(update) if self.accepts(&update) => return Some(update),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    trace!("Subscriber lagged, skipped {skipped} updates");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<UiUpdate> {
        use tokio::sync::broadcast::error::TryRecvError;

        loop {
            match self.rx.try_recv() {
                Ok(update) if self.accepts(&update) => return Some(update),
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    fn accepts(&self, update: &UiUpdate) -> bool {
        self.kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&update.kind()))
    }
}
