//! Calls as tracked by the session.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Lifecycle state of a call, as reported by the backend.
///
/// The backend reports free-form state text, except in conference
/// snapshots where pjsua's numeric `pjsip_inv_state` codes are sent.
/// Parsing accepts both, is case-insensitive, and keeps unknown values
/// verbatim in [`CallState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum CallState {
    Incoming,
    Dialing,
    Calling,
    Ringing,
    Early,
    Connecting,
    Connected,
    Confirmed,
    Ended,
    Disconnected,
    Other(String),
}

impl CallState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "incoming" | "2" => CallState::Incoming,
            "dialing" => CallState::Dialing,
            "calling" | "1" => CallState::Calling,
            "ringing" => CallState::Ringing,
            "early" | "3" => CallState::Early,
            "connecting" | "4" => CallState::Connecting,
            "connected" => CallState::Connected,
            "confirmed" | "5" => CallState::Confirmed,
            "ended" => CallState::Ended,
            // pjsua abbreviates the state text
            "disconnected" | "disconnctd" | "6" => CallState::Disconnected,
            _ => CallState::Other(raw.trim().to_string()),
        }
    }

    /// Whether the state is one this client understands.
    pub fn is_known(&self) -> bool {
        !matches!(self, CallState::Other(_))
    }

    /// Terminal states remove the call from the registry.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Ended | CallState::Disconnected)
    }

    /// States during which the call screen is shown while the call sets up.
    pub fn is_progressing(&self) -> bool {
        matches!(
            self,
            CallState::Dialing
                | CallState::Calling
                | CallState::Ringing
                | CallState::Early
                | CallState::Connecting
                | CallState::Connected
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            CallState::Incoming => "incoming",
            CallState::Dialing => "dialing",
            CallState::Calling => "calling",
            CallState::Ringing => "ringing",
            CallState::Early => "early",
            CallState::Connecting => "connecting",
            CallState::Connected => "connected",
            CallState::Confirmed => "confirmed",
            CallState::Ended => "ended",
            CallState::Disconnected => "disconnected",
            CallState::Other(raw) => raw,
        }
    }
}

impl Display for CallState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.as_str())
    }
}

impl From<CallState> for String {
    fn from(state: CallState) -> Self {
        state.as_str().to_string()
    }
}

impl<'de> Deserialize<'de> for CallState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Conference snapshots report numeric pjsua states, so accept any scalar.
        let value = deserialize_scalar_text(deserializer)?;
        Ok(CallState::parse(&value))
    }
}

fn deserialize_scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(i64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Incoming,
    Outgoing,
}

/// A single call known to the session.
///
/// `muted` and `on_hold` mirror the backend's per-call media state; they
/// are set optimistically by intents and corrected by backend events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    pub id: String,
    pub number: String,
    pub state: CallState,
    pub direction: CallDirection,
    pub muted: bool,
    pub on_hold: bool,
}

impl Call {
    pub fn new(
        id: impl Into<String>,
        number: impl Into<String>,
        state: CallState,
        direction: CallDirection,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            state,
            direction,
            muted: false,
            on_hold: false,
        }
    }
}
