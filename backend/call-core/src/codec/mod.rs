//! Message codec between the session and the backend process.
//!
//! - [`decode`] extracts one JSON payload from a frame of text
//! - [`encode`] serializes an outbound command as one JSON line
//! - [`FrameDecoder`] turns raw stdout chunks into frames
//!
//! The backend interleaves human-readable log lines with its JSON
//! payloads. Frames are therefore searched for the span from the first
//! `{` to the last `}`, and anything that does not parse is treated as
//! diagnostic text.

pub mod command;
pub mod event;
pub mod frame;

pub use command::{AdminRequest, CallCommand, HangupTarget, OutboundCommand};
pub use event::{CallStatePayload, ConferencePayload, IncomingCallPayload, InboundEvent};
pub use frame::FrameDecoder;

use crate::error::codec::CodecError;

use std::sync::OnceLock;

use log::trace;
use regex::Regex;

const PAYLOAD_PATTERN: &str = r"(?s)\{.*\}";

static PAYLOAD_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_payload_regex() -> &'static Regex {
    PAYLOAD_REGEX.get_or_init(|| Regex::new(PAYLOAD_PATTERN).expect("valid regex pattern"))
}

/// Decode the single payload contained in `chunk`, if any.
///
/// Returns `None` when the text holds no `{...}` span or the span is not
/// a valid event. Such text is diagnostic output, not a protocol error.
pub fn decode(chunk: &str) -> Option<InboundEvent> {
    let Some(span) = get_payload_regex().find(chunk) else {
        trace!("Backend output: {}", chunk.trim_end());
        return None;
    };

    match serde_json::from_str::<InboundEvent>(span.as_str()) {
        Ok(event) => Some(event),
        Err(e) => {
            trace!("Discarding undecodable payload ({e}): {}", span.as_str());
            None
        }
    }
}

/// Serialize `command` as one JSON object followed by a single newline.
pub fn encode(command: &OutboundCommand) -> Result<Vec<u8>, CodecError> {
    let mut bytes = serde_json::to_vec(command)?;
    bytes.push(b'\n');
    Ok(bytes)
}
