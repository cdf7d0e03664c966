//! Domain models for the softphone.
//!
//! This crate contains pure data structures representing the core
//! concepts of the application: calls, conference groups, contacts,
//! call history, audio devices and SIP account settings. Models have no
//! business logic - they're just data that can be passed between layers.
//!
//! ## Architecture
//!
//! - **models** (this crate): Pure data structures
//! - **call-core**: Codec, transport and session logic operating on models
//! - **softphone**: Application wiring everything together
//!
//! This layered architecture keeps concerns separated and makes testing easier.

pub mod audio;
pub mod call;
pub mod conference;
pub mod contact;
pub mod error;
pub mod history;
pub mod redacted_secret;
pub mod sip;

pub use audio::{AudioDevice, AudioDevices, AudioSettings};
pub use call::{Call, CallDirection, CallState};
pub use conference::{ConferenceGroup, ConferenceMember};
pub use contact::{Contact, ContactBuilder};
pub use error::error_location::ErrorLocation;
pub use error::model_error::ModelError;
pub use error::redact_error::RedactError;
pub use history::{CallHistoryEntry, HistoryFilter, HistoryKind};
pub use redacted_secret::RedactedSecret;
pub use sip::SipSettings;
