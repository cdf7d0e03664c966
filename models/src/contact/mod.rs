//! Address book entries.
//!
//! Contacts are persisted by the backend; the client only renders them
//! and sends validated drafts back through `save_contact`.

mod builder;

pub use builder::ContactBuilder;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Assigned by the backend; absent for contacts not saved yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
