//! Conference snapshots.
//!
//! The backend reports conference membership as a full snapshot on every
//! change, never as deltas, so a [`ConferenceGroup`] is always replaced
//! wholesale.

use crate::CallState;

use serde::{Deserialize, Serialize};

/// One call listed in a conference snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceMember {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub state: Option<CallState>,
}

impl ConferenceMember {
    pub fn new(id: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            number: Some(number.into()),
            state: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConferenceGroup {
    pub group_name: Option<String>,
    pub members: Vec<ConferenceMember>,
}

impl ConferenceGroup {
    pub fn new(group_name: Option<String>, members: Vec<ConferenceMember>) -> Self {
        Self {
            group_name,
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, call_id: &str) -> bool {
        self.members
            .iter()
            .any(|member| member.id.as_deref() == Some(call_id))
    }

    /// Ids of all members that carry one, in snapshot order.
    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|member| member.id.as_deref())
    }

    pub fn display_name(&self) -> &str {
        self.group_name.as_deref().unwrap_or("Unnamed Group")
    }
}
