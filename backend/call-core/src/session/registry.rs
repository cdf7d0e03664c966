//! Authoritative in-memory model of calls and the conference group.
//!
//! # Invariants
//!
//! - A call is either tracked standalone or as a conference member, never both
//! - The active id, when set, names a standalone call or a conference member
//! - A conference always has at least two members once
//!   [`CallRegistry::collapse_conference_if_singular`] has run
//!
//! Standalone calls keep insertion order; [`CallRegistry::pick_next_active`]
//! depends on it.

use models::{Call, CallDirection, CallState, ConferenceGroup, ConferenceMember};

use log::debug;

#[derive(Debug, Clone, Default)]
pub struct CallRegistry {
    calls: Vec<Call>,
    conference: Option<ConferenceGroup>,
    /// Full call records of conference members, restored on collapse.
    merged: Vec<Call>,
    active_call_id: Option<String>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standalone calls, in insertion order.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn conference(&self) -> Option<&ConferenceGroup> {
        self.conference.as_ref()
    }

    pub fn active_call_id(&self) -> Option<&str> {
        self.active_call_id.as_deref()
    }

    /// The active call's record, standalone or merged.
    pub fn active_call(&self) -> Option<&Call> {
        self.active_call_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, call_id: &str) -> Option<&Call> {
        self.calls
            .iter()
            .chain(self.merged.iter())
            .find(|call| call.id == call_id)
    }

    pub fn get_mut(&mut self, call_id: &str) -> Option<&mut Call> {
        self.calls
            .iter_mut()
            .chain(self.merged.iter_mut())
            .find(|call| call.id == call_id)
    }

    pub fn is_standalone(&self, call_id: &str) -> bool {
        self.calls.iter().any(|call| call.id == call_id)
    }

    pub fn is_conference_member(&self, call_id: &str) -> bool {
        self.conference
            .as_ref()
            .is_some_and(|group| group.contains(call_id))
    }

    /// Known as a standalone call or a conference member.
    pub fn contains(&self, call_id: &str) -> bool {
        self.is_standalone(call_id) || self.is_conference_member(call_id)
    }

    /// No calls and no conference.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.conference.is_none()
    }

    /// Select `call_id` as the active call. Unknown ids are ignored.
    pub fn set_active(&mut self, call_id: &str) -> bool {
        if !self.contains(call_id) {
            return false;
        }
        self.active_call_id = Some(call_id.to_string());
        true
    }

    pub fn clear_active(&mut self) {
        self.active_call_id = None;
    }

    /// Create the call if absent, otherwise update its state and, when
    /// `number` is non-empty, its number.
    ///
    /// `direction` only applies to a newly created call. Conference members
    /// are updated in place and stay out of standalone tracking.
    pub fn upsert_call(
        &mut self,
        call_id: &str,
        number: &str,
        state: CallState,
        direction: CallDirection,
    ) -> &Call {
        if self.is_conference_member(call_id) {
            self.update_member(call_id, number, &state);

            return match self.merged.iter().position(|call| call.id == call_id) {
                Some(index) => {
                    apply_update(&mut self.merged[index], number, state);
                    &self.merged[index]
                }
                None => {
                    self.merged
                        .push(Call::new(call_id, number, state, direction));
                    &self.merged[self.merged.len() - 1]
                }
            };
        }

        match self.calls.iter().position(|call| call.id == call_id) {
            Some(index) => {
                apply_update(&mut self.calls[index], number, state);
                &self.calls[index]
            }
            None => {
                debug!("Tracking new call {call_id}");
                self.calls
                    .push(Call::new(call_id, number, state, direction));
                &self.calls[self.calls.len() - 1]
            }
        }
    }

    /// Delete a standalone call. Idempotent.
    ///
    /// Clears the active id when it named the removed call; choosing a
    /// replacement is left to the caller.
    pub fn remove_call(&mut self, call_id: &str) -> Option<Call> {
        let index = self.calls.iter().position(|call| call.id == call_id)?;
        let removed = self.calls.remove(index);

        if self.active_call_id.as_deref() == Some(call_id) {
            self.active_call_id = None;
        }

        Some(removed)
    }

    /// Replace the conference snapshot wholesale.
    ///
    /// Members move out of standalone tracking. Calls dropped from the
    /// previous snapshot are forgotten entirely. An empty group clears the
    /// conference.
    ///
    /// Members without an id cannot be tracked and are dropped, as are
    /// repeated ids. A snapshot that lists members but none usable leaves
    /// the current state untouched.
    pub fn set_conference(&mut self, group: Option<ConferenceGroup>) {
        let group = match group {
            Some(group) if !group.is_empty() => {
                let listed = group.len();
                let group = identified_members(group);
                if group.is_empty() {
                    debug!("Ignoring conference snapshot: none of {listed} members has an id");
                    return;
                }
                Some(group)
            }
            _ => None,
        };

        let Some(mut group) = group else {
            if let Some(previous) = self.conference.take() {
                debug!("Conference cleared ({} members dropped)", previous.len());
                let dropped: Vec<String> = previous.member_ids().map(str::to_string).collect();
                for call_id in &dropped {
                    self.calls.retain(|call| &call.id != call_id);
                }
            }
            self.merged.clear();
            self.repair_active();
            return;
        };

        let mut merged = Vec::with_capacity(group.len());
        for member in group.members.iter_mut() {
            let Some(call_id) = member.id.clone() else {
                continue;
            };

            let existing = match self.calls.iter().position(|call| call.id == call_id) {
                Some(index) => Some(self.calls.remove(index)),
                None => self
                    .merged
                    .iter()
                    .position(|call| call.id == call_id)
                    .map(|index| self.merged.remove(index)),
            };

            let mut call = existing.unwrap_or_else(|| {
                Call::new(
                    call_id.clone(),
                    String::new(),
                    CallState::Confirmed,
                    CallDirection::Outgoing,
                )
            });

            match member.number.as_deref().filter(|number| !number.is_empty()) {
                Some(number) => call.number = number.to_string(),
                None => member.number = Some(call.number.clone()),
            }
            // A state code this client cannot read never replaces a known one
            match &member.state {
                Some(state) if state.is_known() || !call.state.is_known() => {
                    call.state = state.clone();
                }
                _ => member.state = Some(call.state.clone()),
            }

            merged.push(call);
        }

        debug!(
            "Conference '{}' now has {} members",
            group.display_name(),
            group.len()
        );

        self.merged = merged;
        self.conference = Some(group);
        self.repair_active();
    }

    /// Drop one member from the conference snapshot. Returns whether it was
    /// a member.
    pub fn remove_from_conference(&mut self, call_id: &str) -> bool {
        let Some(group) = self.conference.as_mut() else {
            return false;
        };

        let before = group.len();
        group
            .members
            .retain(|member| member.id.as_deref() != Some(call_id));
        self.merged.retain(|call| call.id != call_id);

        if self.active_call_id.as_deref() == Some(call_id) {
            self.active_call_id = None;
        }

        group.len() != before
    }

    /// Demote the last member of a one-call conference back to a standalone
    /// active call, and clear an empty conference.
    ///
    /// Returns the id of the demoted call.
    pub fn collapse_conference_if_singular(&mut self) -> Option<String> {
        let size = self.conference.as_ref().map(ConferenceGroup::len)?;

        if size == 0 {
            self.conference = None;
            self.merged.clear();
            return None;
        }

        if size > 1 {
            return None;
        }

        let group = self.conference.take()?;
        let member = group.members.into_iter().next()?;
        let call_id = member.id.clone()?;

        let call = match self.merged.iter().position(|call| call.id == call_id) {
            Some(index) => self.merged.remove(index),
            None => demoted_call(&call_id, member),
        };
        self.merged.clear();

        debug!("Conference collapsed to single call {call_id}");

        if !self.is_standalone(&call_id) {
            self.calls.push(call);
        }
        self.active_call_id = Some(call_id.clone());

        Some(call_id)
    }

    /// First standalone call in insertion order other than `excluding`.
    pub fn pick_next_active(&self, excluding: Option<&str>) -> Option<String> {
        self.calls
            .iter()
            .find(|call| Some(call.id.as_str()) != excluding)
            .map(|call| call.id.clone())
    }

    /// Point the active id at something that still exists.
    pub fn repair_active(&mut self) -> Option<&str> {
        let dangling = self
            .active_call_id
            .as_deref()
            .is_none_or(|call_id| !self.contains(call_id));

        if dangling {
            self.active_call_id = self.pick_next_active(None).or_else(|| {
                self.conference
                    .as_ref()
                    .and_then(|group| group.member_ids().next().map(str::to_string))
            });
        }

        self.active_call_id.as_deref()
    }

    /// Back to the empty baseline.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.conference = None;
        self.merged.clear();
        self.active_call_id = None;
    }

    fn update_member(&mut self, call_id: &str, number: &str, state: &CallState) {
        let Some(group) = self.conference.as_mut() else {
            return;
        };

        if let Some(member) = group
            .members
            .iter_mut()
            .find(|member| member.id.as_deref() == Some(call_id))
        {
            member.state = Some(state.clone());
            if !number.is_empty() {
                member.number = Some(number.to_string());
            }
        }
    }
}

fn identified_members(mut group: ConferenceGroup) -> ConferenceGroup {
    let mut seen: Vec<String> = Vec::with_capacity(group.len());

    group.members.retain(|member| match member.id.as_deref() {
        None => {
            debug!("Dropping conference member without an id");
            false
        }
        Some(call_id) if seen.iter().any(|id| id == call_id) => {
            debug!("Dropping repeated conference member {call_id}");
            false
        }
        Some(call_id) => {
            seen.push(call_id.to_string());
            true
        }
    });

    group
}

fn apply_update(call: &mut Call, number: &str, state: CallState) {
    call.state = state;
    if !number.is_empty() {
        call.number = number.to_string();
    }
}

fn demoted_call(call_id: &str, member: ConferenceMember) -> Call {
    Call::new(
        call_id,
        member.number.unwrap_or_default(),
        member.state.unwrap_or(CallState::Confirmed),
        CallDirection::Outgoing,
    )
}
