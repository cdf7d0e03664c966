// Unit tests for the call registry

use crate::session::CallRegistry;

use models::{CallDirection, CallState, ConferenceGroup, ConferenceMember};

fn registry_with(call_ids: &[&str]) -> CallRegistry {
    let mut registry = CallRegistry::new();
    for call_id in call_ids {
        registry.upsert_call(
            call_id,
            &format!("num-{call_id}"),
            CallState::Confirmed,
            CallDirection::Outgoing,
        );
    }
    registry
}

fn group(call_ids: &[&str]) -> ConferenceGroup {
    ConferenceGroup::new(
        Some("Conference".to_string()),
        call_ids
            .iter()
            .map(|call_id| ConferenceMember {
                id: Some(call_id.to_string()),
                number: None,
                state: None,
            })
            .collect(),
    )
}

/// **VALUE**: Verifies that the next active call is the first remaining call in
/// insertion order.
///
/// **WHY THIS MATTERS**: When the active call ends, the user is moved to another call.
/// Picking by insertion order keeps that choice predictable.
///
/// **BUG THIS CATCHES**: Would catch if calls were kept in a map with unstable order.
#[test]
fn given_three_calls_when_next_active_excludes_first_then_second_chosen() {
    // GIVEN: Calls A, B, C
    let registry = registry_with(&["A", "B", "C"]);

    // WHEN / THEN
    assert_eq!(registry.pick_next_active(Some("A")), Some("B".to_string()));
    assert_eq!(registry.pick_next_active(Some("B")), Some("A".to_string()));
    assert_eq!(registry.pick_next_active(None), Some("A".to_string()));
}

#[test]
fn given_single_call_when_next_active_excludes_it_then_none() {
    let registry = registry_with(&["A"]);

    assert_eq!(registry.pick_next_active(Some("A")), None);
}

/// **VALUE**: Verifies that an update keeps a known number when the new one is empty.
///
/// **BUG THIS CATCHES**: Would catch if a state update without a number blanked the
/// caller shown on screen.
#[test]
fn given_known_call_when_upserted_with_empty_number_then_number_kept() {
    // GIVEN
    let mut registry = registry_with(&["1"]);

    // WHEN: State update without a number
    let call = registry
        .upsert_call("1", "", CallState::Early, CallDirection::Incoming)
        .clone();

    // THEN: State changed, number and direction kept
    assert_eq!(call.state, CallState::Early);
    assert_eq!(call.number, "num-1");
    assert_eq!(call.direction, CallDirection::Outgoing);
    assert_eq!(registry.calls().len(), 1);
}

/// **VALUE**: Verifies that removing the active call clears the active id.
#[test]
fn given_active_call_when_removed_then_active_cleared_and_removal_idempotent() {
    // GIVEN
    let mut registry = registry_with(&["1", "2"]);
    assert!(registry.set_active("1"));

    // WHEN
    let removed = registry.remove_call("1");
    let again = registry.remove_call("1");

    // THEN
    assert_eq!(removed.map(|call| call.id), Some("1".to_string()));
    assert!(again.is_none());
    assert_eq!(registry.active_call_id(), None);
    assert_eq!(registry.repair_active(), Some("2"));
}

#[test]
fn given_unknown_id_when_set_active_then_ignored() {
    let mut registry = registry_with(&["1"]);
    registry.set_active("1");

    assert!(!registry.set_active("nope"));
    assert_eq!(registry.active_call_id(), Some("1"));
}

/// **VALUE**: Verifies that conference members leave standalone tracking.
///
/// **WHY THIS MATTERS**: A call listed both standalone and in the conference is shown
/// twice, and ending it would only clean up one copy.
///
/// **BUG THIS CATCHES**: Would catch if `set_conference` forgot to move members.
#[test]
fn given_two_calls_when_conference_set_then_members_not_standalone() {
    // GIVEN
    let mut registry = registry_with(&["1", "2", "3"]);
    registry.set_active("1");

    // WHEN
    registry.set_conference(Some(group(&["1", "2"])));

    // THEN: Only 3 is standalone, members keep their records
    let standalone: Vec<_> = registry.calls().iter().map(|call| call.id.as_str()).collect();
    assert_eq!(standalone, vec!["3"]);
    assert!(registry.is_conference_member("1"));
    assert!(!registry.is_standalone("1"));
    assert_eq!(registry.get("2").map(|call| call.number.as_str()), Some("num-2"));
    assert_eq!(registry.active_call_id(), Some("1"));

    // THEN: Member details filled from the call records
    let conference = registry.conference().expect("conference should exist");
    assert_eq!(conference.members[0].number.as_deref(), Some("num-1"));
    assert_eq!(conference.members[0].state, Some(CallState::Confirmed));
}

/// **VALUE**: Verifies that an empty conference snapshot removes the conference.
///
/// **BUG THIS CATCHES**: Would catch if `calls: []` left an empty group behind, which
/// would keep the conference panel visible.
#[test]
fn given_conference_when_empty_snapshot_set_then_conference_cleared() {
    // GIVEN
    let mut registry = registry_with(&["1", "2", "3"]);
    registry.set_conference(Some(group(&["1", "2"])));

    // WHEN
    registry.set_conference(Some(group(&[])));

    // THEN: Conference and its members gone, the standalone call stays
    assert!(registry.conference().is_none());
    assert!(!registry.contains("1"));
    assert_eq!(registry.calls().len(), 1);
    assert_eq!(registry.active_call_id(), Some("3"));
}

/// **VALUE**: Verifies that a one-member conference is demoted to a standalone call.
///
/// **WHY THIS MATTERS**: A conference of one is just a call. The remaining party must
/// stay controllable as the active call.
///
/// **BUG THIS CATCHES**: Would catch if the last member vanished with the conference.
#[test]
fn given_conference_of_two_when_member_removed_then_collapses_to_standalone() {
    // GIVEN
    let mut registry = registry_with(&["1", "2"]);
    registry.set_conference(Some(group(&["1", "2"])));

    // WHEN
    assert!(registry.remove_from_conference("1"));
    let demoted = registry.collapse_conference_if_singular();

    // THEN
    assert_eq!(demoted, Some("2".to_string()));
    assert!(registry.conference().is_none());
    assert!(registry.is_standalone("2"));
    assert_eq!(registry.active_call_id(), Some("2"));
    assert_eq!(registry.get("2").map(|call| call.number.as_str()), Some("num-2"));
}

#[test]
fn given_conference_of_three_when_collapse_checked_then_unchanged() {
    let mut registry = registry_with(&["1", "2", "3"]);
    registry.set_conference(Some(group(&["1", "2", "3"])));
    registry.remove_from_conference("3");

    assert_eq!(registry.collapse_conference_if_singular(), None);
    assert_eq!(registry.conference().map(ConferenceGroup::len), Some(2));
}

/// **VALUE**: Verifies that state updates for a member stay inside the conference.
#[test]
fn given_member_when_upserted_then_updated_in_place() {
    // GIVEN
    let mut registry = registry_with(&["1", "2"]);
    registry.set_conference(Some(group(&["1", "2"])));

    // WHEN
    registry.upsert_call("1", "999", CallState::Connecting, CallDirection::Outgoing);

    // THEN
    assert!(registry.calls().is_empty());
    assert_eq!(registry.get("1").map(|call| call.number.as_str()), Some("999"));
    let member = &registry.conference().expect("conference").members[0];
    assert_eq!(member.state, Some(CallState::Connecting));
    assert_eq!(member.number.as_deref(), Some("999"));
}

#[test]
fn given_populated_registry_when_cleared_then_empty() {
    let mut registry = registry_with(&["1", "2", "3"]);
    registry.set_conference(Some(group(&["1", "2"])));
    registry.set_active("3");

    registry.clear();

    assert!(registry.is_empty());
    assert_eq!(registry.active_call_id(), None);
    assert!(registry.get("1").is_none());
}

/// **VALUE**: Verifies that a snapshot listing the same call twice is stored with one
/// member, so the conference collapses to that call.
///
/// **WHY THIS MATTERS**: A two-member group built from one call never collapses, so the
/// user would be stuck on a conference panel with a single party.
///
/// **BUG THIS CATCHES**: Would catch if repeated member ids were counted towards the size.
#[test]
fn given_snapshot_with_repeated_id_when_set_then_collapses_to_single_call() {
    // GIVEN
    let mut registry = registry_with(&["a"]);

    // WHEN
    registry.set_conference(Some(group(&["a", "a"])));

    // THEN: One member, which then demotes back to a standalone call
    assert_eq!(registry.conference().map(ConferenceGroup::len), Some(1));
    assert_eq!(registry.collapse_conference_if_singular(), Some("a".to_string()));
    let standalone: Vec<_> = registry.calls().iter().map(|call| call.id.as_str()).collect();
    assert_eq!(standalone, vec!["a"]);
}

/// **VALUE**: Verifies that members without an id never enter the conference.
///
/// **WHY THIS MATTERS**: An id-less member can never be removed by `call_ended`, so the
/// registry would never become empty again and the session never reset.
///
/// **BUG THIS CATCHES**: Would catch if id-less members counted towards the group.
#[test]
fn given_snapshot_mixing_id_less_members_when_set_then_only_identified_kept() {
    // GIVEN
    let mut registry = registry_with(&["1", "2", "3"]);
    let mut snapshot = group(&["1", "2"]);
    snapshot.members.push(ConferenceMember {
        id: None,
        number: Some("sip:9@host".to_string()),
        state: None,
    });

    // WHEN
    registry.set_conference(Some(snapshot));

    // THEN
    let conference = registry.conference().expect("conference should exist");
    assert_eq!(conference.len(), 2);
    assert_eq!(conference.member_ids().collect::<Vec<_>>(), vec!["1", "2"]);
}

/// **VALUE**: Verifies that a snapshot in which no member has an id changes nothing.
#[test]
fn given_snapshot_without_ids_when_set_then_registry_unchanged() {
    // GIVEN
    let mut registry = registry_with(&["a", "b"]);
    let anonymous = ConferenceGroup::new(
        None,
        vec![
            ConferenceMember {
                id: None,
                number: Some("sip:a@host".to_string()),
                state: Some(CallState::Confirmed),
            },
            ConferenceMember {
                id: None,
                number: Some("sip:b@host".to_string()),
                state: Some(CallState::Confirmed),
            },
        ],
    );

    // WHEN
    registry.set_conference(Some(anonymous));

    // THEN: Still two standalone calls and no conference
    assert!(registry.conference().is_none());
    assert_eq!(registry.calls().len(), 2);

    // WHEN: Both calls end
    registry.remove_call("a");
    registry.remove_call("b");

    // THEN: Back to the empty baseline
    assert!(registry.is_empty());
}

/// **VALUE**: Verifies that an unreadable member state keeps the call's known state.
///
/// **BUG THIS CATCHES**: Would catch if `Other` text from a snapshot replaced
/// `Confirmed`, leaving a demoted call in a state nothing recognises.
#[test]
fn given_known_state_when_snapshot_state_unknown_then_known_state_kept() {
    // GIVEN
    let mut registry = registry_with(&["1", "2"]);
    let mut snapshot = group(&["1", "2"]);
    snapshot.members[0].state = Some(CallState::Other("0".to_string()));

    // WHEN
    registry.set_conference(Some(snapshot));

    // THEN
    assert_eq!(registry.get("1").map(|call| call.state.clone()), Some(CallState::Confirmed));
    let member = &registry.conference().expect("conference").members[0];
    assert_eq!(member.state, Some(CallState::Confirmed));
}
