// Unit tests for the presentation hub

use crate::session::{PresentationHub, Screen, UiUpdate, UpdateKind};

/// **VALUE**: Verifies that a filtered subscriber only sees the kinds it asked for.
///
/// **WHY THIS MATTERS**: A status bar that subscribes to status text must not have to
/// wade through every call update.
#[test]
fn given_filtered_subscription_when_updates_published_then_only_matching_delivered() {
    // GIVEN
    let hub = PresentationHub::new();
    let mut all = hub.subscribe();
    let mut status_only = hub.subscribe_to(&[UpdateKind::Status]);

    // WHEN
    hub.publish(UiUpdate::Screen(Screen::Call));
    hub.publish(UiUpdate::Status("Calling 555...".to_string()));

    // THEN
    assert_eq!(all.try_recv(), Some(UiUpdate::Screen(Screen::Call)));
    assert_eq!(
        all.try_recv(),
        Some(UiUpdate::Status("Calling 555...".to_string()))
    );
    assert_eq!(
        status_only.try_recv(),
        Some(UiUpdate::Status("Calling 555...".to_string()))
    );
    assert_eq!(status_only.try_recv(), None);
}

#[test]
fn given_no_subscribers_when_published_then_nothing_fails() {
    let hub = PresentationHub::new();

    hub.publish(UiUpdate::SessionReset);

    assert_eq!(hub.subscriber_count(), 0);
}

#[tokio::test]
async fn given_hub_dropped_when_receiving_then_none() {
    let hub = PresentationHub::new();
    let mut updates = hub.subscribe();
    hub.publish(UiUpdate::SessionReset);
    drop(hub);

    assert_eq!(updates.recv().await, Some(UiUpdate::SessionReset));
    assert_eq!(updates.recv().await, None);
}
