//! Tests for components/registry.rs and components/notification.rs

use std::time::Duration;

use local_notify::components::{
    AlarmSchedule, NotificationAttributes, NotificationError,
};
use tokio_test::{assert_err, assert_ok};

use crate::support::{Harness, NOW_MS, id};

#[tokio::test]
async fn test_immediate_shows_without_persisting() {
    let h = Harness::new();

    let notification = assert_ok!(
        h.registry()
            .create_or_update(id(1), NotificationAttributes::new("Now", "Shown right away"))
            .await
    );

    assert_eq!(notification.attributes().id, Some(1));
    assert_eq!(h.renderer.shown_ids(), vec![id(1)]);
    assert!(h.timer.armed_ids().is_empty());
    assert!(assert_ok!(h.registry().ids()).is_empty());
    assert!(assert_err!(h.registry().find(id(1)).await).is_not_found());
}

#[tokio::test]
async fn test_immediate_render_failure_is_not_an_error() {
    let h = Harness::new();
    h.renderer.fail_show(true);

    assert_ok!(
        h.registry()
            .create_or_update(id(1), NotificationAttributes::new("Now", ""))
            .await
    );
    assert!(h.renderer.shown().is_empty());
}

#[tokio::test]
async fn test_delayed_arms_and_persists() {
    let h = Harness::new();
    h.clock.advance(Duration::from_secs(30));

    let attributes = NotificationAttributes::new("Later", "In five seconds").with_delay(5000);
    assert_ok!(h.registry().create_or_update(id(3), attributes.clone()).await);

    assert_eq!(
        h.timer.armed(id(3)),
        Some(AlarmSchedule::Elapsed {
            at: Duration::from_secs(35)
        })
    );
    assert!(h.renderer.shown().is_empty());
    assert_eq!(assert_ok!(h.registry().ids()), vec![id(3)]);

    let found = assert_ok!(h.registry().find(id(3)).await);
    assert_eq!(found.attributes(), &attributes.with_id(id(3)));
}

#[tokio::test]
async fn test_scheduled_repeat_arms_repeating_timer() {
    let h = Harness::new();
    let attributes = NotificationAttributes::new("Hourly", "")
        .scheduled_at(NOW_MS + 60_000)
        .with_repeat("hour");

    assert_ok!(h.registry().create_or_update(id(4), attributes).await);

    assert_eq!(
        h.timer.armed(id(4)),
        Some(AlarmSchedule::Repeating {
            first_ms: NOW_MS + 60_000,
            interval: Duration::from_millis(3_600_000),
        })
    );
}

#[tokio::test]
async fn test_update_replaces_schedule_and_record() {
    let h = Harness::new();
    let first = NotificationAttributes::new("A", "first")
        .scheduled_at(NOW_MS + 60_000)
        .with_repeat("day");
    let second = NotificationAttributes::new("B", "second").scheduled_at(NOW_MS + 120_000);

    assert_ok!(h.registry().create_or_update(id(9), first).await);
    let updated = assert_ok!(h.registry().create_or_update(id(9), second).await);

    assert_eq!(updated.attributes().subject.as_deref(), Some("B"));
    assert_eq!(
        h.timer.armed(id(9)),
        Some(AlarmSchedule::Exact { at_ms: NOW_MS + 120_000 })
    );
    assert!(h.timer.cancel_calls().contains(&id(9)));

    let found = assert_ok!(h.registry().find(id(9)).await);
    assert_eq!(found.attributes().subject.as_deref(), Some("B"));
    assert_eq!(found.attributes().repeat_type, None);
    assert_eq!(assert_ok!(h.registry().ids()), vec![id(9)]);
}

#[tokio::test]
async fn test_update_to_immediate_drops_record() {
    let h = Harness::new();
    assert_ok!(
        h.registry()
            .create_or_update(id(2), NotificationAttributes::new("Later", "").with_delay(60_000))
            .await
    );

    assert_ok!(
        h.registry()
            .create_or_update(id(2), NotificationAttributes::new("Now", ""))
            .await
    );

    assert!(h.timer.armed(id(2)).is_none());
    assert!(assert_ok!(h.registry().ids()).is_empty());
    assert_eq!(h.renderer.shown_ids(), vec![id(2)]);
}

#[tokio::test]
async fn test_rejected_update_keeps_previous_state() {
    let h = Harness::new();
    assert_ok!(
        h.registry()
            .create_or_update(id(6), NotificationAttributes::new("Keep", "").with_delay(60_000))
            .await
    );

    let mut invalid = NotificationAttributes::new("Broken", "");
    invalid.scheduled = Some(true);
    let err = assert_err!(h.registry().create_or_update(id(6), invalid).await);

    assert!(matches!(err, NotificationError::MalformedAttributes { .. }));
    assert!(h.timer.armed(id(6)).is_some());
    let kept = assert_ok!(h.registry().find(id(6)).await);
    assert_eq!(kept.attributes().subject.as_deref(), Some("Keep"));
}

#[tokio::test]
async fn test_timer_failure_leaves_no_record() {
    let h = Harness::new();
    h.timer.refuse_arming(true);

    let err = assert_err!(
        h.registry()
            .create_or_update(id(8), NotificationAttributes::new("Later", "").with_delay(1000))
            .await
    );

    assert!(matches!(err, NotificationError::TimerFailure { .. }));
    assert!(assert_ok!(h.registry().ids()).is_empty());
}

#[tokio::test]
async fn test_corrupt_record_is_replaced() {
    let h = Harness::new();
    h.store.put_raw("11", "{ not json");

    let notification = assert_ok!(
        h.registry()
            .create_or_update(id(11), NotificationAttributes::new("Fresh", "").with_delay(1000))
            .await
    );

    assert_eq!(notification.attributes().subject.as_deref(), Some("Fresh"));
    let found = assert_ok!(h.registry().find(id(11)).await);
    assert_eq!(found.attributes().subject.as_deref(), Some("Fresh"));
}

#[tokio::test]
async fn test_delete_returns_previous_and_is_final() {
    let h = Harness::new();
    assert_ok!(
        h.registry()
            .create_or_update(id(5), NotificationAttributes::new("Bye", "").with_delay(1000))
            .await
    );

    let deleted = assert_ok!(h.registry().delete(id(5)).await);
    assert_eq!(deleted.attributes().subject.as_deref(), Some("Bye"));
    assert!(h.timer.armed(id(5)).is_none());
    assert!(h.renderer.dismissed().contains(&id(5)));

    let again = assert_err!(h.registry().delete(id(5)).await);
    assert!(again.is_not_found());
    assert!(assert_err!(h.registry().find(id(5)).await).is_not_found());
}

#[tokio::test]
async fn test_clear_keeps_schedule() {
    let h = Harness::new();
    assert_ok!(
        h.registry()
            .create_or_update(
                id(3),
                NotificationAttributes::new("Daily", "")
                    .scheduled_at(NOW_MS)
                    .with_repeat("day"),
            )
            .await
    );

    let cleared = assert_ok!(h.registry().clear(id(3)).await);
    assert_eq!(cleared.id(), id(3));
    assert_eq!(h.renderer.dismissed(), vec![id(3)]);
    assert!(h.timer.armed(id(3)).is_some());
    assert_eq!(assert_ok!(h.registry().ids()), vec![id(3)]);

    assert!(assert_err!(h.registry().clear(id(99)).await).is_not_found());
}

#[tokio::test]
async fn test_clear_all_keeps_records() {
    let h = Harness::new();
    for raw in [1, 2] {
        assert_ok!(
            h.registry()
                .create_or_update(id(raw), NotificationAttributes::new("Later", "").with_delay(1000))
                .await
        );
    }

    assert_ok!(h.registry().clear_all().await);

    assert_eq!(h.renderer.dismiss_all_calls(), 1);
    assert_eq!(assert_ok!(h.registry().ids()), vec![id(1), id(2)]);
    assert_eq!(h.timer.armed_ids(), vec![id(1), id(2)]);
}

#[tokio::test]
async fn test_delete_all_is_best_effort() {
    let h = Harness::new();
    for raw in [1, 2, 3] {
        assert_ok!(
            h.registry()
                .create_or_update(id(raw), NotificationAttributes::new("Later", "").with_delay(1000))
                .await
        );
    }
    h.store.stick(id(2));

    let report = assert_ok!(h.registry().delete_all().await);

    assert!(!report.is_clean());
    assert_eq!(report.succeeded, vec![id(1), id(3)]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, id(2));
    assert!(matches!(report.failed[0].1, NotificationError::StoreFailure { .. }));
    assert_eq!(assert_ok!(h.registry().ids()), vec![id(2)]);
}

#[tokio::test]
async fn test_delete_unreadable_record() {
    let h = Harness::new();
    h.store.put_raw("4", "{ not json");

    let deleted = assert_ok!(h.registry().delete(id(4)).await);

    assert_eq!(deleted.id(), id(4));
    assert_eq!(deleted.attributes().subject, None);
    assert!(h.timer.cancel_calls().contains(&id(4)));
    assert!(h.renderer.dismissed().contains(&id(4)));
    assert!(assert_ok!(h.registry().ids()).is_empty());
    assert!(assert_err!(h.registry().find(id(4)).await).is_not_found());
}

#[tokio::test]
async fn test_delete_all_removes_unreadable_records() {
    let h = Harness::new();
    for raw in [1, 3] {
        assert_ok!(
            h.registry()
                .create_or_update(id(raw), NotificationAttributes::new("Later", "").with_delay(1000))
                .await
        );
    }
    h.store.put_raw("2", "{ not json");

    let report = assert_ok!(h.registry().delete_all().await);

    assert!(report.is_clean());
    assert_eq!(report.succeeded, vec![id(1), id(2), id(3)]);
    assert!(assert_ok!(h.registry().ids()).is_empty());
    assert!(h.timer.armed_ids().is_empty());
}

#[tokio::test]
async fn test_lock_entries_released_after_work() {
    let h = Harness::new();

    for raw in 0..200 {
        assert!(assert_err!(h.registry().find(id(raw)).await).is_not_found());
        assert_ok!(
            h.registry()
                .create_or_update(id(1000 + raw), NotificationAttributes::new("Now", ""))
                .await
        );
    }
    assert_eq!(h.registry().locked_ids(), 0);

    // Contended id: the entry survives while a waiter holds it, then goes away
    let delayed = || NotificationAttributes::new("Later", "").with_delay(1000);
    let (first, second) = tokio::join!(
        h.registry().create_or_update(id(7), delayed()),
        h.registry().create_or_update(id(7), delayed()),
    );
    assert_ok!(first);
    assert_ok!(second);
    assert_eq!(h.registry().locked_ids(), 0);
    assert_eq!(assert_ok!(h.registry().ids()), vec![id(7)]);
}
