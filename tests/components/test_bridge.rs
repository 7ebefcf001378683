//! Tests for components/bridge.rs

use local_notify::components::NotificationModule;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use crate::support::{Harness, NOW_MS, id};

fn module(h: &Harness) -> NotificationModule {
    NotificationModule::new(h.center.clone())
}

#[tokio::test]
async fn test_create_reflects_attributes_with_id() {
    let h = Harness::new();
    let module = module(&h);

    let reflected = assert_ok!(
        module
            .create_or_update(
                12,
                json!({
                    "subject": "Standup",
                    "scheduled": true,
                    "sendAt": (NOW_MS + 60_000).to_string(),
                    "repeatType": "day",
                    "payload": "{\"room\":4}"
                }),
            )
            .await
    );

    assert_eq!(reflected["id"], json!(12));
    assert_eq!(reflected["subject"], json!("Standup"));
    assert_eq!(reflected["sendAt"], json!(NOW_MS + 60_000));
    assert_eq!(reflected["autoClear"], json!(true));
    assert!(reflected.get("message").is_none());

    assert_eq!(assert_ok!(module.get_ids().await), vec![12]);
    assert_eq!(assert_ok!(module.find(12).await), reflected);
    assert!(h.timer.armed(id(12)).is_some());
}

#[tokio::test]
async fn test_errors_cross_as_messages() {
    let h = Harness::new();
    let module = module(&h);

    let missing = assert_err!(module.find(3).await);
    assert_eq!(missing, "Notification 3 not found");

    let malformed = assert_err!(module.create_or_update(3, json!({ "delayed": true })).await);
    assert!(malformed.contains("delay"), "{}", malformed);

    let wrong_type = assert_err!(module.create_or_update(3, json!({ "subject": 5 })).await);
    assert!(wrong_type.starts_with("Malformed attributes"), "{}", wrong_type);

    assert!(assert_ok!(module.get_ids().await).is_empty());
}

#[tokio::test]
async fn test_immediate_is_not_findable() {
    let h = Harness::new();
    let module = module(&h);

    let reflected = assert_ok!(module.create_or_update(1, json!({ "subject": "Now" })).await);
    assert_eq!(reflected["id"], json!(1));
    assert_eq!(h.renderer.shown_ids(), vec![id(1)]);
    assert!(assert_err!(module.find(1).await).contains("not found"));
}

#[tokio::test]
async fn test_delete_clear_and_bulk_calls() {
    let h = Harness::new();
    let module = module(&h);

    for raw in [1, 2, 3] {
        assert_ok!(
            module
                .create_or_update(raw, json!({ "subject": format!("n{}", raw), "delayed": true, "delay": 60000 }))
                .await
        );
    }

    let cleared = assert_ok!(module.clear(2).await);
    assert_eq!(cleared["subject"], json!("n2"));
    assert_eq!(assert_ok!(module.get_ids().await), vec![1, 2, 3]);

    let deleted = assert_ok!(module.delete(1).await);
    assert_eq!(deleted["subject"], json!("n1"));
    assert_eq!(assert_ok!(module.get_ids().await), vec![2, 3]);

    assert_ok!(module.clear_all().await);
    assert_eq!(h.renderer.dismiss_all_calls(), 1);
    assert_eq!(assert_ok!(module.get_ids().await), vec![2, 3]);

    h.store.stick(id(3));
    // Per-id failures are logged, the call itself succeeds
    assert_ok!(module.delete_all().await);
    assert_eq!(assert_ok!(module.get_ids().await), vec![3]);
}
