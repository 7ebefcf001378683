//! Tests for components/config.rs

use std::time::Duration;

use local_notify::components::{NotificationConfig, NotificationError};

#[test]
fn test_defaults() {
    let config = NotificationConfig::default();
    assert_eq!(config.default_channel_id, "channel_0");
    assert_eq!(config.default_channel_name, "Default");
    assert_eq!(config.default_small_icon, "ic_launcher");
    assert_eq!(config.image_fetch_timeout, Duration::from_secs(30));
    assert_eq!(config.max_image_bytes, 10 * 1024 * 1024);
    assert!(config.user_agent.starts_with("local-notify/"));
    assert_eq!(config.store_path, None);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = NotificationConfig::from_json_str(
        r#"{ "app_name": "reminders", "store_path": "/var/lib/reminders/records.json" }"#,
    )
    .expect("config");

    assert_eq!(config.app_name, "reminders");
    assert_eq!(
        config.store_path.as_deref(),
        Some(std::path::Path::new("/var/lib/reminders/records.json"))
    );
    assert_eq!(config.default_channel_id, "channel_0");
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("notify.json");

    let written = NotificationConfig::new()
        .with_app_name("alarms")
        .with_default_channel("alarms", "Alarms")
        .with_max_image_bytes(1024);
    std::fs::write(&path, serde_json::to_string(&written).expect("serialize")).expect("write");

    assert_eq!(NotificationConfig::load(&path).expect("load"), written);

    let missing = NotificationConfig::load(dir.path().join("absent.json"));
    assert!(matches!(missing, Err(NotificationError::MalformedAttributes { .. })));
}
