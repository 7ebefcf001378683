//! Tests for components/attributes.rs and components/serde_millis.rs

use std::time::Duration;

use local_notify::components::{
    InboxStyle, NotificationAttributes, NotificationError, RepeatType, TimingMode,
};
use serde_json::json;

#[test]
fn test_auto_clear_defaults_to_true() {
    let attributes = NotificationAttributes::from_json_value(json!({ "subject": "Hi" }))
        .expect("minimal attributes");
    assert!(attributes.auto_clear);
    assert!(NotificationAttributes::default().auto_clear);

    let attributes = NotificationAttributes::from_json_value(json!({ "autoClear": false }))
        .expect("autoClear false");
    assert!(!attributes.auto_clear);
}

#[test]
fn test_absent_fields_stay_absent() {
    let attributes = NotificationAttributes::new("Subject", "Message");
    let value = attributes.to_json_value().expect("serialize");

    assert_eq!(
        value,
        json!({ "subject": "Subject", "message": "Message", "autoClear": true })
    );
}

#[test]
fn test_wire_names() {
    let attributes = NotificationAttributes::from_json_value(json!({
        "channelID": "alerts",
        "channelName": "Alerts",
        "bigStyleUrlImage": "https://example.com/a.png",
        "sendAtHour": 9,
        "inboxStyle": { "bigContentTitle": "Inbox", "lines": ["a", "b"] }
    }))
    .expect("wire names");

    assert_eq!(attributes.channel_id.as_deref(), Some("alerts"));
    assert_eq!(attributes.channel_name.as_deref(), Some("Alerts"));
    assert_eq!(attributes.big_style_url_image.as_deref(), Some("https://example.com/a.png"));
    assert_eq!(attributes.send_at_hour, Some(9));
    assert_eq!(
        attributes.inbox_style,
        Some(InboxStyle {
            big_content_title: Some("Inbox".to_string()),
            summary_text: None,
            lines: Some(vec!["a".to_string(), "b".to_string()]),
        })
    );

    let value = attributes.to_json_value().expect("serialize");
    assert_eq!(value["channelID"], json!("alerts"));
    assert_eq!(value["inboxStyle"]["bigContentTitle"], json!("Inbox"));
}

#[test]
fn test_millis_accept_string_or_number() {
    let from_string = NotificationAttributes::from_json_value(json!({
        "scheduled": true,
        "sendAt": "1767225600000",
        "when": 1767225600001i64
    }))
    .expect("string millis");
    assert_eq!(from_string.send_at, Some(1_767_225_600_000));
    assert_eq!(from_string.when, Some(1_767_225_600_001));

    // Reflected as numbers
    let value = from_string.to_json_value().expect("serialize");
    assert_eq!(value["sendAt"], json!(1_767_225_600_000i64));

    let bad = NotificationAttributes::from_json_value(json!({ "sendAt": "tomorrow" }));
    assert!(matches!(bad, Err(NotificationError::MalformedAttributes { .. })));
}

#[test]
fn test_record_round_trip_preserves_everything() {
    let attributes = NotificationAttributes::new("Subject", "Message")
        .scheduled_at(1_767_225_600_000)
        .with_repeat("fortnight")
        .with_action("open")
        .with_payload("{\"k\":1}")
        .with_inbox_style(InboxStyle::default());

    let record = serde_json::to_string(&attributes).expect("serialize");
    let restored: NotificationAttributes = serde_json::from_str(&record).expect("deserialize");

    assert_eq!(restored, attributes);
    // Unrecognized repeat types survive persistence verbatim
    assert_eq!(restored.repeat_type.as_deref(), Some("fortnight"));
}

#[test]
fn test_timing_immediate_by_default() {
    let attributes = NotificationAttributes::new("Now", "Right now");
    assert_eq!(attributes.timing(), Ok(TimingMode::Immediate));
    assert!(!attributes.is_pending());
}

#[test]
fn test_timing_delayed_wins_over_scheduled() {
    let attributes = NotificationAttributes::new("Both", "")
        .scheduled_at(1_767_225_600_000)
        .with_delay(1500);

    assert_eq!(
        attributes.timing(),
        Ok(TimingMode::Delayed {
            delay: Duration::from_millis(1500)
        })
    );
}

#[test]
fn test_timing_negative_delay_fires_immediately() {
    let attributes = NotificationAttributes::new("Late", "").with_delay(-10);
    assert_eq!(
        attributes.timing(),
        Ok(TimingMode::Delayed { delay: Duration::ZERO })
    );
}

#[test]
fn test_timing_scheduled_with_repeat() {
    let attributes = NotificationAttributes::new("Hourly", "")
        .scheduled_at(1_767_225_600_000)
        .with_repeat("hour");

    assert_eq!(
        attributes.timing(),
        Ok(TimingMode::Scheduled {
            send_at: 1_767_225_600_000,
            repeat: Some(RepeatType::Hour),
        })
    );
}

#[test]
fn test_timing_rejects_missing_fields() {
    let mut delayed = NotificationAttributes::new("Delayed", "");
    delayed.delayed = Some(true);
    assert!(matches!(
        delayed.timing(),
        Err(NotificationError::MalformedAttributes { ref field, .. }) if field == "delay"
    ));

    let mut scheduled = NotificationAttributes::new("Scheduled", "");
    scheduled.scheduled = Some(true);
    assert!(matches!(
        scheduled.timing(),
        Err(NotificationError::MalformedAttributes { ref field, .. }) if field == "sendAt"
    ));

    let custom = NotificationAttributes::new("Custom", "")
        .scheduled_at(1_767_225_600_000)
        .with_repeat("time");
    assert!(matches!(
        custom.timing(),
        Err(NotificationError::MalformedAttributes { ref field, .. }) if field == "repeatTime"
    ));
}
