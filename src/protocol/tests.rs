use super::*;
use serde_json::json;

#[test]
fn test_subscribe_frame_shape() {
    let msg = ClientMessage::subscribe("act-42");
    let frame: Value = serde_json::to_value(&msg).unwrap();

    assert_eq!(
        frame,
        json!({
            "type": "subscribe_activity",
            "data": { "activity_id": "act-42" }
        })
    );
}

#[test]
fn test_unsubscribe_frame_shape() {
    let msg = ClientMessage::unsubscribe("act-42");
    let frame: Value = serde_json::to_value(&msg).unwrap();

    assert_eq!(
        frame,
        json!({
            "type": "unsubscribe_activity",
            "data": { "activity_id": "act-42" }
        })
    );
}

#[test]
fn test_task_updated_deserializes_from_full_frame() {
    // The `type` field is still present when the router hands the frame over
    let frame = json!({
        "type": "task_updated",
        "task": { "id": 7, "status": "done" },
        "activity_id": "act-1"
    });

    let msg: TaskUpdated = serde_json::from_value(frame).unwrap();
    assert_eq!(msg.activity_id, "act-1");
    assert_eq!(msg.task["status"], "done");
}

#[test]
fn test_subscription_confirmed_requires_activity_id() {
    let frame = json!({ "type": "subscription_confirmed" });
    assert!(serde_json::from_value::<SubscriptionConfirmed>(frame).is_err());

    let frame = json!({ "type": "subscription_confirmed", "activity_id": "act-9" });
    let msg: SubscriptionConfirmed = serde_json::from_value(frame).unwrap();
    assert_eq!(msg.activity_id, "act-9");
}

#[test]
fn test_sub_entity_payloads_carry_parent_id() {
    let comment = json!({
        "type": "comment_added",
        "comment": { "body": "looks good" },
        "activity_id": "act-3"
    });
    let msg: CommentAdded = serde_json::from_value(comment).unwrap();
    assert_eq!(msg.activity_id, "act-3");

    let time_log = json!({
        "type": "time_log_updated",
        "time_log": { "minutes": 90 },
        "activity_id": "act-3"
    });
    let msg: TimeLogUpdated = serde_json::from_value(time_log).unwrap();
    assert_eq!(msg.activity_id, "act-3");
    assert_eq!(msg.time_log["minutes"], 90);
}
