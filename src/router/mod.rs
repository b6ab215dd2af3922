use crate::handler::EventHandlers;
use crate::protocol::{
    ActivityUpdated, ChecklistUpdated, CommentAdded, MilestoneUpdated, SubscriptionConfirmed,
    TaskUpdated, TimeLogUpdated,
};
use serde_json::Value;
use tracing::{debug, warn};


/// Decode one inbound text frame and dispatch it to the matching handler.
///
/// This function never propagates an error into the read loop: a frame that
/// is not valid JSON, lacks a `type` field, or has a payload that does not
/// match its kind is logged and dropped; an unrecognized kind is logged at
/// debug and dropped so server-added message kinds do not break the client.
pub fn dispatch(text: &str, handlers: &EventHandlers) {
    let frame: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Dropping malformed frame");
            return;
        }
    };

    let kind = match frame.get("type").and_then(Value::as_str) {
        Some(k) => k.to_string(),
        None => {
            warn!("Dropping frame without a type field");
            return;
        }
    };

    match kind.as_str() {
        "subscription_confirmed" => {
            if let Some(msg) = decode::<SubscriptionConfirmed>(&kind, frame) {
                handlers.emit_subscription_confirmed(&msg.activity_id);
            }
        }
        "activity_updated" => {
            if let Some(msg) = decode::<ActivityUpdated>(&kind, frame) {
                handlers.emit_activity_updated(&msg.activity);
            }
        }
        "task_updated" => {
            if let Some(msg) = decode::<TaskUpdated>(&kind, frame) {
                handlers.emit_task_updated(&msg.task, &msg.activity_id);
            }
        }
        "milestone_updated" => {
            if let Some(msg) = decode::<MilestoneUpdated>(&kind, frame) {
                handlers.emit_milestone_updated(&msg.milestone, &msg.activity_id);
            }
        }
        "checklist_updated" => {
            if let Some(msg) = decode::<ChecklistUpdated>(&kind, frame) {
                handlers.emit_checklist_updated(&msg.checklist, &msg.activity_id);
            }
        }
        "comment_added" => {
            if let Some(msg) = decode::<CommentAdded>(&kind, frame) {
                handlers.emit_comment_added(&msg.comment, &msg.activity_id);
            }
        }
        "time_log_updated" => {
            if let Some(msg) = decode::<TimeLogUpdated>(&kind, frame) {
                handlers.emit_time_log_updated(&msg.time_log, &msg.activity_id);
            }
        }
        other => {
            debug!(kind = %other, "Ignoring unrecognized message kind");
        }
    }
}

/// Deserialize the typed payload for a recognized kind; log and drop on shape mismatch
fn decode<T: serde::de::DeserializeOwned>(kind: &str, frame: Value) -> Option<T> {
    match serde_json::from_value(frame) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!(kind = %kind, error = %e, "Dropping frame with unexpected payload shape");
            None
        }
    }
}
