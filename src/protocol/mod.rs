use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
mod tests;

/// Client → Server message types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SubscribeActivity { data: ActivityRef },
    UnsubscribeActivity { data: ActivityRef },
}

/// Channel reference carried by subscription frames
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRef {
    pub activity_id: String,
}

impl ClientMessage {
    pub fn subscribe(activity_id: impl Into<String>) -> Self {
        Self::SubscribeActivity {
            data: ActivityRef {
                activity_id: activity_id.into(),
            },
        }
    }

    pub fn unsubscribe(activity_id: impl Into<String>) -> Self {
        Self::UnsubscribeActivity {
            data: ActivityRef {
                activity_id: activity_id.into(),
            },
        }
    }
}

// Server → Client payload shapes. Frames arrive as JSON text with a `type`
// discriminant; the router matches on it and deserializes the matching
// struct below. Domain objects stay opaque `Value`s.

/// Server acknowledged a subscribe frame
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfirmed {
    pub activity_id: String,
}

/// The activity itself changed
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityUpdated {
    pub activity: Value,
}

/// A task under a subscribed activity changed
#[derive(Debug, Clone, Deserialize)]
pub struct TaskUpdated {
    pub task: Value,
    pub activity_id: String,
}

/// A milestone under a subscribed activity changed
#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneUpdated {
    pub milestone: Value,
    pub activity_id: String,
}

/// A checklist under a subscribed activity changed
#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistUpdated {
    pub checklist: Value,
    pub activity_id: String,
}

/// A comment was added under a subscribed activity
#[derive(Debug, Clone, Deserialize)]
pub struct CommentAdded {
    pub comment: Value,
    pub activity_id: String,
}

/// A time log entry under a subscribed activity changed
#[derive(Debug, Clone, Deserialize)]
pub struct TimeLogUpdated {
    pub time_log: Value,
    pub activity_id: String,
}
