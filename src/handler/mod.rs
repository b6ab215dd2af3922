use serde_json::Value;


/// Why the connection went away, as reported to `on_disconnected`
#[derive(Debug, Clone)]
pub struct DisconnectReason {
    /// WebSocket close code, when the peer sent a close frame
    pub code: Option<u16>,
    pub reason: String,
}

impl DisconnectReason {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            code: None,
            reason: reason.into(),
        }
    }

    pub fn with_code(reason: impl Into<String>, code: u16) -> Self {
        Self {
            code: Some(code),
            reason: reason.into(),
        }
    }
}

type LifecycleHandler = Box<dyn Fn() + Send + Sync>;
type DisconnectHandler = Box<dyn Fn(&DisconnectReason) + Send + Sync>;
type ErrorHandler = Box<dyn Fn(&str) + Send + Sync>;
type ChannelHandler = Box<dyn Fn(&str) + Send + Sync>;
type PayloadHandler = Box<dyn Fn(&Value) + Send + Sync>;
type SubEntityHandler = Box<dyn Fn(&Value, &str) + Send + Sync>;

/// Table of callbacks for connection lifecycle and server-pushed events.
///
/// Supplied once at client construction and immutable afterwards. Every
/// entry is optional; an event with no registered handler is silently
/// dropped. Sub-entity handlers receive the payload together with the
/// parent activity id.
#[derive(Default)]
pub struct EventHandlers {
    on_connected: Option<LifecycleHandler>,
    on_disconnected: Option<DisconnectHandler>,
    on_error: Option<ErrorHandler>,
    on_subscription_confirmed: Option<ChannelHandler>,
    on_activity_updated: Option<PayloadHandler>,
    on_task_updated: Option<SubEntityHandler>,
    on_milestone_updated: Option<SubEntityHandler>,
    on_checklist_updated: Option<SubEntityHandler>,
    on_comment_added: Option<SubEntityHandler>,
    on_time_log_updated: Option<SubEntityHandler>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connected(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_connected = Some(Box::new(f));
        self
    }

    pub fn on_disconnected(
        mut self,
        f: impl Fn(&DisconnectReason) + Send + Sync + 'static,
    ) -> Self {
        self.on_disconnected = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_subscription_confirmed(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_subscription_confirmed = Some(Box::new(f));
        self
    }

    pub fn on_activity_updated(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_activity_updated = Some(Box::new(f));
        self
    }

    pub fn on_task_updated(mut self, f: impl Fn(&Value, &str) + Send + Sync + 'static) -> Self {
        self.on_task_updated = Some(Box::new(f));
        self
    }

    pub fn on_milestone_updated(
        mut self,
        f: impl Fn(&Value, &str) + Send + Sync + 'static,
    ) -> Self {
        self.on_milestone_updated = Some(Box::new(f));
        self
    }

    pub fn on_checklist_updated(
        mut self,
        f: impl Fn(&Value, &str) + Send + Sync + 'static,
    ) -> Self {
        self.on_checklist_updated = Some(Box::new(f));
        self
    }

    pub fn on_comment_added(mut self, f: impl Fn(&Value, &str) + Send + Sync + 'static) -> Self {
        self.on_comment_added = Some(Box::new(f));
        self
    }

    pub fn on_time_log_updated(
        mut self,
        f: impl Fn(&Value, &str) + Send + Sync + 'static,
    ) -> Self {
        self.on_time_log_updated = Some(Box::new(f));
        self
    }

    // emit_* helpers: no-op when the handler is absent

    pub(crate) fn emit_connected(&self) {
        if let Some(f) = &self.on_connected {
            f();
        }
    }

    pub(crate) fn emit_disconnected(&self, reason: &DisconnectReason) {
        if let Some(f) = &self.on_disconnected {
            f(reason);
        }
    }

    pub(crate) fn emit_error(&self, message: &str) {
        if let Some(f) = &self.on_error {
            f(message);
        }
    }

    pub(crate) fn emit_subscription_confirmed(&self, activity_id: &str) {
        if let Some(f) = &self.on_subscription_confirmed {
            f(activity_id);
        }
    }

    pub(crate) fn emit_activity_updated(&self, activity: &Value) {
        if let Some(f) = &self.on_activity_updated {
            f(activity);
        }
    }

    pub(crate) fn emit_task_updated(&self, task: &Value, activity_id: &str) {
        if let Some(f) = &self.on_task_updated {
            f(task, activity_id);
        }
    }

    pub(crate) fn emit_milestone_updated(&self, milestone: &Value, activity_id: &str) {
        if let Some(f) = &self.on_milestone_updated {
            f(milestone, activity_id);
        }
    }

    pub(crate) fn emit_checklist_updated(&self, checklist: &Value, activity_id: &str) {
        if let Some(f) = &self.on_checklist_updated {
            f(checklist, activity_id);
        }
    }

    pub(crate) fn emit_comment_added(&self, comment: &Value, activity_id: &str) {
        if let Some(f) = &self.on_comment_added {
            f(comment, activity_id);
        }
    }

    pub(crate) fn emit_time_log_updated(&self, time_log: &Value, activity_id: &str) {
        if let Some(f) = &self.on_time_log_updated {
            f(time_log, activity_id);
        }
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_connected", &self.on_connected.is_some())
            .field("on_disconnected", &self.on_disconnected.is_some())
            .field("on_error", &self.on_error.is_some())
            .field(
                "on_subscription_confirmed",
                &self.on_subscription_confirmed.is_some(),
            )
            .field("on_activity_updated", &self.on_activity_updated.is_some())
            .field("on_task_updated", &self.on_task_updated.is_some())
            .field("on_milestone_updated", &self.on_milestone_updated.is_some())
            .field("on_checklist_updated", &self.on_checklist_updated.is_some())
            .field("on_comment_added", &self.on_comment_added.is_some())
            .field("on_time_log_updated", &self.on_time_log_updated.is_some())
            .finish()
    }
}
