//! Toast queue fed by server events.

use log::{debug, warn};
use serde::Deserialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How long a toast stays up unless dismissed.
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// Server events that produce a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    NewFeedback,
    NewClassFeedback,
    NewDietPlan,
    UpdateDietPlan,
    NewWorkoutPlan,
    UpdateWorkoutPlan,
}

const ALL_KINDS: &[NotificationKind] = &[
    NotificationKind::NewFeedback,
    NotificationKind::NewClassFeedback,
    NotificationKind::NewDietPlan,
    NotificationKind::UpdateDietPlan,
    NotificationKind::NewWorkoutPlan,
    NotificationKind::UpdateWorkoutPlan,
];

impl NotificationKind {
    /// Every event the client subscribes to.
    pub fn all() -> &'static [Self] {
        ALL_KINDS
    }

    /// Channel event name.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::NewFeedback => "new_feedback",
            Self::NewClassFeedback => "new_class_feedback",
            Self::NewDietPlan => "new_diet_plan",
            Self::UpdateDietPlan => "update_diet_plan",
            Self::NewWorkoutPlan => "new_workout_plan",
            Self::UpdateWorkoutPlan => "update_workout_plan",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.event_name() == name)
    }
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    label: Option<String>,
}

/// One visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    /// Optional `type` text sent by the server, shown under the message.
    pub label: Option<String>,
    pub posted_at: Instant,
}

impl Toast {
    pub fn expires_at(&self, ttl: Duration) -> Instant {
        self.posted_at + ttl
    }
}

/// Visible toasts in posting order.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    ttl: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::with_ttl(TOAST_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            ttl,
        }
    }

    /// Handles one channel event with an already-parsed JSON payload.
    ///
    /// Returns the new toast id, or `None` when the event is not one the
    /// client shows.
    pub fn push_event(
        &mut self,
        event_name: &str,
        payload: serde_json::Value,
        now: Instant,
    ) -> Option<Uuid> {
        let Some(kind) = NotificationKind::from_event_name(event_name) else {
            debug!("event=notify_receive module=notify status=ignored event_name={event_name}");
            return None;
        };
        let payload: EventPayload = match serde_json::from_value(payload) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    "event=notify_receive module=notify status=bad_payload event_name={event_name} error={err}"
                );
                return None;
            }
        };
        let message = payload.message.filter(|message| !message.trim().is_empty())?;
        Some(self.push(kind, message, payload.label, now))
    }

    /// Handles one channel event with a raw JSON payload.
    pub fn push_raw(&mut self, event_name: &str, payload: &str, now: Instant) -> Option<Uuid> {
        match serde_json::from_str(payload) {
            Ok(value) => self.push_event(event_name, value, now),
            Err(err) => {
                warn!(
                    "event=notify_receive module=notify status=bad_payload event_name={event_name} error={err}"
                );
                None
            }
        }
    }

    /// Posts a toast directly.
    pub fn push(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        label: Option<String>,
        now: Instant,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            label,
            posted_at: now,
        });
        id
    }

    /// Removes one toast. Returns whether it was still visible.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Drops every toast whose delay has elapsed at `now`.
    ///
    /// Returns how many were removed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.expires_at(ttl) > now);
        before - self.toasts.len()
    }

    /// Earliest pending expiry, for scheduling the next `expire` call.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.toasts
            .iter()
            .map(|toast| toast.expires_at(self.ttl))
            .min()
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
