//! Activity log events.
//!
//! Every notable action -- a thread being created or updated, an item
//! arriving, the user switching between threads, a focus session -- lands
//! in the activity log. The cognitive load calculator reads a recent
//! window of this log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// What kind of event an activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    ThreadCreated,
    ThreadUpdated,
    ItemAdded,
    ContextSwitch,
    FocusSession,
}

impl ActivityKind {
    /// Parse a kind from its wire name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "thread-created" => Ok(ActivityKind::ThreadCreated),
            "thread-updated" => Ok(ActivityKind::ThreadUpdated),
            "item-added" => Ok(ActivityKind::ItemAdded),
            "context-switch" => Ok(ActivityKind::ContextSwitch),
            "focus-session" => Ok(ActivityKind::FocusSession),
            other => Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                message: format!("unknown activity type '{other}'"),
            }),
        }
    }

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::ThreadCreated => "thread-created",
            ActivityKind::ThreadUpdated => "thread-updated",
            ActivityKind::ItemAdded => "item-added",
            ActivityKind::ContextSwitch => "context-switch",
            ActivityKind::FocusSession => "focus-session",
        }
    }
}

/// One timestamped entry in a user's activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    /// Thread the event relates to, when there is one.
    pub thread_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    /// Record an event happening now.
    pub fn new(user_id: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            thread_id: None,
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Attach the thread the event relates to.
    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Override the timestamp (used when replaying or backfilling events).
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether this entry records a jump between threads.
    pub fn is_context_switch(&self) -> bool {
        self.kind == ActivityKind::ContextSwitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_activity_carries_kind_and_user() {
        let activity = Activity::new("u1", ActivityKind::ContextSwitch);
        assert_eq!(activity.user_id, "u1");
        assert_eq!(activity.kind, ActivityKind::ContextSwitch);
        assert!(activity.thread_id.is_none());
        assert!(activity.is_context_switch());
    }

    #[test]
    fn with_thread_attaches_thread_id() {
        let activity = Activity::new("u1", ActivityKind::ItemAdded).with_thread("t1");
        assert_eq!(activity.thread_id.as_deref(), Some("t1"));
    }

    #[test]
    fn kind_serializes_under_type_key() {
        let activity = Activity::new("u1", ActivityKind::FocusSession);
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["type"], "focus-session");
        assert!(value.get("kind").is_none());
        assert!(value.get("userId").is_some());
    }

    #[test]
    fn kind_parse_round_trips() {
        for kind in [
            ActivityKind::ThreadCreated,
            ActivityKind::ThreadUpdated,
            ActivityKind::ItemAdded,
            ActivityKind::ContextSwitch,
            ActivityKind::FocusSession,
        ] {
            assert_eq!(ActivityKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(ActivityKind::parse("email-sent").is_err());
    }
}
