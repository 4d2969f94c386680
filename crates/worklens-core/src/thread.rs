//! Work thread model.
//!
//! A work thread groups related work items (emails, tasks, events, messages)
//! under a single title so the scoring engines can reason about the whole
//! strand of work instead of individual items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Coarse priority tier assigned to a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl PriorityTier {
    /// Parse a tier from its wire name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "low" => Ok(PriorityTier::Low),
            "medium" => Ok(PriorityTier::Medium),
            "high" => Ok(PriorityTier::High),
            other => Err(ValidationError::InvalidValue {
                field: "priority".to_string(),
                message: format!("unknown tier '{other}' (expected low, medium or high)"),
            }),
        }
    }

    /// Wire name of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::Low => "low",
            PriorityTier::Medium => "medium",
            PriorityTier::High => "high",
        }
    }
}

/// Lifecycle state of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

impl ThreadStatus {
    /// Parse a status from its wire name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "active" => Ok(ThreadStatus::Active),
            "completed" => Ok(ThreadStatus::Completed),
            "archived" => Ok(ThreadStatus::Archived),
            other => Err(ValidationError::InvalidValue {
                field: "status".to_string(),
                message: format!("unknown status '{other}'"),
            }),
        }
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStatus::Active => "active",
            ThreadStatus::Completed => "completed",
            ThreadStatus::Archived => "archived",
        }
    }
}

/// Progress values live on a 0..=100 percentage scale.
pub const MAX_PROGRESS: u8 = 100;

/// A strand of related work belonging to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkThread {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Optional one-paragraph summary of what the thread is about.
    pub summary: Option<String>,
    pub priority: PriorityTier,
    /// Completion estimate, 0..=100.
    pub progress: u8,
    pub status: ThreadStatus,
    /// True when the user has explicitly pushed this thread aside.
    pub is_ignored: bool,
    pub deadline: Option<DateTime<Utc>>,
    /// Number of work items attached to the thread.
    pub item_count: u32,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl WorkThread {
    /// Create a new active thread with default priority and no progress.
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            summary: None,
            priority: PriorityTier::default(),
            progress: 0,
            status: ThreadStatus::Active,
            is_ignored: false,
            deadline: None,
            item_count: 0,
            last_activity: now,
            created_at: now,
        }
    }

    /// Set the priority tier.
    pub fn with_priority(mut self, priority: PriorityTier) -> Self {
        self.priority = priority;
        self
    }

    /// Set the deadline.
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the completion estimate (clamped to 100).
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(MAX_PROGRESS);
        self
    }

    /// Mark the thread as pushed aside by the user.
    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.is_ignored = ignored;
        self
    }

    /// Set the summary text.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Update the completion estimate, rejecting values above 100.
    pub fn set_progress(&mut self, progress: u8) -> Result<(), ValidationError> {
        if progress > MAX_PROGRESS {
            return Err(ValidationError::OutOfRange {
                field: "progress".to_string(),
                value: progress as u32,
                max: MAX_PROGRESS as u32,
            });
        }
        self.progress = progress;
        Ok(())
    }

    /// Record that something happened on this thread just now.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_activity = at;
    }

    /// Whether the thread still counts as open work.
    pub fn is_open(&self) -> bool {
        self.status == ThreadStatus::Active
    }
}

/// What kind of work item landed in a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkItemKind {
    Email,
    #[default]
    Task,
    Event,
    Message,
}

impl WorkItemKind {
    /// Parse a kind from its wire name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "email" => Ok(WorkItemKind::Email),
            "task" => Ok(WorkItemKind::Task),
            "event" => Ok(WorkItemKind::Event),
            "message" => Ok(WorkItemKind::Message),
            other => Err(ValidationError::InvalidValue {
                field: "kind".to_string(),
                message: format!("unknown item kind '{other}'"),
            }),
        }
    }

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemKind::Email => "email",
            WorkItemKind::Task => "task",
            WorkItemKind::Event => "event",
            WorkItemKind::Message => "message",
        }
    }
}

/// A single piece of work captured into a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    pub thread_id: String,
    pub user_id: String,
    pub kind: WorkItemKind,
    pub title: String,
    pub received_at: DateTime<Utc>,
}

impl WorkItem {
    /// Create a new item attached to a thread.
    pub fn new(
        user_id: impl Into<String>,
        thread_id: impl Into<String>,
        kind: WorkItemKind,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            user_id: user_id.into(),
            kind,
            title: title.into(),
            received_at: Utc::now(),
        }
    }
}
