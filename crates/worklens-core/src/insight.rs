//! Insight detection.
//!
//! Two deterministic rules watch for threads the user is about to get
//! burned by: ignored work with a close deadline, and threads whose
//! progress pace cannot meet their deadline. A third, optional insight
//! comes back from the text generator and is parsed tolerantly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::load::{CognitiveLoad, LoadLevel};
use crate::priority::{days_since, days_until};
use crate::thread::WorkThread;

/// An ignored thread only raises an insight when its deadline is at most
/// this many days out.
pub const IGNORED_DEADLINE_DAYS: f64 = 3.0;

/// Required pace must exceed observed pace by this ratio before a thread
/// counts as at risk.
pub const RISK_MULTIPLIER: f64 = 1.5;

/// Threads at or beyond this progress are never flagged as at risk.
pub const RISK_PROGRESS_CUTOFF: u8 = 80;

/// How urgent an insight is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Parse a severity from its wire name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            other => Err(ValidationError::InvalidValue {
                field: "severity".to_string(),
                message: format!("unknown severity '{other}'"),
            }),
        }
    }

    /// Wire name of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// Which detector produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    IgnoredWork,
    DeadlineRisk,
    Overload,
    AiGenerated,
}

impl InsightKind {
    /// Parse a kind from its wire name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "ignored-work" => Ok(InsightKind::IgnoredWork),
            "deadline-risk" => Ok(InsightKind::DeadlineRisk),
            "overload" => Ok(InsightKind::Overload),
            "ai-generated" => Ok(InsightKind::AiGenerated),
            other => Err(ValidationError::InvalidValue {
                field: "kind".to_string(),
                message: format!("unknown insight kind '{other}'"),
            }),
        }
    }

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::IgnoredWork => "ignored-work",
            InsightKind::DeadlineRisk => "deadline-risk",
            InsightKind::Overload => "overload",
            InsightKind::AiGenerated => "ai-generated",
        }
    }
}

/// Something the system noticed about the user's work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub user_id: String,
    /// Thread the insight is about, when it concerns a single thread.
    pub thread_id: Option<String>,
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub detected_at: DateTime<Utc>,
}

impl Insight {
    /// Create an insight detected at `at`.
    pub fn new(
        user_id: impl Into<String>,
        kind: InsightKind,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            thread_id: None,
            kind,
            severity,
            title: title.into(),
            description: description.into(),
            detected_at: at,
        }
    }

    /// Attach the thread the insight is about.
    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }
}

/// Flag an ignored thread whose deadline is closing in.
pub fn ignored_work_insight(thread: &WorkThread, now: DateTime<Utc>) -> Option<Insight> {
    if !thread.is_ignored {
        return None;
    }
    let deadline = thread.deadline?;
    let days = days_until(deadline, now);
    if days > IGNORED_DEADLINE_DAYS {
        return None;
    }
    let severity = if days <= 1.0 {
        Severity::Critical
    } else {
        Severity::Warning
    };
    let description = if days <= 0.0 {
        format!("\"{}\" has been set aside and is now past due.", thread.title)
    } else {
        format!(
            "\"{}\" has been set aside but is due in about {} day(s).",
            thread.title,
            days.ceil() as i64
        )
    };
    Some(
        Insight::new(
            &thread.user_id,
            InsightKind::IgnoredWork,
            severity,
            "Ignored work is due soon",
            description,
            now,
        )
        .with_thread(&thread.id),
    )
}

/// Flag a thread whose observed pace cannot meet its deadline.
///
/// Observed pace is progress per day since creation; required pace is the
/// remaining progress spread over the days left. Both denominators clamp
/// at one day, so brand-new threads with no progress always read as
/// behind.
pub fn deadline_risk_insight(thread: &WorkThread, now: DateTime<Utc>) -> Option<Insight> {
    if thread.is_ignored {
        return None;
    }
    let deadline = thread.deadline?;
    if thread.progress >= RISK_PROGRESS_CUTOFF {
        return None;
    }

    let elapsed_days = days_since(thread.created_at, now).max(1.0);
    let remaining_days = days_until(deadline, now).max(1.0);
    let observed_pace = thread.progress as f64 / elapsed_days;
    let required_pace = (100.0 - thread.progress as f64) / remaining_days;

    if required_pace <= observed_pace * RISK_MULTIPLIER {
        return None;
    }

    Some(
        Insight::new(
            &thread.user_id,
            InsightKind::DeadlineRisk,
            Severity::Critical,
            "Thread at risk of missing its deadline",
            format!(
                "\"{}\" needs {:.1}% per day to finish on time but has averaged {:.1}%.",
                thread.title, required_pace, observed_pace
            ),
            now,
        )
        .with_thread(&thread.id),
    )
}

/// Run every per-thread rule against one thread.
pub fn scan_thread(thread: &WorkThread, now: DateTime<Utc>) -> Vec<Insight> {
    let mut insights = Vec::new();
    if let Some(insight) = ignored_work_insight(thread, now) {
        insights.push(insight);
    }
    if let Some(insight) = deadline_risk_insight(thread, now) {
        insights.push(insight);
    }
    insights
}

/// Run the per-thread rules across a set of threads.
pub fn scan_threads(threads: &[WorkThread], now: DateTime<Utc>) -> Vec<Insight> {
    threads
        .iter()
        .flat_map(|thread| scan_thread(thread, now))
        .collect()
}

/// Raise a notice when a load measurement lands in the upper bands.
pub fn overload_notice(load: &CognitiveLoad) -> Option<Insight> {
    let severity = match load.level {
        LoadLevel::High => Severity::Warning,
        LoadLevel::Critical => Severity::Critical,
        _ => return None,
    };
    Some(Insight::new(
        &load.user_id,
        InsightKind::Overload,
        severity,
        "Cognitive load is running high",
        format!(
            "Load score {:.1} from {} active threads and {} context switches in the last hour.",
            load.score, load.factors.active_threads, load.factors.switching_frequency
        ),
        load.timestamp,
    ))
}

/// Payload shape expected back from the text generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedInsight {
    pub title: String,
    pub description: String,
    /// Missing or unrecognized severity falls back to info.
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl GeneratedInsight {
    /// Promote the payload to a stored insight for `user_id`.
    pub fn into_insight(self, user_id: &str, at: DateTime<Utc>) -> Insight {
        Insight::new(
            user_id,
            InsightKind::AiGenerated,
            self.severity.unwrap_or(Severity::Info),
            self.title,
            self.description,
            at,
        )
    }
}
