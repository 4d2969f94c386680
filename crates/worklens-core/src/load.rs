//! Cognitive load calculation.
//!
//! Estimates how loaded a user currently is from four observable factors:
//! how many threads are open, how often they switched between threads in
//! the last hour, how long they have been working today, and how many
//! deadlines loom in the coming week. Each factor contributes a capped
//! share of a 0-100 score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::Activity;
use crate::error::ValidationError;
use crate::thread::WorkThread;

/// Recent-activity window the calculator looks at, in hours.
pub const ACTIVITY_WINDOW_HOURS: i64 = 1;

/// How far ahead a deadline counts as pending, in days.
pub const DEADLINE_LOOKAHEAD_DAYS: i64 = 7;

/// Points per open thread, capped at 30 total.
const ACTIVE_THREAD_RATE: f64 = 5.0;
const ACTIVE_THREAD_CAP: f64 = 30.0;

/// Points per context switch in the window, capped at 30 total.
const SWITCH_RATE: f64 = 3.0;
const SWITCH_CAP: f64 = 30.0;

/// Points per hour worked today, capped at 20 total.
const DURATION_RATE: f64 = 2.5;
const DURATION_CAP: f64 = 20.0;

/// Points per pending deadline, capped at 20 total.
const DEADLINE_RATE: f64 = 4.0;
const DEADLINE_CAP: f64 = 20.0;

/// Discrete load band derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl LoadLevel {
    /// Map a 0..=100 score onto its band.
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            LoadLevel::Low
        } else if score < 50.0 {
            LoadLevel::Medium
        } else if score < 75.0 {
            LoadLevel::High
        } else {
            LoadLevel::Critical
        }
    }

    /// Parse a level from its wire name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "low" => Ok(LoadLevel::Low),
            "medium" => Ok(LoadLevel::Medium),
            "high" => Ok(LoadLevel::High),
            "critical" => Ok(LoadLevel::Critical),
            other => Err(ValidationError::InvalidValue {
                field: "level".to_string(),
                message: format!("unknown load level '{other}'"),
            }),
        }
    }

    /// Wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadLevel::Low => "low",
            LoadLevel::Medium => "medium",
            LoadLevel::High => "high",
            LoadLevel::Critical => "critical",
        }
    }
}

/// The four observable factors feeding the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadFactors {
    /// Open, non-ignored threads.
    pub active_threads: u32,
    /// Context switches inside the recent-activity window.
    pub switching_frequency: u32,
    /// Hours worked so far today.
    pub work_duration: f64,
    /// Deadlines falling within the lookahead window.
    pub pending_deadlines: u32,
}

impl LoadFactors {
    /// Combine the factors into a 0..=100 score. Each term saturates at
    /// its own cap before summing.
    pub fn score(&self) -> f64 {
        let threads = (self.active_threads as f64 * ACTIVE_THREAD_RATE).min(ACTIVE_THREAD_CAP);
        let switches = (self.switching_frequency as f64 * SWITCH_RATE).min(SWITCH_CAP);
        let duration = (self.work_duration * DURATION_RATE).min(DURATION_CAP);
        let deadlines = (self.pending_deadlines as f64 * DEADLINE_RATE).min(DEADLINE_CAP);
        (threads + switches + duration + deadlines).clamp(0.0, 100.0)
    }
}

/// Snapshot inputs for one load calculation.
#[derive(Debug, Clone, Copy)]
pub struct LoadInputs<'a> {
    pub now: DateTime<Utc>,
    /// The user's open, non-ignored threads.
    pub active_threads: &'a [WorkThread],
    /// Activity from the recent window.
    pub recent_activity: &'a [Activity],
    /// Threads whose deadline falls inside the lookahead window.
    pub deadline_threads: &'a [WorkThread],
}

/// Reduce a snapshot of threads and activity to the four factors.
///
/// Work duration only counts activity stamped today, even though the
/// window handed in may reach into yesterday around midnight.
pub fn derive_factors(inputs: &LoadInputs) -> LoadFactors {
    let switches = inputs
        .recent_activity
        .iter()
        .filter(|a| a.is_context_switch())
        .count() as u32;

    let today = inputs.now.date_naive();
    let earliest_today = inputs
        .recent_activity
        .iter()
        .filter(|a| a.timestamp.date_naive() == today)
        .map(|a| a.timestamp)
        .min();
    let work_duration = earliest_today
        .map(|start| (inputs.now - start).num_milliseconds().max(0) as f64 / 3_600_000.0)
        .unwrap_or(0.0);

    LoadFactors {
        active_threads: inputs.active_threads.len() as u32,
        switching_frequency: switches,
        work_duration,
        pending_deadlines: inputs.deadline_threads.len() as u32,
    }
}

/// A stored cognitive load measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveLoad {
    pub id: String,
    pub user_id: String,
    pub level: LoadLevel,
    pub score: f64,
    pub factors: LoadFactors,
    pub timestamp: DateTime<Utc>,
}

impl CognitiveLoad {
    /// Build a snapshot from already-derived factors.
    pub fn new(user_id: impl Into<String>, factors: LoadFactors, at: DateTime<Utc>) -> Self {
        let score = factors.score();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            level: LoadLevel::from_score(score),
            score,
            factors,
            timestamp: at,
        }
    }
}

/// Derive factors from a snapshot and produce the measurement.
pub fn compute_load(user_id: &str, inputs: &LoadInputs) -> CognitiveLoad {
    let factors = derive_factors(inputs);
    CognitiveLoad::new(user_id, factors, inputs.now)
}
