//! Priority scoring engine.
//!
//! Scores work threads on an additive 0-100 point scale and decides which
//! ones deserve a recommendation. Scoring is deterministic; the narrative
//! `Reasoning` attached to a recommendation may come from a text generator,
//! with a deterministic fallback when generation fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::thread::{PriorityTier, WorkThread};

/// Bonus for a high-tier thread that has stalled below half done.
pub const STALLED_HIGH_BONUS: u32 = 15;

/// Bonus for an ignored thread whose deadline is three days out or closer.
pub const IGNORED_DEADLINE_BONUS: u32 = 25;

/// Bonus for a thread in the 70..100 home stretch.
pub const NEAR_COMPLETION_BONUS: u32 = 10;

/// Scores are capped here.
pub const MAX_SCORE: u32 = 100;

/// Minimum score for a thread to qualify for a recommendation.
pub const QUALIFYING_SCORE: u8 = 50;

/// Fractional days from `now` until `deadline`. Negative when overdue.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (deadline - now).num_milliseconds() as f64 / 86_400_000.0
}

/// Fractional days elapsed since `start`.
pub fn days_since(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - start).num_milliseconds() as f64 / 86_400_000.0
}

/// Base points contributed by the priority tier.
pub fn base_points(tier: PriorityTier) -> u32 {
    match tier {
        PriorityTier::High => 40,
        PriorityTier::Medium => 25,
        PriorityTier::Low => 10,
    }
}

/// Points contributed by deadline proximity. Overdue threads land in the
/// tightest band.
pub fn deadline_proximity_points(days: f64) -> u32 {
    if days <= 1.0 {
        30
    } else if days <= 3.0 {
        20
    } else if days <= 7.0 {
        10
    } else {
        0
    }
}

/// Score a thread at a given instant. Pure; identical inputs always
/// produce the identical score.
pub fn priority_score(thread: &WorkThread, now: DateTime<Utc>) -> u8 {
    let mut points = base_points(thread.priority);

    if let Some(deadline) = thread.deadline {
        points += deadline_proximity_points(days_until(deadline, now));
    }

    if thread.priority == PriorityTier::High && thread.progress < 50 {
        points += STALLED_HIGH_BONUS;
    }

    if thread.is_ignored {
        if let Some(deadline) = thread.deadline {
            if days_until(deadline, now) <= 3.0 {
                points += IGNORED_DEADLINE_BONUS;
            }
        }
    }

    if (70..100).contains(&thread.progress) {
        points += NEAR_COMPLETION_BONUS;
    }

    points.min(MAX_SCORE) as u8
}

/// Score every thread and keep the ones that qualify, highest first.
/// The sort is stable, so equal scores keep the input order.
pub fn rank_threads(threads: &[WorkThread], now: DateTime<Utc>) -> Vec<(&WorkThread, u8)> {
    let mut ranked: Vec<(&WorkThread, u8)> = threads
        .iter()
        .map(|thread| (thread, priority_score(thread, now)))
        .filter(|(_, score)| *score >= QUALIFYING_SCORE)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// How much a single factor contributed to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorWeight {
    High,
    Medium,
    Low,
}

/// One named factor inside a recommendation's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningFactor {
    pub label: String,
    pub weight: FactorWeight,
    pub description: String,
}

impl ReasoningFactor {
    fn new(label: &str, weight: FactorWeight, description: String) -> Self {
        Self {
            label: label.to_string(),
            weight,
            description,
        }
    }
}

/// Narrative explanation attached to a recommendation.
///
/// `title` and `description` are required on the wire; `factors` may be
/// absent, in which case it deserializes empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub factors: Vec<ReasoningFactor>,
}

fn describe_deadline(days: f64) -> String {
    if days <= 0.0 {
        "Past due".to_string()
    } else if days <= 1.0 {
        "Due within a day".to_string()
    } else {
        format!("Due in about {} days", days.ceil() as i64)
    }
}

/// Deterministic reasoning used when text generation fails or returns
/// nothing parseable.
pub fn fallback_reasoning(thread: &WorkThread, now: DateTime<Utc>) -> Reasoning {
    let title = if thread.deadline.is_some() {
        "Deadline approaching"
    } else {
        "Priority work needs attention"
    };

    let mut factors = Vec::new();
    if thread.priority == PriorityTier::High {
        factors.push(ReasoningFactor::new(
            "High priority",
            FactorWeight::High,
            "Thread is marked high priority".to_string(),
        ));
    }
    if let Some(deadline) = thread.deadline {
        let days = days_until(deadline, now);
        let weight = if days <= 2.0 {
            FactorWeight::High
        } else {
            FactorWeight::Medium
        };
        factors.push(ReasoningFactor::new(
            "Deadline proximity",
            weight,
            describe_deadline(days),
        ));
    }
    if thread.progress < 50 {
        factors.push(ReasoningFactor::new(
            "Low progress",
            FactorWeight::Medium,
            format!("Only {}% complete", thread.progress),
        ));
    }

    Reasoning {
        title: title.to_string(),
        description: format!(
            "\"{}\" needs attention based on its priority, progress and timeline.",
            thread.title
        ),
        factors,
    }
}

/// A stored recommendation for one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityRecommendation {
    pub id: String,
    pub user_id: String,
    pub thread_id: String,
    /// The 0..=100 priority score at generation time.
    pub score: u8,
    pub reasoning: Reasoning,
    pub generated_at: DateTime<Utc>,
    /// False once a newer batch supersedes this one.
    pub is_active: bool,
}

impl PriorityRecommendation {
    /// Create an active recommendation generated now.
    pub fn new(
        user_id: impl Into<String>,
        thread_id: impl Into<String>,
        score: u8,
        reasoning: Reasoning,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            thread_id: thread_id.into(),
            score,
            reasoning,
            generated_at: Utc::now(),
            is_active: true,
        }
    }
}
