//! Store seams between the engines and persistence.
//!
//! The advisor only ever talks to these traits, so the scoring and
//! insight paths can run against an in-memory database in tests and the
//! real on-disk one in the CLI.

use chrono::{DateTime, Utc};

use crate::activity::Activity;
use crate::error::StoreError;
use crate::insight::Insight;
use crate::load::CognitiveLoad;
use crate::priority::PriorityRecommendation;
use crate::thread::WorkThread;

/// Read access to a user's threads.
pub trait ThreadStore {
    /// Every open thread for the user, oldest first. Ignored threads are
    /// included; callers that want them out filter themselves.
    fn active_threads(&self, user_id: &str) -> Result<Vec<WorkThread>, StoreError>;

    /// Open threads whose deadline falls within the next `days` days.
    fn threads_with_deadline_within(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<WorkThread>, StoreError>;
}

/// Append and read the activity log.
pub trait ActivityStore {
    /// Append one event to the log.
    fn record_activity(&self, activity: &Activity) -> Result<(), StoreError>;

    /// Events at or after `since`, oldest first.
    fn activities_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Activity>, StoreError>;
}

/// Persist computed results: load measurements and recommendations.
pub trait SnapshotStore {
    /// Append a cognitive load measurement.
    fn save_cognitive_load(&self, load: &CognitiveLoad) -> Result<(), StoreError>;

    /// The most recent load measurement, if any exists.
    fn latest_cognitive_load(&self, user_id: &str) -> Result<Option<CognitiveLoad>, StoreError>;

    /// Append one recommendation.
    fn save_recommendation(&self, rec: &PriorityRecommendation) -> Result<(), StoreError>;

    /// Retire every currently-active recommendation for the user. Called
    /// before a fresh batch is saved so only one batch is live at a time.
    fn deactivate_recommendations(&self, user_id: &str) -> Result<(), StoreError>;

    /// The live batch, highest score first.
    fn active_recommendations(
        &self,
        user_id: &str,
    ) -> Result<Vec<PriorityRecommendation>, StoreError>;
}

/// Persist detected insights.
pub trait InsightStore {
    /// Append one insight.
    fn save_insight(&self, insight: &Insight) -> Result<(), StoreError>;

    /// The newest insights, most recent first.
    fn recent_insights(&self, user_id: &str, limit: usize) -> Result<Vec<Insight>, StoreError>;
}
