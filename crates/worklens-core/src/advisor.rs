//! Orchestration layer: runs the scoring engines over a store and asks
//! the text generator to dress the results up for humans.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::generator::{parse_reply, TextGenerator};
use crate::insight::{self, GeneratedInsight, Insight};
use crate::load::{self, CognitiveLoad, LoadInputs};
use crate::priority::{self, PriorityRecommendation, Reasoning};
use crate::store::{ActivityStore, InsightStore, SnapshotStore, ThreadStore};
use crate::thread::WorkThread;

/// Ties a store and a text generator together behind the three
/// top-level operations: recommend, assess load, detect insights.
pub struct Advisor<S, G> {
    store: S,
    generator: G,
}

impl<S, G> Advisor<S, G>
where
    S: ThreadStore + ActivityStore + SnapshotStore + InsightStore,
    G: TextGenerator,
{
    pub fn new(store: S, generator: G) -> Self {
        Self { store, generator }
    }

    /// The underlying store, for callers that need direct reads.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rank the user's active threads and persist a fresh recommendation
    /// batch. The previous batch is deactivated, never deleted.
    pub async fn recommend(&self, user_id: &str) -> Result<Vec<PriorityRecommendation>> {
        let now = Utc::now();
        let threads = self.store.active_threads(user_id)?;
        let ranked = priority::rank_threads(&threads, now);

        let mut recs = Vec::with_capacity(ranked.len());
        for (thread, score) in ranked {
            let reasoning = self.reasoning_for(thread, score, now).await;
            recs.push(PriorityRecommendation::new(
                user_id,
                &thread.id,
                score,
                reasoning,
            ));
        }

        self.store.deactivate_recommendations(user_id)?;
        for rec in &recs {
            self.store.save_recommendation(rec)?;
        }
        info!(user_id, count = recs.len(), "refreshed recommendation batch");
        Ok(recs)
    }

    /// Ask the generator to explain one ranking. Unusable replies fall
    /// back to the deterministic reasoning.
    async fn reasoning_for(&self, thread: &WorkThread, score: u8, now: DateTime<Utc>) -> Reasoning {
        let prompt = reasoning_prompt(thread, score, now);
        match self.generator.generate(&prompt).await {
            Ok(reply) => match parse_reply::<Reasoning>(&reply) {
                Some(reasoning) => reasoning,
                None => {
                    debug!(thread_id = %thread.id, "reply held no usable reasoning");
                    priority::fallback_reasoning(thread, now)
                }
            },
            Err(e) => {
                warn!(thread_id = %thread.id, error = %e, "reasoning generation failed");
                priority::fallback_reasoning(thread, now)
            }
        }
    }

    /// Measure cognitive load from the current snapshot, persist it, and
    /// raise an overload notice when it lands in the upper bands.
    pub fn assess_load(&self, user_id: &str) -> Result<CognitiveLoad> {
        let now = Utc::now();
        let threads = self.store.active_threads(user_id)?;
        let focused: Vec<WorkThread> = threads.into_iter().filter(|t| !t.is_ignored).collect();
        let since = now - Duration::hours(load::ACTIVITY_WINDOW_HOURS);
        let recent = self.store.activities_since(user_id, since)?;
        let pending = self
            .store
            .threads_with_deadline_within(user_id, load::DEADLINE_LOOKAHEAD_DAYS)?;

        let measurement = load::compute_load(
            user_id,
            &LoadInputs {
                now,
                active_threads: &focused,
                recent_activity: &recent,
                deadline_threads: &pending,
            },
        );
        self.store.save_cognitive_load(&measurement)?;
        info!(
            user_id,
            score = measurement.score,
            level = measurement.level.as_str(),
            "assessed cognitive load"
        );

        if let Some(notice) = insight::overload_notice(&measurement) {
            self.store.save_insight(&notice)?;
        }
        Ok(measurement)
    }

    /// Run the deterministic detectors over the active threads, add one
    /// generated observation when the generator cooperates, and persist
    /// everything found.
    pub async fn detect_insights(&self, user_id: &str) -> Result<Vec<Insight>> {
        let now = Utc::now();
        let threads = self.store.active_threads(user_id)?;
        let mut insights = insight::scan_threads(&threads, now);

        if let Some(extra) = self.generated_insight(user_id, &threads, now).await {
            insights.push(extra);
        }

        for item in &insights {
            self.store.save_insight(item)?;
        }
        info!(user_id, count = insights.len(), "stored detected insights");
        Ok(insights)
    }

    /// One free-form observation across the whole snapshot. Failed or
    /// malformed replies drop it without complaint.
    async fn generated_insight(
        &self,
        user_id: &str,
        threads: &[WorkThread],
        now: DateTime<Utc>,
    ) -> Option<Insight> {
        if threads.is_empty() {
            return None;
        }
        let prompt = insight_prompt(threads, now);
        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "insight generation failed");
                return None;
            }
        };
        match parse_reply::<GeneratedInsight>(&reply) {
            Some(generated) => Some(generated.into_insight(user_id, now)),
            None => {
                debug!("reply held no usable insight");
                None
            }
        }
    }
}

fn describe_deadline_distance(thread: &WorkThread, now: DateTime<Utc>) -> String {
    match thread.deadline {
        Some(deadline) => format!("{:.1} days away", priority::days_until(deadline, now)),
        None => "none".to_string(),
    }
}

/// Prompt asking for a JSON reasoning payload for one ranked thread.
fn reasoning_prompt(thread: &WorkThread, score: u8, now: DateTime<Utc>) -> String {
    format!(
        "A work thread scored {score}/100 for priority.\n\
         Title: {title}\n\
         Priority tier: {tier}\n\
         Progress: {progress}%\n\
         Deadline: {deadline}\n\
         Explain briefly why it deserves attention now. Reply with a JSON object shaped as\n\
         {{\"title\": \"...\", \"description\": \"...\", \"factors\": \
         [{{\"label\": \"...\", \"weight\": \"high|medium|low\", \"description\": \"...\"}}]}}",
        title = thread.title,
        tier = thread.priority.as_str(),
        progress = thread.progress,
        deadline = describe_deadline_distance(thread, now),
    )
}

/// Prompt asking for one JSON observation across the whole snapshot.
fn insight_prompt(threads: &[WorkThread], now: DateTime<Utc>) -> String {
    let mut lines = String::new();
    for thread in threads {
        lines.push_str(&format!(
            "- {title} (tier {tier}, {progress}% done, deadline {deadline})\n",
            title = thread.title,
            tier = thread.priority.as_str(),
            progress = thread.progress,
            deadline = describe_deadline_distance(thread, now),
        ));
    }
    format!(
        "Here is a snapshot of someone's open work threads:\n{lines}\
         Point out one pattern worth their attention. Reply with a JSON object shaped as\n\
         {{\"title\": \"...\", \"description\": \"...\", \"severity\": \"info|warning|critical\"}}",
    )
}
