//! Integration tests for the advisor.
//!
//! Runs the full recommend / assess-load / detect-insights workflows
//! against an in-memory database, with stub generators standing in for
//! the HTTP provider chain.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use worklens_core::error::GeneratorError;
use worklens_core::{
    Activity, ActivityKind, ActivityStore, Advisor, Insight, InsightKind, InsightStore, LoadLevel,
    PriorityTier, Severity, SnapshotStore, TextGenerator, WorkThread, WorklensDb,
};

/// Always answers with the same canned reply and counts calls.
struct CannedGenerator {
    reply: String,
    calls: Arc<AtomicUsize>,
}

impl CannedGenerator {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle onto the call counter that outlives the generator.
    fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Always errors, like a chain whose providers are all down.
struct FailingGenerator;

impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        Err(GeneratorError::Rejected("service offline".to_string()))
    }
}

fn kinds_of(insights: &[Insight]) -> Vec<InsightKind> {
    insights.iter().map(|i| i.kind).collect()
}

#[tokio::test]
async fn test_recommend_uses_generated_reasoning() {
    let db = WorklensDb::open_memory().unwrap();
    let now = Utc::now();

    // High tier (40) + deadline in 2 days (20) + stalled high (15) = 75.
    let urgent = WorkThread::new("u1", "Close the contract")
        .with_priority(PriorityTier::High)
        .with_progress(20)
        .with_deadline(now + Duration::days(2));
    db.create_thread(&urgent).unwrap();
    // Low tier, nothing else: 10 points, below the bar.
    db.create_thread(&WorkThread::new("u1", "Tidy the wiki")).unwrap();

    let generator = CannedGenerator::new(
        "Sure, here is my take:\n\
         {\"title\": \"Contract first\", \"description\": \"The deadline is close and little is done.\", \
          \"factors\": [{\"label\": \"Deadline\", \"weight\": \"high\", \"description\": \"Two days left\"}]}",
    );
    let advisor = Advisor::new(db, generator);

    let recs = advisor.recommend("u1").await.unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].thread_id, urgent.id);
    assert_eq!(recs[0].score, 75);
    assert!(recs[0].is_active);
    assert_eq!(recs[0].reasoning.title, "Contract first");
    assert_eq!(recs[0].reasoning.factors.len(), 1);
    assert_eq!(recs[0].reasoning.factors[0].label, "Deadline");

    let stored = advisor.store().active_recommendations("u1").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, recs[0].id);
    assert_eq!(stored[0].reasoning.title, "Contract first");
}

#[tokio::test]
async fn test_recommend_falls_back_when_generation_fails() {
    let db = WorklensDb::open_memory().unwrap();
    let now = Utc::now();

    // High (40) + deadline within a day (30) + stalled high (15) = 85.
    let thread = WorkThread::new("u1", "Submit the filing")
        .with_priority(PriorityTier::High)
        .with_progress(10)
        .with_deadline(now + Duration::hours(12));
    db.create_thread(&thread).unwrap();

    let advisor = Advisor::new(db, FailingGenerator);
    let recs = advisor.recommend("u1").await.unwrap();

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].score, 85);
    // Deterministic reasoning: deadline present picks the deadline title.
    assert_eq!(recs[0].reasoning.title, "Deadline approaching");
    let labels: Vec<&str> = recs[0]
        .reasoning
        .factors
        .iter()
        .map(|f| f.label.as_str())
        .collect();
    assert_eq!(labels, vec!["High priority", "Deadline proximity", "Low progress"]);
}

#[tokio::test]
async fn test_recommend_replaces_previous_batch() {
    let db = WorklensDb::open_memory().unwrap();
    let thread = WorkThread::new("u1", "Quarter close")
        .with_priority(PriorityTier::High)
        .with_progress(0);
    db.create_thread(&thread).unwrap();

    let advisor = Advisor::new(db, FailingGenerator);

    let first = advisor.recommend("u1").await.unwrap();
    assert_eq!(first.len(), 1);
    let second = advisor.recommend("u1").await.unwrap();
    assert_eq!(second.len(), 1);
    assert_ne!(first[0].id, second[0].id);

    // Only the second batch stays active.
    let active = advisor.store().active_recommendations("u1").unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second[0].id);
}

#[tokio::test]
async fn test_recommend_skips_generator_when_nothing_qualifies() {
    let db = WorklensDb::open_memory().unwrap();
    db.create_thread(&WorkThread::new("u1", "Someday pile")).unwrap();

    let generator = CannedGenerator::new("{\"title\": \"x\", \"description\": \"y\"}");
    let calls = generator.counter();
    let advisor = Advisor::new(db, generator);

    let recs = advisor.recommend("u1").await.unwrap();
    assert!(recs.is_empty());
    assert!(advisor.store().active_recommendations("u1").unwrap().is_empty());
    // No qualifying thread means no prompt was ever sent.
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_assess_load_persists_and_raises_overload() {
    let db = WorklensDb::open_memory().unwrap();
    let now = Utc::now();

    // 6 active threads (30 pts), 5 with deadlines inside a week (20 pts),
    // 10 recent context switches (30 pts). Well into the critical band
    // before work duration adds anything.
    for i in 0..6 {
        let mut thread = WorkThread::new("u1", format!("thread {i}"));
        if i < 5 {
            thread = thread.with_deadline(now + Duration::days(2 + i64::from(i)));
        }
        db.create_thread(&thread).unwrap();
    }
    // Ignored threads must not count toward the thread factor.
    db.create_thread(&WorkThread::new("u1", "parked").with_ignored(true))
        .unwrap();
    for _ in 0..10 {
        db.record_activity(
            &Activity::new("u1", ActivityKind::ContextSwitch).at(now - Duration::minutes(30)),
        )
        .unwrap();
    }

    let advisor = Advisor::new(db, FailingGenerator);
    let load = advisor.assess_load("u1").unwrap();

    assert_eq!(load.factors.active_threads, 6);
    assert_eq!(load.factors.switching_frequency, 10);
    assert_eq!(load.factors.pending_deadlines, 5);
    assert!(load.score >= 80.0);
    assert_eq!(load.level, LoadLevel::Critical);

    let latest = advisor.store().latest_cognitive_load("u1").unwrap().unwrap();
    assert_eq!(latest.id, load.id);

    let insights = advisor.store().recent_insights("u1", 10).unwrap();
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].kind, InsightKind::Overload);
    assert_eq!(insights[0].severity, Severity::Critical);
}

#[test]
fn test_assess_load_quiet_day_leaves_no_notice() {
    let db = WorklensDb::open_memory().unwrap();
    db.create_thread(&WorkThread::new("u1", "only one thing")).unwrap();

    let advisor = Advisor::new(db, FailingGenerator);
    let load = advisor.assess_load("u1").unwrap();

    assert_eq!(load.factors.active_threads, 1);
    assert_eq!(load.level, LoadLevel::Low);
    assert!(load.score < 25.0);
    assert!(advisor.store().recent_insights("u1", 10).unwrap().is_empty());
}

#[tokio::test]
async fn test_detect_insights_combines_rules_and_generated() {
    let db = WorklensDb::open_memory().unwrap();
    let now = Utc::now();

    // Ignored with a deadline inside a day: critical ignored-work.
    db.create_thread(
        &WorkThread::new("u1", "Renewal paperwork")
            .with_ignored(true)
            .with_deadline(now + Duration::hours(12)),
    )
    .unwrap();

    // Thirty days of history, 10% done, two days left: deadline risk.
    let mut slow = WorkThread::new("u1", "Migration")
        .with_progress(10)
        .with_deadline(now + Duration::days(2));
    slow.created_at = now - Duration::days(30);
    db.create_thread(&slow).unwrap();

    // Nearly finished, no rule should fire.
    db.create_thread(
        &WorkThread::new("u1", "Launch notes")
            .with_progress(90)
            .with_deadline(now + Duration::days(2)),
    )
    .unwrap();

    let generator = CannedGenerator::new(
        "{\"title\": \"Mornings are scattered\", \
          \"description\": \"Most switching happens before noon.\", \
          \"severity\": \"warning\"}",
    );
    let advisor = Advisor::new(db, generator);

    let insights = advisor.detect_insights("u1").await.unwrap();
    let kinds = kinds_of(&insights);
    assert_eq!(insights.len(), 3);
    assert!(kinds.contains(&InsightKind::IgnoredWork));
    assert!(kinds.contains(&InsightKind::DeadlineRisk));
    assert!(kinds.contains(&InsightKind::AiGenerated));

    let ignored = insights
        .iter()
        .find(|i| i.kind == InsightKind::IgnoredWork)
        .unwrap();
    assert_eq!(ignored.severity, Severity::Critical);

    let generated = insights
        .iter()
        .find(|i| i.kind == InsightKind::AiGenerated)
        .unwrap();
    assert_eq!(generated.severity, Severity::Warning);
    assert_eq!(generated.title, "Mornings are scattered");
    assert_eq!(generated.user_id, "u1");

    let stored = advisor.store().recent_insights("u1", 10).unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn test_detect_insights_drops_generated_on_failure() {
    let db = WorklensDb::open_memory().unwrap();
    let now = Utc::now();
    db.create_thread(
        &WorkThread::new("u1", "Renewal paperwork")
            .with_ignored(true)
            .with_deadline(now + Duration::hours(12)),
    )
    .unwrap();

    let advisor = Advisor::new(db, FailingGenerator);
    let insights = advisor.detect_insights("u1").await.unwrap();

    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].kind, InsightKind::IgnoredWork);
}

#[tokio::test]
async fn test_detect_insights_garbage_reply_is_skipped() {
    let db = WorklensDb::open_memory().unwrap();
    let now = Utc::now();
    db.create_thread(
        &WorkThread::new("u1", "Renewal paperwork")
            .with_ignored(true)
            .with_deadline(now + Duration::hours(12)),
    )
    .unwrap();

    // A reply with braces that never parse into the expected shape.
    let generator = CannedGenerator::new("here you go { not json at all");
    let advisor = Advisor::new(db, generator);
    let insights = advisor.detect_insights("u1").await.unwrap();

    assert_eq!(kinds_of(&insights), vec![InsightKind::IgnoredWork]);
}
