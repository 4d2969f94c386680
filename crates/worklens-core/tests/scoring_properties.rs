//! Property tests for the scoring engines.
//!
//! The scorers are pure functions over thread snapshots, so the
//! interesting guarantees are ranges, determinism and monotonicity
//! rather than any particular oracle value.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use worklens_core::priority::{priority_score, rank_threads, QUALIFYING_SCORE};
use worklens_core::{LoadFactors, PriorityTier, WorkThread};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

fn arb_tier() -> impl Strategy<Value = PriorityTier> {
    prop_oneof![
        Just(PriorityTier::Low),
        Just(PriorityTier::Medium),
        Just(PriorityTier::High),
    ]
}

prop_compose! {
    fn arb_thread()(
        tier in arb_tier(),
        progress in 0u8..=100,
        ignored in any::<bool>(),
        deadline_hours in prop::option::of(-2_000i64..2_000),
    ) -> WorkThread {
        let mut thread = WorkThread::new("u", "t")
            .with_priority(tier)
            .with_progress(progress)
            .with_ignored(ignored);
        thread.deadline = deadline_hours.map(|h| fixed_now() + Duration::hours(h));
        thread
    }
}

proptest! {
    #[test]
    fn priority_score_is_capped(thread in arb_thread()) {
        prop_assert!(priority_score(&thread, fixed_now()) <= 100);
    }

    #[test]
    fn priority_score_is_deterministic(thread in arb_thread()) {
        prop_assert_eq!(
            priority_score(&thread, fixed_now()),
            priority_score(&thread, fixed_now())
        );
    }

    #[test]
    fn closer_deadline_never_scores_lower(
        tier in arb_tier(),
        progress in 0u8..=100,
        a in 1i64..2_000,
        b in 1i64..2_000,
    ) {
        let now = fixed_now();
        let (near, far) = (a.min(b), a.max(b));
        let base = WorkThread::new("u", "t")
            .with_priority(tier)
            .with_progress(progress);
        let near_thread = base.clone().with_deadline(now + Duration::hours(near));
        let far_thread = base.with_deadline(now + Duration::hours(far));
        prop_assert!(priority_score(&near_thread, now) >= priority_score(&far_thread, now));
    }

    #[test]
    fn ranking_keeps_only_qualifiers_in_descending_order(
        threads in prop::collection::vec(arb_thread(), 0..24)
    ) {
        let now = fixed_now();
        let ranked = rank_threads(&threads, now);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
        }
        for (_, score) in &ranked {
            prop_assert!(*score >= QUALIFYING_SCORE);
        }
        let qualifying = threads
            .iter()
            .filter(|t| priority_score(t, now) >= QUALIFYING_SCORE)
            .count();
        prop_assert_eq!(ranked.len(), qualifying);
    }

    #[test]
    fn load_score_stays_in_range(
        threads in 0u32..64,
        switches in 0u32..64,
        duration in 0.0f64..48.0,
        deadlines in 0u32..64,
    ) {
        let factors = LoadFactors {
            active_threads: threads,
            switching_frequency: switches,
            work_duration: duration,
            pending_deadlines: deadlines,
        };
        prop_assert!((0.0..=100.0).contains(&factors.score()));
    }

    #[test]
    fn load_score_never_drops_when_switching_grows(
        threads in 0u32..64,
        switches in 0u32..64,
        duration in 0.0f64..48.0,
        deadlines in 0u32..64,
    ) {
        let base = LoadFactors {
            active_threads: threads,
            switching_frequency: switches,
            work_duration: duration,
            pending_deadlines: deadlines,
        };
        let mut busier = base;
        busier.switching_frequency += 1;
        prop_assert!(busier.score() >= base.score());
    }
}
