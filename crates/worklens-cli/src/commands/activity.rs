//! Activity log commands.

use chrono::{Duration, Utc};
use clap::Subcommand;
use worklens_core::{Activity, ActivityKind, ActivityStore, WorklensDb};

use super::resolve_user;

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Record an activity event
    Record {
        /// Event kind: context-switch, focus-session, thread-created,
        /// thread-updated or item-added
        kind: String,
        /// Acting user (defaults to the configured user)
        #[arg(long)]
        user: Option<String>,
        /// Related thread ID
        #[arg(long)]
        thread: Option<String>,
    },
    /// List activity from the recent past
    List {
        #[arg(long)]
        user: Option<String>,
        /// Window in hours
        #[arg(long, default_value = "24")]
        hours: i64,
    },
}

pub fn run(action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = WorklensDb::open()?;

    match action {
        ActivityAction::Record { kind, user, thread } => {
            let user = resolve_user(user);
            let kind = ActivityKind::parse(&kind)?;
            let mut activity = Activity::new(user, kind);
            if let Some(thread_id) = thread {
                activity = activity.with_thread(thread_id);
            }
            db.record_activity(&activity)?;
            println!("Activity recorded: {}", activity.id);
        }
        ActivityAction::List { user, hours } => {
            let user = resolve_user(user);
            let since = Utc::now() - Duration::hours(hours);
            let log = db.activities_since(&user, since)?;
            println!("{}", serde_json::to_string_pretty(&log)?);
        }
    }
    Ok(())
}
