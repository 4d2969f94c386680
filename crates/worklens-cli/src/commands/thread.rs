//! Work thread management commands.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use worklens_core::{PriorityTier, ThreadStatus, ThreadStore, WorkThread, WorklensDb};

use super::resolve_user;

#[derive(Subcommand)]
pub enum ThreadAction {
    /// Create a new work thread
    Create {
        /// Thread title
        title: String,
        /// Acting user (defaults to the configured user)
        #[arg(long)]
        user: Option<String>,
        /// Priority tier: low, medium or high
        #[arg(long, default_value = "medium")]
        priority: String,
        /// One-line summary
        #[arg(long)]
        summary: Option<String>,
        /// Deadline as RFC3339 (e.g. 2026-04-01T17:00:00Z)
        #[arg(long)]
        deadline: Option<String>,
        /// Progress percentage (0-100)
        #[arg(long, default_value = "0")]
        progress: u8,
    },
    /// List threads
    List {
        #[arg(long)]
        user: Option<String>,
        /// Only threads still active
        #[arg(long)]
        active: bool,
    },
    /// Get thread details
    Get {
        /// Thread ID
        id: String,
    },
    /// Update a thread
    Update {
        /// Thread ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New summary
        #[arg(long)]
        summary: Option<String>,
        /// New priority tier
        #[arg(long)]
        priority: Option<String>,
        /// New progress percentage
        #[arg(long)]
        progress: Option<u8>,
        /// New deadline as RFC3339
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Mark a thread as deliberately ignored
    Ignore {
        /// Thread ID
        id: String,
        /// Clear the ignored flag instead
        #[arg(long)]
        unset: bool,
    },
    /// Mark a thread completed
    Complete {
        /// Thread ID
        id: String,
    },
    /// Delete a thread and its items
    Delete {
        /// Thread ID
        id: String,
    },
}

fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

pub fn run(action: ThreadAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = WorklensDb::open()?;

    match action {
        ThreadAction::Create {
            title,
            user,
            priority,
            summary,
            deadline,
            progress,
        } => {
            let user = resolve_user(user);
            let tier = PriorityTier::parse(&priority)?;
            let mut thread = WorkThread::new(user, title).with_priority(tier);
            if let Some(s) = summary {
                thread = thread.with_summary(s);
            }
            if let Some(raw) = deadline {
                thread = thread.with_deadline(parse_deadline(&raw)?);
            }
            thread.set_progress(progress)?;
            db.create_thread(&thread)?;
            println!("Thread created: {}", thread.id);
            println!("{}", serde_json::to_string_pretty(&thread)?);
        }
        ThreadAction::List { user, active } => {
            let user = resolve_user(user);
            let threads = if active {
                db.active_threads(&user)?
            } else {
                db.list_threads(&user)?
            };
            println!("{}", serde_json::to_string_pretty(&threads)?);
        }
        ThreadAction::Get { id } => match db.get_thread(&id)? {
            Some(thread) => println!("{}", serde_json::to_string_pretty(&thread)?),
            None => println!("Thread not found: {id}"),
        },
        ThreadAction::Update {
            id,
            title,
            summary,
            priority,
            progress,
            deadline,
        } => {
            let mut thread = db
                .get_thread(&id)?
                .ok_or(format!("Thread not found: {id}"))?;

            if let Some(t) = title {
                thread.title = t;
            }
            if let Some(s) = summary {
                thread.summary = Some(s);
            }
            if let Some(p) = priority {
                thread.priority = PriorityTier::parse(&p)?;
            }
            if let Some(p) = progress {
                thread.set_progress(p)?;
            }
            if let Some(raw) = deadline {
                thread.deadline = Some(parse_deadline(&raw)?);
            }
            thread.touch(Utc::now());

            db.update_thread(&thread)?;
            println!("Thread updated:");
            println!("{}", serde_json::to_string_pretty(&thread)?);
        }
        ThreadAction::Ignore { id, unset } => {
            let mut thread = db
                .get_thread(&id)?
                .ok_or(format!("Thread not found: {id}"))?;
            thread.is_ignored = !unset;
            thread.touch(Utc::now());
            db.update_thread(&thread)?;
            if unset {
                println!("Thread watched again: {id}");
            } else {
                println!("Thread ignored: {id}");
            }
        }
        ThreadAction::Complete { id } => {
            let mut thread = db
                .get_thread(&id)?
                .ok_or(format!("Thread not found: {id}"))?;
            thread.status = ThreadStatus::Completed;
            thread.touch(Utc::now());
            db.update_thread(&thread)?;
            println!("Thread completed: {id}");
        }
        ThreadAction::Delete { id } => {
            if db.delete_thread(&id)? {
                println!("Thread deleted: {id}");
            } else {
                println!("Thread not found: {id}");
            }
        }
    }
    Ok(())
}
