//! Item capture commands.

use clap::Subcommand;
use worklens_core::{WorkItem, WorkItemKind, WorklensDb};

use super::resolve_user;

#[derive(Subcommand)]
pub enum ItemAction {
    /// Capture an item into a thread
    Add {
        /// Thread ID
        thread_id: String,
        /// Item title
        title: String,
        /// Acting user (defaults to the configured user)
        #[arg(long)]
        user: Option<String>,
        /// Item kind: email, task, event or message
        #[arg(long, default_value = "task")]
        kind: String,
    },
    /// List items captured into a thread
    List {
        /// Thread ID
        thread_id: String,
    },
}

pub fn run(action: ItemAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = WorklensDb::open()?;

    match action {
        ItemAction::Add {
            thread_id,
            title,
            user,
            kind,
        } => {
            let user = resolve_user(user);
            let kind = WorkItemKind::parse(&kind)?;
            let thread = db
                .get_thread(&thread_id)?
                .ok_or(format!("Thread not found: {thread_id}"))?;
            let item = WorkItem::new(user, &thread.id, kind, title);
            db.add_item(&item)?;
            println!("Item added: {}", item.id);
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        ItemAction::List { thread_id } => {
            let items = db.list_items(&thread_id)?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }
    Ok(())
}
