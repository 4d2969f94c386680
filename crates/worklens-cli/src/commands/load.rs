//! Cognitive load commands.

use clap::Subcommand;
use worklens_core::{Advisor, GeneratorChain, SnapshotStore, WorklensDb};

use super::resolve_user;

#[derive(Subcommand)]
pub enum LoadAction {
    /// Measure cognitive load from the current snapshot
    Assess {
        #[arg(long)]
        user: Option<String>,
    },
    /// Show the latest stored measurement
    Latest {
        #[arg(long)]
        user: Option<String>,
    },
    /// Show recent measurements, newest first
    History {
        #[arg(long)]
        user: Option<String>,
        /// Maximum number of measurements
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub fn run(action: LoadAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LoadAction::Assess { user } => {
            let user = resolve_user(user);
            let db = WorklensDb::open()?;
            // Load assessment never prompts, so an empty chain satisfies
            // the generator seam.
            let advisor = Advisor::new(db, GeneratorChain::new(Vec::new()));
            let load = advisor.assess_load(&user)?;
            println!("{}", serde_json::to_string_pretty(&load)?);
        }
        LoadAction::Latest { user } => {
            let user = resolve_user(user);
            let db = WorklensDb::open()?;
            match db.latest_cognitive_load(&user)? {
                Some(load) => println!("{}", serde_json::to_string_pretty(&load)?),
                None => println!("No measurements yet"),
            }
        }
        LoadAction::History { user, limit } => {
            let user = resolve_user(user);
            let db = WorklensDb::open()?;
            let history = db.load_history(&user, limit)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
    }
    Ok(())
}
