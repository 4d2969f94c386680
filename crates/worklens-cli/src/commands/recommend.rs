//! Priority recommendation commands.

use clap::Subcommand;
use worklens_core::{Advisor, Config, SnapshotStore, WorklensDb};

use super::resolve_user;

#[derive(Subcommand)]
pub enum RecommendAction {
    /// Rank active threads and store a fresh recommendation batch
    Run {
        #[arg(long)]
        user: Option<String>,
    },
    /// Show the currently active batch
    Show {
        #[arg(long)]
        user: Option<String>,
    },
}

pub fn run(action: RecommendAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RecommendAction::Run { user } => {
            let user = resolve_user(user);
            let config = Config::load()?;
            let chain = config.generator.chain()?;
            let db = WorklensDb::open()?;
            let advisor = Advisor::new(db, chain);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let recs = runtime.block_on(advisor.recommend(&user))?;

            println!("Stored {} recommendations", recs.len());
            println!("{}", serde_json::to_string_pretty(&recs)?);
        }
        RecommendAction::Show { user } => {
            let user = resolve_user(user);
            let db = WorklensDb::open()?;
            let recs = db.active_recommendations(&user)?;
            println!("{}", serde_json::to_string_pretty(&recs)?);
        }
    }
    Ok(())
}
