//! Insight detection commands.

use clap::Subcommand;
use worklens_core::{Advisor, Config, InsightStore, WorklensDb};

use super::resolve_user;

#[derive(Subcommand)]
pub enum InsightAction {
    /// Run detection over active threads and store what's found
    Detect {
        #[arg(long)]
        user: Option<String>,
    },
    /// List recently detected insights
    List {
        #[arg(long)]
        user: Option<String>,
        /// Maximum number of insights
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

pub fn run(action: InsightAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        InsightAction::Detect { user } => {
            let user = resolve_user(user);
            let config = Config::load()?;
            let chain = config.generator.chain()?;
            let db = WorklensDb::open()?;
            let advisor = Advisor::new(db, chain);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let insights = runtime.block_on(advisor.detect_insights(&user))?;

            println!("Detected {} insights", insights.len());
            println!("{}", serde_json::to_string_pretty(&insights)?);
        }
        InsightAction::List { user, limit } => {
            let user = resolve_user(user);
            let db = WorklensDb::open()?;
            let insights = db.recent_insights(&user, limit)?;
            println!("{}", serde_json::to_string_pretty(&insights)?);
        }
    }
    Ok(())
}
