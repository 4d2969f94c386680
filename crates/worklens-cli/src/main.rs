use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "worklens", version, about = "Worklens CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work thread management
    Thread {
        #[command(subcommand)]
        action: commands::thread::ThreadAction,
    },
    /// Capture items into threads
    Item {
        #[command(subcommand)]
        action: commands::item::ItemAction,
    },
    /// Activity log
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Priority recommendations
    Recommend {
        #[command(subcommand)]
        action: commands::recommend::RecommendAction,
    },
    /// Cognitive load measurement
    Load {
        #[command(subcommand)]
        action: commands::load::LoadAction,
    },
    /// Insight detection
    Insight {
        #[command(subcommand)]
        action: commands::insight::InsightAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Thread { action } => commands::thread::run(action),
        Commands::Item { action } => commands::item::run(action),
        Commands::Activity { action } => commands::activity::run(action),
        Commands::Recommend { action } => commands::recommend::run(action),
        Commands::Load { action } => commands::load::run(action),
        Commands::Insight { action } => commands::insight::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "worklens", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
