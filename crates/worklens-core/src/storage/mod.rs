mod config;
pub mod db;

pub use config::{Config, GeneratorConfig, GeneratorProviderConfig};
pub use db::WorklensDb;

use std::path::PathBuf;

/// Returns `~/.config/worklens[-dev]/` based on WORKLENS_ENV.
///
/// Set WORKLENS_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WORKLENS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("worklens-dev")
    } else {
        base_dir.join("worklens")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
