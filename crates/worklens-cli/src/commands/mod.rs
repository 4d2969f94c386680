//! CLI command implementations.

pub mod activity;
pub mod config;
pub mod insight;
pub mod item;
pub mod load;
pub mod recommend;
pub mod thread;

use worklens_core::Config;

/// The user a command acts for: the --user flag when given, otherwise
/// the configured default.
pub(crate) fn resolve_user(flag: Option<String>) -> String {
    flag.unwrap_or_else(|| Config::load_or_default().user)
}
