//! CLI command handlers, one per file.

mod config;
mod harvest;
mod run;
mod summary;

pub use config::run_config;
pub use harvest::run_harvest;
pub use run::run_playlists;
pub use summary::run_summary;
