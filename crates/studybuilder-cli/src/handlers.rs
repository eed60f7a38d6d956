//! Command handlers for CLI subcommands
//!
//! Handlers that talk to the backend receive a ready [`Gateway`]; `config`
//! and `completions` work offline.
//!
//! [`Gateway`]: studybuilder_core::Gateway

mod completions;
mod config;
mod crfs;
mod get;
mod suppliers;
mod utils;

pub use completions::handle_completions;
pub use config::handle_config;
pub use crfs::handle_crfs;
pub use get::handle_get;
pub use suppliers::handle_suppliers;
pub use utils::{connect, Connection};
