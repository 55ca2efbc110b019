//! CLI command implementations.

mod chat;
mod config;
mod serve;

pub use chat::run_chat;
pub use config::run_config;
pub use serve::run_serve;
