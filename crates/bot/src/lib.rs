//! vidlist - Telegram front end for batch downloads
//!
//! # Module Structure
//!
//! - `bot`: command enum, bot construction, command registration
//! - `handlers`: dispatcher schema and the /start and upload handlers
//! - `sink`: where per-item status lines go (a chat or stdout)
//! - `cli`: command-line interface

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod bot;
pub mod cli;
pub mod handlers;
pub mod sink;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use sink::{ChatSink, StdoutSink};
