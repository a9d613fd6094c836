//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::Message;

use vidlist_core::{BatchRunner, Config};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub config: Arc<Config>,
    pub runner: BatchRunner,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(config: Arc<Config>, runner: BatchRunner) -> Self {
        Self { config, runner }
    }
}

/// Key of the sender's workspace: the user id, or the chat id for messages
/// without a sender (channel posts).
pub fn workspace_key(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|user| user.id.0.to_string())
        .unwrap_or_else(|| msg.chat.id.0.to_string())
}
