//! Status sinks for batch reports

use async_trait::async_trait;
use teloxide::prelude::*;

use vidlist_core::{AppResult, StatusSink};

/// Sends every report as a plain-text message to one chat.
pub struct ChatSink {
    bot: Bot,
    chat_id: ChatId,
}

impl ChatSink {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl StatusSink for ChatSink {
    async fn report(&self, text: String) -> AppResult<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }
}

/// Prints every report to stdout (used by `vidlist batch`).
pub struct StdoutSink;

#[async_trait]
impl StatusSink for StdoutSink {
    async fn report(&self, text: String) -> AppResult<()> {
        println!("{}", text);
        Ok(())
    }
}
