//! Command handler implementations (/start, /help)

use teloxide::prelude::*;
use teloxide::types::Message;
use teloxide::utils::command::BotCommands;

use super::types::HandlerError;
use crate::bot::Command;

/// Reply to /start
pub const WELCOME_TEXT: &str = "👋 Welcome!\nSend me a .txt file with video URLs (one per line). I will download them with headers and signed URLs.";

pub(super) async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> Result<(), HandlerError> {
    log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
    }

    Ok(())
}
