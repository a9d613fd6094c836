//! Bot initialization and command registration
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command list shown in the Telegram UI

use std::time::Duration;

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use vidlist_core::Config;

/// Request timeout for Bot API calls (long polling plus file downloads)
const BOT_API_TIMEOUT: Duration = Duration::from_secs(900);

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "how to use the bot")]
    Start,
    #[command(description = "list commands")]
    Help,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token, invalid BOT_API_URL or HTTP client failure
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let token = config.require_bot_token()?;
    let client = ClientBuilder::new().timeout(BOT_API_TIMEOUT).build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    let bot = if let Some(bot_api_url) = &config.bot_api_url {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = Command::bot_commands();
    bot.set_my_commands(commands).await?;
    Ok(())
}
