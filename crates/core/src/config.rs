//! Process-wide configuration
//!
//! Read once at startup from the environment (after `.env` has been loaded
//! by the binary) into an immutable [`Config`] that is passed explicitly to
//! every component that needs it.

use std::env;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

use crate::error::AppError;

/// Default yt-dlp binary, looked up on `PATH`
pub const DEFAULT_YTDL_BIN: &str = "yt-dlp";

/// Default base folder for per-user workspaces
pub const DEFAULT_DOWNLOAD_FOLDER: &str = "downloads";

/// Default log file path
pub const DEFAULT_LOG_FILE_PATH: &str = "vidlist.log";

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Needed before the rest of the configuration so config errors get logged.
pub fn log_file_path() -> String {
    env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE_PATH.to_string())
}

/// Immutable configuration shared by the bot, the CLI and the core components.
#[derive(Debug)]
pub struct Config {
    /// Telegram bot token (BOT_TOKEN or TELOXIDE_TOKEN). Only `run` needs it.
    pub bot_token: Option<SecretString>,
    /// Sent to the media host as `Authorization: <token>`
    pub authorization_token: SecretString,
    /// Sent to the media host as `User-Agent`
    pub user_agent: String,
    /// Sent to the media host as `Referer`
    pub referer: String,
    /// Signing endpoint prefix; the raw URL is appended verbatim
    pub signed_url_api: String,
    /// Base folder, `~` expanded
    pub download_folder: PathBuf,
    /// yt-dlp binary path
    pub ytdl_bin: String,
    /// Custom Bot API server, if any
    pub bot_api_url: Option<String>,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| AppError::Config(format!("{} is not set", key)));

        let bot_token = get("BOT_TOKEN").or_else(|| get("TELOXIDE_TOKEN")).map(SecretString::from);
        let authorization_token = SecretString::from(require("AUTHORIZATION_TOKEN")?);
        let user_agent = require("USER_AGENT")?;
        let referer = require("REFERER")?;
        let signed_url_api = require("SIGNED_URL_API")?;

        let download_folder = get("DOWNLOAD_FOLDER").unwrap_or_else(|| DEFAULT_DOWNLOAD_FOLDER.to_string());
        let download_folder = PathBuf::from(shellexpand::tilde(&download_folder).into_owned());

        Ok(Self {
            bot_token,
            authorization_token,
            user_agent,
            referer,
            signed_url_api,
            download_folder,
            ytdl_bin: get("YTDL_BIN").unwrap_or_else(|| DEFAULT_YTDL_BIN.to_string()),
            bot_api_url: get("BOT_API_URL"),
        })
    }

    /// Returns the bot token or a configuration error naming the variable.
    pub fn require_bot_token(&self) -> Result<&SecretString, AppError> {
        self.bot_token
            .as_ref()
            .ok_or_else(|| AppError::Config("BOT_TOKEN is not set".to_string()))
    }

    /// Human-readable summary with secrets redacted, one `(name, value)` per line.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("BOT_TOKEN", redact(self.bot_token.as_ref().map(|t| t.expose_secret()))),
            ("AUTHORIZATION_TOKEN", redact(Some(self.authorization_token.expose_secret()))),
            ("USER_AGENT", self.user_agent.clone()),
            ("REFERER", self.referer.clone()),
            ("SIGNED_URL_API", self.signed_url_api.clone()),
            ("DOWNLOAD_FOLDER", self.download_folder.display().to_string()),
            ("YTDL_BIN", self.ytdl_bin.clone()),
            (
                "BOT_API_URL",
                self.bot_api_url.clone().unwrap_or_else(|| "(default)".to_string()),
            ),
        ]
    }
}

fn redact(secret: Option<&str>) -> String {
    match secret {
        Some(s) => format!("set ({} chars)", s.chars().count()),
        None => "not set".to_string(),
    }
}
