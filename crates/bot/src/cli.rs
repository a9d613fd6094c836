use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vidlist")]
#[command(author, version, about = "Telegram bot that downloads lists of videos via signed URLs and yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Process a local URL list without Telegram, printing one status line per URL
    Batch {
        /// Text file with one URL per line
        file: PathBuf,

        /// Workspace name under DOWNLOAD_FOLDER
        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// Print the effective configuration and the yt-dlp version
    Check,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
