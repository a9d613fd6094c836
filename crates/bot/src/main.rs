use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;

use vidlist::cli::{Cli, Commands};
use vidlist::handlers::NO_URLS_TEXT;
use vidlist::{create_bot, schema, setup_bot_commands, HandlerDeps, StdoutSink};
use vidlist_core::config::{self, Config};
use vidlist_core::logging::{init_logger, log_startup_configuration};
use vidlist_core::workspace::ensure_base_folder;
use vidlist_core::{ytdlp, BatchRunner, SigningApiResolver, UrlList, UserWorkspace, YtDlpInvoker};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present; LOG_FILE_PATH may live there
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::log_file_path())?;

    let config = Arc::new(Config::from_env()?);

    match cli.command {
        Some(Commands::Run) | None => run_bot(config).await,
        Some(Commands::Batch { file, user }) => run_batch(config, file, user).await,
        Some(Commands::Check) => run_check(config).await,
    }
}

/// Wires the signing API resolver and yt-dlp into a batch runner
fn build_runner(config: &Config) -> Result<BatchRunner> {
    let resolver = Arc::new(SigningApiResolver::new(config.signed_url_api.clone())?);
    let downloader = Arc::new(YtDlpInvoker::from_config(config));
    Ok(BatchRunner::new(resolver, downloader))
}

/// Runs the bot in long polling mode until Ctrl-C
async fn run_bot(config: Arc<Config>) -> Result<()> {
    log_startup_configuration(&config);
    ensure_base_folder(&config.download_folder).await?;
    ytdlp::probe_version(&config.ytdl_bin).await;

    let bot = create_bot(&config)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let runner = build_runner(&config)?;
    let handler = schema(HandlerDeps::new(Arc::clone(&config), runner));

    log::info!("🤖 Bot is running...");

    Dispatcher::builder(bot, handler)
        .default_handler(|upd| async move {
            log::debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Processes a local URL list with the same pipeline the bot uses
async fn run_batch(config: Arc<Config>, file: PathBuf, user: String) -> Result<()> {
    ensure_base_folder(&config.download_folder).await?;

    let urls = UrlList::read_from(&file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    if urls.is_empty() {
        println!("{}", NO_URLS_TEXT);
        return Ok(());
    }

    let workspace = UserWorkspace::for_user(&config.download_folder, &user);
    workspace.ensure().await?;

    log::info!("Processing {} URL(s) from {}", urls.len(), file.display());
    build_runner(&config)?.run(&urls, &workspace, &StdoutSink).await;

    Ok(())
}

/// Prints the effective configuration and the yt-dlp version
async fn run_check(config: Arc<Config>) -> Result<()> {
    for (name, value) in config.summary() {
        println!("{:<20} {}", name, value);
    }

    match ytdlp::probe_version(&config.ytdl_bin).await {
        Some(version) => println!("{:<20} {}", "yt-dlp version", version),
        None => println!("{:<20} unavailable ({})", "yt-dlp version", config.ytdl_bin),
    }

    Ok(())
}
