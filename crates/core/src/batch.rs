//! Sequential batch processing
//!
//! For every URL of a list, in order: resolve it, download it into the
//! user's workspace, report one status line. Nothing a single item does can
//! stop the items after it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::resolver::UrlResolver;
use crate::workspace::{UrlList, UserWorkspace};
use crate::ytdlp::MediaDownloader;

/// Maximum number of yt-dlp stderr characters shown to the user
pub const MAX_ERROR_CHARS: usize = 400;

/// Where per-item status lines go (a Telegram chat, stdout, a test recorder).
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn report(&self, text: String) -> AppResult<()>;
}

/// Outcome of one list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemReport {
    /// yt-dlp exited with 0
    Downloaded { index: usize },
    /// yt-dlp ran but exited non-zero; `stderr` already truncated
    DownloadFailed { index: usize, stderr: String },
    /// Resolution failed or yt-dlp could not be run
    Errored { index: usize, error: String },
}

impl ItemReport {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemReport::Downloaded { .. })
    }

    /// Text sent to the user.
    pub fn message(&self) -> String {
        match self {
            ItemReport::Downloaded { index } => format!("✅ Video {} downloaded successfully.", index),
            ItemReport::DownloadFailed { index, stderr } => {
                format!("⚠️ Video {} failed.\nError:\n{}", index, stderr)
            }
            ItemReport::Errored { index, error } => format!("❌ Error with video {}:\n{}", index, error),
        }
    }
}

/// First `max` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Resolves and downloads the URLs of one list, strictly one after another.
#[derive(Clone)]
pub struct BatchRunner {
    resolver: Arc<dyn UrlResolver>,
    downloader: Arc<dyn MediaDownloader>,
}

impl BatchRunner {
    pub fn new(resolver: Arc<dyn UrlResolver>, downloader: Arc<dyn MediaDownloader>) -> Self {
        Self { resolver, downloader }
    }

    /// Processes every URL and reports each outcome to `sink`.
    ///
    /// Emits exactly `urls.len()` reports in input order. A sink failure is
    /// logged and does not stop the batch.
    pub async fn run(&self, urls: &UrlList, workspace: &UserWorkspace, sink: &dyn StatusSink) {
        log::info!(
            "Starting batch of {} URL(s) in {}",
            urls.len(),
            workspace.path().display()
        );

        let mut downloaded = 0;
        for (index, raw_url) in urls.numbered() {
            let report = self.process_item(index, raw_url, workspace).await;
            if report.is_success() {
                downloaded += 1;
            }

            if let Err(e) = sink.report(report.message()).await {
                log::error!("Failed to report status of video {}: {}", index, e);
            }
        }

        log::info!(
            "Batch finished in {}: {}/{} downloaded",
            workspace.path().display(),
            downloaded,
            urls.len()
        );
    }

    async fn process_item(&self, index: usize, raw_url: &str, workspace: &UserWorkspace) -> ItemReport {
        let signed_url = match self.resolver.resolve(raw_url).await {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Video {}: {}", index, e);
                return ItemReport::Errored {
                    index,
                    error: e.to_string(),
                };
            }
        };

        let output = workspace.output_path(index);
        match self.downloader.download(&signed_url, &output).await {
            Ok(outcome) if outcome.success() => {
                log::info!("Video {} downloaded to {}", index, output.display());
                ItemReport::Downloaded { index }
            }
            Ok(outcome) => ItemReport::DownloadFailed {
                index,
                stderr: truncate_chars(&outcome.stderr, MAX_ERROR_CHARS).to_string(),
            },
            Err(e) => {
                log::error!("Video {}: {}", index, e);
                ItemReport::Errored {
                    index,
                    error: e.to_string(),
                }
            }
        }
    }
}
