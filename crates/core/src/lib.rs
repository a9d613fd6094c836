//! vidlist-core - signed-URL batch downloading without Telegram
//!
//! This library holds everything the bot does between "here is a list of
//! URLs" and "here is one status line per URL":
//!
//! # Module Structure
//!
//! - `config`: process-wide configuration read once at startup
//! - `error`: the `AppError` enum shared by every layer
//! - `logging`: logger initialization and startup diagnostics
//! - `resolver`: raw URL -> signed URL via the signing API
//! - `ytdlp`: yt-dlp invocation with the fixed request headers
//! - `workspace`: per-user directories and URL list parsing
//! - `batch`: the sequential resolve + download loop

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod workspace;
pub mod ytdlp;

// Re-export commonly used types for convenience
pub use batch::{BatchRunner, ItemReport, StatusSink};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use resolver::{ResolveError, SigningApiResolver, UrlResolver};
pub use workspace::{UrlList, UserWorkspace};
pub use ytdlp::{DownloadOutcome, MediaDownloader, YtDlpInvoker};
