//! Upload handler: `.txt` URL lists

use std::fmt::Display;
use std::path::Path;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Document, Message};
use tokio::io::AsyncWriteExt;

use super::types::{workspace_key, HandlerDeps, HandlerError};
use crate::sink::ChatSink;
use vidlist_core::workspace::is_url_list_name;
use vidlist_core::{BatchRunner, StatusSink, UrlList, UserWorkspace};

/// Reply to an upload whose name does not end in `.txt`
pub const REJECT_TEXT: &str = "❌ Please upload a .txt file only.";

/// Sent once the list is saved, before the first status line
pub const ACK_TEXT: &str = "📥 File received. Processing URLs...";

/// Reply to a list without a single non-blank line
pub const NO_URLS_TEXT: &str = "ℹ️ No URLs found in the file.";

/// Handler for document messages
pub(super) fn upload_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.document().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_upload(&bot, &msg, &deps).await }
        })
}

async fn handle_upload(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(document) = msg.document() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let file_name = document.file_name.as_deref().unwrap_or_default();

    // Nothing touches the filesystem, the network or yt-dlp before this check.
    if !is_url_list_name(file_name) {
        log::info!("📤 Rejected upload {:?} from chat {}", file_name, chat_id);
        bot.send_message(chat_id, REJECT_TEXT).await?;
        return Ok(());
    }

    let workspace = UserWorkspace::for_user(&deps.config.download_folder, workspace_key(msg));
    let Some(list_path) = workspace.upload_path(file_name) else {
        bot.send_message(chat_id, REJECT_TEXT).await?;
        return Ok(());
    };

    log::info!("📤 Receiving {:?} into {}", file_name, workspace.path().display());
    let sink = ChatSink::new(bot.clone(), chat_id);
    if let Err(e) = save_document(bot, document, &workspace, &list_path).await {
        log::error!("Failed to save upload {} for chat {}: {}", list_path.display(), chat_id, e);
        notify(&sink, read_failed_text(&e)).await;
        return Ok(());
    }

    process_saved_list(&list_path, &workspace, &deps.runner, &sink).await;
    Ok(())
}

/// Acknowledges a saved list, then runs it.
///
/// Every text goes through `sink`: the acknowledgement first, then either a
/// single read-failure or empty-list reply, or one report per URL. A failed
/// send is logged and never stops what follows.
pub(crate) async fn process_saved_list(
    list_path: &Path,
    workspace: &UserWorkspace,
    runner: &BatchRunner,
    sink: &dyn StatusSink,
) {
    notify(sink, ACK_TEXT.to_string()).await;

    let urls = match UrlList::read_from(list_path).await {
        Ok(urls) => urls,
        Err(e) => {
            log::error!("Failed to read {}: {}", list_path.display(), e);
            notify(sink, read_failed_text(&e)).await;
            return;
        }
    };

    if urls.is_empty() {
        notify(sink, NO_URLS_TEXT.to_string()).await;
        return;
    }

    runner.run(&urls, workspace, sink).await;
}

fn read_failed_text(err: &impl Display) -> String {
    format!("❌ Failed to read the uploaded file: {}", err)
}

async fn notify(sink: &dyn StatusSink, text: String) {
    if let Err(e) = sink.report(text).await {
        log::error!("Failed to send message: {}", e);
    }
}

/// Creates the workspace and stores the uploaded document at `dest`.
async fn save_document(
    bot: &Bot,
    document: &Document,
    workspace: &UserWorkspace,
    dest: &Path,
) -> Result<(), HandlerError> {
    workspace.ensure().await?;

    let file = bot.get_file(document.file.id.clone()).await?;
    let mut dst = tokio::fs::File::create(dest).await?;
    bot.download_file(&file.path, &mut dst).await?;
    dst.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use vidlist_core::{AppError, AppResult, DownloadOutcome, MediaDownloader, ResolveError, UrlResolver};

    /// Signs by prefixing; URLs containing "bad" fail.
    struct PrefixResolver;

    #[async_trait]
    impl UrlResolver for PrefixResolver {
        async fn resolve(&self, raw_url: &str) -> Result<String, ResolveError> {
            if raw_url.contains("bad") {
                return Err(ResolveError::MissingUrl);
            }
            Ok(format!("signed:{}", raw_url))
        }
    }

    #[derive(Default)]
    struct RecordingDownloader {
        outputs: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl MediaDownloader for RecordingDownloader {
        async fn download(&self, _signed_url: &str, output: &Path) -> AppResult<DownloadOutcome> {
            self.outputs.lock().unwrap().push(output.to_path_buf());
            Ok(DownloadOutcome {
                exit_code: Some(0),
                stderr: String::new(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl StatusSink for RecordingSink {
        async fn report(&self, text: String) -> AppResult<()> {
            self.messages.lock().unwrap().push(text);
            if self.fail {
                return Err(AppError::Io(std::io::Error::other("chat unavailable")));
            }
            Ok(())
        }
    }

    struct Fixture {
        _tmp: TempDir,
        workspace: UserWorkspace,
        downloader: Arc<RecordingDownloader>,
        runner: BatchRunner,
    }

    async fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let workspace = UserWorkspace::for_user(tmp.path(), 42);
        workspace.ensure().await.unwrap();
        let downloader = Arc::new(RecordingDownloader::default());
        let runner = BatchRunner::new(Arc::new(PrefixResolver), downloader.clone());
        Fixture {
            _tmp: tmp,
            workspace,
            downloader,
            runner,
        }
    }

    async fn save_list(workspace: &UserWorkspace, name: &str, body: &str) -> PathBuf {
        let path = workspace.upload_path(name).unwrap();
        tokio::fs::write(&path, body).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_ack_comes_before_reports_in_order() {
        let f = fixture().await;
        let list = save_list(&f.workspace, "links.txt", "https://a/1\nhttps://bad/2\n\nhttps://c/3\n").await;
        let sink = RecordingSink::default();

        process_saved_list(&list, &f.workspace, &f.runner, &sink).await;

        let messages = sink.messages.lock().unwrap().clone();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], ACK_TEXT);
        assert_eq!(messages[1], "✅ Video 1 downloaded successfully.");
        assert!(messages[2].starts_with("❌ Error with video 2:\n"));
        assert_eq!(messages[3], "✅ Video 3 downloaded successfully.");

        let outputs = f.downloader.outputs.lock().unwrap().clone();
        assert_eq!(outputs, vec![f.workspace.output_path(1), f.workspace.output_path(3)]);
        assert!(list.starts_with(f.workspace.path()));
        assert!(list.ends_with("links.txt"));
    }

    #[tokio::test]
    async fn test_empty_list_gets_ack_and_no_urls_reply() {
        let f = fixture().await;
        let list = save_list(&f.workspace, "empty.txt", "\n   \n\t\n").await;
        let sink = RecordingSink::default();

        process_saved_list(&list, &f.workspace, &f.runner, &sink).await;

        assert_eq!(sink.messages.lock().unwrap().clone(), vec![ACK_TEXT, NO_URLS_TEXT]);
        assert!(f.downloader.outputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_list_gets_failure_reply() {
        let f = fixture().await;
        let missing = f.workspace.upload_path("gone.txt").unwrap();
        let sink = RecordingSink::default();

        process_saved_list(&missing, &f.workspace, &f.runner, &sink).await;

        let messages = sink.messages.lock().unwrap().clone();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ACK_TEXT);
        assert!(messages[1].starts_with("❌ Failed to read the uploaded file: "));
        assert!(f.downloader.outputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_ack_does_not_stop_batch() {
        let f = fixture().await;
        let list = save_list(&f.workspace, "links.txt", "https://a/1\nhttps://b/2").await;
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };

        process_saved_list(&list, &f.workspace, &f.runner, &sink).await;

        // Ack plus one report per URL, every send failing.
        assert_eq!(sink.messages.lock().unwrap().len(), 3);
        assert_eq!(f.downloader.outputs.lock().unwrap().len(), 2);
    }
}
