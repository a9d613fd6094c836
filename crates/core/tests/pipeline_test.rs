//! End-to-end tests for the resolve + download pipeline
//!
//! The signing API is a wiremock server and yt-dlp is replaced by a small
//! shell script, so these run without network access or yt-dlp installed.
//!
//! Run with: cargo test -p vidlist-core --test pipeline_test

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidlist_core::ytdlp::DownloadHeaders;
use vidlist_core::{
    AppResult, BatchRunner, MediaDownloader, SigningApiResolver, StatusSink, UrlList, UserWorkspace, YtDlpInvoker,
};

/// Records its arguments, fails for URLs containing "fail", otherwise writes the output file.
const FAKE_YTDLP: &str = r#"#!/bin/sh
printf '%s\n' "$@" >> "$(dirname "$0")/calls.log"
case "$9" in
  *fail*) echo "ERROR: [generic] HTTP Error 403: Forbidden" >&2; exit 1 ;;
esac
echo "fake video" > "$8"
"#;

fn install_fake_ytdlp(dir: &Path) -> PathBuf {
    let script = dir.join("fake-yt-dlp");
    std::fs::write(&script, FAKE_YTDLP).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn headers() -> DownloadHeaders {
    DownloadHeaders {
        authorization: SecretString::from("Bearer integration".to_string()),
        user_agent: "vidlist-tests/1.0".to_string(),
        referer: "https://referer.example/".to_string(),
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<String>>);

#[async_trait]
impl StatusSink for RecordingSink {
    async fn report(&self, text: String) -> AppResult<()> {
        self.0.lock().unwrap().push(text);
        Ok(())
    }
}

#[tokio::test]
async fn test_invoker_passes_headers_and_output() {
    let bin_dir = TempDir::new().unwrap();
    let script = install_fake_ytdlp(bin_dir.path());
    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("video_1.mp4");

    let invoker = YtDlpInvoker::new(script.to_string_lossy(), headers());
    let outcome = invoker.download("https://cdn/signed/ok", &output).await.unwrap();

    assert!(outcome.success());
    assert!(output.exists());

    let calls = std::fs::read_to_string(bin_dir.path().join("calls.log")).unwrap();
    assert_eq!(
        calls.lines().collect::<Vec<_>>(),
        vec![
            "--add-header",
            "Authorization: Bearer integration",
            "--add-header",
            "User-Agent: vidlist-tests/1.0",
            "--add-header",
            "Referer: https://referer.example/",
            "-o",
            output.to_str().unwrap(),
            "https://cdn/signed/ok",
        ]
    );
}

#[tokio::test]
async fn test_invoker_non_zero_exit_is_data() {
    let bin_dir = TempDir::new().unwrap();
    let script = install_fake_ytdlp(bin_dir.path());
    let out_dir = TempDir::new().unwrap();

    let invoker = YtDlpInvoker::new(script.to_string_lossy(), headers());
    let outcome = invoker
        .download("https://cdn/signed/fail", &out_dir.path().join("video_1.mp4"))
        .await
        .unwrap();

    assert_eq!(outcome.exit_code, Some(1));
    assert!(outcome.stderr.contains("HTTP Error 403"));
}

#[tokio::test]
async fn test_full_batch_against_mock_signing_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sign"))
        .and(query_param("u", "https://host/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"url": "https://cdn/signed/a"}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sign"))
        .and(query_param("u", "https://host/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sign"))
        .and(query_param("u", "https://host/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"url": "https://cdn/signed/fail-c"}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sign"))
        .and(query_param("u", "https://host/d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"expires": 30}"#))
        .mount(&server)
        .await;

    let bin_dir = TempDir::new().unwrap();
    let script = install_fake_ytdlp(bin_dir.path());
    let base = TempDir::new().unwrap();
    let workspace = UserWorkspace::for_user(base.path(), 555);
    workspace.ensure().await.unwrap();

    let resolver = Arc::new(SigningApiResolver::new(format!("{}/sign?u=", server.uri())).unwrap());
    let downloader: Arc<dyn MediaDownloader> = Arc::new(YtDlpInvoker::new(script.to_string_lossy(), headers()));
    let runner = BatchRunner::new(resolver, downloader);
    let sink = RecordingSink::default();

    let urls = UrlList::parse("https://host/a\n\n  https://host/b  \nhttps://host/c\nhttps://host/d\n");
    runner.run(&urls, &workspace, &sink).await;

    let messages = sink.0.lock().unwrap().clone();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0], "✅ Video 1 downloaded successfully.");
    assert!(messages[1].starts_with("❌ Error with video 2:\n"));
    assert!(messages[1].contains("500"));
    assert!(messages[2].starts_with("⚠️ Video 3 failed.\nError:\n"));
    assert!(messages[2].contains("HTTP Error 403"));
    assert!(messages[3].starts_with("❌ Error with video 4:\n"));

    assert!(workspace.output_path(1).exists());
    assert!(!workspace.output_path(2).exists());
    assert!(!workspace.output_path(3).exists());
}
