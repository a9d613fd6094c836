use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::process::Command;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Exit status and error output of one yt-dlp run.
///
/// A non-zero exit is data for the caller to report, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl DownloadOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Downloads a signed URL into a file.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Returns `Err` only when the downloader could not be run at all.
    async fn download(&self, signed_url: &str, output: &Path) -> AppResult<DownloadOutcome>;
}

/// The three headers the media host checks on every request.
#[derive(Debug)]
pub struct DownloadHeaders {
    pub authorization: SecretString,
    pub user_agent: String,
    pub referer: String,
}

impl DownloadHeaders {
    pub fn from_config(config: &Config) -> Self {
        Self {
            authorization: SecretString::from(config.authorization_token.expose_secret().to_string()),
            user_agent: config.user_agent.clone(),
            referer: config.referer.clone(),
        }
    }
}

/// [`MediaDownloader`] that shells out to yt-dlp.
///
/// The child is awaited without a timeout.
#[derive(Debug)]
pub struct YtDlpInvoker {
    bin: String,
    headers: DownloadHeaders,
}

impl YtDlpInvoker {
    pub fn new(bin: impl Into<String>, headers: DownloadHeaders) -> Self {
        Self {
            bin: bin.into(),
            headers,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ytdl_bin.clone(), DownloadHeaders::from_config(config))
    }

    /// Full argument list, headers first, URL last.
    pub fn build_args(&self, signed_url: &str, output: &Path) -> Vec<OsString> {
        vec![
            "--add-header".into(),
            format!("Authorization: {}", self.headers.authorization.expose_secret()).into(),
            "--add-header".into(),
            format!("User-Agent: {}", self.headers.user_agent).into(),
            "--add-header".into(),
            format!("Referer: {}", self.headers.referer).into(),
            "-o".into(),
            output.as_os_str().to_owned(),
            signed_url.into(),
        ]
    }
}

#[async_trait]
impl MediaDownloader for YtDlpInvoker {
    async fn download(&self, signed_url: &str, output: &Path) -> AppResult<DownloadOutcome> {
        log::info!("Running {} -> {}", self.bin, output.display());

        let result = Command::new(&self.bin)
            .args(self.build_args(signed_url, output))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::Download(format!("Failed to execute {}: {}", self.bin, e)))?;

        let outcome = DownloadOutcome {
            exit_code: result.status.code(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        };

        if outcome.success() {
            log::info!("{} finished: {}", self.bin, output.display());
        } else {
            log::warn!(
                "{} exited with {:?} for {}",
                self.bin,
                outcome.exit_code,
                output.display()
            );
        }

        Ok(outcome)
    }
}

/// Logs the installed yt-dlp version at startup.
///
/// Returns the version string, or `None` if the binary could not be run.
/// Never fatal: a missing binary only shows up later as per-item errors.
pub async fn probe_version(bin: &str) -> Option<String> {
    match Command::new(bin).arg("--version").output().await {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::info!("{} version: {}", bin, version);
            Some(version)
        }
        Ok(output) => {
            log::warn!(
                "{} --version exited with {:?}: {}",
                bin,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            None
        }
        Err(e) => {
            log::warn!("Failed to get {} version: {}. Downloads will fail until it is installed.", bin, e);
            None
        }
    }
}
