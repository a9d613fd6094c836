//! Per-user workspaces and URL list parsing
//!
//! Each user gets `<DOWNLOAD_FOLDER>/<user_id>`. The uploaded list and every
//! `video_<n>.mp4` land there; nothing is ever cleaned up automatically.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::AppResult;

/// Suffix an uploaded file name must carry (case-sensitive)
pub const URL_LIST_SUFFIX: &str = ".txt";

/// `true` if an uploaded file name is accepted as a URL list.
pub fn is_url_list_name(file_name: &str) -> bool {
    file_name.ends_with(URL_LIST_SUFFIX)
}

/// Output file name for the 1-based item `index`.
pub fn output_file_name(index: usize) -> String {
    format!("video_{}.mp4", index)
}

/// Creates the base download folder if absent.
pub async fn ensure_base_folder(path: &Path) -> AppResult<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

/// Directory owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWorkspace {
    root: PathBuf,
}

impl UserWorkspace {
    /// Workspaces are keyed by user id, so two users never share one.
    pub fn for_user(base: &Path, user_id: impl Display) -> Self {
        Self {
            root: base.join(user_id.to_string()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if it does not exist yet.
    pub async fn ensure(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Where an upload named `file_name` is saved.
    ///
    /// Only the final path component is kept; `None` if nothing usable is left.
    pub fn upload_path(&self, file_name: &str) -> Option<PathBuf> {
        let name = Path::new(file_name).file_name()?;
        Some(self.root.join(name))
    }

    pub fn output_path(&self, index: usize) -> PathBuf {
        self.root.join(output_file_name(index))
    }
}

/// Ordered URLs from one uploaded list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlList(Vec<String>);

impl UrlList {
    /// One URL per line; lines are trimmed and blank ones dropped.
    ///
    /// `\n`, `\r\n` and a lone `\r` all end a line.
    pub fn parse(text: &str) -> Self {
        Self(
            text.split(['\n', '\r'])
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Reads and parses a saved list. Invalid UTF-8 is replaced, not rejected.
    pub async fn read_from(path: &Path) -> AppResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// `(1-based index, url)` pairs in input order.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.iter().enumerate().map(|(i, url)| (i + 1, url))
    }
}
