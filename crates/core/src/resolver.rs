//! Signed-URL resolution
//!
//! The media host only serves files through short-lived signed URLs. The
//! signing service is a plain HTTP endpoint: `GET <SIGNED_URL_API><raw_url>`
//! answers `{"url": "<signed>"}` with status 200.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::error::{error_chain, AppError};

/// Why a raw URL could not be turned into a signed one.
///
/// A non-200 status and a 200 without a usable `url` field are both
/// "not received"; the batch reports them the same way.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Signed URL not received: signing API returned HTTP {0}")]
    Status(StatusCode),

    #[error("Signed URL not received: response has no \"url\" field")]
    MissingUrl,

    #[error("Signed URL fetch failed: invalid response body: {0}")]
    InvalidBody(String),

    #[error("Signed URL fetch failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        ResolveError::Transport(error_chain(&err))
    }
}

/// Turns a raw URL into a signed download URL.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    async fn resolve(&self, raw_url: &str) -> Result<String, ResolveError>;
}

/// [`UrlResolver`] backed by the remote signing API.
///
/// No timeout and no retry: a hanging signing call blocks that user's batch.
pub struct SigningApiResolver {
    client: reqwest::Client,
    api_base: String,
}

impl SigningApiResolver {
    pub fn new(api_base: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, api_base))
    }

    pub fn with_client(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    /// The raw URL is appended as-is, the endpoint prefix is expected to end
    /// with something like `?url=`.
    pub fn request_url(&self, raw_url: &str) -> String {
        format!("{}{}", self.api_base, raw_url)
    }
}

#[async_trait]
impl UrlResolver for SigningApiResolver {
    async fn resolve(&self, raw_url: &str) -> Result<String, ResolveError> {
        let request_url = self.request_url(raw_url);
        log::debug!("Requesting signed URL for {}", raw_url);

        let response = self.client.get(&request_url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("Signing API answered {} for {}", status, raw_url);
            return Err(ResolveError::Status(status));
        }

        let body = response.text().await?;
        extract_signed_url(&body)
    }
}

/// Pulls the `url` string out of a signing API response body.
///
/// A missing, non-string or empty `url` is [`ResolveError::MissingUrl`].
pub fn extract_signed_url(body: &str) -> Result<String, ResolveError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ResolveError::InvalidBody(e.to_string()))?;

    json.get("url")
        .and_then(serde_json::Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or(ResolveError::MissingUrl)
}
