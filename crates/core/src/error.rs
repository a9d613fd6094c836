use thiserror::Error;

use crate::resolver::ResolveError;

/// Centralized error types for the application
///
/// Every fallible operation in the core library returns this enum so the bot
/// and the CLI can surface errors the same way. Resolution failures keep their
/// own [`ResolveError`] so callers can tell them apart; a non-zero yt-dlp exit
/// is deliberately *not* an error (see [`crate::ytdlp::DownloadOutcome`]).
///
/// # Example
///
/// ```no_run
/// use vidlist_core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Signing API failures
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// yt-dlp could not be started or awaited
    #[error("Download error: {0}")]
    Download(String),

    /// HTTP client errors outside of URL resolution
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Telegram API errors
    #[cfg(feature = "telegram")]
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Renders an error together with its `source()` chain, outermost first.
///
/// reqwest keeps the interesting part ("connection refused", "dns error")
/// in the source chain rather than in its own `Display`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "error sending request")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection refused")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    impl std::error::Error for Inner {}

    #[test]
    fn test_error_chain_appends_causes() {
        assert_eq!(error_chain(&Outer(Inner)), "error sending request: connection refused");
    }

    #[test]
    fn test_error_chain_without_source() {
        assert_eq!(error_chain(&Inner), "connection refused");
    }

    #[test]
    fn test_resolve_error_is_transparent() {
        let err: AppError = ResolveError::MissingUrl.into();
        assert_eq!(err.to_string(), ResolveError::MissingUrl.to_string());
    }
}
