//! Error types for rytinfo

use thiserror::Error;

/// Main error type for rytinfo operations
#[derive(Debug, Error)]
pub enum InfoError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Video unavailable: {0}")]
    Unavailable(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] reqwest::Error),

    #[error("Pattern not found: {0}")]
    PatternNotFound(&'static str),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Cipher error: {0}")]
    CipherError(String),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

impl InfoError {
    /// Check if a structural extraction step failed to find its pattern
    pub fn is_pattern_mismatch(&self) -> bool {
        matches!(self, InfoError::PatternNotFound(_))
    }

    /// Check if the error came from the network or an unusable response body
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, InfoError::FetchFailed(_) | InfoError::Unavailable(_))
    }

    /// Check if extracted text could not be parsed or compiled
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            InfoError::JsonError(_) | InfoError::CipherError(_) | InfoError::UrlError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(InfoError::PatternNotFound("player script path").is_pattern_mismatch());
        assert!(!InfoError::PatternNotFound("x").is_fetch_failure());

        assert!(InfoError::Unavailable("empty body".to_string()).is_fetch_failure());
        assert!(!InfoError::Unavailable("x".to_string()).is_parse_failure());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(InfoError::from(json_err).is_parse_failure());
        assert!(InfoError::CipherError("bad".to_string()).is_parse_failure());
        assert!(!InfoError::InvalidUrl("x".to_string()).is_parse_failure());
    }

    #[test]
    fn test_error_display() {
        let err = InfoError::PatternNotFound("helper object");
        assert_eq!(err.to_string(), "Pattern not found: helper object");
    }
}
