//! Video info extraction pipeline

use crate::core::video_info::VideoInfo;
use crate::error::InfoError;
use crate::platform::cipher::CipherDecoderBuilder;
use crate::platform::client::{ClientConfig, Fetcher, HttpFetcher, PageFetcher, DEFAULT_ORIGIN};
use crate::platform::player_response::parse_player_response;
use crate::platform::streams::{has_cipher_streams, normalize_streams};
use crate::utils::url::{get_video_id_with, IdOptions};
use tracing::{debug, info, warn};

/// Extractor configuration
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Origin serving watch pages and player scripts
    pub origin: String,
    /// Video ID resolution options
    pub id_options: IdOptions,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            id_options: IdOptions::default(),
        }
    }
}

impl ExtractorConfig {
    /// Set origin
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.trim_end_matches('/').to_string();
        self
    }

    /// Set video ID resolution options
    pub fn with_id_options(mut self, id_options: IdOptions) -> Self {
        self.id_options = id_options;
        self
    }
}

/// Resolves video metadata and playable streams for a page URL.
///
/// Holds no per-request state, so one extractor can serve concurrent calls;
/// every call builds its own decoder.
pub struct InfoExtractor<F: Fetcher> {
    fetcher: F,
    config: ExtractorConfig,
}

impl InfoExtractor<HttpFetcher> {
    /// Create an extractor backed by a default HTTP client
    pub fn new() -> Result<Self, InfoError> {
        Ok(Self::with_fetcher(HttpFetcher::new()?))
    }

    /// Create an extractor backed by a configured HTTP client
    pub fn with_client_config(client: &ClientConfig) -> Result<Self, InfoError> {
        Ok(Self::with_fetcher(HttpFetcher::with_config(client)?))
    }
}

impl<F: Fetcher> InfoExtractor<F> {
    /// Create an extractor using a custom transport
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            config: ExtractorConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Get configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the video ID from a page URL
    pub fn get_video_id(&self, url: &str) -> Option<String> {
        get_video_id_with(url, self.config.id_options)
    }

    /// Resolve video details and streams with usable URLs
    pub async fn get_info(&self, url: &str) -> Result<VideoInfo, InfoError> {
        let video_id = self
            .get_video_id(url)
            .ok_or_else(|| InfoError::InvalidUrl(url.to_string()))?;
        info!("Fetching info for video ID: {}", video_id);

        let pages = PageFetcher::new(&self.fetcher, &self.config.origin);
        let watch_url = format!("{}/watch", self.config.origin);
        let html = pages.page(&watch_url, &[("v", video_id.as_str())]).await?;

        let response = parse_player_response(&html)?;
        let streaming = response.streaming_data.unwrap_or_default();

        let decoder = if has_cipher_streams(&streaming) {
            match CipherDecoderBuilder::new(&pages).build(&html).await {
                Ok(decoder) => Some(decoder),
                Err(e) => {
                    warn!("Signature decoder unavailable, cipher streams dropped: {}", e);
                    None
                }
            }
        } else {
            debug!("No cipher-protected streams");
            None
        };

        let formats = normalize_streams(streaming, decoder.as_ref());
        info!("Resolved {} streams for {}", formats.len(), video_id);

        Ok(VideoInfo {
            video_details: response.video_details.unwrap_or_default(),
            formats,
        })
    }
}

/// Resolve video info with a default HTTP client
pub async fn get_info(url: &str) -> Result<VideoInfo, InfoError> {
    InfoExtractor::new()?.get_info(url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::cipher::tests::{PLAYER_JS, SCRIPT_PATH};
    use crate::platform::client::tests::FakeFetcher;

    const ORIGIN: &str = "https://site.test";
    const WATCH: &str = "https://site.test/watch";

    fn watch_page(player_response: &str) -> String {
        format!(
            r#"<html><script src="{}"></script><script>var ytInitialPlayerResponse = {};var meta = document.createElement('meta');</script></html>"#,
            SCRIPT_PATH, player_response
        )
    }

    const MIXED_RESPONSE: &str = r#"{"videoDetails":{"videoId":"dQw4w9WgXcQ","title":"Test Video"},"streamingData":{"formats":[{"itag":18,"url":"https://media.example/18"}],"adaptiveFormats":[{"itag":137,"signatureCipher":"s=abcdefgh&sp=sig&url=https%3A%2F%2Fmedia.example%2Fvideoplayback%3Fitag%3D137"}]}}"#;

    fn build_extractor(fake: FakeFetcher) -> InfoExtractor<FakeFetcher> {
        InfoExtractor::with_fetcher(fake).with_config(ExtractorConfig::default().with_origin(ORIGIN))
    }

    #[tokio::test]
    async fn test_get_info_resolves_cipher_streams() {
        let fake = FakeFetcher::default()
            .with(WATCH, &watch_page(MIXED_RESPONSE))
            .with(&format!("{}{}", ORIGIN, SCRIPT_PATH), PLAYER_JS);
        let extractor = build_extractor(fake);

        let info = extractor
            .get_info("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap();

        assert_eq!(info.title(), Some("Test Video"));
        assert_eq!(info.formats.len(), 2);
        assert_eq!(info.formats[0].url.as_deref(), Some("https://media.example/18"));

        let resolved = &info.formats[1];
        let url = resolved.url.as_deref().unwrap();
        assert!(url.starts_with("https://media.example/videoplayback?itag=137"));
        assert!(url.ends_with("&sig=efacbd"));
        assert!(resolved.signature_cipher.is_none());

        let requests = extractor.fetcher.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].1,
            vec![("v".to_string(), "dQw4w9WgXcQ".to_string())]
        );
    }

    #[tokio::test]
    async fn test_get_info_script_failure_drops_cipher_streams() {
        let fake = FakeFetcher::default().with(WATCH, &watch_page(MIXED_RESPONSE));
        let extractor = build_extractor(fake);

        let info = extractor
            .get_info("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await
            .unwrap();

        assert_eq!(info.formats.len(), 1);
        assert_eq!(info.formats[0].itag(), Some(18));
    }

    #[tokio::test]
    async fn test_get_info_skips_script_without_cipher() {
        let response = r#"{"videoDetails":{"videoId":"dQw4w9WgXcQ"},"streamingData":{"formats":[{"itag":18,"url":"https://media.example/18"}]}}"#;
        let fake = FakeFetcher::default().with(WATCH, &watch_page(response));
        let extractor = build_extractor(fake);

        let info = extractor
            .get_info("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap();
        assert_eq!(info.formats.len(), 1);
        assert_eq!(extractor.fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_get_info_missing_sections() {
        let fake = FakeFetcher::default().with(WATCH, &watch_page(r#"{"playabilityStatus":{"status":"OK"}}"#));
        let info = build_extractor(fake)
            .get_info("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap();
        assert!(info.video_details.is_empty());
        assert!(info.is_empty());
    }

    #[tokio::test]
    async fn test_get_info_invalid_url() {
        let extractor = build_extractor(FakeFetcher::default());
        let err = extractor
            .get_info("https://example.com/watch")
            .await
            .unwrap_err();
        assert!(matches!(err, InfoError::InvalidUrl(_)));
        assert_eq!(extractor.fetcher.request_count(), 0);
    }

    #[tokio::test]
    async fn test_get_info_page_unavailable() {
        let extractor = build_extractor(FakeFetcher::default());
        let err = extractor
            .get_info("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert!(err.is_fetch_failure());

        let fake = FakeFetcher::default().with(WATCH, "<div>errorcode 150</div>");
        let err = build_extractor(fake)
            .get_info("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert!(matches!(err, InfoError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_get_info_page_without_player_response() {
        let fake = FakeFetcher::default().with(WATCH, "<html>nothing here</html>");
        let err = build_extractor(fake)
            .get_info("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert!(err.is_pattern_mismatch());

        let fake = FakeFetcher::default().with(WATCH, &watch_page(r#"{"videoDetails":oops}"#));
        let err = build_extractor(fake)
            .get_info("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert!(matches!(err, InfoError::JsonError(_)));
    }

    #[test]
    fn test_get_video_id_uses_config() {
        let extractor = InfoExtractor::with_fetcher(FakeFetcher::default()).with_config(
            ExtractorConfig::default()
                .with_id_options(IdOptions::default().with_fuzzy(false)),
        );
        assert_eq!(
            extractor.get_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extractor.get_video_id("https://www.youtube.com/xx/ABCDEFGHIJK/yy"),
            None
        );
    }
}
