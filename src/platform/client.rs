//! HTTP transport for watch pages and player scripts

use crate::error::InfoError;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default origin of watch pages and player scripts
pub const DEFAULT_ORIGIN: &str = "https://www.youtube.com";

/// Marker the platform puts into pages it refuses to serve
const ERROR_MARKER: &str = "errorcode";

/// Transport seam: anything that can GET a URL and return its body
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform a GET with optional query parameters and return the body
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<String, InfoError>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: Option<String>,
    /// Proxy URL
    pub proxy_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: None,
            proxy_url: None,
        }
    }
}

impl ClientConfig {
    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    /// Set proxy URL
    pub fn with_proxy(mut self, proxy_url: &str) -> Self {
        self.proxy_url = Some(proxy_url.to_string());
        self
    }
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self, InfoError> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a fetcher with custom configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self, InfoError> {
        let mut builder = ClientBuilder::new()
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        } else {
            builder = builder.user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            );
        }

        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<String, InfoError> {
        debug!("GET {} {:?}", url, params);
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Fetches watch pages and player scripts, rejecting unusable bodies
pub struct PageFetcher<'a> {
    fetcher: &'a dyn Fetcher,
    origin: &'a str,
}

impl<'a> PageFetcher<'a> {
    /// Wrap a fetcher; relative script paths resolve against `origin`
    pub fn new(fetcher: &'a dyn Fetcher, origin: &'a str) -> Self {
        Self { fetcher, origin }
    }

    /// Fetch a watch page
    pub async fn page(&self, url: &str, params: &[(&str, &str)]) -> Result<String, InfoError> {
        let body = self.fetcher.get(url, params).await?;

        if body.is_empty() {
            warn!("Empty page body from {}", url);
            return Err(InfoError::Unavailable("empty page body".to_string()));
        }
        if body.contains(ERROR_MARKER) {
            warn!("Page from {} carries an error marker", url);
            return Err(InfoError::Unavailable("page reports an error".to_string()));
        }

        Ok(body)
    }

    /// Fetch a player script by absolute URL or origin-relative path
    pub async fn script(&self, path: &str) -> Result<String, InfoError> {
        let url = Url::parse(self.origin)?.join(path)?;
        let body = self.fetcher.get(url.as_str(), &[]).await?;

        if body.is_empty() {
            warn!("Empty script body from {}", url);
            return Err(InfoError::Unavailable("empty script body".to_string()));
        }

        Ok(body)
    }
}
