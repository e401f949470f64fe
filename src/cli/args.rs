//! Command line argument parsing

use crate::core::ExtractorConfig;
use crate::platform::client::{ClientConfig, DEFAULT_ORIGIN};
use crate::utils::url::IdOptions;
use clap::Parser;
use std::time::Duration;

/// RYT Info - resolve playable stream URLs and metadata for a video page
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Video page URL
    pub url: String,

    /// Print only the extracted video ID
    #[arg(long)]
    pub id_only: bool,

    /// Disable fuzzy video ID fallback
    #[arg(long)]
    pub no_fuzzy: bool,

    /// Accept URLs from any host
    #[arg(long)]
    pub no_host_check: bool,

    /// Origin serving watch pages and player scripts
    #[arg(long, value_name = "URL", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// HTTP timeout (e.g., 30s, 1m)
    #[arg(long, value_name = "DURATION", default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Override User-Agent header
    #[arg(long, value_name = "USER_AGENT")]
    pub user_agent: Option<String>,

    /// Proxy URL (http/https/socks)
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Get HTTP timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.into()
    }

    /// Build video ID resolution options
    pub fn id_options(&self) -> IdOptions {
        IdOptions::default()
            .with_fuzzy(!self.no_fuzzy)
            .with_host_check(!self.no_host_check)
    }

    /// Build HTTP client configuration
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default().with_timeout(self.timeout_duration());
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(proxy);
        }
        config
    }

    /// Build extractor configuration
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::default()
            .with_origin(&self.origin)
            .with_id_options(self.id_options())
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

impl VerbosityLevel {
    /// Default log filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "warn",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["rytinfo", "https://youtu.be/dQw4w9WgXcQ"]).unwrap();
        assert_eq!(args.url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(args.timeout_duration(), Duration::from_secs(30));
        assert_eq!(args.origin, DEFAULT_ORIGIN);
        assert_eq!(args.id_options(), IdOptions::default());
        assert_eq!(args.verbosity_level(), VerbosityLevel::Normal);
        assert!(!args.id_only);
    }

    #[test]
    fn test_args_options() {
        let args = Args::try_parse_from([
            "rytinfo",
            "--no-fuzzy",
            "--no-host-check",
            "--timeout",
            "1m",
            "--user-agent",
            "test-agent",
            "--origin",
            "https://mirror.test/",
            "-q",
            "https://example.com/x",
        ])
        .unwrap();

        let options = args.id_options();
        assert!(!options.fuzzy);
        assert!(!options.host_check);

        let client = args.client_config();
        assert_eq!(client.timeout, Duration::from_secs(60));
        assert_eq!(client.user_agent.as_deref(), Some("test-agent"));
        assert!(client.proxy_url.is_none());

        assert_eq!(args.extractor_config().origin, "https://mirror.test");
        assert_eq!(args.verbosity_level(), VerbosityLevel::Quiet);
    }

    #[test]
    fn test_verbosity_log_filter() {
        assert_eq!(VerbosityLevel::Quiet.log_filter(), "warn");
        assert_eq!(VerbosityLevel::Normal.log_filter(), "info");
        assert_eq!(VerbosityLevel::Verbose.log_filter(), "debug");
    }

    #[test]
    fn test_args_requires_url() {
        assert!(Args::try_parse_from(["rytinfo"]).is_err());
    }
}
