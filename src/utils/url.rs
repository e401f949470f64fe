//! URL utilities for extracting video IDs from video platform URLs

use crate::error::InfoError;
use regex::Regex;
use tracing::{debug, warn};

/// Known positional patterns, tried in priority order
const ID_PATTERNS: [&str; 5] = [
    r"youtu\.be/([^#&?]{11})", // youtu.be/<id>
    r"\?v=([^#&?]{11})",       // ?v=<id>
    r"&v=([^#&?]{11})",        // &v=<id>
    r"embed/([^#&?]{11})",     // embed/<id>
    r"/v/([^#&?]{11})",        // /v/<id>
];

/// Options for video ID resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdOptions {
    /// Fall back to delimiter splitting when no known pattern matches
    pub fuzzy: bool,
    /// Reject URLs that do not mention the platform host
    pub host_check: bool,
}

impl Default for IdOptions {
    fn default() -> Self {
        Self {
            fuzzy: true,
            host_check: true,
        }
    }
}

impl IdOptions {
    /// Enable or disable fuzzy fallback
    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Enable or disable the host check
    pub fn with_host_check(mut self, host_check: bool) -> Self {
        self.host_check = host_check;
        self
    }
}

/// Extract the 11-character video ID using default options
pub fn get_video_id(url: &str) -> Option<String> {
    get_video_id_with(url, IdOptions::default())
}

/// Extract the 11-character video ID from various URL formats.
///
/// Never fails: unsupported URLs resolve to `None`.
pub fn get_video_id_with(url: &str, options: IdOptions) -> Option<String> {
    match resolve_video_id(url, options) {
        Ok(id) => id,
        Err(e) => {
            warn!("Video ID resolution failed for {}: {}", url, e);
            None
        }
    }
}

fn resolve_video_id(url: &str, options: IdOptions) -> Result<Option<String>, InfoError> {
    if options.host_check && !Regex::new(r"youtu\.?be")?.is_match(url) {
        debug!("Not a supported video platform URL: {}", url);
        return Ok(None);
    }

    for pattern in ID_PATTERNS {
        let regex = Regex::new(pattern)?;
        if let Some(id) = regex.captures(url).and_then(|c| c.get(1)) {
            return Ok(Some(id.as_str().to_string()));
        }
    }

    if options.fuzzy {
        let delimiters = Regex::new(r"[/&?=#.\s]")?;
        let token = Regex::new(r"^[^#&?]{11}$")?;
        let id = delimiters
            .split(url)
            .find(|t| token.is_match(t))
            .map(str::to_string);
        if let Some(id) = id {
            debug!("Fuzzy match for video ID: {}", id);
            return Ok(Some(id));
        }
    }

    Ok(None)
}
