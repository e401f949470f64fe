//! Player response and result structures

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Embedded player configuration of a watch page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerResponse {
    /// Arbitrary video metadata
    #[serde(rename = "videoDetails", default)]
    pub video_details: Option<Map<String, Value>>,
    /// Stream lists
    #[serde(rename = "streamingData", default)]
    pub streaming_data: Option<StreamingData>,
}

/// Stream lists of a player response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamingData {
    /// Progressive streams (video+audio combined)
    #[serde(default)]
    pub formats: Vec<Stream>,
    /// Adaptive streams (video or audio only)
    #[serde(rename = "adaptiveFormats", default)]
    pub adaptive_formats: Vec<Stream>,
}

/// A single media stream.
///
/// Only `url` and `signatureCipher` are interpreted; every other key is kept
/// verbatim in `extra` and written back on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    /// Direct stream URL
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    /// Query-string encoded cipher payload (`s`, `sp`, `url`)
    #[serde(
        rename = "signatureCipher",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub signature_cipher: Option<String>,
    /// Passthrough metadata (itag, bitrate, codecs, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stream {
    /// Create a stream with a direct URL
    pub fn with_url(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    /// Create a cipher-protected stream
    pub fn with_cipher(payload: &str) -> Self {
        Self {
            signature_cipher: Some(payload.to_string()),
            ..Default::default()
        }
    }

    /// Check if stream URL is withheld behind a signature cipher
    pub fn is_cipher_protected(&self) -> bool {
        self.url.is_none() && self.signature_cipher.is_some()
    }

    /// Check if stream has a usable URL
    pub fn is_resolved(&self) -> bool {
        self.url.is_some()
    }

    /// Format ID (itag)
    pub fn itag(&self) -> Option<u64> {
        self.extra.get("itag").and_then(Value::as_u64)
    }

    /// MIME type including codecs
    pub fn mime_type(&self) -> Option<&str> {
        self.extra.get("mimeType").and_then(Value::as_str)
    }

    /// Bitrate in bits per second
    pub fn bitrate(&self) -> Option<u64> {
        self.extra.get("bitrate").and_then(Value::as_u64)
    }
}

/// Normalized extraction result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Video metadata as found in the page
    #[serde(rename = "videoDetails")]
    pub video_details: Map<String, Value>,
    /// Streams with resolved URLs, progressive first
    pub formats: Vec<Stream>,
}

impl VideoInfo {
    /// Video ID reported by the page
    pub fn video_id(&self) -> Option<&str> {
        self.video_details.get("videoId").and_then(Value::as_str)
    }

    /// Video title
    pub fn title(&self) -> Option<&str> {
        self.video_details.get("title").and_then(Value::as_str)
    }

    /// Check if no playable stream was found
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
