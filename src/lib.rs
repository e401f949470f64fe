//! # rytinfo - stream info resolver
//!
//! Resolves video metadata and playable stream URLs from a watch page,
//! including streams whose URL is withheld behind a signature cipher.
//!
//! ## Features
//!
//! - Video ID extraction from short links, watch, embed and legacy URLs
//! - Embedded player response extraction
//! - Signature cipher deciphering without evaluating player script code
//! - Injectable HTTP transport
//!
//! ## Example
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let info = rytinfo::get_info("https://youtu.be/dQw4w9WgXcQ").await?;
//!     for stream in &info.formats {
//!         println!("{:?} {:?}", stream.itag(), stream.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod platform;
pub mod utils;

// Re-export main types
pub use crate::core::{get_info, ExtractorConfig, InfoExtractor, Stream, VideoInfo};
pub use error::InfoError;
pub use platform::{ClientConfig, Decoder, Fetcher, HttpFetcher};
pub use utils::url::{get_video_id, IdOptions};

/// Result type alias for rytinfo operations
pub type Result<T> = std::result::Result<T, InfoError>;
