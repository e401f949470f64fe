//! Core functionality for rytinfo

pub mod extractor;
pub mod video_info;

pub use self::extractor::*;
pub use self::video_info::*;
