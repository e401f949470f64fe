//! Utility functions for rytinfo

pub mod scan;
pub mod url;

pub use self::scan::*;
pub use self::url::*;
