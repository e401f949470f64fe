//! Command line interface

pub mod args;
pub mod output;

pub use self::args::*;
pub use self::output::*;
