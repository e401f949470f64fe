//! Output formatting

use crate::cli::args::VerbosityLevel;
use crate::core::video_info::VideoInfo;
use crate::error::InfoError;
use colored::Colorize;

/// Output formatter for rytinfo
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    pretty: bool,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel, pretty: bool) -> Self {
        Self { verbosity, pretty }
    }

    /// Render video info as JSON
    pub fn render_info(&self, info: &VideoInfo) -> Result<String, InfoError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(info)?
        } else {
            serde_json::to_string(info)?
        };
        Ok(rendered)
    }

    /// Print video info as JSON to stdout
    pub fn print_info(&self, info: &VideoInfo) -> Result<(), InfoError> {
        println!("{}", self.render_info(info)?);
        Ok(())
    }

    /// Print a one-line summary to stderr
    pub fn print_summary(&self, info: &VideoInfo) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }
        eprintln!(
            "{} {} ({} streams)",
            "✔".green(),
            info.title().unwrap_or("untitled").bold(),
            info.formats.len()
        );
    }

    /// Print a video ID
    pub fn print_video_id(&self, id: &str) {
        println!("{}", id);
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }
}
