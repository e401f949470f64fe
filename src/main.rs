//! Main entry point for rytinfo CLI

use clap::Parser;
use rytinfo::cli::{Args, OutputFormatter, VerbosityLevel};
use rytinfo::InfoExtractor;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbosity_level())?;

    debug!("Starting rytinfo with args: {:?}", args);

    let formatter = OutputFormatter::new(args.verbosity_level(), args.pretty);
    let extractor = InfoExtractor::with_client_config(&args.client_config())?
        .with_config(args.extractor_config());

    if args.id_only {
        return match extractor.get_video_id(&args.url) {
            Some(id) => {
                formatter.print_video_id(&id);
                Ok(())
            }
            None => {
                formatter.error(&format!("No video ID found in {}", args.url));
                std::process::exit(1);
            }
        };
    }

    info!("Resolving {}", args.url);
    match extractor.get_info(&args.url).await {
        Ok(video_info) => {
            if video_info.is_empty() {
                formatter.warning("No playable streams resolved");
            }
            formatter.print_summary(&video_info);
            formatter.print_info(&video_info)?;
            Ok(())
        }
        Err(e) => {
            formatter.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Initialize logging system
fn init_logging(verbosity: VerbosityLevel) -> anyhow::Result<()> {
    // RUST_LOG wins over the verbosity flags
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
