use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use catalog_scraper::{Config, Processor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = Command::new("Catalog Scraper")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Scrape catalog metadata for local videos and organize them")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("config.toml")
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("DIR")
                .help("Directory containing videos to organize")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Library root for organized videos")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let default_filter = if verbose {
        "catalog_scraper=debug"
    } else {
        "catalog_scraper=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if verbose {
        info!("Verbose logging enabled");
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    // Load configuration
    let mut config = Config::load(&config_path).unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {:#}", e);
        let mut config = Config::default();
        config.apply_env();
        config
    });

    if let Some(input) = matches.get_one::<String>("input") {
        config.input.path = PathBuf::from(input);
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.output.path = PathBuf::from(output);
    }

    info!("🚀 Catalog Scraper starting...");
    info!("{}", config.summary());

    let processor = Processor::new(config)?;
    let results = processor.process_directory().await?;

    // Print results
    info!("🎉 Processing completed in {:.2}s", results.total_time.as_secs_f64());
    info!("📹 Total: {}", results.total);
    info!("✅ Organized: {}", results.organized);
    info!("❌ Failed: {}", results.failed);
    info!("⏭️ Skipped: {}", results.skipped);

    Ok(())
}
