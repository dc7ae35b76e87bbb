//! Relocale - schema-driven document translation
//!
//! Command line entry point: translates stored documents through the configured
//! provider, or runs extraction and reinsertion offline on JSON files.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use relocale::apply::Reinserter;
use relocale::cli::{parse_locales, Args, Commands};
use relocale::config::Config;
use relocale::extract::Extractor;
use relocale::schema::CollectionSchema;
use relocale::store::FsDocumentStore;
use relocale::translate::ProviderFactory;
use relocale::workflow::{TranslateRequest, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Relocale - schema-driven document translation");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("relocale.toml").exists() {
                info!("Found relocale.toml in current directory, loading...");
                Config::from_file("relocale.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Translate { collection, id, source, targets } => {
            let provider = ProviderFactory::create_provider(config.provider.clone())?;
            let store = FsDocumentStore::new(&config.store);
            let workflow = Workflow::new(config, Box::new(store), provider);

            let request = TranslateRequest::new(&collection, &id, &source, parse_locales(&targets));
            let response = workflow.translate_document(&request).await;

            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                std::process::exit(1);
            }
        }
        Commands::Extract { schema, document } => {
            let schema = CollectionSchema::from_file(&schema)?;
            let document = read_json(&document)?;

            let fields = Extractor::new(&config.engine).extract(&schema.fields, &document);
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        Commands::Apply { schema, document, translations, output } => {
            let schema = CollectionSchema::from_file(&schema)?;
            let document = read_json(&document)?;
            let translations: Vec<String> = serde_json::from_value(read_json(&translations)?)
                .context("Translations file must be a JSON array of strings")?;

            let fields = Extractor::new(&config.engine).extract(&schema.fields, &document);
            let applied = Reinserter::new(&config.engine).apply(&document, &fields, &translations);

            std::fs::write(&output, serde_json::to_string_pretty(&applied.document)?)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            info!(
                "Applied {} of {} fragment(s) to {}",
                applied.report.applied,
                applied.report.fields,
                output.display()
            );
            println!("{}", serde_json::to_string_pretty(&applied.report)?);
        }
        Commands::Check => {
            let provider = ProviderFactory::create_provider(config.provider.clone())?;
            provider.check_availability().await?;
            println!("{} provider is available (model: {})", provider.provider_name(), config.provider.model);
        }
        Commands::InitConfig { output } => {
            if output.exists() {
                anyhow::bail!("{} already exists", output.display());
            }
            config.save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".relocale").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "relocale.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console goes to stderr so JSON output on stdout stays clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
