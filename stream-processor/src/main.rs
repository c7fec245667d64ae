use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use cache_store::{CacheWriter, InMemoryCacheWriter, RedisCacheWriter};
use clap::Parser;
use data_ingestion::StreamEvent;
use stream_processor::{init_logging, BatchProcessor, ProcessorConfig};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

/// Exit status when records arrived but no symbol was persisted.
const EXIT_NOTHING_PERSISTED: u8 = 2;

/// Process one stream event and write per-symbol analytics to the cache
#[derive(Parser, Debug)]
#[command(name = "stream-processor", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use an in-memory store instead of Redis
    #[arg(long)]
    dry_run: bool,

    /// Stream event JSON; read from stdin when omitted
    #[arg(value_name = "EVENT_FILE")]
    event_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ProcessorConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate(!cli.dry_run)
        .context("Invalid configuration")?;
    init_logging(config.level()?);

    let raw = read_event(cli.event_file.as_ref()).await?;
    let event = StreamEvent::from_slice(&raw).context("Event is not a valid stream event document")?;

    let writer: Arc<dyn CacheWriter> = if cli.dry_run {
        warn!("Dry run: results are kept in memory and discarded");
        Arc::new(InMemoryCacheWriter::new())
    } else {
        Arc::new(
            RedisCacheWriter::connect(&config.store)
                .await
                .with_context(|| format!("Failed to connect to {}", config.store.endpoint()))?,
        )
    };

    let processor = BatchProcessor::new(writer)
        .with_key_prefix(config.key_prefix.clone())
        .with_write_timeout(config.store.write_timeout());

    let summary = processor.process_event(&event).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if summary.is_total_failure() {
        warn!(
            "No symbols persisted out of {} received records",
            summary.received
        );
        return Ok(ExitCode::from(EXIT_NOTHING_PERSISTED));
    }

    info!("Done");
    Ok(ExitCode::SUCCESS)
}

async fn read_event(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("Failed to read event from stdin")?;
            Ok(buf)
        }
    }
}
