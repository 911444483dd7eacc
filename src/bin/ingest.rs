use anyhow::Result;
use clap::Parser;
use gamelore::embeddings::Embedder;
use gamelore::ingest::{ingest_directory, IngestOptions};
use gamelore::{Config, Store};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Ingest text/Markdown documents into a gamelore collection")]
struct Args {
    /// Root directory to walk for .md/.txt files
    #[arg(short, long)]
    path: PathBuf,

    /// Source tag recorded in each chunk's metadata
    #[arg(short, long, default_value = "docs")]
    source_type: String,

    /// Target collection; defaults to the configured default collection
    #[arg(short, long)]
    collection: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.gamelore.log_level.as_str()),
    )
    .init();

    log::info!("Starting gamelore ingestion");
    log::info!("Database path: {}", config.db_path().display());

    let embedder = Arc::new(Embedder::from_config(&config.embeddings));
    let store = Store::open(&config, embedder);
    if store.is_mock() {
        log::warn!("Durable store unavailable; ingestion will not persist");
    }

    let collection = args
        .collection
        .unwrap_or_else(|| config.gamelore.default_collection.clone());
    let opts = IngestOptions::new(&collection, &config.chunking);

    let start = Instant::now();
    let stats = ingest_directory(&store, &args.path, &args.source_type, &opts).await?;

    log::info!(
        "Ingestion complete: {} files, {} chunks, {} failures in {:?}",
        stats.files_ingested,
        stats.chunks_written,
        stats.files_failed,
        start.elapsed()
    );
    log::info!(
        "Collection '{}' now holds {} documents",
        collection,
        store.count_documents(&collection).await?
    );

    Ok(())
}
