pub mod chunker;
pub mod walker;

pub use chunker::chunk;
pub use walker::{discover_files, SourceFile};

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::store::{Metadata, Store};
use std::path::Path;

/// Ingestion parameters, usually derived from config
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Target collection in the document store
    pub collection: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl IngestOptions {
    pub fn new(collection: impl Into<String>, chunking: &ChunkingConfig) -> Self {
        Self {
            collection: collection.into(),
            chunk_size: chunking.chunk_size_chars,
            chunk_overlap: chunking.chunk_overlap_chars,
        }
    }
}

/// Totals for a directory ingestion run
#[derive(Debug, Default)]
pub struct IngestStats {
    pub files_ingested: usize,
    pub chunks_written: usize,
    pub files_failed: usize,
}

/// Ingest one file: read, chunk, attach metadata, write to the store.
///
/// Chunk ids are `{file_stem}_{index}` so re-ingesting the same file
/// overwrites its previous chunks instead of duplicating them. Returns the
/// number of chunks written. A missing file is reported and counted as
/// zero — ingestion is an offline batch operation tolerant of partial
/// input sets — while chunker misconfiguration and store write failures
/// surface to the caller.
pub async fn ingest_file(
    store: &Store,
    path: &Path,
    source_type: &str,
    opts: &IngestOptions,
) -> Result<usize> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    ingest_file_as(store, path, &stem, source_type, opts).await
}

/// Sanitize a root-relative path into a chunk-id prefix: drop the
/// extension, then map path separators and other non-identifier
/// characters to `_`. A top-level `file.txt` stays `file`.
fn doc_id_prefix(relative_path: &str) -> String {
    let base = match relative_path.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => relative_path,
    };
    base.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn ingest_file_as(
    store: &Store,
    path: &Path,
    id_prefix: &str,
    source_type: &str,
    opts: &IngestOptions,
) -> Result<usize> {
    if !path.is_file() {
        log::error!("Ingest skipped, not a file: {}", path.display());
        return Ok(0);
    }

    let content = std::fs::read_to_string(path)?;
    let chunks = chunk(&content, opts.chunk_size, opts.chunk_overlap)?;
    if chunks.is_empty() {
        log::debug!("Ingest produced no chunks for {}", path.display());
        return Ok(0);
    }

    let origin = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let mut ids = Vec::with_capacity(chunks.len());
    let mut metadatas = Vec::with_capacity(chunks.len());
    for index in 0..chunks.len() {
        ids.push(format!("{}_{}", id_prefix, index));

        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), serde_json::json!(source_type));
        metadata.insert("origin".to_string(), serde_json::json!(origin));
        metadata.insert("chunk_index".to_string(), serde_json::json!(index));
        metadatas.push(metadata);
    }

    store.add(&opts.collection, &chunks, &metadatas, &ids).await?;

    log::info!(
        "Ingested {} ({} chunks into '{}')",
        path.display(),
        chunks.len(),
        opts.collection
    );
    Ok(chunks.len())
}

/// Walk a directory tree and ingest every text/Markdown file found.
///
/// Chunk-id prefixes come from each file's root-relative path, so two
/// files sharing a stem in different subdirectories never overwrite each
/// other's chunks. Non-matching files are skipped silently. Per-file
/// failures are logged and counted, then the batch continues; a missing
/// root is reported and yields empty stats rather than an error.
pub async fn ingest_directory(
    store: &Store,
    path: &Path,
    source_type: &str,
    opts: &IngestOptions,
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();

    if !path.is_dir() {
        log::error!("Ingest root missing or not a directory: {}", path.display());
        return Ok(stats);
    }

    for file in discover_files(path)? {
        let id_prefix = doc_id_prefix(&file.relative_path);
        match ingest_file_as(store, &file.absolute_path, &id_prefix, source_type, opts).await {
            Ok(chunks) => {
                stats.files_ingested += 1;
                stats.chunks_written += chunks;
            }
            Err(e) => {
                log::error!("Failed to ingest {}: {}", file.relative_path, e);
                stats.files_failed += 1;
            }
        }
    }

    Ok(stats)
}
