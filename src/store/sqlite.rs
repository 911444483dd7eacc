use crate::embeddings::Embedder;
use crate::error::{GameloreError, Result};
use crate::store::{Metadata, ScoredDocument};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::task;

/// Durable document store on SQLite.
///
/// Collections are rows in `collections`; documents live in `documents`
/// keyed by `(doc_id, collection_id)` so re-adding an id within a
/// collection overwrites. Embeddings are derived from content at write
/// time and stored as little-endian f32 BLOBs; queries score by cosine
/// similarity normalized into [0, 1].
pub struct SqliteStore {
    path: std::path::PathBuf,
    embedder: Arc<Embedder>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    collection_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS documents (
    doc_id TEXT NOT NULL,
    collection_id INTEGER NOT NULL REFERENCES collections(collection_id),
    content TEXT NOT NULL,
    metadata TEXT NOT NULL,
    embedding BLOB NOT NULL,
    PRIMARY KEY (doc_id, collection_id)
);
"#;

impl SqliteStore {
    /// Open (or create) the database and apply the schema.
    ///
    /// This is the one point where the durable backend can be found
    /// unavailable; the caller decides whether to fall back to the mock.
    pub fn open<P: AsRef<Path>>(db_path: P, embedder: Arc<Embedder>) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&path)
            .map_err(|e| GameloreError::StoreUnavailable(format!("cannot open {}: {}", path.display(), e)))?;

        // WAL for concurrent readers, NORMAL sync for speed, FK integrity
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self { path, embedder })
    }

    /// Execute a closure with a database connection in a blocking task
    async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            let mut conn = Connection::open(&path)?;
            conn.execute_batch(
                "PRAGMA journal_mode = WAL; \
                 PRAGMA synchronous = NORMAL; \
                 PRAGMA foreign_keys = ON;",
            )?;
            f(&mut conn)
        })
        .await
        .map_err(|e| GameloreError::StoreUnavailable(format!("store worker failed: {}", e)))?
    }

    /// Add documents to a named collection. Idempotent per id: re-adding
    /// the same id overwrites content, metadata, and embedding together,
    /// so an embedding can never go stale against its content.
    pub async fn add(
        &self,
        collection: &str,
        contents: &[String],
        metadatas: &[Metadata],
        ids: &[String],
    ) -> Result<()> {
        if contents.len() != metadatas.len() || contents.len() != ids.len() {
            return Err(GameloreError::InvalidArgument(format!(
                "add() length mismatch: {} contents, {} metadatas, {} ids",
                contents.len(),
                metadatas.len(),
                ids.len()
            )));
        }
        if contents.is_empty() {
            return Ok(());
        }

        let embeddings = self.embedder.embed_batch(contents).await?;

        let collection = collection.to_string();
        let rows: Vec<(String, String, String, Vec<u8>)> = ids
            .iter()
            .zip(contents)
            .zip(metadatas)
            .zip(&embeddings)
            .map(|(((id, content), metadata), embedding)| {
                (
                    id.clone(),
                    content.clone(),
                    serde_json::to_string(metadata).unwrap_or_else(|_| "{}".to_string()),
                    embedding_to_blob(embedding),
                )
            })
            .collect();

        self.with_connection(move |conn| {
            let tx = conn
                .transaction()
                .map_err(|e| GameloreError::StoreUnavailable(format!("write failed: {}", e)))?;
            let collection_id = get_or_create_collection(&tx, &collection)?;
            for (id, content, metadata, embedding) in &rows {
                tx.execute(
                    "INSERT OR REPLACE INTO documents \
                     (doc_id, collection_id, content, metadata, embedding) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![id, collection_id, content, metadata, embedding],
                )
                .map_err(|e| GameloreError::StoreUnavailable(format!("write failed: {}", e)))?;
            }
            tx.commit()
                .map_err(|e| GameloreError::StoreUnavailable(format!("commit failed: {}", e)))?;
            Ok(())
        })
        .await
    }

    /// Return the `k` nearest documents in the collection, highest score
    /// first. An empty or unknown collection yields an empty vec.
    pub async fn query(&self, collection: &str, text: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(text).await?;
        let collection = collection.to_string();

        let rows = self
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT d.doc_id, d.content, d.metadata, d.embedding \
                     FROM documents d \
                     JOIN collections c ON d.collection_id = c.collection_id \
                     WHERE c.name = ?1",
                )?;
                let mut rows = stmt.query(rusqlite::params![collection])?;
                let mut results = Vec::new();
                while let Some(row) = rows.next()? {
                    results.push((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ));
                }
                Ok(results)
            })
            .await?;

        let mut scored: Vec<ScoredDocument> = rows
            .into_iter()
            .filter_map(|(id, content, metadata_json, blob)| {
                let embedding = blob_to_embedding(&blob)?;
                if embedding.len() != query_vec.len() {
                    log::warn!(
                        "Skipping doc {}: embedding dimension {} != query {}",
                        id,
                        embedding.len(),
                        query_vec.len()
                    );
                    return None;
                }
                let metadata: Metadata = serde_json::from_str(&metadata_json).unwrap_or_default();
                Some(ScoredDocument {
                    id,
                    content,
                    metadata,
                    score: normalize_score(cosine_similarity(&query_vec, &embedding)),
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    /// Number of documents in the collection (0 for an unknown name)
    pub async fn count_documents(&self, collection: &str) -> Result<usize> {
        let collection = collection.to_string();
        self.with_connection(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents d \
                 JOIN collections c ON d.collection_id = c.collection_id \
                 WHERE c.name = ?1",
                rusqlite::params![collection],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
        .await
    }
}

/// Explicit upsert for the collection row; collections are created lazily
/// on first write against a name.
fn get_or_create_collection(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO collections (name) VALUES (?1)",
        rusqlite::params![name],
    )
    .map_err(|e| GameloreError::StoreUnavailable(format!("collection create failed: {}", e)))?;

    let id = conn.query_row(
        "SELECT collection_id FROM collections WHERE name = ?1",
        rusqlite::params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }

    blob.chunks(4)
        .map(|bytes| {
            let arr: [u8; 4] = bytes.try_into().ok()?;
            Some(f32::from_le_bytes(arr))
        })
        .collect()
}

/// Map raw cosine similarity from [-1, 1] into the contract's [0, 1].
///
/// A plain `1 - distance` is only sound when the distance metric itself is
/// bounded in [0, 1]; the affine map makes no such assumption.
fn normalize_score(cosine: f32) -> f32 {
    ((cosine + 1.0) / 2.0).clamp(0.0, 1.0)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
