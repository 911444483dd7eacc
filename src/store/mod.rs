pub mod mock;
pub mod sqlite;

pub use mock::MockStore;
pub use sqlite::SqliteStore;

use crate::config::Config;
use crate::embeddings::Embedder;
use crate::error::Result;
use std::sync::Arc;

/// Scalar metadata attached to a document (stored as JSON)
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A document returned from a store query, with its similarity score in [0, 1]
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}

/// Semantic document store behind one interface.
///
/// The variant is chosen exactly once at process start by `Store::open`:
/// the durable SQLite backend when it can be opened, otherwise the
/// keyword-triggered mock. `is_mock` makes the active variant inspectable
/// so the router and tests can assert which one is live.
pub enum Store {
    Sqlite(SqliteStore),
    Mock(MockStore),
}

impl Store {
    /// One-shot backend selection. Falls back to the mock with a logged
    /// warning instead of failing the process.
    pub fn open(config: &Config, embedder: Arc<Embedder>) -> Self {
        match SqliteStore::open(config.db_path(), embedder) {
            Ok(store) => {
                log::info!("Document store: sqlite at {}", config.db_path().display());
                Store::Sqlite(store)
            }
            Err(e) => {
                log::warn!("Document store unavailable ({}), using mock store", e);
                Store::Mock(MockStore::new())
            }
        }
    }

    /// Construct the mock variant directly (tests, degraded deployments)
    pub fn mock() -> Self {
        Store::Mock(MockStore::new())
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Store::Mock(_))
    }

    /// Add documents to a named collection; idempotent per id
    pub async fn add(
        &self,
        collection: &str,
        contents: &[String],
        metadatas: &[Metadata],
        ids: &[String],
    ) -> Result<()> {
        match self {
            Store::Sqlite(store) => store.add(collection, contents, metadatas, ids).await,
            Store::Mock(store) => store.add(collection, contents, ids),
        }
    }

    /// Semantic query over a collection; empty collections yield an empty
    /// vec, never an error
    pub async fn query(&self, collection: &str, text: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        match self {
            Store::Sqlite(store) => store.query(collection, text, k).await,
            Store::Mock(store) => Ok(store.query(text)),
        }
    }

    pub async fn count_documents(&self, collection: &str) -> Result<usize> {
        match self {
            Store::Sqlite(store) => store.count_documents(collection).await,
            Store::Mock(store) => Ok(store.count_documents()),
        }
    }
}
