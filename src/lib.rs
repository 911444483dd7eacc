pub mod cache;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod router;
pub mod sources;
pub mod store;

pub use config::Config;
pub use error::{GameloreError, Result};
pub use router::{KnowledgeRouter, Retrieved};
pub use store::Store;
