pub mod hashed;
pub mod openai;

pub use hashed::HashedEmbedder;
pub use openai::OpenAiEmbedder;

use crate::config::EmbeddingsConfig;
use crate::error::Result;

/// Embedding backend, chosen once at process start.
///
/// `OpenAi` when the configured provider is "openai" and its API key
/// environment variable is set; otherwise the deterministic `Hashed`
/// embedder, which needs no network and keeps tests hermetic.
pub enum Embedder {
    OpenAi(OpenAiEmbedder),
    Hashed(HashedEmbedder),
}

impl Embedder {
    /// Select a backend from configuration. Never fails: a missing API key
    /// downgrades to the hashed embedder with a logged notice.
    pub fn from_config(config: &EmbeddingsConfig) -> Self {
        if config.provider == "openai" {
            if let Ok(api_key) = std::env::var(&config.api_key_env) {
                log::info!("Embeddings: OpenAI ({})", config.model);
                return Embedder::OpenAi(OpenAiEmbedder::new(
                    api_key,
                    config.model.clone(),
                    config.batch_size,
                ));
            }
            log::warn!(
                "Embeddings: {} not set, falling back to hashed embedder",
                config.api_key_env
            );
        } else {
            log::info!("Embeddings: hashed ({} dims)", config.dimensions);
        }

        Embedder::Hashed(HashedEmbedder::new(config.dimensions))
    }

    /// True when embeddings come from the remote API
    pub fn is_remote(&self) -> bool {
        matches!(self, Embedder::OpenAi(_))
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self {
            Embedder::OpenAi(e) => e.embed_with_retry(text, 3).await,
            Embedder::Hashed(e) => Ok(e.embed(text)),
        }
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Embedder::OpenAi(e) => e.embed_batch(texts).await,
            Embedder::Hashed(e) => Ok(e.embed_batch(texts)),
        }
    }
}
