use sha2::{Digest, Sha256};

/// Deterministic feature-hashing embedder.
///
/// Tokenizes on non-alphanumeric boundaries, lowercases, and hashes each
/// token into a fixed-dimension vector (signed feature hashing), then
/// l2-normalizes. Two texts sharing vocabulary land near each other under
/// cosine similarity, which is enough for offline operation and hermetic
/// tests; it makes no claim to semantic quality beyond token overlap.
pub struct HashedEmbedder {
    dimensions: usize,
}

impl HashedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a single text. Pure; no I/O, no randomness.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let hash = u64::from_le_bytes(digest[..8].try_into().expect("digest is 32 bytes"));

            let index = (hash % self.dimensions as u64) as usize;
            // Next bit decides the sign so colliding tokens can cancel
            // instead of always reinforcing
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        vector
    }

    pub fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
