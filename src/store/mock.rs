use crate::error::Result;
use crate::store::{Metadata, ScoredDocument};
use std::collections::HashMap;
use std::sync::Mutex;

/// Deterministic stand-in for the durable store, used when the real
/// backend cannot be opened. Queries are matched against a small fixed
/// rule table by substring and answered with a single canned result
/// tagged with a synthetic source name, so calling agents keep getting
/// plausible grounding text instead of hard failures.
pub struct MockStore {
    // Writes are kept so add() stays idempotent and observable in tests,
    // but they never influence query results
    documents: Mutex<HashMap<(String, String), String>>,
}

/// Documents reported by `count_documents` regardless of writes
const MOCK_DOCUMENT_COUNT: usize = 42;

const MOCK_SCORE: f32 = 0.75;

/// (query substring, source tag, canned content)
const RULES: &[(&str, &str, &str)] = &[
    (
        "unity",
        "mock_unity_docs",
        "Unity organizes scenes as hierarchies of GameObjects with attached \
         Components; gameplay logic lives in MonoBehaviour scripts driven by \
         the engine's update loop.",
    ),
    (
        "unreal",
        "mock_unreal_docs",
        "Unreal Engine structures gameplay around Actors and Components, \
         with the Gameplay Framework (GameMode, Pawn, Controller) defining \
         the rules of a level.",
    ),
];

const FALLBACK: (&str, &str) = (
    "mock_general_docs",
    "General game design guidance: anchor each mechanic to a clear player \
     fantasy and verify it against the core loop before adding content.",
);

impl MockStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// Record documents in memory. Idempotent per id within a collection.
    pub fn add(&self, collection: &str, contents: &[String], ids: &[String]) -> Result<()> {
        let mut documents = self.documents.lock().unwrap();
        for (id, content) in ids.iter().zip(contents) {
            documents.insert((collection.to_string(), id.clone()), content.clone());
        }
        Ok(())
    }

    /// Match the query against the rule table and fabricate one result
    pub fn query(&self, query: &str) -> Vec<ScoredDocument> {
        let lowered = query.to_lowercase();

        let (source, content) = RULES
            .iter()
            .find(|(needle, _, _)| lowered.contains(needle))
            .map(|(_, source, content)| (*source, *content))
            .unwrap_or(FALLBACK);

        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), serde_json::json!(source));
        metadata.insert("mock".to_string(), serde_json::json!(true));

        vec![ScoredDocument {
            id: format!("{}_0", source),
            content: content.to_string(),
            metadata,
            score: MOCK_SCORE,
        }]
    }

    pub fn count_documents(&self) -> usize {
        MOCK_DOCUMENT_COUNT
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}
