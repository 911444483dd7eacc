use crate::config::Config;
use crate::error::{GameloreError, Result};
use crate::sources::{Aggregator, SourceKind};
use crate::store::Store;
use std::sync::Arc;

/// The structured tuple guaranteed to callers for every result; prose
/// formatting on top of it is a presentation concern
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub content: String,
    pub source: String,
    pub relevance: f64,
}

enum Route {
    Collection(String),
    Live(Vec<SourceKind>),
}

/// Top-level entry point: dispatches a query to a document-store
/// collection or the live-source aggregator based on the caller's domain
/// tag, and renders the outcome as text.
///
/// Domain tags are produced dynamically by calling agents, so an unknown
/// tag falls back to the default collection instead of failing, and
/// `search` converts every underlying error into a readable string —
/// research grounding is best-effort, never a crash path for the agent.
pub struct KnowledgeRouter {
    store: Arc<Store>,
    aggregator: Aggregator,
    default_collection: String,
    default_k: usize,
    min_score: f32,
}

impl KnowledgeRouter {
    pub fn new(store: Arc<Store>, aggregator: Aggregator, config: &Config) -> Self {
        Self {
            store,
            aggregator,
            default_collection: config.gamelore.default_collection.clone(),
            default_k: config.search.default_k,
            min_score: config.search.min_score,
        }
    }

    fn resolve(&self, domain: &str) -> Route {
        match domain {
            "patterns" | "engine" | "narrative" => Route::Collection(domain.to_string()),
            "market" => Route::Live(vec![SourceKind::SteamSpy]),
            "forum" => Route::Live(vec![SourceKind::Reddit, SourceKind::StackExchange]),
            other => {
                log::warn!(
                    "Unknown domain tag '{}', falling back to collection '{}'",
                    other,
                    self.default_collection
                );
                Route::Collection(self.default_collection.clone())
            }
        }
    }

    /// Structured search with an explicit result count
    pub async fn search_results(&self, domain: &str, query: &str, k: usize) -> Result<Vec<Retrieved>> {
        match self.resolve(domain) {
            Route::Collection(collection) => {
                let documents = self.store.query(&collection, query, k).await?;
                // min_score applies to normalized [0, 1] semantic scores
                // only; live sources carry raw community counts
                Ok(documents
                    .into_iter()
                    .filter(|doc| doc.score >= self.min_score)
                    .map(|doc| {
                        let source = doc
                            .metadata
                            .get("source")
                            .and_then(|v| v.as_str())
                            .unwrap_or(&collection)
                            .to_string();
                        Retrieved {
                            content: doc.content,
                            source,
                            relevance: doc.score as f64,
                        }
                    })
                    .collect())
            }
            Route::Live(kinds) => {
                let outcome = self.aggregator.search(query, &kinds).await?;
                if outcome.partial {
                    log::warn!("Aggregation for '{}' returned partial results", query);
                }
                Ok(outcome
                    .results
                    .into_iter()
                    .map(|r| Retrieved {
                        content: format!("{} ({})", r.title, r.url),
                        source: r.source,
                        relevance: r.score,
                    })
                    .collect())
            }
        }
    }

    /// Best-effort text search. Never returns an error: failures and empty
    /// outcomes become human-readable strings so upstream agent calls stay
    /// non-fatal.
    pub async fn search(&self, domain: &str, query: &str) -> String {
        match self.search_results(domain, query, self.default_k).await {
            Ok(results) if !results.is_empty() => {
                let mut out = String::new();
                for r in &results {
                    out.push_str(&format!(
                        "- [{}] (score {:.2}) {}\n",
                        r.source, r.relevance, r.content
                    ));
                }
                out
            }
            Ok(_) => format!("no results found for domain {}", domain),
            Err(GameloreError::NoResults(_)) => {
                format!("no results found for domain {}", domain)
            }
            Err(e) => {
                log::warn!("Search failed for domain {}: {}", domain, e);
                format!("research lookup failed for domain {}: {}", domain, e)
            }
        }
    }
}
