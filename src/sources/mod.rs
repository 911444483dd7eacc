pub mod aggregator;
pub mod limiter;
pub mod reddit;
pub mod stackexchange;
pub mod steamspy;

pub use aggregator::{AggregateOutcome, Aggregator};
pub use limiter::RateLimiter;
pub use reddit::RedditClient;
pub use stackexchange::StackExchangeClient;
pub use steamspy::SteamSpyClient;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One result from a live external source, the unit merged by the
/// aggregator. Order within one source's result list is that source's
/// own ranking; the merge across sources is a stable concatenation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: String,
    pub title: String,
    pub url: String,
    pub score: f64,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// External-API identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Reddit,
    StackExchange,
    SteamSpy,
}

impl SourceKind {
    /// Stable identity string, used as the rate-limiter key and in
    /// cache-key signatures
    pub fn identity(&self) -> &'static str {
        match self {
            SourceKind::Reddit => "reddit",
            SourceKind::StackExchange => "stackexchange",
            SourceKind::SteamSpy => "steamspy",
        }
    }
}

/// Concrete client for one live source, dispatched by variant
pub enum SourceClient {
    Reddit(RedditClient),
    StackExchange(StackExchangeClient),
    SteamSpy(SteamSpyClient),
}

impl SourceClient {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceClient::Reddit(_) => SourceKind::Reddit,
            SourceClient::StackExchange(_) => SourceKind::StackExchange,
            SourceClient::SteamSpy(_) => SourceKind::SteamSpy,
        }
    }

    pub fn identity(&self) -> &'static str {
        self.kind().identity()
    }

    pub async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<SourceResult>> {
        match self {
            SourceClient::Reddit(c) => c.search(query, limit).await,
            SourceClient::StackExchange(c) => c.search(query, limit).await,
            SourceClient::SteamSpy(c) => c.search(query, limit).await,
        }
    }
}
