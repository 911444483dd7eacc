use crate::error::{GameloreError, Result};
use crate::sources::SourceResult;
use reqwest::Client;
use serde::Deserialize;

pub const STACKEXCHANGE_BASE_URL: &str = "https://api.stackexchange.com";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Question>,
}

#[derive(Deserialize)]
struct Question {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    answer_count: i64,
    #[serde(default)]
    is_answered: bool,
}

/// Client for the Stack Exchange search API (read-only, unauthenticated)
pub struct StackExchangeClient {
    client: Client,
    base_url: String,
    site: String,
}

impl StackExchangeClient {
    /// `base_url` overrides the production endpoint (used by tests);
    /// `site` is the Stack Exchange community to search (e.g. "gamedev")
    pub fn new(client: Client, base_url: Option<String>, site: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| STACKEXCHANGE_BASE_URL.to_string()),
            site: site.into(),
        }
    }

    /// Relevance-ordered question search; API order is preserved
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceResult>> {
        let url = format!("{}/2.3/search/advanced", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("site", &self.site),
                ("order", "desc"),
                ("sort", "relevance"),
                ("pagesize", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| GameloreError::SourceFetch {
                identity: "stackexchange".to_string(),
                reason: format!("network error: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GameloreError::SourceFetch {
                identity: "stackexchange".to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let result: SearchResponse =
            response.json().await.map_err(|e| GameloreError::SourceFetch {
                identity: "stackexchange".to_string(),
                reason: format!("malformed response: {}", e),
            })?;

        Ok(result
            .items
            .into_iter()
            .map(|q| {
                let mut extra = serde_json::Map::new();
                extra.insert("answer_count".to_string(), serde_json::json!(q.answer_count));
                extra.insert("is_answered".to_string(), serde_json::json!(q.is_answered));

                SourceResult {
                    source: "stackexchange".to_string(),
                    title: q.title,
                    url: q.link,
                    score: q.score as f64,
                    extra,
                }
            })
            .collect())
    }
}
