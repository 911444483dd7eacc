use crate::error::{GameloreError, Result};
use crate::sources::SourceResult;
use reqwest::Client;
use serde::Deserialize;

pub const REDDIT_BASE_URL: &str = "https://www.reddit.com";

/// Reddit requires a descriptive User-Agent on its public JSON endpoints
const USER_AGENT: &str = "gamelore/1.0 (game-dev research agent)";

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: Post,
}

#[derive(Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    subreddit: String,
}

/// Client for Reddit's public JSON search listing
pub struct RedditClient {
    client: Client,
    base_url: String,
}

impl RedditClient {
    /// `base_url` overrides the production endpoint (used by tests)
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| REDDIT_BASE_URL.to_string()),
        }
    }

    /// Search post listings, preserving Reddit's own ranking order
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceResult>> {
        let url = format!("{}/search.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("limit", &limit.to_string()),
                ("sort", "relevance"),
            ])
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| GameloreError::SourceFetch {
                identity: "reddit".to_string(),
                reason: format!("network error: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GameloreError::SourceFetch {
                identity: "reddit".to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let listing: Listing = response.json().await.map_err(|e| GameloreError::SourceFetch {
            identity: "reddit".to_string(),
            reason: format!("malformed response: {}", e),
        })?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| {
                let post = child.data;
                let mut extra = serde_json::Map::new();
                extra.insert("subreddit".to_string(), serde_json::json!(post.subreddit));
                extra.insert("num_comments".to_string(), serde_json::json!(post.num_comments));

                SourceResult {
                    source: "reddit".to_string(),
                    title: post.title,
                    url: format!("{}{}", REDDIT_BASE_URL, post.permalink),
                    score: post.score as f64,
                    extra,
                }
            })
            .collect())
    }
}
