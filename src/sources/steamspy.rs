use crate::error::{GameloreError, Result};
use crate::sources::SourceResult;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

pub const STEAMSPY_BASE_URL: &str = "https://steamspy.com";

#[derive(Deserialize)]
struct App {
    #[serde(default)]
    appid: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    developer: String,
    /// Owner estimate as a range string, e.g. "1,000,000 .. 2,000,000"
    #[serde(default)]
    owners: String,
    #[serde(default)]
    positive: i64,
    #[serde(default)]
    negative: i64,
    #[serde(default)]
    average_forever: i64,
}

/// Client for the SteamSpy ownership-estimate API.
///
/// SteamSpy has no text search; market lookups fetch the two-week top
/// list (one inexpensive call, and the aggregator caches it for a day)
/// and filter it by name substring.
pub struct SteamSpyClient {
    client: Client,
    base_url: String,
}

impl SteamSpyClient {
    /// `base_url` overrides the production endpoint (used by tests)
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| STEAMSPY_BASE_URL.to_string()),
        }
    }

    /// Match games by case-insensitive name substring. An empty query
    /// returns the whole list, most-positively-reviewed first.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceResult>> {
        let url = format!("{}/api.php", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("request", "top100in2weeks")])
            .send()
            .await
            .map_err(|e| GameloreError::SourceFetch {
                identity: "steamspy".to_string(),
                reason: format!("network error: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GameloreError::SourceFetch {
                identity: "steamspy".to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let apps: HashMap<String, App> =
            response.json().await.map_err(|e| GameloreError::SourceFetch {
                identity: "steamspy".to_string(),
                reason: format!("malformed response: {}", e),
            })?;

        let needle = query.to_lowercase();
        let mut matched: Vec<App> = apps
            .into_values()
            .filter(|app| needle.is_empty() || app.name.to_lowercase().contains(&needle))
            .collect();

        // The API returns an unordered map; rank by positive review count
        // so this source's internal order is stable
        matched.sort_by(|a, b| b.positive.cmp(&a.positive).then(a.appid.cmp(&b.appid)));
        matched.truncate(limit);

        Ok(matched
            .into_iter()
            .map(|app| {
                let mut extra = serde_json::Map::new();
                extra.insert("owners".to_string(), serde_json::json!(app.owners));
                extra.insert("developer".to_string(), serde_json::json!(app.developer));
                extra.insert("negative".to_string(), serde_json::json!(app.negative));
                extra.insert(
                    "average_playtime_minutes".to_string(),
                    serde_json::json!(app.average_forever),
                );

                SourceResult {
                    source: "steamspy".to_string(),
                    title: app.name,
                    url: format!("https://store.steampowered.com/app/{}", app.appid),
                    score: app.positive as f64,
                    extra,
                }
            })
            .collect())
    }
}
