use crate::cache::TtlCache;
use crate::config::{SourceConfig, SourcesConfig};
use crate::error::{GameloreError, Result};
use crate::sources::{
    RateLimiter, RedditClient, SourceClient, SourceKind, SourceResult, StackExchangeClient,
    SteamSpyClient,
};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Results requested from each individual source per query
const RESULTS_PER_SOURCE: usize = 5;

/// Stack Exchange community searched for forum queries
const STACKEXCHANGE_SITE: &str = "gamedev";

/// Per-source runtime policy, lifted out of config once at construction
#[derive(Debug, Clone)]
struct SourcePolicy {
    min_interval: Duration,
    ttl: Duration,
}

impl From<&SourceConfig> for SourcePolicy {
    fn from(config: &SourceConfig) -> Self {
        Self {
            min_interval: Duration::from_millis(config.min_interval_ms),
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }
}

/// Outcome of one aggregation request
#[derive(Debug)]
pub struct AggregateOutcome {
    /// Stable concatenation of each source's results, in source order
    pub results: Vec<SourceResult>,
    /// True when at least one requested source failed or timed out
    pub partial: bool,
    /// True when the merged list was served from the TTL cache
    pub from_cache: bool,
}

/// Fans a query out to the requested live sources concurrently, merging
/// their results behind a shared TTL cache and per-identity rate limits.
///
/// Cache entries are keyed by the query plus the sorted identity-set
/// signature and expire after the shortest TTL among the requested
/// sources. A per-key in-flight guard coalesces concurrent identical
/// requests so at most one fan-out runs per key; late arrivals wait and
/// re-read the cache. A single source failing degrades the response to a
/// partial result instead of aborting the others; partial merges are
/// returned but not cached, so the failed source is retried next time.
pub struct Aggregator {
    sources: Vec<(SourceClient, SourcePolicy)>,
    cache: TtlCache<Vec<SourceResult>>,
    limiter: Arc<RateLimiter>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    request_timeout: Duration,
}

impl Aggregator {
    /// Build clients for every enabled source. The cache and rate limiter
    /// are owned here and injected nowhere else, so separate aggregator
    /// instances (e.g. in tests) share no state.
    pub fn from_config(config: &SourcesConfig) -> Self {
        let request_timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        let mut sources = Vec::new();
        if config.reddit.enabled {
            sources.push((
                SourceClient::Reddit(RedditClient::new(client.clone(), config.reddit.base_url.clone())),
                SourcePolicy::from(&config.reddit),
            ));
        }
        if config.stackexchange.enabled {
            sources.push((
                SourceClient::StackExchange(StackExchangeClient::new(
                    client.clone(),
                    config.stackexchange.base_url.clone(),
                    STACKEXCHANGE_SITE,
                )),
                SourcePolicy::from(&config.stackexchange),
            ));
        }
        if config.steamspy.enabled {
            sources.push((
                SourceClient::SteamSpy(SteamSpyClient::new(client, config.steamspy.base_url.clone())),
                SourcePolicy::from(&config.steamspy),
            ));
        }

        Self {
            sources,
            cache: TtlCache::new(config.cache_capacity),
            limiter: Arc::new(RateLimiter::new()),
            inflight: Mutex::new(HashMap::new()),
            request_timeout,
        }
    }

    /// Fetch and merge results from the requested sources.
    ///
    /// Returns `NoResults` when nothing is enabled for the request or
    /// every source failed or came back empty.
    pub async fn search(&self, query: &str, kinds: &[SourceKind]) -> Result<AggregateOutcome> {
        let selected: Vec<&(SourceClient, SourcePolicy)> = self
            .sources
            .iter()
            .filter(|(client, _)| kinds.contains(&client.kind()))
            .collect();

        if selected.is_empty() {
            return Err(GameloreError::NoResults(
                "no enabled sources match this request".to_string(),
            ));
        }

        let mut identities: Vec<&str> = selected.iter().map(|(c, _)| c.identity()).collect();
        identities.sort_unstable();
        let key = format!("{}::{}", identities.join("+"), query);

        // No member may be served staler than its own policy allows
        let ttl = selected
            .iter()
            .map(|(_, policy)| policy.ttl)
            .min()
            .expect("selected is non-empty");

        if let Some(results) = self.cache.get(&key, ttl) {
            log::debug!("Aggregator cache hit for {}", key);
            return Ok(AggregateOutcome {
                results,
                partial: false,
                from_cache: true,
            });
        }

        // At most one fan-out in flight per key; everyone else queues on
        // the key guard and re-reads the cache once the leader finishes
        let guard = {
            let mut inflight = self.inflight.lock().await;
            inflight.entry(key.clone()).or_default().clone()
        };
        let locked = guard.lock().await;

        if let Some(results) = self.cache.get(&key, ttl) {
            drop(locked);
            self.forget_inflight(&key, &guard).await;
            return Ok(AggregateOutcome {
                results,
                partial: false,
                from_cache: true,
            });
        }

        let fetches = selected.iter().map(|(client, policy)| async {
            self.limiter.acquire(client.identity(), policy.min_interval).await;
            match tokio::time::timeout(self.request_timeout, client.fetch(query, RESULTS_PER_SOURCE)).await {
                Ok(Ok(results)) => {
                    log::debug!("Source {} returned {} results", client.identity(), results.len());
                    Some(results)
                }
                Ok(Err(e)) => {
                    log::warn!("Source {} failed: {}", client.identity(), e);
                    None
                }
                Err(_) => {
                    log::warn!(
                        "Source {} timed out after {:?}",
                        client.identity(),
                        self.request_timeout
                    );
                    None
                }
            }
        });

        let outcomes = join_all(fetches).await;

        let partial = outcomes.iter().any(Option::is_none);
        let results: Vec<SourceResult> = outcomes.into_iter().flatten().flatten().collect();

        if !results.is_empty() && !partial {
            self.cache.put(key.clone(), results.clone());
        }

        drop(locked);
        self.forget_inflight(&key, &guard).await;

        if results.is_empty() {
            return Err(GameloreError::NoResults(format!(
                "every source failed or returned empty for \"{}\"",
                query
            )));
        }

        Ok(AggregateOutcome {
            results,
            partial,
            from_cache: false,
        })
    }

    /// Drop this aggregator's cached results (explicit reset)
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Remove the in-flight entry only while it is still the guard this
    /// caller queued on. A finisher holding a stale guard must not evict
    /// an entry a later arrival has already recreated, or two fan-outs
    /// could run for one key.
    async fn forget_inflight(&self, key: &str, guard: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        if inflight.get(key).is_some_and(|current| Arc::ptr_eq(current, guard)) {
            inflight.remove(key);
        }
    }
}
