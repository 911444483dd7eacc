use gamelore::config::SourcesConfig;
use gamelore::error::GameloreError;
use gamelore::sources::{
    Aggregator, RedditClient, SourceKind, StackExchangeClient, SteamSpyClient,
};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap()
}

fn reddit_listing() -> serde_json::Value {
    json!({
        "data": {
            "children": [
                { "data": { "title": "Pricing an indie roguelike", "permalink": "/r/gamedev/a", "score": 120, "num_comments": 45, "subreddit": "gamedev" } },
                { "data": { "title": "Roguelike demo feedback", "permalink": "/r/roguelikedev/b", "score": 80, "num_comments": 12, "subreddit": "roguelikedev" } },
                { "data": { "title": "Wishlist conversion rates", "permalink": "/r/gamedev/c", "score": 64, "num_comments": 30, "subreddit": "gamedev" } }
            ]
        }
    })
}

#[tokio::test]
async fn reddit_client_parses_listing_in_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("q", "roguelike pricing");
            then.status(200).json_body(reddit_listing());
        })
        .await;

    let client = RedditClient::new(http_client(), Some(server.base_url()));
    let results = client.search("roguelike pricing", 5).await.unwrap();

    mock.assert_async().await;
    assert_eq!(results.len(), 3);
    // Listing order is the source's own ranking and must survive
    assert_eq!(results[0].title, "Pricing an indie roguelike");
    assert_eq!(results[1].title, "Roguelike demo feedback");
    assert_eq!(results[2].title, "Wishlist conversion rates");
    assert_eq!(results[0].source, "reddit");
    assert_eq!(results[0].score, 120.0);
    assert!(results[0].url.ends_with("/r/gamedev/a"));
    assert_eq!(results[0].extra.get("subreddit").unwrap(), "gamedev");
}

#[tokio::test]
async fn reddit_client_maps_non_200_to_source_fetch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search.json");
            then.status(503);
        })
        .await;

    let client = RedditClient::new(http_client(), Some(server.base_url()));
    let err = client.search("anything", 5).await.unwrap_err();
    assert!(matches!(err, GameloreError::SourceFetch { ref identity, .. } if identity == "reddit"));
}

#[tokio::test]
async fn stackexchange_client_parses_items() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2.3/search/advanced")
                .query_param("site", "gamedev");
            then.status(200).json_body(json!({
                "items": [
                    { "title": "How to balance a difficulty curve?", "link": "https://gamedev.stackexchange.com/q/1", "score": 42, "answer_count": 5, "is_answered": true }
                ]
            }));
        })
        .await;

    let client = StackExchangeClient::new(http_client(), Some(server.base_url()), "gamedev");
    let results = client.search("difficulty curve", 5).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, "stackexchange");
    assert_eq!(results[0].score, 42.0);
    assert_eq!(results[0].extra.get("is_answered").unwrap(), true);
}

#[tokio::test]
async fn steamspy_client_filters_by_name_substring() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api.php")
                .query_param("request", "top100in2weeks");
            then.status(200).json_body(json!({
                "400": { "appid": 400, "name": "Portal", "developer": "Valve", "owners": "10,000,000 .. 20,000,000", "positive": 95000, "negative": 1200, "average_forever": 500 },
                "620": { "appid": 620, "name": "Portal 2", "developer": "Valve", "owners": "10,000,000 .. 20,000,000", "positive": 200000, "negative": 2500, "average_forever": 800 },
                "570": { "appid": 570, "name": "Dota 2", "developer": "Valve", "owners": "100,000,000 .. 200,000,000", "positive": 1500000, "negative": 300000, "average_forever": 20000 }
            }));
        })
        .await;

    let client = SteamSpyClient::new(http_client(), Some(server.base_url()));
    let results = client.search("portal", 10).await.unwrap();

    assert_eq!(results.len(), 2);
    // Internal ranking: positive review count, descending
    assert_eq!(results[0].title, "Portal 2");
    assert_eq!(results[1].title, "Portal");
    assert_eq!(results[0].url, "https://store.steampowered.com/app/620");
    assert_eq!(
        results[0].extra.get("owners").unwrap(),
        "10,000,000 .. 20,000,000"
    );
}

fn test_sources_config(server: &MockServer) -> SourcesConfig {
    let mut config = SourcesConfig::default();
    for source in [
        &mut config.reddit,
        &mut config.stackexchange,
        &mut config.steamspy,
    ] {
        source.min_interval_ms = 0;
        source.base_url = Some(server.base_url());
    }
    config
}

#[tokio::test]
async fn aggregator_degrades_gracefully_when_one_source_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search.json");
            then.status(200).json_body(reddit_listing());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2.3/search/advanced");
            then.status(500);
        })
        .await;

    let aggregator = Aggregator::from_config(&test_sources_config(&server));
    let outcome = aggregator
        .search(
            "roguelike pricing",
            &[SourceKind::Reddit, SourceKind::StackExchange],
        )
        .await
        .unwrap();

    // The failing source contributes nothing; the other's results are intact
    assert_eq!(outcome.results.len(), 3);
    assert!(outcome.results.iter().all(|r| r.source == "reddit"));
    assert!(outcome.partial);
    assert!(!outcome.from_cache);
}

#[tokio::test]
async fn aggregator_serves_repeat_queries_from_cache() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api.php");
            then.status(200).json_body(json!({
                "620": { "appid": 620, "name": "Portal 2", "developer": "Valve", "owners": "10,000,000 .. 20,000,000", "positive": 200000, "negative": 2500, "average_forever": 800 }
            }));
        })
        .await;

    let aggregator = Aggregator::from_config(&test_sources_config(&server));

    let first = aggregator.search("portal", &[SourceKind::SteamSpy]).await.unwrap();
    assert!(!first.from_cache);

    let second = aggregator.search("portal", &[SourceKind::SteamSpy]).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.results.len(), first.results.len());

    // One upstream call total
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn aggregator_coalesces_concurrent_identical_queries() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api.php");
            then.status(200)
                .delay(std::time::Duration::from_millis(100))
                .json_body(json!({
                    "620": { "appid": 620, "name": "Portal 2", "developer": "Valve", "owners": "1 .. 2", "positive": 200000, "negative": 2500, "average_forever": 800 }
                }));
        })
        .await;

    let aggregator = Arc::new(Aggregator::from_config(&test_sources_config(&server)));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let aggregator = aggregator.clone();
        handles.push(tokio::spawn(async move {
            aggregator.search("portal", &[SourceKind::SteamSpy]).await
        }));
    }

    let mut cached = 0;
    for h in handles {
        let outcome = h.await.unwrap().unwrap();
        assert_eq!(outcome.results.len(), 1);
        if outcome.from_cache {
            cached += 1;
        }
    }

    // One leader fetched; the rest waited on the in-flight guard and hit
    // the cache
    assert_eq!(mock.hits_async().await, 1);
    assert_eq!(cached, 3);
}

#[tokio::test]
async fn aggregator_all_sources_failing_is_no_results() {
    let server = MockServer::start_async().await;
    for path in ["/search.json", "/2.3/search/advanced", "/api.php"] {
        server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(502);
            })
            .await;
    }

    let aggregator = Aggregator::from_config(&test_sources_config(&server));
    let result = aggregator
        .search(
            "anything",
            &[SourceKind::Reddit, SourceKind::StackExchange, SourceKind::SteamSpy],
        )
        .await;

    assert!(matches!(result, Err(GameloreError::NoResults(_))));
}

#[tokio::test]
async fn aggregator_merge_keeps_each_sources_block_contiguous() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search.json");
            then.status(200).json_body(reddit_listing());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2.3/search/advanced");
            then.status(200).json_body(json!({
                "items": [
                    { "title": "Q1", "link": "https://g.se/q/1", "score": 5, "answer_count": 1, "is_answered": true },
                    { "title": "Q2", "link": "https://g.se/q/2", "score": 3, "answer_count": 0, "is_answered": false }
                ]
            }));
        })
        .await;

    let aggregator = Aggregator::from_config(&test_sources_config(&server));
    let outcome = aggregator
        .search("anything", &[SourceKind::Reddit, SourceKind::StackExchange])
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 5);
    // Each source's run is contiguous and internally ordered
    let sources: Vec<&str> = outcome.results.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(
        sources,
        vec!["reddit", "reddit", "reddit", "stackexchange", "stackexchange"]
    );
    assert_eq!(outcome.results[3].title, "Q1");
    assert_eq!(outcome.results[4].title, "Q2");
}
