use anyhow::Result;
use clap::Parser;
use gamelore::embeddings::Embedder;
use gamelore::sources::Aggregator;
use gamelore::{Config, KnowledgeRouter, Store};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "search")]
#[command(about = "Query gamelore collections or live sources by domain")]
struct Args {
    /// Search query
    query: String,

    /// Domain tag: patterns, engine, narrative, market, or forum
    #[arg(short, long, default_value = "patterns")]
    domain: String,

    /// Number of results for collection domains
    #[arg(short = 'k', long)]
    top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.gamelore.log_level.as_str()),
    )
    .init();

    let embedder = Arc::new(Embedder::from_config(&config.embeddings));
    let store = Arc::new(Store::open(&config, embedder));
    let aggregator = Aggregator::from_config(&config.sources);
    let router = KnowledgeRouter::new(store.clone(), aggregator, &config);

    let k = args.top_k.unwrap_or(config.search.default_k);

    let start = Instant::now();
    let results = router.search_results(&args.domain, &args.query, k).await;
    let duration = start.elapsed();

    println!("Query: \"{}\" (domain: {})\n", args.query, args.domain);

    match results {
        Ok(results) if !results.is_empty() => {
            for (rank, r) in results.iter().enumerate() {
                println!("#{} [{}] (score {:.3})", rank + 1, r.source, r.relevance);
                let preview: String = r.content.chars().take(200).collect();
                let ellipsis = if r.content.chars().count() > 200 { "..." } else { "" };
                println!("{}{}\n", preview, ellipsis);
            }
            println!("{} result(s) in {:?}", results.len(), duration);
            if store.is_mock() {
                println!("(served by the mock store)");
            }
        }
        Ok(_) => println!("no results found for domain {}", args.domain),
        Err(e) => println!("research lookup failed for domain {}: {}", args.domain, e),
    }

    Ok(())
}
