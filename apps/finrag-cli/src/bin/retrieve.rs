//! One-shot retrieval printout for inspecting what context a query would
//! pull into the prompt, without calling the generation API.

use std::env;

use finrag_core::config::{expand_path, Config};
use finrag_embed::embedder_from_config;
use finrag_vector::Retriever;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [--limit N]", args[0]);
        eprintln!("Example: {} 'total revenue 2023' --limit 10", args[0]);
        std::process::exit(1);
    }
    let query = &args[1];
    let mut limit = 10usize;
    let mut i = 2;
    while i < args.len() {
        if args[i] == "--limit" {
            match args.get(i + 1).and_then(|s| s.parse::<usize>().ok()) {
                Some(n) => {
                    limit = n;
                    i += 1;
                }
                None => {
                    eprintln!("Error: --limit requires a number");
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    let config = Config::load()?;
    let index_dir: String = config.get_or("data.index_dir", "data/index/lancedb".to_string())?;
    let table: String = config.get_or("data.table", "chunks".to_string())?;

    println!("🔍 finrag-retrieve");
    println!("==================");
    println!("Query: {query}");
    println!("Index dir: {index_dir}  Table: {table}");

    let embedder = embedder_from_config(&config)?;
    let retriever = Retriever::open(&expand_path(&index_dir), &table, embedder).await?;
    let hits = retriever.retrieve(query, limit).await?;

    println!("\n🔍 Found {} results for: \"{}\"", hits.len(), query);
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "\n  {}. score={:.4}  id={}  sheet={}  path={}",
            i + 1,
            hit.score,
            hit.id,
            hit.sheet,
            hit.path
        );
        println!("     📝 Content: {}", hit.content);
    }
    Ok(())
}
