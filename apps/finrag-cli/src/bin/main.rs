//! Interactive financial document analyzer.
//!
//! Loads the pre-built chunk index and answers questions against it, one
//! blocking round trip per submission: retrieve context, call the model,
//! render the result.

use std::io::{self, Write};
use std::sync::Arc;

use finrag_answer::{Answerer, AnswerResult};
use finrag_core::config::{expand_path, Config};
use finrag_embed::embedder_from_config;
use finrag_vector::{chunk_contents, Retriever, DEFAULT_TOP_K};

/// Everything built once at startup and reused read-only across queries.
struct AppContext {
    retriever: Retriever,
    answerer: Answerer,
    embedder_id: String,
    index_dir: String,
    table: String,
    top_k: usize,
}

impl AppContext {
    async fn build(config: &Config) -> anyhow::Result<Self> {
        let index_dir: String =
            config.get_or("data.index_dir", "data/index/lancedb".to_string())?;
        let table: String = config.get_or("data.table", "chunks".to_string())?;
        let top_k: usize = config.get_or("retrieval.top_k", DEFAULT_TOP_K)?;

        let embedder = embedder_from_config(config)?;
        let embedder_id = embedder.id().to_string();
        let db_path = expand_path(&index_dir);
        let retriever = Retriever::open(&db_path, &table, Arc::clone(&embedder)).await?;
        let answerer = Answerer::from_config(config)?;

        Ok(Self { retriever, answerer, embedder_id, index_dir, table, top_k })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let ctx = AppContext::build(&config).await?;

    println!("💼 Financial Document Analyzer");
    println!("==============================");
    println!("✅ Index loaded: {} (table: {})", ctx.index_dir, ctx.table);
    println!();
    show_help();

    loop {
        print!("ask> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break; // EOF
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/help" | "/h" => show_help(),
            "/stats" | "/s" => show_stats(&ctx),
            "/quit" | "/q" | "quit" | "exit" => {
                println!("👋 Goodbye!");
                break;
            }
            query => run_query(&ctx, query).await,
        }
        println!();
    }

    Ok(())
}

async fn run_query(ctx: &AppContext, query: &str) {
    let hits = match ctx.retriever.retrieve(query, ctx.top_k).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::error!(error = %e, "retrieval failed");
            println!("❌ Retrieval failed: {e}");
            return;
        }
    };
    tracing::debug!(retrieved = hits.len(), "context assembled");

    match ctx.answerer.answer(query, &chunk_contents(&hits)).await {
        Ok(AnswerResult::Text(text)) => println!("{text}"),
        Ok(AnswerResult::CusipList(cusips)) => {
            if cusips.is_empty() {
                println!("(none found)");
            } else {
                for cusip in cusips {
                    println!("{cusip}");
                }
            }
        }
        // A failed generation discards the retrieval work for this query;
        // the loop itself keeps going.
        Err(e) => {
            tracing::error!(error = %e, "generation failed");
            println!("⚠️  No answer produced ({e})");
        }
    }
}

fn show_help() {
    println!("🎯 Commands:");
    println!("  /help     - Show this help message");
    println!("  /stats    - Show index and model settings");
    println!("  /quit     - Exit");
    println!("  <query>   - Ask a question about the indexed spreadsheets");
    println!();
    println!("  Tip: \"list all cusip numbers\" returns identifiers as a plain list.");
}

fn show_stats(ctx: &AppContext) {
    println!("📈 Settings");
    println!("===========");
    println!("  Index dir: {}", ctx.index_dir);
    println!("  Table:     {}", ctx.table);
    println!("  Embedder:  {}", ctx.embedder_id);
    println!("  Top-K:     {}", ctx.top_k);
}
