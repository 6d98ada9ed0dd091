//! Offline index build: read document chunks from JSONL, embed them, and
//! write the LanceDB chunks table the analyzer queries at runtime.

use std::env;
use std::path::PathBuf;

use finrag_core::config::{expand_path, Config};
use finrag_core::corpus::read_chunks_jsonl;
use finrag_embed::embedder_from_config;
use finrag_vector::ChunkWriter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <chunks.jsonl> [index_dir] [table_name]", args[0]);
        eprintln!("Example: {} data/chunks.jsonl data/index/lancedb chunks", args[0]);
        std::process::exit(1);
    }
    let chunks_path = PathBuf::from(&args[1]);

    let config = Config::load()?;
    let index_dir = match args.get(2) {
        Some(dir) => dir.clone(),
        None => config.get_or("data.index_dir", "data/index/lancedb".to_string())?,
    };
    let table = match args.get(3) {
        Some(t) => t.clone(),
        None => config.get_or("data.table", "chunks".to_string())?,
    };

    println!("📚 finrag-indexer");
    println!("=================");
    println!("Chunks:    {}", chunks_path.display());
    println!("Index dir: {index_dir}");
    println!("Table:     {table}");

    let chunks = read_chunks_jsonl(&chunks_path)?;
    println!("Read {} chunks", chunks.len());

    let embedder = embedder_from_config(&config)?;
    println!("Embedder:  {}", embedder.id());

    let db_path = expand_path(&index_dir);
    let conn = finrag_vector::table::open_db(db_path.to_string_lossy().as_ref()).await?;
    let writer = ChunkWriter::new(&conn, &table, embedder);
    let written = writer.index_chunks(&chunks).await?;

    println!("📊 Indexed {written} chunks into table '{table}'");
    Ok(())
}
