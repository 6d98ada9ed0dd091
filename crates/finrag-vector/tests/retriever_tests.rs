use std::sync::Arc;

use finrag_core::types::DocumentChunk;
use finrag_embed::FakeEmbedder;
use finrag_vector::{chunk_contents, ChunkWriter, Retriever};

fn sample_chunks(n: usize) -> Vec<DocumentChunk> {
    (0..n)
        .map(|i| DocumentChunk {
            id: format!("wb:{i}"),
            doc_id: "wb".to_string(),
            doc_path: "/data/model.xlsx".to_string(),
            sheet: "Forecast".to_string(),
            content: format!("projected revenue line {i}"),
            chunk_index: i,
            total_chunks: n,
        })
        .collect()
}

#[tokio::test]
async fn retrieve_respects_top_k_bounds() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder: Arc<dyn finrag_embed::Embedder> = Arc::new(FakeEmbedder::default());

    let conn = finrag_vector::table::open_db(&tmp.path().to_string_lossy()).await?;
    let writer = ChunkWriter::new(&conn, "chunks", embedder.clone());
    let written = writer.index_chunks(&sample_chunks(10)).await?;
    assert_eq!(written, 10);

    let retriever = Retriever::open(tmp.path(), "chunks", embedder).await?;

    // k below corpus size: exactly k results
    let hits = retriever.retrieve("projected revenue", 5).await?;
    assert_eq!(hits.len(), 5);

    // k above corpus size: all rows, no more
    let hits = retriever.retrieve("projected revenue", 50).await?;
    assert_eq!(hits.len(), 10);
    Ok(())
}

#[tokio::test]
async fn retrieve_orders_by_descending_score() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder: Arc<dyn finrag_embed::Embedder> = Arc::new(FakeEmbedder::default());

    let conn = finrag_vector::table::open_db(&tmp.path().to_string_lossy()).await?;
    ChunkWriter::new(&conn, "chunks", embedder.clone())
        .index_chunks(&sample_chunks(16))
        .await?;

    let retriever = Retriever::open(tmp.path(), "chunks", embedder).await?;
    let hits = retriever.retrieve("projected revenue line 3", 8).await?;
    assert_eq!(hits.len(), 8);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score, "hits must be ranked best-first");
    }

    // contents preserve hit order
    let contents = chunk_contents(&hits);
    for (hit, content) in hits.iter().zip(&contents) {
        assert_eq!(&hit.content, content);
    }
    Ok(())
}

#[tokio::test]
async fn open_fails_without_indexed_table() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder: Arc<dyn finrag_embed::Embedder> = Arc::new(FakeEmbedder::default());
    let result = Retriever::open(tmp.path(), "chunks", embedder).await;
    assert!(result.is_err(), "startup must fail when the index is missing");
    Ok(())
}

#[tokio::test]
async fn meta_records_embedder_identity() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder: Arc<dyn finrag_embed::Embedder> = Arc::new(FakeEmbedder::default());

    let conn = finrag_vector::table::open_db(&tmp.path().to_string_lossy()).await?;
    ChunkWriter::new(&conn, "chunks", embedder.clone())
        .index_chunks(&sample_chunks(4))
        .await?;

    let recorded =
        finrag_vector::table::get_meta(&conn, finrag_vector::table::EMBEDDER_ID_KEY).await?;
    assert_eq!(recorded.as_deref(), Some(embedder.id()));
    Ok(())
}
