//! Offline chunk writer: embeds each chunk and appends it to the chunks
//! table. Runs once per corpus build; query-time code never writes.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::sync::Arc;

use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};

use finrag_core::traits::Embedder;
use finrag_core::types::{DocumentChunk, EMBEDDING_DIM};

use crate::schema::build_chunks_schema;
use crate::table::{set_meta, table_exists, EMBEDDER_ID_KEY};

const WRITE_BATCH: usize = 512;

pub struct ChunkWriter<'a> {
    conn: &'a Connection,
    table_name: String,
    embedder: Arc<dyn Embedder>,
}

impl<'a> ChunkWriter<'a> {
    pub fn new(conn: &'a Connection, table_name: &str, embedder: Arc<dyn Embedder>) -> Self {
        Self { conn, table_name: table_name.to_string(), embedder }
    }

    /// Embed and store all chunks, recording the embedder id in the meta
    /// table so retrieval can detect a provider mismatch later.
    pub async fn index_chunks(&self, chunks: &[DocumentChunk]) -> Result<usize> {
        if chunks.is_empty() {
            tracing::warn!("no chunks to index");
            return Ok(0);
        }
        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?
                .progress_chars("#>-"),
        );

        let mut pending: Vec<(DocumentChunk, Vec<f32>)> = Vec::new();
        let mut written = 0usize;
        for (i, chunk) in chunks.iter().enumerate() {
            let vector = self.embedder.embed_one(&chunk.content).await?;
            pending.push((chunk.clone(), vector));
            pb.set_position((i + 1) as u64);
            if pending.len() >= WRITE_BATCH || i == chunks.len() - 1 {
                written += pending.len();
                self.insert_batch(&pending).await?;
                pending.clear();
            }
        }
        pb.finish_with_message("indexing complete");

        set_meta(self.conn, EMBEDDER_ID_KEY, self.embedder.id()).await?;
        Ok(written)
    }

    async fn insert_batch(&self, rows: &[(DocumentChunk, Vec<f32>)]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let batch = rows_to_record_batch(rows)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        if table_exists(self.conn, &self.table_name).await? {
            let table = self.conn.open_table(&self.table_name).execute().await?;
            table.add(reader).execute().await?;
        } else {
            self.conn.create_table(&self.table_name, reader).execute().await?;
        }
        Ok(())
    }
}

fn rows_to_record_batch(rows: &[(DocumentChunk, Vec<f32>)]) -> Result<RecordBatch> {
    let schema = build_chunks_schema();
    let mut ids = Vec::new();
    let mut doc_ids = Vec::new();
    let mut doc_paths = Vec::new();
    let mut sheets = Vec::new();
    let mut contents = Vec::new();
    let mut chunk_indices = Vec::new();
    let mut totals = Vec::new();
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
    for (chunk, vector) in rows {
        ids.push(chunk.id.clone());
        doc_ids.push(chunk.doc_id.clone());
        doc_paths.push(chunk.doc_path.clone());
        sheets.push(chunk.sheet.clone());
        contents.push(chunk.content.clone());
        chunk_indices.push(chunk.chunk_index as i32);
        totals.push(chunk.total_chunks as i32);
        vectors.push(Some(vector.iter().map(|&x| Some(x)).collect()));
    }
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(doc_ids)),
            Arc::new(StringArray::from(doc_paths)),
            Arc::new(StringArray::from(sheets)),
            Arc::new(StringArray::from(contents)),
            Arc::new(Int32Array::from(chunk_indices)),
            Arc::new(Int32Array::from(totals)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(vectors.into_iter(), EMBEDDING_DIM as i32)),
        ],
    )?;
    Ok(batch)
}
