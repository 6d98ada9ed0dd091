//! Query-time retrieval over the pre-built chunks table.
//!
//! `open` is called once at process start; a missing database or table is
//! fatal there. `retrieve` embeds the query through the injected embedder
//! and returns up to `top_k` chunks in descending-similarity order, with
//! no deduplication, score threshold, or re-ranking.

use anyhow::{anyhow, bail, Result};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;

use arrow_array::{Float32Array, StringArray};

use finrag_core::traits::Embedder;
use finrag_core::types::RetrievedChunk;

use crate::table::{get_meta, open_db, table_exists, EMBEDDER_ID_KEY};

/// Default number of chunks pulled into the prompt context.
pub const DEFAULT_TOP_K: usize = 75;

pub struct Retriever {
    conn: Connection,
    table_name: String,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub async fn open(
        db_path: &Path,
        table_name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let conn = open_db(db_path.to_string_lossy().as_ref()).await?;
        if !table_exists(&conn, table_name).await? {
            bail!(
                "chunks table '{}' not found in {} (run finrag-indexer first)",
                table_name,
                db_path.display()
            );
        }
        // The index only makes sense when queried with the embedder that
        // built it; warn when the recorded identity differs.
        match get_meta(&conn, EMBEDDER_ID_KEY).await? {
            Some(recorded) if recorded != embedder.id() => {
                tracing::warn!(
                    recorded = %recorded,
                    active = %embedder.id(),
                    "index was built with a different embedder; similarity scores are unreliable"
                );
            }
            None => {
                tracing::warn!("index records no embedder identity");
            }
            _ => {}
        }
        Ok(Self { conn, table_name: table_name.to_string(), embedder })
    }

    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let query_vector = self.embedder.embed_one(query).await?;
        let table = self.conn.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .vector_search(query_vector)?
            .limit(top_k)
            .execute()
            .await?;

        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            for i in 0..batch.num_rows() {
                hits.push(RetrievedChunk {
                    id: string_value(&batch, "id", i)?,
                    score: 1.0 - distance_value(&batch, i),
                    sheet: string_value(&batch, "sheet", i)?,
                    path: string_value(&batch, "doc_path", i)?,
                    content: string_value(&batch, "content", i)?,
                });
            }
        }
        Ok(hits)
    }
}

/// Extract chunk texts in retrieval order; the answer layer must not
/// re-sort them.
pub fn chunk_contents(hits: &[RetrievedChunk]) -> Vec<String> {
    hits.iter().map(|h| h.content.clone()).collect()
}

fn string_value(batch: &arrow_array::RecordBatch, column: &str, row: usize) -> Result<String> {
    let col = batch
        .column_by_name(column)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("column '{}' missing from chunks table", column))?;
    Ok(col.value(row).to_string())
}

fn distance_value(batch: &arrow_array::RecordBatch, row: usize) -> f32 {
    for name in ["_distance", "distance"] {
        if let Some(col) = batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        {
            return col.value(row);
        }
    }
    0.5
}
