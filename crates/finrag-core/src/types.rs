//! Domain types shared by the index, retrieval and answer layers.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// Embedding dimensionality used across the index. Chunk vectors and query
/// vectors must both have this dimension, produced by the same embedder.
pub const EMBEDDING_DIM: usize = 1024;

/// A chunk of an indexed spreadsheet document.
///
/// - `id`: globally unique chunk identifier
/// - `doc_id`: stable document identity (workbook file stem or external id)
/// - `doc_path`: original path to the source workbook
/// - `sheet`: the tab the chunk was extracted from
/// - `content`: the text payload of the chunk
/// - `chunk_index`/`total_chunks`: position within the parent document
///
/// Chunks are produced offline by the indexer and are immutable at query
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub doc_id: String,
    pub doc_path: String,
    pub sheet: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// A chunk returned by vector retrieval, ranked by descending similarity.
/// `score` is `1.0 - distance`; higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub id: ChunkId,
    pub score: f32,
    pub sheet: String,
    pub path: String,
    pub content: String,
}
