use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

use finrag_core::types::EMBEDDING_DIM;

/// Arrow schema for the chunks table: one row per document chunk with its
/// embedding stored as a fixed-size float list.
pub fn build_chunks_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("doc_id", DataType::Utf8, false),
        Field::new("doc_path", DataType::Utf8, false),
        Field::new("sheet", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("chunk_index", DataType::Int32, false),
        Field::new("total_chunks", DataType::Int32, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIM as i32,
            ),
            true,
        ),
    ]))
}

/// Key/value meta table recording which embedder produced the stored
/// vectors.
pub fn build_meta_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("key", DataType::Utf8, false),
        Field::new("value", DataType::Utf8, false),
    ]))
}
