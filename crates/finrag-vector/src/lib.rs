#![deny(warnings)]
#![deny(unused_imports)]

pub mod retriever;
pub mod schema;
pub mod table;
pub mod writer;

pub use retriever::{chunk_contents, Retriever, DEFAULT_TOP_K};
pub use writer::ChunkWriter;
