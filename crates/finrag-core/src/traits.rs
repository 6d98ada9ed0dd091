use async_trait::async_trait;

/// Turns text into a fixed-length vector for similarity search.
///
/// The same implementation (same `id`) must be used for index-time chunk
/// vectors and query-time vectors or similarity scores are meaningless.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g., `local:bge-m3:d1024`).
    fn id(&self) -> &str;

    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed a batch of texts. Implemented as repeated single-text calls;
    /// providers do not batch.
    async fn embed_many(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed_one(text).await?);
        }
        Ok(out)
    }
}
