//! Hosted embedding provider: one HTTPS request per text against a
//! Titan-style embedding endpoint. Failures propagate unmodified; there is
//! no retry or fallback here.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use finrag_core::config::Config;
use finrag_core::traits::Embedder;
use finrag_core::types::EMBEDDING_DIM;

pub struct HostedEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    normalize: bool,
    id: String,
}

impl HostedEmbedder {
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint: String = config.get("embedding.endpoint")?;
        if endpoint.is_empty() {
            bail!("embedding.endpoint is required for the hosted provider");
        }
        let model = config.get_or("embedding.model", "titan-embed-text-v2".to_string())?;
        let dimensions = config.get_or("embedding.dimensions", EMBEDDING_DIM)?;
        let normalize = config.get_or("embedding.normalize", true)?;
        let api_key = config.api_key("embedding.api_key", "EMBEDDING_API_KEY");
        let id = format!("hosted:{model}:d{dimensions}");
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
            dimensions,
            normalize,
            id,
        })
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": self.model,
            "inputText": text,
            "dimensions": self.dimensions,
            "normalize": self.normalize,
        });
        let mut req = self.client.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let resp = req
            .send()
            .await
            .map_err(|e| anyhow!("embedding request failed ({}): {}", self.endpoint, e))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("embedding API error {}: {}", status, text);
        }
        let payload: Value = resp.json().await?;
        parse_embedding(&payload, self.dimensions)
    }
}

pub(crate) fn parse_embedding(payload: &Value, dimensions: usize) -> Result<Vec<f32>> {
    let values = payload["embedding"]
        .as_array()
        .ok_or_else(|| anyhow!("embedding response missing 'embedding' array"))?;
    let vector: Vec<f32> = values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| anyhow!("non-numeric value in embedding"))
        })
        .collect::<Result<_>>()?;
    if vector.len() != dimensions {
        bail!("embedding has {} dims, expected {}", vector.len(), dimensions);
    }
    Ok(vector)
}

#[async_trait]
impl Embedder for HostedEmbedder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.request_embedding(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedding_array() {
        let payload = json!({ "embedding": [0.1, -0.2, 0.3] });
        let v = parse_embedding(&payload, 3).expect("parse");
        assert_eq!(v.len(), 3);
        assert!((v[1] + 0.2).abs() < 1e-6);
    }

    #[test]
    fn rejects_missing_or_short_embedding() {
        assert!(parse_embedding(&json!({}), 3).is_err());
        assert!(parse_embedding(&json!({ "embedding": [0.1] }), 3).is_err());
        assert!(parse_embedding(&json!({ "embedding": ["x", "y", "z"] }), 3).is_err());
    }
}
