//! Local sentence-embedding model (BGE-M3, an XLM-RoBERTa encoder) run
//! through candle. Deterministic for fixed weights; one forward pass per
//! text, no batching.

use anyhow::{anyhow, ensure, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

use finrag_core::traits::Embedder;
use finrag_core::types::EMBEDDING_DIM;

use crate::device::select_device;
use crate::pool::mean_pool_l2;

// XLM-RoBERTa pad token id.
const PAD_ID: u32 = 1;
const MAX_LEN: usize = 256;

pub struct LocalModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    id: String,
}

impl LocalModel {
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = select_device();
        tracing::info!("loading embedding model from {}", model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e)
        })?;

        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig =
            serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> =
            weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        tracing::info!("embedding model ready");

        Ok(Self {
            model,
            tokenizer,
            device,
            id: format!("local:bge-m3:d{}", EMBEDDING_DIM),
        })
    }

    fn encode_padded(&self, text: &str) -> Result<(Tensor, Tensor)> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        if ids.len() > MAX_LEN {
            ids.truncate(MAX_LEN);
            mask.truncate(MAX_LEN);
        }
        if ids.len() < MAX_LEN {
            let pad = MAX_LEN - ids.len();
            ids.extend(std::iter::repeat(PAD_ID).take(pad));
            mask.extend(std::iter::repeat(0).take(pad));
        }
        let input_ids = Tensor::from_iter(ids, &self.device)?.reshape((1, MAX_LEN))?;
        let attention_mask = Tensor::from_iter(mask, &self.device)?.reshape((1, MAX_LEN))?;
        Ok((input_ids, attention_mask))
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) = self.encode_padded(text)?;
        let token_type_ids = Tensor::zeros((1, MAX_LEN), DType::I64, &self.device)?;
        let hidden =
            self.model
                .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = mean_pool_l2(&hidden, &attention_mask)?;
        let vector: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        ensure!(
            vector.len() == EMBEDDING_DIM,
            "model produced {}-dim vector, expected {}",
            vector.len(),
            EMBEDDING_DIM
        );
        Ok(vector)
    }
}

#[async_trait]
impl Embedder for LocalModel {
    fn id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(text)
    }
}

/// Locate the model directory: explicit config value, then `APP_MODEL_DIR`
/// / `MODEL_DIR`, then the conventional in-repo location.
pub fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = finrag_core::config::expand_path(dir);
        if p.exists() {
            return Ok(p);
        }
        return Err(anyhow!("configured model dir {} does not exist", p.display()));
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() {
                tracing::info!("using {}: {}", var, p.display());
                return Ok(p);
            }
        }
    }
    let conventional = Path::new("models/bge-m3");
    if conventional.exists() {
        return Ok(conventional.to_path_buf());
    }
    Err(anyhow!("Could not locate embedding model directory"))
}
