#![deny(warnings)]
#![deny(unused_imports)]

//! Embedder implementations: a local candle model, a hosted embedding API,
//! and a deterministic fake for tests. Selection happens once at startup
//! via [`embedder_from_config`]; the rest of the system only sees the
//! [`Embedder`] trait.

pub mod device;
pub mod fake;
pub mod hosted;
pub mod local;
pub mod pool;

use std::sync::Arc;

use anyhow::{bail, Result};
use finrag_core::config::Config;
pub use finrag_core::traits::Embedder;

pub use fake::FakeEmbedder;
pub use hosted::HostedEmbedder;
pub use local::LocalModel;

fn fake_requested_by_env() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Build the embedder selected by `embedding.provider` ("local", "hosted"
/// or "fake"). `APP_USE_FAKE_EMBEDDINGS=1` overrides the configured
/// provider, matching how tests force deterministic vectors.
pub fn embedder_from_config(config: &Config) -> Result<Arc<dyn Embedder>> {
    if fake_requested_by_env() {
        tracing::info!("using fake embedder (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Arc::new(FakeEmbedder::default()));
    }
    let provider = config.get_or("embedding.provider", "local".to_string())?;
    match provider.as_str() {
        "fake" => Ok(Arc::new(FakeEmbedder::default())),
        "hosted" => Ok(Arc::new(HostedEmbedder::from_config(config)?)),
        "local" => {
            let configured: Option<String> = config.get("embedding.model_dir").ok();
            let model_dir = local::resolve_model_dir(configured.as_deref())?;
            Ok(Arc::new(LocalModel::load(&model_dir)?))
        }
        other => bail!("unknown embedding provider '{}'", other),
    }
}
