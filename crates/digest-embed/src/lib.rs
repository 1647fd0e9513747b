//! Sentence embeddings for section ranking.
//!
//! `MiniLmEmbedder` runs a BERT sentence-transformer (all-MiniLM-L6-v2 by
//! default) through candle with mean pooling and L2 normalization.
//! `HashEmbedder` is a deterministic stand-in for tests and offline runs,
//! selected with `embedding.use_fake` or `APP_USE_FAKE_EMBEDDINGS=1`.

use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::{api::sync::ApiBuilder, Repo, RepoType};
use tokenizers::Tokenizer;

use digest_core::config::EmbeddingConfig;
use digest_core::error::DigestError;
use digest_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod similarity;
pub mod tokenize;

pub use pool::masked_mean_l2;
pub use similarity::cosine_similarity;

/// Output width of all-MiniLM-L6-v2; the hash embedder matches it.
pub const MINILM_DIM: usize = 384;

struct ModelFiles { config: PathBuf, tokenizer: PathBuf, weights: PathBuf }

pub struct MiniLmEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl MiniLmEmbedder {
    pub fn load(cfg: &EmbeddingConfig) -> Result<Self> {
        let device = device::select_device();
        let files = resolve_model_files(cfg)?;
        tracing::info!(model = %cfg.model_id, "Loading embedding model");

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", files.tokenizer.display(), e))?;
        tokenize::configure_truncation(&mut tokenizer, cfg.max_len)?;
        let config_str = std::fs::read_to_string(&files.config)
            .with_context(|| format!("Failed to read {}", files.config.display()))?;
        let bert_config: BertConfig = serde_json::from_str(&config_str)?;
        let raw_config: serde_json::Value = serde_json::from_str(&config_str)?;
        let dim = raw_config.get("hidden_size").and_then(serde_json::Value::as_u64).map_or(MINILM_DIM, |d| d as usize);

        let vb = if files.weights.extension().and_then(|e| e.to_str()) == Some("safetensors") {
            // SAFETY: the weights file is not modified while the model is alive.
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device)? }
        } else {
            let weights = candle_core::pickle::read_all(&files.weights)?;
            let weights_map: std::collections::HashMap<String, candle_core::Tensor> = weights.into_iter().collect();
            VarBuilder::from_tensors(weights_map, DType::F32, &device)
        };
        let model = BertModel::load(vb, &bert_config)?;
        tracing::info!(dim, max_len = cfg.max_len, "Embedding model ready");
        Ok(Self { model, tokenizer, device, dim, max_len: cfg.max_len })
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let inputs = tokenize::tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let hidden = self.model.forward(&inputs.input_ids, &inputs.token_type_ids, Some(&inputs.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &inputs.attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        tracing::debug!(batch = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Embedded batch");
        Ok(vectors)
    }
}

impl Embedder for MiniLmEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_texts(texts).map_err(|e| DigestError::Embedding(format!("{e:#}")).into())
    }
}

/// Deterministic bag-of-words hashing embedder. Identical inputs always map to
/// identical unit vectors; shared words pull vectors together.
pub struct HashEmbedder { dim: usize }

impl HashEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher}; use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0); token.hash(&mut hasher); let h = hasher.finish();
            let idx = (h as usize) % self.dim; let val = 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

fn fake_requested(cfg: &EmbeddingConfig) -> bool {
    cfg.use_fake || std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Build the embedder for this run. Called once at startup; the result is
/// passed explicitly to the ranker.
pub fn get_default_embedder(cfg: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    if fake_requested(cfg) { tracing::warn!("Using HashEmbedder; rankings are lexical, not semantic"); return Ok(Box::new(HashEmbedder::new(MINILM_DIM))); }
    Ok(Box::new(MiniLmEmbedder::load(cfg)?))
}

fn resolve_model_files(cfg: &EmbeddingConfig) -> Result<ModelFiles> {
    if let Some(dir) = resolve_model_dir(cfg) {
        let weights = ["model.safetensors", "pytorch_model.bin"].iter().map(|f| dir.join(f)).find(|p| p.exists())
            .ok_or_else(|| anyhow!("No model.safetensors or pytorch_model.bin in {}", dir.display()))?;
        return Ok(ModelFiles { config: dir.join("config.json"), tokenizer: dir.join("tokenizer.json"), weights });
    }
    tracing::info!(model = %cfg.model_id, "No local model directory; fetching from the Hugging Face hub");
    let api = ApiBuilder::new().with_progress(false).build().context("Failed to create Hugging Face API")?;
    let repo = api.repo(Repo::new(cfg.model_id.clone(), RepoType::Model));
    Ok(ModelFiles {
        config: repo.get("config.json").context("Failed to get config.json")?,
        tokenizer: repo.get("tokenizer.json").context("Failed to get tokenizer.json")?,
        weights: repo.get("model.safetensors").context("Failed to get model.safetensors")?,
    })
}

fn resolve_model_dir(cfg: &EmbeddingConfig) -> Option<PathBuf> {
    if let Some(dir) = cfg.model_dir.as_ref().filter(|p| p.exists()) { tracing::info!("Using configured model dir: {}", dir.display()); return Some(dir.clone()); }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { let p = PathBuf::from(&dir); if p.exists() { tracing::info!("Using {}: {}", var, p.display()); return Some(p); } }
    }
    let name = cfg.model_id.rsplit('/').next().unwrap_or(&cfg.model_id);
    let local = Path::new("models").join(name);
    if local.exists() { tracing::info!("Using model dir: {}", local.display()); return Some(local); }
    None
}
