use anyhow::{Result, anyhow};

use digest_core::traits::Embedder;
use digest_core::types::{RankedIndex, Section};
use digest_embed::cosine_similarity;

/// Orders sections by cosine similarity between the `"{persona} {job}"`
/// query and each section's `"{title} {text}"`.
pub struct Ranker<'a> {
    embedder: &'a dyn Embedder,
    batch_size: usize,
}

impl<'a> Ranker<'a> {
    pub fn new(embedder: &'a dyn Embedder, batch_size: usize) -> Self {
        Self { embedder, batch_size: batch_size.max(1) }
    }

    /// Every input index exactly once, highest similarity first. Equal scores
    /// keep their input order.
    pub fn rank(&self, sections: &[Section], persona: &str, job: &str) -> Result<Vec<RankedIndex>> {
        if sections.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("{persona} {job}");
        let query_vec = self
            .embedder
            .embed_batch(&[query])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;

        let texts: Vec<String> = sections.iter().map(Section::embedding_text).collect();
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embedder.embed_batch(batch)?);
        }
        if vectors.len() != sections.len() {
            return Err(anyhow!("embedder returned {} vectors for {} sections", vectors.len(), sections.len()));
        }

        let mut ranked: Vec<RankedIndex> = vectors
            .iter()
            .enumerate()
            .map(|(index, v)| RankedIndex { index, score: cosine_similarity(&query_vec, v) })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        if let Some(top) = ranked.first() {
            tracing::debug!(best = top.index, score = top.score, "Ranked {} sections", ranked.len());
        }
        Ok(ranked)
    }
}
