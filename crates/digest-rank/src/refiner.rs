use digest_core::config::RefineConfig;
use digest_core::text::truncate_with_ellipsis;

use crate::sentences::{overlap_score, split_sentences, word_set};

/// Builds an extractive snippet from the sentences of a section that share
/// words with the persona/job query.
#[derive(Debug, Clone)]
pub struct Refiner {
    max_chars: usize,
    fallback_sentences: usize,
}

impl Default for Refiner {
    fn default() -> Self {
        Self::from(&RefineConfig::default())
    }
}

impl From<&RefineConfig> for Refiner {
    fn from(cfg: &RefineConfig) -> Self {
        Self { max_chars: cfg.max_chars, fallback_sentences: cfg.fallback_sentences }
    }
}

impl Refiner {
    pub fn new(max_chars: usize, fallback_sentences: usize) -> Self {
        Self { max_chars, fallback_sentences }
    }

    /// Sentences with at least one query word, best-scoring first (ties keep
    /// text order), joined by single spaces. When nothing matches, the first
    /// `fallback_sentences` sentences are used instead.
    pub fn refine(&self, text: &str, persona: &str, job: &str) -> String {
        let sentences = split_sentences(text);
        let keywords = word_set(&format!("{persona} {job}"));

        let mut scored: Vec<(usize, &str)> = sentences.iter().map(|s| (overlap_score(s, &keywords), *s)).collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut picked: Vec<&str> = scored.iter().filter(|(score, _)| *score > 0).map(|(_, s)| *s).collect();
        if picked.is_empty() {
            picked = sentences.iter().take(self.fallback_sentences).copied().collect();
        }

        truncate_with_ellipsis(picked.join(" ").trim(), self.max_chars)
    }
}
