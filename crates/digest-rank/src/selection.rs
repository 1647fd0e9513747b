use std::collections::HashMap;

use digest_core::config::SelectionConfig;
use digest_core::types::{RankedIndex, Section};

pub trait SelectionPolicy {
    /// Pick sections from `ranked` (best first), returning them in the same
    /// order. Indices refer into `sections`.
    fn select(&self, ranked: &[RankedIndex], sections: &[Section]) -> Vec<RankedIndex>;
}

/// Greedy top-`max_total` with at most `max_per_document` sections from any
/// one source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerDocumentCap {
    pub max_total: usize,
    pub max_per_document: usize,
}

impl PerDocumentCap {
    pub fn new(max_total: usize, max_per_document: usize) -> Self {
        Self { max_total, max_per_document }
    }
}

impl Default for PerDocumentCap {
    fn default() -> Self {
        Self::from(&SelectionConfig::default())
    }
}

impl From<&SelectionConfig> for PerDocumentCap {
    fn from(cfg: &SelectionConfig) -> Self {
        Self::new(cfg.max_sections, cfg.max_per_document)
    }
}

impl SelectionPolicy for PerDocumentCap {
    fn select(&self, ranked: &[RankedIndex], sections: &[Section]) -> Vec<RankedIndex> {
        let mut picked = Vec::with_capacity(self.max_total.min(ranked.len()));
        let mut per_doc: HashMap<&str, usize> = HashMap::new();
        for r in ranked {
            if picked.len() >= self.max_total {
                break;
            }
            let Some(section) = sections.get(r.index) else { continue };
            let count = per_doc.entry(section.source_document.as_str()).or_insert(0);
            if *count < self.max_per_document {
                *count += 1;
                picked.push(*r);
            }
        }
        picked
    }
}
