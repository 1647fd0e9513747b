use std::path::Path;

use crate::types::OutlineEntry;

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// An opened PDF. Page indices are 0-based.
pub trait PdfDocument {
    fn page_count(&self) -> usize;
    fn page_text(&self, index: usize) -> anyhow::Result<String>;
    /// Outline entries in document order. Empty when the file has no ToC.
    fn outline(&self) -> anyhow::Result<Vec<OutlineEntry>>;
}

pub trait PdfLoader: Send + Sync {
    fn open(&self, path: &Path) -> anyhow::Result<Box<dyn PdfDocument>>;
}
