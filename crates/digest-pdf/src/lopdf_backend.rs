use anyhow::{Result, anyhow};
use std::path::Path;

use lopdf::Document;

use digest_core::error::DigestError;
use digest_core::traits::{PdfDocument, PdfLoader};
use digest_core::types::OutlineEntry;

/// Pure-Rust backend built on `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfLoader;

impl PdfLoader for LopdfLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>> {
        let doc = Document::load(path).map_err(|e| DigestError::Pdf { path: path.to_path_buf(), message: e.to_string() })?;
        Ok(Box::new(LopdfDocument::new(doc)))
    }
}

pub struct LopdfDocument {
    doc: Document,
    page_numbers: Vec<u32>,
}

impl LopdfDocument {
    pub fn new(doc: Document) -> Self {
        // get_pages is keyed by 1-based page number, already in order.
        let page_numbers = doc.get_pages().into_keys().collect();
        Self { doc, page_numbers }
    }
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> usize { self.page_numbers.len() }

    fn page_text(&self, index: usize) -> Result<String> {
        let page = *self.page_numbers.get(index).ok_or_else(|| anyhow!("page index {} out of range ({} pages)", index, self.page_numbers.len()))?;
        self.doc.extract_text(&[page]).map_err(|e| anyhow!("text extraction failed on page {}: {}", page, e))
    }

    fn outline(&self) -> Result<Vec<OutlineEntry>> {
        match self.doc.get_toc() {
            Ok(toc) => {
                for err in &toc.errors { tracing::debug!("Outline warning: {}", err); }
                Ok(toc.toc.into_iter().map(|t| OutlineEntry { level: t.level, title: t.title, page: t.page }).collect())
            }
            // lopdf reports a missing outline as an error; that is the "no ToC" case.
            Err(lopdf::Error::NoOutlines) => { tracing::debug!("Document has no outline"); Ok(Vec::new()) }
            Err(e) => { tracing::warn!("Outline present but unreadable, using the full document: {}", e); Ok(Vec::new()) }
        }
    }
}
