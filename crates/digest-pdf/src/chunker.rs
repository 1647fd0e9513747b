use anyhow::Result;
use std::path::Path;

use digest_core::traits::{PdfDocument, PdfLoader};
use digest_core::types::{Section, FULL_DOCUMENT_TITLE, UNTITLED_SECTION};

/// Open `path` with `loader` and split it into sections.
pub fn chunk_pdf(loader: &dyn PdfLoader, path: &Path) -> Result<Vec<Section>> {
    let doc = loader.open(path)?;
    let source_document = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    chunk_document(doc.as_ref(), &source_document)
}

/// Split an opened document into one section per outline entry.
///
/// Entry `i` covers pages `[start_i, start_{i+1})`, the last one running to the
/// end of the document. Start pages are clamped into `[1, page_count]`; an
/// entry whose successor starts earlier gets an empty range. Without an outline
/// the whole document becomes a single "Full Document" section.
pub fn chunk_document(doc: &dyn PdfDocument, source_document: &str) -> Result<Vec<Section>> {
    let page_count = doc.page_count();
    let outline = doc.outline()?;

    if outline.is_empty() {
        tracing::debug!(document = source_document, page_count, "No outline; using the full document");
        let text: String = (0..page_count).map(|i| page_text_or_empty(doc, i, source_document)).collect();
        return Ok(vec![Section {
            title: FULL_DOCUMENT_TITLE.to_string(),
            text,
            start_page: 1,
            source_document: source_document.to_string(),
        }]);
    }

    let last_page = page_count.max(1);
    let starts: Vec<usize> = outline.iter().map(|e| e.page.clamp(1, last_page)).collect();

    let mut sections = Vec::with_capacity(outline.len());
    for (i, entry) in outline.iter().enumerate() {
        let start = starts[i];
        let next = starts.get(i + 1).copied().unwrap_or(page_count + 1);
        if next < start {
            tracing::warn!(document = source_document, title = %entry.title, start, next, "Next outline entry points backwards; section is empty");
        }
        let end = next.max(start);

        let mut text = String::new();
        for page in start..end {
            text.push_str(&page_text_or_empty(doc, page - 1, source_document));
        }

        let title = entry.title.trim();
        sections.push(Section {
            title: if title.is_empty() { UNTITLED_SECTION.to_string() } else { title.to_string() },
            text: text.trim().to_string(),
            start_page: start,
            source_document: source_document.to_string(),
        });
    }
    Ok(sections)
}

fn page_text_or_empty(doc: &dyn PdfDocument, index: usize, source_document: &str) -> String {
    match doc.page_text(index) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(document = source_document, page = index + 1, "Failed to extract page text: {e:#}");
            String::new()
        }
    }
}
