//! Domain types shared by the chunker, ranker, refiner and report writer.

use serde::{Deserialize, Serialize};

/// Title used when a document has no table of contents.
pub const FULL_DOCUMENT_TITLE: &str = "Full Document";
/// Title used when an outline entry (or a cleaned title) is blank.
pub const UNTITLED_SECTION: &str = "Untitled Section";

/// A logical slice of one PDF, bounded by consecutive outline entries.
///
/// - `title`: outline title (normalized by the driver before ranking)
/// - `text`: concatenated page text of the section's page range
/// - `start_page`: 1-based page where the section starts
/// - `source_document`: file name of the PDF (no directory part)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub text: String,
    pub start_page: usize,
    pub source_document: String,
}

impl Section {
    /// Text handed to the embedder for this section.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.text)
    }
}

/// One table-of-contents entry as reported by a PDF backend.
///
/// `page` is whatever the backend resolved; it may be 0 or past the end for
/// malformed outlines and is clamped by the chunker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: usize,
    pub title: String,
    pub page: usize,
}

/// Position of a section in the ranker's input with its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedIndex {
    pub index: usize,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: usize,
}

/// The single artifact written at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}
