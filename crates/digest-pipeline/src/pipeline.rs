use anyhow::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use digest_core::config::AppConfig;
use digest_core::error::DigestError;
use digest_core::text::{clean_refined_text, clean_title};
use digest_core::traits::{Embedder, PdfLoader};
use digest_core::types::{ExtractedSection, RankedIndex, Report, ReportMetadata, Section, SubsectionAnalysis};
use digest_pdf::chunk_pdf;
use digest_rank::{PerDocumentCap, Ranker, Refiner, SelectionPolicy};

use crate::discover::list_pdf_files;
use crate::report::{processing_timestamp, write_report};

/// One run over an input directory. Collaborators are borrowed so the
/// embedding model is built once by the caller and shared explicitly.
pub struct Pipeline<'a> {
    config: &'a AppConfig,
    loader: &'a dyn PdfLoader,
    embedder: &'a dyn Embedder,
    selection: Box<dyn SelectionPolicy + 'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a AppConfig, loader: &'a dyn PdfLoader, embedder: &'a dyn Embedder) -> Self {
        Self { config, loader, embedder, selection: Box::new(PerDocumentCap::from(&config.selection)) }
    }

    pub fn with_selection(mut self, selection: Box<dyn SelectionPolicy + 'a>) -> Self {
        self.selection = selection;
        self
    }

    /// Build the report and write it to the configured output path.
    pub fn run_and_write(&self) -> Result<PathBuf> {
        let report = self.run()?;
        let output_path = self.config.output_path();
        write_report(&report, &output_path)?;
        tracing::info!("Output JSON generated at '{}'", output_path.display());
        Ok(output_path)
    }

    /// Fails with [`DigestError::NoPdfFiles`] or [`DigestError::NoSections`]
    /// when there is nothing to rank; per-document failures are only logged.
    pub fn run(&self) -> Result<Report> {
        let cfg = self.config;
        fs::create_dir_all(&cfg.input_dir)?;
        fs::create_dir_all(&cfg.output_dir)?;

        tracing::info!("Looking for PDF files in '{}'", cfg.input_dir.display());
        let pdf_files = list_pdf_files(&cfg.input_dir)?;
        if pdf_files.is_empty() {
            return Err(DigestError::NoPdfFiles(cfg.input_dir.clone()).into());
        }
        tracing::info!("Detected {} input PDFs", pdf_files.len());

        let start = Instant::now();
        let (sections, processed) = self.collect_sections(&pdf_files);
        tracing::info!("Finished parsing PDFs in {:.2} seconds", start.elapsed().as_secs_f64());
        if sections.is_empty() {
            return Err(DigestError::NoSections.into());
        }

        let start = Instant::now();
        let ranked = Ranker::new(self.embedder, cfg.embedding.batch_size).rank(&sections, &cfg.persona, &cfg.job_to_be_done)?;
        tracing::info!("Ranking completed in {:.2} seconds", start.elapsed().as_secs_f64());

        let selected = self.selection.select(&ranked, &sections);

        let start = Instant::now();
        let (extracted_sections, subsection_analysis) = self.describe(&selected, &sections);
        tracing::info!("Refinement completed in {:.2} seconds", start.elapsed().as_secs_f64());

        Ok(Report {
            metadata: ReportMetadata {
                input_documents: processed.into_iter().collect(),
                persona: cfg.persona.clone(),
                job_to_be_done: cfg.job_to_be_done.clone(),
                processing_timestamp: processing_timestamp(),
            },
            extracted_sections,
            subsection_analysis,
        })
    }

    /// Chunk every file, skipping the ones that fail or yield nothing.
    fn collect_sections(&self, pdf_files: &[PathBuf]) -> (Vec<Section>, BTreeSet<String>) {
        let mut all_sections = Vec::new();
        let mut processed = BTreeSet::new();
        for path in pdf_files {
            let filename = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            match chunk_pdf(self.loader, path) {
                Ok(sections) if sections.is_empty() => {
                    tracing::warn!("No sections extracted from '{}'", filename);
                }
                Ok(sections) => {
                    tracing::info!("Processed '{}' - extracted {} sections", filename, sections.len());
                    all_sections.extend(sections.into_iter().map(|s| Section { title: clean_title(&s.title), ..s }));
                    processed.insert(filename);
                }
                Err(e) => {
                    tracing::error!("Error processing '{}': {}", filename, e);
                    tracing::debug!("{:?}", e);
                }
            }
        }
        (all_sections, processed)
    }

    fn describe(&self, selected: &[RankedIndex], sections: &[Section]) -> (Vec<ExtractedSection>, Vec<SubsectionAnalysis>) {
        let cfg = self.config;
        let refiner = Refiner::from(&cfg.refine);
        let mut extracted = Vec::with_capacity(selected.len());
        let mut analysis = Vec::with_capacity(selected.len());
        for (rank, r) in selected.iter().enumerate() {
            let section = &sections[r.index];
            extracted.push(ExtractedSection {
                document: section.source_document.clone(),
                section_title: section.title.clone(),
                importance_rank: rank + 1,
                page_number: section.start_page,
            });
            let refined = refiner.refine(&section.text, &cfg.persona, &cfg.job_to_be_done);
            analysis.push(SubsectionAnalysis {
                document: section.source_document.clone(),
                refined_text: clean_refined_text(&refined, cfg.refine.max_chars),
                page_number: section.start_page,
            });
        }
        (extracted, analysis)
    }
}
