use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::anyhow;
use digest_core::config::AppConfig;
use digest_core::error::DigestError;
use digest_core::traits::{PdfDocument, PdfLoader};
use digest_core::types::OutlineEntry;
use digest_embed::{HashEmbedder, MINILM_DIM};
use digest_pipeline::{list_pdf_files, Pipeline};
use digest_rank::PerDocumentCap;
use tempfile::TempDir;

#[derive(Clone)]
struct FakePdf {
    pages: Vec<String>,
    outline: Vec<OutlineEntry>,
}

impl PdfDocument for FakePdf {
    fn page_count(&self) -> usize { self.pages.len() }
    fn page_text(&self, index: usize) -> anyhow::Result<String> {
        self.pages.get(index).cloned().ok_or_else(|| anyhow!("no page {index}"))
    }
    fn outline(&self) -> anyhow::Result<Vec<OutlineEntry>> { Ok(self.outline.clone()) }
}

/// Serves documents by file name; unknown names fail to open.
#[derive(Default)]
struct FakeLoader {
    docs: HashMap<String, FakePdf>,
}

impl FakeLoader {
    fn with(mut self, name: &str, pages: &[&str], outline: &[(&str, usize)]) -> Self {
        let doc = FakePdf {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            outline: outline.iter().map(|(t, p)| OutlineEntry { level: 1, title: t.to_string(), page: *p }).collect(),
        };
        self.docs.insert(name.to_string(), doc);
        self
    }
}

impl PdfLoader for FakeLoader {
    fn open(&self, path: &Path) -> anyhow::Result<Box<dyn PdfDocument>> {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let doc = self.docs.get(&name).cloned().ok_or_else(|| anyhow!("corrupt file {name}"))?;
        Ok(Box::new(doc))
    }
}

struct Workspace {
    _tmp: TempDir,
    config: AppConfig,
}

fn workspace(files: &[&str]) -> Workspace {
    let tmp = TempDir::new().expect("tempdir");
    let input_dir = tmp.path().join("input");
    fs::create_dir_all(&input_dir).expect("input dir");
    for f in files {
        fs::write(input_dir.join(f), b"%PDF-1.5").expect("write pdf");
    }
    let mut config = AppConfig::default();
    config.input_dir = input_dir;
    config.output_dir = tmp.path().join("output");
    config.persona = "Travel Planner".into();
    config.job_to_be_done = "Plan a trip with nightlife and beaches".into();
    config.embedding.use_fake = true;
    Workspace { _tmp: tmp, config }
}

fn travel_guide() -> FakeLoader {
    FakeLoader::default().with(
        "cities.pdf",
        &[
            "Plan a trip with beaches and nightlife in Nice. A travel planner can plan a trip with beaches and nightlife for friends.",
            "The museum opens at nine.",
            "Marseille history goes back centuries.",
        ],
        &[("Coastal Adventures:", 1), ("Museums", 2), ("History", 3)],
    )
}

#[test]
fn end_to_end_ranks_every_section_of_a_single_document() {
    let ws = workspace(&["cities.pdf"]);
    let loader = travel_guide();
    let embedder = HashEmbedder::new(MINILM_DIM);
    let selection = Box::new(PerDocumentCap::new(5, 5));

    let report = Pipeline::new(&ws.config, &loader, &embedder).with_selection(selection).run().expect("run");

    assert_eq!(report.metadata.input_documents, vec!["cities.pdf".to_string()]);
    assert_eq!(report.extracted_sections.len(), 3);
    assert_eq!(report.subsection_analysis.len(), 3);
    let ranks: Vec<usize> = report.extracted_sections.iter().map(|s| s.importance_rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(report.extracted_sections[0].section_title, "Coastal Adventures", "best match first, title cleaned");

    for (e, a) in report.extracted_sections.iter().zip(&report.subsection_analysis) {
        assert_eq!(e.document, a.document);
        assert_eq!(e.page_number, a.page_number);
        assert!(a.refined_text.chars().count() <= ws.config.refine.max_chars);
    }
    assert!(report.subsection_analysis[0].refined_text.contains("beaches"));
}

#[test]
fn default_selection_caps_sections_per_document() {
    let ws = workspace(&["cities.pdf"]);
    let loader = travel_guide();
    let embedder = HashEmbedder::new(MINILM_DIM);

    let report = Pipeline::new(&ws.config, &loader, &embedder).run().expect("run");

    assert_eq!(report.extracted_sections.len(), 2, "at most two sections from one document");
    assert_eq!(report.extracted_sections[0].importance_rank, 1);
    assert_eq!(report.extracted_sections[1].importance_rank, 2);
}

#[test]
fn documents_that_fail_to_open_are_skipped() {
    let ws = workspace(&["broken.pdf", "cities.pdf"]);
    let loader = travel_guide();
    let embedder = HashEmbedder::new(MINILM_DIM);

    let report = Pipeline::new(&ws.config, &loader, &embedder).run().expect("run");

    assert_eq!(report.metadata.input_documents, vec!["cities.pdf".to_string()]);
    assert!(report.extracted_sections.iter().all(|s| s.document == "cities.pdf"));
}

#[test]
fn untitled_documents_fall_back_to_full_document_section() {
    let ws = workspace(&["notes.pdf"]);
    let loader = FakeLoader::default().with("notes.pdf", &["Beaches at dawn. ", "Nightlife at dusk."], &[]);
    let embedder = HashEmbedder::new(MINILM_DIM);

    let report = Pipeline::new(&ws.config, &loader, &embedder).run().expect("run");

    assert_eq!(report.extracted_sections.len(), 1);
    assert_eq!(report.extracted_sections[0].section_title, "Full Document");
    assert_eq!(report.extracted_sections[0].page_number, 1);
}

#[test]
fn empty_input_directory_is_an_error() {
    let ws = workspace(&[]);
    let loader = FakeLoader::default();
    let embedder = HashEmbedder::new(MINILM_DIM);

    let err = Pipeline::new(&ws.config, &loader, &embedder).run().expect_err("no pdfs");

    assert!(matches!(err.downcast_ref::<DigestError>(), Some(DigestError::NoPdfFiles(_))), "got: {err}");
}

#[test]
fn all_documents_failing_is_an_error() {
    let ws = workspace(&["a.pdf", "b.pdf"]);
    let loader = FakeLoader::default();
    let embedder = HashEmbedder::new(MINILM_DIM);

    let err = Pipeline::new(&ws.config, &loader, &embedder).run().expect_err("nothing extracted");

    assert!(matches!(err.downcast_ref::<DigestError>(), Some(DigestError::NoSections)), "got: {err}");
}

#[test]
fn run_and_write_produces_the_report_file() {
    let ws = workspace(&["cities.pdf"]);
    let loader = travel_guide();
    let embedder = HashEmbedder::new(MINILM_DIM);

    let path = Pipeline::new(&ws.config, &loader, &embedder).run_and_write().expect("run");

    assert_eq!(path, ws.config.output_dir.join("challenge1b_output.json"));
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    let metadata = &json["metadata"];
    assert_eq!(metadata["persona"], "Travel Planner");
    assert_eq!(metadata["job_to_be_done"], "Plan a trip with nightlife and beaches");
    let ts = metadata["processing_timestamp"].as_str().expect("timestamp");
    assert_eq!(ts.len(), 19);
    assert_eq!(&ts[10..11], "T");
    assert!(json["extracted_sections"].is_array());
    assert!(json["subsection_analysis"][0]["refined_text"].is_string());
    assert!(json["extracted_sections"][0]["importance_rank"].is_u64());
}

#[test]
fn discovery_ignores_non_pdf_files_and_sorts_by_name() {
    let tmp = TempDir::new().expect("tempdir");
    for f in ["b.PDF", "a.pdf", "notes.txt"] {
        fs::write(tmp.path().join(f), b"x").expect("write");
    }
    fs::create_dir_all(tmp.path().join("nested")).expect("dir");
    fs::write(tmp.path().join("nested").join("c.pdf"), b"x").expect("write");

    let names: Vec<String> = list_pdf_files(tmp.path())
        .expect("list")
        .iter()
        .map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default())
        .collect();

    assert_eq!(names, vec!["a.pdf".to_string(), "b.PDF".to_string()]);
}

#[cfg(unix)]
#[test]
fn discovery_follows_symlinked_pdfs() {
    let tmp = TempDir::new().expect("tempdir");
    let store = tmp.path().join("store");
    let input = tmp.path().join("input");
    fs::create_dir_all(&store).expect("store");
    fs::create_dir_all(&input).expect("input");
    fs::write(store.join("guide.pdf"), b"x").expect("write");
    std::os::unix::fs::symlink(store.join("guide.pdf"), input.join("linked.pdf")).expect("symlink");
    std::os::unix::fs::symlink(store.join("gone.pdf"), input.join("dangling.pdf")).expect("symlink");

    let files = list_pdf_files(&input).expect("list");

    assert_eq!(files, vec![input.join("linked.pdf")]);
}

#[cfg(unix)]
#[test]
fn run_processes_inputs_that_are_all_symlinks() {
    let ws = workspace(&[]);
    let store = ws._tmp.path().join("store");
    fs::create_dir_all(&store).expect("store");
    fs::write(store.join("cities.pdf"), b"%PDF-1.5").expect("write");
    std::os::unix::fs::symlink(store.join("cities.pdf"), ws.config.input_dir.join("cities.pdf")).expect("symlink");
    let loader = travel_guide();
    let embedder = HashEmbedder::new(MINILM_DIM);

    let report = Pipeline::new(&ws.config, &loader, &embedder).run().expect("run");

    assert_eq!(report.metadata.input_documents, vec!["cities.pdf".to_string()]);
}
