//! Batch driver: discover PDFs, chunk, rank, select, refine, report.

pub mod discover;
pub mod pipeline;
pub mod report;

pub use discover::list_pdf_files;
pub use pipeline::Pipeline;
pub use report::write_report;
