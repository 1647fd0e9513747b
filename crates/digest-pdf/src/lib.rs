//! PDF backends and the table-of-contents chunker.

pub mod chunker;
pub mod lopdf_backend;

pub use chunker::{chunk_document, chunk_pdf};
pub use lopdf_backend::LopdfLoader;
