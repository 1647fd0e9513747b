//! Relevance ranking, selection, and extractive refinement of sections.

pub mod ranker;
pub mod refiner;
pub mod selection;
pub mod sentences;

pub use ranker::Ranker;
pub use refiner::Refiner;
pub use selection::{PerDocumentCap, SelectionPolicy};
