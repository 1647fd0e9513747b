use anyhow::Result;
use std::path::{Path, PathBuf};

/// `.pdf` files directly inside `root` (any extension case), sorted by file name.
/// Symlinks are resolved; dangling ones are logged and skipped.
pub fn list_pdf_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut pdf_files = Vec::new();
    for entry in walkdir::WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => { tracing::warn!("Skipping unreadable entry: {}", e); continue; }
            Err(e) => return Err(e.into()),
        };
        if !entry.file_type().is_file() { continue; }
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf")) { pdf_files.push(path.to_path_buf()); }
    }
    pdf_files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(pdf_files)
}
