use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use digest_core::types::Report;

/// Local time in `YYYY-MM-DDTHH:MM:SS`.
pub fn processing_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Pretty-print `report` as UTF-8 JSON at `path`, creating parent directories.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
