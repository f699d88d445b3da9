use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// One crawled page as produced by the crawler. Crawler output sometimes
/// omits `category`/`is_product`; extra fields (download-link metadata) are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_product: bool,
}

/// Load the crawler output. This is the only fatal failure point of the
/// pipeline: a missing file, invalid JSON, or an empty list aborts the run.
pub fn load_pages(path: &Path) -> Result<Vec<PageRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading input file {}", path.display()))?;
    let pages: Vec<PageRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {} as a JSON page list", path.display()))?;
    if pages.is_empty() {
        bail!("input file {} contains no pages", path.display());
    }
    Ok(pages)
}

// ── Tests ──
