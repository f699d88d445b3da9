use std::collections::HashSet;
use std::sync::LazyLock;

use fancy_regex::Regex;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use crate::input::PageRecord;
use crate::stats::RunStats;

use super::classify;
use super::similarity;
use super::{BlockEntry, BlockRegistry};

/// Structural section boundaries in unstructured scraped text: paragraph
/// breaks, runs of 3+ whitespace, sentence end followed by double space,
/// and whitespace before a capitalized word.
static BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n|\s{3,}|(?<=[.!?])\s{2,}|\s+(?=[A-Z][a-z]+\s)").unwrap()
});

#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Minimum chunk length in bytes; shorter chunks are discarded.
    pub min_block_length: usize,
    /// Minimum pages a group must span to become a block.
    pub min_occurrences: usize,
    /// Similarity ratio at or above which two chunks group together.
    pub similarity_threshold: f64,
    /// Hard ceiling on chunks entering the O(n²) comparison; the longest
    /// chunks are kept when the ceiling is hit.
    pub max_chunks: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            min_block_length: 40,
            min_occurrences: 3,
            similarity_threshold: 0.85,
            max_chunks: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
struct Chunk {
    /// Index into the page list this chunk came from.
    page: usize,
    text: String,
}

/// Group near-duplicate chunks across distinct pages and promote groups
/// spanning enough pages to auto-detected registry entries.
pub fn detect(
    pages: &[PageRecord],
    cfg: &DetectorConfig,
    registry: &mut BlockRegistry,
    stats: &mut RunStats,
) {
    let mut chunks = collect_chunks(pages, cfg.min_block_length);
    stats.chunks_extracted = chunks.len();

    if chunks.len() > cfg.max_chunks {
        // Favor larger, more distinctive boilerplate; restore discovery
        // order afterwards so grouping stays deterministic.
        let mut order: Vec<usize> = (0..chunks.len()).collect();
        order.sort_by(|&x, &y| chunks[y].text.len().cmp(&chunks[x].text.len()));
        order.truncate(cfg.max_chunks);
        order.sort_unstable();
        chunks = order.into_iter().map(|i| chunks[i].clone()).collect();
        info!(
            kept = chunks.len(),
            extracted = stats.chunks_extracted,
            "chunk ceiling hit, keeping the longest"
        );
    }
    stats.chunks_kept = chunks.len();

    let total = chunks.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut assigned = vec![false; total];
    let mut promoted = 0usize;

    for seed_idx in 0..total {
        pb.inc(1);
        if assigned[seed_idx] {
            continue;
        }
        let seed = &chunks[seed_idx];

        // Pairwise comparisons are read-only and embarrassingly parallel;
        // committing in index order keeps group formation identical to the
        // sequential first-match-wins scan.
        let scores: Vec<(usize, f64)> = (0..total)
            .into_par_iter()
            .filter(|&j| j != seed_idx && !assigned[j] && chunks[j].page != seed.page)
            .map(|j| (j, score(&seed.text, &chunks[j].text, cfg.similarity_threshold)))
            .collect();

        let mut members: Vec<usize> = Vec::new();
        let mut group_pages: HashSet<usize> = HashSet::from([seed.page]);
        for (j, sim) in scores {
            if sim < cfg.similarity_threshold {
                continue;
            }
            // At most one chunk per page joins a group.
            if !group_pages.insert(chunks[j].page) {
                continue;
            }
            assigned[j] = true;
            members.push(j);
        }

        if members.len() + 1 < cfg.min_occurrences {
            // Too small; members stay consumed, but the seed remains
            // eligible as a member of a later group.
            continue;
        }

        assigned[seed_idx] = true;
        promoted += 1;
        let block_type = classify::classify(&seed.text);
        let mut occurrences = vec![pages[seed.page].url.clone()];
        occurrences.extend(members.iter().map(|&j| pages[chunks[j].page].url.clone()));
        let occurrence_count = occurrences.len();

        registry.insert(BlockEntry {
            id: format!("auto_block_{promoted}"),
            name: format!("{block_type}_{promoted}"),
            block_type: block_type.to_string(),
            content: seed.text.clone(),
            occurrences,
            auto_detected: true,
            confidence: Some(occurrence_count as f64 / pages.len() as f64),
        });
        stats.auto_blocks += 1;
    }

    pb.finish_and_clear();
    info!(
        chunks = total,
        blocks = promoted,
        "similarity-based block detection finished"
    );
}

fn collect_chunks(pages: &[PageRecord], min_len: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for (pi, page) in pages.iter().enumerate() {
        if page.content.is_empty() {
            continue;
        }
        for part in split_boundaries(&page.content) {
            let text = part.trim();
            if text.len() < min_len {
                continue;
            }
            chunks.push(Chunk {
                page: pi,
                text: text.to_string(),
            });
        }
    }
    chunks
}

fn split_boundaries(content: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut last = 0;
    // A comparison that fails inside the backtracking engine just yields
    // fewer split points; that degrades to longer chunks, never an error.
    for m in BOUNDARY_RE.find_iter(content).flatten() {
        parts.push(&content[last..m.start()]);
        last = m.end();
    }
    parts.push(&content[last..]);
    parts
}

fn score(a: &str, b: &str, threshold: f64) -> f64 {
    // Length alone can rule a pair out without the quadratic comparison.
    if similarity::upper_bound(a, b) < threshold {
        return 0.0;
    }
    similarity::ratio(a, b)
}

// ── Tests ──
