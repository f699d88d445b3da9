use tracing::debug;

use crate::blocks::{BlockEntry, BlockRegistry};
use crate::stats::RunStats;
use crate::tree::SiteTree;

struct Span<'a> {
    start: usize,
    end: usize,
    entry: &'a BlockEntry,
}

/// Replace every detected block occurrence in each node's content with its
/// `[block_name]` reference token. Longer blocks are matched first so a
/// short block that is a literal substring of a longer one never corrupts
/// the longer match; overlaps are resolved by a greedy non-overlapping
/// selection in span recording order.
pub fn apply(tree: &mut SiteTree, registry: &BlockRegistry, stats: &mut RunStats) {
    // Stable sort: among equal lengths, earlier-registered entries win.
    let mut by_length: Vec<&BlockEntry> = registry.entries().iter().collect();
    by_length.sort_by(|a, b| b.content.len().cmp(&a.content.len()));

    for id in 0..tree.len() {
        let node = tree.node(id);
        if node.content.is_empty() {
            continue;
        }
        let content = node.content.clone();
        let node_url = node.url.clone();

        let mut spans: Vec<Span> = Vec::new();
        for &entry in &by_length {
            // Predefined blocks apply only where an occurrence was
            // recorded; auto-detected blocks match anywhere.
            if !entry.auto_detected && !entry.occurrences.iter().any(|u| u == &node_url) {
                continue;
            }
            let mut block_spans: Vec<Span> = Vec::new();
            let mut from = 0;
            while let Some(pos) = content[from..].find(&entry.content) {
                let start = from + pos;
                let end = start + entry.content.len();
                block_spans.push(Span { start, end, entry });
                from = end;
            }
            // Within one block, spans are processed in descending start
            // position; across blocks the longest-first order stands, so
            // a long match always claims its bytes before a shorter block
            // embedded in it gets a chance.
            spans.extend(block_spans.into_iter().rev());
        }
        if spans.is_empty() {
            continue;
        }

        let mut accepted: Vec<&Span> = Vec::new();
        for span in &spans {
            let taken = accepted
                .iter()
                .any(|s| span.start < s.end && s.start < span.end);
            if !taken {
                accepted.push(span);
            }
        }
        // Back-to-front application keeps earlier offsets valid.
        accepted.sort_by(|a, b| b.start.cmp(&a.start));

        let mut rewritten = content.clone();
        for span in &accepted {
            rewritten.replace_range(span.start..span.end, &format!("[{}]", span.entry.name));
        }

        debug!(
            path = %tree.node(id).path,
            replaced = accepted.len(),
            "rewrote node content"
        );
        stats.replacements += accepted.len();
        stats.bytes_before += content.len() as u64;
        stats.bytes_after += rewritten.len() as u64;
        stats.processed_nodes += 1;

        let node = tree.node_mut(id);
        for span in &accepted {
            node.common_blocks_used
                .insert(span.entry.id.clone(), span.entry.name.clone());
        }
        node.processed_content = Some(rewritten);
    }
}

// ── Tests ──
