pub mod classify;
pub mod detect;
pub mod predefined;
pub mod similarity;

/// One shared content block: a span of text that repeats across pages and
/// gets replaced by a `[name]` reference token during rewriting.
#[derive(Debug, Clone)]
pub struct BlockEntry {
    pub id: String,
    pub name: String,
    pub block_type: String,
    /// Exact text of the span, byte-for-byte as it appears on the
    /// representative occurrence.
    pub content: String,
    /// URLs of every page the block was found on.
    pub occurrences: Vec<String>,
    pub auto_detected: bool,
    /// occurrence count / total page count, auto-detected blocks only.
    pub confidence: Option<f64>,
}

/// Registry of all detected blocks for one run. An explicit value handed
/// from the extractors to the rewriter; insertion order is preserved.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    entries: Vec<BlockEntry>,
}

impl BlockRegistry {
    pub fn insert(&mut self, entry: BlockEntry) {
        debug_assert!(!entry.content.is_empty(), "block {} has empty content", entry.id);
        debug_assert!(
            !self.entries.iter().any(|e| e.id == entry.id || e.name == entry.name),
            "block id/name collision: {}",
            entry.id
        );
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ──
