/// Counters threaded through every pipeline phase. The summary prints even
/// when some inputs were defective, so a partial run still reports what it
/// managed to do.
#[derive(Debug, Default)]
pub struct RunStats {
    pub pages: usize,
    pub dropped_pages: usize,
    pub nodes: usize,
    pub duplicate_paths: usize,
    pub orphans: usize,
    pub chunks_extracted: usize,
    pub chunks_kept: usize,
    pub predefined_blocks: usize,
    pub auto_blocks: usize,
    pub processed_nodes: usize,
    pub replacements: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl RunStats {
    pub fn print_summary(&self) {
        println!("Pages:              {}", self.pages);
        if self.dropped_pages > 0 {
            println!("Dropped pages:      {}", self.dropped_pages);
        }
        println!("Nodes:              {}", self.nodes);
        if self.duplicate_paths > 0 {
            println!("Duplicate paths:    {}", self.duplicate_paths);
        }
        if self.orphans > 0 {
            println!("Orphans attached:   {}", self.orphans);
        }
        println!(
            "Chunks:             {} extracted, {} analyzed",
            self.chunks_extracted, self.chunks_kept
        );
        println!(
            "Common blocks:      {} ({} predefined, {} auto-detected)",
            self.predefined_blocks + self.auto_blocks,
            self.predefined_blocks,
            self.auto_blocks
        );
        println!(
            "Rewritten nodes:    {} ({} replacements)",
            self.processed_nodes, self.replacements
        );
        println!(
            "Content bytes:      {} -> {} (saved {})",
            self.bytes_before,
            self.bytes_after,
            self.bytes_before.saturating_sub(self.bytes_after)
        );
    }
}
