mod blocks;
mod export;
mod input;
mod rewrite;
mod stats;
mod tree;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use blocks::detect::DetectorConfig;
use blocks::BlockRegistry;
use stats::RunStats;
use tree::SiteTree;

#[derive(Parser)]
#[command(
    name = "site_processor",
    about = "Reorganize crawled pages into a path-based site tree with shared content blocks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site tree, extract common blocks, rewrite content, export JSON
    Process {
        /// Input JSON file with crawler output
        input: PathBuf,
        /// Output file for the processed structure
        output: PathBuf,
        /// Minimum characters for an auto-detected content block
        #[arg(long, default_value_t = 40)]
        min_block_length: usize,
        /// Minimum pages a block must appear on
        #[arg(long, default_value_t = 3)]
        min_occurrences: usize,
        /// Similarity ratio (0-1) for grouping near-duplicate chunks
        #[arg(long, default_value_t = 0.85)]
        similarity_threshold: f64,
        /// Ceiling on chunks entering the pairwise comparison
        #[arg(long, default_value_t = 10_000)]
        max_chunks: usize,
    },
    /// Print the summary counts of a previously processed file
    Stats {
        /// Processed JSON file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input,
            output,
            min_block_length,
            min_occurrences,
            similarity_threshold,
            max_chunks,
        } => {
            let cfg = DetectorConfig {
                min_block_length,
                min_occurrences,
                similarity_threshold,
                max_chunks,
            };
            run_process(&input, &output, &cfg)
        }
        Commands::Stats { file } => {
            let doc = export::read(&file)?;
            println!("Domain:        {}", doc.website.domain);
            println!("Pages:         {}", doc.website.pages);
            println!("Nodes:         {}", doc.website.nodes);
            let auto = doc
                .common_blocks
                .values()
                .filter(|b| b.auto_detected.unwrap_or(false))
                .count();
            println!(
                "Common blocks: {} ({} auto-detected)",
                doc.website.common_blocks, auto
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_process(input: &PathBuf, output: &PathBuf, cfg: &DetectorConfig) -> Result<()> {
    let pages = input::load_pages(input)?;
    println!("Loaded {} pages from {}", pages.len(), input.display());

    let mut stats = RunStats::default();
    stats.pages = pages.len();

    let mut tree = SiteTree::build(&pages, &mut stats)?;
    println!("Built tree with {} nodes", tree.len());

    let mut registry = BlockRegistry::default();
    blocks::predefined::extract(
        &pages,
        blocks::predefined::DEFAULT_PATTERNS,
        &mut registry,
        &mut stats,
    );
    blocks::detect::detect(&pages, cfg, &mut registry, &mut stats);
    println!("Extracted {} common blocks", registry.len());

    rewrite::apply(&mut tree, &registry, &mut stats);

    let doc = export::document(&tree, &registry, &stats);
    export::write(output, &doc)?;

    stats.print_summary();
    println!("Output saved to {}", output.display());
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use blocks::predefined::{Anchor, PredefinedPattern};
    use input::PageRecord;

    fn page(url: &str, title: &str, content: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            category: "page".to_string(),
            is_product: false,
        }
    }

    /// Five pages, four of which open with the same literal header line.
    /// The pipeline must register one predefined header block covering
    /// exactly those four URLs and rewrite each of their contents.
    #[test]
    fn end_to_end_site_header() {
        let header = PredefinedPattern {
            id: "header",
            name: "site_header",
            block_type: "header",
            anchor: Anchor::Prefix("SiteHeader Corp Inc"),
        };
        let urls = [
            "https://corp.example/products/",
            "https://corp.example/products/widgets/",
            "https://corp.example/about/",
            "https://corp.example/contact/",
        ];
        let mut pages: Vec<PageRecord> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| {
                page(
                    url,
                    &format!("Page {i}"),
                    &format!("SiteHeader Corp Inc\nunique body number {i} for this page"),
                )
            })
            .collect();
        pages.push(page(
            "https://corp.example/bare/",
            "Bare",
            "a page without the shared header at all",
        ));

        let mut stats = RunStats::default();
        stats.pages = pages.len();
        let mut tree = SiteTree::build(&pages, &mut stats).unwrap();
        let mut registry = BlockRegistry::default();
        blocks::predefined::extract(&pages, &[header], &mut registry, &mut stats);
        blocks::detect::detect(&pages, &DetectorConfig::default(), &mut registry, &mut stats);
        rewrite::apply(&mut tree, &registry, &mut stats);

        let block = registry
            .entries()
            .iter()
            .find(|e| e.id == "header")
            .expect("header block registered");
        assert_eq!(block.block_type, "header");
        assert_eq!(block.name, "site_header");
        assert_eq!(block.occurrences, urls);

        for url in urls {
            let path = url.strip_prefix("https://corp.example").unwrap();
            let node = tree.lookup(path).unwrap();
            let processed = node.processed_content.as_ref().unwrap();
            assert!(
                processed.starts_with("[site_header]"),
                "unexpected content for {path}: {processed}"
            );
            assert_eq!(
                node.common_blocks_used.get("header").map(String::as_str),
                Some("site_header")
            );
        }
        let bare = tree.lookup("/bare/").unwrap();
        assert!(bare.processed_content.is_none());

        // The full document survives a file round trip.
        let doc = export::document(&tree, &registry, &stats);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("processed.json");
        export::write(&out, &doc).unwrap();
        let back = export::read(&out).unwrap();
        assert_eq!(back.website.domain, "corp.example");
        assert_eq!(back.website.pages, 5);
        assert!(back.common_blocks.contains_key("header"));
    }
}
