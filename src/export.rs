use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::blocks::BlockRegistry;
use crate::stats::RunStats;
use crate::tree::{NodeId, SiteTree, ROOT};

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportDocument {
    pub website: WebsiteExport,
    pub common_blocks: BTreeMap<String, BlockExport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebsiteExport {
    pub master_node: ExportNode,
    pub domain: String,
    pub pages: usize,
    pub nodes: usize,
    pub common_blocks: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportNode {
    pub path: String,
    pub title: String,
    pub category: String,
    pub is_product: bool,
    /// Present on the master node only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Processed content when the rewriter touched this node, raw content
    /// otherwise; omitted when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_blocks: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub children: Vec<ExportNode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockExport {
    pub name: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub content: String,
    pub occurrences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

pub fn document(tree: &SiteTree, registry: &BlockRegistry, stats: &RunStats) -> ExportDocument {
    let common_blocks: BTreeMap<String, BlockExport> = registry
        .entries()
        .iter()
        .map(|e| {
            (
                e.id.clone(),
                BlockExport {
                    name: e.name.clone(),
                    block_type: e.block_type.clone(),
                    content: e.content.clone(),
                    occurrences: e.occurrences.clone(),
                    auto_detected: e.auto_detected.then_some(true),
                    confidence: e.confidence,
                },
            )
        })
        .collect();

    ExportDocument {
        website: WebsiteExport {
            master_node: export_node(tree, ROOT),
            domain: tree.domain.clone(),
            pages: stats.pages,
            nodes: tree.len(),
            common_blocks: registry.len(),
        },
        common_blocks,
    }
}

fn export_node(tree: &SiteTree, id: NodeId) -> ExportNode {
    let node = tree.node(id);
    let content = node
        .processed_content
        .clone()
        .or_else(|| (!node.content.is_empty()).then(|| node.content.clone()));

    ExportNode {
        path: node.path.clone(),
        title: node.title.clone(),
        category: node.category.clone(),
        is_product: node.is_product,
        url: (id == ROOT).then(|| node.url.clone()),
        content,
        common_blocks: (!node.common_blocks_used.is_empty())
            .then(|| node.common_blocks_used.clone()),
        children: node
            .children
            .iter()
            .map(|&child| export_node(tree, child))
            .collect(),
    }
}

pub fn write(path: &Path, doc: &ExportDocument) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), doc)
        .with_context(|| format!("writing processed structure to {}", path.display()))?;
    Ok(())
}

pub fn read(path: &Path) -> Result<ExportDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading processed file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing {} as a processed structure", path.display()))
}

// ── Tests ──
