use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use tracing::warn;
use url::Url;

use crate::input::PageRecord;
use crate::stats::RunStats;

pub type NodeId = usize;

/// The root node always sits at index 0 and path "/".
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
pub struct Node {
    pub path: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_product: bool,
    /// Back-reference only; ownership runs root -> children via the arena.
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// block id -> block name, filled in by the rewriter.
    pub common_blocks_used: BTreeMap<String, String>,
    /// Content with matched block spans replaced by `[block_name]` tokens;
    /// absent when no block matched this node.
    pub processed_content: Option<String>,
}

impl Node {
    fn new(path: String, url: String, title: String) -> Self {
        Node {
            path,
            url,
            title,
            content: String::new(),
            category: String::new(),
            is_product: false,
            parent: None,
            children: Vec::new(),
            common_blocks_used: BTreeMap::new(),
            processed_content: None,
        }
    }

    fn set_page_fields(&mut self, page: &PageRecord) {
        self.url = page.url.clone();
        self.title = page.title.clone();
        self.content = page.content.clone();
        self.category = page.category.clone();
        self.is_product = page.is_product;
    }
}

/// Path-indexed site tree. Nodes live in an arena in creation order;
/// parent/children edges are arena indices, so the back-reference is never
/// an ownership edge.
pub struct SiteTree {
    pub domain: String,
    nodes: Vec<Node>,
    by_path: HashMap<String, NodeId>,
}

impl SiteTree {
    /// Build the tree from the flat page list. Pages with unparseable URLs
    /// are dropped with a warning; duplicate paths keep the later page.
    pub fn build(pages: &[PageRecord], stats: &mut RunStats) -> Result<SiteTree> {
        let domain = pages
            .iter()
            .find_map(|p| {
                Url::parse(&p.url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
            })
            .context("no page has a parseable URL")?;

        let root_url = format!("https://{domain}/");
        let mut root = Node::new("/".to_string(), root_url, format!("{domain} Homepage"));
        root.category = "root".to_string();
        let mut tree = SiteTree {
            domain,
            nodes: vec![root],
            by_path: HashMap::from([("/".to_string(), ROOT)]),
        };

        // Pass 1: one node per distinct path, last write wins.
        for page in pages {
            let parsed = match Url::parse(&page.url) {
                Ok(u) => u,
                Err(err) => {
                    warn!(url = %page.url, %err, "dropping page with unparseable URL");
                    stats.dropped_pages += 1;
                    continue;
                }
            };

            let raw_path = parsed.path();
            if raw_path.is_empty() || raw_path == "/" {
                tree.nodes[ROOT].set_page_fields(page);
                continue;
            }
            let path = if raw_path.starts_with('/') {
                raw_path.to_string()
            } else {
                format!("/{raw_path}")
            };

            match tree.by_path.get(&path).copied() {
                Some(id) => {
                    warn!(%path, url = %page.url, "duplicate path, keeping the later page");
                    stats.duplicate_paths += 1;
                    tree.nodes[id].set_page_fields(page);
                }
                None => {
                    let id = tree.nodes.len();
                    let mut node =
                        Node::new(path.clone(), page.url.clone(), page.title.clone());
                    node.set_page_fields(page);
                    tree.nodes.push(node);
                    tree.by_path.insert(path, id);
                }
            }
        }

        // Pass 2: attach each node to its nearest existing ancestor.
        for id in 1..tree.nodes.len() {
            let parent = tree.nearest_ancestor(&tree.nodes[id].path);
            tree.attach(parent, id);
        }

        // Orphan sweep. Unreachable if pass 2 is exhaustive, but a node
        // left unparented would otherwise vanish from the export.
        for id in 1..tree.nodes.len() {
            if tree.nodes[id].parent.is_none() {
                stats.orphans += 1;
                tree.attach(ROOT, id);
            }
        }
        if stats.orphans > 0 {
            warn!(count = stats.orphans, "orphaned nodes attached to root");
        }

        stats.nodes = tree.nodes.len();
        Ok(tree)
    }

    /// Greedy nearest-existing-ancestor: walk truncations of the path from
    /// most specific to "/", rendered with a trailing slash, and return the
    /// first one that has a node. A page at /a/b/c attaches to /a/b/ only
    /// if that exact node exists, otherwise /a/, otherwise root.
    fn nearest_ancestor(&self, path: &str) -> NodeId {
        let parts: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        for i in (1..parts.len()).rev() {
            let candidate = format!("/{}/", parts[..i].join("/"));
            if let Some(&id) = self.by_path.get(&candidate) {
                return id;
            }
        }
        ROOT
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn lookup(&self, path: &str) -> Option<&Node> {
        self.by_path.get(path).map(|&id| &self.nodes[id])
    }
}

// ── Tests ──
