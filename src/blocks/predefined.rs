use tracing::info;

use crate::input::PageRecord;
use crate::stats::RunStats;

use super::{BlockEntry, BlockRegistry};

/// Where a pattern's literal anchor sits in page content, and how the block
/// span is cut around it. Exact-match only: these are maintained template
/// literals, not fuzzy patterns.
#[derive(Debug, Clone)]
pub enum Anchor<'a> {
    /// Content starts with the literal; the block runs to the first
    /// newline (whole content if there is none).
    Prefix(&'a str),
    /// Content ends with the literal; the block runs from the last
    /// occurrence of `from` to the end of the page.
    Suffix { literal: &'a str, from: &'a str },
    /// Content contains `start`; the block runs from `start` up to the
    /// next `end` anchor. Skipped when `end` never follows `start`.
    Between { start: &'a str, end: &'a str },
}

#[derive(Debug, Clone)]
pub struct PredefinedPattern<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub block_type: &'a str,
    pub anchor: Anchor<'a>,
}

/// Boilerplate literals of the source site's template.
pub const DEFAULT_PATTERNS: &[PredefinedPattern<'static>] = &[
    PredefinedPattern {
        id: "header",
        name: "site_header",
        block_type: "header",
        anchor: Anchor::Prefix("Przykłady instalacji produktów Roger"),
    },
    PredefinedPattern {
        id: "footer",
        name: "site_footer",
        block_type: "footer",
        anchor: Anchor::Suffix {
            literal: "Newsletter     Bądź na bieżąco   Na skróty       Wsparcie       Kontakt   Komunikaty",
            from: "Newsletter",
        },
    },
    PredefinedPattern {
        id: "useful_links",
        name: "useful_links",
        block_type: "links_section",
        anchor: Anchor::Between {
            start: "Przydatne linki",
            end: "Newsletter",
        },
    },
];

/// Scan all pages for each pattern's anchor and register a block when
/// enough pages carry it: more than half for header/footer, more than two
/// for infix sections. The span is cut from the first matching page.
pub fn extract(
    pages: &[PageRecord],
    patterns: &[PredefinedPattern],
    registry: &mut BlockRegistry,
    stats: &mut RunStats,
) {
    for pattern in patterns {
        let matching: Vec<&PageRecord> = pages
            .iter()
            .filter(|p| anchor_matches(&pattern.anchor, &p.content))
            .collect();

        let enough = match pattern.anchor {
            Anchor::Prefix(_) | Anchor::Suffix { .. } => matching.len() * 2 > pages.len(),
            Anchor::Between { .. } => matching.len() > 2,
        };
        if !enough {
            continue;
        }

        let Some(content) = cut_span(&pattern.anchor, &matching[0].content) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }

        info!(
            block = pattern.id,
            pages = matching.len(),
            "identified predefined block"
        );
        registry.insert(BlockEntry {
            id: pattern.id.to_string(),
            name: pattern.name.to_string(),
            block_type: pattern.block_type.to_string(),
            content,
            occurrences: matching.iter().map(|p| p.url.clone()).collect(),
            auto_detected: false,
            confidence: None,
        });
        stats.predefined_blocks += 1;
    }
}

fn anchor_matches(anchor: &Anchor, content: &str) -> bool {
    match anchor {
        Anchor::Prefix(lit) => content.starts_with(lit),
        Anchor::Suffix { literal, .. } => content.ends_with(literal),
        Anchor::Between { start, .. } => content.contains(start),
    }
}

fn cut_span(anchor: &Anchor, content: &str) -> Option<String> {
    let span = match anchor {
        Anchor::Prefix(_) => match content.find('\n') {
            Some(end) => &content[..end],
            None => content,
        },
        Anchor::Suffix { from, .. } => {
            let start = content.rfind(from)?;
            &content[start..]
        }
        Anchor::Between { start, end } => {
            let s = content.find(start)?;
            let e = s + content[s..].find(end)?;
            &content[s..e]
        }
    };
    Some(span.trim().to_string())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, content: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: url.to_string(),
            content: content.to_string(),
            category: String::new(),
            is_product: false,
        }
    }

    fn run(pages: &[PageRecord], patterns: &[PredefinedPattern]) -> BlockRegistry {
        let mut registry = BlockRegistry::default();
        let mut stats = RunStats::default();
        extract(pages, patterns, &mut registry, &mut stats);
        registry
    }

    const HEADER: PredefinedPattern<'static> = PredefinedPattern {
        id: "header",
        name: "site_header",
        block_type: "header",
        anchor: Anchor::Prefix("Acme Corp Navigation"),
    };

    #[test]
    fn header_on_majority_of_pages() {
        let pages = [
            page("https://e.com/a/", "Acme Corp Navigation\nbody of a"),
            page("https://e.com/b/", "Acme Corp Navigation\nbody of b"),
            page("https://e.com/c/", "totally different page"),
        ];
        let registry = run(&pages, &[HEADER]);
        assert_eq!(registry.len(), 1);
        let block = &registry.entries()[0];
        assert_eq!(block.name, "site_header");
        assert_eq!(block.content, "Acme Corp Navigation");
        assert_eq!(
            block.occurrences,
            vec!["https://e.com/a/", "https://e.com/b/"]
        );
        assert!(!block.auto_detected);
        assert!(block.confidence.is_none());
    }

    #[test]
    fn header_below_majority_skipped() {
        let pages = [
            page("https://e.com/a/", "Acme Corp Navigation\nbody of a"),
            page("https://e.com/b/", "other"),
            page("https://e.com/c/", "other again"),
            page("https://e.com/d/", "and another"),
        ];
        assert!(run(&pages, &[HEADER]).is_empty());
    }

    #[test]
    fn header_without_newline_spans_whole_content() {
        let pages = [
            page("https://e.com/a/", "Acme Corp Navigation"),
            page("https://e.com/b/", "Acme Corp Navigation"),
            page("https://e.com/c/", "other"),
        ];
        let registry = run(&pages, &[HEADER]);
        assert_eq!(registry.entries()[0].content, "Acme Corp Navigation");
    }

    #[test]
    fn footer_cut_from_last_anchor() {
        let footer = PredefinedPattern {
            id: "footer",
            name: "site_footer",
            block_type: "footer",
            anchor: Anchor::Suffix {
                literal: "Newsletter   Contact   Legal",
                from: "Newsletter",
            },
        };
        let pages = [
            page("https://e.com/a/", "Newsletter mention early\nbody\nNewsletter   Contact   Legal"),
            page("https://e.com/b/", "body b\nNewsletter   Contact   Legal"),
            page("https://e.com/c/", "no footer here"),
        ];
        let registry = run(&pages, &[footer]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].content, "Newsletter   Contact   Legal");
    }

    #[test]
    fn between_needs_more_than_two_pages() {
        let links = PredefinedPattern {
            id: "useful_links",
            name: "useful_links",
            block_type: "links_section",
            anchor: Anchor::Between {
                start: "Useful links",
                end: "Footer",
            },
        };
        let two = [
            page("https://e.com/a/", "x Useful links: one two Footer y"),
            page("https://e.com/b/", "x Useful links: one two Footer y"),
        ];
        assert!(run(&two, &[links.clone()]).is_empty());

        let three = [
            page("https://e.com/a/", "x Useful links: one two Footer y"),
            page("https://e.com/b/", "x Useful links: one two Footer y"),
            page("https://e.com/c/", "x Useful links: one two Footer y"),
        ];
        let registry = run(&three, &[links]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].content, "Useful links: one two");
        assert_eq!(registry.entries()[0].block_type, "links_section");
    }

    #[test]
    fn between_without_end_anchor_skipped() {
        let links = PredefinedPattern {
            id: "useful_links",
            name: "useful_links",
            block_type: "links_section",
            anchor: Anchor::Between {
                start: "Useful links",
                end: "Footer",
            },
        };
        let pages = [
            page("https://e.com/a/", "Useful links but nothing closing"),
            page("https://e.com/b/", "Useful links but nothing closing"),
            page("https://e.com/c/", "Useful links but nothing closing"),
        ];
        assert!(run(&pages, &[links]).is_empty());
    }
}
