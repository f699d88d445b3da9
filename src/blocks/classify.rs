/// Keyword table for block classification. Checked in order, first match
/// wins, so the order is load-bearing: "produkty" classifies as navigation
/// even though product_list also lists it.
const PATTERNS: &[(&str, &[&str])] = &[
    ("navigation", &["rozwiązania", "produkty", "menu", "zastosowania"]),
    ("product_list", &["racs", "produkty", "powiązane produkty"]),
    ("contact_info", &["kontakt", "skontaktuj", "wsparcie"]),
    ("links_section", &["przydatne linki", "gdzie kupić", "pobierz"]),
    ("form_section", &["formularz", "rejestracja", "logowanie"]),
    ("intro_section", &["wprowadzenie", "o produkcie", "charakterystyka"]),
    ("case_study", &["przypadek", "realizacja", "wdrożenie", "case study"]),
    ("key_features", &["charakterystyka", "cechy", "funkcje", "dostępne"]),
    ("download_section", &["pobierz", "download", "pliki"]),
];

/// Classify a block's content into one of the fixed category tags, falling
/// back to "content_block" when nothing matches.
pub fn classify(content: &str) -> &'static str {
    let lower = content.to_lowercase();
    for (block_type, keywords) in PATTERNS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return block_type;
        }
    }
    "content_block"
}

// ── Tests ──
