use std::sync::LazyLock;

use regex::Regex;

const MIN_SECTION_CHARS: usize = 50;

/// A span of text hypothesised to describe one product.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSection {
    pub text: String,
}

impl CandidateSection {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines().map(str::trim).filter(|l| !l.is_empty())
    }
}

struct SplitRule {
    re: Regex,
    /// Keep the matched text at the head of the following section.
    keep: bool,
}

impl SplitRule {
    fn keep(pattern: &str) -> Self {
        SplitRule { re: Regex::new(pattern).unwrap(), keep: true }
    }

    fn drop(pattern: &str) -> Self {
        SplitRule { re: Regex::new(pattern).unwrap(), keep: false }
    }
}

// Applied in order; each rule splits every piece the previous one produced.
static SPLIT_RULES: LazyLock<Vec<SplitRule>> = LazyLock::new(|| {
    vec![
        // ALL-CAPS heading line
        SplitRule::keep(r"(?m)^[ \t]*[A-Z][A-Z0-9 &/\-]{2,}[ \t]*$"),
        // 1. numbered list
        SplitRule::drop(r"(?m)^[ \t]*\d+\.[ \t]+"),
        // • bullets
        SplitRule::drop(r"(?m)^[ \t]*[•·▪▫][ \t]+"),
        // Product 3
        SplitRule::drop(r"(?mi)^[ \t]*product[ \t]+\d+"),
        // Item 3
        SplitRule::drop(r"(?mi)^[ \t]*item[ \t]+\d+"),
    ]
});

/// Cut continuous text into candidate sections by structural markers.
/// Sections of 50 characters or fewer are noise and dropped.
pub fn segment(text: &str) -> Vec<CandidateSection> {
    let normalized = text.replace("\r\n", "\n");
    let mut pieces = vec![normalized];

    for rule in SPLIT_RULES.iter() {
        pieces = pieces
            .iter()
            .flat_map(|piece| split_on(piece, rule))
            .collect();
    }

    pieces
        .into_iter()
        .map(|p| {
            p.trim()
                .trim_start_matches([':', '-', '–', '.', ')'])
                .trim()
                .to_string()
        })
        .filter(|p| p.chars().count() > MIN_SECTION_CHARS)
        .map(|text| CandidateSection { text })
        .collect()
}

fn split_on(text: &str, rule: &SplitRule) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for m in rule.re.find_iter(text) {
        parts.push(text[start..m.start()].to_string());
        start = if rule.keep { m.start() } else { m.end() };
    }
    parts.push(text[start..].to_string());
    parts
}
