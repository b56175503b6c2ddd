use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ProductDraft, ProductRecord};
use crate::parser::fields;
use crate::parser::sections::CandidateSection;

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 100;
const NAME_SCAN_LINES: usize = 3;
const DESCRIPTION_MIN_CHARS: usize = 50;
const MAX_SPEC_LABELS: usize = 2;
const SPEC_LABELS: &[&str] = &["weight:", "material:", "capacity:", "size:", "sku:"];

static NAME_DENY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)page\s+\d+|catalog|specifications?|description|features?|benefits?|contact|phone|email|address|www\.|http|\.com",
    )
    .unwrap()
});
static NAME_ALLOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)bottle|jar|container|cap|closure|tube|pump|dispenser|packaging|ml|oz|gram")
        .unwrap()
});

static MATERIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmaterial\b\s*:?[ \t]*([^,\n]+)").unwrap());
static WEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bweight\b\s*:?[ \t]*([^\n]+)").unwrap());
static CAPACITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:capacity|volume|size)\b\s*:?[ \t]*([^\n]+)").unwrap());
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcolou?r\b\s*:?[ \t]*([^,\n]+)").unwrap());
static SKU_RE: LazyLock<Regex> = LazyLock::new(|| {
    // the code must carry a digit, so "Item Code: AJ-250" skips past "Code"
    Regex::new(r"(?i)\b(?:sku|code|ref|item)\b[ \t]*[:#.]?[ \t]*([A-Z0-9-]*[0-9][A-Z0-9-]*)").unwrap()
});
static RECYCLED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\brecycled?\s*content\b\s*:?[ \t]*([^\n]+)").unwrap());
static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Build a record from one candidate section, or nothing when no line
/// in its head reads like a product name.
pub fn build(section: &CandidateSection) -> Option<ProductRecord> {
    let name = find_name(section)?;
    let mut draft = ProductDraft {
        name: Some(name),
        ..Default::default()
    };
    scan_specs(&section.text, &mut draft);
    draft.description = find_description(&section.text);
    draft.into_record()
}

fn find_name(section: &CandidateSection) -> Option<String> {
    section
        .lines()
        .take(NAME_SCAN_LINES)
        .find(|line| is_likely_product_name(line))
        .map(str::to_string)
}

pub fn is_likely_product_name(line: &str) -> bool {
    let len = line.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return false;
    }
    !NAME_DENY_RE.is_match(line) && NAME_ALLOW_RE.is_match(line)
}

/// Each labeled pattern is searched independently; the first hit wins.
fn scan_specs(text: &str, draft: &mut ProductDraft) {
    draft.material = capture(&MATERIAL_RE, text);
    draft.weight = first_with_unit(&WEIGHT_RE, text, fields::find_weight);
    draft.capacity = first_with_unit(&CAPACITY_RE, text, fields::find_capacity);
    draft.color = capture(&COLOR_RE, text);
    draft.sku = capture(&SKU_RE, text);
    draft.recycled_content = capture(&RECYCLED_RE, text).and_then(|v| fields::parse_percentage(&v));
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

// Labeled measurements only count when the unit is written out.
fn first_with_unit<T>(re: &Regex, text: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| parse(m.as_str()))
}

/// First paragraph long enough to be prose and not a block of spec labels.
fn find_description(text: &str) -> Option<String> {
    PARAGRAPH_RE
        .split(text)
        .map(str::trim)
        .find(|p| {
            if p.chars().count() < DESCRIPTION_MIN_CHARS {
                return false;
            }
            let lower = p.to_lowercase();
            let labels = SPEC_LABELS.iter().filter(|l| lower.contains(*l)).count();
            labels <= MAX_SPEC_LABELS
        })
        .map(str::to_string)
}
