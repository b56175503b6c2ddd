use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CompanyProfile, ContactDetails, UNKNOWN_COMPANY};

const NAME_SCAN_LINES: usize = 10;
const FALLBACK_SCAN_LINES: usize = 5;
const MIN_ADDRESS_CHARS: usize = 20;
const MIN_ABOUT_CHARS: usize = 50;

static LEGAL_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:ltd|inc|corp|company|limited)\b").unwrap());
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});
static PHONE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\+?\d{1,3}[-. ]?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}").unwrap(),
        Regex::new(r"\b\d{3}[-. ]?\d{3}[-. ]?\d{4}\b").unwrap(),
    ]
});
static ADDRESS_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // US ZIP
        Regex::new(r"[A-Za-z0-9 \t,.-]+\b\d{5}(?:-\d{4})?\b").unwrap(),
        // UK postcode
        Regex::new(r"[A-Za-z0-9 \t,.-]+\b[A-Z]{1,2}\d{1,2}[A-Z]? \d[A-Z]{2}\b").unwrap(),
        // Other postal codes: 4-5 digits then a town
        Regex::new(r"[A-Za-z0-9 \t,.-]+\b\d{4,5}[ \t][A-Za-z]+\b").unwrap(),
    ]
});
static WEBSITE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)https?://[^\s]+").unwrap(),
        Regex::new(r"(?i)www\.[^\s]+").unwrap(),
        Regex::new(r"(?i)\b[a-z0-9-]+\.(?:com|co\.uk|net|org|biz)\b").unwrap(),
    ]
});
static ABOUT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?is)about\s+us[:\s]*([^.]*\.)").unwrap(),
        Regex::new(r"(?is)company\s+overview[:\s]*([^.]*\.)").unwrap(),
        Regex::new(r"(?is)who\s+we\s+are[:\s]*([^.]*\.)").unwrap(),
    ]
});
static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static NOT_PROSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)phone|email|address|weight|material").unwrap());

/// Company profile from the text of a bounded page window.
pub fn build_profile(window: &str) -> CompanyProfile {
    let mut profile = CompanyProfile::named(company_name(window));
    profile.fill_contacts(ContactDetails {
        address: find_address(window),
        email: find_email(window),
        phone: find_phone(window),
        website: find_website(window),
    });
    profile.offer_description(find_description(window));
    profile
}

// ── Name ──

struct NameRule {
    scan: usize,
    pick: fn(&str) -> Option<String>,
}

// Tried in order over the head of the window; first rule with a hit wins.
const NAME_RULES: &[NameRule] = &[
    NameRule { scan: NAME_SCAN_LINES, pick: legal_entity },
    NameRule { scan: NAME_SCAN_LINES, pick: all_caps_name },
    NameRule { scan: FALLBACK_SCAN_LINES, pick: plain_name },
];

pub fn company_name(text: &str) -> String {
    let lines: Vec<&str> = non_empty_lines(text).collect();
    NAME_RULES
        .iter()
        .find_map(|rule| lines.iter().take(rule.scan).find_map(|l| (rule.pick)(l)))
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string())
}

/// First line in `text` carrying a legal-entity marker (Ltd, Inc, ...).
pub fn legal_entity_line(text: &str) -> Option<String> {
    non_empty_lines(text)
        .take(NAME_SCAN_LINES)
        .find_map(legal_entity)
}

fn legal_entity(line: &str) -> Option<String> {
    (plausible_name_len(line) && LEGAL_ENTITY_RE.is_match(line)).then(|| line.to_string())
}

fn all_caps_name(line: &str) -> Option<String> {
    (plausible_name_len(line) && line.chars().count() > 5 && is_all_caps(line))
        .then(|| title_case(line))
}

fn plain_name(line: &str) -> Option<String> {
    let len = line.chars().count();
    (len > 5 && len < 50).then(|| line.to_string())
}

fn plausible_name_len(line: &str) -> bool {
    (3..=80).contains(&line.chars().count())
}

fn is_all_caps(s: &str) -> bool {
    s.chars().any(char::is_alphabetic) && !s.chars().any(char::is_lowercase)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

// ── Contact fields ──

pub fn find_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn find_phone(text: &str) -> Option<String> {
    PHONE_RES
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim().to_string())
}

/// Address line ending in a postal code. `find_postal_address` skips the
/// loose "digits + town" pattern.
pub fn find_address(text: &str) -> Option<String> {
    first_address(text, &ADDRESS_RES)
}

pub fn find_postal_address(text: &str) -> Option<String> {
    first_address(text, &ADDRESS_RES[..2])
}

fn first_address(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.find_iter(text)
            .map(|m| m.as_str().trim().trim_start_matches([',', '.', '-']).trim())
            .find(|a| a.chars().count() > MIN_ADDRESS_CHARS)
            .map(str::to_string)
    })
}

pub fn find_website(text: &str) -> Option<String> {
    let raw = WEBSITE_RES.iter().find_map(|re| re.find(text))?;
    let url = raw.as_str().trim_end_matches(['.', ',', ';', ')']);
    if url.to_lowercase().starts_with("http") {
        Some(url.to_string())
    } else {
        Some(format!("https://{}", url))
    }
}

// ── Description ──

pub fn find_description(text: &str) -> Option<String> {
    let about = ABOUT_RES.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let desc = collapse_whitespace(caps.get(1)?.as_str());
        (desc.chars().count() > MIN_ABOUT_CHARS).then_some(desc)
    });
    about.or_else(|| {
        PARAGRAPH_RE
            .split(text)
            .map(str::trim)
            .find(|p| {
                let len = p.chars().count();
                len > 100 && len < 500 && !NOT_PROSE_RE.is_match(p)
            })
            .map(str::to_string)
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acme_window() {
        let window = "PRODUCT CATALOGUE 2024\nAcme Packaging Ltd\nUnit 4, Harbour Road\nContact: info@acme.com";
        let p = build_profile(window);
        assert_eq!(p.company_name, "Acme Packaging Ltd");
        assert_eq!(p.email.as_deref(), Some("info@acme.com"));
        assert_eq!(p.website.as_deref(), Some("https://acme.com"));
        assert_eq!(p.supplier_type, "Packaging");
    }

    #[test]
    fn all_caps_name_is_title_cased() {
        assert_eq!(company_name("NORTHERN GLASSWORKS\nBottles and jars"), "Northern Glassworks");
    }

    #[test]
    fn name_fallbacks() {
        assert_eq!(company_name("Jar\nBlue Harbor Bottling\nmore"), "Blue Harbor Bottling");
        assert_eq!(company_name("Hi\nOK"), UNKNOWN_COMPANY);
        // "since" must not count as "inc"
        assert_eq!(company_name("Trusted since 1950\nZeta Corp"), "Zeta Corp");
    }

    #[test]
    fn contact_patterns() {
        assert_eq!(find_phone("Call +1 555-123-4567 today").as_deref(), Some("+1 555-123-4567"));
        assert_eq!(find_phone("Tel 555.123.4567").as_deref(), Some("555.123.4567"));
        assert_eq!(
            find_address("Visit us\n1200 Industrial Parkway, Springfield, IL 62704\n").as_deref(),
            Some("1200 Industrial Parkway, Springfield, IL 62704")
        );
        assert_eq!(
            find_address("Head office: 22 Mill Lane, Leeds LS1 4AB").as_deref(),
            Some("22 Mill Lane, Leeds LS1 4AB")
        );
        assert_eq!(find_website("see www.acme-pack.co.uk.").as_deref(), Some("https://www.acme-pack.co.uk"));
        assert_eq!(find_email("no contacts here"), None);
    }

    #[test]
    fn about_us_description() {
        let text = "About us: Acme has produced premium glass and plastic containers for the cosmetics industry since 1950. More text.";
        assert_eq!(
            find_description(text).as_deref(),
            Some("Acme has produced premium glass and plastic containers for the cosmetics industry since 1950.")
        );
    }

    #[test]
    fn paragraph_description_avoids_contact_text() {
        let contact = "Phone and email us at any time, our address is listed below and our team will respond quickly to you.";
        let prose = "We design and manufacture sustainable packaging for brands across Europe, working with recycled glass and aluminium.";
        let text = format!("{contact}\n\n{prose}");
        assert_eq!(find_description(&text).as_deref(), Some(prose));
    }
}
