use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::model::{CompanyProfile, ContactDetails, ProductDraft, ProductRecord};
use crate::parser::classify::{apply, classify_spec_label};
use crate::parser::extract::company;
use crate::parser::fields;
use crate::web::fetch::FetchedPage;
use crate::web::frontier::Anchor;

const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "noscript", "title", "template"];
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "dt", "dd", "section",
    "article", "header", "footer", "address", "table", "ul", "ol",
];
const PRODUCT_CONTAINER_CLASSES: &[&str] =
    &["product-item", "product-card", "product-grid", "catalog-item", "product"];
const TITLE_SUFFIXES: &[&str] = &[" - Home", " | Home", " - Official Site", " | Official Site"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const MIN_NAME_CHARS: usize = 3;
const MIN_INTRO_CHARS: usize = 50;
const MIN_PARAGRAPH_CHARS: usize = 100;

// All selector literals below are constants; parsing them cannot fail.
fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

fn sels(list: &[&str]) -> Vec<Selector> {
    list.iter().map(|css| sel(css)).collect()
}

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| sel("a[href]"));
static IMG_ALT: LazyLock<Selector> = LazyLock::new(|| sel("img[alt]"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| sel("title"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| sel(r#"meta[name="description"]"#));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| sel("p"));
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| sel("table tr"));
static TABLE_CELL: LazyLock<Selector> = LazyLock::new(|| sel("th, td"));
static DEF_LIST: LazyLock<Selector> = LazyLock::new(|| sel("dl"));
static DEF_TERM: LazyLock<Selector> = LazyLock::new(|| sel("dt"));
static DEF_DESC: LazyLock<Selector> = LazyLock::new(|| sel("dd"));

static INTRO_BLOCKS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    sels(&[".about-text", ".company-description", ".intro-text", ".hero-text"])
});
static PRODUCT_NAME: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    sels(&["h1", ".product-title", ".product-name", "[data-product-name]", ".title"])
});
static PRODUCT_DESCRIPTION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    sels(&[".product-description", ".description", ".product-details p", ".content p"])
});
static PRODUCT_IMAGES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    sels(&[
        ".product-image img",
        ".product-gallery img",
        ".product-photos img",
        "[data-product-image]",
        ".product img",
        ".gallery img",
    ])
});

static LOGO_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\blogo\b").unwrap());

// ── Text ──

/// Rendered text of a document, one block element per line.
pub fn visible_text(doc: &Html) -> String {
    let mut raw = String::new();
    collect_text(doc.root_element(), &mut raw);
    raw.lines()
        .map(|l| l.split_whitespace().join(" "))
        .filter(|l| !l.is_empty())
        .join("\n")
}

fn collect_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let tag = child_el.value().name();
            if HIDDEN_TAGS.contains(&tag) {
                continue;
            }
            collect_text(child_el, out);
            if BLOCK_TAGS.contains(&tag) {
                out.push('\n');
            } else if matches!(tag, "td" | "th") {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

fn text_of(el: ElementRef) -> String {
    el.text().flat_map(str::split_whitespace).join(" ")
}

fn first_text(doc: &Html, selectors: &[Selector], min_chars: usize) -> Option<String> {
    selectors.iter().find_map(|s| {
        doc.select(s)
            .map(text_of)
            .find(|t| t.chars().count() >= min_chars)
    })
}

// ── Links ──

pub fn links(page: &FetchedPage) -> Vec<Anchor> {
    anchors(&Html::parse_document(&page.body))
}

pub fn anchors(doc: &Html) -> Vec<Anchor> {
    doc.select(&ANCHOR)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            Some(Anchor {
                href: href.to_string(),
                text: text_of(a),
                in_product_container: in_product_container(a),
            })
        })
        .collect()
}

fn in_product_container(el: ElementRef) -> bool {
    el.ancestors().filter_map(ElementRef::wrap).any(|a| {
        a.value()
            .classes()
            .any(|c| PRODUCT_CONTAINER_CLASSES.contains(&c))
    })
}

// ── Company ──

/// Profile from the crawl's start page.
pub fn company_from_page(page: &FetchedPage) -> CompanyProfile {
    let doc = Html::parse_document(&page.body);
    let text = visible_text(&doc);

    let name = logo_name(&doc)
        .or_else(|| title_name(&doc))
        .or_else(|| company::legal_entity_line(&text))
        .unwrap_or_else(|| host_name(&page.url));

    let mut profile = CompanyProfile::named(name);
    profile.fill_contacts(ContactDetails {
        website: Some(page.url.to_string()),
        ..page_contacts(&text)
    });
    profile.offer_description(page_description(&doc));
    profile
}

/// Fold an about/contact page into an existing profile. Contacts only fill
/// gaps; the description is replaced only by a longer one.
pub fn absorb_company_page(profile: &mut CompanyProfile, page: &FetchedPage) {
    let doc = Html::parse_document(&page.body);
    let text = visible_text(&doc);
    profile.fill_contacts(page_contacts(&text));
    let description = page_description(&doc).or_else(|| company::find_description(&text));
    profile.offer_description(description);
}

fn page_contacts(text: &str) -> ContactDetails {
    ContactDetails {
        address: company::find_postal_address(text),
        email: company::find_email(text),
        phone: company::find_phone(text),
        website: None,
    }
}

fn logo_name(doc: &Html) -> Option<String> {
    doc.select(&IMG_ALT)
        .filter_map(|img| img.value().attr("alt"))
        .find(|alt| LOGO_WORD_RE.is_match(alt))
        .map(|alt| LOGO_WORD_RE.replace_all(alt, "").split_whitespace().join(" "))
        .filter(|name| !name.is_empty())
}

fn title_name(doc: &Html) -> Option<String> {
    let title = text_of(doc.select(&TITLE).next()?);
    let name = TITLE_SUFFIXES
        .iter()
        .fold(title, |t, suffix| t.replace(suffix, ""));
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn host_name(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    let bare = host.replace(".co.uk", "").replace(".com", "");
    company::title_case(&bare)
}

fn page_description(doc: &Html) -> Option<String> {
    let meta = doc
        .select(&META_DESCRIPTION)
        .filter_map(|m| m.value().attr("content"))
        .map(|c| c.split_whitespace().join(" "))
        .find(|c| !c.is_empty());
    meta.or_else(|| first_text(doc, &INTRO_BLOCKS, MIN_INTRO_CHARS + 1))
        .or_else(|| first_text(doc, std::slice::from_ref(&*PARAGRAPH), MIN_PARAGRAPH_CHARS + 1))
}

// ── Products ──

/// Record for one product page; `None` when no name can be found.
pub fn product_from_page(page: &FetchedPage, max_images: usize) -> Option<ProductRecord> {
    let doc = Html::parse_document(&page.body);
    let mut draft = ProductDraft {
        name: first_text(&doc, &PRODUCT_NAME, MIN_NAME_CHARS),
        description: first_text(&doc, &PRODUCT_DESCRIPTION, 1),
        ..Default::default()
    };

    for (label, value) in spec_pairs(&doc) {
        if let Some(tag) = classify_spec_label(&label) {
            apply(tag, &value, &mut draft);
        }
    }

    let text = visible_text(&doc);
    if draft.weight.is_none() {
        draft.weight = fields::find_weight(&text);
    }
    if draft.capacity.is_none() {
        draft.capacity = fields::find_capacity(&text);
    }

    let mut record = draft.into_record()?;
    let mut images = product_images(&doc, &page.url, max_images).into_iter();
    record.product_image = images.next();
    record.additional_images = images.collect();
    record.source_url = Some(page.url.to_string());
    Some(record)
}

/// Label/value pairs from specification tables and definition lists.
pub fn spec_pairs(doc: &Html) -> Vec<(String, String)> {
    let rows = doc.select(&TABLE_ROW).filter_map(|tr| {
        let mut cells = tr.select(&TABLE_CELL).map(text_of);
        let label = cells.next()?;
        let value = cells.next()?;
        Some((label, value))
    });
    let defs = doc.select(&DEF_LIST).flat_map(|dl| {
        let terms = dl.select(&DEF_TERM).map(text_of).collect_vec();
        let descs = dl.select(&DEF_DESC).map(text_of).collect_vec();
        terms.into_iter().zip(descs)
    });
    rows.chain(defs).collect()
}

/// Resolved image URLs in selector order, deduplicated, at most `max`.
pub fn product_images(doc: &Html, base: &Url, max: usize) -> Vec<String> {
    PRODUCT_IMAGES
        .iter()
        .flat_map(|s| doc.select(s))
        .filter_map(|img| {
            let el = img.value();
            el.attr("src").or_else(|| el.attr("data-src"))
        })
        .filter_map(|src| base.join(src.trim()).ok())
        .filter(is_image_url)
        .map(|u| u.to_string())
        .unique()
        .take(max)
        .collect()
}

fn is_image_url(url: &Url) -> bool {
    url.path()
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
