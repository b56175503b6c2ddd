use std::collections::{HashSet, VecDeque};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;
use url::Url;

const SKIP_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:", "data:", "#"];
const NON_DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "webp", "svg", "css", "js", "zip",
];
const COMPANY_INDICATORS: &[&str] = &["about", "contact", "company"];
const PRODUCT_INDICATORS: &[&str] = &[
    "product", "bottle", "container", "jar", "cap", "closure", "packaging",
];

/// A link as found in a page, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
    /// The anchor sits inside product-listing markup.
    pub in_product_container: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    CompanyInfo,
    Product,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    SkipPattern,
    Unresolvable,
    NonDocument,
    OffDomain,
    Unclassified,
    Duplicate,
    CapReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Enqueued(LinkKind),
    Rejected(Rejection),
}

/// Discovered, pending and visited URLs of one crawl.
///
/// Every URL is enqueued at most once and handed out at most once; the
/// start URL counts as visited from the beginning.
#[derive(Debug)]
pub struct Frontier {
    scope: String,
    seen: HashSet<String>,
    visited: HashSet<String>,
    company: VecDeque<Url>,
    products: VecDeque<Url>,
    company_cap: usize,
    product_cap: usize,
    company_admitted: usize,
    product_admitted: usize,
}

impl Frontier {
    pub fn new(start: &Url, company_cap: usize, product_cap: usize) -> Self {
        let start = normalize(start.clone());
        let key = start.as_str().to_string();
        Frontier {
            scope: registered_host(&start).unwrap_or_default(),
            seen: HashSet::from([key.clone()]),
            visited: HashSet::from([key]),
            company: VecDeque::new(),
            products: VecDeque::new(),
            company_cap,
            product_cap,
            company_admitted: 0,
            product_admitted: 0,
        }
    }

    /// Resolve `anchor` against `base` and enqueue it when it passes every check.
    pub fn admit(&mut self, base: &Url, anchor: &Anchor) -> Admission {
        let outcome = self.check(base, anchor);
        match outcome {
            Admission::Enqueued(kind) => debug!(href = %anchor.href, ?kind, "link enqueued"),
            Admission::Rejected(why) => debug!(href = %anchor.href, ?why, "link rejected"),
        }
        outcome
    }

    fn check(&mut self, base: &Url, anchor: &Anchor) -> Admission {
        use Admission::*;

        let href = anchor.href.trim();
        let lower = href.to_lowercase();
        if href.is_empty() || SKIP_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            return Rejected(Rejection::SkipPattern);
        }
        let Ok(url) = base.join(href) else {
            return Rejected(Rejection::Unresolvable);
        };
        if !matches!(url.scheme(), "http" | "https") {
            return Rejected(Rejection::SkipPattern);
        }
        let url = normalize(url);
        if has_non_document_extension(&url) {
            return Rejected(Rejection::NonDocument);
        }
        if !self.in_scope(&url) {
            return Rejected(Rejection::OffDomain);
        }
        let Some(kind) = classify_link(&lower, &anchor.text, anchor.in_product_container) else {
            return Rejected(Rejection::Unclassified);
        };
        if self.seen.contains(url.as_str()) {
            return Rejected(Rejection::Duplicate);
        }

        let (admitted, cap, queue) = match kind {
            LinkKind::CompanyInfo => (&mut self.company_admitted, self.company_cap, &mut self.company),
            LinkKind::Product => (&mut self.product_admitted, self.product_cap, &mut self.products),
        };
        if *admitted >= cap {
            return Rejected(Rejection::CapReached);
        }
        *admitted += 1;
        self.seen.insert(url.as_str().to_string());
        queue.push_back(url);
        Enqueued(kind)
    }

    pub fn next_company(&mut self) -> Option<Url> {
        next_unvisited(&mut self.company, &mut self.visited)
    }

    pub fn next_product(&mut self) -> Option<Url> {
        next_unvisited(&mut self.products, &mut self.visited)
    }

    pub fn pending_products(&self) -> usize {
        self.products.len()
    }

    fn in_scope(&self, url: &Url) -> bool {
        match registered_host(url) {
            Some(host) => host == self.scope || host.ends_with(&format!(".{}", self.scope)),
            None => false,
        }
    }
}

fn next_unvisited(queue: &mut VecDeque<Url>, visited: &mut HashSet<String>) -> Option<Url> {
    while let Some(url) = queue.pop_front() {
        if visited.insert(url.as_str().to_string()) {
            return Some(url);
        }
    }
    None
}

fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

fn registered_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

fn has_non_document_extension(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    path.rsplit_once('.')
        .filter(|(_, ext)| !ext.contains('/'))
        .is_some_and(|(_, ext)| NON_DOCUMENT_EXTENSIONS.contains(&ext))
}

/// Company pages win over product pages when both match.
pub fn classify_link(href: &str, text: &str, in_product_container: bool) -> Option<LinkKind> {
    let href = href.to_lowercase();
    let text = text.to_lowercase();
    if COMPANY_INDICATORS
        .iter()
        .any(|k| href.contains(k) || text.contains(k))
    {
        return Some(LinkKind::CompanyInfo);
    }
    if in_product_container || PRODUCT_INDICATORS.iter().any(|k| href.contains(k)) {
        return Some(LinkKind::Product);
    }
    None
}

/// Enforces a minimum gap between consecutive requests.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Pacer { delay, last: None }
    }

    /// Sleep until `delay` has passed since the previous call.
    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                thread::sleep(self.delay - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}
