use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use tracing::{error, info, warn};
use url::Url;

use crate::error::ExtractError;
use crate::model::{CompanyProfile, ProductRecord, ResultEnvelope};
use crate::parser::{self, dedup, extract::company};
use crate::pdf::{self, RawPage};
use crate::settings::Settings;
use crate::web::fetch::{Fetch, HttpFetcher};
use crate::web::frontier::{Admission, Frontier, Pacer};
use crate::web::page;

/// Everything a successful run produces.
#[derive(Debug)]
pub struct Extraction {
    pub supplier: CompanyProfile,
    pub products: Vec<ProductRecord>,
}

pub fn is_web_source(source: &str) -> bool {
    let lower = source.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Run one extraction and fold the outcome into the output envelope.
/// Only run-level failures end up here; per-page problems were already
/// logged and skipped.
pub fn run(source: &str, settings: &Settings) -> ResultEnvelope {
    let outcome = if is_web_source(source) {
        crawl_source(source, settings)
    } else {
        extract_document(Path::new(source))
    };

    match outcome {
        Ok(x) => {
            info!(
                supplier = %x.supplier.company_name,
                products = x.products.len(),
                "extraction complete"
            );
            ResultEnvelope::success(x.supplier, x.products)
        }
        Err(e) => {
            error!("{}", e);
            ResultEnvelope::failure(e)
        }
    }
}

// ── Document variant ──

pub fn extract_document(path: &Path) -> Result<Extraction, ExtractError> {
    let pages = pdf::load(path)?;
    Ok(extract_pages(&pages))
}

/// Company window → profile, then grids and leftover prose → products.
pub fn extract_pages(pages: &[RawPage]) -> Extraction {
    let supplier = company::build_profile(&pdf::company_window(pages));
    let prose = pages.iter().map(|p| p.prose.as_str()).join("\n");
    let products = parser::mine_products(pages.iter().flat_map(|p| &p.tables), &prose);
    info!(pages = pages.len(), products = products.len(), "document mined");
    Extraction { supplier, products }
}

// ── Web variant ──

fn crawl_source(source: &str, settings: &Settings) -> Result<Extraction, ExtractError> {
    let start = Url::parse(source).map_err(|e| ExtractError::InvalidUrl {
        url: source.to_string(),
        source: e,
    })?;
    let fetcher = HttpFetcher::new(settings)?;
    crawl_catalog(&start, &fetcher, settings)
}

/// Crawl a supplier site from its start page.
///
/// The start page must load; every later page is best-effort.
pub fn crawl_catalog(
    start: &Url,
    fetcher: &impl Fetch,
    settings: &Settings,
) -> Result<Extraction, ExtractError> {
    let home = fetcher.fetch(start)?;
    let mut supplier = page::company_from_page(&home);
    let mut frontier = Frontier::new(start, settings.max_company_pages, settings.product_page_limit());

    let found = page::links(&home);
    let enqueued = found
        .iter()
        .filter(|a| matches!(frontier.admit(&home.url, a), Admission::Enqueued(_)))
        .count();
    info!(url = %start, links = found.len(), enqueued, "start page loaded");

    while let Some(url) = frontier.next_company() {
        match fetcher.fetch(&url) {
            Ok(p) => page::absorb_company_page(&mut supplier, &p),
            Err(e) => warn!(%url, "company page skipped: {}", e),
        }
    }

    let products = crawl_products(&mut frontier, fetcher, settings);
    Ok(Extraction {
        supplier,
        products: dedup::dedupe(products),
    })
}

fn crawl_products(
    frontier: &mut Frontier,
    fetcher: &impl Fetch,
    settings: &Settings,
) -> Vec<ProductRecord> {
    let pb = if settings.progress {
        ProgressBar::new(frontier.pending_products() as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut pacer = Pacer::new(settings.request_delay());
    let mut products = Vec::new();
    while let Some(url) = frontier.next_product() {
        pacer.wait();
        pb.set_message(url.path().to_string());
        match fetcher.fetch(&url) {
            Ok(p) => match page::product_from_page(&p, settings.max_images) {
                Some(record) => products.push(record),
                None => warn!(%url, "no product name found"),
            },
            Err(e) => warn!(%url, "product page skipped: {}", e),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(products = products.len(), "product pages crawled");
    products
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::error::FetchError;
    use crate::web::fetch::FetchedPage;

    /// Serves fixture pages by URL and records every request.
    struct MemoryFetch {
        pages: HashMap<String, String>,
        requested: RefCell<Vec<String>>,
    }

    impl MemoryFetch {
        fn new(pages: &[(&str, String)]) -> Self {
            MemoryFetch {
                pages: pages.iter().map(|(u, b)| (u.to_string(), b.clone())).collect(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetch for MemoryFetch {
        fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some(body) => Ok(FetchedPage {
                    url: url.clone(),
                    body: body.clone(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{name}")).unwrap()
    }

    fn quiet() -> Settings {
        Settings {
            request_delay_ms: 0,
            progress: false,
            ..Settings::default()
        }
    }

    fn acme_site() -> MemoryFetch {
        MemoryFetch::new(&[
            ("https://www.acme-pack.com/", fixture("home.html")),
            ("https://www.acme-pack.com/about-us", fixture("about.html")),
            ("https://www.acme-pack.com/products/amber-jar", fixture("product.html")),
            (
                "https://www.acme-pack.com/shop/item-7",
                "<html><body><h1>Round Tube 50ml</h1><table><tr><td>Material</td><td>LDPE</td></tr></table></body></html>".to_string(),
            ),
            ("https://www.acme-pack.com/bottles/amber-jar-classic", fixture("product.html")),
        ])
    }

    #[test]
    fn crawl_acme_site() {
        let site = acme_site();
        let start = Url::parse("https://www.acme-pack.com/").unwrap();
        let x = crawl_catalog(&start, &site, &quiet()).unwrap();

        assert_eq!(x.supplier.company_name, "Acme Packaging");
        // the about page lists another email; the first one seen is kept
        assert_eq!(x.supplier.email.as_deref(), Some("hello@acme-pack.com"));
        assert_eq!(x.supplier.phone.as_deref(), Some("+44 117 496 0000"));
        assert_eq!(
            x.supplier.address.as_deref(),
            Some("Unit 4, Harbour Road, Bristol BS1 5TY")
        );
        assert!(x.supplier.description.as_deref().unwrap().contains("since 1987"));

        let names: Vec<_> = x.products.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, ["Amber Glass Jar 250ml", "Round Tube 50ml"]);
        assert_eq!(
            x.products[0].source_url.as_deref(),
            Some("https://www.acme-pack.com/products/amber-jar")
        );
        assert_eq!(x.products[1].material_type.as_deref(), Some("LDPE"));
    }

    #[test]
    fn crawl_stays_on_site_and_never_refetches() {
        let site = acme_site();
        let start = Url::parse("https://www.acme-pack.com/").unwrap();
        crawl_catalog(&start, &site, &quiet()).unwrap();

        let requested = site.requested.borrow();
        assert_eq!(requested.len(), requested.iter().unique().count());
        assert!(requested.iter().all(|u| u.starts_with("https://www.acme-pack.com/")));
        assert!(!requested.iter().any(|u| u.contains("mailto") || u.ends_with(".pdf")));
        // the missing contact page was tried once and skipped
        assert!(requested.contains(&"https://www.acme-pack.com/contact".to_string()));
    }

    #[test]
    fn product_cap_limits_requests() {
        let site = acme_site();
        let start = Url::parse("https://www.acme-pack.com/").unwrap();
        let settings = Settings {
            max_product_pages: 1,
            max_company_pages: 0,
            ..quiet()
        };
        let x = crawl_catalog(&start, &site, &settings).unwrap();
        assert_eq!(x.products.len(), 1);
        assert_eq!(site.requested.borrow().len(), 2);
    }

    #[test]
    fn unreachable_start_page_is_fatal() {
        let site = MemoryFetch::new(&[]);
        let start = Url::parse("https://down.example.com/").unwrap();
        let err = crawl_catalog(&start, &site, &quiet()).unwrap_err();
        assert!(matches!(err, ExtractError::Fetch(FetchError::Status { status: 404, .. })));
        assert!(err.to_string().starts_with("Crawling failed"));
    }

    #[test]
    fn document_pages() {
        let pages = vec![
            RawPage::from_text(1, fixture("catalog.txt")),
            RawPage::from_text(
                2,
                "Price list\nName    Material    Weight\nPET BOTTLE 500ML    rPET    25 g\nGlass Jar 250ml    Glass    180 g",
            ),
        ];
        let x = extract_pages(&pages);
        assert_eq!(x.supplier.company_name, "Harbour Glassworks Ltd");
        assert_eq!(x.supplier.email.as_deref(), Some("sales@harbourglass.co.uk"));
        assert_eq!(x.supplier.phone.as_deref(), Some("+44 117 496 0000"));

        let names: Vec<_> = x.products.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(
            names,
            ["PET BOTTLE 500ML", "Glass Jar 250ml", "AMBER GLASS JAR 250ML", "AIRLESS PUMP DISPENSER"]
        );
        // the table row wins over the prose section of the same product
        assert_eq!(x.products[0].material_type.as_deref(), Some("rPET"));
    }

    #[test]
    fn run_reports_failures_in_the_envelope() {
        let env = run("tests/fixtures/missing.pdf", &quiet());
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("PDF extraction failed"));

        let env = run("https://", &quiet());
        assert!(!env.is_success());
        let json = serde_json::to_value(&env).unwrap();
        assert!(json["error"].as_str().unwrap().starts_with("Crawling failed"));
    }

    #[test]
    fn source_kind() {
        assert!(is_web_source("https://acme.com"));
        assert!(is_web_source("HTTP://acme.com"));
        assert!(!is_web_source("catalog.pdf"));
        assert!(!is_web_source("ftp://acme.com/catalog.pdf"));
    }
}
