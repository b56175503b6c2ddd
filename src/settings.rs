use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "CATALOG";
const PRODUCT_PAGE_CEILING: usize = 50;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub max_product_pages: usize,
    pub max_company_pages: usize,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_images: usize,
    pub progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_product_pages: 20,
            max_company_pages: 3,
            request_delay_ms: 500,
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_images: 5,
            progress: true,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `CATALOG_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let d = Settings::default();
        Config::builder()
            .set_default("max_product_pages", d.max_product_pages as i64)?
            .set_default("max_company_pages", d.max_company_pages as i64)?
            .set_default("request_delay_ms", d.request_delay_ms as i64)?
            .set_default("request_timeout_secs", d.request_timeout_secs as i64)?
            .set_default("user_agent", d.user_agent)?
            .set_default("max_images", d.max_images as i64)?
            .set_default("progress", d.progress)?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn product_page_limit(&self) -> usize {
        self.max_product_pages.clamp(1, PRODUCT_PAGE_CEILING)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
