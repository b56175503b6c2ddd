use thiserror::Error;

/// Failures that abort a whole extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: lopdf::Error,
    },
    #[error("PDF extraction failed: cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Crawling failed: invalid start URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Crawling failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Invalid settings: {0}")]
    Config(#[from] config::ConfigError),
}

/// A single page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}
