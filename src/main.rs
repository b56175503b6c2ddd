mod error;
mod model;
mod parser;
mod pdf;
mod pipeline;
mod settings;
mod web;

use std::process::ExitCode;

use clap::Parser;

use model::ResultEnvelope;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "catalog_extractor",
    about = "Extract supplier and product data from a PDF catalog or a supplier website"
)]
struct Cli {
    /// PDF path, or an http(s) URL to crawl
    source: Option<String>,

    /// Max product pages to visit when crawling (1-50)
    #[arg(long)]
    max_products: Option<usize>,

    /// Delay between product page requests, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print the JSON on one line
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let Some(source) = cli.source.as_deref() else {
        print_envelope(
            &ResultEnvelope::failure("Usage: catalog_extractor <pdf-path-or-url>"),
            cli.compact,
        )?;
        return Ok(ExitCode::FAILURE);
    };

    let envelope = match Settings::load() {
        Ok(mut settings) => {
            if let Some(n) = cli.max_products {
                settings.max_product_pages = n;
            }
            if let Some(ms) = cli.delay_ms {
                settings.request_delay_ms = ms;
            }
            pipeline::run(source, &settings)
        }
        Err(e) => ResultEnvelope::failure(error::ExtractError::from(e)),
    };

    tracing::debug!(success = envelope.is_success(), "writing result");
    print_envelope(&envelope, cli.compact)?;
    Ok(ExitCode::SUCCESS)
}

fn print_envelope(envelope: &ResultEnvelope, compact: bool) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(envelope)?
    } else {
        serde_json::to_string_pretty(envelope)?
    };
    println!("{}", json);
    Ok(())
}
