use clap::Parser;
use std::{path::PathBuf, time::Duration};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use trip_crawler::{
    intrepid::TripData, load_links, run_scrapper, CrawlOptions, HttpFetcher, ReviewApi,
    DEFAULT_REVIEW_API,
};

/// Scrape Intrepid Travel trip pages together with their reviews.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// File with one trip page URL per line
    #[arg(long)]
    links: Option<PathBuf>,

    /// Output name, results are written to <NAME>.db
    #[arg(long, default_value = "intrepid")]
    name: String,

    /// Trips scraped at the same time
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Minimum delay between two requests
    #[arg(long, default_value_t = 200)]
    request_delay_ms: u64,

    /// Stop requesting reviews for a trip after this many pages
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_review_pages: Option<u32>,

    #[arg(long, default_value = DEFAULT_REVIEW_API)]
    review_api: String,

    #[arg(long)]
    user_agent: Option<String>,
}

impl Args {
    fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            concurrency: self.concurrency,
            request_delay: Duration::from_millis(self.request_delay_ms),
            max_review_pages: self.max_review_pages,
            review_api: ReviewApi::new(self.review_api.as_str()),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let args = Args::parse();
    let links = load_links(args.links.as_deref()).await?;
    let options = args.crawl_options();

    let data = TripData::new(&args.name).await?;
    let fetcher = HttpFetcher::new(&options)?;

    let summary = run_scrapper(fetcher, &data, links, options).await?;
    info!(
        "Finished: {} trips stored, {} failed",
        summary.completed, summary.failed
    );

    Ok(())
}
