use futures::{stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub mod intrepid;

mod config;
mod data;
mod error;
mod fetch;
mod links;
mod utils;

pub use config::{CrawlOptions, ReviewApi, DEFAULT_REVIEW_API, REVIEW_PAGE_SIZE};
pub use data::Table;
pub use error::CrawlerError;
pub use fetch::HttpFetcher;
pub use links::load_links;
pub use utils::{normalize_opt, normalize_text, normalize_value};

use intrepid::{crawl_reviews, IntrepidCrawler, TripRecord};

/// Downloads pages. Retries and timeouts are left to the implementation.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, CrawlerError>;
}

/// Receives finished trips and the URLs of failed ones.
#[async_trait::async_trait]
pub trait Storage {
    async fn results_count(&self) -> Result<u32, CrawlerError>;
    async fn results_insert(&self, url: &str, record: &TripRecord) -> Result<(), CrawlerError>;
    async fn warned_insert(&self, url: &str, reason: &str) -> Result<(), CrawlerError>;
}

#[derive(Debug)]
pub enum TripOutcome {
    Completed { url: String, record: TripRecord },
    Failed { url: String, error: CrawlerError },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u32,
    pub failed: u32,
}

/// Scrapes every link, `options.concurrency` trips at a time, and hands the
/// outcomes to `storage` one by one.
///
/// A failing trip is recorded as warned and never stops the others. Only a
/// storage error aborts the run, and no trip is fetched after it returns.
pub async fn run_scrapper<F, S>(
    fetcher: F,
    storage: &S,
    links: Vec<String>,
    options: CrawlOptions,
) -> Result<RunSummary, CrawlerError>
where
    F: Fetcher + 'static,
    S: Storage + Sync,
{
    let fetcher = Arc::new(fetcher);
    let crawler = Arc::new(IntrepidCrawler::default());
    let concurrency = options.concurrency.max(1);
    let options = Arc::new(options);

    info!("Initial queue length: {}", links.len());

    let (tx, mut rx) = mpsc::channel::<TripOutcome>(concurrency);

    let scheduler = tokio::spawn(async move {
        stream::iter(links)
            .for_each_concurrent(concurrency, |url| {
                let tx = tx.clone();
                let fetcher = Arc::clone(&fetcher);
                let crawler = Arc::clone(&crawler);
                let options = Arc::clone(&options);
                async move {
                    let result = handle(&url, fetcher.as_ref(), &crawler, &options).await;
                    let outcome = match result {
                        Ok(record) => TripOutcome::Completed { url, record },
                        Err(error) => TripOutcome::Failed { url, error },
                    };
                    if tx.send(outcome).await.is_err() {
                        warn!("Outcome receiver dropped");
                    }
                }
            })
            .await;
    });

    let summary = match write_outcomes(storage, &mut rx).await {
        Ok(summary) => summary,
        Err(e) => {
            scheduler.abort();
            if let Err(join) = scheduler.await {
                debug!("Trip scheduler aborted: {}", join);
            }
            return Err(e);
        }
    };

    if let Err(e) = scheduler.await {
        error!("Trip scheduler stopped: {}", e);
    }

    Ok(summary)
}

async fn write_outcomes<S: Storage>(
    storage: &S,
    rx: &mut mpsc::Receiver<TripOutcome>,
) -> Result<RunSummary, CrawlerError> {
    let mut summary = RunSummary::default();
    let mut extracted = storage.results_count().await?;
    while let Some(outcome) = rx.recv().await {
        match outcome {
            TripOutcome::Completed { url, record } => {
                storage.results_insert(&url, &record).await?;
                extracted += 1;
                summary.completed += 1;
                info!(
                    "[{}] Insert Result {} ({} reviews)",
                    extracted,
                    url,
                    record.reviews.len()
                );
                debug!("\n{}", record);
            }
            TripOutcome::Failed { url, error } => {
                warn!("Dropped trip {}: {}", url, error);
                storage.warned_insert(&url, &error.to_string()).await?;
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// One trip: page, extraction, then every review page.
#[tracing::instrument(skip(fetcher, crawler, options))]
async fn handle<F: Fetcher + ?Sized>(
    url: &str,
    fetcher: &F,
    crawler: &IntrepidCrawler,
    options: &CrawlOptions,
) -> Result<TripRecord, CrawlerError> {
    let html = fetcher.fetch(url).await?;
    let state = crawler.crawl(url, &html)?;

    debug!("Crawl reviews for trip {}", state.trip_code);
    crawl_reviews(
        fetcher,
        state,
        &options.review_api,
        options.max_review_pages,
    )
    .await
}
