use super::TripRecord;
use crate::{config::REVIEW_PAGE_SIZE, CrawlerError, Fetcher, ReviewApi};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct ReviewPage {
    reviews: Vec<Value>,
}

/// Review crawl progress for one trip. It carries the record being filled.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    pub trip_code: String,
    pub page: u32,
    pub limit: u32,
    pub accumulated: usize,
    pub record: TripRecord,
}

impl PaginationState {
    pub fn new(record: TripRecord) -> Result<PaginationState, CrawlerError> {
        let trip_code = record
            .trip_overview
            .trip_code
            .clone()
            .filter(|code| !code.is_empty())
            .ok_or(CrawlerError::MissingTripCode)?;

        Ok(PaginationState {
            trip_code,
            page: 1,
            limit: REVIEW_PAGE_SIZE,
            accumulated: 0,
            record,
        })
    }

    pub fn request_url(&self, api: &ReviewApi) -> Result<Url, CrawlerError> {
        api.page_url(&self.trip_code, self.page, self.limit)
    }

    /// An empty page ends the crawl, anything else moves on to the next page.
    pub fn accumulate(mut self, reviews: Vec<Value>) -> ReviewPaginator {
        if reviews.is_empty() {
            debug!(
                "Trip {} done after {} pages, {} reviews",
                self.trip_code, self.page, self.accumulated
            );
            return ReviewPaginator::Done(self.record);
        }

        self.accumulated += reviews.len();
        self.record.reviews.extend(reviews);
        self.page += 1;
        ReviewPaginator::Fetching(self)
    }

    /// Parses a review page body and applies it.
    pub fn on_page(self, body: &str) -> Result<ReviewPaginator, CrawlerError> {
        let page: ReviewPage = serde_json::from_str(body)?;
        Ok(self.accumulate(page.reviews))
    }
}

#[derive(Debug, PartialEq)]
pub enum ReviewPaginator {
    Fetching(PaginationState),
    Done(TripRecord),
}

/// Requests review pages one after another until the API returns an empty
/// page. With `max_pages` set, the record is returned once that many pages
/// have been read.
///
/// Any fetch or decoding error aborts the whole crawl for the trip.
pub async fn crawl_reviews<F: Fetcher + ?Sized>(
    fetcher: &F,
    state: PaginationState,
    api: &ReviewApi,
    max_pages: Option<u32>,
) -> Result<TripRecord, CrawlerError> {
    let mut paginator = ReviewPaginator::Fetching(state);
    loop {
        let state = match paginator {
            ReviewPaginator::Done(record) => return Ok(record),
            ReviewPaginator::Fetching(state) => state,
        };

        if let Some(max_pages) = max_pages {
            if state.page > max_pages {
                warn!(
                    "Trip {} reached the {} page review limit, keeping {} reviews",
                    state.trip_code, max_pages, state.accumulated
                );
                return Ok(state.record);
            }
        }

        let url = state.request_url(api)?;
        let body = fetcher.fetch(url.as_str()).await?;
        paginator = state.on_page(&body)?;
    }
}
