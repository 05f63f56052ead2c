use crate::CrawlerError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_REVIEW_API: &str =
    "https://www.intrepidtravel.com/uk/ajax/peak-shortcode-review/get-reviews";

/// Reviews requested per page.
pub const REVIEW_PAGE_SIZE: u32 = 10;

/// Paginated review endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewApi {
    base: String,
}

impl ReviewApi {
    pub fn new<S: Into<String>>(base: S) -> Self {
        Self { base: base.into() }
    }

    pub fn page_url(&self, trip_code: &str, page: u32, limit: u32) -> Result<Url, CrawlerError> {
        Ok(Url::parse_with_params(
            &self.base,
            &[
                ("limit", limit.to_string()),
                ("page", page.to_string()),
                ("product_code", trip_code.to_string()),
            ],
        )?)
    }
}

impl Default for ReviewApi {
    fn default() -> Self {
        Self::new(DEFAULT_REVIEW_API)
    }
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Trip chains running at the same time.
    pub concurrency: usize,
    pub request_delay: Duration,
    /// `None` keeps requesting review pages until the API returns an empty one.
    pub max_review_pages: Option<u32>,
    pub review_api: ReviewApi,
    pub user_agent: Option<String>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            request_delay: Duration::from_millis(200),
            max_review_pages: None,
            review_api: ReviewApi::default(),
            user_agent: None,
        }
    }
}
