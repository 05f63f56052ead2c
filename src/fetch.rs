use crate::{CrawlOptions, CrawlerError, Fetcher};
use tokio::{
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::debug;

/// Fetches pages over HTTP, keeping a minimum delay between two requests.
pub struct HttpFetcher {
    client: reqwest::Client,
    request_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    pub fn new(options: &CrawlOptions) -> Result<HttpFetcher, CrawlerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = options.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }

        Ok(HttpFetcher {
            client: builder.build()?,
            request_delay: options.request_delay,
            last_request: Mutex::new(None),
        })
    }

    async fn wait_turn(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = last_request.take() {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < self.request_delay {
                tokio::time::sleep(self.request_delay - elapsed).await;
            }
        }
        last_request.replace(Instant::now());
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, CrawlerError> {
        self.wait_turn().await;

        debug!("Visit {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlerError::FetchFailed {
                url: url.to_string(),
                reason: status.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
