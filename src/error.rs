#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("Database error")]
    DatabaseError(#[from] sqlx::error::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Malformed JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Page layout changed, missing {0}")]
    StructuralExtractionFailure(&'static str),

    #[error("Trip code not found in trip overview")]
    MissingTripCode,
}
