use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Anything that can abort a harvesting run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("fetch failed: {0}")]
    FetchFailed(#[from] FetchError),
    #[error("extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractError),
    #[error("persistence error: {0}")]
    PersistenceError(#[from] StoreError),
    #[error("delivery failed: {0}")]
    DeliveryFailed(#[from] DeliveryError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),
    #[error("APP_ID is empty, set your Google Play app id")]
    MissingAppId,
    #[error("REVIEW_COUNT must be between 1 and {max}, got {value}")]
    ReviewCountOutOfRange { value: usize, max: usize },
    #[error("ACCEPT_LANGUAGE {0:?} is not a usable header value")]
    InvalidAcceptLanguage(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid Accept-Language {0:?}")]
    AcceptLanguage(String),
    #[error("invalid storefront url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status { url: Url, status: StatusCode },
    #[error("app `{app_id}` does not exist ({url})")]
    NotFound { app_id: String, url: Url },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("failed to encode or decode review: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("review `{0}` is already stored")]
    DuplicateKey(String),
    #[error("id counter is corrupt ({0} bytes)")]
    CorruptCounter(usize),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("webhook answered {0}")]
    Status(StatusCode),
}
