//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response (connect failure, timeout, reset).
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The response body was not valid JSON.
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),
    /// A page did not contain the expected output field.
    #[error("Response is missing field '{0}'")]
    MissingField(String),
    /// A page field was present but had the wrong JSON type.
    #[error("Field '{field}' has unexpected type, expected {expected}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
    },
    /// The server kept returning continuation tokens past the configured page ceiling.
    #[error("Pagination exceeded the limit of {0} pages")]
    PageLimitExceeded(usize),
    /// The base URL and path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The API key cannot be sent as an HTTP header value.
    #[error("Invalid API key format")]
    InvalidApiKey,
}

impl Error {
    /// Transport failures and error statuses are retried; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::HttpStatus { .. })
    }
}
