//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding configuration, input validation and reshaping failures.
#[derive(Debug)]
pub enum IntrinioError {
    /// An error from the underlying API client outside of a ticker fetch.
    Api(intrinio_api::Error),
    /// A ticker's pagination failed; the whole batch is abandoned.
    Fetch {
        ticker: String,
        source: intrinio_api::Error,
    },
    /// A fetch task panicked or was cancelled before reporting.
    Task(String),
    /// Configuration could not be resolved.
    Config(String),
    /// Fetched records could not be reshaped (e.g. an unparseable date).
    Data(String),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for IntrinioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Fetch { ticker, source } => write!(f, "Fetch failed for {}: {}", ticker, source),
            Self::Task(msg) => write!(f, "Fetch task failed: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Data(msg) => write!(f, "Data error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for IntrinioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<intrinio_api::Error> for IntrinioError {
    fn from(e: intrinio_api::Error) -> Self {
        Self::Api(e)
    }
}
