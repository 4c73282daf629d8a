//! HTTP client for the Intrinio v2 REST API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use url::Url;

use crate::{
    query::{PriceQuery, Query},
    types::{Endpoint, Page, Record},
    Error, RetryPolicy,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api-v2.intrinio.com";

/// Request timeout for a single HTTP attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Intrinio v2 API.
///
/// Holds one `reqwest::Client` with the bearer token installed as a default
/// header. Cloning is cheap and clones share the same connection pool, so a
/// single client can be handed to many concurrent fetches.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    /// Base URL for the API. Defaults to [`DEFAULT_BASE_URL`].
    base_api_url: String,
    retry: RetryPolicy,
    /// Optional ceiling on pages per pagination run. `None` follows tokens forever.
    max_pages: Option<usize>,
}

impl Client {
    /// Creates a new client pointing at the production Intrinio API.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self, Error> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| Error::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_api_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
            max_pages: None,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fails pagination with [`Error::PageLimitExceeded`] once `max_pages`
    /// pages have been read and the server still offers another.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn get_url(&self, path: &str, query: Option<&impl Query>) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(e.to_string())
        })?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    /// One HTTP attempt: any non-2xx status becomes [`Error::HttpStatus`].
    async fn get_once(&self, url: &Url) -> Result<Value, Error> {
        let resp = self.http.get(url.clone()).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str::<Value>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::ParseFailed(e.to_string())
        })
    }

    /// Performs one logical GET, retrying transport failures and error
    /// statuses according to the client's [`RetryPolicy`].
    pub async fn get(&self, url: &Url) -> Result<Value, Error> {
        let label = format!("GET {}", url.path());
        self.retry.run(&label, || self.get_once(url)).await
    }

    /// Fetches and decodes a single page.
    pub async fn get_page<Q: Query>(
        &self,
        path: &str,
        output_field: &str,
        query: &Q,
    ) -> Result<Page, Error> {
        let url = self.get_url(path, Some(query))?;
        let body = self.get(&url).await?;
        Page::from_json(body, output_field)
    }

    /// Follows continuation tokens until the server reports the last page,
    /// returning every record in page order.
    ///
    /// Pages are requested one at a time; the token from page N is written
    /// into the query before page N+1 is requested. Any failure discards the
    /// records gathered so far.
    pub async fn get_all_pages<Q: Query + Clone>(
        &self,
        path: &str,
        output_field: &str,
        query: &Q,
    ) -> Result<Vec<Record>, Error> {
        let mut query = query.clone();
        let mut records = Vec::new();
        let mut pages = 0usize;

        loop {
            let page = self.get_page(path, output_field, &query).await?;
            pages += 1;
            tracing::debug!(
                "{}: page {} returned {} records",
                path,
                pages,
                page.records.len()
            );
            records.extend(page.records);

            let Some(token) = page.next_page else {
                return Ok(records);
            };
            if let Some(max_pages) = self.max_pages {
                if pages >= max_pages {
                    tracing::error!(
                        "{}: server still paginating after {} pages",
                        path,
                        max_pages
                    );
                    return Err(Error::PageLimitExceeded(max_pages));
                }
            }
            query.get_paging().next_page = Some(token);
        }
    }

    /// Fetches the full history of one ticker from the given endpoint.
    pub async fn fetch(
        &self,
        endpoint: Endpoint,
        ticker: &str,
        query: &PriceQuery,
    ) -> Result<Vec<Record>, Error> {
        self.get_all_pages(&endpoint.path(ticker), endpoint.output_field(), query)
            .await
    }

    /// Fetches every page of daily prices for a ticker.
    pub async fn get_stock_prices(
        &self,
        ticker: &str,
        query: &PriceQuery,
    ) -> Result<Vec<Record>, Error> {
        self.fetch(Endpoint::StockPrices, ticker, query).await
    }

    /// Fetches every page of split/dividend adjustments for a ticker.
    pub async fn get_stock_price_adjustments(
        &self,
        ticker: &str,
        query: &PriceQuery,
    ) -> Result<Vec<Record>, Error> {
        self.fetch(Endpoint::StockPriceAdjustments, ticker, query)
            .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_with_defaults() {
        let client = Client::new("test-key").unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = Client::with_base_url("http://localhost:1234/", "test-key").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
    }

    #[test]
    fn api_key_with_newline_is_rejected() {
        let result = Client::new("bad\nkey");
        assert!(matches!(result, Err(Error::InvalidApiKey)));
    }

    #[test]
    fn url_includes_path_and_query() {
        let client = Client::with_base_url("http://localhost:1234", "k").unwrap();
        let query = PriceQuery::default().with_next_page("tok");
        let url = client
            .get_url(&Endpoint::StockPrices.path("MSFT"), Some(&query))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:1234/securities/MSFT/prices?next_page=tok"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(5000);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("...[truncated]"));
        assert!(truncated.len() < body.len());
    }
}
