//! Per-run session: one shared API client, concurrent per-ticker pagination,
//! and the reshaping of results into tables.
//!
//! Every download fans out one pagination task per ticker onto a
//! [`JoinSet`], waits for all of them, and only then merges. The first
//! ticker to fail aborts its siblings and fails the whole call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use intrinio_api::types::{Endpoint, Record};
use intrinio_api::{Client, PriceQuery, Query};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::error::IntrinioError;
use crate::frame::{Frame, IndexedFrame, TICKER_COLUMN};

/// Columns kept by [`Session::download_adjusted`].
pub const ADJUSTED_COLUMNS: [&str; 5] = ["adj_open", "adj_high", "adj_low", "adj_close", "adj_volume"];

/// Columns removed by [`Session::download_by_ticker`].
pub const RAW_PRICE_COLUMNS: [&str; 7] = [
    "open",
    "high",
    "low",
    "close",
    "volume",
    "frequency",
    "intraperiod",
];

/// One ticker to fetch, optionally starting from a given date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticker: String,
    /// `None` fetches the full history.
    pub start_date: Option<NaiveDate>,
}

impl FetchRequest {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            start_date: None,
        }
    }

    pub fn since(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Pairs tickers with start dates positionally. The two lists must have
    /// the same length.
    pub fn zip<S: AsRef<str>>(
        tickers: &[S],
        start_dates: &[Option<NaiveDate>],
    ) -> Result<Vec<FetchRequest>, IntrinioError> {
        if tickers.len() != start_dates.len() {
            return Err(IntrinioError::InvalidInput(format!(
                "got {} tickers but {} start dates",
                tickers.len(),
                start_dates.len()
            )));
        }
        Ok(tickers
            .iter()
            .zip(start_dates)
            .map(|(ticker, start_date)| FetchRequest {
                ticker: ticker.as_ref().to_string(),
                start_date: *start_date,
            })
            .collect())
    }

    fn to_query(&self, page_size: Option<u32>) -> PriceQuery {
        let mut query = PriceQuery::default();
        if let Some(start_date) = self.start_date {
            query = query.with_start_date(start_date);
        }
        if let Some(page_size) = page_size {
            query = query.with_page_size(page_size);
        }
        query
    }
}

/// Shared context for one batch of downloads.
///
/// Owns the authenticated client; every task spawned by this session uses a
/// clone of it and therefore the same connection pool.
#[derive(Clone)]
pub struct Session {
    client: Client,
    concurrency: Option<usize>,
    page_size: Option<u32>,
}

impl Session {
    /// Builds the client described by `config`.
    pub fn new(config: &Config) -> Result<Self, IntrinioError> {
        let mut client = Client::with_base_url(&config.base_url, &config.api_key)?
            .with_retry_policy(config.retry_policy());
        if let Some(max_pages) = config.max_pages {
            client = client.with_max_pages(max_pages);
        }
        Ok(Self {
            client,
            concurrency: config.concurrency.map(|n| n.max(1)),
            page_size: config.page_size,
        })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            concurrency: None,
            page_size: None,
        }
    }

    /// Limits how many tickers are paginated at the same time.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency.max(1));
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Paginates every request concurrently and returns each ticker's
    /// records in request order, regardless of completion order.
    pub async fn fetch_all(
        &self,
        endpoint: Endpoint,
        requests: &[FetchRequest],
    ) -> Result<Vec<(String, Vec<Record>)>, IntrinioError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!("Fetching {} for {} tickers", endpoint, requests.len());

        let semaphore = self.concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut join_set = JoinSet::new();

        for (idx, request) in requests.iter().enumerate() {
            let client = self.client.clone();
            let sem = semaphore.clone();
            let query = request.to_query(self.page_size);
            let ticker = request.ticker.clone();

            join_set.spawn(async move {
                let _permit = match sem {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                let result = client.fetch(endpoint, &ticker, &query).await;
                (idx, result)
            });
        }

        let mut results: Vec<Option<Vec<Record>>> = vec![None; requests.len()];
        while let Some(joined) = join_set.join_next().await {
            let (idx, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    join_set.abort_all();
                    return Err(IntrinioError::Task(e.to_string()));
                }
            };
            match result {
                Ok(records) => {
                    tracing::debug!(
                        "{}: {} records from {}",
                        requests[idx].ticker,
                        records.len(),
                        endpoint
                    );
                    results[idx] = Some(records);
                }
                Err(source) => {
                    join_set.abort_all();
                    let ticker = requests[idx].ticker.clone();
                    tracing::error!("{} fetch for {} failed: {}", endpoint, ticker, source);
                    return Err(IntrinioError::Fetch { ticker, source });
                }
            }
        }

        requests
            .iter()
            .zip(results)
            .map(|(request, records)| {
                records
                    .map(|records| (request.ticker.clone(), records))
                    .ok_or_else(|| {
                        IntrinioError::Task(format!("no result for {}", request.ticker))
                    })
            })
            .collect()
    }

    /// Every price record for every request, tagged with its ticker and
    /// concatenated. Columns are the union of all fields plus `ticker`.
    pub async fn download_prices(&self, requests: &[FetchRequest]) -> Result<Frame, IntrinioError> {
        let batches = self.fetch_all(Endpoint::StockPrices, requests).await?;
        Ok(tag_and_concat(batches))
    }

    /// Same as [`download_prices`](Self::download_prices) for the price
    /// adjustments endpoint.
    pub async fn download_adjustments(
        &self,
        requests: &[FetchRequest],
    ) -> Result<Frame, IntrinioError> {
        let batches = self
            .fetch_all(Endpoint::StockPriceAdjustments, requests)
            .await?;
        Ok(tag_and_concat(batches))
    }

    /// Full price history for each ticker, indexed and sorted by
    /// `(date, ticker)`, narrowed to the adjusted price columns.
    pub async fn download_adjusted<S: AsRef<str>>(
        &self,
        tickers: &[S],
    ) -> Result<IndexedFrame, IntrinioError> {
        let requests = full_history(tickers);
        let frame = self.download_prices(&requests).await?;
        Ok(frame.index_by_date(true)?.select(&ADJUSTED_COLUMNS))
    }

    /// Full price history per ticker, each indexed and sorted by date with
    /// the raw (unadjusted) price, volume, frequency and intraperiod
    /// columns removed.
    pub async fn download_by_ticker<S: AsRef<str>>(
        &self,
        tickers: &[S],
    ) -> Result<BTreeMap<String, IndexedFrame>, IntrinioError> {
        let requests = full_history(tickers);
        let batches = self.fetch_all(Endpoint::StockPrices, &requests).await?;

        let mut out = BTreeMap::new();
        for (ticker, records) in batches {
            let indexed = Frame::from_records(records)
                .index_by_date(false)?
                .drop_columns(&RAW_PRICE_COLUMNS);
            out.insert(ticker, indexed);
        }
        Ok(out)
    }
}

fn full_history<S: AsRef<str>>(tickers: &[S]) -> Vec<FetchRequest> {
    tickers
        .iter()
        .map(|t| FetchRequest::new(t.as_ref()))
        .collect()
}

fn tag_and_concat(batches: Vec<(String, Vec<Record>)>) -> Frame {
    Frame::concat(batches.into_iter().map(|(ticker, records)| {
        let mut frame = Frame::from_records(records);
        frame.insert_column(TICKER_COLUMN, Value::String(ticker));
        frame
    }))
}
