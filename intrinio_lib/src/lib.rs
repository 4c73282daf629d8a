//! Library layer for the Intrinio price downloader: configuration, the
//! per-run [`Session`], and the tables downloads are reshaped into.
//!
//! Wraps the `intrinio_api` crate, which owns transport, retries and
//! pagination.

pub mod config;
pub mod error;
pub mod frame;
pub mod session;
pub mod validation;

pub use intrinio_api;
pub use intrinio_api::types::{Endpoint, Record};
pub use intrinio_api::{Client, Frequency, PriceQuery, RetryPolicy};

pub use config::Config;
pub use error::IntrinioError;
pub use frame::{Frame, IndexedFrame, RowKey};
pub use session::{FetchRequest, Session, ADJUSTED_COLUMNS, RAW_PRICE_COLUMNS};
