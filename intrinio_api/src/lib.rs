//! Async client for paginated Intrinio security price endpoints.
//!
//! [`Client::get`] performs one retried GET, [`Client::get_all_pages`]
//! follows `next_page` tokens until the server reports the last page.

mod client;
mod errors;
mod query;
mod retry;
pub mod types;
pub use self::client::{Client, DEFAULT_BASE_URL};
pub use self::errors::Error;
pub use self::query::{Frequency, Paging, PriceQuery, Query};
pub use self::retry::RetryPolicy;
