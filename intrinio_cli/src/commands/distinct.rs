use anyhow::Result;
use intrinio_lib::Session;

use super::TickerArgs;
use crate::output::{print_ticker_map, OutputFormat};

/// Prints one date-indexed table per ticker, without the raw price columns.
pub async fn run(args: &TickerArgs, session: &Session, format: &OutputFormat) -> Result<()> {
    let tickers = args.validated()?;
    let by_ticker = session.download_by_ticker(&tickers).await?;
    print_ticker_map(&by_ticker, format)
}
