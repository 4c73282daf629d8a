use anyhow::Result;
use intrinio_lib::Session;

use super::TickerArgs;
use crate::output::{print_indexed, OutputFormat};

/// Prints adjusted OHLCV for every ticker, indexed by (date, ticker).
pub async fn run(args: &TickerArgs, session: &Session, format: &OutputFormat) -> Result<()> {
    let tickers = args.validated()?;
    let indexed = session.download_adjusted(&tickers).await?;
    eprintln!("{} adjusted rows for {} tickers", indexed.len(), tickers.len());
    print_indexed(&indexed, format)
}
