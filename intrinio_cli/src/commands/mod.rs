//! CLI subcommand implementations.

pub mod adjusted;
pub mod adjustments;
pub mod distinct;
pub mod prices;

use anyhow::{bail, Result};
use clap::Args;
use intrinio_lib::validation;
use intrinio_lib::FetchRequest;

#[derive(Args)]
pub struct DownloadArgs {
    /// Ticker symbols (e.g. AAPL MSFT)
    #[arg(required = true)]
    pub tickers: Vec<String>,

    /// Start date (YYYY-MM-DD). Give once to apply to every ticker, or once
    /// per ticker in the same order; use "none" for a full history
    #[arg(long = "start-date")]
    pub start_dates: Vec<String>,
}

#[derive(Args)]
pub struct TickerArgs {
    /// Ticker symbols (e.g. AAPL MSFT)
    #[arg(required = true)]
    pub tickers: Vec<String>,
}

impl TickerArgs {
    pub fn validated(&self) -> Result<Vec<String>> {
        Ok(validation::validate_tickers(&self.tickers)?)
    }
}

/// Pairs validated tickers with their start dates.
pub fn build_requests(args: &DownloadArgs) -> Result<Vec<FetchRequest>> {
    let tickers = validation::validate_tickers(&args.tickers)?;

    let mut dates = Vec::with_capacity(args.start_dates.len());
    for raw in &args.start_dates {
        dates.push(match raw.trim().to_lowercase().as_str() {
            "" | "none" => None,
            _ => Some(validation::validate_date(raw)?),
        });
    }

    let dates = match dates.len() {
        0 => vec![None; tickers.len()],
        1 => vec![dates[0]; tickers.len()],
        n if n == tickers.len() => dates,
        n => bail!(
            "--start-date given {} times; expected 0, 1 or {} (one per ticker)",
            n,
            tickers.len()
        ),
    };

    Ok(FetchRequest::zip(&tickers, &dates)?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn args(tickers: &[&str], dates: &[&str]) -> DownloadArgs {
        DownloadArgs {
            tickers: tickers.iter().map(|s| s.to_string()).collect(),
            start_dates: dates.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn no_dates_means_full_history() {
        let reqs = build_requests(&args(&["aapl", "msft"], &[])).unwrap();
        assert_eq!(reqs, vec![FetchRequest::new("AAPL"), FetchRequest::new("MSFT")]);
    }

    #[test]
    fn single_date_is_shared() {
        let reqs = build_requests(&args(&["AAPL", "MSFT"], &["2024-01-02"])).unwrap();
        assert!(reqs.iter().all(|r| r.start_date == Some(date("2024-01-02"))));
    }

    #[test]
    fn dates_pair_positionally() {
        let reqs = build_requests(&args(&["AAPL", "MSFT", "IBM"], &["2024-01-02", "none", "2023-05-01"]))
            .unwrap();
        assert_eq!(reqs[0].start_date, Some(date("2024-01-02")));
        assert_eq!(reqs[1].start_date, None);
        assert_eq!(reqs[2], FetchRequest::new("IBM").since(date("2023-05-01")));
    }

    #[test]
    fn mismatched_date_count_rejected() {
        let err = build_requests(&args(&["A", "B", "C"], &["2024-01-02", "2024-01-03"])).unwrap_err();
        assert!(err.to_string().contains("expected 0, 1 or 3"));
    }

    #[test]
    fn bad_inputs_rejected() {
        assert!(build_requests(&args(&["AA PL"], &[])).is_err());
        assert!(build_requests(&args(&["AAPL"], &["01/02/2024"])).is_err());
    }
}
