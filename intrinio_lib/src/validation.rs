use chrono::NaiveDate;

use crate::error::IntrinioError;

pub const MAX_TICKER_LENGTH: usize = 12;
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Normalize and validate a ticker symbol: trim, uppercase, and allow only
/// `A-Z`, `0-9`, `.`, `-` and `_` so it can be placed in a URL path.
pub fn validate_ticker(input: &str) -> Result<String, IntrinioError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IntrinioError::InvalidInput(
            "ticker is empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_TICKER_LENGTH {
        return Err(IntrinioError::InvalidInput(format!(
            "ticker '{}' exceeds maximum length of {} characters",
            trimmed, MAX_TICKER_LENGTH
        )));
    }
    let upper = trimmed.to_ascii_uppercase();
    if let Some(bad) = upper
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
    {
        return Err(IntrinioError::InvalidInput(format!(
            "ticker '{}' contains invalid character '{}'",
            trimmed, bad
        )));
    }
    Ok(upper)
}

/// Validate every ticker in order, failing on the first bad one.
pub fn validate_tickers<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<String>, IntrinioError> {
    inputs.iter().map(|t| validate_ticker(t.as_ref())).collect()
}

/// Validate a YYYY-MM-DD date string.
pub fn validate_date(input: &str) -> Result<NaiveDate, IntrinioError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        IntrinioError::InvalidInput(format!(
            "invalid date '{}'. Expected format: YYYY-MM-DD (e.g., 2024-06-01)",
            trimmed
        ))
    })
}

/// Validate page size (must be 1..=10000).
pub fn validate_page_size(page_size: u32) -> Result<u32, IntrinioError> {
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(IntrinioError::InvalidInput(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(page_size)
}

/// Validate a fan-out width (must be >= 1).
pub fn validate_concurrency(concurrency: usize) -> Result<usize, IntrinioError> {
    if concurrency < 1 {
        return Err(IntrinioError::InvalidInput(
            "concurrency must be >= 1".to_string(),
        ));
    }
    Ok(concurrency)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Ticker validation --

    #[test]
    fn ticker_valid_uppercase() {
        assert_eq!(validate_ticker("AAPL").unwrap(), "AAPL");
    }

    #[test]
    fn ticker_valid_lowercase_and_padded() {
        assert_eq!(validate_ticker("  msft ").unwrap(), "MSFT");
    }

    #[test]
    fn ticker_with_class_suffix() {
        assert_eq!(validate_ticker("brk.b").unwrap(), "BRK.B");
        assert_eq!(validate_ticker("BF-B").unwrap(), "BF-B");
    }

    #[test]
    fn ticker_empty() {
        assert!(validate_ticker("").is_err());
        assert!(validate_ticker("   ").is_err());
    }

    #[test]
    fn ticker_path_characters_rejected() {
        assert!(validate_ticker("AAPL/prices").is_err());
        assert!(validate_ticker("A?B").is_err());
        assert!(validate_ticker("A B").is_err());
    }

    #[test]
    fn ticker_too_long() {
        assert!(validate_ticker("ABCDEFGHIJKLM").is_err());
    }

    #[test]
    fn tickers_stop_at_first_error() {
        assert_eq!(
            validate_tickers(&["aapl", "msft"]).unwrap(),
            vec!["AAPL".to_string(), "MSFT".to_string()]
        );
        assert!(validate_tickers(&["aapl", "bad/one"]).is_err());
    }

    // -- Date validation --

    #[test]
    fn date_valid() {
        assert_eq!(
            validate_date("2024-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn date_invalid() {
        assert!(validate_date("06/01/2024").is_err());
        assert!(validate_date("2024-13-01").is_err());
    }

    // -- Numeric validation --

    #[test]
    fn page_size_bounds() {
        assert!(validate_page_size(0).is_err());
        assert_eq!(validate_page_size(1).unwrap(), 1);
        assert_eq!(validate_page_size(10_000).unwrap(), 10_000);
        assert!(validate_page_size(10_001).is_err());
    }

    #[test]
    fn concurrency_bounds() {
        assert!(validate_concurrency(0).is_err());
        assert_eq!(validate_concurrency(3).unwrap(), 3);
    }
}
