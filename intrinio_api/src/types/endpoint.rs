use std::fmt;

/// The paginated security endpoints this client knows how to walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /securities/{ticker}/prices`
    StockPrices,
    /// `GET /securities/{ticker}/prices/adjustments`
    StockPriceAdjustments,
}

impl Endpoint {
    /// Request path for the given ticker, relative to the API base URL.
    pub fn path(&self, ticker: &str) -> String {
        match self {
            Endpoint::StockPrices => format!("/securities/{}/prices", ticker),
            Endpoint::StockPriceAdjustments => {
                format!("/securities/{}/prices/adjustments", ticker)
            }
        }
    }

    /// Name of the JSON field holding the page's record array.
    pub fn output_field(&self) -> &'static str {
        match self {
            Endpoint::StockPrices => "stock_prices",
            Endpoint::StockPriceAdjustments => "stock_price_adjustments",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::StockPrices => "prices",
            Endpoint::StockPriceAdjustments => "adjustments",
        })
    }
}
