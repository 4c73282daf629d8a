use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use url::Url;

use super::{common::Paging, Query};

/// Sampling frequency for price history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        })
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "weekly" | "w" => Ok(Frequency::Weekly),
            "monthly" | "m" => Ok(Frequency::Monthly),
            "quarterly" | "q" => Ok(Frequency::Quarterly),
            "yearly" | "y" => Ok(Frequency::Yearly),
            other => Err(format!("unknown frequency '{}'", other)),
        }
    }
}

/// Query for the security prices and price adjustments endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriceQuery {
    pub paging: Paging,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub frequency: Option<Frequency>,
}

impl Query for PriceQuery {
    fn get_paging(&mut self) -> &mut Paging {
        &mut self.paging
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(start_date) = self.start_date {
            url.query_pairs_mut()
                .append_pair("start_date", &start_date.format("%Y-%m-%d").to_string());
        }
        if let Some(end_date) = self.end_date {
            url.query_pairs_mut()
                .append_pair("end_date", &end_date.format("%Y-%m-%d").to_string());
        }
        if let Some(frequency) = self.frequency {
            url.query_pairs_mut()
                .append_pair("frequency", &frequency.to_string());
        }
        self.paging.add_to_url(&url)
    }
}

impl PriceQuery {
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }
}
