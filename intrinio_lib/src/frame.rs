//! In-memory tables built from fetched records.
//!
//! A [`Frame`] is an ordered list of JSON records plus the union of their
//! field names. [`IndexedFrame`] lifts the `date` (and optionally `ticker`)
//! fields out of every row into a sorted [`RowKey`] index.

use chrono::{DateTime, NaiveDate};
use intrinio_api::types::Record;
use serde::Serialize;
use serde_json::Value;

use crate::error::IntrinioError;

pub const DATE_COLUMN: &str = "date";
pub const TICKER_COLUMN: &str = "ticker";

/// Rows of loosely-typed records with a stable column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Frame {
    /// Builds a frame whose columns are every field seen, in first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut frame = Frame::default();
        for record in &records {
            frame.add_columns(record.keys().map(String::as_str));
        }
        frame.rows = records;
        frame
    }

    fn add_columns<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
            }
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Value at `(row, column)`; `None` when the row lacks the field.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row)?.get(column)
    }

    /// Sets `name` to `value` on every row. The column is registered even
    /// when the frame has no rows.
    pub fn insert_column(&mut self, name: &str, value: Value) {
        self.add_columns([name]);
        for row in &mut self.rows {
            row.insert(name.to_string(), value.clone());
        }
    }

    /// Row-wise union. Columns are the union of all inputs in first-seen order.
    pub fn concat<I: IntoIterator<Item = Frame>>(frames: I) -> Frame {
        let mut out = Frame::default();
        for frame in frames {
            out.add_columns(frame.columns.iter().map(String::as_str));
            out.rows.extend(frame.rows);
        }
        out
    }

    /// Keeps exactly `columns`, in the given order. A requested column that
    /// no row carries is kept and reads as missing.
    pub fn select(mut self, columns: &[&str]) -> Frame {
        for row in &mut self.rows {
            row.retain(|k, _| columns.contains(&k.as_str()));
        }
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Removes `columns` from every row; names that are not present are ignored.
    pub fn drop_columns(mut self, columns: &[&str]) -> Frame {
        for row in &mut self.rows {
            row.retain(|k, _| !columns.contains(&k.as_str()));
        }
        self.columns.retain(|c| !columns.contains(&c.as_str()));
        self
    }

    /// Moves the `date` field (and `ticker` when `with_ticker`) into a
    /// sorted index. Rows with equal keys keep their relative order.
    pub fn index_by_date(self, with_ticker: bool) -> Result<IndexedFrame, IntrinioError> {
        let mut keyed = Vec::with_capacity(self.rows.len());
        for (i, mut row) in self.rows.into_iter().enumerate() {
            let raw = row.remove(DATE_COLUMN).ok_or_else(|| {
                IntrinioError::Data(format!("row {} has no '{}' field", i, DATE_COLUMN))
            })?;
            let date = parse_date(&raw).ok_or_else(|| {
                IntrinioError::Data(format!("row {} has unparseable date {}", i, raw))
            })?;
            let ticker = if with_ticker {
                match row.remove(TICKER_COLUMN) {
                    Some(Value::String(ticker)) => Some(ticker),
                    _ => {
                        return Err(IntrinioError::Data(format!(
                            "row {} has no '{}' field",
                            i, TICKER_COLUMN
                        )))
                    }
                }
            } else {
                None
            };
            keyed.push((RowKey { date, ticker }, row));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut columns = self.columns;
        columns.retain(|c| c != DATE_COLUMN && !(with_ticker && c == TICKER_COLUMN));

        let (keys, rows) = keyed.into_iter().unzip();
        Ok(IndexedFrame {
            keys,
            with_ticker,
            frame: Frame { columns, rows },
        })
    }
}

/// Parses a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Sort key for an indexed row. Orders by date, then ticker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RowKey {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

/// A [`Frame`] whose rows are keyed and sorted by [`RowKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFrame {
    keys: Vec<RowKey>,
    with_ticker: bool,
    frame: Frame,
}

impl IndexedFrame {
    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    /// The non-index columns.
    pub fn columns(&self) -> &[String] {
        self.frame.columns()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn index_names(&self) -> Vec<&'static str> {
        if self.with_ticker {
            vec![DATE_COLUMN, TICKER_COLUMN]
        } else {
            vec![DATE_COLUMN]
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &Record)> {
        self.keys.iter().zip(self.frame.rows())
    }

    pub fn select(self, columns: &[&str]) -> IndexedFrame {
        IndexedFrame {
            frame: self.frame.select(columns),
            ..self
        }
    }

    pub fn drop_columns(self, columns: &[&str]) -> IndexedFrame {
        IndexedFrame {
            frame: self.frame.drop_columns(columns),
            ..self
        }
    }

    /// Flattens the index back into each row as `date` (`YYYY-MM-DD`) and `ticker`.
    pub fn to_records(&self) -> Vec<Record> {
        self.iter()
            .map(|(key, row)| {
                let mut record = Record::new();
                record.insert(
                    DATE_COLUMN.to_string(),
                    Value::String(key.date.format("%Y-%m-%d").to_string()),
                );
                if let Some(ticker) = &key.ticker {
                    record.insert(TICKER_COLUMN.to_string(), Value::String(ticker.clone()));
                }
                record.extend(row.iter().map(|(k, v)| (k.clone(), v.clone())));
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn frame(values: Vec<Value>) -> Frame {
        Frame::from_records(values.into_iter().map(record).collect())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn columns_are_union_of_fields() {
        let f = frame(vec![json!({"a": 1, "b": 2}), json!({"b": 3, "c": 4})]);
        assert_eq!(f.columns(), &["a", "b", "c"]);
        assert_eq!(f.len(), 2);
        assert_eq!(f.get(0, "c"), None);
        assert_eq!(f.get(1, "c"), Some(&json!(4)));
    }

    #[test]
    fn insert_column_tags_every_row() {
        let mut f = frame(vec![json!({"a": 1}), json!({"a": 2})]);
        f.insert_column("ticker", json!("AAPL"));
        assert_eq!(f.columns(), &["a", "ticker"]);
        assert!(f.rows().iter().all(|r| r["ticker"] == "AAPL"));
    }

    #[test]
    fn insert_column_on_empty_frame_registers_column() {
        let mut f = Frame::default();
        f.insert_column("ticker", json!("AAPL"));
        assert!(f.is_empty());
        assert!(f.has_column("ticker"));
    }

    #[test]
    fn concat_keeps_row_order_and_unions_columns() {
        let a = frame(vec![json!({"x": 1})]);
        let b = frame(vec![json!({"y": 2}), json!({"x": 3})]);
        let c = Frame::concat([a, b]);
        assert_eq!(c.columns(), &["x", "y"]);
        assert_eq!(c.len(), 3);
        assert_eq!(c.get(2, "x"), Some(&json!(3)));
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        let c = Frame::concat(Vec::new());
        assert!(c.is_empty());
        assert!(c.columns().is_empty());
    }

    #[test]
    fn select_keeps_requested_order() {
        let f = frame(vec![json!({"a": 1, "b": 2, "c": 3})]).select(&["c", "a", "z"]);
        assert_eq!(f.columns(), &["c", "a", "z"]);
        assert_eq!(f.rows()[0].len(), 2);
        assert_eq!(f.get(0, "z"), None);
    }

    #[test]
    fn drop_ignores_missing_columns() {
        let f = frame(vec![json!({"a": 1, "b": 2})]).drop_columns(&["b", "nope"]);
        assert_eq!(f.columns(), &["a"]);
        assert!(f.get(0, "b").is_none());
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date(&json!("2024-06-14")), Some(date(2024, 6, 14)));
        assert_eq!(
            parse_date(&json!("2024-06-14T00:00:00+00:00")),
            Some(date(2024, 6, 14))
        );
        assert_eq!(parse_date(&json!("14/06/2024")), None);
        assert_eq!(parse_date(&json!(20240614)), None);
    }

    #[test]
    fn index_sorts_by_date_then_ticker() {
        let f = frame(vec![
            json!({"date": "2024-01-03", "ticker": "B", "v": 1}),
            json!({"date": "2024-01-02", "ticker": "B", "v": 2}),
            json!({"date": "2024-01-03", "ticker": "A", "v": 3}),
            json!({"date": "2024-01-01", "ticker": "A", "v": 4}),
        ]);
        let indexed = f.index_by_date(true).unwrap();
        let keys: Vec<(NaiveDate, &str)> = indexed
            .keys()
            .iter()
            .map(|k| (k.date, k.ticker.as_deref().unwrap()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (date(2024, 1, 1), "A"),
                (date(2024, 1, 2), "B"),
                (date(2024, 1, 3), "A"),
                (date(2024, 1, 3), "B"),
            ]
        );
        assert_eq!(indexed.columns(), &["v"]);
        assert_eq!(indexed.index_names(), vec!["date", "ticker"]);
        let values: Vec<i64> = indexed.iter().map(|(_, r)| r["v"].as_i64().unwrap()).collect();
        assert_eq!(values, vec![4, 2, 3, 1]);
    }

    #[test]
    fn index_by_date_only_keeps_ticker_column() {
        let f = frame(vec![
            json!({"date": "2024-01-02", "ticker": "A"}),
            json!({"date": "2024-01-01", "ticker": "A"}),
        ]);
        let indexed = f.index_by_date(false).unwrap();
        assert_eq!(indexed.keys()[0].date, date(2024, 1, 1));
        assert_eq!(indexed.keys()[0].ticker, None);
        assert_eq!(indexed.columns(), &["ticker"]);
        assert_eq!(indexed.index_names(), vec!["date"]);
    }

    #[test]
    fn bad_dates_are_data_errors() {
        let err = frame(vec![json!({"date": "yesterday"})])
            .index_by_date(false)
            .unwrap_err();
        assert!(matches!(err, IntrinioError::Data(_)));

        let err = frame(vec![json!({"close": 1.0})])
            .index_by_date(false)
            .unwrap_err();
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn to_records_flattens_index() {
        let indexed = frame(vec![json!({"date": "2024-01-02", "ticker": "A", "v": 1})])
            .index_by_date(true)
            .unwrap();
        let records = indexed.to_records();
        assert_eq!(records[0]["date"], "2024-01-02");
        assert_eq!(records[0]["ticker"], "A");
        assert_eq!(records[0]["v"], 1);
    }
}
