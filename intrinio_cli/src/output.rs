use std::collections::BTreeMap;

use anyhow::Result;
use intrinio_lib::frame::TICKER_COLUMN;
use intrinio_lib::{Frame, IndexedFrame};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::Table;

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(input: &str) -> OutputFormat {
        match input.trim().to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

// -- Row builders --

/// Renders one JSON value as a table cell. Missing and null are blank.
fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn frame_header(frame: &Frame) -> Vec<String> {
    frame.columns().to_vec()
}

fn frame_rows(frame: &Frame) -> Vec<Vec<String>> {
    frame
        .rows()
        .iter()
        .map(|row| {
            frame
                .columns()
                .iter()
                .map(|c| format_cell(row.get(c)))
                .collect()
        })
        .collect()
}

fn indexed_header(indexed: &IndexedFrame) -> Vec<String> {
    indexed
        .index_names()
        .into_iter()
        .map(String::from)
        .chain(indexed.columns().iter().cloned())
        .collect()
}

fn indexed_rows(indexed: &IndexedFrame) -> Vec<Vec<String>> {
    indexed
        .iter()
        .map(|(key, row)| {
            let mut cells = vec![key.date.format("%Y-%m-%d").to_string()];
            if let Some(ticker) = &key.ticker {
                cells.push(ticker.clone());
            }
            cells.extend(indexed.columns().iter().map(|c| format_cell(row.get(c))));
            cells
        })
        .collect()
}

fn build_table(header: Vec<String>, rows: Vec<Vec<String>>, markdown: bool) -> Table {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    }
    table
}

fn write_csv(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    wtr.write_record(&header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- Combined table output --

pub fn print_frame(frame: &Frame, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", build_table(frame_header(frame), frame_rows(frame), false)),
        OutputFormat::Markdown => println!("{}", build_table(frame_header(frame), frame_rows(frame), true)),
        OutputFormat::Csv => write_csv(frame_header(frame), frame_rows(frame))?,
        OutputFormat::Json => print_json(&frame.rows()),
    }
    Ok(())
}

// -- Indexed table output --

pub fn print_indexed(indexed: &IndexedFrame, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!(
            "{}",
            build_table(indexed_header(indexed), indexed_rows(indexed), false)
        ),
        OutputFormat::Markdown => println!(
            "{}",
            build_table(indexed_header(indexed), indexed_rows(indexed), true)
        ),
        OutputFormat::Csv => write_csv(indexed_header(indexed), indexed_rows(indexed))?,
        OutputFormat::Json => print_json(&indexed.to_records()),
    }
    Ok(())
}

// -- Per-ticker output --

/// CSV flattens the mapping into one table with a leading `ticker` column;
/// the other formats print one section per ticker.
pub fn print_ticker_map(map: &BTreeMap<String, IndexedFrame>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json: BTreeMap<&String, Vec<_>> =
                map.iter().map(|(t, f)| (t, f.to_records())).collect();
            print_json(&json);
        }
        OutputFormat::Csv => {
            let (header, rows) = flatten_ticker_map(map);
            write_csv(header, rows)?;
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            let markdown = *format == OutputFormat::Markdown;
            for (ticker, indexed) in map {
                println!("{} ({} rows)", ticker, indexed.len());
                println!(
                    "{}",
                    build_table(indexed_header(indexed), indexed_rows(indexed), markdown)
                );
            }
        }
    }
    Ok(())
}

fn flatten_ticker_map(map: &BTreeMap<String, IndexedFrame>) -> (Vec<String>, Vec<Vec<String>>) {
    let mut columns: Vec<String> = Vec::new();
    for indexed in map.values() {
        for c in indexed.columns() {
            if !columns.contains(c) {
                columns.push(c.clone());
            }
        }
    }

    let mut header = vec![TICKER_COLUMN.to_string(), "date".to_string()];
    header.extend(columns.iter().cloned());

    let mut rows = Vec::new();
    for (ticker, indexed) in map {
        for (key, row) in indexed.iter() {
            let mut cells = vec![ticker.clone(), key.date.format("%Y-%m-%d").to_string()];
            cells.extend(columns.iter().map(|c| format_cell(row.get(c))));
            rows.push(cells);
        }
    }
    (header, rows)
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
