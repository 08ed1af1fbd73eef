//! Typing of raw subscriber tables into an ordered series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use shortlens_core::SubscriberSample;

use crate::columns::{resolve_series_columns, SeriesColumns};
use crate::error::PipelineError;
use crate::features::parse_published_at;

/// A subscriber export as read from disk: headers plus untyped cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SubscriberTable {
    /// Build a table from string slices; convenient for fixtures.
    #[must_use]
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        }
    }
}

/// A cleaned series plus bookkeeping about what was discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSeries {
    /// Samples in ascending date order, one per date.
    pub samples: Vec<SubscriberSample>,
    pub columns: SeriesColumns,
    /// Rows dropped because the date or value cell did not parse.
    pub dropped_rows: usize,
    /// Rows that repeated an earlier date and replaced its value.
    pub duplicate_dates: usize,
}

/// Resolve columns, type each row, and drop rows that fail to parse.
///
/// When a date repeats, the later row wins.
///
/// # Errors
///
/// Returns [`PipelineError::InputFormat`] if a required column cannot be
/// resolved, or if the table has rows but none of them parse.
pub fn parse_subscriber_series(table: &SubscriberTable) -> Result<ParsedSeries, PipelineError> {
    let columns = resolve_series_columns(&table.headers)?;

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut dropped_rows = 0usize;
    let mut duplicate_dates = 0usize;

    for (line, row) in table.rows.iter().enumerate() {
        let date_cell = row.get(columns.date.index).map_or("", String::as_str);
        let value_cell = row.get(columns.value.index).map_or("", String::as_str);

        match (parse_series_date(date_cell), parse_count(value_cell)) {
            (Some(date), Some(value)) => {
                if by_date.insert(date, value).is_some() {
                    duplicate_dates += 1;
                    tracing::debug!(%date, "duplicate subscriber date; keeping the later row");
                }
            }
            _ => {
                dropped_rows += 1;
                tracing::warn!(
                    row = line + 1,
                    date = date_cell,
                    value = value_cell,
                    "dropping unparseable subscriber row"
                );
            }
        }
    }

    if !table.rows.is_empty() && by_date.is_empty() {
        return Err(PipelineError::InputFormat(format!(
            "none of the {} rows had a parseable '{}' date and '{}' value",
            table.rows.len(),
            columns.date.name,
            columns.value.name
        )));
    }

    let samples = by_date
        .into_iter()
        .map(|(date, subscriber_count)| SubscriberSample {
            date,
            subscriber_count,
        })
        .collect();

    Ok(ParsedSeries {
        samples,
        columns,
        dropped_rows,
        duplicate_dates,
    })
}

/// Parse a series date cell into a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`, `Mon D, YYYY`, and any
/// timestamp [`parse_published_at`] understands (truncated to its UTC date).
#[must_use]
pub fn parse_series_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| parse_published_at(text).map(|dt| dt.date_naive()))
}

/// Parse a numeric cell, tolerating thousands separators.
///
/// Blank, non-numeric, `NaN` and infinite cells yield `None`.
#[must_use]
pub fn parse_count(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// What a subscriber export looks like to the pipeline, without running
/// peak detection.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesInspection {
    pub headers: Vec<String>,
    pub columns: SeriesColumns,
    /// Both roles matched their canonical header names.
    pub canonical: bool,
    pub total_rows: usize,
    pub parsed_rows: usize,
    pub dropped_rows: usize,
    pub duplicate_dates: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Check that a subscriber export can feed the peak detector.
///
/// # Errors
///
/// Returns the same errors as [`parse_subscriber_series`].
pub fn inspect_subscriber_table(
    table: &SubscriberTable,
) -> Result<SeriesInspection, PipelineError> {
    let parsed = parse_subscriber_series(table)?;
    let values = parsed.samples.iter().map(|s| s.subscriber_count);

    Ok(SeriesInspection {
        headers: table.headers.clone(),
        canonical: parsed.columns.date.is_canonical() && parsed.columns.value.is_canonical(),
        total_rows: table.rows.len(),
        parsed_rows: parsed.samples.len(),
        dropped_rows: parsed.dropped_rows,
        duplicate_dates: parsed.duplicate_dates,
        first_date: parsed.samples.first().map(|s| s.date),
        last_date: parsed.samples.last().map(|s| s.date),
        min_value: values.clone().reduce(f64::min),
        max_value: values.reduce(f64::max),
        columns: parsed.columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn parses_canonical_table_in_date_order() {
        let table = SubscriberTable::from_rows(
            &["Date", "Subscribers"],
            &[&["2024-01-03", "120"], &["2024-01-01", "100"], &["2024-01-02", "1,105"]],
        );
        let parsed = parse_subscriber_series(&table).unwrap();
        let dates: Vec<NaiveDate> = parsed.samples.iter().map(|s| s.date).collect();
        assert_eq!(dates, [d(1, 1), d(1, 2), d(1, 3)]);
        assert_eq!(parsed.samples[1].subscriber_count, 1105.0);
        assert_eq!(parsed.dropped_rows, 0);
    }

    #[test]
    fn drops_unparseable_rows() {
        let table = SubscriberTable::from_rows(
            &["when", "subs"],
            &[&["2024-01-01", "100"], &["not a date", "5"], &["2024-01-02", "n/a"], &["2024-01-03", ""]],
        );
        let parsed = parse_subscriber_series(&table).unwrap();
        assert_eq!(parsed.samples.len(), 1);
        assert_eq!(parsed.dropped_rows, 3);
    }

    #[test]
    fn short_rows_are_dropped_not_panicking() {
        let table = SubscriberTable::from_rows(&["Date", "Subscribers"], &[&["2024-01-01"], &["2024-01-02", "7"]]);
        let parsed = parse_subscriber_series(&table).unwrap();
        assert_eq!(parsed.samples.len(), 1);
        assert_eq!(parsed.dropped_rows, 1);
    }

    #[test]
    fn duplicate_dates_keep_last_row() {
        let table = SubscriberTable::from_rows(
            &["Date", "Subscribers"],
            &[&["2024-01-01", "100"], &["2024-01-01", "150"]],
        );
        let parsed = parse_subscriber_series(&table).unwrap();
        assert_eq!(parsed.samples.len(), 1);
        assert_eq!(parsed.samples[0].subscriber_count, 150.0);
        assert_eq!(parsed.duplicate_dates, 1);
    }

    #[test]
    fn all_rows_unparseable_is_input_format_error() {
        let table = SubscriberTable::from_rows(&["Date", "Subscribers"], &[&["yesterday", "many"]]);
        let err = parse_subscriber_series(&table).unwrap_err();
        assert!(matches!(err, PipelineError::InputFormat(_)));
    }

    #[test]
    fn empty_table_parses_to_empty_series() {
        let table = SubscriberTable::from_rows(&["Date", "Subscribers"], &[]);
        assert!(parse_subscriber_series(&table).unwrap().samples.is_empty());
    }

    #[test]
    fn parse_series_date_layouts() {
        assert_eq!(parse_series_date("2024-01-05"), Some(d(1, 5)));
        assert_eq!(parse_series_date("2024/01/05"), Some(d(1, 5)));
        assert_eq!(parse_series_date("01/05/2024"), Some(d(1, 5)));
        assert_eq!(parse_series_date("Jan 5, 2024"), Some(d(1, 5)));
        assert_eq!(parse_series_date("2024-01-05T23:00:00Z"), Some(d(1, 5)));
        assert_eq!(parse_series_date("2024-01-05 10:00:00"), Some(d(1, 5)));
        assert_eq!(parse_series_date("soon"), None);
    }

    #[test]
    fn parse_count_rejects_non_finite() {
        assert_eq!(parse_count(" 12,345 "), Some(12_345.0));
        assert_eq!(parse_count("12.5"), Some(12.5));
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("inf"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn inspection_reports_ranges() {
        let table = SubscriberTable::from_rows(
            &["Date", "Subscribers"],
            &[&["2024-01-02", "250"], &["2024-01-01", "100"], &["bad", "1"]],
        );
        let report = inspect_subscriber_table(&table).unwrap();
        assert!(report.canonical);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.parsed_rows, 2);
        assert_eq!(report.dropped_rows, 1);
        assert_eq!(report.first_date, Some(d(1, 1)));
        assert_eq!(report.last_date, Some(d(1, 2)));
        assert_eq!(report.min_value, Some(100.0));
        assert_eq!(report.max_value, Some(250.0));
    }
}
