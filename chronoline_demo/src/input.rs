// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSV event input.

use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chronoline_layout::{TimePoint, Timestamp};
use thiserror::Error;

/// Formats tried, in order, after RFC 3339. Month-first wins on ambiguous dates.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Errors reading timeline events.
#[derive(Debug, Error)]
pub(crate) enum InputError {
    /// The CSV itself could not be read.
    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    /// No header matches the configured timestamp column.
    #[error("missing timestamp column `{0}`")]
    MissingTimestampColumn(String),

    /// A timestamp cell matches none of the supported formats.
    #[error("line {line}: unparseable timestamp `{value}`")]
    BadTimestamp {
        /// 1-based line in the CSV, counting the header.
        line: u64,
        /// The offending cell.
        value: String,
    },
}

/// How to turn CSV rows into points.
#[derive(Clone, Debug)]
pub(crate) struct InputOptions {
    /// Header naming the timestamp column (case-insensitive).
    pub(crate) timestamp_column: String,
    /// Show the time of day in the `timestamp` attribute when it isn't midnight.
    pub(crate) show_times: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            timestamp_column: "timestamp".to_string(),
            show_times: true,
        }
    }
}

/// Reads events from CSV with a header row, sorted by timestamp.
///
/// Every column becomes an attribute named by its lowercased header; the
/// `timestamp` attribute is replaced with the normalized display form.
pub(crate) fn read_points<R: Read>(
    reader: R,
    options: &InputOptions,
) -> Result<Vec<TimePoint>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let wanted = options.timestamp_column.trim().to_lowercase();
    let ts_index = headers
        .iter()
        .position(|h| *h == wanted)
        .ok_or_else(|| InputError::MissingTimestampColumn(options.timestamp_column.clone()))?;

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let raw = record.get(ts_index).unwrap_or("");
        let parsed = parse_timestamp(raw).ok_or_else(|| InputError::BadTimestamp {
            line,
            value: raw.to_string(),
        })?;

        let mut point = TimePoint::new(Timestamp::from_millis(parsed.and_utc().timestamp_millis()));
        for (name, value) in headers.iter().zip(record.iter()) {
            point.set_attribute(name.as_str(), value);
        }
        point.set_attribute("timestamp", display_timestamp(parsed, options.show_times));
        points.push(point);
    }

    points.sort_by_key(|p| p.timestamp);
    log::info!("read {} event(s)", points.len());
    Ok(points)
}

/// Parses one timestamp cell into wall-clock time.
///
/// RFC 3339 values keep their own offset's local time for display; the
/// instant compares consistently as long as a file sticks to one offset.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn display_timestamp(t: NaiveDateTime, show_times: bool) -> String {
    if show_times && t.time() != NaiveTime::MIN {
        t.format("%Y-%m-%d %H:%M").to_string()
    } else {
        t.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Date , Title,Notes
2024-03-05 14:00,Second,
2024-03-04,First,has notes
";

    fn options(column: &str) -> InputOptions {
        InputOptions {
            timestamp_column: column.to_string(),
            ..InputOptions::default()
        }
    }

    #[test]
    fn rows_become_sorted_points() {
        let points = read_points(CSV.as_bytes(), &options("DATE")).expect("valid csv");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].attribute("title"), Some("First"));
        assert_eq!(points[0].attribute("timestamp"), Some("2024-03-04"));
        assert_eq!(points[0].attribute("notes"), Some("has notes"));
        assert_eq!(points[1].attribute("timestamp"), Some("2024-03-05 14:00"));
        assert!(points[0].timestamp < points[1].timestamp, "sorted by time");
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_points(CSV.as_bytes(), &options("when")).expect_err("no such column");
        assert!(matches!(err, InputError::MissingTimestampColumn(ref c) if c == "when"));
    }

    #[test]
    fn bad_timestamp_reports_its_line() {
        let csv = "timestamp,title\n2024-01-01,ok\nyesterday,bad\n";
        let err = read_points(csv.as_bytes(), &InputOptions::default()).expect_err("bad row");
        match err {
            InputError::BadTimestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn supported_formats() {
        let expect = NaiveDate::from_ymd_opt(2024, 3, 4)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .expect("valid date");
        for raw in [
            "2024-03-04T09:30:00Z",
            "2024-03-04 09:30:00",
            "2024-03-04 09:30",
            "03/04/2024 09:30",
            "03/04/2024 09:30:00",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expect), "{raw}");
        }
        let day_first = parse_timestamp("25/12/2024").expect("day-first fallback");
        assert_eq!(day_first.format("%Y-%m-%d").to_string(), "2024-12-25");
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn times_can_be_hidden() {
        let t = parse_timestamp("2024-03-04 09:30").expect("valid");
        assert_eq!(display_timestamp(t, true), "2024-03-04 09:30");
        assert_eq!(display_timestamp(t, false), "2024-03-04");
    }
}
