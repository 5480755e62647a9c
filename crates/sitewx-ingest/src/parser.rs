//! Station export row parser
//!
//! The export is semicolon-delimited with a header row. Column roles:
//! 0 = timestamp (`DD/MM/YYYYHH:MM:SS`, UTC), 2 = temperature,
//! 6 = humidity, 10 = pressure, 11 = rainfall. Other columns are ignored.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sitewx_core::{Reading, Sample};
use tracing::{debug, trace};

/// Rows with fewer fields than this are dropped
pub const MIN_FIELDS: usize = 12;

/// Column positions in the station export
pub mod columns {
    pub const TIMESTAMP: usize = 0;
    pub const TEMPERATURE: usize = 2;
    pub const HUMIDITY: usize = 6;
    pub const PRESSURE: usize = 10;
    pub const RAINFALL: usize = 11;
}

/// Why a row produced no sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooFewFields,
    BadTimestamp,
}

/// Row counters for one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Non-empty rows after the header
    pub rows: usize,
    pub parsed: usize,
    pub too_few_fields: usize,
    pub bad_timestamp: usize,
}

impl ParseStats {
    pub fn skipped(&self) -> usize {
        self.too_few_fields + self.bad_timestamp
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::TooFewFields => self.too_few_fields += 1,
            SkipReason::BadTimestamp => self.bad_timestamp += 1,
        }
    }
}

/// Samples parsed from one export, with row counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedExport {
    pub samples: Vec<Sample>,
    pub stats: ParseStats,
}

/// Parser for the station's semicolon-delimited export
#[derive(Debug, Clone)]
pub struct RecordParser {
    timestamp: Regex,
    number: Regex,
}

impl RecordParser {
    pub fn new() -> Self {
        Self {
            timestamp: Regex::new(r"([0-9]{2})/([0-9]{2})/([0-9]{4})([0-9]{2}):([0-9]{2}):([0-9]{2})")
                .expect("regex is valid"),
            number: Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
                .expect("regex is valid"),
        }
    }

    /// Parse a whole export. The first line is always treated as the header.
    pub fn parse(&self, text: &str) -> ParsedExport {
        let cleaned = text.replace('\0', "");
        let mut export = ParsedExport::default();

        for (index, line) in cleaned.trim().split('\n').enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            export.stats.rows += 1;

            match self.parse_row(line) {
                Ok(sample) => export.samples.push(sample),
                Err(reason) => {
                    trace!(line = index + 1, ?reason, "skipping row");
                    export.stats.record_skip(reason);
                }
            }
        }

        export.stats.parsed = export.samples.len();
        debug!(
            rows = export.stats.rows,
            parsed = export.stats.parsed,
            skipped = export.stats.skipped(),
            "parsed station export"
        );
        export
    }

    /// Parse a single data row
    pub fn parse_row(&self, line: &str) -> Result<Sample, SkipReason> {
        let fields: Vec<String> = line.split(';').map(|f| f.replace('\0', "")).collect();
        if fields.len() < MIN_FIELDS {
            return Err(SkipReason::TooFewFields);
        }

        let (timestamp, minute) = self.parse_timestamp(&fields[columns::TIMESTAMP])?;
        let sample = Sample {
            minute_of_hour: minute,
            temperature: self.parse_number(&fields[columns::TEMPERATURE]),
            humidity: self.parse_number(&fields[columns::HUMIDITY]),
            pressure: self.parse_number(&fields[columns::PRESSURE]),
            rainfall: self.parse_number(&fields[columns::RAINFALL]),
            ..Sample::new(timestamp)
        };
        Ok(sample)
    }

    /// `DD/MM/YYYYHH:MM:SS` as a UTC instant plus the minute as written,
    /// after removing all whitespace.
    ///
    /// Out-of-range parts carry into the next unit instead of failing:
    /// `31/02/2024` is 2 March, hour `24` is midnight of the next day and
    /// day `00` is the last day of the previous month.
    pub fn parse_timestamp(&self, field: &str) -> Result<(DateTime<Utc>, u32), SkipReason> {
        let compact: String = field.chars().filter(|c| !c.is_whitespace()).collect();
        let caps = self
            .timestamp
            .captures(&compact)
            .ok_or(SkipReason::BadTimestamp)?;

        let component = |i: usize| -> Result<u32, SkipReason> {
            caps[i].parse().map_err(|_| SkipReason::BadTimestamp)
        };
        let (day, month, year) = (component(1)?, component(2)?, component(3)?);
        let (hour, minute, second) = (component(4)?, component(5)?, component(6)?);

        let naive = rolled_datetime(year, month, day, hour, minute, second)
            .ok_or(SkipReason::BadTimestamp)?;
        Ok((DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc), minute))
    }

    /// Leading decimal number after removing commas and whitespace; absent when
    /// the field is empty or not numeric
    pub fn parse_number(&self, field: &str) -> Reading {
        let cleaned: String = field
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return None;
        }

        self.number
            .find(&cleaned)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Calendar arithmetic with carry. Years 0-99 mean 1900-1999.
fn rolled_datetime(
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<NaiveDateTime> {
    let year = if year < 100 { year + 1900 } else { year };
    let january = NaiveDate::from_ymd_opt(year as i32, 1, 1)?;
    let first = match month {
        0 => january.checked_sub_months(Months::new(1))?,
        m => january.checked_add_months(Months::new(m - 1))?,
    };

    let offset = Duration::days(i64::from(day) - 1)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute))
        + Duration::seconds(i64::from(second));
    first.and_hms_opt(0, 0, 0)?.checked_add_signed(offset)
}

/// Parse an export with a fresh [`RecordParser`]
pub fn parse_export(text: &str) -> Vec<Sample> {
    RecordParser::new().parse(text).samples
}
