//! Month calendar grid
//!
//! A grid is a list of 7-cell weeks. Cells outside the month are
//! [`CalendarCell::Pad`]; every day of the month gets a [`CalendarCell::Day`],
//! bound to its [`DailyAggregate`] when data was ingested for that date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{DailyAggregate, Metric, Reading};

/// Days per calendar week
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Unknown calendar metric: {0}")]
    UnknownMetric(String),
}

/// Calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CalendarError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.day(1)
    }

    /// Length of the month; 0 for an unrepresentable month
    pub fn days_in_month(&self) -> u32 {
        let Some(first) = self.first_day() else {
            return 0;
        };
        first
            .checked_add_months(Months::new(1))
            .map_or(0, |next| next.signed_duration_since(first).num_days() as u32)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// First column of the calendar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Column index of `weekday` in a week starting on `self`
    pub fn column(self, weekday: Weekday) -> usize {
        match self {
            WeekStart::Sunday => weekday.num_days_from_sunday() as usize,
            WeekStart::Monday => weekday.num_days_from_monday() as usize,
        }
    }

    pub fn labels(self) -> [&'static str; DAYS_PER_WEEK] {
        match self {
            WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        }
    }
}

/// One position in the month grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarCell {
    /// Outside the month; blank and not selectable
    Pad,

    /// A day of the month, with its aggregate when data exists for it
    Day {
        day: u32,
        date: NaiveDate,
        aggregate: Option<DailyAggregate>,
    },
}

impl CalendarCell {
    pub fn is_pad(&self) -> bool {
        matches!(self, CalendarCell::Pad)
    }

    pub fn day(&self) -> Option<u32> {
        match self {
            CalendarCell::Pad => None,
            CalendarCell::Day { day, .. } => Some(*day),
        }
    }

    pub fn aggregate(&self) -> Option<&DailyAggregate> {
        match self {
            CalendarCell::Pad => None,
            CalendarCell::Day { aggregate, .. } => aggregate.as_ref(),
        }
    }

    /// What a cell shows for one metric view; `None` for padding
    pub fn view(&self, metric: CalendarMetric) -> Option<CellView> {
        let CalendarCell::Day { day, aggregate, .. } = self else {
            return None;
        };

        let aggregate = aggregate.as_ref();
        let stats = aggregate.and_then(|a| a.stats(metric.metric()));
        Some(CellView {
            day: *day,
            has_data: aggregate.map_or(false, |a| a.has_data),
            max: stats.and_then(|s| s.max),
            min: stats.and_then(|s| s.min),
            alert: metric == CalendarMetric::Temperature
                && aggregate.map_or(false, DailyAggregate::low_temperature_alert),
        })
    }
}

/// Metric shown in the calendar cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarMetric {
    #[default]
    Temperature,
    Humidity,
    Pressure,
}

impl CalendarMetric {
    pub fn metric(self) -> Metric {
        match self {
            CalendarMetric::Temperature => Metric::Temperature,
            CalendarMetric::Humidity => Metric::Humidity,
            CalendarMetric::Pressure => Metric::Pressure,
        }
    }
}

impl FromStr for CalendarMetric {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temp" | "temperature" => Ok(CalendarMetric::Temperature),
            "humidity" => Ok(CalendarMetric::Humidity),
            "pressure" => Ok(CalendarMetric::Pressure),
            other => Err(CalendarError::UnknownMetric(other.to_string())),
        }
    }
}

/// Cell content for a single calendar metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellView {
    pub day: u32,
    pub has_data: bool,
    pub max: Reading,
    pub min: Reading,
    pub alert: bool,
}

/// Week-major grid covering exactly one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarGrid {
    pub period: YearMonth,
    pub week_start: WeekStart,
    pub weeks: Vec<Vec<CalendarCell>>,
}

impl CalendarGrid {
    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.weeks.iter().flatten()
    }

    /// Cell for a day of the month
    pub fn day(&self, day: u32) -> Option<&CalendarCell> {
        self.cells().find(|cell| cell.day() == Some(day))
    }

    /// Per-week cell views for one metric
    pub fn views(&self, metric: CalendarMetric) -> Vec<Vec<Option<CellView>>> {
        self.weeks
            .iter()
            .map(|week| week.iter().map(|cell| cell.view(metric)).collect())
            .collect()
    }
}

/// Compact text grid: `...` pads, `DD*` days with temperature data,
/// `DD+` days with other readings only, `DD-` days without any data.
impl fmt::Display for CalendarGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.week_start.labels().join(" "))?;
        for week in &self.weeks {
            let tokens: Vec<String> = week
                .iter()
                .map(|cell| match cell {
                    CalendarCell::Pad => "...".to_string(),
                    CalendarCell::Day { day, aggregate, .. } => {
                        let mark = match aggregate {
                            Some(a) if a.has_data => '*',
                            Some(_) => '+',
                            None => '-',
                        };
                        format!("{:02}{}", day, mark)
                    }
                })
                .collect();
            writeln!(f, "{}", tokens.join(" "))?;
        }
        Ok(())
    }
}
