//! Core data types for station samples and their aggregates

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::rollups::{MetricStats, LOW_TEMPERATURE_THRESHOLD};

/// A single metric reading; `None` when the station reported nothing usable
pub type Reading = Option<f64>;

/// Fixed offset of the station's local time from UTC (no DST in the region)
pub const LOCAL_OFFSET_HOURS: i64 = 9;

/// Hours per local day
pub const HOURS_PER_DAY: u32 = 24;

/// Shift a UTC instant to station-local wall-clock time.
pub fn to_local(timestamp: DateTime<Utc>) -> NaiveDateTime {
    timestamp.naive_utc() + Duration::hours(LOCAL_OFFSET_HOURS)
}

/// Metrics carried by a station sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
    Rainfall,
}

impl Metric {
    /// Metrics with daily and monthly statistics
    pub const AGGREGATED: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::Pressure];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
            Metric::Rainfall => "rainfall",
        }
    }
}

/// One parsed row of a station export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Instant the row was recorded
    pub timestamp_utc: DateTime<Utc>,

    /// Wall-clock time at the station (UTC + 9h)
    pub timestamp_local: NaiveDateTime,

    /// Minute component of the row timestamp (0-59)
    pub minute_of_hour: u32,

    pub temperature: Reading,
    pub humidity: Reading,
    pub pressure: Reading,
    pub rainfall: Reading,
}

impl Sample {
    /// Sample at `timestamp_utc` with every metric absent
    pub fn new(timestamp_utc: DateTime<Utc>) -> Self {
        Self {
            timestamp_utc,
            timestamp_local: to_local(timestamp_utc),
            minute_of_hour: timestamp_utc.minute(),
            temperature: None,
            humidity: None,
            pressure: None,
            rainfall: None,
        }
    }

    pub fn with_reading(mut self, metric: Metric, value: Reading) -> Self {
        match metric {
            Metric::Temperature => self.temperature = value,
            Metric::Humidity => self.humidity = value,
            Metric::Pressure => self.pressure = value,
            Metric::Rainfall => self.rainfall = value,
        }
        self
    }

    pub fn reading(&self, metric: Metric) -> Reading {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::Rainfall => self.rainfall,
        }
    }

    pub fn local_date(&self) -> NaiveDate {
        self.timestamp_local.date()
    }

    pub fn local_hour(&self) -> u32 {
        self.timestamp_local.hour()
    }

    /// Grouping key for hourly resampling
    pub fn hour_key(&self) -> HourKey {
        HourKey {
            date: self.local_date(),
            hour: self.local_hour(),
        }
    }
}

/// (local date, hour of day) pair; orders chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HourKey {
    pub date: NaiveDate,
    pub hour: u32,
}

/// The representative sample chosen for one local hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySlot {
    pub date: NaiveDate,
    pub hour: u32,
    pub sample: Sample,
}

impl HourlySlot {
    pub fn reading(&self, metric: Metric) -> Reading {
        self.sample.reading(metric)
    }
}

/// One row of the 24-hour day detail; `sample` is `None` for hours without a slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyRow<'a> {
    pub hour: u32,
    pub sample: Option<&'a Sample>,
}

/// Statistics for one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,

    /// Chosen hourly samples, ascending by hour
    pub slots: Vec<HourlySlot>,

    pub temperature: MetricStats,
    pub humidity: MetricStats,
    pub pressure: MetricStats,

    /// Hours with a temperature strictly below 5°
    pub below_five_count: usize,

    /// Hours with a temperature reading
    pub total_temp_count: usize,

    /// True iff at least one hour had a temperature reading
    pub has_data: bool,
}

impl DailyAggregate {
    /// Statistics for an aggregated metric; `None` for rainfall
    pub fn stats(&self, metric: Metric) -> Option<&MetricStats> {
        match metric {
            Metric::Temperature => Some(&self.temperature),
            Metric::Humidity => Some(&self.humidity),
            Metric::Pressure => Some(&self.pressure),
            Metric::Rainfall => None,
        }
    }

    /// Present readings of `metric`, in hour order
    pub fn readings(&self, metric: Metric) -> impl Iterator<Item = f64> + '_ {
        self.slots.iter().filter_map(move |slot| slot.reading(metric))
    }

    pub fn slot(&self, hour: u32) -> Option<&HourlySlot> {
        self.slots.iter().find(|slot| slot.hour == hour)
    }

    /// Exactly 24 rows, one per hour of the day
    pub fn hourly_rows(&self) -> Vec<HourlyRow<'_>> {
        (0..HOURS_PER_DAY)
            .map(|hour| HourlyRow {
                hour,
                sample: self.slot(hour).map(|slot| &slot.sample),
            })
            .collect()
    }

    /// Minimum temperature is present and below the low-temperature threshold
    pub fn low_temperature_alert(&self) -> bool {
        self.temperature
            .min
            .map_or(false, |min| min < LOW_TEMPERATURE_THRESHOLD)
    }
}

/// Month-wide statistics over every daily aggregate of one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Month of the first daily aggregate; `None` when there is no data
    pub period: Option<YearMonth>,

    pub temperature: MetricStats,
    pub humidity: MetricStats,
    pub pressure: MetricStats,

    pub below_five_hours: usize,
    pub total_temp_hours: usize,
    pub total_data_points: usize,
    pub days_with_data: usize,
}

impl MonthlySummary {
    pub fn stats(&self, metric: Metric) -> Option<&MetricStats> {
        match metric {
            Metric::Temperature => Some(&self.temperature),
            Metric::Humidity => Some(&self.humidity),
            Metric::Pressure => Some(&self.pressure),
            Metric::Rainfall => None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.days_with_data > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_local_time_is_fixed_offset() {
        // Late March and late October would cross DST in zones that observe it
        for ts in [utc(2024, 3, 31, 0, 30), utc(2024, 10, 27, 0, 30), utc(2024, 7, 1, 12, 0)] {
            let sample = Sample::new(ts);
            assert_eq!(sample.timestamp_local, ts.naive_utc() + Duration::hours(9));
        }
    }

    #[test]
    fn test_local_date_rolls_over() {
        let sample = Sample::new(utc(2024, 5, 31, 15, 10));
        assert_eq!(sample.local_date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(sample.local_hour(), 0);
        assert_eq!(sample.minute_of_hour, 10);
    }

    #[test]
    fn test_reading_accessors() {
        let sample = Sample::new(utc(2024, 5, 1, 0, 0))
            .with_reading(Metric::Temperature, Some(0.0))
            .with_reading(Metric::Rainfall, Some(1.5));
        assert_eq!(sample.reading(Metric::Temperature), Some(0.0));
        assert_eq!(sample.reading(Metric::Humidity), None);
        assert_eq!(sample.reading(Metric::Rainfall), Some(1.5));
    }

    #[test]
    fn test_hourly_rows_cover_full_day() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let slot = HourlySlot {
            date,
            hour: 3,
            sample: Sample::new(utc(2024, 4, 30, 18, 0)),
        };
        let day = DailyAggregate {
            date,
            slots: vec![slot],
            temperature: MetricStats::default(),
            humidity: MetricStats::default(),
            pressure: MetricStats::default(),
            below_five_count: 0,
            total_temp_count: 0,
            has_data: false,
        };

        let rows = day.hourly_rows();
        assert_eq!(rows.len(), 24);
        assert!(rows[3].sample.is_some());
        assert_eq!(rows.iter().filter(|r| r.sample.is_some()).count(), 1);
        assert!(!day.low_temperature_alert());
    }

    #[test]
    fn test_metric_serde_names() {
        let json = serde_json::to_string(&Metric::Temperature).unwrap();
        assert_eq!(json, "\"temperature\"");
    }
}
