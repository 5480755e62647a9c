//! Daily series for the temperature and humidity charts

use chrono::NaiveDate;
use serde::Serialize;
use sitewx_core::{round_to, DailyAggregate, Reading};

/// One day on the chart x-axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,

    /// Axis label, `M/D`
    pub label: String,

    pub max_temp: Reading,
    pub avg_temp: Reading,
    pub min_temp: Reading,
    pub max_humidity: Reading,
    pub avg_humidity: Reading,
    pub min_humidity: Reading,
}

/// One point per daily aggregate. Averages are rounded for display
/// (temperature to 0.1, humidity to 1); absent stays absent.
pub fn chart_series(days: &[DailyAggregate]) -> Vec<ChartPoint> {
    days.iter()
        .map(|day| ChartPoint {
            date: day.date,
            label: day.date.format("%-m/%-d").to_string(),
            max_temp: day.temperature.max,
            avg_temp: round_to(day.temperature.avg, 1),
            min_temp: day.temperature.min,
            max_humidity: day.humidity.max,
            avg_humidity: round_to(day.humidity.avg, 0),
            min_humidity: day.humidity.min,
        })
        .collect()
}
