//! Display units and value formatting for metrics
//!
//! Absent readings always render as `-`, never as zero.

use crate::types::{Metric, Reading};

/// Placeholder shown for an absent reading
pub const ABSENT: &str = "-";

/// Unit group for a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitGroup {
    Temperature,
    Humidity,
    Pressure,
    Rain,
}

impl UnitGroup {
    pub fn of(metric: Metric) -> Self {
        match metric {
            Metric::Temperature => UnitGroup::Temperature,
            Metric::Humidity => UnitGroup::Humidity,
            Metric::Pressure => UnitGroup::Pressure,
            Metric::Rainfall => UnitGroup::Rain,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitGroup::Temperature => "°C",
            UnitGroup::Humidity => "%",
            UnitGroup::Pressure => "hPa",
            UnitGroup::Rain => "mm",
        }
    }

    /// Decimal places shown for this group
    pub fn decimals(self) -> usize {
        match self {
            UnitGroup::Temperature | UnitGroup::Rain => 1,
            UnitGroup::Humidity | UnitGroup::Pressure => 0,
        }
    }
}

/// Fixed-decimal rendering; `-` when absent
pub fn format_value(value: Reading, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => ABSENT.to_string(),
    }
}

/// Rendering with the metric's precision and unit label; `-` when absent
pub fn format_reading(metric: Metric, value: Reading) -> String {
    let group = UnitGroup::of(metric);
    match value {
        Some(_) => format!("{}{}", format_value(value, group.decimals()), group.label()),
        None => ABSENT.to_string(),
    }
}

/// Round to `decimals` places, keeping absence
pub fn round_to(value: Reading, decimals: i32) -> Reading {
    let factor = 10f64.powi(decimals);
    value.map(|v| (v * factor).round() / factor)
}
