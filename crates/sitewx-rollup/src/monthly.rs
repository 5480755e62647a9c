//! Monthly roll-up of daily aggregates

use sitewx_core::{Accumulator, DailyAggregate, Metric, MonthlySummary, YearMonth};
use tracing::{debug, warn};

/// Month the snapshot is displayed as: the month of the first daily aggregate.
///
/// Only that month is authoritative. Days from other months are still
/// folded into the summary but never appear on the calendar.
pub fn implied_month(days: &[DailyAggregate]) -> Option<YearMonth> {
    days.first().map(|day| YearMonth::of(day.date))
}

/// Stateless helper that folds daily aggregates into one summary
pub struct MonthlySummarizer;

impl MonthlySummarizer {
    /// Value-weighted statistics over every present hourly reading of every
    /// day, plus the day-level counters.
    pub fn summarize(days: &[DailyAggregate]) -> MonthlySummary {
        let period = implied_month(days);
        if let Some(period) = period {
            let foreign = days.iter().filter(|d| !period.contains(d.date)).count();
            if foreign > 0 {
                warn!(
                    %period,
                    foreign_days = foreign,
                    "export spans more than one month; folding into the first month"
                );
            }
        }

        let collect = |metric: Metric| -> Accumulator {
            days.iter().flat_map(|day| day.readings(metric)).collect()
        };
        let temperature = collect(Metric::Temperature);

        let summary = MonthlySummary {
            period,
            humidity: collect(Metric::Humidity).stats(),
            pressure: collect(Metric::Pressure).stats(),
            below_five_hours: days.iter().map(|d| d.below_five_count).sum(),
            total_temp_hours: days.iter().map(|d| d.total_temp_count).sum(),
            total_data_points: temperature.count(),
            days_with_data: days.iter().filter(|d| d.has_data).count(),
            temperature: temperature.stats(),
        };

        debug!(
            days = days.len(),
            days_with_data = summary.days_with_data,
            "summarized month"
        );
        summary
    }
}
