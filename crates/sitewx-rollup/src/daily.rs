//! Daily aggregation of hourly slots

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sitewx_core::{Accumulator, DailyAggregate, HourlySlot, Metric, LOW_TEMPERATURE_THRESHOLD};
use tracing::debug;

/// Stateless helper that groups hourly slots by local calendar day
pub struct DailyAggregator;

impl DailyAggregator {
    /// One aggregate per date with at least one slot, ascending by date.
    pub fn aggregate(slots: &[HourlySlot]) -> Vec<DailyAggregate> {
        // BTreeMap keeps dates in calendar order
        let mut days: BTreeMap<NaiveDate, Vec<HourlySlot>> = BTreeMap::new();
        for slot in slots {
            days.entry(slot.date).or_default().push(slot.clone());
        }

        let daily: Vec<DailyAggregate> = days
            .into_iter()
            .map(|(date, slots)| build_daily(date, slots))
            .collect();

        debug!(
            days = daily.len(),
            with_data = daily.iter().filter(|d| d.has_data).count(),
            "aggregated daily"
        );
        daily
    }
}

/// Statistics for one date's slots
pub fn build_daily(date: NaiveDate, mut slots: Vec<HourlySlot>) -> DailyAggregate {
    slots.sort_by_key(|slot| slot.hour);

    let accumulate = |metric: Metric| -> Accumulator {
        let mut acc = Accumulator::new();
        for slot in &slots {
            acc.add(slot.reading(metric));
        }
        acc
    };
    let temperature = accumulate(Metric::Temperature);
    let humidity = accumulate(Metric::Humidity);
    let pressure = accumulate(Metric::Pressure);

    DailyAggregate {
        date,
        below_five_count: temperature.count_below(LOW_TEMPERATURE_THRESHOLD),
        total_temp_count: temperature.count(),
        has_data: temperature.count() > 0,
        temperature: temperature.stats(),
        humidity: humidity.stats(),
        pressure: pressure.stats(),
        slots,
    }
}
