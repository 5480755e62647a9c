//! Hourly resampling
//!
//! Samples are bucketed by local (date, hour) and one representative is
//! chosen per bucket. Exports land on 10-minute marks; a mark with a
//! temperature reading wins over any mark without one.

use std::collections::BTreeMap;

use sitewx_core::{HourKey, HourlySlot, Sample};
use tracing::debug;

/// Minutes eligible to represent an hour, in preference order
pub const MARK_MINUTES: [u32; 6] = [0, 10, 20, 30, 40, 50];

/// Stateless helper that reduces samples to one slot per local hour
pub struct HourlyResampler;

impl HourlyResampler {
    /// One slot per (local date, hour) that has a representative sample,
    /// ascending by date then hour.
    pub fn resample(samples: &[Sample]) -> Vec<HourlySlot> {
        let mut buckets: BTreeMap<HourKey, Vec<&Sample>> = BTreeMap::new();
        for sample in samples {
            buckets.entry(sample.hour_key()).or_default().push(sample);
        }

        let hours = buckets.len();
        let slots: Vec<HourlySlot> = buckets
            .into_iter()
            .filter_map(|(key, group)| {
                select_representative(&group).map(|sample| HourlySlot {
                    date: key.date,
                    hour: key.hour,
                    sample: sample.clone(),
                })
            })
            .collect();

        debug!(
            samples = samples.len(),
            hours,
            slots = slots.len(),
            "resampled hourly"
        );
        slots
    }
}

/// Pick the sample for one hour.
///
/// First pass: earliest mark minute holding a sample with a temperature.
/// Second pass: earliest mark minute holding any sample. Within a minute the
/// first sample in input order wins. `None` when no sample sits on a mark.
pub fn select_representative<'a>(group: &[&'a Sample]) -> Option<&'a Sample> {
    let at_mark = |require_temperature: bool| {
        MARK_MINUTES.iter().find_map(|&minute| {
            group.iter().copied().find(|s| {
                s.minute_of_hour == minute && (!require_temperature || s.temperature.is_some())
            })
        })
    };

    at_mark(true).or_else(|| at_mark(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sitewx_core::Metric;

    fn sample(hour: u32, minute: u32, temp: Option<f64>) -> Sample {
        Sample::new(Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap())
            .with_reading(Metric::Temperature, temp)
    }

    #[test]
    fn test_prefers_temperature_over_earlier_mark() {
        let a = sample(0, 0, None).with_reading(Metric::Humidity, Some(70.0));
        let b = sample(0, 10, Some(12.0));
        let picked = select_representative(&[&a, &b]).unwrap();
        assert_eq!(picked.minute_of_hour, 10);
    }

    #[test]
    fn test_earliest_mark_with_temperature() {
        let a = sample(0, 30, Some(3.0));
        let b = sample(0, 20, Some(2.0));
        let c = sample(0, 0, None);
        let picked = select_representative(&[&a, &b, &c]).unwrap();
        assert_eq!(picked.minute_of_hour, 20);
    }

    #[test]
    fn test_falls_back_to_mark_without_temperature() {
        let a = sample(0, 40, None).with_reading(Metric::Pressure, Some(1000.0));
        let b = sample(0, 15, Some(5.0));
        let c = sample(0, 50, None);
        let picked = select_representative(&[&a, &b, &c]).unwrap();
        assert_eq!(picked.minute_of_hour, 40);
        assert_eq!(picked.pressure, Some(1000.0));
    }

    #[test]
    fn test_off_mark_only_yields_nothing() {
        let a = sample(0, 5, Some(1.0));
        let b = sample(0, 45, Some(2.0));
        assert!(select_representative(&[&a, &b]).is_none());
        assert!(HourlyResampler::resample(&[a, b]).is_empty());
    }

    #[test]
    fn test_first_in_input_order_within_minute() {
        let a = sample(0, 0, Some(1.0));
        let b = sample(0, 0, Some(2.0));
        let picked = select_representative(&[&a, &b]).unwrap();
        assert_eq!(picked.temperature, Some(1.0));
    }

    #[test]
    fn test_resample_groups_by_local_hour() {
        // 15:00 UTC is midnight of the next local day
        let samples = vec![
            sample(16, 10, Some(4.0)),
            sample(15, 0, Some(3.0)),
            sample(14, 50, Some(2.0)),
            sample(15, 10, Some(9.0)),
        ];
        let slots = HourlyResampler::resample(&samples);

        let keys: Vec<(NaiveDate, u32)> = slots.iter().map(|s| (s.date, s.hour)).collect();
        assert_eq!(
            keys,
            vec![
                (NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 23),
                (NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), 0),
                (NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), 1),
            ]
        );
        assert_eq!(slots[1].sample.temperature, Some(3.0));
    }

    #[test]
    fn test_resample_empty() {
        assert!(HourlyResampler::resample(&[]).is_empty());
    }
}
