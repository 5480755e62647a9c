//! Null-safe statistics over metric readings

use serde::{Deserialize, Serialize};

use crate::types::Reading;

/// Hourly temperatures strictly below this value count as low-temperature hours
pub const LOW_TEMPERATURE_THRESHOLD: f64 = 5.0;

/// Max/min/avg of the present readings of one metric.
///
/// When no reading was present every statistic is `None` and `count` is 0;
/// an absent reading never contributes a zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub max: Reading,
    pub min: Reading,
    pub avg: Reading,
    pub count: usize,
}

impl MetricStats {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Accumulator for present readings of a single metric
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    observations: Vec<f64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading; absent readings are ignored.
    pub fn add(&mut self, value: Reading) {
        if let Some(v) = value {
            self.observations.push(v);
        }
    }

    pub fn max(&self) -> Reading {
        if self.observations.is_empty() {
            return None;
        }
        Some(
            self.observations
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
        )
    }

    pub fn min(&self) -> Reading {
        if self.observations.is_empty() {
            return None;
        }
        Some(self.observations.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn avg(&self) -> Reading {
        if self.observations.is_empty() {
            return None;
        }
        let sum: f64 = self.observations.iter().sum();
        Some(sum / self.observations.len() as f64)
    }

    /// Number of readings strictly below `threshold`
    pub fn count_below(&self, threshold: f64) -> usize {
        self.observations.iter().filter(|v| **v < threshold).count()
    }

    pub fn count(&self) -> usize {
        self.observations.len()
    }

    pub fn stats(&self) -> MetricStats {
        MetricStats {
            max: self.max(),
            min: self.min(),
            avg: self.avg(),
            count: self.count(),
        }
    }
}

impl FromIterator<f64> for Accumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_min_max_avg() {
        let mut acc = Accumulator::new();
        acc.add(Some(10.0));
        acc.add(Some(5.0));
        acc.add(Some(15.0));
        assert_eq!(acc.min(), Some(5.0));
        assert_eq!(acc.max(), Some(15.0));
        assert_eq!(acc.avg(), Some(10.0));
    }

    #[test]
    fn test_accumulator_skips_absent() {
        let mut acc = Accumulator::new();
        acc.add(Some(2.0));
        acc.add(None);
        acc.add(Some(4.0));
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.avg(), Some(3.0));
    }

    #[test]
    fn test_accumulator_empty() {
        let acc = Accumulator::new();
        assert_eq!(acc.stats(), MetricStats::default());
        assert!(acc.stats().is_empty());
    }

    #[test]
    fn test_only_absent_is_empty() {
        let mut acc = Accumulator::new();
        acc.add(None);
        acc.add(None);
        let stats = acc.stats();
        assert_eq!(stats.max, None);
        assert_eq!(stats.min, None);
        assert_eq!(stats.avg, None);
    }

    #[test]
    fn test_negative_readings() {
        let acc: Accumulator = [-3.5, -0.5, -8.0].into_iter().collect();
        assert_eq!(acc.max(), Some(-0.5));
        assert_eq!(acc.min(), Some(-8.0));
    }

    #[test]
    fn test_count_below_is_strict() {
        let acc: Accumulator = [4.9, 5.0, 5.1, -1.0].into_iter().collect();
        assert_eq!(acc.count_below(LOW_TEMPERATURE_THRESHOLD), 2);
    }
}
