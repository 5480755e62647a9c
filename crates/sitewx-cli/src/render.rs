//! Plain-text report for the terminal

use std::fmt::Write;

use sitewx_core::{format_reading, Metric, MetricStats};
use sitewx_rollup::Report;

fn stats_line(out: &mut String, metric: Metric, stats: &MetricStats) {
    let _ = writeln!(
        out,
        "{:<12} max {:>9}  min {:>9}  avg {:>9}",
        metric.name(),
        format_reading(metric, stats.max),
        format_reading(metric, stats.min),
        format_reading(metric, stats.avg),
    );
}

/// Monthly summary followed by the compact calendar
pub fn render_text(station: &str, report: &Report) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let period = summary
        .period
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "{} {}", station, period);

    if !report.has_data() {
        let _ = writeln!(out, "no data");
        return out;
    }

    for metric in Metric::AGGREGATED {
        if let Some(stats) = summary.stats(metric) {
            stats_line(&mut out, metric, stats);
        }
    }
    let _ = writeln!(
        out,
        "below 5°C {}/{} h, days with data {}, rows skipped {}",
        summary.below_five_hours,
        summary.total_temp_hours,
        summary.days_with_data,
        report.parse_stats.skipped(),
    );

    if let Some(grid) = &report.calendar {
        let _ = writeln!(out);
        out.push_str(&grid.to_string());
    }
    out
}
