//! Raw export text to report, in one synchronous pass

use chrono::NaiveDate;
use serde::Serialize;
use sitewx_core::{CalendarGrid, DailyAggregate, MonthlySummary, WeekStart};
use sitewx_ingest::{ParseStats, ParsedExport, RecordParser};
use tracing::{info, instrument};

use crate::calendar::CalendarBuilder;
use crate::chart::{chart_series, ChartPoint};
use crate::daily::DailyAggregator;
use crate::hourly::HourlyResampler;
use crate::monthly::MonthlySummarizer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub week_start: WeekStart,
}

/// Everything derived from one raw export snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Daily aggregates, ascending by date
    pub daily: Vec<DailyAggregate>,
    pub summary: MonthlySummary,

    /// Grid for the implied month; `None` when the export had no usable rows
    pub calendar: Option<CalendarGrid>,

    pub parse_stats: ParseStats,
}

impl Report {
    pub fn has_data(&self) -> bool {
        !self.daily.is_empty()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyAggregate> {
        self.daily
            .binary_search_by_key(&date, |day| day.date)
            .ok()
            .map(|index| &self.daily[index])
    }

    pub fn chart(&self) -> Vec<ChartPoint> {
        chart_series(&self.daily)
    }
}

/// Parser, resampler, aggregators, and calendar chained over one snapshot.
///
/// Every run recomputes everything from the given text; the same input
/// always yields the same report.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    parser: RecordParser,
    calendar: CalendarBuilder,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            parser: RecordParser::new(),
            calendar: CalendarBuilder::new(options.week_start),
        }
    }

    #[instrument(skip(self, raw), fields(chars = raw.len()))]
    pub fn run(&self, raw: &str) -> Report {
        let ParsedExport { samples, stats } = self.parser.parse(raw);
        let slots = HourlyResampler::resample(&samples);
        let daily = DailyAggregator::aggregate(&slots);
        let summary = MonthlySummarizer::summarize(&daily);
        let calendar = summary
            .period
            .map(|period| self.calendar.build(period, &daily));

        info!(
            rows = stats.rows,
            skipped = stats.skipped(),
            hours = slots.len(),
            days = daily.len(),
            days_with_data = summary.days_with_data,
            "pipeline complete"
        );

        Report {
            daily,
            summary,
            calendar,
            parse_stats: stats,
        }
    }
}

/// Run the pipeline with default options
pub fn build_report(raw: &str) -> Report {
    Pipeline::default().run(raw)
}
