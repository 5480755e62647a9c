//! Month calendar construction

use std::collections::HashMap;
use std::iter;

use chrono::{Datelike, NaiveDate};
use sitewx_core::{CalendarCell, CalendarGrid, DailyAggregate, WeekStart, YearMonth, DAYS_PER_WEEK};

use crate::monthly::implied_month;

/// Lays daily aggregates onto a week-aligned month grid
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarBuilder {
    week_start: WeekStart,
}

impl CalendarBuilder {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    /// Grid for exactly the days of `period`. Aggregates dated outside the
    /// month are ignored.
    pub fn build(&self, period: YearMonth, days: &[DailyAggregate]) -> CalendarGrid {
        let by_date: HashMap<NaiveDate, &DailyAggregate> =
            days.iter().map(|day| (day.date, day)).collect();

        let leading = period
            .first_day()
            .map(|first| self.week_start.column(first.weekday()))
            .unwrap_or(0);

        let mut cells: Vec<CalendarCell> = iter::repeat(CalendarCell::Pad).take(leading).collect();
        for day in 1..=period.days_in_month() {
            let Some(date) = period.day(day) else {
                continue;
            };
            cells.push(CalendarCell::Day {
                day,
                date,
                aggregate: by_date.get(&date).map(|aggregate| (*aggregate).clone()),
            });
        }

        let trailing = (DAYS_PER_WEEK - cells.len() % DAYS_PER_WEEK) % DAYS_PER_WEEK;
        cells.extend(iter::repeat(CalendarCell::Pad).take(trailing));

        CalendarGrid {
            period,
            week_start: self.week_start,
            weeks: cells.chunks(DAYS_PER_WEEK).map(<[CalendarCell]>::to_vec).collect(),
        }
    }

    /// Grid for the month implied by the first aggregate; `None` without data
    pub fn build_implied(&self, days: &[DailyAggregate]) -> Option<CalendarGrid> {
        implied_month(days).map(|period| self.build(period, days))
    }
}
