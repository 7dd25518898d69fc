//! Weekly recurrence patterns and their expansion into concrete schedules.
//!
//! A pattern never shows up on a calendar day by itself. It is a template:
//! callers pick dates from [`RecurrencePattern::occurrences_in_month`] and
//! [`materialize`](RecurrencePattern::materialize) them into [`Schedule`]s that
//! remember which pattern produced them.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::entry::{ScheduleItem, ScheduleKind};
use crate::error::{AgendaError, AgendaResult};
use crate::schedule::{Schedule, new_id, normalize_label};
use crate::time::{TimeRange, YearMonth, first_weekday_on_or_after};

/// "Every `weekday`, from `anchor` on, at `time`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePattern {
    id: String,
    label: String,
    weekday: Weekday,
    time: TimeRange,
    anchor: NaiveDate,
}

impl RecurrencePattern {
    /// `anchor` must fall on `weekday`.
    pub fn new(
        label: &str,
        weekday: Weekday,
        time: TimeRange,
        anchor: NaiveDate,
    ) -> AgendaResult<Self> {
        let label = normalize_label(label)?;

        if anchor.weekday() != weekday {
            return Err(AgendaError::AnchorWeekdayMismatch {
                anchor,
                expected: weekday,
                actual: anchor.weekday(),
            });
        }

        Ok(RecurrencePattern {
            id: new_id(),
            label,
            weekday,
            time,
            anchor,
        })
    }

    /// Anchors the pattern on the first `weekday` on or after `today`.
    pub fn starting_from(
        label: &str,
        weekday: Weekday,
        time: TimeRange,
        today: NaiveDate,
    ) -> AgendaResult<Self> {
        let anchor = first_weekday_on_or_after(today, weekday)
            .ok_or_else(|| AgendaError::InvalidDate(format!("no {} after {}", weekday, today)))?;
        Self::new(label, weekday, time, anchor)
    }

    /// Restores an identifier read back from disk.
    pub(crate) fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn time(&self) -> TimeRange {
        self.time
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Dates in `month` on which this pattern recurs, ascending.
    ///
    /// Starts from the first matching weekday of the month, skips whole weeks
    /// until the anchor is reached, then steps a week at a time up to the
    /// month's last day. Every call computes a fresh sequence.
    pub fn occurrences_in_month(&self, month: YearMonth) -> MonthOccurrences {
        let first = first_weekday_on_or_after(month.first_day(), self.weekday)
            .map(|first| self.skip_to_anchor(first));

        MonthOccurrences {
            next: first,
            last: month.last_day(),
        }
    }

    /// The materialized schedule for `date`, if the pattern recurs that day.
    pub fn occurrence_on(&self, date: NaiveDate) -> Option<Schedule> {
        self.recurs_on(date).then(|| self.materialize(date))
    }

    /// True when `date` is the anchor or a whole number of weeks after it.
    pub fn recurs_on(&self, date: NaiveDate) -> bool {
        if date.weekday() != self.weekday {
            return false;
        }
        let days = date.signed_duration_since(self.anchor).num_days();
        days >= 0 && days % 7 == 0
    }

    /// A new concrete schedule on `date` carrying this pattern's id as origin.
    pub fn materialize(&self, date: NaiveDate) -> Schedule {
        Schedule::derived(&self.label, date, self.time, &self.id)
    }

    fn skip_to_anchor(&self, date: NaiveDate) -> NaiveDate {
        if date >= self.anchor {
            return date;
        }
        let gap = self.anchor.signed_duration_since(date).num_days();
        let weeks = (gap + 6) / 7;
        date.checked_add_signed(Duration::weeks(weeks))
            .unwrap_or(self.anchor)
    }
}

impl ScheduleItem for RecurrencePattern {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn origin_pattern_id(&self) -> Option<&str> {
        None
    }

    /// Patterns are templates, not agenda items.
    fn occurrences_on(&self, _date: NaiveDate) -> Vec<&Schedule> {
        Vec::new()
    }

    fn kind(&self) -> ScheduleKind {
        ScheduleKind::Repeat
    }
}

/// Iterator over the dates a pattern recurs on within one month.
#[derive(Debug, Clone)]
pub struct MonthOccurrences {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Iterator for MonthOccurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|date| *date <= self.last)?;
        self.next = current.checked_add_signed(Duration::weeks(1));
        Some(current)
    }
}
