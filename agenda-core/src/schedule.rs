//! Concrete schedules bound to one calendar date.

use std::fmt;

use chrono::NaiveDate;

use crate::entry::{ScheduleItem, ScheduleKind};
use crate::error::{AgendaError, AgendaResult};
use crate::time::TimeRange;

/// A single dated appointment.
///
/// Either entered directly by the user, or materialized from a
/// [`RecurrencePattern`](crate::pattern::RecurrencePattern), in which case
/// `origin_pattern_id` points back at the pattern that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    id: String,
    label: String,
    date: NaiveDate,
    time: TimeRange,
    completed: bool,
    origin_pattern_id: Option<String>,
}

impl Schedule {
    pub fn new(label: &str, date: NaiveDate, time: TimeRange) -> AgendaResult<Self> {
        Ok(Schedule {
            id: new_id(),
            label: normalize_label(label)?,
            date,
            time,
            completed: false,
            origin_pattern_id: None,
        })
    }

    /// Builds a schedule from the raw numeric fields used by the schedule file.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        year: i32,
        month: u32,
        day: u32,
        start_hour: u32,
        start_minute: u32,
        end_hour: u32,
        end_minute: u32,
        label: &str,
    ) -> AgendaResult<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            AgendaError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day))
        })?;
        let time = TimeRange::from_hm(start_hour, start_minute, end_hour, end_minute)?;
        Self::new(label, date, time)
    }

    /// Child of a pattern. The label was validated when the pattern was built.
    pub(crate) fn derived(label: &str, date: NaiveDate, time: TimeRange, origin: &str) -> Self {
        Schedule {
            id: new_id(),
            label: label.to_string(),
            date,
            time,
            completed: false,
            origin_pattern_id: Some(origin.to_string()),
        }
    }

    pub fn with_origin(mut self, origin_pattern_id: Option<String>) -> Self {
        self.origin_pattern_id = origin_pattern_id;
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> TimeRange {
        self.time
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Whether this schedule was materialized from a pattern.
    pub fn is_derived(&self) -> bool {
        self.origin_pattern_id.is_some()
    }

    pub(crate) fn detach_origin(&mut self) {
        self.origin_pattern_id = None;
    }
}

impl ScheduleItem for Schedule {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn origin_pattern_id(&self) -> Option<&str> {
        self.origin_pattern_id.as_deref()
    }

    fn occurrences_on(&self, date: NaiveDate) -> Vec<&Schedule> {
        if self.date == date { vec![self] } else { Vec::new() }
    }

    fn kind(&self) -> ScheduleKind {
        ScheduleKind::Regular
    }
}

/// `07:00 ~ 08:00  Gym`
impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}  {}", self.time, self.label)
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn normalize_label(label: &str) -> AgendaResult<String> {
    let label = label.trim();
    if label.is_empty() {
        return Err(AgendaError::EmptyLabel);
    }
    Ok(label.to_string())
}
