//! The two kinds of schedule the manager stores side by side.

use chrono::NaiveDate;

use crate::pattern::RecurrencePattern;
use crate::schedule::Schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    /// A concrete, dated schedule
    Regular,
    /// A weekly recurrence pattern
    Repeat,
}

/// Capabilities shared by concrete schedules and recurrence patterns.
pub trait ScheduleItem {
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    /// Identifier of the pattern this item was materialized from.
    fn origin_pattern_id(&self) -> Option<&str>;

    /// Concrete schedules this item contributes to the agenda of `date`.
    fn occurrences_on(&self, date: NaiveDate) -> Vec<&Schedule>;

    fn kind(&self) -> ScheduleKind;
}

/// One member of the schedule collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleEntry {
    Concrete(Schedule),
    Pattern(RecurrencePattern),
}

impl ScheduleEntry {
    pub fn as_schedule(&self) -> Option<&Schedule> {
        match self {
            ScheduleEntry::Concrete(schedule) => Some(schedule),
            ScheduleEntry::Pattern(_) => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&RecurrencePattern> {
        match self {
            ScheduleEntry::Concrete(_) => None,
            ScheduleEntry::Pattern(pattern) => Some(pattern),
        }
    }

    fn item(&self) -> &dyn ScheduleItem {
        match self {
            ScheduleEntry::Concrete(schedule) => schedule,
            ScheduleEntry::Pattern(pattern) => pattern,
        }
    }
}

impl ScheduleItem for ScheduleEntry {
    fn id(&self) -> &str {
        self.item().id()
    }

    fn label(&self) -> &str {
        self.item().label()
    }

    fn origin_pattern_id(&self) -> Option<&str> {
        self.item().origin_pattern_id()
    }

    fn occurrences_on(&self, date: NaiveDate) -> Vec<&Schedule> {
        self.item().occurrences_on(date)
    }

    fn kind(&self) -> ScheduleKind {
        self.item().kind()
    }
}

impl From<Schedule> for ScheduleEntry {
    fn from(schedule: Schedule) -> Self {
        ScheduleEntry::Concrete(schedule)
    }
}

impl From<RecurrencePattern> for ScheduleEntry {
    fn from(pattern: RecurrencePattern) -> Self {
        ScheduleEntry::Pattern(pattern)
    }
}
