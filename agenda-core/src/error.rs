//! Error types for the agenda engine.

use chrono::{NaiveDate, Weekday};
use thiserror::Error;

/// Errors that can occur in agenda operations.
#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("End time {end} must be later than start time {start}")]
    InvalidTimeRange { start: String, end: String },

    #[error("Schedule label must not be empty")]
    EmptyLabel,

    #[error("Anchor date {anchor} falls on {actual}, expected {expected}")]
    AnchorWeekdayMismatch {
        anchor: NaiveDate,
        expected: Weekday,
        actual: Weekday,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Schedule not found: {0}")]
    ScheduleNotFound(String),

    #[error("Recurrence pattern not found: {0}")]
    PatternNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for agenda operations.
pub type AgendaResult<T> = Result<T, AgendaError>;

/// Why a persisted line could not be turned back into a schedule.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("expected at least {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("unreadable {name} field '{value}'")]
    Field { name: &'static str, value: String },

    #[error(transparent)]
    Invalid(#[from] AgendaError),
}
