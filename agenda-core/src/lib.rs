//! Core engine for the agenda planner.
//!
//! This crate holds everything except the terminal front end:
//! - `Schedule` and `RecurrencePattern`, the two kinds of entry
//! - `ScheduleManager`, the in-memory collection that owns them
//! - `ScheduleStore`, which loads and saves the two plain-text data files
//! - `AgendaConfig` and ICS export

pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod ics;
pub mod manager;
pub mod pattern;
pub mod schedule;
pub mod store;
pub mod time;

pub use config::AgendaConfig;
pub use entry::{ScheduleEntry, ScheduleItem, ScheduleKind};
pub use error::{AgendaError, AgendaResult, RecordError};
pub use manager::{GroupRemoval, PatternGroup, Removal, ScheduleManager};
pub use pattern::{MonthOccurrences, RecurrencePattern};
pub use schedule::Schedule;
pub use store::{LineWarning, LoadReport, SaveReport, ScheduleStore};
pub use time::{TimeRange, YearMonth};
