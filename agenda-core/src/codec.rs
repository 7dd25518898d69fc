//! Line formats for the two schedule files.
//!
//! Patterns (`repeat_schedules.txt`), pipe-delimited:
//!
//! ```text
//! label|WEEKDAY|HH:MM|HH:MM|YYYY-MM-DD|id
//! ```
//!
//! The trailing id is optional; lines without it get a fresh identifier.
//!
//! Concrete schedules (`schedules.txt`), comma-delimited:
//!
//! ```text
//! year,month,day,startHour,startMinute,endHour,endMinute,label,completed,originPatternId
//! ```
//!
//! `originPatternId` is empty (or missing, or `null`) for manual schedules.
//! Both decoders read the fixed fields from the ends of the line, so a label
//! containing the delimiter survives a round trip.

use chrono::{Datelike, Timelike};

use crate::entry::ScheduleItem;
use crate::error::RecordError;
use crate::pattern::RecurrencePattern;
use crate::schedule::Schedule;
use crate::time::{TimeRange, format_time, parse_date, parse_time, parse_weekday, weekday_name};

pub const PATTERN_DELIMITER: char = '|';
pub const SCHEDULE_DELIMITER: char = ',';

pub const PATTERN_HEADER: &str = "\
# Recurring schedule patterns
# format: label|weekday|start|end|anchor|id
# ---------------------------------------------------------------";

pub const SCHEDULE_HEADER: &str = "\
# Schedules (including ones placed from recurring patterns)
# format: year,month,day,startHour,startMinute,endHour,endMinute,label,completed,originPatternId
# ---------------------------------------------------------------";

/// Comment and blank lines carry no record.
pub fn is_record(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

pub fn encode_pattern(pattern: &RecurrencePattern) -> String {
    let time = pattern.time();
    format!(
        "{}|{}|{}|{}|{}|{}",
        single_line(pattern.label()),
        weekday_name(pattern.weekday()),
        format_time(time.start()),
        format_time(time.end()),
        pattern.anchor().format("%Y-%m-%d"),
        pattern.id()
    )
}

pub fn decode_pattern(line: &str) -> Result<RecurrencePattern, RecordError> {
    let fields: Vec<&str> = line.split(PATTERN_DELIMITER).collect();
    if fields.len() < 5 {
        return Err(RecordError::FieldCount {
            expected: 5,
            found: fields.len(),
        });
    }

    // A trailing id is present when the last field isn't the anchor date
    let last = fields[fields.len() - 1].trim();
    let (fields, id) = if fields.len() > 5 && parse_date(last).is_none() {
        (&fields[..fields.len() - 1], Some(last))
    } else {
        (&fields[..], None)
    };

    let n = fields.len();
    if n < 5 {
        return Err(RecordError::FieldCount {
            expected: 5,
            found: n,
        });
    }

    let label = fields[..n - 4].join("|");
    let weekday = parse_weekday(fields[n - 4]).ok_or_else(|| field("weekday", fields[n - 4]))?;
    let start = parse_time(fields[n - 3]).ok_or_else(|| field("start time", fields[n - 3]))?;
    let end = parse_time(fields[n - 2]).ok_or_else(|| field("end time", fields[n - 2]))?;
    let anchor = parse_date(fields[n - 1]).ok_or_else(|| field("anchor date", fields[n - 1]))?;

    let pattern = RecurrencePattern::new(&label, weekday, TimeRange::new(start, end)?, anchor)?;

    Ok(match id.filter(|id| !id.is_empty()) {
        Some(id) => pattern.with_id(id),
        None => pattern,
    })
}

pub fn encode_schedule(schedule: &Schedule) -> String {
    let date = schedule.date();
    let time = schedule.time();
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        date.year(),
        date.month(),
        date.day(),
        time.start().hour(),
        time.start().minute(),
        time.end().hour(),
        time.end().minute(),
        single_line(schedule.label()),
        schedule.is_completed(),
        schedule.origin_pattern_id().unwrap_or("")
    )
}

pub fn decode_schedule(line: &str) -> Result<Schedule, RecordError> {
    let fields: Vec<&str> = line.split(SCHEDULE_DELIMITER).collect();
    let n = fields.len();
    if n < 9 {
        return Err(RecordError::FieldCount {
            expected: 9,
            found: n,
        });
    }

    // Without the origin field, the line ends with the completion flag
    let (label_end, origin) = match parse_bool(fields[n - 1]) {
        Some(_) => (n - 1, None),
        None => (n - 2, Some(fields[n - 1].trim())),
    };
    if label_end <= 7 {
        return Err(field("completed", fields[n - 1]));
    }

    let year: i32 = number("year", fields[0])?;
    let month = number("month", fields[1])?;
    let day = number("day", fields[2])?;
    let start_hour = number("start hour", fields[3])?;
    let start_minute = number("start minute", fields[4])?;
    let end_hour = number("end hour", fields[5])?;
    let end_minute = number("end minute", fields[6])?;
    let label = fields[7..label_end].join(",");
    let completed =
        parse_bool(fields[label_end]).ok_or_else(|| field("completed", fields[label_end]))?;

    let origin = origin
        .filter(|o| !o.is_empty() && *o != "null")
        .map(str::to_string);

    let schedule = Schedule::from_parts(
        year,
        month,
        day,
        start_hour,
        start_minute,
        end_hour,
        end_minute,
        &label,
    )?;

    Ok(schedule.with_completed(completed).with_origin(origin))
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, RecordError> {
    value.trim().parse().map_err(|_| field(name, value))
}

fn field(name: &'static str, value: &str) -> RecordError {
    RecordError::Field {
        name,
        value: value.trim().to_string(),
    }
}

fn single_line(label: &str) -> String {
    label.replace(['\r', '\n'], " ")
}
