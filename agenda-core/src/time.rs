//! Time-of-day ranges, calendar months and weekday helpers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};

use crate::error::{AgendaError, AgendaResult};

/// Start and end of a schedule within a single day, at minute precision.
///
/// `end` is always strictly later than `start`; there is no way to build a
/// range that crosses midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    /// Seconds and sub-second parts are dropped before the ordering check.
    pub fn new(start: NaiveTime, end: NaiveTime) -> AgendaResult<Self> {
        let start = truncate_to_minute(start);
        let end = truncate_to_minute(end);

        if minutes_of_day(end) <= minutes_of_day(start) {
            return Err(AgendaError::InvalidTimeRange {
                start: format_time(start),
                end: format_time(end),
            });
        }

        Ok(TimeRange { start, end })
    }

    pub fn from_hm(
        start_hour: u32,
        start_minute: u32,
        end_hour: u32,
        end_minute: u32,
    ) -> AgendaResult<Self> {
        let start = hm(start_hour, start_minute)?;
        let end = hm(end_hour, end_minute)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Sort key used by every day view.
    pub fn start_minutes(&self) -> u32 {
        minutes_of_day(self.start)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ~ {}", format_time(self.start), format_time(self.end))
    }
}

/// Parses `HH:MM-HH:MM`.
impl FromStr for TimeRange {
    type Err = AgendaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| AgendaError::InvalidTime(format!("'{}'. Expected HH:MM-HH:MM", s)))?;

        let start = parse_time(start)
            .ok_or_else(|| AgendaError::InvalidTime(format!("'{}'. Expected HH:MM", start.trim())))?;
        let end = parse_time(end)
            .ok_or_else(|| AgendaError::InvalidTime(format!("'{}'. Expected HH:MM", end.trim())))?;

        TimeRange::new(start, end)
    }
}

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> AgendaResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(YearMonth)
            .ok_or_else(|| AgendaError::InvalidDate(format!("{:04}-{:02}", year, month)))
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        YearMonth(date - Duration::days(i64::from(date.day0())))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days().last().unwrap_or(self.0)
    }

    /// Every day of the month, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let month = self.0.month();
        self.0.iter_days().take_while(move |d| d.month() == month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Parses `YYYY-MM`.
impl FromStr for YearMonth {
    type Err = AgendaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AgendaError::InvalidDate(format!("'{}'. Expected YYYY-MM", s));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        YearMonth::new(year, month).map_err(|_| invalid())
    }
}

/// Upper-case English weekday name, as written to the pattern file.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// Accepts full or three-letter names in any case ("MONDAY", "mon").
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse::<Weekday>().ok()
}

/// The first date on or after `date` that falls on `weekday`.
pub fn first_weekday_on_or_after(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let offset = (7 + weekday.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_signed(Duration::days(i64::from(offset)))
}

/// Parses `HH:MM`, tolerating a trailing `:SS`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub(crate) fn hm(hour: u32, minute: u32) -> AgendaResult<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| AgendaError::InvalidTime(format!("{:02}:{:02}", hour, minute)))
}

fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}
