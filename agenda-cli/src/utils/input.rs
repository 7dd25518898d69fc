//! Parsing of dates, months and repeat rules typed on the command line.

use agenda_core::time::{self, TimeRange, YearMonth};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Weekday};

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    let abbrevs = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    let lower = input.to_lowercase();

    lower
        .split_whitespace()
        .map(|word| {
            abbrevs
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| *full)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `YYYY-MM-DD`, "today", or anything fuzzydate understands ("next fri").
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    if input.trim().eq_ignore_ascii_case("today") {
        return Ok(today);
    }

    if let Some(date) = time::parse_date(input) {
        return Ok(date);
    }

    let expanded = expand_abbreviations(input);
    let dt = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow::anyhow!("Could not parse date: \"{}\"", input))?;

    Ok(dt.date())
}

/// `YYYY-MM`, or any date, meaning the month containing it.
pub fn parse_month(input: &str, today: NaiveDate) -> Result<YearMonth> {
    if let Ok(month) = input.parse::<YearMonth>() {
        return Ok(month);
    }

    parse_date(input, today)
        .map(YearMonth::of)
        .with_context(|| format!("Could not parse month: \"{}\" (expected YYYY-MM)", input))
}

/// A repeat rule: `<weekday>@HH:MM-HH:MM`, e.g. `mon@07:00-08:00`.
pub fn parse_rule(input: &str) -> Result<(Weekday, TimeRange)> {
    let (day, range) = input
        .split_once('@')
        .ok_or_else(|| anyhow::anyhow!("Invalid rule \"{}\". Expected e.g. mon@07:00-08:00", input))?;

    let weekday = time::parse_weekday(day)
        .ok_or_else(|| anyhow::anyhow!("Unknown weekday \"{}\"", day.trim()))?;
    let range: TimeRange = range.parse()?;

    Ok((weekday, range))
}
