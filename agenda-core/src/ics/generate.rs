//! ICS export.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use icalendar::{Calendar, Component, EventLike, Property};

use crate::entry::ScheduleItem;
use crate::manager::ScheduleManager;
use crate::pattern::RecurrencePattern;
use crate::schedule::Schedule;

/// Render every concrete schedule and every pattern as one VCALENDAR.
///
/// Times are floating (no TZID). Patterns become weekly RRULE masters starting
/// on their anchor, so calendar apps expand them on their own.
pub fn generate_ics(manager: &ScheduleManager, stamp: DateTime<Utc>) -> String {
    let mut cal = Calendar::new();
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    for pattern in manager.recurrence_patterns() {
        cal.push(pattern_event(pattern, &dtstamp));
    }

    for schedule in manager.regular_schedules() {
        cal.push(schedule_event(schedule, &dtstamp));
    }

    strip_ics_bloat(&cal.done().to_string())
}

fn schedule_event(schedule: &Schedule, dtstamp: &str) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&uid(schedule.id()));
    ics_event.summary(schedule.label());
    ics_event.add_property("DTSTAMP", dtstamp);

    add_floating(&mut ics_event, "DTSTART", schedule.date(), schedule.time().start());
    add_floating(&mut ics_event, "DTEND", schedule.date(), schedule.time().end());

    if schedule.is_completed() {
        ics_event.add_property("X-AGENDA-COMPLETED", "TRUE");
    }

    if let Some(origin) = schedule.origin_pattern_id() {
        let mut prop = Property::new("RELATED-TO", uid(origin));
        prop.add_parameter("RELTYPE", "PARENT");
        ics_event.append_property(prop);
    }

    ics_event.done()
}

fn pattern_event(pattern: &RecurrencePattern, dtstamp: &str) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&uid(pattern.id()));
    ics_event.summary(pattern.label());
    ics_event.add_property("DTSTAMP", dtstamp);

    add_floating(&mut ics_event, "DTSTART", pattern.anchor(), pattern.time().start());
    add_floating(&mut ics_event, "DTEND", pattern.anchor(), pattern.time().end());

    ics_event.add_property(
        "RRULE",
        format!("FREQ=WEEKLY;BYDAY={}", byday(pattern.weekday())),
    );

    ics_event.done()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with AGENDA
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:AGENDA\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

fn add_floating(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate, time: NaiveTime) {
    let value = date.and_time(time).format("%Y%m%dT%H%M%S").to_string();
    ics_event.add_property(name, value);
}

fn uid(id: &str) -> String {
    format!("{id}@agenda")
}

fn byday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{TimeRange, YearMonth};
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn manager_with_gym() -> (ScheduleManager, String) {
        let mut manager = ScheduleManager::new();
        let time = TimeRange::from_hm(7, 0, 8, 0).unwrap();
        let anchor = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let pattern = RecurrencePattern::new("Gym", Weekday::Mon, time, anchor).unwrap();
        let pattern_id = manager.add(pattern);
        (manager, pattern_id)
    }

    #[test]
    fn test_generate_ics_pattern_has_weekly_rrule() {
        let (manager, pattern_id) = manager_with_gym();

        let ics = generate_ics(&manager, stamp());

        assert!(ics.contains("RRULE:FREQ=WEEKLY;BYDAY=MO"), "ICS:\n{}", ics);
        assert!(ics.contains("DTSTART:20250303T070000"), "ICS:\n{}", ics);
        assert!(ics.contains("DTEND:20250303T080000"), "ICS:\n{}", ics);
        assert!(ics.contains(&format!("UID:{}@agenda", pattern_id)));
    }

    #[test]
    fn test_generate_ics_children_point_at_pattern() {
        let (mut manager, pattern_id) = manager_with_gym();
        let march = YearMonth::new(2025, 3).unwrap();
        assert_eq!(manager.apply_pattern(&pattern_id, march).unwrap(), 5);

        let ics = generate_ics(&manager, stamp());

        let events = ics.matches("BEGIN:VEVENT").count();
        assert_eq!(events, 6, "One master plus five children. ICS:\n{}", ics);

        let related = ics
            .lines()
            .filter(|l| l.starts_with("RELATED-TO"))
            .collect::<Vec<_>>();
        assert_eq!(related.len(), 5);
        for line in related {
            assert!(line.contains(";RELTYPE=PARENT"), "Got: {}", line);
            assert!(line.ends_with(&format!(":{}@agenda", pattern_id)), "Got: {}", line);
        }
    }

    #[test]
    fn test_generate_ics_marks_completed() {
        let mut manager = ScheduleManager::new();
        let done = Schedule::from_parts(2025, 3, 20, 9, 0, 10, 0, "Dentist")
            .unwrap()
            .with_completed(true);
        manager.add(done);
        manager.add(Schedule::from_parts(2025, 3, 21, 9, 0, 10, 0, "Call mom").unwrap());

        let ics = generate_ics(&manager, stamp());

        assert_eq!(ics.matches("X-AGENDA-COMPLETED:TRUE").count(), 1);
        assert!(!ics.contains("RRULE"));
        assert!(!ics.contains("RELATED-TO"));
    }

    #[test]
    fn test_generate_ics_strips_bloat() {
        let (manager, _) = manager_with_gym();

        let ics = generate_ics(&manager, stamp());

        assert!(ics.contains("PRODID:AGENDA\r\n"));
        assert!(!ics.contains("CALSCALE"));
        assert!(ics.contains("DTSTAMP:20250301T120000Z"));
    }

    #[test]
    fn test_generate_ics_empty_manager() {
        let ics = generate_ics(&ScheduleManager::new(), stamp());

        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.trim_end().ends_with("END:VCALENDAR"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }
}
