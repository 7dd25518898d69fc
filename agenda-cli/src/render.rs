//! Colored terminal rendering for agenda-core types.

use agenda_core::time::weekday_name;
use agenda_core::{LineWarning, RecurrencePattern, Schedule, ScheduleItem};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Schedule {
    fn render(&self) -> String {
        let check = if self.is_completed() {
            "[x]".green().to_string()
        } else {
            "[ ]".dimmed().to_string()
        };

        let label = if self.is_completed() {
            self.label().strikethrough().dimmed().to_string()
        } else {
            self.label().to_string()
        };

        let repeat = if self.is_derived() { " ↻" } else { "" };

        format!(
            "{} {}  {}{}  {}",
            check,
            self.time().cyan(),
            label,
            repeat.dimmed(),
            short_id(self.id()).dimmed()
        )
    }
}

impl Render for RecurrencePattern {
    fn render(&self) -> String {
        format!(
            "{:<9} {}  {}  {}",
            weekday_name(self.weekday()),
            self.time().cyan(),
            format!("from {}", self.anchor()).dimmed(),
            short_id(self.id()).dimmed()
        )
    }
}

impl Render for LineWarning {
    fn render(&self) -> String {
        format!("{} {}", "warning:".yellow().bold(), self)
    }
}

/// Completion percentage, colored by how far along the day or month is.
/// Nothing done yet stays uncolored.
pub fn render_achievement(percent: u8) -> String {
    let text = format!("{}% done", percent);
    match percent {
        0 => text,
        1..=50 => text.red().to_string(),
        51..=99 => text.yellow().to_string(),
        _ => text.green().bold().to_string(),
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        return word.to_string();
    }
    match word {
        "entry" => "entries".to_string(),
        _ => format!("{}s", word),
    }
}

/// The leading eight characters users type to refer to an entry.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_truncates_uuid() {
        assert_eq!(short_id("3f2a9c1e-0000-4000-8000-000000000000"), "3f2a9c1e");
    }

    #[test]
    fn short_id_keeps_short_ids() {
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn pluralize_counts() {
        assert_eq!(pluralize("schedule", 1), "schedule");
        assert_eq!(pluralize("schedule", 0), "schedules");
        assert_eq!(pluralize("schedule", 5), "schedules");
        assert_eq!(pluralize("entry", 1), "entry");
        assert_eq!(pluralize("entry", 2), "entries");
    }

    #[test]
    fn achievement_color_bands() {
        assert_eq!(render_achievement(0), "0% done");
        assert_eq!(render_achievement(1), "1% done".red().to_string());
        assert_eq!(render_achievement(50), "50% done".red().to_string());
        assert_eq!(render_achievement(51), "51% done".yellow().to_string());
        assert_eq!(render_achievement(99), "99% done".yellow().to_string());
        assert_eq!(render_achievement(100), "100% done".green().bold().to_string());
    }

    #[test]
    fn rendered_schedule_contains_label_and_time() {
        let schedule = Schedule::from_parts(2025, 3, 20, 9, 0, 10, 0, "Dentist").unwrap();
        let rendered = schedule.render();
        assert!(rendered.contains("Dentist"));
        assert!(rendered.contains("09:00 ~ 10:00"));
        assert!(rendered.contains(short_id(schedule.id())));
    }
}
