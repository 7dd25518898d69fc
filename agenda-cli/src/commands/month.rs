use agenda_core::{ScheduleItem, ScheduleManager, YearMonth};
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::Session;
use crate::render::{pluralize, render_achievement};

pub fn run(month: YearMonth) -> Result<()> {
    let session = Session::open()?;
    let manager = &session.manager;

    println!("{}", month.first_day().format("%B %Y").bold());

    let mut any = false;
    for date in month.days() {
        let count = manager.count_on(date);
        if count == 0 {
            continue;
        }
        any = true;

        let achievement = manager
            .daily_achievement(date)
            .map(render_achievement)
            .unwrap_or_default();

        println!(
            "   {}  {:>2} {:<9}  {}",
            date.format("%a %d"),
            count,
            pluralize("schedule", count),
            achievement
        );
    }

    if !any {
        println!("   {}", "Nothing scheduled".dimmed());
    } else {
        println!();
        println!("   Month: {}", render_achievement(manager.monthly_achievement(month)));
    }

    let pending = unapplied(manager, month);
    if !pending.is_empty() {
        println!();
        for (label, count) in pending {
            println!(
                "   {}",
                format!(
                    "'{}' repeats {} more {} this month. Run: agenda repeat apply \"{}\" --month {}",
                    label,
                    count,
                    pluralize("time", count),
                    label,
                    month
                )
                .dimmed()
            );
        }
    }

    Ok(())
}

/// Per pattern label, occurrences in `month` that have not been materialized.
fn unapplied(manager: &ScheduleManager, month: YearMonth) -> Vec<(String, usize)> {
    let mut pending: Vec<(String, usize)> = Vec::new();

    for pattern in manager.recurrence_patterns() {
        let missing = pattern
            .occurrences_in_month(month)
            .filter(|date| {
                !manager
                    .schedules_on(*date)
                    .iter()
                    .any(|s| s.origin_pattern_id() == Some(pattern.id()))
            })
            .count();

        if missing == 0 {
            continue;
        }

        match pending.iter_mut().find(|(label, _)| label == pattern.label()) {
            Some((_, count)) => *count += missing,
            None => pending.push((pattern.label().to_string(), missing)),
        }
    }

    pending
}
