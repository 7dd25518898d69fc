//! Weekly repeat commands.

use agenda_core::{
    AgendaResult, RecurrencePattern, ScheduleItem, ScheduleManager, TimeRange, YearMonth,
};
use anyhow::Result;
use chrono::{NaiveDate, Weekday};
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::commands::{Session, children_of, remove_with_confirmation, resolve_pattern};
use crate::render::{Render, pluralize};

/// New repeat anchored on the first matching weekday on or after `from`.
pub fn add(label: &str, weekday: Weekday, time: TimeRange, from: NaiveDate) -> Result<()> {
    let mut session = Session::open()?;

    let pattern = RecurrencePattern::starting_from(label, weekday, time, from)?;
    let rendered = pattern.render();
    session.manager.add(pattern);
    session.save()?;

    println!("{}", format!("  Created repeat: {}", label.trim()).green());
    println!("   {}", rendered);

    Ok(())
}

pub fn list() -> Result<()> {
    let session = Session::open()?;
    let manager = &session.manager;

    let groups = manager.pattern_groups();
    if groups.is_empty() {
        println!("{}", "No repeats".dimmed());
        return Ok(());
    }

    for (i, group) in groups.iter().enumerate() {
        println!("{}", group.label.bold());
        for pattern in &group.patterns {
            let children = children_of(manager, pattern.id());
            println!(
                "   {}  {}",
                pattern.render(),
                format!("{} {}", children, pluralize("schedule", children)).dimmed()
            );
        }
        if i < groups.len() - 1 {
            println!();
        }
    }

    Ok(())
}

/// Materialize a repeat, or every repeat sharing a label, into `month`.
pub fn apply(target: &str, month: YearMonth) -> Result<()> {
    let mut session = Session::open()?;
    let applied = apply_target(&mut session.manager, target, month)?;

    if applied.occurrences == 0 {
        println!(
            "{}",
            format!("  '{}' does not fall on any day of {}", target.trim(), month).dimmed()
        );
        return Ok(());
    }

    if applied.added == 0 {
        println!("{}", format!("  {} is already applied", month).dimmed());
        return Ok(());
    }

    session.save()?;
    println!(
        "{}",
        format!(
            "  Added {} {} in {}",
            applied.added,
            pluralize("schedule", applied.added),
            month
        )
        .green()
    );

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct Applied {
    /// Schedules created by this call
    added: usize,
    /// Days in the month the targeted repeats fall on
    occurrences: usize,
}

fn apply_target(manager: &mut ScheduleManager, target: &str, month: YearMonth) -> Result<Applied> {
    let target = target.trim();

    let group: Option<Vec<String>> = manager
        .pattern_groups()
        .into_iter()
        .find(|g| g.label == target)
        .map(|g| g.patterns.iter().map(|p| p.id().to_string()).collect());

    let (ids, is_group) = match group {
        Some(ids) => (ids, true),
        None => (vec![resolve_pattern(manager, target)?], false),
    };

    let occurrences = ids
        .iter()
        .filter_map(|id| manager.pattern(id))
        .map(|p| p.occurrences_in_month(month).count())
        .sum::<usize>();

    let added = if is_group {
        manager.apply_group(target, month)
    } else {
        manager.apply_pattern(&ids[0], month)?
    };

    Ok(Applied { added, occurrences })
}

/// Replace a repeat. Schedules already made from it are dropped.
pub fn edit(
    id: &str,
    label: Option<String>,
    rule: Option<(Weekday, TimeRange)>,
    from: Option<NaiveDate>,
    yes: bool,
    today: NaiveDate,
) -> Result<()> {
    if label.is_none() && rule.is_none() && from.is_none() {
        anyhow::bail!("Nothing to change. Pass --label, --rule or --from.");
    }

    let mut session = Session::open()?;
    let id = resolve_pattern(&session.manager, id)?;

    let Some(old) = session.manager.pattern(&id) else {
        anyhow::bail!("No repeat matches '{}'", id);
    };

    let replacement = replacement_for(old, label.as_deref(), rule, from.unwrap_or(today))?;

    let children = children_of(&session.manager, &id);
    if children > 0 && !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Editing drops the {} {} made from this repeat. Continue?",
                children,
                pluralize("schedule", children)
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let rendered = replacement.render();
    let removal = session.manager.replace_pattern(&id, replacement)?;
    session.save()?;

    println!("{}", "  Updated repeat:".green());
    println!("   {}", rendered);
    if removal.cascaded > 0 {
        println!(
            "   {}",
            format!(
                "Dropped {} {}. Re-apply with: agenda repeat apply <id> --month YYYY-MM",
                removal.cascaded,
                pluralize("schedule", removal.cascaded)
            )
            .dimmed()
        );
    }

    Ok(())
}

/// The edited repeat, anchored on the first matching weekday on or after `from`.
fn replacement_for(
    old: &RecurrencePattern,
    label: Option<&str>,
    rule: Option<(Weekday, TimeRange)>,
    from: NaiveDate,
) -> AgendaResult<RecurrencePattern> {
    let (weekday, time) = rule.unwrap_or((old.weekday(), old.time()));
    RecurrencePattern::starting_from(label.unwrap_or(old.label()), weekday, time, from)
}

pub fn remove(id: &str, yes: bool) -> Result<()> {
    let mut session = Session::open()?;
    let id = resolve_pattern(&session.manager, id)?;

    if remove_with_confirmation(&mut session.manager, &id, yes)? {
        session.save()?;
    }

    Ok(())
}

/// Remove every repeat labelled `label`, with their schedules.
pub fn remove_group(label: &str, yes: bool) -> Result<()> {
    let mut session = Session::open()?;
    let label = label.trim();

    let group = session
        .manager
        .pattern_groups()
        .into_iter()
        .find(|g| g.label == label)
        .map(|g| {
            let children: usize = g
                .patterns
                .iter()
                .map(|p| children_of(&session.manager, p.id()))
                .sum();
            (g.patterns.len(), children)
        });

    let Some((patterns, children)) = group else {
        anyhow::bail!("No repeat labelled '{}'", label);
    };

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove {} {} labelled '{}' and {} {}?",
                patterns,
                pluralize("repeat", patterns),
                label,
                children,
                pluralize("schedule", children)
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let removal = session.manager.remove_group(label);
    session.save()?;

    println!(
        "{}",
        format!(
            "  Removed {} {} and {} {}",
            removal.patterns,
            pluralize("repeat", removal.patterns),
            removal.cascaded,
            pluralize("schedule", removal.cascaded)
        )
        .red()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn gym() -> RecurrencePattern {
        let time = TimeRange::from_hm(7, 0, 8, 0).unwrap();
        RecurrencePattern::new("Gym", Weekday::Mon, time, date(2025, 3, 3)).unwrap()
    }

    #[test]
    fn apply_target_tells_empty_month_from_applied_month() {
        let mut manager = ScheduleManager::new();
        let id = manager.add(gym());

        // Before the anchor: nothing to place
        let february = YearMonth::new(2025, 2).unwrap();
        assert_eq!(
            apply_target(&mut manager, &id, february).unwrap(),
            Applied { added: 0, occurrences: 0 }
        );

        let march = YearMonth::new(2025, 3).unwrap();
        assert_eq!(
            apply_target(&mut manager, &id[..8], march).unwrap(),
            Applied { added: 5, occurrences: 5 }
        );
        assert_eq!(
            apply_target(&mut manager, &id, march).unwrap(),
            Applied { added: 0, occurrences: 5 }
        );
    }

    #[test]
    fn apply_target_by_label_covers_the_group() {
        let mut manager = ScheduleManager::new();
        let time = TimeRange::from_hm(7, 0, 8, 0).unwrap();
        manager.add(gym());
        manager.add(RecurrencePattern::new("Gym", Weekday::Thu, time, date(2025, 3, 6)).unwrap());

        let march = YearMonth::new(2025, 3).unwrap();
        assert_eq!(
            apply_target(&mut manager, " Gym ", march).unwrap(),
            Applied { added: 9, occurrences: 9 }
        );
        assert!(apply_target(&mut manager, "Piano", march).is_err());
    }

    #[test]
    fn replacement_reanchors_from_given_date() {
        let old = gym();
        // Wednesday
        let today = date(2025, 6, 11);

        let renamed = replacement_for(&old, Some("Morning gym"), None, today).unwrap();
        assert_eq!(renamed.label(), "Morning gym");
        assert_eq!(renamed.weekday(), Weekday::Mon);
        assert_eq!(renamed.time(), old.time());
        assert_eq!(renamed.anchor(), date(2025, 6, 16));
        assert_ne!(renamed.id(), old.id());

        let evening = TimeRange::from_hm(18, 0, 19, 0).unwrap();
        let moved = replacement_for(&old, None, Some((Weekday::Wed, evening)), today).unwrap();
        assert_eq!(moved.label(), "Gym");
        assert_eq!(moved.anchor(), today);
        assert_eq!(moved.time(), evening);
    }
}
