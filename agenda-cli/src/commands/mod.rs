pub mod config;
pub mod day;
pub mod export;
pub mod month;
pub mod repeat;
pub mod schedule;

use agenda_core::{AgendaConfig, ScheduleEntry, ScheduleItem, ScheduleManager, ScheduleStore};
use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::render::{Render, pluralize};

/// The loaded collection plus the store it came from.
pub struct Session {
    store: ScheduleStore,
    pub manager: ScheduleManager,
}

impl Session {
    /// Load both data files, printing any lines that had to be skipped.
    pub fn open() -> Result<Self> {
        let config = AgendaConfig::load()?;
        let store = ScheduleStore::from_config(&config);
        let (manager, report) = store.load();

        for warning in &report.warnings {
            eprintln!("{}", warning.render());
        }
        if report.orphaned > 0 {
            eprintln!(
                "{}",
                format!(
                    "note: {} {} referred to a repeat that no longer exists and became one-off",
                    report.orphaned,
                    pluralize("schedule", report.orphaned)
                )
                .dimmed()
            );
        }

        Ok(Session { store, manager })
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.manager)?;
        debug!(
            schedules = %self.store.schedules_path().display(),
            patterns = %self.store.patterns_path().display(),
            "session saved"
        );
        Ok(())
    }
}

/// Full id of the concrete schedule whose id starts with `prefix`.
pub fn resolve_schedule(manager: &ScheduleManager, prefix: &str) -> Result<String> {
    let ids = manager.regular_schedules().into_iter().map(|s| s.id());
    resolve(ids, prefix, "schedule")
}

/// Full id of the repeat pattern whose id starts with `prefix`.
pub fn resolve_pattern(manager: &ScheduleManager, prefix: &str) -> Result<String> {
    let ids = manager.recurrence_patterns().into_iter().map(|p| p.id());
    resolve(ids, prefix, "repeat")
}

/// Full id of any entry whose id starts with `prefix`.
pub fn resolve_entry(manager: &ScheduleManager, prefix: &str) -> Result<String> {
    let ids = manager.entries().iter().map(|e| e.id());
    resolve(ids, prefix, "entry")
}

fn resolve<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str, what: &str) -> Result<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        anyhow::bail!("Empty {} id", what);
    }

    let matches: Vec<&str> = ids.filter(|id| id.starts_with(prefix)).collect();

    match matches.as_slice() {
        [] => anyhow::bail!("No {} matches '{}'", what, prefix),
        [id] => Ok(id.to_string()),
        _ => anyhow::bail!(
            "'{}' matches {} {}. Use a longer id.",
            prefix,
            matches.len(),
            pluralize(what, matches.len())
        ),
    }
}

/// Remove entry `id`, asking first when a repeat would take schedules with it.
/// Returns false if the user backed out.
pub fn remove_with_confirmation(
    manager: &mut ScheduleManager,
    id: &str,
    yes: bool,
) -> Result<bool> {
    let children = children_of(manager, id);

    if let Some(ScheduleEntry::Pattern(pattern)) = manager.get(id) {
        if children > 0 && !yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Remove repeat '{}' and its {} {}?",
                    pattern.label(),
                    children,
                    pluralize("schedule", children)
                ))
                .default(false)
                .interact()?;

            if !confirmed {
                return Ok(false);
            }
        }
    }

    let removal = manager.remove(id);
    let Some(entry) = removal.removed else {
        anyhow::bail!("Nothing to remove for '{}'", id);
    };

    println!("{}", format!("  Removed: {}", entry.label()).red());
    if removal.cascaded > 0 {
        println!(
            "  {}",
            format!(
                "(and {} {} made from it)",
                removal.cascaded,
                pluralize("schedule", removal.cascaded)
            )
            .dimmed()
        );
    }

    Ok(true)
}

/// Number of schedules materialized from pattern `id`.
pub fn children_of(manager: &ScheduleManager, id: &str) -> usize {
    manager
        .regular_schedules()
        .iter()
        .filter(|s| s.origin_pattern_id() == Some(id))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_unique_prefix() {
        let ids = ["abc123", "abd456", "xyz789"];
        assert_eq!(resolve(ids.into_iter(), "abc", "schedule").unwrap(), "abc123");
        assert_eq!(resolve(ids.into_iter(), "xyz789", "schedule").unwrap(), "xyz789");
    }

    #[test]
    fn resolve_ambiguous_prefix() {
        let ids = ["abc123", "abd456"];
        let err = resolve(ids.into_iter(), "ab", "schedule").unwrap_err();
        assert!(err.to_string().contains("matches 2 schedules"));

        let err = resolve(ids.into_iter(), "ab", "entry").unwrap_err();
        assert!(err.to_string().contains("matches 2 entries"));
    }

    #[test]
    fn resolve_no_match_or_empty() {
        let ids = ["abc123"];
        assert!(resolve(ids.into_iter(), "zzz", "schedule").is_err());
        assert!(resolve(ids.into_iter(), "  ", "schedule").is_err());
    }
}
