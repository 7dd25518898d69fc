//! The in-memory schedule collection.
//!
//! `ScheduleManager` owns every concrete schedule and recurrence pattern.
//! Callers hold identifiers, never references they can mutate, and route every
//! change through the manager. The one invariant it guards: no schedule keeps
//! an `origin_pattern_id` for a pattern that is no longer in the collection.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::entry::{ScheduleEntry, ScheduleItem};
use crate::error::{AgendaError, AgendaResult};
use crate::pattern::RecurrencePattern;
use crate::schedule::Schedule;
use crate::time::YearMonth;

#[derive(Debug, Clone, Default)]
pub struct ScheduleManager {
    entries: Vec<ScheduleEntry>,
}

/// What a call to [`ScheduleManager::remove`] took out of the collection.
#[derive(Debug, Default)]
pub struct Removal {
    /// The entry that was asked for, if it was present
    pub removed: Option<ScheduleEntry>,
    /// Schedules removed because their origin pattern went away
    pub cascaded: usize,
}

impl Removal {
    pub fn is_empty(&self) -> bool {
        self.removed.is_none()
    }
}

/// Totals for [`ScheduleManager::remove_group`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GroupRemoval {
    pub patterns: usize,
    pub cascaded: usize,
}

/// Patterns sharing one label.
#[derive(Debug)]
pub struct PatternGroup<'a> {
    pub label: &'a str,
    pub patterns: Vec<&'a RecurrencePattern>,
}

impl ScheduleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns its identifier.
    /// Identifiers are not checked for duplicates.
    pub fn add(&mut self, entry: impl Into<ScheduleEntry>) -> String {
        let entry = entry.into();
        let id = entry.id().to_string();
        self.entries.push(entry);
        id
    }

    /// Removes the entry with `id`.
    ///
    /// Removing a pattern also removes every schedule materialized from it.
    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Removal {
        let Some(index) = self.entries.iter().position(|e| e.id() == id) else {
            return Removal::default();
        };

        let removed = self.entries.remove(index);

        let cascaded = match &removed {
            ScheduleEntry::Pattern(pattern) => {
                let before = self.entries.len();
                self.entries
                    .retain(|e| e.origin_pattern_id() != Some(pattern.id()));
                before - self.entries.len()
            }
            ScheduleEntry::Concrete(_) => 0,
        };

        debug!(id, cascaded, "removed schedule entry");

        Removal {
            removed: Some(removed),
            cascaded,
        }
    }

    /// The agenda for `date`, ordered by start time.
    /// Schedules starting at the same minute keep their insertion order.
    pub fn schedules_on(&self, date: NaiveDate) -> Vec<&Schedule> {
        let mut day: Vec<&Schedule> = self
            .entries
            .iter()
            .flat_map(|e| e.occurrences_on(date))
            .collect();
        day.sort_by_key(|s| s.time().start_minutes());
        day
    }

    pub fn regular_schedules(&self) -> Vec<&Schedule> {
        self.entries.iter().filter_map(ScheduleEntry::as_schedule).collect()
    }

    pub fn recurrence_patterns(&self) -> Vec<&RecurrencePattern> {
        self.entries.iter().filter_map(ScheduleEntry::as_pattern).collect()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn schedule(&self, id: &str) -> Option<&Schedule> {
        self.get(id).and_then(ScheduleEntry::as_schedule)
    }

    pub fn pattern(&self, id: &str) -> Option<&RecurrencePattern> {
        self.get(id).and_then(ScheduleEntry::as_pattern)
    }

    pub fn set_completed(&mut self, id: &str, completed: bool) -> AgendaResult<()> {
        let schedule = self
            .entries
            .iter_mut()
            .find_map(|e| match e {
                ScheduleEntry::Concrete(s) if s.id() == id => Some(s),
                _ => None,
            })
            .ok_or_else(|| AgendaError::ScheduleNotFound(id.to_string()))?;

        schedule.set_completed(completed);
        Ok(())
    }

    /// Edits a concrete schedule by removing it and appending `replacement`.
    /// Returns the replacement's identifier.
    pub fn replace_schedule(&mut self, id: &str, replacement: Schedule) -> AgendaResult<String> {
        if self.schedule(id).is_none() {
            return Err(AgendaError::ScheduleNotFound(id.to_string()));
        }
        self.remove(id);
        Ok(self.add(replacement))
    }

    /// Edits a pattern by removing it (with its materialized schedules) and
    /// appending `replacement`.
    ///
    /// The old children are not carried over to the replacement; callers
    /// re-apply the new pattern to the months they need.
    pub fn replace_pattern(
        &mut self,
        id: &str,
        replacement: RecurrencePattern,
    ) -> AgendaResult<Removal> {
        if self.pattern(id).is_none() {
            return Err(AgendaError::PatternNotFound(id.to_string()));
        }
        let removal = self.remove(id);
        self.add(replacement);
        Ok(removal)
    }

    /// Materializes pattern `id` into every matching day of `month`.
    ///
    /// Days that already hold a schedule from this pattern are skipped, so
    /// applying the same month twice adds nothing. Returns how many schedules
    /// were added.
    pub fn apply_pattern(&mut self, id: &str, month: YearMonth) -> AgendaResult<usize> {
        let pattern = self
            .pattern(id)
            .ok_or_else(|| AgendaError::PatternNotFound(id.to_string()))?;

        let existing: HashSet<NaiveDate> = self
            .regular_schedules()
            .into_iter()
            .filter(|s| s.origin_pattern_id() == Some(id))
            .map(Schedule::date)
            .collect();

        let children: Vec<Schedule> = pattern
            .occurrences_in_month(month)
            .filter(|date| !existing.contains(date))
            .map(|date| pattern.materialize(date))
            .collect();

        let added = children.len();
        self.entries
            .extend(children.into_iter().map(ScheduleEntry::Concrete));

        debug!(id, %month, added, "applied pattern");
        Ok(added)
    }

    /// [`apply_pattern`](Self::apply_pattern) for every pattern labelled `label`.
    pub fn apply_group(&mut self, label: &str, month: YearMonth) -> usize {
        let ids = self.pattern_ids_labelled(label);
        ids.iter()
            .map(|id| self.apply_pattern(id, month).unwrap_or(0))
            .sum()
    }

    /// Patterns grouped by label, in order of first appearance.
    pub fn pattern_groups(&self) -> Vec<PatternGroup<'_>> {
        let mut groups: Vec<PatternGroup<'_>> = Vec::new();

        for pattern in self.recurrence_patterns() {
            match groups.iter_mut().find(|g| g.label == pattern.label()) {
                Some(group) => group.patterns.push(pattern),
                None => groups.push(PatternGroup {
                    label: pattern.label(),
                    patterns: vec![pattern],
                }),
            }
        }

        groups
    }

    /// Removes every pattern labelled `label` along with their schedules.
    pub fn remove_group(&mut self, label: &str) -> GroupRemoval {
        let mut totals = GroupRemoval::default();

        for id in self.pattern_ids_labelled(label) {
            let removal = self.remove(&id);
            if !removal.is_empty() {
                totals.patterns += 1;
                totals.cascaded += removal.cascaded;
            }
        }

        totals
    }

    pub fn count_on(&self, date: NaiveDate) -> usize {
        self.schedules_on(date).len()
    }

    /// Percentage of completed schedules on `date`, `None` for an empty day.
    pub fn daily_achievement(&self, date: NaiveDate) -> Option<u8> {
        let day = self.schedules_on(date);
        completion_rate(day.len(), day.iter().filter(|s| s.is_completed()).count())
    }

    /// Percentage of completed schedules over the whole month, 0 when empty.
    pub fn monthly_achievement(&self, month: YearMonth) -> u8 {
        let in_month: Vec<&Schedule> = self
            .regular_schedules()
            .into_iter()
            .filter(|s| month.contains(s.date()))
            .collect();

        let completed = in_month.iter().filter(|s| s.is_completed()).count();
        completion_rate(in_month.len(), completed).unwrap_or(0)
    }

    /// Clears lineage pointers that name no pattern in the collection.
    /// Returns the ids of the schedules that were detached.
    pub(crate) fn detach_orphans(&mut self) -> Vec<String> {
        let known: HashSet<String> = self
            .recurrence_patterns()
            .into_iter()
            .map(|p| p.id().to_string())
            .collect();

        let mut detached = Vec::new();
        for entry in &mut self.entries {
            if let ScheduleEntry::Concrete(schedule) = entry {
                let dangling = schedule
                    .origin_pattern_id()
                    .is_some_and(|origin| !known.contains(origin));
                if dangling {
                    schedule.detach_origin();
                    detached.push(schedule.id().to_string());
                }
            }
        }

        detached
    }

    fn pattern_ids_labelled(&self, label: &str) -> Vec<String> {
        self.recurrence_patterns()
            .into_iter()
            .filter(|p| p.label() == label)
            .map(|p| p.id().to_string())
            .collect()
    }
}

/// Rounded half up, like a progress bar would show it.
fn completion_rate(total: usize, completed: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percent = (completed * 200 + total) / (total * 2);
    Some(percent.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeRange;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(label: &str, day: NaiveDate, start: u32, end: u32) -> Schedule {
        Schedule::new(label, day, TimeRange::from_hm(start, 0, end, 0).unwrap()).unwrap()
    }

    fn gym() -> RecurrencePattern {
        let time = TimeRange::from_hm(7, 0, 8, 0).unwrap();
        RecurrencePattern::new("Gym", Weekday::Mon, time, date(2025, 3, 3)).unwrap()
    }

    fn march() -> YearMonth {
        YearMonth::new(2025, 3).unwrap()
    }

    #[test]
    fn test_remove_pattern_cascades_to_children_only() {
        let mut manager = ScheduleManager::new();
        let pattern = gym();
        let c1 = pattern.materialize(date(2025, 3, 3));
        let c2 = pattern.materialize(date(2025, 3, 10));
        let s = schedule("Dentist", date(2025, 3, 3), 9, 10);
        let s_id = s.id().to_string();

        let pattern_id = manager.add(pattern);
        manager.add(c1);
        manager.add(c2);
        manager.add(s);

        let removal = manager.remove(&pattern_id);
        assert!(matches!(removal.removed, Some(ScheduleEntry::Pattern(_))));
        assert_eq!(removal.cascaded, 2);

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.entries()[0].id(), s_id);
    }

    #[test]
    fn test_remove_concrete_schedule_does_not_cascade() {
        let mut manager = ScheduleManager::new();
        let pattern = gym();
        let child = pattern.materialize(date(2025, 3, 3));
        let child_id = child.id().to_string();
        manager.add(pattern);
        manager.add(child);
        manager.add(schedule("Dentist", date(2025, 3, 3), 9, 10));

        let removal = manager.remove(&child_id);
        assert_eq!(removal.cascaded, 0);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.recurrence_patterns().len(), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut manager = ScheduleManager::new();
        manager.add(schedule("Dentist", date(2025, 3, 3), 9, 10));

        let removal = manager.remove("does-not-exist");
        assert!(removal.is_empty());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_schedules_on_sorted_and_stable() {
        let mut manager = ScheduleManager::new();
        let day = date(2025, 3, 3);

        manager.add(schedule("Lunch", day, 12, 13));
        manager.add(schedule("First at nine", day, 9, 10));
        manager.add(gym());
        manager.add(schedule("Second at nine", day, 9, 11));
        manager.add(schedule("Other day", date(2025, 3, 4), 8, 9));

        let labels: Vec<&str> = manager.schedules_on(day).iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["First at nine", "Second at nine", "Lunch"]);
    }

    #[test]
    fn test_schedules_on_never_lists_patterns() {
        let mut manager = ScheduleManager::new();
        manager.add(gym());

        // The pattern recurs on 2025-03-03 but is not materialized there
        assert!(manager.schedules_on(date(2025, 3, 3)).is_empty());
        assert_eq!(manager.count_on(date(2025, 3, 3)), 0);
    }

    #[test]
    fn test_type_filtered_views_keep_insertion_order() {
        let mut manager = ScheduleManager::new();
        manager.add(schedule("A", date(2025, 3, 3), 9, 10));
        manager.add(gym());
        manager.add(schedule("B", date(2025, 3, 1), 9, 10));

        let regular: Vec<&str> = manager.regular_schedules().iter().map(|s| s.label()).collect();
        assert_eq!(regular, vec!["A", "B"]);
        assert_eq!(manager.recurrence_patterns().len(), 1);
    }

    #[test]
    fn test_set_completed_by_id() {
        let mut manager = ScheduleManager::new();
        let id = manager.add(schedule("Dentist", date(2025, 3, 3), 9, 10));
        let pattern_id = manager.add(gym());

        manager.set_completed(&id, true).unwrap();
        assert!(manager.schedule(&id).unwrap().is_completed());

        assert!(matches!(
            manager.set_completed(&pattern_id, true),
            Err(AgendaError::ScheduleNotFound(_))
        ));
        assert!(manager.set_completed("missing", true).is_err());
    }

    #[test]
    fn test_replace_schedule() {
        let mut manager = ScheduleManager::new();
        let old_id = manager.add(schedule("Dentist", date(2025, 3, 3), 9, 10));
        manager.add(schedule("Lunch", date(2025, 3, 3), 12, 13));

        let new_id = manager
            .replace_schedule(&old_id, schedule("Dentist", date(2025, 3, 4), 10, 11))
            .unwrap();

        assert!(manager.get(&old_id).is_none());
        assert_eq!(manager.schedule(&new_id).unwrap().date(), date(2025, 3, 4));
        assert_eq!(manager.len(), 2);

        let missing = manager.replace_schedule("missing", schedule("X", date(2025, 3, 4), 1, 2));
        assert!(matches!(missing, Err(AgendaError::ScheduleNotFound(_))));
    }

    #[test]
    fn test_replace_pattern_drops_old_children() {
        let mut manager = ScheduleManager::new();
        let old_id = manager.add(gym());
        manager.apply_pattern(&old_id, march()).unwrap();
        assert_eq!(manager.regular_schedules().len(), 5);

        let time = TimeRange::from_hm(18, 0, 19, 0).unwrap();
        let replacement =
            RecurrencePattern::new("Gym", Weekday::Tue, time, date(2025, 3, 4)).unwrap();
        let new_id = replacement.id().to_string();

        let removal = manager.replace_pattern(&old_id, replacement).unwrap();
        assert_eq!(removal.cascaded, 5);
        assert!(manager.regular_schedules().is_empty());
        assert!(manager.pattern(&new_id).is_some());
    }

    #[test]
    fn test_apply_pattern_is_idempotent() {
        let mut manager = ScheduleManager::new();
        let id = manager.add(gym());

        assert_eq!(manager.apply_pattern(&id, march()).unwrap(), 5);
        assert_eq!(manager.apply_pattern(&id, march()).unwrap(), 0);
        assert_eq!(manager.regular_schedules().len(), 5);

        for child in manager.regular_schedules() {
            assert_eq!(child.origin_pattern_id(), Some(id.as_str()));
        }

        assert!(matches!(
            manager.apply_pattern("missing", march()),
            Err(AgendaError::PatternNotFound(_))
        ));
    }

    #[test]
    fn test_apply_group_and_remove_group() {
        let mut manager = ScheduleManager::new();
        let time = TimeRange::from_hm(7, 0, 8, 0).unwrap();
        manager.add(gym());
        manager.add(RecurrencePattern::new("Gym", Weekday::Thu, time, date(2025, 3, 6)).unwrap());
        manager.add(RecurrencePattern::new("Piano", Weekday::Sat, time, date(2025, 3, 1)).unwrap());
        manager.add(schedule("Dentist", date(2025, 3, 3), 9, 10));

        // Mondays: 3, 10, 17, 24, 31. Thursdays: 6, 13, 20, 27.
        assert_eq!(manager.apply_group("Gym", march()), 9);

        let groups = manager.pattern_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Gym");
        assert_eq!(groups[0].patterns.len(), 2);
        assert_eq!(groups[1].label, "Piano");

        let totals = manager.remove_group("Gym");
        assert_eq!(totals, GroupRemoval { patterns: 2, cascaded: 9 });
        assert_eq!(manager.recurrence_patterns().len(), 1);
        assert_eq!(manager.regular_schedules().len(), 1);
    }

    #[test]
    fn test_gym_scenario() {
        let mut manager = ScheduleManager::new();
        let pattern = gym();
        let pattern_id = manager.add(pattern.clone());

        let mondays: Vec<_> = pattern.occurrences_in_month(march()).collect();
        assert_eq!(mondays.len(), 5);

        let second_monday = mondays[1];
        let child = pattern.materialize(second_monday);
        assert_eq!(child.date(), date(2025, 3, 10));
        assert_eq!(child.time().to_string(), "07:00 ~ 08:00");
        assert_eq!(child.origin_pattern_id(), Some(pattern_id.as_str()));
        let child_id = manager.add(child);

        assert_eq!(manager.schedules_on(second_monday).len(), 1);

        manager.remove(&pattern_id);
        assert!(manager.get(&child_id).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_achievement_rates() {
        let mut manager = ScheduleManager::new();
        let day = date(2025, 3, 3);
        let a = manager.add(schedule("A", day, 9, 10));
        manager.add(schedule("B", day, 10, 11));
        manager.add(schedule("C", day, 11, 12));
        let d = manager.add(schedule("D", date(2025, 3, 20), 9, 10));

        assert_eq!(manager.daily_achievement(day), Some(0));
        manager.set_completed(&a, true).unwrap();
        assert_eq!(manager.daily_achievement(day), Some(33));
        assert_eq!(manager.daily_achievement(date(2025, 3, 4)), None);

        // 1 of 4 in March
        assert_eq!(manager.monthly_achievement(march()), 25);
        manager.set_completed(&d, true).unwrap();
        assert_eq!(manager.monthly_achievement(march()), 50);
        assert_eq!(manager.monthly_achievement(YearMonth::new(2025, 4).unwrap()), 0);
    }

    #[test]
    fn test_completion_rate_rounds_half_up() {
        assert_eq!(completion_rate(0, 0), None);
        assert_eq!(completion_rate(3, 2), Some(67));
        assert_eq!(completion_rate(8, 1), Some(13));
        assert_eq!(completion_rate(4, 4), Some(100));
    }

    #[test]
    fn test_detach_orphans() {
        let mut manager = ScheduleManager::new();
        let pattern = gym();
        let linked = pattern.materialize(date(2025, 3, 3));
        let stale = schedule("Old", date(2025, 3, 4), 9, 10).with_origin(Some("gone".into()));
        let stale_id = stale.id().to_string();

        manager.add(pattern);
        manager.add(linked);
        manager.add(stale);

        assert_eq!(manager.detach_orphans(), vec![stale_id.clone()]);
        assert!(!manager.schedule(&stale_id).unwrap().is_derived());
        assert_eq!(
            manager.regular_schedules().iter().filter(|s| s.is_derived()).count(),
            1
        );
    }
}
