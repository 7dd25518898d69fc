//! One-off schedule commands: add, edit, done/undone, rm.

use agenda_core::{Schedule, ScheduleItem, TimeRange};
use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::commands::{Session, remove_with_confirmation, resolve_entry, resolve_schedule};
use crate::render::{Render, short_id};

pub fn add(label: &str, date: NaiveDate, time: TimeRange) -> Result<()> {
    let mut session = Session::open()?;

    let schedule = Schedule::new(label, date, time)?;
    let rendered = schedule.render();
    session.manager.add(schedule);
    session.save()?;

    println!("{}", format!("  Created on {}:", date).green());
    println!("   {}", rendered);

    Ok(())
}

/// Replace a schedule's label, date or time. Completion and lineage carry over.
pub fn edit(
    id: &str,
    label: Option<String>,
    date: Option<NaiveDate>,
    time: Option<TimeRange>,
) -> Result<()> {
    if label.is_none() && date.is_none() && time.is_none() {
        anyhow::bail!("Nothing to change. Pass --label, --date or --time.");
    }

    let mut session = Session::open()?;
    let id = resolve_schedule(&session.manager, id)?;

    let Some(old) = session.manager.schedule(&id) else {
        anyhow::bail!("No schedule matches '{}'", id);
    };

    let replacement = Schedule::new(
        label.as_deref().unwrap_or(old.label()),
        date.unwrap_or(old.date()),
        time.unwrap_or(old.time()),
    )?
    .with_completed(old.is_completed())
    .with_origin(old.origin_pattern_id().map(String::from));

    let new_id = session.manager.replace_schedule(&id, replacement)?;
    session.save()?;

    if let Some(schedule) = session.manager.schedule(&new_id) {
        println!("{}", format!("  Updated on {}:", schedule.date()).green());
        println!("   {}", schedule.render());
    }

    Ok(())
}

pub fn set_done(id: &str, completed: bool) -> Result<()> {
    let mut session = Session::open()?;
    let id = resolve_schedule(&session.manager, id)?;

    session.manager.set_completed(&id, completed)?;
    session.save()?;

    if let Some(schedule) = session.manager.schedule(&id) {
        println!("   {}", schedule.render());
    }

    Ok(())
}

/// Remove a schedule or a repeat (by id prefix).
pub fn remove(id: &str, yes: bool) -> Result<()> {
    let mut session = Session::open()?;
    let id = resolve_entry(&session.manager, id)?;

    if remove_with_confirmation(&mut session.manager, &id, yes)? {
        session.save()?;
    } else {
        println!("{}", format!("  Kept {}", short_id(&id)).dimmed());
    }

    Ok(())
}
