use std::path::Path;

use agenda_core::ics::generate_ics;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::commands::Session;

pub fn run(path: &Path) -> Result<()> {
    let session = Session::open()?;

    let ics = generate_ics(&session.manager, chrono::Utc::now());
    std::fs::write(path, ics).with_context(|| format!("Could not write {}", path.display()))?;

    println!(
        "{}",
        format!(
            "  Exported {} repeats and {} schedules to {}",
            session.manager.recurrence_patterns().len(),
            session.manager.regular_schedules().len(),
            path.display()
        )
        .green()
    );

    Ok(())
}
