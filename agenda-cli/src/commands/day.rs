use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::commands::Session;
use crate::render::{Render, render_achievement};

pub fn run(date: NaiveDate) -> Result<()> {
    let session = Session::open()?;
    let manager = &session.manager;

    println!("{}", date.format("%A %Y-%m-%d").bold());

    let day = manager.schedules_on(date);
    if day.is_empty() {
        println!("   {}", "Nothing scheduled".dimmed());
        return Ok(());
    }

    for schedule in &day {
        println!("   {}", schedule.render());
    }

    if let Some(percent) = manager.daily_achievement(date) {
        println!();
        println!("   {}", render_achievement(percent));
    }

    Ok(())
}
