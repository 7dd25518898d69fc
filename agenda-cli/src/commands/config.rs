use std::path::PathBuf;

use agenda_core::AgendaConfig;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(data_dir: Option<PathBuf>) -> Result<()> {
    let config_path = AgendaConfig::config_path()?;
    let mut config = AgendaConfig::load()?;

    if let Some(dir) = data_dir {
        config.data_dir = dir;
        config.save()?;
        println!("{}", "  Saved data directory".green());
        println!();
    }

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Data:       {}", config.data_path().display());
    println!("  Schedules:  {}", config.schedules_path().display());
    println!("  Repeats:    {}", config.patterns_path().display());

    Ok(())
}
