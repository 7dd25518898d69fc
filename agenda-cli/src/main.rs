mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use agenda_core::{TimeRange, YearMonth};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::utils::input::{parse_date, parse_month, parse_rule};

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Plan your days with one-off schedules and weekly repeats")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the schedules of one day
    Day {
        /// YYYY-MM-DD or e.g. "tomorrow" (default: today)
        date: Option<String>,
    },
    /// Summarize a month day by day
    Month {
        /// YYYY-MM (default: this month)
        month: Option<String>,
    },
    /// Add a one-off schedule
    Add {
        label: String,

        /// Time range, e.g. "09:00-10:30"
        #[arg(short, long)]
        time: String,

        /// YYYY-MM-DD or e.g. "next fri" (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Change a schedule's label, date or time
    Edit {
        /// Schedule id (or a unique prefix)
        id: String,

        #[arg(short, long)]
        label: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        time: Option<String>,
    },
    /// Mark a schedule as done
    Done { id: String },
    /// Mark a schedule as not done
    Undone { id: String },
    /// Remove a schedule or a repeat
    Rm {
        id: String,

        /// Don't ask before removing a repeat's schedules
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage weekly repeats
    Repeat {
        #[command(subcommand)]
        command: RepeatCommands,
    },
    /// Write everything to an .ics file
    Export { path: PathBuf },
    /// Show paths, or change the data directory
    Config {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RepeatCommands {
    /// Add a weekly repeat
    Add {
        label: String,

        /// Weekday and time, e.g. "mon@07:00-08:00"
        rule: String,

        /// First date the repeat may fall on (default: today)
        #[arg(long)]
        from: Option<String>,
    },
    /// List repeats grouped by label
    List,
    /// Create the schedules of a repeat for one month
    Apply {
        /// Repeat id (or a unique prefix), or a label to apply the whole group
        target: String,

        /// YYYY-MM (default: this month)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Replace a repeat, dropping the schedules made from it
    Edit {
        id: String,

        #[arg(short, long)]
        label: Option<String>,

        /// Weekday and time, e.g. "wed@18:00-19:00"
        #[arg(short, long)]
        rule: Option<String>,

        /// First date the repeat may fall on (default: today)
        #[arg(long)]
        from: Option<String>,

        #[arg(short, long)]
        yes: bool,
    },
    /// Remove a repeat and its schedules
    Rm {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },
    /// Remove every repeat with this label
    RmGroup {
        label: String,

        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Day { date } => commands::day::run(date_or_today(date, today)?),
        Commands::Month { month } => {
            let month = match month {
                Some(m) => parse_month(&m, today)?,
                None => YearMonth::of(today),
            };
            commands::month::run(month)
        }
        Commands::Add { label, time, date } => {
            let date = date_or_today(date, today)?;
            commands::schedule::add(&label, date, time.parse::<TimeRange>()?)
        }
        Commands::Edit {
            id,
            label,
            date,
            time,
        } => {
            let date = date.map(|d| parse_date(&d, today)).transpose()?;
            let time = time.map(|t| t.parse::<TimeRange>()).transpose()?;
            commands::schedule::edit(&id, label, date, time)
        }
        Commands::Done { id } => commands::schedule::set_done(&id, true),
        Commands::Undone { id } => commands::schedule::set_done(&id, false),
        Commands::Rm { id, yes } => commands::schedule::remove(&id, yes),
        Commands::Repeat { command } => run_repeat(command, today),
        Commands::Export { path } => commands::export::run(&path),
        Commands::Config { data_dir } => commands::config::run(data_dir),
    }
}

fn run_repeat(command: RepeatCommands, today: NaiveDate) -> Result<()> {
    match command {
        RepeatCommands::Add { label, rule, from } => {
            let (weekday, time) = parse_rule(&rule)?;
            commands::repeat::add(&label, weekday, time, date_or_today(from, today)?)
        }
        RepeatCommands::List => commands::repeat::list(),
        RepeatCommands::Apply { target, month } => {
            let month = match month {
                Some(m) => parse_month(&m, today)?,
                None => YearMonth::of(today),
            };
            commands::repeat::apply(&target, month)
        }
        RepeatCommands::Edit {
            id,
            label,
            rule,
            from,
            yes,
        } => {
            let rule = rule.as_deref().map(parse_rule).transpose()?;
            let from = from.map(|d| parse_date(&d, today)).transpose()?;
            commands::repeat::edit(&id, label, rule, from, yes, today)
        }
        RepeatCommands::Rm { id, yes } => commands::repeat::remove(&id, yes),
        RepeatCommands::RmGroup { label, yes } => commands::repeat::remove_group(&label, yes),
    }
}

fn date_or_today(input: Option<String>, today: NaiveDate) -> Result<NaiveDate> {
    match input {
        Some(d) => parse_date(&d, today),
        None => Ok(today),
    }
}
