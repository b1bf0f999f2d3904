//! Calendar CLI commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{
    add_business_days, count_business_days, duration_from_start_and_end, Holiday,
};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum CalendarCommands {
    /// Count business days between two dates (inclusive)
    Days {
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Date on which work starting at START completes DAYS business days
    Finish {
        start: NaiveDate,
        days: u32,
    },

    /// List holidays
    Holidays,

    /// Add or replace a holiday (rewrites config.toml without its comments)
    AddHoliday {
        date: NaiveDate,
        name: String,

        /// Only excluded when the calendar observes optional holidays
        #[arg(long)]
        optional: bool,
    },

    /// Remove the holiday on a date (rewrites config.toml without its comments)
    RemoveHoliday { date: NaiveDate },
}

pub fn run(cmd: CalendarCommands, output: &Output) -> Result<()> {
    match cmd {
        CalendarCommands::Days { start, end } => days(output, start, end),
        CalendarCommands::Finish { start, days } => finish(output, start, days),
        CalendarCommands::Holidays => holidays(output),
        CalendarCommands::AddHoliday {
            date,
            name,
            optional,
        } => add_holiday(output, date, name, optional),
        CalendarCommands::RemoveHoliday { date } => remove_holiday(output, date),
    }
}

fn days(output: &Output, start: NaiveDate, end: NaiveDate) -> Result<()> {
    let project = Project::open_current()?;
    let calendar = &project.config().project.calendar;

    let business = count_business_days(start, end, calendar)?;
    let calendar_days = duration_from_start_and_end(start, end)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "start": start,
            "end": end,
            "business_days": business,
            "calendar_days": calendar_days,
        }));
    } else {
        println!(
            "{} business day(s) of {} from {} to {}",
            business, calendar_days, start, end
        );
    }

    Ok(())
}

fn finish(output: &Output, start: NaiveDate, days: u32) -> Result<()> {
    let project = Project::open_current()?;
    let calendar = &project.config().project.calendar;

    let end = add_business_days(start, days, calendar).ok_or_else(|| {
        anyhow::anyhow!("No working days found after {}; check calendar.working_days", start)
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "start": start,
            "business_days": days,
            "finish": end,
        }));
    } else {
        println!("{}", end);
    }

    Ok(())
}

fn holidays(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let calendar = &project.config().project.calendar;

    if output.is_json() {
        output.data(&calendar.holidays);
    } else if calendar.holidays.is_empty() {
        println!("No holidays");
    } else {
        println!("{:<12} {:<10} NAME", "DATE", "KIND");
        println!("{}", "-".repeat(50));
        for holiday in &calendar.holidays {
            let kind = if holiday.optional {
                "optional"
            } else {
                "mandatory"
            };
            println!("{:<12} {:<10} {}", holiday.date, kind, holiday.name);
        }
    }

    Ok(())
}

fn add_holiday(output: &Output, date: NaiveDate, name: String, optional: bool) -> Result<()> {
    let mut project = Project::open_current()?;

    let config = project.config_mut();
    config
        .project
        .calendar
        .add_holiday(Holiday::new(date, name.clone(), optional));
    config.save_project()?;

    output.success(&format!("Added holiday {}: {}", date, name));
    Ok(())
}

fn remove_holiday(output: &Output, date: NaiveDate) -> Result<()> {
    let mut project = Project::open_current()?;

    let config = project.config_mut();
    let removed = config
        .project
        .calendar
        .remove_holiday(date)
        .ok_or_else(|| anyhow::anyhow!("No holiday on {}", date))?;
    config.save_project()?;

    output.success(&format!("Removed holiday {}: {}", removed.date, removed.name));
    Ok(())
}
