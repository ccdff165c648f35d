//! CLI argument parsing using clap

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

/// Which feed to print for the chosen date
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum Feed {
    /// Lessons on the date (default)
    #[default]
    Timetable,
    /// Homework due in the week starting on the date
    Homework,
    /// Positive and negative points for the date
    Behaviour,
    /// Every activity point recorded on the date
    Activity,
    /// All detentions
    Detentions,
    /// All announcements
    Announcements,
}

/// Account type to log in with
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    /// Parent account (CLASSCHARTS_EMAIL, CLASSCHARTS_PASSWORD)
    Parent {
        /// Pupil to show instead of the first one on the account
        #[arg(long)]
        pupil: Option<i64>,
    },
    /// Student account (CLASSCHARTS_CODE, CLASSCHARTS_DOB)
    Student,
}

/// ClassCharts timetable and feed viewer
#[derive(Parser, Debug)]
#[command(name = "classcharts", about = "Browse ClassCharts timetables and feeds", version)]
pub struct Args {
    #[command(subcommand)]
    pub persona: Persona,

    /// Date to show, as YYYY-MM-DD (defaults to today)
    #[arg(short, long, global = true)]
    pub date: Option<NaiveDate>,

    /// Feed to print
    #[arg(short, long, value_enum, default_value = "timetable", global = true)]
    pub feed: Feed,

    /// Override the ClassCharts site, e.g. for a local mock
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// HTTP timeout, e.g. 30s or 1m
    #[arg(long, value_parser = humantime::parse_duration, default_value = "30s", global = true)]
    pub timeout: Duration,
}
