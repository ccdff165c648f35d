//! ClassCharts CLI - print a day's timetable or feed for a parent or student account

mod cli;
mod config;
mod error;
mod output;

use chrono::{Days, NaiveDate};
use clap::Parser;
use classcharts_client::ClassChartsBuilder;
use classcharts_client::prelude::*;
use cli::{Args, Feed};
use config::{Config, Credentials};
use error::CliError;

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = Config::from_args(args)?;

    let http = reqwest::blocking::Client::builder()
        .use_rustls_tls()
        .timeout(config.timeout);
    let mut builder = ClassChartsBuilder::new().client_builder(http);
    if let Some(url) = &config.base_url {
        builder = builder.base_url(url.as_str())?;
    }

    match config.credentials {
        Credentials::Parent {
            email,
            password,
            pupil,
        } => {
            let mut client = builder.parent(email, password.as_str())?;
            client.login()?;
            if let Some(pupil_id) = pupil {
                client.select_pupil(pupil_id)?;
            }
            print_feed(&mut client, config.feed, config.date)
        }
        Credentials::Student {
            code,
            date_of_birth,
        } => {
            let mut client = builder.student(code.as_str(), date_of_birth)?;
            client.login()?;
            print_feed(&mut client, config.feed, config.date)
        }
    }
}

/// Fetch one feed for `date` and print it
fn print_feed<C: ClassChartsClient>(client: &mut C, feed: Feed, date: NaiveDate) -> Result<(), CliError> {
    log::debug!("Fetching {:?} feed for {}", feed, date);
    let text = match feed {
        Feed::Timetable => {
            let lessons = client.get_lessons(&LessonsOptions::on(date))?;
            output::format_lessons(date, &lessons.data)
        }
        Feed::Homework => {
            let week_end = date.checked_add_days(Days::new(6)).unwrap_or(date);
            let homeworks = client.get_homeworks(&HomeworkOptions {
                display_date: Some(DisplayDate::DueDate),
                from_date: Some(date),
                to_date: Some(week_end),
            })?;
            output::format_homeworks(&homeworks.data)
        }
        Feed::Behaviour => {
            let behaviour = client.get_behaviour(&BehaviourOptions {
                from_date: Some(date),
                to_date: Some(date),
            })?;
            output::format_behaviour(&behaviour.data)
        }
        Feed::Activity => {
            let points = client.get_full_activity(&FullActivityOptions::between(date, date))?;
            output::format_activity(&points)
        }
        Feed::Detentions => output::format_detentions(&client.get_detentions()?.data),
        Feed::Announcements => output::format_announcements(&client.get_announcements()?.data),
    };

    print!("{}", text);
    Ok(())
}
