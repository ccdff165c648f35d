//! Configuration resolution from CLI args and the environment

use crate::cli::{Args, Feed, Persona};
use crate::error::CliError;
use chrono::NaiveDate;
use std::time::Duration;
use zeroize::Zeroizing;

pub const EMAIL_VAR: &str = "CLASSCHARTS_EMAIL";
pub const PASSWORD_VAR: &str = "CLASSCHARTS_PASSWORD";
pub const CODE_VAR: &str = "CLASSCHARTS_CODE";
pub const DOB_VAR: &str = "CLASSCHARTS_DOB";

/// Login details for one persona (secrets zeroized on drop)
pub enum Credentials {
    Parent {
        email: String,
        password: Zeroizing<String>,
        pupil: Option<i64>,
    },
    Student {
        code: Zeroizing<String>,
        date_of_birth: NaiveDate,
    },
}

/// Resolved runtime configuration
pub struct Config {
    pub credentials: Credentials,
    /// Day the feed is shown for
    pub date: NaiveDate,
    pub feed: Feed,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Config {
    /// Build config from CLI args, reading secrets from the environment and
    /// prompting for any that are missing
    pub fn from_args(args: Args) -> Result<Self, CliError> {
        Self::resolve(args, |name| std::env::var(name).ok(), &TerminalPrompt)
    }

    fn resolve(
        args: Args,
        env: impl Fn(&str) -> Option<String>,
        prompt: &dyn Prompt,
    ) -> Result<Self, CliError> {
        let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let credentials = match args.persona {
            Persona::Parent { pupil } => {
                let email = match lookup(EMAIL_VAR) {
                    Some(email) => email,
                    None => prompt.line("Email: ")?,
                };
                let password = match lookup(PASSWORD_VAR) {
                    Some(password) => Zeroizing::new(password),
                    None => prompt.secret("Password: ")?,
                };
                Credentials::Parent {
                    email: email.trim().to_string(),
                    password,
                    pupil,
                }
            }
            Persona::Student => {
                let code = match lookup(CODE_VAR) {
                    Some(code) => Zeroizing::new(code),
                    None => prompt.secret("Student code: ")?,
                };
                let date_of_birth = match lookup(DOB_VAR) {
                    Some(dob) => dob,
                    None => prompt.line("Date of birth (YYYY-MM-DD): ")?,
                };
                Credentials::Student {
                    code,
                    date_of_birth: parse_date_of_birth(&date_of_birth)?,
                }
            }
        };

        Ok(Config {
            credentials,
            date: args.date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            feed: args.feed,
            base_url: args.base_url,
            timeout: args.timeout,
        })
    }
}

/// Accepts `YYYY-MM-DD` or the `DD/MM/YYYY` form ClassCharts shows
fn parse_date_of_birth(value: &str) -> Result<NaiveDate, CliError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map_err(|_| {
            CliError::Config(format!(
                "Invalid date of birth '{}': expected YYYY-MM-DD or DD/MM/YYYY",
                value
            ))
        })
}

/// Source of values missing from the environment
trait Prompt {
    fn line(&self, label: &str) -> Result<String, CliError>;
    fn secret(&self, label: &str) -> Result<Zeroizing<String>, CliError>;
}

struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn line(&self, label: &str) -> Result<String, CliError> {
        use std::io::Write;
        print!("{}", label);
        std::io::stdout().flush().ok();

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if input.is_empty() {
            return Err(CliError::Config(format!("{} is required", label.trim_end_matches(": "))));
        }
        Ok(input)
    }

    fn secret(&self, label: &str) -> Result<Zeroizing<String>, CliError> {
        let s = Zeroizing::new(
            rpassword::prompt_password(label)
                .map_err(|e| CliError::Config(format!("Failed to read secret: {}", e)))?,
        );
        if s.is_empty() {
            return Err(CliError::Config(format!("{} is required", label.trim_end_matches(": "))));
        }
        Ok(s)
    }
}
