//! Per-endpoint request options
//!
//! Options are plain values: build one, pass it by reference, reuse it if you
//! like. Required fields are still `Option`s so that a missing value is
//! reported as [`ClassChartsError::Validation`] rather than being impossible
//! to express.

use crate::error::ClassChartsError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format of every date the API accepts
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query parameters in the order they are sent
pub(crate) type Query = Vec<(&'static str, String)>;

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn push_date(query: &mut Query, key: &'static str, date: Option<NaiveDate>) {
    if let Some(date) = date {
        query.push((key, format_date(date)));
    }
}

/// Require both ends of a date range, in order
fn require_range(
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), ClassChartsError> {
    let from = from_date.ok_or_else(|| ClassChartsError::validation("No from_date specified"))?;
    let to = to_date.ok_or_else(|| ClassChartsError::validation("No to_date specified"))?;
    if from > to {
        return Err(ClassChartsError::validation(format!(
            "from_date {} is after to_date {}",
            format_date(from),
            format_date(to)
        )));
    }
    Ok((from, to))
}

/// Which homework date the `from`/`to` range filters on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayDate {
    DueDate,
    #[default]
    IssueDate,
}

impl DisplayDate {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayDate::DueDate => "due_date",
            DisplayDate::IssueDate => "issue_date",
        }
    }
}

/// Options for `get_homeworks`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeworkOptions {
    /// Defaults to [`DisplayDate::IssueDate`]
    pub display_date: Option<DisplayDate>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl HomeworkOptions {
    pub(crate) fn to_query(&self) -> Query {
        let mut query = vec![(
            "display_date",
            self.display_date.unwrap_or_default().as_str().to_string(),
        )];
        push_date(&mut query, "from", self.from_date);
        push_date(&mut query, "to", self.to_date);
        query
    }
}

/// Options for `get_behaviour`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BehaviourOptions {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl BehaviourOptions {
    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_date(&mut query, "from", self.from_date);
        push_date(&mut query, "to", self.to_date);
        query
    }
}

/// Options for `get_attendance`; both dates are required
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceOptions {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl AttendanceOptions {
    pub fn between(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            from_date: Some(from_date),
            to_date: Some(to_date),
        }
    }

    pub(crate) fn to_query(&self) -> Result<Query, ClassChartsError> {
        let (from, to) = require_range(self.from_date, self.to_date)?;
        Ok(vec![("from", format_date(from)), ("to", format_date(to))])
    }
}

/// Options for `get_lessons`; the date is required
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonsOptions {
    pub date: Option<NaiveDate>,
}

impl LessonsOptions {
    pub fn on(date: NaiveDate) -> Self {
        Self { date: Some(date) }
    }

    pub(crate) fn to_query(&self) -> Result<Query, ClassChartsError> {
        let date = self
            .date
            .ok_or_else(|| ClassChartsError::validation("No date specified"))?;
        Ok(vec![("date", format_date(date))])
    }
}

/// Options for a single `get_activity` page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityOptions {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Id of the last activity point of the previous page
    pub last_id: Option<i64>,
}

impl ActivityOptions {
    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_date(&mut query, "from", self.from_date);
        push_date(&mut query, "to", self.to_date);
        if let Some(last_id) = self.last_id {
            query.push(("last_id", last_id.to_string()));
        }
        query
    }
}

/// Options for `get_full_activity`; both dates are required
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FullActivityOptions {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl FullActivityOptions {
    pub fn between(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            from_date: Some(from_date),
            to_date: Some(to_date),
        }
    }

    /// Options for the first page of the range
    pub(crate) fn first_page(&self) -> Result<ActivityOptions, ClassChartsError> {
        let (from, to) = require_range(self.from_date, self.to_date)?;
        Ok(ActivityOptions {
            from_date: Some(from),
            to_date: Some(to),
            last_id: None,
        })
    }
}

/// Options for `get_student_code`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentCodeOptions {
    pub date_of_birth: Option<NaiveDate>,
}

impl StudentCodeOptions {
    pub(crate) fn to_form(&self) -> Result<Query, ClassChartsError> {
        let date_of_birth = self
            .date_of_birth
            .ok_or_else(|| ClassChartsError::validation("No date_of_birth specified"))?;
        Ok(vec![("date", format_date(date_of_birth))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_homework_display_date_defaults_to_issue_date() {
        let query = HomeworkOptions::default().to_query();
        assert_eq!(query, vec![("display_date", "issue_date".to_string())]);
    }

    #[test]
    fn test_homework_full_query() {
        let options = HomeworkOptions {
            display_date: Some(DisplayDate::DueDate),
            from_date: Some(date(2024, 1, 1)),
            to_date: Some(date(2024, 1, 31)),
        };

        assert_eq!(
            options.to_query(),
            vec![
                ("display_date", "due_date".to_string()),
                ("from", "2024-01-01".to_string()),
                ("to", "2024-01-31".to_string()),
            ]
        );
    }

    #[test]
    fn test_behaviour_query_skips_missing_dates() {
        let options = BehaviourOptions {
            from_date: None,
            to_date: Some(date(2024, 3, 9)),
        };
        assert_eq!(options.to_query(), vec![("to", "2024-03-09".to_string())]);
    }

    #[test]
    fn test_attendance_requires_both_dates() {
        let missing_to = AttendanceOptions {
            from_date: Some(date(2024, 1, 1)),
            to_date: None,
        };
        assert!(matches!(
            missing_to.to_query(),
            Err(ClassChartsError::Validation(_))
        ));
        assert!(matches!(
            AttendanceOptions::default().to_query(),
            Err(ClassChartsError::Validation(_))
        ));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let options = AttendanceOptions::between(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(
            options.to_query(),
            Err(ClassChartsError::Validation(_))
        ));
    }

    #[test]
    fn test_lessons_requires_date() {
        let err = LessonsOptions::default().to_query().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: No date specified");

        let query = LessonsOptions::on(date(2024, 5, 20)).to_query().unwrap();
        assert_eq!(query, vec![("date", "2024-05-20".to_string())]);
    }

    #[test]
    fn test_activity_query_includes_cursor() {
        let options = ActivityOptions {
            from_date: Some(date(2024, 1, 1)),
            to_date: Some(date(2024, 1, 31)),
            last_id: Some(77),
        };
        assert_eq!(
            options.to_query(),
            vec![
                ("from", "2024-01-01".to_string()),
                ("to", "2024-01-31".to_string()),
                ("last_id", "77".to_string()),
            ]
        );
    }

    #[test]
    fn test_student_code_requires_date_of_birth() {
        assert!(StudentCodeOptions::default().to_form().is_err());

        let options = StudentCodeOptions {
            date_of_birth: Some(date(2010, 9, 4)),
        };
        assert_eq!(options.to_form().unwrap(), vec![("date", "2010-09-04".to_string())]);
    }
}
