//! ClassCharts Client Library
//!
//! This library wraps the ClassCharts school-management API for its two kinds
//! of account: parents, who see every pupil attached to their account, and
//! students, who log in with their own code and date of birth.
//!
//! # Features
//!
//! - Login handshake for both personas, with automatic session revalidation
//! - Typed options and responses for homework, behaviour, attendance, lessons,
//!   activity, badges, announcements, detentions, pupil fields and rewards
//! - Activity pagination via [`ClassChartsClient::get_full_activity`]
//! - Secure TLS using rustls (no OpenSSL dependencies)
//! - Blocking synchronous API
//! - Well-typed errors using thiserror
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use classcharts_client::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = ParentClient::new("parent@example.com", "hunter2")?;
//! client.login()?;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
//! let lessons = client.get_lessons(&LessonsOptions::on(today))?;
//! for lesson in &lessons.data {
//!     println!("{} {} in {}", lesson.start_time, lesson.lesson_name, lesson.room_name);
//! }
//!
//! let activity = client.get_full_activity(&FullActivityOptions::between(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//! ))?;
//! println!("{} activity point(s) in January", activity.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod cookies;
mod error;
mod options;
mod parent;
mod session;
mod student;
mod transport;
pub mod types;

pub use client::{
    ClassChartsBuilder, ClassChartsClient, ClientCore, DEFAULT_BASE_URL, DEFAULT_PING_INTERVAL,
};
pub use error::{ApiError, ClassChartsError};
pub use options::{
    ActivityOptions, AttendanceOptions, BehaviourOptions, DisplayDate, FullActivityOptions,
    HomeworkOptions, LessonsOptions, StudentCodeOptions,
};
pub use parent::ParentClient;
pub use student::StudentClient;

/// Clients, the shared endpoint trait, options and errors in one import
pub mod prelude {
    pub use crate::{
        ActivityOptions, AttendanceOptions, BehaviourOptions, ClassChartsClient,
        ClassChartsError, DisplayDate, FullActivityOptions, HomeworkOptions, LessonsOptions,
        ParentClient, StudentClient, StudentCodeOptions,
    };
}
