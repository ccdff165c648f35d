//! Plain-text rendering of ClassCharts feeds

use chrono::{DateTime, NaiveDate};
use classcharts_client::types::{
    ActivityPoint, Announcement, BehaviourData, Detention, Homework, Lesson,
};
use std::fmt::Write;

/// Render the lessons of one day, in the order ClassCharts lists them
pub fn format_lessons(date: NaiveDate, lessons: &[Lesson]) -> String {
    let mut out = format!("Timetable for {}\n", date.format("%A %d %B %Y"));
    if lessons.is_empty() {
        out.push_str("  No lessons\n");
        return out;
    }

    for lesson in lessons {
        let time = format!("{}-{}", clock_time(&lesson.start_time), clock_time(&lesson.end_time));
        if lesson.is_break {
            let _ = writeln!(out, "  {}  {}", time, lesson.period_name);
            continue;
        }
        let _ = write!(out, "  {}  {}", time, lesson.lesson_name);
        let details: Vec<&str> = [lesson.teacher_name.as_str(), lesson.room_name.as_str()]
            .into_iter()
            .filter(|detail| !detail.is_empty())
            .collect();
        if !details.is_empty() {
            let _ = write!(out, " ({})", details.join(", "));
        }
        out.push('\n');
    }
    out
}

pub fn format_homeworks(homeworks: &[Homework]) -> String {
    let mut out = String::from("Homework\n");
    if homeworks.is_empty() {
        out.push_str("  Nothing due\n");
        return out;
    }

    for homework in homeworks {
        let mark = if homework.status.ticked == "yes" { 'x' } else { ' ' };
        let _ = writeln!(
            out,
            "  [{}] due {}  {}: {}",
            mark, homework.due_date, homework.subject, homework.title
        );
    }
    out
}

/// Totals across the timeline, then reasons by descending count
pub fn format_behaviour(behaviour: &BehaviourData) -> String {
    let positive: i64 = behaviour.timeline.iter().map(|point| point.positive).sum();
    let negative: i64 = behaviour.timeline.iter().map(|point| point.negative).sum();

    let mut out = format!("Behaviour: {} positive, {} negative\n", positive, negative);
    for (sign, reasons) in [('+', &behaviour.positive_reasons), ('-', &behaviour.negative_reasons)] {
        let mut reasons: Vec<(&String, &i64)> = reasons.iter().collect();
        reasons.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (reason, count) in reasons {
            let _ = writeln!(out, "  {}{} {}", sign, count, reason);
        }
    }
    out
}

pub fn format_activity(points: &[ActivityPoint]) -> String {
    let mut out = format!("Activity: {} point(s)\n", points.len());
    for point in points {
        let _ = write!(out, "  {}  {:+}  {}", point.timestamp, point.score, point.reason);
        if let Some(lesson) = point.lesson_name.as_deref().filter(|name| !name.is_empty()) {
            let _ = write!(out, " ({})", lesson);
        }
        out.push('\n');
    }
    out
}

pub fn format_detentions(detentions: &[Detention]) -> String {
    let mut out = String::from("Detentions\n");
    if detentions.is_empty() {
        out.push_str("  None\n");
        return out;
    }

    for detention in detentions {
        let _ = writeln!(
            out,
            "  {} {}  {}  attended: {}  {}",
            detention.date.as_deref().unwrap_or("(no date)"),
            detention.time.as_deref().unwrap_or(""),
            detention.location.as_deref().unwrap_or("(no location)"),
            detention.attended,
            detention.lesson_pupil_behaviour.reason
        );
    }
    out
}

pub fn format_announcements(announcements: &[Announcement]) -> String {
    let mut out = String::from("Announcements\n");
    if announcements.is_empty() {
        out.push_str("  None\n");
        return out;
    }

    for announcement in announcements {
        let _ = writeln!(
            out,
            "  {}  {} ({})",
            announcement.timestamp, announcement.title, announcement.teacher_name
        );
    }
    out
}

/// `HH:MM` from an RFC 3339 timestamp, or the input unchanged
fn clock_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classcharts_client::types::{BehaviourTimelinePoint, DetentionBehaviour, HomeworkStatus};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn lesson(name: &str, start: &str, end: &str) -> Lesson {
        Lesson {
            lesson_name: name.to_string(),
            teacher_name: "Mr Babbage".to_string(),
            room_name: "R12".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            ..Lesson::default()
        }
    }

    #[test]
    fn test_format_lessons() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let lessons = vec![
            lesson("Maths", "2024-01-08T09:00:00+00:00", "2024-01-08T10:00:00+00:00"),
            Lesson {
                is_break: true,
                period_name: "Break".to_string(),
                start_time: "2024-01-08T10:00:00+00:00".to_string(),
                end_time: "2024-01-08T10:20:00+00:00".to_string(),
                ..Lesson::default()
            },
        ];

        assert_eq!(
            format_lessons(date, &lessons),
            "Timetable for Monday 08 January 2024\n  09:00-10:00  Maths (Mr Babbage, R12)\n  10:00-10:20  Break\n"
        );
        assert!(format_lessons(date, &[]).ends_with("No lessons\n"));
    }

    #[test]
    fn test_format_homeworks_marks_ticked() {
        let homeworks = vec![Homework {
            subject: "Maths".to_string(),
            title: "Fractions".to_string(),
            due_date: "2024-01-10".to_string(),
            status: HomeworkStatus {
                ticked: "yes".to_string(),
                ..HomeworkStatus::default()
            },
            ..Homework::default()
        }];
        assert_eq!(
            format_homeworks(&homeworks),
            "Homework\n  [x] due 2024-01-10  Maths: Fractions\n"
        );
    }

    #[test]
    fn test_format_behaviour_sums_timeline() {
        let behaviour = BehaviourData {
            timeline: vec![
                BehaviourTimelinePoint { positive: 2, negative: 1, ..Default::default() },
                BehaviourTimelinePoint { positive: 3, negative: 0, ..Default::default() },
            ],
            positive_reasons: HashMap::from([("Effort".to_string(), 4), ("Kindness".to_string(), 1)]),
            negative_reasons: HashMap::from([("Late".to_string(), 1)]),
            ..BehaviourData::default()
        };
        assert_eq!(
            format_behaviour(&behaviour),
            "Behaviour: 5 positive, 1 negative\n  +4 Effort\n  +1 Kindness\n  -1 Late\n"
        );
    }

    #[test]
    fn test_format_activity_and_detentions() {
        let points = vec![ActivityPoint {
            timestamp: "2024-01-08 09:12:00".to_string(),
            score: -1,
            reason: "Late".to_string(),
            lesson_name: Some("Maths".to_string()),
            ..ActivityPoint::default()
        }];
        assert_eq!(
            format_activity(&points),
            "Activity: 1 point(s)\n  2024-01-08 09:12:00  -1  Late (Maths)\n"
        );

        let detentions = vec![Detention {
            date: Some("2024-01-09".to_string()),
            time: Some("15:30".to_string()),
            location: Some("Hall".to_string()),
            attended: "pending".to_string(),
            lesson_pupil_behaviour: DetentionBehaviour {
                reason: "Late".to_string(),
            },
            ..Detention::default()
        }];
        assert_eq!(
            format_detentions(&detentions),
            "Detentions\n  2024-01-09 15:30  Hall  attended: pending  Late\n"
        );
    }

    proptest! {
        // Property: anything that is not an RFC 3339 timestamp is shown unchanged
        #[test]
        fn prop_clock_time_passes_through_plain_text(text in "[a-z ]{0,12}") {
            prop_assert_eq!(clock_time(&text), text);
        }
    }
}
