//! Typed response payloads mirroring the ClassCharts JSON
//!
//! Every payload struct defaults missing fields and ignores unknown ones, so
//! schools that hide a feature (and the API fields that go with it) still
//! deserialize cleanly. Responses decoded by the clients also treat `null`
//! members as missing.

use crate::options::DisplayDate;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Common envelope of every API response
#[derive(Debug, Clone, Deserialize)]
pub struct Response<D, M> {
    /// `1` on success; failures never reach the caller as a `Response`
    #[serde(default, deserialize_with = "success_flag")]
    pub success: i64,
    /// Error message sent alongside failures
    #[serde(default)]
    pub error: Option<String>,
    /// Endpoint payload
    #[serde(default)]
    pub data: D,
    /// Endpoint metadata (date ranges, counters, balances)
    #[serde(default)]
    pub meta: M,
}

/// `success` arrives as `1`/`0` or, from some endpoints, `true`/`false`
fn success_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Number(i64),
        Bool(bool),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Number(flag) => flag,
        Flag::Bool(flag) => i64::from(flag),
    })
}

/// Metadata of endpoints that send an empty list or object
pub type EmptyMeta = serde_json::Value;

/// A value the API sends either as a number or as a string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    /// Numeric form
    Number(i64),
    /// String form
    Text(String),
}

// ---------------------------------------------------------------------------
// Student info
// ---------------------------------------------------------------------------

/// Student account as returned by `ping`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: String,
    pub display_behaviour: bool,
    pub display_parent_behaviour: bool,
    pub display_homework: bool,
    pub display_rewards: bool,
    pub display_detentions: bool,
    pub display_report_cards: bool,
    pub display_classes: bool,
    pub display_announcements: bool,
    pub display_attendance: bool,
    pub display_attendance_type: String,
    pub display_attendance_percentage: bool,
    pub display_activity: bool,
    pub display_mental_health: bool,
    pub display_timetable: bool,
    pub is_disabled: bool,
    pub display_two_way_communications: bool,
    pub display_absences: bool,
    pub can_upload_attachments: Option<bool>,
    pub display_event_badges: bool,
    pub display_avatars: bool,
    pub display_concern_submission: bool,
    pub display_custom_fields: bool,
    pub pupil_concerns_help_text: String,
    pub allow_pupils_add_timetable_notes: bool,
    pub announcements_count: i64,
    pub messages_count: i64,
    pub pusher_channel_name: String,
    pub has_birthday: bool,
    pub has_new_survey: bool,
    pub survey_id: Option<i64>,
    pub detention_alias_plural_uc: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentInfoData {
    pub user: Student,
}

/// Metadata of `ping`; `session_id` is the refreshed session id
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentInfoMeta {
    pub version: String,
    pub session_id: Option<String>,
}

pub type StudentInfoResponse = Response<StudentInfoData, StudentInfoMeta>;

/// Pupil attached to a parent account
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pupil {
    #[serde(flatten)]
    pub student: Student,
    pub school_name: String,
    pub school_logo: String,
    pub timezone: String,
    pub display_covid_tests: bool,
    pub can_record_covid_tests: bool,
    pub detention_yes_count: i64,
    pub detention_no_count: i64,
    pub detention_pending_count: i64,
    pub detention_upscaled_count: i64,
    pub homework_todo_count: i64,
    pub homework_late_count: i64,
    pub homework_not_completed_count: i64,
    pub homework_excused_count: i64,
    pub homework_completed_count: i64,
    pub homework_submitted_count: i64,
}

impl Pupil {
    pub fn id(&self) -> i64 {
        self.student.id
    }

    pub fn name(&self) -> &str {
        &self.student.name
    }
}

pub type PupilsResponse = Response<Vec<Pupil>, EmptyMeta>;

// ---------------------------------------------------------------------------
// Behaviour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BehaviourTimelinePoint {
    pub positive: i64,
    pub negative: i64,
    pub name: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BehaviourData {
    pub timeline: Vec<BehaviourTimelinePoint>,
    pub positive_reasons: HashMap<String, i64>,
    pub negative_reasons: HashMap<String, i64>,
    pub other_positive: Vec<String>,
    pub other_negative: Vec<String>,
    pub other_positive_count: Vec<HashMap<String, i64>>,
    pub other_negative_count: Vec<HashMap<String, i64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BehaviourMeta {
    pub start_date: String,
    pub end_date: String,
    pub step_size: String,
}

pub type BehaviourResponse = Response<BehaviourData, BehaviourMeta>;

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// One timestamped event in a pupil's activity feed
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActivityPoint {
    pub id: i64,
    /// `detention`, `notice`, `attendance_event`, `question`, `event` or `behaviour`
    #[serde(rename = "type")]
    pub kind: String,
    /// `positive`, `blank` or `negative`
    pub polarity: Option<String>,
    pub reason: String,
    pub score: i64,
    pub timestamp: String,
    pub timestamp_custom_time: Option<String>,
    pub style: HashMap<String, Option<String>>,
    pub pupil_name: String,
    pub lesson_name: Option<String>,
    pub teacher_name: Option<String>,
    pub room_name: Option<String>,
    pub note: Option<String>,
    #[serde(rename = "_can_delete")]
    pub can_delete: bool,
    pub badges: String,
    pub detention_date: Option<String>,
    pub detention_time: Option<String>,
    pub detention_location: Option<String>,
    pub detention_type: Option<String>,
}

/// `last_id` of an activity page: the cursor, or `false` once exhausted
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LastId {
    Id(i64),
    Exhausted(bool),
}

impl Default for LastId {
    fn default() -> Self {
        LastId::Exhausted(false)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActivityMeta {
    pub start_date: String,
    pub end_date: String,
    pub last_id: LastId,
    pub step_size: String,
    pub detention_alias_uc: String,
}

pub type ActivityResponse = Response<Vec<ActivityPoint>, ActivityMeta>;

// ---------------------------------------------------------------------------
// Homework
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeacherValidatedAttachment {
    pub id: i64,
    pub file_name: String,
    pub file: String,
    pub validated_file: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeacherValidatedLink {
    pub link: String,
    pub validated_link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentHomeworkAttachment {
    pub id: i64,
    pub file_name: String,
    pub file: String,
    pub validated_file: String,
    pub teacher_note: String,
    pub teacher_homework_attachments: Vec<TeacherValidatedAttachment>,
    pub can_delete: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HomeworkStatus {
    pub id: i64,
    /// `not_completed`, `late` or `completed`
    pub state: Option<String>,
    pub mark: Option<String>,
    pub mark_relative: i64,
    /// `yes` or `no`
    pub ticked: String,
    pub allow_attachments: bool,
    pub allow_marking_completed: bool,
    pub first_seen_date: Option<String>,
    pub last_seen_date: Option<String>,
    pub attachments: Vec<StudentHomeworkAttachment>,
    pub has_feedback: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Homework {
    pub lesson: String,
    pub subject: String,
    pub teacher: String,
    pub homework_type: String,
    pub id: i64,
    pub title: String,
    pub meta_title: String,
    pub description: String,
    pub issue_date: String,
    pub due_date: String,
    pub completion_time_unit: String,
    pub completion_time_value: String,
    pub publish_time: String,
    pub status: HomeworkStatus,
    pub validated_links: Vec<TeacherValidatedLink>,
    pub validated_attachments: Vec<TeacherValidatedAttachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HomeworksMeta {
    pub start_date: String,
    pub end_date: String,
    pub display_type: DisplayDate,
    pub max_files_allowed: i64,
    pub allowed_file_types: Vec<String>,
    pub this_week_due_count: i64,
    pub this_week_outstanding_count: i64,
    pub this_week_completed_count: i64,
    pub allow_attachments: bool,
    pub display_marks: bool,
}

pub type HomeworksResponse = Response<Vec<Homework>, HomeworksMeta>;

// ---------------------------------------------------------------------------
// Lessons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lesson {
    pub teacher_name: String,
    pub teacher_id: String,
    pub lesson_name: String,
    pub subject_name: String,
    pub is_alternative_lesson: bool,
    pub is_break: bool,
    pub period_name: String,
    pub period_number: String,
    pub room_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub key: i64,
    pub note_abstract: String,
    pub note: String,
    pub pupil_note_abstract: String,
    pub pupil_note: String,
    pub pupil_note_raw: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PeriodMeta {
    pub number: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LessonsMeta {
    pub dates: Vec<String>,
    pub timetable_dates: Vec<String>,
    pub periods: Vec<PeriodMeta>,
    pub start_time: String,
    pub end_time: String,
}

pub type LessonsResponse = Response<Vec<Lesson>, LessonsMeta>;

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BadgeTeacher {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LessonPupilBehaviour {
    pub reason: String,
    pub score: i64,
    pub icon: String,
    pub polarity: String,
    pub timestamp: String,
    pub teacher: BadgeTeacher,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PupilEventLabel {
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PupilEvent {
    pub timestamp: String,
    pub lesson_pupil_behaviour: LessonPupilBehaviour,
    pub event: PupilEventLabel,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PupilBadge {
    pub pupil_event: PupilEvent,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub colour: String,
    pub created_date: String,
    pub pupil_badges: Vec<PupilBadge>,
    pub icon_url: String,
}

pub type BadgesResponse = Response<Vec<Badge>, EmptyMeta>;

// ---------------------------------------------------------------------------
// Detentions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetentionPupil {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// School visibility flags (`opt_notes_names`, ...) set to `yes` or `no`
    pub school: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetentionSubject {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetentionLesson {
    pub id: i64,
    pub name: String,
    pub subject: Option<DetentionSubject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetentionBehaviour {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetentionTeacher {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetentionType {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Detention {
    pub id: i64,
    /// `yes`, `no`, `upscaled` or `pending`
    pub attended: String,
    pub date: Option<String>,
    pub length: Option<i64>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub time: Option<String>,
    pub pupil: DetentionPupil,
    pub lesson: Option<DetentionLesson>,
    pub lesson_pupil_behaviour: DetentionBehaviour,
    pub teacher: Option<DetentionTeacher>,
    pub detention_type: Option<DetentionType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetentionsMeta {
    pub detention_alias_plural: String,
}

pub type DetentionsResponse = Response<Vec<Detention>, DetentionsMeta>;

// ---------------------------------------------------------------------------
// Announcements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnouncementConsent {
    /// `yes` or `no`
    pub consent_given: String,
    pub comment: Option<String>,
    pub parent_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnouncementPupil {
    pub id: Option<NumberOrString>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnouncementPupilConsent {
    pub pupil: AnnouncementPupil,
    pub can_change_consent: bool,
    pub consent: Option<AnnouncementConsent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnouncementAttachment {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub school_name: String,
    pub teacher_name: String,
    pub school_logo: Option<String>,
    pub sticky: String,
    pub state: Option<String>,
    pub timestamp: String,
    pub attachments: Vec<AnnouncementAttachment>,
    pub for_pupils: Vec<String>,
    pub comment_visibility: String,
    pub allow_comments: String,
    pub allow_reactions: String,
    pub allow_consent: String,
    pub priority_pinned: String,
    pub requires_consent: String,
    pub can_change_consent: bool,
    pub consent: Option<AnnouncementConsent>,
    pub pupil_consents: Vec<AnnouncementPupilConsent>,
}

pub type AnnouncementsResponse = Response<Vec<Announcement>, EmptyMeta>;

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttendancePeriod {
    pub code: String,
    /// `yes`, `present`, `ignore`, `no`, `absent`, `excused` or `late`
    pub status: String,
    pub late_minutes: Option<NumberOrString>,
    pub lesson_name: String,
    pub room_name: String,
}

/// Attendance keyed by date, then by session name
pub type AttendanceData = HashMap<String, HashMap<String, AttendancePeriod>>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttendanceMeta {
    pub dates: Vec<String>,
    pub sessions: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub percentage: String,
    /// Upstream spells it this way
    pub percentage_singe_august: String,
}

pub type AttendanceResponse = Response<AttendanceData, AttendanceMeta>;

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Reward {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub photo: String,
    pub price: i64,
    pub stock_control: bool,
    pub stock: i64,
    pub can_purchase: bool,
    pub unable_to_purchase_reason: String,
    pub once_per_pupil: bool,
    pub purchased: bool,
    pub purchased_count: Option<NumberOrString>,
    pub price_balance_difference: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RewardsMeta {
    pub pupil_score_balance: i64,
}

pub type RewardsResponse = Response<Vec<Reward>, RewardsMeta>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RewardPurchaseData {
    /// `yes` or `no`
    pub single_purchase: String,
    pub order_id: i64,
    pub balance: i64,
}

pub type RewardPurchaseResponse = Response<RewardPurchaseData, EmptyMeta>;

// ---------------------------------------------------------------------------
// Pupil fields, password, student code
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PupilField {
    pub id: i64,
    pub name: String,
    pub graphic: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PupilFieldsData {
    pub note: String,
    pub fields: Vec<PupilField>,
}

pub type PupilFieldsResponse = Response<PupilFieldsData, EmptyMeta>;

pub type ChangePasswordResponse = Response<serde_json::Value, EmptyMeta>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentCodeData {
    pub code: String,
}

pub type StudentCodeResponse = Response<StudentCodeData, EmptyMeta>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pupil_flattens_student_fields() {
        let json = r#"{"id": 12, "name": "Ada Lovelace", "school_name": "Analytical", "homework_todo_count": 3, "unknown": true}"#;
        let pupil: Pupil = serde_json::from_str(json).unwrap();

        assert_eq!(pupil.id(), 12);
        assert_eq!(pupil.name(), "Ada Lovelace");
        assert_eq!(pupil.school_name, "Analytical");
        assert_eq!(pupil.homework_todo_count, 3);
    }

    #[test]
    fn test_activity_last_id_forms() {
        let meta: ActivityMeta = serde_json::from_str(r#"{"last_id": 991}"#).unwrap();
        assert_eq!(meta.last_id, LastId::Id(991));

        let meta: ActivityMeta = serde_json::from_str(r#"{"last_id": false}"#).unwrap();
        assert_eq!(meta.last_id, LastId::Exhausted(false));
    }

    #[test]
    fn test_activity_point_renamed_fields() {
        let json = r#"{"id": 5, "type": "behaviour", "_can_delete": true, "polarity": null}"#;
        let point: ActivityPoint = serde_json::from_str(json).unwrap();

        assert_eq!(point.kind, "behaviour");
        assert!(point.can_delete);
        assert!(point.polarity.is_none());
    }

    #[test]
    fn test_empty_meta_accepts_list() {
        let response: BadgesResponse =
            serde_json::from_str(r#"{"success": 1, "data": [], "meta": []}"#).unwrap();

        assert_eq!(response.success, 1);
        assert!(response.data.is_empty());
        assert!(response.meta.is_array());
    }

    #[test]
    fn test_attendance_nested_maps() {
        let json = r#"{
            "success": 1,
            "data": {"2024-01-08": {"AM": {"code": "/", "status": "present", "late_minutes": 0},
                                    "PM": {"code": "L", "status": "late", "late_minutes": "12"}}},
            "meta": {"percentage": "96.5", "dates": ["2024-01-08"]}
        }"#;
        let response: AttendanceResponse = serde_json::from_str(json).unwrap();

        let day = &response.data["2024-01-08"];
        assert_eq!(day["AM"].late_minutes, Some(NumberOrString::Number(0)));
        assert_eq!(day["PM"].late_minutes, Some(NumberOrString::Text("12".to_string())));
        assert_eq!(response.meta.percentage, "96.5");
    }
}
