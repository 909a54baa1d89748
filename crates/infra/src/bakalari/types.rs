//! Wire payload types for the Bakaláři v3 API
//!
//! Every payload deserializes into explicit typed records - required fields
//! are plain, tolerated-missing fields are `Option` or defaulted, matching
//! the per-field policy of the transformer. Nothing is accessed as an untyped
//! map.

use serde::Deserialize;

/// Body of the `/api/login` response, success or failure.
///
/// Success carries the token triple; failure may carry OAuth `error` fields.
/// Everything is optional so one struct covers both shapes (and tolerates
/// non-JSON error pages via `Default`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginBody {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `GET /api/3/timetable/actual` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimetableResponse {
    /// Absent (not merely empty) when the payload is invalid; the transformer
    /// treats that as a fetch failure.
    pub hours: Option<Vec<Hour>>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub days: Vec<Day>,
}

/// One lesson slot of the daily grid (hour ids are numeric in the API).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Hour {
    pub id: i64,
    /// Wall-clock `HH:MM` (the API omits leading zeros, e.g. `"8:00"`).
    pub begin_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subject {
    pub id: String,
    pub abbrev: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Teacher {
    pub id: String,
    #[serde(default)]
    pub abbrev: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Room {
    pub id: String,
    pub abbrev: String,
    /// Full room name; often missing, in which case the abbreviation stands
    /// in.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub abbrev: String,
    pub name: String,
}

/// One timetable day with its scheduled atoms, in payload order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Day {
    /// ISO date, sometimes with a trailing time/offset part.
    pub date: String,
    #[serde(default)]
    pub atoms: Vec<Atom>,
}

/// One scheduled lesson slot referencing the lookup tables by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Atom {
    #[serde(default)]
    pub hour_id: i64,
    pub subject_id: Option<String>,
    pub teacher_id: Option<String>,
    pub room_id: Option<String>,
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub homework_ids: Vec<String>,
    pub theme: Option<String>,
    pub change: Option<Change>,
}

/// Change annotation on an atom (substitution, cancellation, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change {
    pub change_type: Option<String>,
    pub description: Option<String>,
}

/// `GET /api/3/homeworks` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeworksResponse {
    #[serde(rename = "Homeworks", default)]
    pub homeworks: Vec<Homework>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Homework {
    #[serde(rename = "ID")]
    pub id: String,
    pub subject: Option<SubjectRef>,
    pub content: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubjectRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    pub name: String,
    pub url: String,
}
