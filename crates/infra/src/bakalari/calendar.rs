//! Timetable-to-calendar build worker
//!
//! Orchestrates the per-user calendar build: refresh the credential, fetch
//! "this school week" and "next school week", resolve the payload's
//! foreign-key-style references, merge homework, and emit calendar events.

use std::collections::HashMap;

use bakasync_core::CredentialSession;
use bakasync_domain::constants::{
    UNKNOWN_LOCATION_PLACEHOLDER, UNKNOWN_ROOM_PLACEHOLDER, UNKNOWN_TEACHER_PLACEHOLDER,
};
use bakasync_domain::time::{roll_weekend_forward, school_week_bounds};
use bakasync_domain::{BakasyncError, Calendar, CalendarEvent, Result, SyncSettings};
use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use super::client::BakalariClient;
use super::types::{Atom, Group, HomeworksResponse, Hour, Room, Subject, Teacher, TimetableResponse};

/// Calendar build worker
pub struct CalendarBuildWorker {
    client: BakalariClient,
    settings: SyncSettings,
    tz: Tz,
}

impl CalendarBuildWorker {
    /// Create a worker for the configured time zone and calendar metadata.
    ///
    /// # Errors
    /// Returns `Config` if the configured time zone is unknown.
    pub fn new(client: BakalariClient, settings: SyncSettings) -> Result<Self> {
        let tz = settings.timezone.parse::<Tz>().map_err(|_| {
            BakasyncError::Config(format!("unknown time zone: {}", settings.timezone))
        })?;
        Ok(Self { client, settings, tz })
    }

    /// Build the two-week calendar for the session's user.
    ///
    /// Today is computed in the configured zone and rolled forward to Monday
    /// when it falls on a weekend; events are then fetched for that window
    /// and for the one seven days later, as two separate calls.
    ///
    /// # Errors
    /// Any vault/lifecycle error and any timetable fetch failure aborts the
    /// whole build - a partial calendar is never returned.
    pub async fn build_calendar(&self, session: &CredentialSession) -> Result<Calendar> {
        session.ensure_fresh().await?;

        let mut calendar = Calendar::new(
            self.settings.calendar_name.clone(),
            self.settings.calendar_description.clone(),
            self.settings.timezone.clone(),
        );

        let today = Utc::now().with_timezone(&self.tz).date_naive();
        let window_start = roll_weekend_forward(today);

        self.fetch_events(session, window_start, &mut calendar).await?;
        self.fetch_events(session, window_start + Duration::days(7), &mut calendar).await?;

        debug!(events = calendar.len(), "calendar build finished");
        Ok(calendar)
    }

    /// Fetch one week's timetable and append its events to the calendar.
    async fn fetch_events(
        &self,
        session: &CredentialSession,
        window_start: NaiveDate,
        calendar: &mut Calendar,
    ) -> Result<()> {
        let credential = session.credential().await;
        let timetable = self
            .client
            .fetch_timetable(&credential.endpoint_url, &credential.access_token, window_start)
            .await?;

        if timetable.hours.is_none() {
            return Err(BakasyncError::FetchFailure(
                "timetable response is missing its Hours section".into(),
            ));
        }

        let lookups = Lookups::build(&timetable);
        // Homework is fetched lazily, at most once per window, and only if
        // some atom actually references it.
        let mut homework: Option<HomeworksResponse> = None;

        for day in &timetable.days {
            let Some(date) = parse_day_date(&day.date) else {
                warn!(date = %day.date, "skipping day with unparseable date");
                continue;
            };

            for atom in &day.atoms {
                if !atom_produces_event(atom) {
                    continue;
                }

                if !atom.homework_ids.is_empty() && homework.is_none() {
                    let (from, to) = school_week_bounds(window_start);
                    homework = Some(
                        self.client
                            .fetch_homeworks(
                                &credential.endpoint_url,
                                &credential.access_token,
                                from,
                                to,
                            )
                            .await?,
                    );
                }

                if let Some(event) = build_event(atom, date, &lookups, homework.as_ref(), self.tz)
                {
                    calendar.create_event(event);
                }
            }
        }

        Ok(())
    }
}

/// ID → entity lookup tables built from the payload's parallel lists.
struct Lookups<'a> {
    hours: HashMap<i64, &'a Hour>,
    subjects: HashMap<&'a str, &'a Subject>,
    teachers: HashMap<&'a str, &'a Teacher>,
    rooms: HashMap<&'a str, &'a Room>,
    groups: HashMap<&'a str, &'a Group>,
}

impl<'a> Lookups<'a> {
    fn build(timetable: &'a TimetableResponse) -> Self {
        Self {
            hours: timetable
                .hours
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|h| (h.id, h))
                .collect(),
            subjects: timetable.subjects.iter().map(|s| (s.id.as_str(), s)).collect(),
            teachers: timetable.teachers.iter().map(|t| (t.id.as_str(), t)).collect(),
            rooms: timetable.rooms.iter().map(|r| (r.id.as_str(), r)).collect(),
            groups: timetable.groups.iter().map(|g| (g.id.as_str(), g)).collect(),
        }
    }
}

/// Whether an atom survives the skip rules.
///
/// Atoms without a subject and lessons removed or cancelled by a change never
/// produce events.
fn atom_produces_event(atom: &Atom) -> bool {
    let has_subject = atom.subject_id.as_deref().is_some_and(|id| !id.is_empty());
    let cancelled = atom
        .change
        .as_ref()
        .and_then(|change| change.change_type.as_deref())
        .is_some_and(|kind| matches!(kind, "Removed" | "Canceled"));
    has_subject && !cancelled
}

/// Build one calendar event from a surviving atom.
///
/// Returns `None` when the hour or subject reference does not resolve or the
/// wall-clock times cannot be placed in the zone - data-quality tolerance,
/// not an error.
fn build_event(
    atom: &Atom,
    date: NaiveDate,
    lookups: &Lookups<'_>,
    homework: Option<&HomeworksResponse>,
    tz: Tz,
) -> Option<CalendarEvent> {
    let subject_id = atom.subject_id.as_deref()?;
    let Some(hour) = lookups.hours.get(&atom.hour_id).copied() else {
        warn!(hour_id = atom.hour_id, "skipping atom with unresolved hour reference");
        return None;
    };
    let Some(subject) = lookups.subjects.get(subject_id).copied() else {
        warn!(subject_id, "skipping atom with unresolved subject reference");
        return None;
    };

    let start = local_timestamp(date, &hour.begin_time, tz)?;
    let end = local_timestamp(date, &hour.end_time, tz)?;

    let teacher = atom.teacher_id.as_deref().and_then(|id| lookups.teachers.get(id)).copied();
    let room = atom.room_id.as_deref().and_then(|id| lookups.rooms.get(id)).copied();

    // Group roster line, then the change line, exactly in that order.
    let mut group_info = String::new();
    if !atom.group_ids.is_empty() {
        let names: Vec<String> = atom
            .group_ids
            .iter()
            .map(|id| {
                lookups.groups.get(id.as_str()).map_or_else(|| id.clone(), |g| g.name.clone())
            })
            .collect();
        group_info.push_str(&format!("Skupina: {}\n", names.join(", ")));
    }

    let mut icon = String::new();
    if let Some(change) = &atom.change {
        if let Some(kind) = change.change_type.as_deref() {
            group_info
                .push_str(&format!("Změna: {}\n", change.description.as_deref().unwrap_or("")));
            icon.push_str(match kind {
                "Added" => "➕",
                "Substitution" => "⚠️",
                "RoomChanged" => "🚪",
                _ => "",
            });
        }
    }

    let teacher_name = teacher.map_or(UNKNOWN_TEACHER_PLACEHOLDER, |t| t.name.as_str());
    let mut description = format!(
        "{}\n{}Učitel: {}\n{}",
        subject.name,
        group_info,
        teacher_name,
        atom.theme.as_deref().unwrap_or("")
    );

    let mut attachments = Vec::new();
    if !atom.homework_ids.is_empty() {
        // The marker goes after any change icon so a changed lesson still
        // leads with its change.
        icon.push_str("📝");

        for homework_id in &atom.homework_ids {
            let Some(item) =
                homework.and_then(|h| h.homeworks.iter().find(|hw| &hw.id == homework_id))
            else {
                continue;
            };

            let subject_name =
                item.subject.as_ref().and_then(|s| s.name.as_deref()).unwrap_or("");
            description.push_str(&format!(
                "\n---\n📝 Úkol: {}\nZadání: {}\nOd: {}\nDo: {}\n",
                subject_name,
                item.content.as_deref().unwrap_or(""),
                item.date_start.as_deref().unwrap_or(""),
                item.date_end.as_deref().unwrap_or("")
            ));

            if !item.attachments.is_empty() {
                let names: Vec<&str> =
                    item.attachments.iter().map(|a| a.name.as_str()).collect();
                description.push_str(&format!("Přílohy: {}\n", names.join(", ")));
                attachments.extend(item.attachments.iter().map(|a| a.url.clone()));
            }
        }
    }

    let room_abbrev = room.map_or(UNKNOWN_ROOM_PLACEHOLDER, |r| r.abbrev.as_str());
    let summary = format!("{icon}{} ({room_abbrev})", subject.abbrev);

    let location = room.map_or_else(
        || UNKNOWN_LOCATION_PLACEHOLDER.to_string(),
        |r| match r.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => r.abbrev.clone(),
        },
    );

    Some(CalendarEvent { start, end, summary, description, location, attachments })
}

/// Combine a day's date with a wall-clock `HH:MM` in the given zone.
///
/// An ambiguous local time (DST fall-back) resolves to the earlier instant; a
/// nonexistent one (spring-forward gap) skips the atom.
fn local_timestamp(date: NaiveDate, wall_clock: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let (hours, minutes) = wall_clock.split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let naive = date.and_hms_opt(hours, minutes, 0)?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
        LocalResult::None => {
            warn!(%naive, "skipping atom whose wall-clock time does not exist in the zone");
            None
        }
    }
}

/// Day dates arrive either bare (`2025-01-13`) or with a time/offset suffix;
/// only the date part matters.
fn parse_day_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    //! Unit tests for bakalari::calendar.
    use chrono_tz::Europe::Prague;
    use serde_json::json;

    use super::super::types::Change;
    use super::*;

    fn timetable_fixture() -> TimetableResponse {
        serde_json::from_value(json!({
            "Hours": [
                {"Id": 1, "BeginTime": "8:00", "EndTime": "8:45"},
                {"Id": 2, "BeginTime": "8:55", "EndTime": "9:40"}
            ],
            "Subjects": [{"Id": "MAT", "Abbrev": "MAT", "Name": "Matematika"}],
            "Teachers": [{"Id": "T1", "Abbrev": "Nv", "Name": "Jana Nováková"}],
            "Rooms": [{"Id": "R1", "Abbrev": "12A", "Name": "Učebna 12A"}],
            "Groups": [{"Id": "G1", "Abbrev": "1.A", "Name": "Celá třída"}],
            "Days": []
        }))
        .unwrap()
    }

    fn base_atom() -> Atom {
        serde_json::from_value(json!({
            "HourId": 1,
            "SubjectId": "MAT",
            "TeacherId": "T1",
            "RoomId": "R1",
            "GroupIds": [],
            "HomeworkIds": []
        }))
        .unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
    }

    fn change(kind: &str) -> Change {
        Change { change_type: Some(kind.to_string()), description: Some("Suplování".to_string()) }
    }

    /// Validates `atom_produces_event` behavior for the skip rules scenario.
    ///
    /// Assertions:
    /// - Ensures removed, cancelled, and subject-less atoms produce nothing.
    /// - Confirms a substituted lesson still produces an event.
    #[test]
    fn removed_and_cancelled_atoms_are_skipped() {
        let mut atom = base_atom();
        assert!(atom_produces_event(&atom));

        atom.change = Some(change("Removed"));
        assert!(!atom_produces_event(&atom));

        atom.change = Some(change("Canceled"));
        assert!(!atom_produces_event(&atom));

        atom.change = Some(change("Substitution"));
        assert!(atom_produces_event(&atom));

        atom.subject_id = None;
        assert!(!atom_produces_event(&atom));

        atom.subject_id = Some(String::new());
        assert!(!atom_produces_event(&atom));
    }

    /// Validates `build_event` behavior for the plain lesson scenario.
    ///
    /// Assertions:
    /// - Confirms the `ABBREV (room)` summary with no icon.
    /// - Confirms start/end are the Prague wall-clock times in UTC.
    /// - Confirms the location is the room's full name.
    #[test]
    fn plain_lesson_builds_expected_event() {
        let timetable = timetable_fixture();
        let lookups = Lookups::build(&timetable);

        let event = build_event(&base_atom(), monday(), &lookups, None, Prague).unwrap();

        assert_eq!(event.summary, "MAT (12A)");
        assert_eq!(event.location, "Učebna 12A");
        // January Prague is UTC+1.
        assert_eq!(event.start, Utc.with_ymd_and_hms(2025, 1, 13, 7, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2025, 1, 13, 7, 45, 0).unwrap());
        assert!(event.description.contains("Matematika"));
        assert!(event.description.contains("Učitel: Jana Nováková"));
        assert!(event.attachments.is_empty());
    }

    /// Validates `build_event` behavior for the change icon scenario.
    ///
    /// Assertions:
    /// - Confirms ⚠️/➕/🚪 lead the summary per change type and the change
    ///   description lands in the body.
    #[test]
    fn change_types_pick_their_icons() {
        let timetable = timetable_fixture();
        let lookups = Lookups::build(&timetable);

        for (kind, icon) in [("Substitution", "⚠️"), ("Added", "➕"), ("RoomChanged", "🚪")] {
            let mut atom = base_atom();
            atom.change = Some(change(kind));

            let event = build_event(&atom, monday(), &lookups, None, Prague).unwrap();
            assert!(
                event.summary.starts_with(icon),
                "{kind} summary should start with {icon}: {}",
                event.summary
            );
            assert!(event.description.contains("Změna: Suplování"));
        }
    }

    /// Validates `build_event` behavior for the unresolved reference
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures a dangling hour or subject reference skips the atom.
    /// - Ensures a dangling teacher/room degrades to placeholders instead.
    #[test]
    fn unresolved_references_degrade_per_policy() {
        let timetable = timetable_fixture();
        let lookups = Lookups::build(&timetable);

        let mut atom = base_atom();
        atom.hour_id = 99;
        assert!(build_event(&atom, monday(), &lookups, None, Prague).is_none());

        let mut atom = base_atom();
        atom.subject_id = Some("GHOST".to_string());
        assert!(build_event(&atom, monday(), &lookups, None, Prague).is_none());

        let mut atom = base_atom();
        atom.teacher_id = Some("GHOST".to_string());
        atom.room_id = None;
        let event = build_event(&atom, monday(), &lookups, None, Prague).unwrap();
        assert_eq!(event.summary, "MAT (???)");
        assert_eq!(event.location, "Unknown location");
        assert!(event.description.contains("Učitel: ???"));
    }

    /// Validates `build_event` behavior for the group roster scenario.
    ///
    /// Assertions:
    /// - Confirms resolved groups use their names and unresolved ones fall
    ///   back to the raw id.
    #[test]
    fn group_names_fall_back_to_raw_ids() {
        let timetable = timetable_fixture();
        let lookups = Lookups::build(&timetable);

        let mut atom = base_atom();
        atom.group_ids = vec!["G1".to_string(), "G9".to_string()];

        let event = build_event(&atom, monday(), &lookups, None, Prague).unwrap();
        assert!(event.description.contains("Skupina: Celá třída, G9\n"));
    }

    /// Validates `build_event` behavior for the homework merge scenario.
    ///
    /// Assertions:
    /// - Confirms one resolvable id out of two yields exactly one homework
    ///   block and only its attachments.
    /// - Confirms the 📝 marker sits after the change icon.
    #[test]
    fn homework_merges_only_resolvable_items() {
        let timetable = timetable_fixture();
        let lookups = Lookups::build(&timetable);

        let homework: HomeworksResponse = serde_json::from_value(json!({
            "Homeworks": [{
                "ID": "hw-1",
                "Subject": {"Name": "Matematika"},
                "Content": "Cvičení 5/3",
                "DateStart": "2025-01-13",
                "DateEnd": "2025-01-17",
                "Attachments": [{"Name": "zadani.pdf", "Url": "https://files.example.cz/zadani.pdf"}]
            }]
        }))
        .unwrap();

        let mut atom = base_atom();
        atom.homework_ids = vec!["hw-1".to_string(), "hw-missing".to_string()];
        atom.change = Some(change("Substitution"));

        let event = build_event(&atom, monday(), &lookups, Some(&homework), Prague).unwrap();

        assert!(event.summary.starts_with("⚠️📝"));
        assert_eq!(event.description.matches("📝 Úkol:").count(), 1);
        assert!(event.description.contains("Zadání: Cvičení 5/3"));
        assert!(event.description.contains("Přílohy: zadani.pdf"));
        assert_eq!(event.attachments, vec!["https://files.example.cz/zadani.pdf".to_string()]);
    }

    /// Validates `local_timestamp` behavior for the wall-clock parsing
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms leading-zero-less times parse and convert through the zone.
    /// - Ensures malformed times yield `None`.
    #[test]
    fn wall_clock_times_parse_through_the_zone() {
        let date = monday();

        let instant = local_timestamp(date, "8:00", Prague).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 1, 13, 7, 0, 0).unwrap());

        // Summer date: Prague is UTC+2.
        let summer = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let instant = local_timestamp(summer, "8:00", Prague).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 6, 16, 6, 0, 0).unwrap());

        assert!(local_timestamp(date, "8", Prague).is_none());
        assert!(local_timestamp(date, "25:00", Prague).is_none());
    }

    /// Validates `parse_day_date` behavior for the date format scenario.
    ///
    /// Assertions:
    /// - Confirms bare dates and offset-suffixed dates both parse.
    #[test]
    fn day_dates_parse_with_or_without_suffix() {
        assert_eq!(parse_day_date("2025-01-13"), Some(monday()));
        assert_eq!(parse_day_date("2025-01-13T00:00:00+01:00"), Some(monday()));
        assert_eq!(parse_day_date("nonsense"), None);
    }
}
