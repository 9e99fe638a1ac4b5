//! The calendar event record and its validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::time::{CanonicalTime, EventTime, Normalizer};

/// Where an event's canonical copy lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    #[default]
    Local,
    Remote,
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start_time: EventTime,
    pub end_time: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: EventSource,
    /// Id of the mirrored copy on the remote calendar, once there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

/// Fields supplied when creating an event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub start_time: EventTime,
    pub end_time: EventTime,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, start_time: EventTime, end_time: EventTime) -> Self {
        NewEvent {
            title: title.into(),
            start_time,
            end_time,
            description: None,
            location: None,
            attendees: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_attendees<I, S>(mut self, attendees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees = attendees.into_iter().map(Into::into).collect();
        self
    }

    /// Run the checks [`CalendarEvent::create`] would, without building the
    /// event.
    pub fn validate(&self, normalizer: &Normalizer) -> Result<(), ValidationError> {
        check_fields(&self.title, &self.start_time, &self.end_time, normalizer)
    }
}

/// A partial update. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start_time: Option<EventTime>,
    pub end_time: Option<EventTime>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }
}

impl CalendarEvent {
    /// Validate `fields` and build a new local event with a fresh id.
    pub fn create(
        fields: NewEvent,
        normalizer: &Normalizer,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let event = CalendarEvent {
            id: Uuid::new_v4().to_string(),
            title: fields.title.trim().to_string(),
            start_time: fields.start_time,
            end_time: fields.end_time,
            description: fields.description,
            location: fields.location,
            attendees: dedup_attendees(fields.attendees),
            created_at: now,
            updated_at: None,
            source: EventSource::Local,
            remote_id: None,
        };
        event.validate(normalizer)?;
        Ok(event)
    }

    /// Overlay `patch` on a copy of this event and validate the whole result.
    ///
    /// The id never changes. `updated_at` is stamped with `now`, clamped so it
    /// is never earlier than `created_at`.
    pub fn patched(
        &self,
        patch: &EventPatch,
        normalizer: &Normalizer,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let mut next = self.clone();

        if let Some(title) = &patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(start) = &patch.start_time {
            next.start_time = start.clone();
        }
        if let Some(end) = &patch.end_time {
            next.end_time = end.clone();
        }
        if let Some(description) = &patch.description {
            next.description = Some(description.clone());
        }
        if let Some(location) = &patch.location {
            next.location = Some(location.clone());
        }
        if let Some(attendees) = &patch.attendees {
            next.attendees = dedup_attendees(attendees.clone());
        }

        next.updated_at = Some(now.max(self.created_at));
        next.validate(normalizer)?;
        Ok(next)
    }

    /// Check the structural invariants: non-empty title, readable bounds,
    /// and `start_time < end_time`.
    pub fn validate(&self, normalizer: &Normalizer) -> Result<(), ValidationError> {
        check_fields(&self.title, &self.start_time, &self.end_time, normalizer)
    }

    pub fn start(&self, normalizer: &Normalizer) -> CanonicalTime {
        normalizer.normalize(&self.start_time)
    }

    pub fn end(&self, normalizer: &Normalizer) -> CanonicalTime {
        normalizer.normalize(&self.end_time)
    }

    pub fn is_remote(&self) -> bool {
        self.source == EventSource::Remote
    }
}

fn check_fields(
    title: &str,
    start_time: &EventTime,
    end_time: &EventTime,
    normalizer: &Normalizer,
) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    let (start, end) = match (normalizer.normalize(start_time), normalizer.normalize(end_time)) {
        (CanonicalTime::At(s), CanonicalTime::At(e)) => (s, e),
        (CanonicalTime::Unknown, _) => {
            return Err(ValidationError::InvalidTimestamp(start_time.to_string()));
        }
        (_, CanonicalTime::Unknown) => {
            return Err(ValidationError::InvalidTimestamp(end_time.to_string()));
        }
    };

    if end <= start {
        return Err(ValidationError::InvalidTimeOrder);
    }

    Ok(())
}

/// Remove blank and repeated attendees, keeping first-seen order.
fn dedup_attendees(attendees: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(attendees.len());
    for a in attendees {
        let a = a.trim().to_string();
        if !a.is_empty() && !seen.iter().any(|s| s.eq_ignore_ascii_case(&a)) {
            seen.push(a);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn fields(title: &str, start: &str, end: &str) -> NewEvent {
        NewEvent::new(title, EventTime::parse(start), EventTime::parse(end))
    }

    #[test]
    fn test_create_assigns_id_and_created_at() {
        let n = Normalizer::utc();
        let event = CalendarEvent::create(
            fields("  Standup ", "2025-06-02T09:00:00", "2025-06-02T09:15:00"),
            &n,
            now(),
        )
        .expect("Should create");

        assert!(!event.id.is_empty());
        assert_eq!(event.title, "Standup");
        assert_eq!(event.created_at, now());
        assert_eq!(event.updated_at, None);
        assert_eq!(event.source, EventSource::Local);
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let n = Normalizer::utc();
        let err = CalendarEvent::create(
            fields("   ", "2025-06-02T09:00:00", "2025-06-02T10:00:00"),
            &n,
            now(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingTitle);
    }

    #[test]
    fn test_create_rejects_equal_and_reversed_times() {
        let n = Normalizer::utc();
        for (start, end) in [
            ("2025-06-02T09:00:00", "2025-06-02T09:00:00"),
            ("2025-06-02T10:00:00", "2025-06-02T09:00:00"),
            // Same instant written two ways is still zero-length.
            ("2025-06-02T09:00:00Z", "2025-06-02T11:00:00+02:00"),
        ] {
            let err = CalendarEvent::create(fields("Bad", start, end), &n, now()).unwrap_err();
            assert_eq!(err, ValidationError::InvalidTimeOrder, "{start} -> {end}");
        }
    }

    #[test]
    fn test_new_event_validate_matches_create() {
        let n = Normalizer::utc();
        assert!(fields("Ok", "2025-06-02T09:00:00", "2025-06-02T10:00:00").validate(&n).is_ok());
        assert_eq!(
            fields("Bad", "2025-06-02T12:00:00", "2025-06-02T11:00:00").validate(&n),
            Err(ValidationError::InvalidTimeOrder)
        );
        assert_eq!(
            fields(" ", "2025-06-02T09:00:00", "2025-06-02T10:00:00").validate(&n),
            Err(ValidationError::MissingTitle)
        );
    }

    #[test]
    fn test_create_rejects_unreadable_time() {
        let n = Normalizer::utc();
        let err = CalendarEvent::create(fields("X", "tomorrow-ish", "2025-06-02T09:00:00"), &n, now())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_patch_validates_merged_record() {
        let n = Normalizer::utc();
        let event = CalendarEvent::create(
            fields("A", "2025-06-02T10:00:00", "2025-06-02T11:00:00"),
            &n,
            now(),
        )
        .unwrap();

        // Moving only the end before the existing start must fail.
        let patch = EventPatch {
            end_time: Some(EventTime::parse("2025-06-02T09:30:00")),
            ..Default::default()
        };
        assert_eq!(
            event.patched(&patch, &n, now()).unwrap_err(),
            ValidationError::InvalidTimeOrder
        );

        let patch = EventPatch {
            title: Some("".into()),
            ..Default::default()
        };
        assert_eq!(
            event.patched(&patch, &n, now()).unwrap_err(),
            ValidationError::MissingTitle
        );
    }

    #[test]
    fn test_patch_keeps_id_and_stamps_updated_at() {
        let n = Normalizer::utc();
        let event = CalendarEvent::create(
            fields("A", "2025-06-02T10:00:00", "2025-06-02T11:00:00"),
            &n,
            now(),
        )
        .unwrap();
        let later = now() + chrono::Duration::minutes(5);
        let patch = EventPatch {
            location: Some("Room 4".into()),
            ..Default::default()
        };
        let updated = event.patched(&patch, &n, later).unwrap();
        assert_eq!(updated.id, event.id);
        assert_eq!(updated.location.as_deref(), Some("Room 4"));
        assert_eq!(updated.updated_at, Some(later));

        // A clock that went backwards never produces updated_at < created_at.
        let earlier = now() - chrono::Duration::hours(1);
        let updated = event.patched(&patch, &n, earlier).unwrap();
        assert!(updated.updated_at.unwrap() >= updated.created_at);
    }

    #[test]
    fn test_attendees_deduplicated_in_order() {
        let n = Normalizer::utc();
        let event = CalendarEvent::create(
            fields("Sync", "2025-06-02T10:00:00", "2025-06-02T11:00:00").with_attendees([
                "bob@example.com",
                " alice@example.com",
                "BOB@example.com",
                "",
            ]),
            &n,
            now(),
        )
        .unwrap();
        assert_eq!(event.attendees, vec!["bob@example.com", "alice@example.com"]);
    }

    #[test]
    fn test_source_defaults_to_local_when_missing() {
        let json = r#"{
            "id": "abc",
            "title": "Old record",
            "start_time": "2025-06-02T10:00:00",
            "end_time": "2025-06-02T11:00:00",
            "created_at": "2025-06-01T08:00:00Z"
        }"#;
        let event: CalendarEvent = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(event.source, EventSource::Local);
        assert!(event.attendees.is_empty());
        assert_eq!(event.remote_id, None);
    }
}
