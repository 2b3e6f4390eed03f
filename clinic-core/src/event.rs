//! Calendar event record and its classification enums.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

/// Doctor id meaning "every member of staff".
pub const BROADCAST_DOCTOR_ID: &str = "all";

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum! {
    /// What kind of occurrence an event is.
    EventType {
        Hemodialysis => "hemodialysis",
        Consultation => "consultation",
        FollowUp => "follow-up",
        Emergency => "emergency",
        Maintenance => "maintenance",
        Meeting => "meeting",
        PerformanceReview => "performance-review",
        Training => "training",
    }
}

labelled_enum! {
    /// Lifecycle state of an event.
    EventStatus {
        Scheduled => "scheduled",
        InProgress => "in-progress",
        Completed => "completed",
        Cancelled => "cancelled",
        Rescheduled => "rescheduled",
    }
}

labelled_enum! {
    /// Ordered from least to most urgent.
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

impl EventType {
    /// Background and text colour used when an event carries no explicit colour.
    pub fn default_colors(self) -> (&'static str, &'static str) {
        let background = match self {
            EventType::Hemodialysis => "#3b82f6",
            EventType::Consultation => "#10b981",
            EventType::FollowUp => "#8b5cf6",
            EventType::Emergency => "#ef4444",
            EventType::Maintenance => "#f59e0b",
            EventType::Meeting => "#6366f1",
            EventType::PerformanceReview => "#ec4899",
            EventType::Training => "#14b8a6",
        };
        (background, "#ffffff")
    }
}

impl EventStatus {
    /// Completed and cancelled events accept no further status change under the strict policy.
    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }

    /// Transition table of the strict policy. Writing the same status again is always allowed.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;

        if self == next {
            return true;
        }

        match self {
            Scheduled => matches!(next, InProgress | Cancelled | Rescheduled),
            InProgress => matches!(next, Completed | Cancelled),
            Rescheduled => matches!(next, Scheduled | InProgress | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

/// One scheduled occurrence on the clinic calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub status: EventStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub notes: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub color: String,
    pub text_color: String,
}

impl CalendarEvent {
    /// Creates a scheduled, medium priority event coloured after its type.
    ///
    /// `created_at` and `updated_at` start at the UTC instant of `start_time`
    /// until [`CalendarEvent::created`] stamps the real authoring time.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        event_type: EventType,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
    ) -> Self {
        let (color, text_color) = event_type.default_colors();
        let stamp = start_time.with_timezone(&Utc);
        Self {
            id: id.into(),
            title: title.into(),
            start_time,
            end_time,
            event_type,
            status: EventStatus::Scheduled,
            priority: Priority::Medium,
            patient_id: None,
            patient_name: None,
            doctor_id: None,
            doctor_name: None,
            room: None,
            equipment: Vec::new(),
            notes: String::new(),
            created_by: String::from("system"),
            created_at: stamp,
            updated_at: stamp,
            color: color.to_string(),
            text_color: text_color.to_string(),
        }
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_patient(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.patient_id = Some(id.into());
        self.patient_name = Some(name.into());
        self
    }

    pub fn with_doctor(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.doctor_id = Some(id.into());
        self.doctor_name = Some(name.into());
        self
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_equipment<I, S>(mut self, equipment: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.equipment = equipment.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Stamps the author and sets both created and updated timestamps.
    pub fn created(mut self, by: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.created_by = by.into();
        self.created_at = at;
        self.updated_at = at;
        self
    }

    pub fn has_valid_range(&self) -> bool {
        self.start_time <= self.end_time
    }

    /// True for staff-wide events addressed to every doctor.
    pub fn is_broadcast(&self) -> bool {
        self.doctor_id.as_deref() == Some(BROADCAST_DOCTOR_ID)
    }

    /// Merges every field present in `patch`. Timestamps are left to the caller.
    pub fn apply(&mut self, patch: EventPatch) {
        let EventPatch {
            title,
            start_time,
            end_time,
            event_type,
            status,
            priority,
            patient_id,
            patient_name,
            doctor_id,
            doctor_name,
            room,
            equipment,
            notes,
            color,
            text_color,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(start_time) = start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = end_time {
            self.end_time = end_time;
        }
        if let Some(event_type) = event_type {
            self.event_type = event_type;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if patient_id.is_some() {
            self.patient_id = patient_id;
        }
        if patient_name.is_some() {
            self.patient_name = patient_name;
        }
        if doctor_id.is_some() {
            self.doctor_id = doctor_id;
        }
        if doctor_name.is_some() {
            self.doctor_name = doctor_name;
        }
        if room.is_some() {
            self.room = room;
        }
        if let Some(equipment) = equipment {
            self.equipment = equipment;
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }
        if let Some(color) = color {
            self.color = color;
        }
        if let Some(text_color) = text_color {
            self.text_color = text_color;
        }
    }
}

/// Partial update of a [`CalendarEvent`]. Absent fields stay untouched.
///
/// Identity and authorship (`id`, `createdBy`, `createdAt`) are not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub priority: Option<Priority>,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub room: Option<String>,
    pub equipment: Option<Vec<String>>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
}

impl EventPatch {
    pub fn status(status: EventStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn serializes_with_camel_case_keys_and_kebab_case_values() {
        let event = CalendarEvent::new("3", "Hypotension episode", EventType::FollowUp, at(14, 15), at(15, 0))
            .with_status(EventStatus::InProgress)
            .with_doctor("D001", "Dr. Sarah Chen");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "follow-up");
        assert_eq!(value["status"], "in-progress");
        assert_eq!(value["doctorId"], "D001");
        assert_eq!(value["startTime"], "2026-10-19T14:15:00+07:00");
        assert!(value.get("patientId").is_none());
        assert_eq!(value["equipment"], serde_json::json!([]));
    }

    #[test]
    fn parses_labels_case_sensitively() {
        assert_eq!("performance-review".parse::<EventType>(), Ok(EventType::PerformanceReview));
        assert_eq!(" critical ".parse::<Priority>(), Ok(Priority::Critical));

        let err = "Emergency".parse::<EventType>().unwrap_err();
        assert_eq!(err.kind, "EventType");
        assert_eq!(err.value, "Emergency");
    }

    #[test]
    fn priorities_are_ordered_by_urgency() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Critical);
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut event = CalendarEvent::new("1", "Dialysis", EventType::Hemodialysis, at(8, 0), at(12, 0))
            .with_room("Dialysis Bay 1")
            .with_notes("Bring fistula report");

        event.apply(EventPatch {
            priority: Some(Priority::High),
            room: Some("Dialysis Bay 3".to_string()),
            ..EventPatch::default()
        });

        assert_eq!(event.priority, Priority::High);
        assert_eq!(event.room.as_deref(), Some("Dialysis Bay 3"));
        assert_eq!(event.notes, "Bring fistula report");
        assert_eq!(event.title, "Dialysis");
    }

    #[test]
    fn strict_table_keeps_terminal_states_closed() {
        assert!(EventStatus::Scheduled.can_transition_to(EventStatus::InProgress));
        assert!(EventStatus::InProgress.can_transition_to(EventStatus::Completed));
        assert!(!EventStatus::Scheduled.can_transition_to(EventStatus::Completed));
        assert!(!EventStatus::Completed.can_transition_to(EventStatus::Scheduled));
        assert!(EventStatus::Cancelled.can_transition_to(EventStatus::Cancelled));
    }

    #[test]
    fn broadcast_detection_uses_sentinel() {
        let meeting = CalendarEvent::new("5", "Staff meeting", EventType::Meeting, at(16, 0), at(17, 0))
            .with_doctor(BROADCAST_DOCTOR_ID, "All Staff");
        assert!(meeting.is_broadcast());
    }
}
