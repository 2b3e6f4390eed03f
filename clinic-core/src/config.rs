use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::event::EventStatus;

/// Key under which the event collection is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "hemo-clinic:calendar-events";

/// Tunables shared by the store, the calendar view and the live widgets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarConfig {
    pub storage_key: String,
    pub week_starts_on: WeekStart,
    pub transition_policy: TransitionPolicy,
    /// Refresh period of live machine telemetry.
    pub telemetry_interval_secs: u32,
    /// Maximum number of entries in "upcoming" lists.
    pub upcoming_limit: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            week_starts_on: WeekStart::Sunday,
            transition_policy: TransitionPolicy::Permissive,
            telemetry_interval_secs: 3,
            upcoming_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

/// How status changes are validated on update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may follow any other.
    #[default]
    Permissive,
    /// Only moves listed by [`EventStatus::can_transition_to`].
    Strict,
}

impl TransitionPolicy {
    pub fn allows(self, from: EventStatus, to: EventStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => from.can_transition_to(to),
        }
    }
}
