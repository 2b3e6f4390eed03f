//! Pure selection helpers over event collections.
//!
//! Date windows compare the *local* calendar date of `start_time` in the
//! caller's time zone, so an event starting at 23:30 belongs to that day even
//! if it runs past midnight.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{CalendarEvent, EventStatus, EventType, Priority, BROADCAST_DOCTOR_ID};

/// Per-field allow lists. An empty list places no restriction on its field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilter {
    pub types: Vec<EventType>,
    pub statuses: Vec<EventStatus>,
    pub priorities: Vec<Priority>,
    /// Doctor ids.
    pub doctors: Vec<String>,
    pub rooms: Vec<String>,
    /// Case-insensitive text search over title, notes, patient and doctor names.
    pub query: String,
}

impl EventFilter {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.statuses.is_empty()
            && self.priorities.is_empty()
            && self.doctors.is_empty()
            && self.rooms.is_empty()
            && self.query.trim().is_empty()
    }

    /// Logical AND across fields, OR within each field's list.
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        allowed(&self.types, &event.event_type)
            && allowed(&self.statuses, &event.status)
            && allowed(&self.priorities, &event.priority)
            && allowed_optional(&self.doctors, event.doctor_id.as_deref())
            && allowed_optional(&self.rooms, event.room.as_deref())
            && matches_query(&self.query, event)
    }

    /// Adds `value` to the list when missing, removes it otherwise.
    pub fn toggle<T: PartialEq>(list: &mut Vec<T>, value: T) {
        if let Some(position) = list.iter().position(|item| *item == value) {
            list.remove(position);
        } else {
            list.push(value);
        }
    }
}

fn allowed<T: PartialEq>(set: &[T], value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

fn allowed_optional(set: &[String], value: Option<&str>) -> bool {
    set.is_empty() || value.is_some_and(|value| set.iter().any(|item| item == value))
}

fn matches_query(query: &str, event: &CalendarEvent) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    [
        Some(event.title.as_str()),
        Some(event.notes.as_str()),
        event.patient_name.as_deref(),
        event.doctor_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|text| text.to_lowercase().contains(&query))
}

/// Inclusive range of local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DateWindow {
    pub fn day(day: NaiveDate) -> Self {
        Self {
            first: day,
            last: day,
        }
    }

    /// Seven days beginning at `start`.
    pub fn week(start: NaiveDate) -> Self {
        Self {
            first: start,
            last: start
                .checked_add_signed(Duration::days(6))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Whole calendar month; `None` for an invalid year/month pair.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            first,
            last: next.pred_opt()?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last;
        std::iter::successors(Some(self.first), |day| day.succ_opt())
            .take_while(move |day| *day <= last)
    }
}

/// Date on which `event` starts, as seen in `tz`.
pub fn local_start_date<Tz: TimeZone>(event: &CalendarEvent, tz: &Tz) -> NaiveDate {
    event.start_time.with_timezone(tz).date_naive()
}

pub fn filter_events<'a, I>(events: I, filter: &EventFilter) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    events
        .into_iter()
        .filter(|event| filter.matches(event))
        .collect()
}

/// Events addressed to `doctor_id` plus staff-wide broadcasts.
pub fn events_for_doctor<'a, I>(events: I, doctor_id: &str) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    events
        .into_iter()
        .filter(|event| {
            matches!(event.doctor_id.as_deref(), Some(id) if id == doctor_id || id == BROADCAST_DOCTOR_ID)
        })
        .collect()
}

pub fn events_in_window<'a, I, Tz>(events: I, window: DateWindow, tz: &Tz) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
    Tz: TimeZone,
{
    events
        .into_iter()
        .filter(|event| window.contains(local_start_date(event, tz)))
        .collect()
}

pub fn events_on_day<'a, I, Tz>(events: I, day: NaiveDate, tz: &Tz) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
    Tz: TimeZone,
{
    events_in_window(events, DateWindow::day(day), tz)
}

pub fn events_in_week<'a, I, Tz>(events: I, week_start: NaiveDate, tz: &Tz) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
    Tz: TimeZone,
{
    events_in_window(events, DateWindow::week(week_start), tz)
}

/// `month` is 1-based.
pub fn events_in_month<'a, I, Tz>(events: I, year: i32, month: u32, tz: &Tz) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
    Tz: TimeZone,
{
    events
        .into_iter()
        .filter(|event| {
            let date = local_start_date(event, tz);
            date.year() == year && date.month() == month
        })
        .collect()
}

/// Events starting in the half-open instant range `[from, to)`.
pub fn events_in_range<'a, I>(events: I, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    events
        .into_iter()
        .filter(|event| {
            let start = event.start_time.with_timezone(&Utc);
            from <= start && start < to
        })
        .collect()
}

/// Next `limit` events starting at or after `now`, soonest first.
pub fn upcoming_events<'a, I>(events: I, now: DateTime<Utc>, limit: usize) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    let mut upcoming: Vec<_> = events
        .into_iter()
        .filter(|event| event.start_time >= now)
        .collect();
    sort_by_start(&mut upcoming);
    upcoming.truncate(limit);
    upcoming
}

/// Stable sort by start instant, then id.
pub fn sort_by_start(events: &mut [&CalendarEvent]) {
    events.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
}
