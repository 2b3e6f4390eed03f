//! Calendar view-model: anchor date, granularity and filters in, visible events out.

use chrono::{Datelike, Duration, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::config::{CalendarConfig, WeekStart};
use crate::event::CalendarEvent;
use crate::query::{self, DateWindow, EventFilter};
use crate::store::Clock;

/// Width of the calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    #[default]
    Week,
    Month,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Day, ViewMode::Week, ViewMode::Month];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = crate::error::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            other => Err(crate::error::UnknownVariant {
                kind: "ViewMode",
                value: other.to_string(),
            }),
        }
    }
}

/// Navigation and derivation state of one calendar screen.
///
/// Nothing derived is cached: [`CalendarView::visible_events`] and
/// [`CalendarView::title`] are recomputed from the state on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView<Tz: TimeZone> {
    anchor: NaiveDate,
    mode: ViewMode,
    filter: EventFilter,
    doctor: Option<String>,
    loading: bool,
    week_start: WeekStart,
    tz: Tz,
}

impl<Tz: TimeZone> CalendarView<Tz> {
    pub fn new(anchor: NaiveDate, tz: Tz) -> Self {
        Self {
            anchor,
            mode: ViewMode::default(),
            filter: EventFilter::default(),
            doctor: None,
            loading: true,
            week_start: WeekStart::default(),
            tz,
        }
    }

    /// View anchored on the current local date.
    pub fn starting_today(clock: &dyn Clock, tz: Tz) -> Self {
        let today = clock.now().with_timezone(&tz).date_naive();
        Self::new(today, tz)
    }

    pub fn with_config(mut self, config: &CalendarConfig) -> Self {
        self.week_start = config.week_starts_on;
        self
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    /// Restricts the view to one doctor's events plus staff-wide ones.
    pub fn with_doctor(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor = Some(doctor_id.into());
        self
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    pub fn doctor(&self) -> Option<&str> {
        self.doctor.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn time_zone(&self) -> &Tz {
        &self.tz
    }

    /// Changes granularity; the anchor date is kept.
    pub fn set_view(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn set_anchor(&mut self, anchor: NaiveDate) {
        self.anchor = anchor;
    }

    pub fn set_filter(&mut self, filter: EventFilter) {
        self.filter = filter;
    }

    pub fn filter_mut(&mut self) -> &mut EventFilter {
        &mut self.filter
    }

    pub fn clear_filters(&mut self) {
        self.filter = EventFilter::default();
    }

    pub fn set_doctor(&mut self, doctor: Option<String>) {
        self.doctor = doctor;
    }

    /// Called once the first store read has completed.
    pub fn finish_loading(&mut self) {
        self.loading = false;
    }

    pub fn next(&mut self) {
        self.anchor = self.step(true);
    }

    pub fn previous(&mut self) {
        self.anchor = self.step(false);
    }

    pub fn today(&mut self, clock: &dyn Clock) {
        self.anchor = clock.now().with_timezone(&self.tz).date_naive();
    }

    fn step(&self, forward: bool) -> NaiveDate {
        let anchor = self.anchor;
        let stepped = match (self.mode, forward) {
            (ViewMode::Day, true) => anchor.checked_add_signed(Duration::days(1)),
            (ViewMode::Day, false) => anchor.checked_sub_signed(Duration::days(1)),
            (ViewMode::Week, true) => anchor.checked_add_signed(Duration::days(7)),
            (ViewMode::Week, false) => anchor.checked_sub_signed(Duration::days(7)),
            (ViewMode::Month, true) => anchor.checked_add_months(Months::new(1)),
            (ViewMode::Month, false) => anchor.checked_sub_months(Months::new(1)),
        };
        stepped.unwrap_or(anchor)
    }

    /// Local dates covered by the current granularity.
    pub fn date_range(&self) -> DateWindow {
        match self.mode {
            ViewMode::Day => DateWindow::day(self.anchor),
            ViewMode::Week => DateWindow::week(self.week_start_date()),
            ViewMode::Month => DateWindow::month(self.anchor.year(), self.anchor.month())
                .unwrap_or_else(|| DateWindow::day(self.anchor)),
        }
    }

    fn week_start_date(&self) -> NaiveDate {
        let weekday = self.anchor.weekday().num_days_from_monday() as i64;
        let start = self.week_start.weekday().num_days_from_monday() as i64;
        let back = (weekday - start).rem_euclid(7);
        self.anchor
            .checked_sub_signed(Duration::days(back))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Doctor scope, then attribute filter, then the date window; sorted by start.
    pub fn visible_events<'a>(&self, events: &'a [CalendarEvent]) -> Vec<&'a CalendarEvent> {
        let scoped = match &self.doctor {
            Some(doctor) => query::events_for_doctor(events, doctor),
            None => events.iter().collect(),
        };
        let filtered = query::filter_events(scoped, &self.filter);
        let mut visible = match self.mode {
            ViewMode::Day => query::events_on_day(filtered, self.anchor, &self.tz),
            ViewMode::Week => query::events_in_week(filtered, self.week_start_date(), &self.tz),
            ViewMode::Month => {
                query::events_in_month(filtered, self.anchor.year(), self.anchor.month(), &self.tz)
            }
        };
        query::sort_by_start(&mut visible);
        visible
    }

    /// Visible events grouped by local start date, one entry per day of the window.
    pub fn visible_by_day<'a>(
        &self,
        events: &'a [CalendarEvent],
    ) -> Vec<(NaiveDate, Vec<&'a CalendarEvent>)> {
        let visible = self.visible_events(events);
        self.date_range()
            .days()
            .map(|day| {
                let on_day = visible
                    .iter()
                    .copied()
                    .filter(|event| query::local_start_date(event, &self.tz) == day)
                    .collect();
                (day, on_day)
            })
            .collect()
    }

    pub fn title(&self) -> String {
        match self.mode {
            ViewMode::Day => self.anchor.format("%A, %B %-d, %Y").to_string(),
            ViewMode::Week => {
                let DateWindow { first, last } = self.date_range();
                if first.year() == last.year() {
                    format!(
                        "{} - {}, {}",
                        first.format("%b %-d"),
                        last.format("%b %-d"),
                        last.year()
                    )
                } else {
                    format!("{} - {}", first.format("%b %-d, %Y"), last.format("%b %-d, %Y"))
                }
            }
            ViewMode::Month => self.anchor.format("%B %Y").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventStatus, EventType, BROADCAST_DOCTOR_ID};
    use chrono::{DateTime, FixedOffset, Utc};

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn event(id: &str, kind: EventType, day: u32, hour: u32) -> CalendarEvent {
        let start = tz().with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap();
        CalendarEvent::new(id, format!("event {id}"), kind, start, start + Duration::hours(1))
    }

    #[test]
    fn switching_view_keeps_anchor() {
        let mut view = CalendarView::new(date(2026, 10, 19), tz());
        view.set_view(ViewMode::Month);
        view.set_view(ViewMode::Day);
        assert_eq!(view.anchor(), date(2026, 10, 19));
    }

    #[test]
    fn navigation_steps_by_granularity() {
        let mut view = CalendarView::new(date(2026, 10, 19), tz()).with_mode(ViewMode::Day);
        view.next();
        assert_eq!(view.anchor(), date(2026, 10, 20));

        view.set_view(ViewMode::Week);
        view.previous();
        assert_eq!(view.anchor(), date(2026, 10, 13));

        view.set_anchor(date(2026, 1, 31));
        view.set_view(ViewMode::Month);
        view.next();
        assert_eq!(view.anchor(), date(2026, 2, 28));
        view.previous();
        assert_eq!(view.anchor(), date(2026, 1, 28));
    }

    #[test]
    fn today_uses_the_clock_in_local_time() {
        let clock = || -> DateTime<Utc> { Utc.with_ymd_and_hms(2026, 10, 19, 22, 0, 0).unwrap() };
        let plus_seven = FixedOffset::east_opt(7 * 3600).unwrap();
        let mut view = CalendarView::new(date(2025, 1, 1), plus_seven);
        view.today(&clock);
        assert_eq!(view.anchor(), date(2026, 10, 20));
    }

    #[test]
    fn week_range_honours_week_start() {
        let view = CalendarView::new(date(2026, 10, 21), tz());
        assert_eq!(view.date_range(), DateWindow::week(date(2026, 10, 18)));

        let monday_first = CalendarConfig {
            week_starts_on: WeekStart::Monday,
            ..CalendarConfig::default()
        };
        let view = view.with_config(&monday_first);
        assert_eq!(view.date_range(), DateWindow::week(date(2026, 10, 19)));

        let view = CalendarView::new(date(2026, 10, 18), tz()).with_config(&monday_first);
        assert_eq!(view.date_range().first, date(2026, 10, 12));
    }

    #[test]
    fn week_view_at_the_calendar_limits_stays_in_range() {
        let mut view = CalendarView::new(NaiveDate::MIN, tz()).with_mode(ViewMode::Week);
        assert_eq!(view.date_range().first, NaiveDate::MIN);
        assert!(view.visible_events(&[]).is_empty());

        view.set_anchor(NaiveDate::MAX);
        assert_eq!(view.date_range().last, NaiveDate::MAX);
        view.next();
        assert_eq!(view.anchor(), NaiveDate::MAX);
    }

    #[test]
    fn titles_follow_granularity() {
        let mut view = CalendarView::new(date(2026, 10, 19), tz()).with_mode(ViewMode::Day);
        assert_eq!(view.title(), "Monday, October 19, 2026");

        view.set_view(ViewMode::Week);
        assert_eq!(view.title(), "Oct 18 - Oct 24, 2026");

        view.set_view(ViewMode::Month);
        assert_eq!(view.title(), "October 2026");

        view.set_anchor(date(2026, 12, 30));
        view.set_view(ViewMode::Week);
        assert_eq!(view.title(), "Dec 27, 2026 - Jan 2, 2027");
    }

    #[test]
    fn visible_events_compose_scope_filter_and_window() {
        let events = vec![
            event("late", EventType::Emergency, 19, 14).with_doctor("D1", "Dr. One"),
            event("early", EventType::Hemodialysis, 19, 8).with_doctor("D1", "Dr. One"),
            event("other", EventType::Emergency, 19, 9).with_doctor("D2", "Dr. Two"),
            event("staff", EventType::Meeting, 19, 16).with_doctor(BROADCAST_DOCTOR_ID, "All Staff"),
            event("tomorrow", EventType::Emergency, 20, 9).with_doctor("D1", "Dr. One"),
        ];

        let mut view = CalendarView::new(date(2026, 10, 19), tz())
            .with_mode(ViewMode::Day)
            .with_doctor("D1");

        let ids: Vec<_> = view.visible_events(&events).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "staff"]);

        view.filter_mut().types.push(EventType::Emergency);
        let ids: Vec<_> = view.visible_events(&events).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["late"]);

        view.filter_mut().statuses.push(EventStatus::Completed);
        assert!(view.visible_events(&events).is_empty());

        view.clear_filters();
        view.set_doctor(None);
        view.set_view(ViewMode::Week);
        assert_eq!(view.visible_events(&events).len(), 5);
    }

    #[test]
    fn visible_by_day_covers_every_day_of_the_window() {
        let events = vec![event("a", EventType::Meeting, 20, 9), event("b", EventType::Meeting, 20, 11)];
        let view = CalendarView::new(date(2026, 10, 19), tz());

        let grouped = view.visible_by_day(&events);
        assert_eq!(grouped.len(), 7);
        let tuesday = grouped.iter().find(|(day, _)| *day == date(2026, 10, 20)).unwrap();
        assert_eq!(tuesday.1.len(), 2);
    }

    #[test]
    fn loading_flag_clears_once() {
        let mut view = CalendarView::new(date(2026, 10, 19), tz());
        assert!(view.is_loading());
        view.finish_loading();
        assert!(!view.is_loading());
    }
}
