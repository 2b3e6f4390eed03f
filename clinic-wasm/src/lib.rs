//! Framework-neutral WASM <-> JavaScript bridge for the clinic calendar.
//!
//! Every export opens the event store over the browser's `localStorage`
//! (or a storage that drops writes when none is available), runs one
//! operation and hands plain JSON-shaped values back to JavaScript.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use clinic_core::seed::sample_events;
use clinic_core::{
    CalendarConfig, CalendarEvent, CalendarView, ClinicError, DateWindow, EventFilter, EventPatch,
    EventStore, KeyValueStore, TransitionPolicy, ViewMode, WeekStart,
};
use clinic_data::{ClinicDirectory, Dataset};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub mod browser;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct JsCalendarConfig {
    #[serde(default)]
    storage_key: Option<String>,
    #[serde(default)]
    week_starts_on: Option<WeekStart>,
    #[serde(default)]
    transition_policy: Option<TransitionPolicy>,
    /// Clinic UTC offset used to lay out the sample calendar.
    #[serde(default)]
    offset_minutes: Option<i32>,
}

impl From<JsCalendarConfig> for CalendarConfig {
    fn from(cfg: JsCalendarConfig) -> Self {
        let mut base = CalendarConfig::default();
        if let Some(key) = cfg.storage_key {
            base.storage_key = key;
        }
        if let Some(week_start) = cfg.week_starts_on {
            base.week_starts_on = week_start;
        }
        if let Some(policy) = cfg.transition_policy {
            base.transition_policy = policy;
        }
        base
    }
}

/// What the calendar screen asks for.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CalendarQuery {
    #[serde(default)]
    view: ViewMode,
    #[serde(default)]
    anchor: Option<NaiveDate>,
    #[serde(default)]
    filter: EventFilter,
    #[serde(default)]
    doctor_id: Option<String>,
    /// Minutes east of UTC, i.e. `-new Date().getTimezoneOffset()`.
    #[serde(default)]
    offset_minutes: Option<i32>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CalendarPage {
    title: String,
    view: ViewMode,
    anchor: NaiveDate,
    range: DateWindow,
    events: Vec<CalendarEvent>,
}

/// Offset `offset_minutes` east of UTC; out-of-range values fall back to UTC.
pub fn clinic_offset(offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix())
}

/// Explicit offset first, then the configured one, then the host's local offset.
fn resolve_offset(explicit: Option<i32>, configured: Option<i32>) -> FixedOffset {
    match explicit.or(configured) {
        Some(minutes) => clinic_offset(minutes),
        None => Local::now().offset().fix(),
    }
}

/// Store over `storage`, seeded with the sample calendar laid out around `now`.
pub fn open_store<S: KeyValueStore>(
    storage: S,
    config: &CalendarConfig,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> EventStore<S> {
    let today = now.with_timezone(&offset).date_naive();
    EventStore::with_config(storage, sample_events(today, offset), config)
}

fn calendar_page<S: KeyValueStore>(
    store: &EventStore<S>,
    query: CalendarQuery,
    config: &CalendarConfig,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> CalendarPage {
    let anchor = query
        .anchor
        .unwrap_or_else(|| now.with_timezone(&offset).date_naive());

    let mut view = CalendarView::new(anchor, offset)
        .with_config(config)
        .with_mode(query.view);
    view.set_filter(query.filter);
    view.set_doctor(query.doctor_id);

    let events = store.load();
    view.finish_loading();

    CalendarPage {
        title: view.title(),
        view: view.mode(),
        anchor: view.anchor(),
        range: view.date_range(),
        events: view.visible_events(&events).into_iter().cloned().collect(),
    }
}

fn parse_config(config: Option<JsValue>) -> Result<JsCalendarConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => from_value(js_cfg)
            .map_err(|err| JsValue::from_str(&format!("Invalid calendar config: {err}"))),
        _ => Ok(JsCalendarConfig::default()),
    }
}

/// `offset_minutes` overrides the offset carried by the JS config.
fn with_browser_store<T>(
    config: Option<JsValue>,
    offset_minutes: Option<i32>,
    run: impl FnOnce(&EventStore<Box<dyn KeyValueStore>>, &CalendarConfig, FixedOffset) -> Result<T, JsValue>,
) -> Result<T, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let js_cfg = parse_config(config)?;
    let offset = resolve_offset(offset_minutes, js_cfg.offset_minutes);
    let cfg = CalendarConfig::from(js_cfg);
    let store = open_store(browser::local_storage(), &cfg, Utc::now(), offset);
    store.initialize();
    run(&store, &cfg, offset)
}

fn format_clinic_error(err: ClinicError) -> JsValue {
    JsValue::from_str(&format!("Calendar error: {err}"))
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|err| JsValue::from_str(&format!("Cannot serialize result: {err}")))
}

/// Visible events, title and date range for one calendar screen.
#[wasm_bindgen]
pub fn calendar_visible_events(query: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let query: CalendarQuery = if query.is_undefined() || query.is_null() {
        CalendarQuery::default()
    } else {
        from_value(query).map_err(|err| JsValue::from_str(&format!("Invalid calendar query: {err}")))?
    };

    with_browser_store(config, query.offset_minutes, |store, cfg, offset| {
        serialize(&calendar_page(store, query, cfg, Utc::now(), offset))
    })
}

#[wasm_bindgen]
pub fn calendar_add_event(event: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let event: CalendarEvent = from_value(event)
        .map_err(|err| JsValue::from_str(&format!("Invalid calendar event: {err}")))?;

    with_browser_store(config, None, |store, _, _| {
        let added = store.add(event).map_err(format_clinic_error)?;
        serialize(&added)
    })
}

/// Returns the updated event, or `null` when no event has this id.
#[wasm_bindgen]
pub fn calendar_update_event(id: &str, patch: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let patch: EventPatch = from_value(patch)
        .map_err(|err| JsValue::from_str(&format!("Invalid event patch: {err}")))?;

    with_browser_store(config, None, |store, _, _| {
        match store.update(id, patch).map_err(format_clinic_error)? {
            Some(updated) => serialize(&updated),
            None => Ok(JsValue::NULL),
        }
    })
}

#[wasm_bindgen]
pub fn calendar_delete_event(id: &str, config: Option<JsValue>) -> Result<bool, JsValue> {
    with_browser_store(config, None, |store, _, _| Ok(store.delete(id)))
}

/// Restores the sample calendar.
#[wasm_bindgen]
pub fn calendar_reset(config: Option<JsValue>) -> Result<(), JsValue> {
    with_browser_store(config, None, |store, _, _| {
        store.reset();
        Ok(())
    })
}

fn lookup<T: Serialize>(found: Option<&T>) -> Result<JsValue, JsValue> {
    match found {
        Some(record) => serialize(record),
        None => Ok(JsValue::NULL),
    }
}

/// `null` when the id is unknown; the page shows its not-found panel.
#[wasm_bindgen]
pub fn lookup_clinic(id: &str) -> Result<JsValue, JsValue> {
    lookup(Dataset::builtin().find_clinic(id))
}

#[wasm_bindgen]
pub fn lookup_machine(id: &str) -> Result<JsValue, JsValue> {
    lookup(Dataset::builtin().find_machine(id))
}

#[wasm_bindgen]
pub fn lookup_patient(id: &str) -> Result<JsValue, JsValue> {
    lookup(Dataset::builtin().find_patient(id))
}

#[wasm_bindgen]
pub fn network_summary() -> Result<JsValue, JsValue> {
    serialize(&clinic_data::summarize_network(&Dataset::builtin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clinic_core::{EventStatus, EventType, MemoryStorage};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 7, 30, 0).unwrap()
    }

    fn query(json: &str) -> CalendarQuery {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn day_page_contains_todays_emergency() {
        let cfg = CalendarConfig::default();
        let store = open_store(MemoryStorage::new(), &cfg, now(), clinic_offset(120));

        let page = calendar_page(
            &store,
            query(r#"{"view":"day","offsetMinutes":120}"#),
            &cfg,
            now(),
            clinic_offset(120),
        );

        assert_eq!(page.title, "Monday, October 19, 2026");
        assert_eq!(page.range, DateWindow::day(page.anchor));
        let emergency = page.events.iter().find(|event| event.id == "3").unwrap();
        assert_eq!(emergency.event_type, EventType::Emergency);
    }

    #[test]
    fn query_filters_are_applied() {
        let cfg = CalendarConfig::default();
        let store = open_store(MemoryStorage::new(), &cfg, now(), clinic_offset(0));

        let page = calendar_page(
            &store,
            query(r#"{"view":"week","anchor":"2026-10-19","filter":{"statuses":["completed"]}}"#),
            &cfg,
            now(),
            clinic_offset(0),
        );

        assert!(!page.events.is_empty());
        assert!(page.events.iter().all(|event| event.status == EventStatus::Completed));
    }

    #[test]
    fn js_config_overlays_defaults() {
        let js: JsCalendarConfig =
            serde_json::from_str(r#"{"weekStartsOn":"monday","offsetMinutes":330}"#).unwrap();
        assert_eq!(js.offset_minutes, Some(330));
        let cfg = CalendarConfig::from(js);
        assert_eq!(cfg.week_starts_on, WeekStart::Monday);
        assert_eq!(cfg.storage_key, clinic_core::DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn query_without_offset_leaves_the_config_offset_in_charge() {
        let query = query(r#"{"view":"day"}"#);
        assert_eq!(query.offset_minutes, None);
        assert_eq!(resolve_offset(query.offset_minutes, Some(330)).local_minus_utc(), 330 * 60);
        assert_eq!(resolve_offset(Some(-300), Some(330)).local_minus_utc(), -300 * 60);
    }

    #[test]
    fn missing_offset_uses_the_local_offset_instead_of_utc() {
        let expected = Local::now().offset().fix();
        assert_eq!(resolve_offset(None, None), expected);
    }

    #[test]
    fn out_of_range_offsets_fall_back_to_utc() {
        assert_eq!(clinic_offset(24 * 60).local_minus_utc(), 0);
        assert_eq!(clinic_offset(-300).local_minus_utc(), -5 * 3600);
    }
}
