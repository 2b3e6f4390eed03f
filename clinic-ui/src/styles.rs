#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-clinic-ui]";

/// Base stylesheet. Colours are exposed as custom properties so a host page can override them.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --clinic-font-family: 'Inter', system-ui, -apple-system, 'Segoe UI', sans-serif;
  --clinic-bg: #ffffff;
  --clinic-surface: #f8fafc;
  --clinic-border: rgba(148, 163, 184, 0.35);
  --clinic-radius: 12px;
  --clinic-text: #1f2933;
  --clinic-muted: #52606d;
  --clinic-accent: #2563eb;
  --clinic-accent-soft: rgba(37, 99, 235, 0.12);
  --clinic-danger: #b91c1c;
}

.clinic-calendar,
.clinic-page,
.patient-page,
.not-found {
  font-family: var(--clinic-font-family);
  color: var(--clinic-text);
  background: var(--clinic-bg);
  display: flex;
  flex-direction: column;
  gap: 1rem;
}

.calendar-toolbar {
  display: flex;
  align-items: center;
  justify-content: space-between;
  gap: 1rem;
  flex-wrap: wrap;
}

.calendar-title {
  margin: 0;
  font-size: 1.25rem;
}

.toolbar-nav button,
.toolbar-modes button,
.filter-search button,
.event-actions button {
  border: 1px solid var(--clinic-border);
  background: var(--clinic-surface);
  border-radius: 8px;
  padding: 0.35rem 0.75rem;
  cursor: pointer;
  font: inherit;
}

.mode-button.is-active,
.filter-chip.is-active {
  background: var(--clinic-accent-soft);
  border-color: var(--clinic-accent);
  color: var(--clinic-accent);
}

.calendar-filters {
  display: flex;
  flex-direction: column;
  gap: 0.5rem;
}

.filter-chips {
  display: flex;
  flex-wrap: wrap;
  align-items: center;
  gap: 0.35rem;
}

.filter-label {
  font-size: 0.8rem;
  font-weight: 600;
  color: var(--clinic-muted);
  min-width: 4.5rem;
}

.filter-chip {
  border: 1px solid var(--clinic-border);
  background: transparent;
  border-radius: 999px;
  padding: 0.2rem 0.65rem;
  font-size: 0.8rem;
  cursor: pointer;
}

.filter-search {
  display: flex;
  gap: 0.5rem;
}

.filter-search input {
  flex: 1;
  border: 1px solid var(--clinic-border);
  border-radius: 8px;
  padding: 0.4rem 0.65rem;
  font: inherit;
}

.reset-button {
  color: var(--clinic-danger);
}

.calendar-days {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
  gap: 0.75rem;
}

.calendar-day {
  border: 1px solid var(--clinic-border);
  border-radius: var(--clinic-radius);
  padding: 0.75rem;
  background: var(--clinic-surface);
}

.calendar-day h3 {
  margin: 0 0 0.5rem;
  font-size: 0.9rem;
}

.calendar-day ul,
.machine-list,
.machine-monitor ul {
  list-style: none;
  margin: 0;
  padding: 0;
  display: flex;
  flex-direction: column;
  gap: 0.5rem;
}

.calendar-event {
  border-radius: 8px;
  padding: 0.5rem 0.6rem;
  display: flex;
  flex-direction: column;
  gap: 0.2rem;
  font-size: 0.85rem;
}

.calendar-event[data-priority="critical"] {
  outline: 2px solid var(--clinic-danger);
}

.event-meta {
  display: flex;
  gap: 0.4rem;
  font-size: 0.75rem;
  opacity: 0.85;
}

.event-actions {
  display: flex;
  gap: 0.35rem;
  margin-top: 0.25rem;
}

.calendar-empty,
.calendar-loading {
  color: var(--clinic-muted);
  font-style: italic;
}

.clinic-stats {
  display: grid;
  grid-template-columns: max-content 1fr;
  gap: 0.25rem 1rem;
  margin: 0;
}

.clinic-stats dt {
  color: var(--clinic-muted);
}

.clinic-stats dd {
  margin: 0;
  font-weight: 600;
}

.machine-item {
  border: 1px solid var(--clinic-border);
  border-radius: var(--clinic-radius);
  padding: 0.75rem;
  display: flex;
  flex-wrap: wrap;
  gap: 0.5rem 1rem;
}

.machine-item[data-status="offline"] .machine-status {
  color: var(--clinic-danger);
}

.machine-monitor {
  flex-basis: 100%;
}

.monitor-reading {
  display: grid;
  grid-template-columns: 10rem 7rem 1fr;
  align-items: center;
  gap: 0.5rem;
  font-size: 0.85rem;
}

.reading-gauge {
  height: 6px;
  border-radius: 999px;
  background: var(--clinic-border);
  overflow: hidden;
}

.reading-gauge span {
  display: block;
  height: 100%;
  background: var(--clinic-accent);
  transition: width 0.4s ease;
}

.not-found a {
  color: var(--clinic-accent);
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-clinic-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
