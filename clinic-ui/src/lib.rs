//! Yew components for the clinic dashboard, compiled for the wasm32 target.

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::rc::Rc;

    use crate::styles;
    use chrono::{FixedOffset, NaiveDate, Utc};
    use clinic_core::{
        CalendarConfig, CalendarEvent, CalendarView, EventFilter, EventPatch, EventStatus,
        EventStore, EventType, KeyValueStore, MachineTelemetry, Priority, RandomWalk,
        SystemClock, TelemetrySource, ViewMode,
    };
    use clinic_data::{summarize_clinic, ClinicDirectory, Dataset, Machine, MachineStatus};
    use gloo_timers::callback::Interval;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, HtmlInputElement, Window};
    use yew::events::InputEvent;
    use yew::prelude::*;
    use yew::TargetCast;

    type View = CalendarView<FixedOffset>;

    fn install_styles() {
        if let Some(document) = web_sys::window().and_then(|window| window.document()) {
            if let Err(err) = styles::ensure_styles(&document) {
                console::error_1(&err);
            }
        }
    }

    fn browser_store(offset: FixedOffset) -> EventStore<Box<dyn KeyValueStore>> {
        clinic_wasm::open_store(
            clinic_wasm::browser::local_storage(),
            &CalendarConfig::default(),
            Utc::now(),
            offset,
        )
    }

    /// Callback that edits a copy of the view and stores it back.
    fn edit_view<E: 'static>(
        view: &UseStateHandle<View>,
        change: impl Fn(&mut View) + 'static,
    ) -> Callback<E> {
        let view = view.clone();
        Callback::from(move |_: E| {
            let mut next = (*view).clone();
            change(&mut next);
            view.set(next);
        })
    }

    #[derive(Properties, PartialEq)]
    pub struct CalendarPageProps {
        pub offset_minutes: i32,
        #[prop_or_default]
        pub doctor_id: Option<String>,
    }

    #[function_component(CalendarPage)]
    fn calendar_page(props: &CalendarPageProps) -> Html {
        let offset = clinic_wasm::clinic_offset(props.offset_minutes);
        let view = {
            let doctor = props.doctor_id.clone();
            use_state(move || {
                let mut view = View::starting_today(&SystemClock, offset);
                view.set_doctor(doctor);
                view
            })
        };
        let events = use_state(Vec::<CalendarEvent>::new);

        {
            let view = view.clone();
            let events = events.clone();
            use_effect_with((), move |_| {
                install_styles();
                let store = browser_store(offset);
                store.initialize();
                events.set(store.load());
                let mut next = (*view).clone();
                next.finish_loading();
                view.set(next);
                || ()
            });
        }

        let reload = {
            let events = events.clone();
            move |store: &EventStore<Box<dyn KeyValueStore>>| events.set(store.load())
        };

        let on_complete = {
            let reload = reload.clone();
            Callback::from(move |id: String| {
                let store = browser_store(offset);
                match store.update(&id, EventPatch::status(EventStatus::Completed)) {
                    Ok(_) => reload(&store),
                    Err(err) => console::error_1(&JsValue::from_str(&err.to_string())),
                }
            })
        };

        let on_delete = {
            let reload = reload.clone();
            Callback::from(move |id: String| {
                let store = browser_store(offset);
                if store.delete(&id) {
                    reload(&store);
                }
            })
        };

        let on_reset = Callback::from(move |_: MouseEvent| {
            let store = browser_store(offset);
            store.reset();
            reload(&store);
        });

        let on_search = {
            let view = view.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                let mut next = (*view).clone();
                next.filter_mut().query = input.value();
                view.set(next);
            })
        };

        if view.is_loading() {
            return html! {
                <div class="clinic-calendar">
                    <p class="calendar-loading">{"Loading calendar..."}</p>
                </div>
            };
        }

        let days = view.visible_by_day(&events);
        let show_empty_days = view.mode() != ViewMode::Month;
        let visible_count: usize = days.iter().map(|(_, on_day)| on_day.len()).sum();

        html! {
            <div class="clinic-calendar">
                <header class="calendar-toolbar">
                    <div class="toolbar-nav">
                        <button type="button" onclick={edit_view::<MouseEvent>(&view, View::previous)} aria-label="Previous">{"‹"}</button>
                        <button type="button" onclick={edit_view::<MouseEvent>(&view, |v| v.today(&SystemClock))}>{"Today"}</button>
                        <button type="button" onclick={edit_view::<MouseEvent>(&view, View::next)} aria-label="Next">{"›"}</button>
                    </div>
                    <h2 class="calendar-title">{ view.title() }</h2>
                    <div class="toolbar-modes" role="group" aria-label="Calendar view">
                        {
                            for ViewMode::ALL.into_iter().map(|mode| html! {
                                <button
                                    type="button"
                                    class={classes!("mode-button", (view.mode() == mode).then_some("is-active"))}
                                    onclick={edit_view::<MouseEvent>(&view, move |v| v.set_view(mode))}
                                >
                                    { mode.label() }
                                </button>
                            })
                        }
                    </div>
                </header>
                <section class="calendar-filters">
                    { render_chips("Type", EventType::ALL, &view.filter().types, &view, type_list) }
                    { render_chips("Status", EventStatus::ALL, &view.filter().statuses, &view, status_list) }
                    { render_chips("Priority", Priority::ALL, &view.filter().priorities, &view, priority_list) }
                    <div class="filter-search">
                        <input
                            type="search"
                            placeholder="Search title, notes, patient or doctor"
                            value={view.filter().query.clone()}
                            oninput={on_search}
                        />
                        <button type="button" onclick={edit_view::<MouseEvent>(&view, View::clear_filters)}>{"Clear"}</button>
                        <button type="button" class="reset-button" onclick={on_reset}>{"Reset sample data"}</button>
                    </div>
                </section>
                <section class="calendar-days" aria-live="polite">
                    {
                        if visible_count == 0 {
                            html! { <p class="calendar-empty">{"No events in this period."}</p> }
                        } else {
                            html! {
                                for days.into_iter()
                                    .filter(|(_, on_day)| show_empty_days || !on_day.is_empty())
                                    .map(|(day, on_day)| render_day(day, &on_day, offset, &on_complete, &on_delete))
                            }
                        }
                    }
                </section>
            </div>
        }
    }

    fn type_list(filter: &mut EventFilter) -> &mut Vec<EventType> {
        &mut filter.types
    }

    fn status_list(filter: &mut EventFilter) -> &mut Vec<EventStatus> {
        &mut filter.statuses
    }

    fn priority_list(filter: &mut EventFilter) -> &mut Vec<Priority> {
        &mut filter.priorities
    }

    fn render_chips<T>(
        label: &'static str,
        options: &'static [T],
        selected: &[T],
        view: &UseStateHandle<View>,
        field: fn(&mut EventFilter) -> &mut Vec<T>,
    ) -> Html
    where
        T: Copy + PartialEq + std::fmt::Display + 'static,
    {
        html! {
            <div class="filter-chips" role="group" aria-label={label}>
                <span class="filter-label">{ label }</span>
                {
                    for options.iter().copied().map(|option| {
                        let active = selected.contains(&option);
                        let onclick = edit_view::<MouseEvent>(view, move |v| {
                            EventFilter::toggle(field(v.filter_mut()), option)
                        });
                        html! {
                            <button
                                type="button"
                                class={classes!("filter-chip", active.then_some("is-active"))}
                                {onclick}
                            >
                                { option.to_string() }
                            </button>
                        }
                    })
                }
            </div>
        }
    }

    fn render_day(
        day: NaiveDate,
        events: &[&CalendarEvent],
        offset: FixedOffset,
        on_complete: &Callback<String>,
        on_delete: &Callback<String>,
    ) -> Html {
        html! {
            <article class="calendar-day">
                <h3>{ day.format("%a %b %-d").to_string() }</h3>
                <ul>
                    {
                        if events.is_empty() {
                            html! { <li class="calendar-empty">{"Nothing scheduled"}</li> }
                        } else {
                            html! {
                                for events.iter().map(|event| render_event(event, offset, on_complete, on_delete))
                            }
                        }
                    }
                </ul>
            </article>
        }
    }

    fn render_event(
        event: &CalendarEvent,
        offset: FixedOffset,
        on_complete: &Callback<String>,
        on_delete: &Callback<String>,
    ) -> Html {
        let start = event.start_time.with_timezone(&offset).format("%H:%M");
        let end = event.end_time.with_timezone(&offset).format("%H:%M");
        let style = format!("background:{};color:{}", event.color, event.text_color);
        let complete = {
            let id = event.id.clone();
            on_complete.reform(move |_: MouseEvent| id.clone())
        };
        let delete = {
            let id = event.id.clone();
            on_delete.reform(move |_: MouseEvent| id.clone())
        };

        html! {
            <li class="calendar-event" {style} data-priority={event.priority.as_str()}>
                <div class="event-meta">
                    <span class="event-time">{ format!("{start} - {end}") }</span>
                    <span class="event-type">{ event.event_type.as_str() }</span>
                    <span class="event-status" data-status={event.status.as_str()}>{ event.status.as_str() }</span>
                </div>
                <strong class="event-title">{ event.title.clone() }</strong>
                { event.patient_name.as_ref().map(|name| html! { <span class="event-patient">{ name.clone() }</span> }).unwrap_or_default() }
                { event.room.as_ref().map(|room| html! { <span class="event-room">{ room.clone() }</span> }).unwrap_or_default() }
                <div class="event-actions">
                    if !event.status.is_terminal() {
                        <button type="button" onclick={complete}>{"Mark completed"}</button>
                    }
                    <button type="button" onclick={delete}>{"Delete"}</button>
                </div>
            </li>
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct MachineMonitorProps {
        pub machine_id: AttrValue,
        #[prop_or(3)]
        pub interval_secs: u32,
    }

    /// Live panel of one machine, refreshed from a random walk every few seconds.
    #[function_component(MachineMonitor)]
    fn machine_monitor(props: &MachineMonitorProps) -> Html {
        let frame = {
            let machine_id = props.machine_id.to_string();
            use_mut_ref(move || MachineTelemetry::hemodialysis_baseline(machine_id, Utc::now()))
        };
        let source = use_mut_ref(RandomWalk::from_entropy);
        let redraw = use_force_update();

        {
            let frame = frame.clone();
            use_effect_with(props.interval_secs, move |secs| {
                let millis = (*secs).max(1).saturating_mul(1000);
                let interval = Interval::new(millis, move || {
                    let next = source.borrow_mut().next_frame(&frame.borrow(), Utc::now());
                    *frame.borrow_mut() = next;
                    redraw.force_update();
                });
                move || drop(interval)
            });
        }

        let frame = frame.borrow();
        html! {
            <section class="machine-monitor">
                <header>
                    <h4>{ frame.machine_id.clone() }</h4>
                    <span class="monitor-time">{ frame.recorded_at.format("%H:%M:%S").to_string() }</span>
                </header>
                <ul>
                    {
                        for frame.readings.iter().map(|reading| {
                            let span = reading.bounds.max - reading.bounds.min;
                            let fill = if span > 0.0 { (reading.value - reading.bounds.min) / span * 100.0 } else { 0.0 };
                            html! {
                                <li class="monitor-reading">
                                    <span class="reading-name">{ reading.name.clone() }</span>
                                    <span class="reading-value">{ reading.display_value() }</span>
                                    <span class="reading-gauge"><span style={format!("width:{fill:.0}%")}></span></span>
                                </li>
                            }
                        })
                    }
                </ul>
            </section>
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct NotFoundProps {
        pub kind: AttrValue,
        pub id: AttrValue,
        pub back_href: AttrValue,
    }

    #[function_component(NotFound)]
    fn not_found(props: &NotFoundProps) -> Html {
        html! {
            <section class="not-found">
                <h2>{ format!("{} not found", props.kind) }</h2>
                <p>{ format!("No {} with id \"{}\" exists.", props.kind.to_lowercase(), props.id) }</p>
                <a href={props.back_href.clone()}>{"Go back"}</a>
            </section>
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct ClinicPageProps {
        pub clinic_id: AttrValue,
    }

    #[function_component(ClinicPage)]
    fn clinic_page(props: &ClinicPageProps) -> Html {
        use_effect_with((), |_| {
            install_styles();
            || ()
        });
        let dataset: Rc<Dataset> = use_memo((), |_| Dataset::builtin());
        let interval_secs = CalendarConfig::default().telemetry_interval_secs;

        let (Some(clinic), Some(summary)) = (
            dataset.find_clinic(&props.clinic_id),
            summarize_clinic(dataset.as_ref(), &props.clinic_id),
        ) else {
            return html! {
                <NotFound kind="Clinic" id={props.clinic_id.clone()} back_href="#/clinics" />
            };
        };

        html! {
            <div class="clinic-page">
                <header class="clinic-header">
                    <h2>{ clinic.name.clone() }</h2>
                    <p>{ format!("{} · {}", clinic.address, clinic.city) }</p>
                </header>
                <dl class="clinic-stats">
                    <dt>{"Machines"}</dt><dd>{ summary.machines_total }</dd>
                    <dt>{"Utilization"}</dt><dd>{ format!("{:.1}%", summary.utilization_percent) }</dd>
                    <dt>{"Average hours in use"}</dt><dd>{ format!("{:.1}", summary.average_hours_in_use) }</dd>
                    <dt>{"Patients"}</dt><dd>{ summary.patients }</dd>
                    <dt>{"Treatments today"}</dt><dd>{ summary.treatments_today }</dd>
                </dl>
                <ul class="machine-list">
                    {
                        for dataset.machines_in_clinic(&clinic.id).into_iter().map(|machine| render_machine(machine, interval_secs))
                    }
                </ul>
            </div>
        }
    }

    fn render_machine(machine: &Machine, interval_secs: u32) -> Html {
        html! {
            <li class="machine-item" data-status={machine.status.label().to_lowercase()}>
                <span class="machine-id">{ machine.id.clone() }</span>
                <span class="machine-model">{ machine.model.clone() }</span>
                <span class="machine-status">{ machine.status.label() }</span>
                if machine.status == MachineStatus::Active {
                    <MachineMonitor machine_id={machine.id.clone()} {interval_secs} />
                }
            </li>
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct RecordPageProps {
        pub id: AttrValue,
    }

    #[function_component(MachinePage)]
    fn machine_page(props: &RecordPageProps) -> Html {
        use_effect_with((), |_| {
            install_styles();
            || ()
        });
        let dataset: Rc<Dataset> = use_memo((), |_| Dataset::builtin());

        match dataset.find_machine(&props.id) {
            Some(machine) => html! {
                <ul class="machine-list">
                    { render_machine(machine, CalendarConfig::default().telemetry_interval_secs) }
                </ul>
            },
            None => html! {
                <NotFound kind="Machine" id={props.id.clone()} back_href="#/machines" />
            },
        }
    }

    #[function_component(PatientPage)]
    fn patient_page(props: &RecordPageProps) -> Html {
        let dataset: Rc<Dataset> = use_memo((), |_| Dataset::builtin());
        let Some(patient) = dataset.find_patient(&props.id) else {
            return html! {
                <NotFound kind="Patient" id={props.id.clone()} back_href="#/patients" />
            };
        };

        let today = Utc::now().date_naive();
        let clinic = dataset
            .find_clinic(&patient.clinic_id)
            .map(|clinic| clinic.name.clone())
            .unwrap_or_else(|| patient.clinic_id.clone());
        let doctor = dataset
            .find_doctor(&patient.doctor_id)
            .map(|doctor| doctor.name.clone())
            .unwrap_or_else(|| patient.doctor_id.clone());
        let schedule = patient
            .schedule
            .iter()
            .map(|day| day.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        html! {
            <section class="patient-page">
                <h2>{ patient.name.clone() }</h2>
                <dl class="clinic-stats">
                    <dt>{"Age"}</dt><dd>{ patient.age_on(today).map(|age| age.to_string()).unwrap_or_default() }</dd>
                    <dt>{"Clinic"}</dt><dd>{ clinic }</dd>
                    <dt>{"Doctor"}</dt><dd>{ doctor }</dd>
                    <dt>{"Sessions"}</dt><dd>{ schedule }</dd>
                    <dt>{"Reward points"}</dt><dd>{ patient.reward_points }</dd>
                </dl>
            </section>
        }
    }

    fn mount_target(selector: &str) -> Result<Element, JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Cannot access document"))?;

        document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches the selector"))
    }

    #[wasm_bindgen]
    pub fn mount_calendar(
        selector: &str,
        offset_minutes: i32,
        doctor_id: Option<String>,
    ) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let target = mount_target(selector)?;
        yew::Renderer::<CalendarPage>::with_root_and_props(
            target,
            CalendarPageProps { offset_minutes, doctor_id },
        )
        .render();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn mount_clinic(selector: &str, clinic_id: String) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let target = mount_target(selector)?;
        yew::Renderer::<ClinicPage>::with_root_and_props(
            target,
            ClinicPageProps { clinic_id: clinic_id.into() },
        )
        .render();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn mount_machine(selector: &str, machine_id: String) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let target = mount_target(selector)?;
        yew::Renderer::<MachinePage>::with_root_and_props(
            target,
            RecordPageProps { id: machine_id.into() },
        )
        .render();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn mount_patient(selector: &str, patient_id: String) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let target = mount_target(selector)?;
        yew::Renderer::<PatientPage>::with_root_and_props(
            target,
            RecordPageProps { id: patient_id.into() },
        )
        .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::{mount_calendar, mount_clinic, mount_machine, mount_patient};

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_calendar(
    _: &str,
    _: i32,
    _: Option<String>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(unsupported_target())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_clinic(_: &str, _: String) -> Result<(), wasm_bindgen::JsValue> {
    Err(unsupported_target())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_machine(_: &str, _: String) -> Result<(), wasm_bindgen::JsValue> {
    Err(unsupported_target())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_patient(_: &str, _: String) -> Result<(), wasm_bindgen::JsValue> {
    Err(unsupported_target())
}

#[cfg(not(target_arch = "wasm32"))]
fn unsupported_target() -> wasm_bindgen::JsValue {
    wasm_bindgen::JsValue::from_str("clinic-ui only supports the wasm32 target")
}
