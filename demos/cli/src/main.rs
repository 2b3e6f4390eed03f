use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use clinic_core::seed::sample_events;
use clinic_core::{
    query, CalendarConfig, CalendarEvent, CalendarView, EventFilter, EventPatch, EventStatus,
    EventStore, EventType, Priority, ViewMode,
};
use clinic_data::{ClinicDirectory, Dataset};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod file_storage;
mod settings;

use file_storage::FileStorage;

#[derive(Parser, Debug)]
#[command(name = "clinic-cli", about = "Manage the hemodialysis clinic calendar from a terminal.")]
struct Args {
    /// JSON file holding the persisted key-value entries.
    #[arg(long, default_value = "clinic-store.json")]
    store: PathBuf,

    /// Optional configuration file (TOML, YAML or JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clinic offset from UTC in minutes; dates and day boundaries use it.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset_minutes: i32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Events visible in a day, week or month window.
    List(ListArgs),
    /// Next events from now on.
    Upcoming {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Adds an event.
    Add(AddArgs),
    /// Changes fields of an existing event.
    Update(UpdateArgs),
    /// Removes an event.
    Delete { id: String },
    /// Restores the sample calendar.
    Reset,
    /// Shows a clinic and its dashboard summary.
    Clinic { id: String },
    /// Shows a dialysis machine.
    Machine { id: String },
    /// Shows a patient.
    Patient { id: String },
    /// Network-wide dashboard summary.
    Network,
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    #[arg(long, default_value = "week")]
    view: ViewMode,
    /// Anchor date; defaults to today in the clinic offset.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Only events of this doctor and broadcast events.
    #[arg(long)]
    scope: Option<String>,
    #[arg(long = "type")]
    types: Vec<EventType>,
    #[arg(long = "status")]
    statuses: Vec<EventStatus>,
    #[arg(long = "priority")]
    priorities: Vec<Priority>,
    #[arg(long = "doctor")]
    doctors: Vec<String>,
    #[arg(long = "room")]
    rooms: Vec<String>,
    #[arg(long, default_value = "")]
    query: String,
    /// Prints the events as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    title: String,
    #[arg(long = "type")]
    event_type: EventType,
    /// RFC 3339 timestamp, e.g. 2026-10-19T09:00:00+02:00.
    #[arg(long)]
    start: DateTime<FixedOffset>,
    #[arg(long)]
    end: DateTime<FixedOffset>,
    #[arg(long)]
    status: Option<EventStatus>,
    #[arg(long)]
    priority: Option<Priority>,
    #[arg(long, requires = "patient_name")]
    patient_id: Option<String>,
    #[arg(long)]
    patient_name: Option<String>,
    #[arg(long, requires = "doctor_name")]
    doctor_id: Option<String>,
    #[arg(long)]
    doctor_name: Option<String>,
    #[arg(long)]
    room: Option<String>,
    #[arg(long)]
    equipment: Vec<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long, default_value = "cli")]
    created_by: String,
}

#[derive(ClapArgs, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    start: Option<DateTime<FixedOffset>>,
    #[arg(long)]
    end: Option<DateTime<FixedOffset>>,
    #[arg(long = "type")]
    event_type: Option<EventType>,
    #[arg(long)]
    status: Option<EventStatus>,
    #[arg(long)]
    priority: Option<Priority>,
    #[arg(long)]
    room: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl ListArgs {
    fn filter(&self) -> EventFilter {
        EventFilter {
            types: self.types.clone(),
            statuses: self.statuses.clone(),
            priorities: self.priorities.clone(),
            doctors: self.doctors.clone(),
            rooms: self.rooms.clone(),
            query: self.query.clone(),
        }
    }
}

impl AddArgs {
    fn into_event(self, now: DateTime<Utc>) -> CalendarEvent {
        let mut event = CalendarEvent::new(self.id, self.title, self.event_type, self.start, self.end)
            .with_equipment(self.equipment)
            .created(self.created_by, now);
        if let Some(status) = self.status {
            event = event.with_status(status);
        }
        if let Some(priority) = self.priority {
            event = event.with_priority(priority);
        }
        if let (Some(id), Some(name)) = (self.patient_id, self.patient_name) {
            event = event.with_patient(id, name);
        }
        if let (Some(id), Some(name)) = (self.doctor_id, self.doctor_name) {
            event = event.with_doctor(id, name);
        }
        if let Some(room) = self.room {
            event = event.with_room(room);
        }
        if let Some(notes) = self.notes {
            event = event.with_notes(notes);
        }
        event
    }
}

impl From<UpdateArgs> for EventPatch {
    fn from(args: UpdateArgs) -> Self {
        EventPatch {
            title: args.title,
            start_time: args.start,
            end_time: args.end,
            event_type: args.event_type,
            status: args.status,
            priority: args.priority,
            room: args.room,
            notes: args.notes,
            ..EventPatch::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_cli=info,clinic_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = settings::load_config(args.config.as_deref())?;
    debug!(?config, "configuration loaded");

    let offset = FixedOffset::east_opt(args.offset_minutes.saturating_mul(60))
        .with_context(|| format!("offset of {} minutes is out of range", args.offset_minutes))?;
    let now = Utc::now();
    let today = now.with_timezone(&offset).date_naive();

    let storage = FileStorage::new(&args.store);
    let store = EventStore::with_config(&storage, sample_events(today, offset), &config);
    store.initialize();

    match args.command {
        Command::List(list) => run_list(&store, &config, list, today, offset)?,
        Command::Upcoming { limit } => {
            let events = store.load();
            let limit = limit.unwrap_or(config.upcoming_limit);
            for event in query::upcoming_events(&events, now, limit) {
                println!("{}", event_line(event, offset));
            }
        }
        Command::Add(add) => {
            let added = store.add(add.into_event(now))?;
            info!(id = %added.id, "event added");
            println!("{}", event_line(&added, offset));
        }
        Command::Update(update) => {
            let id = update.id.clone();
            let patch = EventPatch::from(update);
            if patch.is_empty() {
                bail!("nothing to update for event {id}");
            }
            match store.update(&id, patch)? {
                Some(updated) => println!("{}", event_line(&updated, offset)),
                None => println!("No event with id {id}"),
            }
        }
        Command::Delete { id } => {
            if store.delete(&id) {
                println!("Deleted event {id}");
            } else {
                println!("No event with id {id}");
            }
        }
        Command::Reset => {
            store.reset();
            println!("Restored {} sample events", store.seed().len());
        }
        Command::Clinic { id } => show_clinic(&Dataset::builtin(), &id)?,
        Command::Machine { id } => {
            let dataset = Dataset::builtin();
            match dataset.find_machine(&id) {
                Some(machine) => println!("{}", serde_json::to_string_pretty(machine)?),
                None => println!("Machine {id} not found"),
            }
        }
        Command::Patient { id } => {
            let dataset = Dataset::builtin();
            match dataset.find_patient(&id) {
                Some(patient) => {
                    println!("{}", serde_json::to_string_pretty(patient)?);
                    if let Some(age) = patient.age_on(today) {
                        println!("Age: {age}");
                    }
                }
                None => println!("Patient {id} not found"),
            }
        }
        Command::Network => {
            let summary = clinic_data::summarize_network(&Dataset::builtin());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn run_list(
    store: &EventStore<&FileStorage>,
    config: &CalendarConfig,
    list: ListArgs,
    today: NaiveDate,
    offset: FixedOffset,
) -> Result<()> {
    let mut view = CalendarView::new(list.date.unwrap_or(today), offset)
        .with_config(config)
        .with_mode(list.view);
    view.set_filter(list.filter());
    view.set_doctor(list.scope.clone());

    let events = store.load();
    view.finish_loading();
    let visible = view.visible_events(&events);

    if list.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    println!("{}", view.title());
    if visible.is_empty() {
        println!("  (no events)");
    }
    for event in visible {
        println!("  {}", event_line(event, offset));
    }
    Ok(())
}

fn show_clinic(dataset: &Dataset, id: &str) -> Result<()> {
    let (Some(clinic), Some(summary)) =
        (dataset.find_clinic(id), clinic_data::summarize_clinic(dataset, id))
    else {
        println!("Clinic {id} not found");
        return Ok(());
    };

    println!("{} ({}, {})", clinic.name, clinic.address, clinic.city);
    println!(
        "Machines: {}  utilization: {:.1}%  average hours: {:.1}",
        summary.machines_total, summary.utilization_percent, summary.average_hours_in_use
    );
    for (status, count) in &summary.machines_by_status {
        println!("  {:<12}{count}", status.label());
    }
    println!(
        "Patients: {}  treatments today: {}",
        summary.patients, summary.treatments_today
    );
    Ok(())
}

fn event_line(event: &CalendarEvent, offset: FixedOffset) -> String {
    let start = event.start_time.with_timezone(&offset);
    let end = event.end_time.with_timezone(&offset);
    let who = event
        .patient_name
        .as_deref()
        .or(event.doctor_name.as_deref())
        .unwrap_or("-");
    format!(
        "[{}] {} {}-{}  {:<20} {:<14} {:<12} {:<8} {}",
        event.id,
        start.format("%Y-%m-%d"),
        start.format("%H:%M"),
        end.format("%H:%M"),
        event.title,
        event.event_type,
        event.status,
        event.priority,
        who
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset;

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    #[test]
    fn list_flags_become_a_filter() {
        let args = Args::parse_from([
            "clinic-cli", "list", "--view", "day", "--type", "emergency", "--status", "scheduled",
            "--query", "jones",
        ]);
        let Command::List(list) = args.command else {
            panic!("expected list");
        };
        assert_eq!(list.view, ViewMode::Day);
        let filter = list.filter();
        assert_eq!(filter.types, vec![EventType::Emergency]);
        assert_eq!(filter.statuses, vec![EventStatus::Scheduled]);
        assert_eq!(filter.query, "jones");
    }

    #[test]
    fn update_flags_become_a_patch() {
        let args = Args::parse_from(["clinic-cli", "update", "3", "--status", "in-progress"]);
        let Command::Update(update) = args.command else {
            panic!("expected update");
        };
        assert_eq!(EventPatch::from(update), EventPatch::status(EventStatus::InProgress));
    }

    #[test]
    fn add_and_list_through_a_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store.json"));
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let store = EventStore::new(&storage, sample_events(today, utc()));
        store.initialize();

        let args = Args::parse_from([
            "clinic-cli", "add", "--id", "cli-1", "--title", "Water system check", "--type",
            "maintenance", "--start", "2026-10-19T18:00:00+00:00", "--end",
            "2026-10-19T19:00:00+00:00", "--equipment", "RO unit",
        ]);
        let Command::Add(add) = args.command else {
            panic!("expected add");
        };
        let added = store.add(add.into_event(Utc::now())).unwrap();
        assert_eq!(added.equipment, vec!["RO unit".to_string()]);
        assert_eq!(added.created_by, "cli");

        let reopened = EventStore::new(FileStorage::new(storage.path()), Vec::new());
        let events = reopened.load();
        let view = CalendarView::new(today, utc()).with_mode(ViewMode::Day);
        assert!(view.visible_events(&events).iter().any(|event| event.id == "cli-1"));
    }

    #[test]
    fn negative_offsets_parse() {
        let args = Args::parse_from(["clinic-cli", "--offset-minutes", "-300", "reset"]);
        assert_eq!(args.offset_minutes, -300);
    }
}
