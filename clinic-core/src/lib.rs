//! Core calendar logic of the clinic dashboard: event model, persisted store,
//! selection helpers, the calendar view-model and live telemetry sources.

pub mod config;
pub mod error;
pub mod event;
pub mod query;
pub mod seed;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod view;

pub use config::{CalendarConfig, TransitionPolicy, WeekStart, DEFAULT_STORAGE_KEY};
pub use error::{ClinicError, StorageError, UnknownVariant};
pub use event::{CalendarEvent, EventPatch, EventStatus, EventType, Priority, BROADCAST_DOCTOR_ID};
pub use query::{DateWindow, EventFilter};
pub use storage::{KeyValueStore, MemoryStorage, NullStorage};
pub use store::{Clock, EventStore, SystemClock};
pub use telemetry::{FieldBounds, MachineTelemetry, RandomWalk, Reading, Replay, TelemetrySource};
pub use view::{CalendarView, ViewMode};
