use crate::event::EventStatus;

/// Errors surfaced by the calendar store and helpers.
#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("event {id} ends before it starts")]
    InvalidTimeRange { id: String },
    #[error("an event with id {0} already exists")]
    DuplicateId(String),
    #[error("event {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: EventStatus,
        to: EventStatus,
    },
    #[error("could not read data: {0}")]
    Parse(String),
}

/// Failures reported by a key-value backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("read failed: {0}")]
    Read(String),
    #[error("write failed: {0}")]
    Write(String),
}

/// A string did not name any variant of a labelled enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
