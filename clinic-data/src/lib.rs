//! Clinic network fixtures (clinics, doctors, machines, patients), the
//! directory used by pages to look them up, and dashboard aggregates.

pub mod directory;
pub mod model;
pub mod summary;

pub use directory::{ClinicDirectory, Dataset};
pub use model::{Clinic, Doctor, Machine, MachineStatus, Patient};
pub use summary::{
    reward_leaderboard, search_patients, session_roster, summarize_clinic, summarize_network,
    ClinicSummary, NetworkSummary,
};
