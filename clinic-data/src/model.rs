use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clinic {
    pub id: String,
    pub name: String,
    pub city: String,
    pub address: String,
    pub phone: String,
    /// Number of dialysis chairs.
    pub stations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub clinic_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Active,
    Idle,
    Maintenance,
    Offline,
}

impl MachineStatus {
    pub const ALL: [MachineStatus; 4] = [
        MachineStatus::Active,
        MachineStatus::Idle,
        MachineStatus::Maintenance,
        MachineStatus::Offline,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MachineStatus::Active => "Active",
            MachineStatus::Idle => "Idle",
            MachineStatus::Maintenance => "Maintenance",
            MachineStatus::Offline => "Offline",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    pub id: String,
    pub clinic_id: String,
    pub model: String,
    pub status: MachineStatus,
    pub hours_in_use: f64,
    pub last_service: NaiveDate,
    pub treatments_today: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub clinic_id: String,
    pub doctor_id: String,
    pub date_of_birth: NaiveDate,
    /// Weekdays of recurring dialysis sessions.
    #[serde(default)]
    pub schedule: Vec<Weekday>,
    #[serde(default)]
    pub reward_points: u32,
}

impl Patient {
    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        today.years_since(self.date_of_birth)
    }

    pub fn has_session_on(&self, weekday: Weekday) -> bool {
        self.schedule.contains(&weekday)
    }
}
