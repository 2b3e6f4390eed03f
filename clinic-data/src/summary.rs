//! Aggregates shown on the admin and clinic dashboards.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::directory::ClinicDirectory;
use crate::model::{Clinic, MachineStatus, Patient};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicSummary {
    pub clinic_id: String,
    pub clinic_name: String,
    pub machines_total: usize,
    pub machines_by_status: BTreeMap<MachineStatus, usize>,
    /// Share of machines currently treating, in percent with one decimal.
    pub utilization_percent: f64,
    pub average_hours_in_use: f64,
    pub patients: usize,
    pub treatments_today: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkSummary {
    pub clinics: Vec<ClinicSummary>,
    pub machines_total: usize,
    pub machines_active: usize,
    pub utilization_percent: f64,
    pub patients: usize,
    pub treatments_today: u32,
}

pub fn summarize_clinic<D: ClinicDirectory + ?Sized>(directory: &D, clinic_id: &str) -> Option<ClinicSummary> {
    let clinic = directory.find_clinic(clinic_id)?;
    Some(build_summary(directory, clinic))
}

/// Every clinic ordered by name, plus network-wide totals.
pub fn summarize_network<D: ClinicDirectory + ?Sized>(directory: &D) -> NetworkSummary {
    let mut clinics: Vec<ClinicSummary> = directory
        .clinics()
        .iter()
        .map(|clinic| build_summary(directory, clinic))
        .collect();
    clinics.sort_by(|a, b| a.clinic_name.cmp(&b.clinic_name));

    let machines_total = clinics.iter().map(|c| c.machines_total).sum();
    let machines_active = clinics
        .iter()
        .map(|c| c.machines_by_status.get(&MachineStatus::Active).copied().unwrap_or(0))
        .sum();

    NetworkSummary {
        machines_total,
        machines_active,
        utilization_percent: percent(machines_active, machines_total),
        patients: clinics.iter().map(|c| c.patients).sum(),
        treatments_today: clinics.iter().map(|c| c.treatments_today).sum(),
        clinics,
    }
}

fn build_summary<D: ClinicDirectory + ?Sized>(directory: &D, clinic: &Clinic) -> ClinicSummary {
    let machines = directory.machines_in_clinic(&clinic.id);

    let mut machines_by_status: BTreeMap<MachineStatus, usize> =
        MachineStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for machine in &machines {
        *machines_by_status.entry(machine.status).or_insert(0) += 1;
    }

    let active = machines_by_status
        .get(&MachineStatus::Active)
        .copied()
        .unwrap_or(0);
    let total_hours: f64 = machines.iter().map(|machine| machine.hours_in_use).sum();
    let average_hours_in_use = if machines.is_empty() {
        0.0
    } else {
        round_one(total_hours / machines.len() as f64)
    };

    ClinicSummary {
        clinic_id: clinic.id.clone(),
        clinic_name: clinic.name.clone(),
        machines_total: machines.len(),
        utilization_percent: percent(active, machines.len()),
        average_hours_in_use,
        patients: directory.patients_in_clinic(&clinic.id).len(),
        treatments_today: machines.iter().map(|machine| machine.treatments_today).sum(),
        machines_by_status,
    }
}

/// Patients ordered by reward points, highest first; ties by name.
pub fn reward_leaderboard<D: ClinicDirectory + ?Sized>(directory: &D, limit: usize) -> Vec<&Patient> {
    let mut patients: Vec<&Patient> = directory.patients().iter().collect();
    patients.sort_by(|a, b| {
        b.reward_points
            .cmp(&a.reward_points)
            .then_with(|| a.name.cmp(&b.name))
    });
    patients.truncate(limit);
    patients
}

/// Case-insensitive search over patient names and ids.
pub fn search_patients<'a, D: ClinicDirectory + ?Sized>(directory: &'a D, query: &str) -> Vec<&'a Patient> {
    let query = query.trim().to_lowercase();
    directory
        .patients()
        .iter()
        .filter(|patient| {
            query.is_empty()
                || patient.name.to_lowercase().contains(&query)
                || patient.id.to_lowercase().contains(&query)
        })
        .collect()
}

/// Patients of a clinic with a recurring session on `weekday`.
pub fn session_roster<'a, D: ClinicDirectory + ?Sized>(
    directory: &'a D,
    clinic_id: &str,
    weekday: Weekday,
) -> Vec<&'a Patient> {
    directory
        .patients_in_clinic(clinic_id)
        .into_iter()
        .filter(|patient| patient.has_session_on(weekday))
        .collect()
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_one(part as f64 * 100.0 / whole as f64)
}

fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Dataset;

    #[test]
    fn clinic_summary_counts_machines_by_status() {
        let dataset = Dataset::builtin();
        let summary = summarize_clinic(&dataset, "C001").unwrap();

        assert_eq!(summary.machines_total, 4);
        assert_eq!(summary.machines_by_status[&MachineStatus::Active], 2);
        assert_eq!(summary.machines_by_status[&MachineStatus::Offline], 0);
        assert_eq!(summary.utilization_percent, 50.0);
        assert_eq!(summary.average_hours_in_use, 11000.0);
        assert_eq!(summary.treatments_today, 5);
        assert_eq!(summary.patients, 3);
    }

    #[test]
    fn empty_clinic_has_zero_ratios() {
        let dataset = Dataset::builtin();
        let summary = summarize_clinic(&dataset, "C003").unwrap();
        assert_eq!(summary.machines_total, 0);
        assert_eq!(summary.utilization_percent, 0.0);
        assert_eq!(summary.average_hours_in_use, 0.0);
    }

    #[test]
    fn unknown_clinic_has_no_summary() {
        assert!(summarize_clinic(&Dataset::builtin(), "C404").is_none());
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
    }

    #[test]
    fn leaderboard_orders_by_points() {
        let dataset = Dataset::builtin();
        let names: Vec<_> = reward_leaderboard(&dataset, 3).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Amelia Brooks", "Maria Lopez", "James Okafor"]);
    }

    #[test]
    fn search_matches_name_fragments() {
        let dataset = Dataset::builtin();
        let hits: Vec<_> = search_patients(&dataset, "LOP").iter().map(|p| p.id.as_str()).collect();
        assert_eq!(hits, vec!["P001"]);
        assert_eq!(search_patients(&dataset, "  ").len(), dataset.patients.len());
    }

    #[test]
    fn roster_uses_recurring_schedule() {
        let dataset = Dataset::builtin();
        let ids: Vec<_> = session_roster(&dataset, "C001", Weekday::Mon).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P001", "P003"]);
    }
}
