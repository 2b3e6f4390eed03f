use clinic_core::ClinicError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::model::{Clinic, Doctor, Machine, Patient};

const BUILTIN_NETWORK: &str = include_str!("../data/network.json");

/// Read access to the clinic network. Pages take this instead of reaching for
/// shared fixture arrays, so tests can hand in their own fixtures.
///
/// Lookups return `None` on a miss; callers render a "not found" state.
pub trait ClinicDirectory {
    fn clinics(&self) -> &[Clinic];
    fn doctors(&self) -> &[Doctor];
    fn machines(&self) -> &[Machine];
    fn patients(&self) -> &[Patient];

    fn find_clinic(&self, id: &str) -> Option<&Clinic> {
        self.clinics().iter().find(|clinic| clinic.id == id)
    }

    fn find_doctor(&self, id: &str) -> Option<&Doctor> {
        self.doctors().iter().find(|doctor| doctor.id == id)
    }

    fn find_machine(&self, id: &str) -> Option<&Machine> {
        self.machines().iter().find(|machine| machine.id == id)
    }

    fn find_patient(&self, id: &str) -> Option<&Patient> {
        self.patients().iter().find(|patient| patient.id == id)
    }

    fn machines_in_clinic(&self, clinic_id: &str) -> Vec<&Machine> {
        self.machines()
            .iter()
            .filter(|machine| machine.clinic_id == clinic_id)
            .collect()
    }

    fn patients_in_clinic(&self, clinic_id: &str) -> Vec<&Patient> {
        self.patients()
            .iter()
            .filter(|patient| patient.clinic_id == clinic_id)
            .collect()
    }

    fn patients_of_doctor(&self, doctor_id: &str) -> Vec<&Patient> {
        self.patients()
            .iter()
            .filter(|patient| patient.doctor_id == doctor_id)
            .collect()
    }
}

/// Whole clinic network as loaded from a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    #[serde(default)]
    pub clinics: Vec<Clinic>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub machines: Vec<Machine>,
    #[serde(default)]
    pub patients: Vec<Patient>,
}

impl Dataset {
    pub fn from_json_str(json: &str) -> Result<Self, ClinicError> {
        let value: Value =
            serde_json::from_str(json).map_err(|err| ClinicError::Parse(err.to_string()))?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, ClinicError> {
        if !value.is_object() {
            return Err(ClinicError::Parse(
                "expected a JSON object with clinics, doctors, machines and patients".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|err| ClinicError::Parse(err.to_string()))
    }

    /// Network bundled with the crate. An unreadable bundle yields an empty network.
    pub fn builtin() -> Self {
        match Self::from_json_str(BUILTIN_NETWORK) {
            Ok(dataset) => dataset,
            Err(err) => {
                error!(%err, "bundled clinic network is invalid");
                Self::default()
            }
        }
    }

    /// References to clinics or doctors that do not exist, as `(record id, missing id)`.
    pub fn dangling_references(&self) -> Vec<(String, String)> {
        let mut dangling = Vec::new();

        for doctor in &self.doctors {
            if self.find_clinic(&doctor.clinic_id).is_none() {
                dangling.push((doctor.id.clone(), doctor.clinic_id.clone()));
            }
        }
        for machine in &self.machines {
            if self.find_clinic(&machine.clinic_id).is_none() {
                dangling.push((machine.id.clone(), machine.clinic_id.clone()));
            }
        }
        for patient in &self.patients {
            if self.find_clinic(&patient.clinic_id).is_none() {
                dangling.push((patient.id.clone(), patient.clinic_id.clone()));
            }
            if self.find_doctor(&patient.doctor_id).is_none() {
                dangling.push((patient.id.clone(), patient.doctor_id.clone()));
            }
        }

        dangling
    }
}

impl ClinicDirectory for Dataset {
    fn clinics(&self) -> &[Clinic] {
        &self.clinics
    }

    fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    fn machines(&self) -> &[Machine] {
        &self.machines
    }

    fn patients(&self) -> &[Patient] {
        &self.patients
    }
}
