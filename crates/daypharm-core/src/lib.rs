//! DayPharm Core Library
//!
//! Medication scheduling and the shared patient registry behind the
//! two-role (pharmacist / patient) DayPharm dashboard.
//!
//! # Architecture
//!
//! ```text
//!   Prescription photo / manual form
//!                 │
//!                 ▼
//!        [PATIENT: record_intake] ──────────────┐
//!                 │                             │
//!                 ▼                             ▼
//!    patient medication list            PatientStore (per session)
//!                 │                             │
//!                 ▼                             ▼
//!         ScheduleEngine             [PHARMACIST: prefill → report]
//!     (timing → frequency rules)                │
//!                 │                             ▼
//!                 ▼                      upsert (in place / append)
//!         7-day Schedule
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (MedicationRecord, PatientRecord, Schedule, etc.)
//! - [`schedule`]: Keyword rules and the weekly schedule engine
//! - [`store`]: Patient registry with upsert-by-selection
//! - [`session`]: Per-user session context and role workflows

pub mod models;
pub mod schedule;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use models::{
    ChatMessage, ChatRole, DoseTime, MedicationEntry, MedicationRecord, PatientData,
    PatientRecord, Schedule, ScheduleEntry,
};
pub use schedule::{generate_schedule, DoseRules, ScheduleEngine};
pub use session::{DoseKey, PharmacistForm, PrescriptionIntake, Role, Session};
pub use store::{PatientHandle, PatientStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DaypharmError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session error: {0}")]
    SessionError(String),
}

impl From<StoreError> for DaypharmError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(name) => DaypharmError::NotFound(name),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for DaypharmError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DaypharmError::SessionError(format!("Lock poisoned: {}", e))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, DaypharmError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| DaypharmError::InvalidInput(format!("date '{}': {}", value, e)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Start a new, empty dashboard session.
#[uniffi::export]
pub fn new_session() -> Arc<DaypharmCore> {
    Arc::new(DaypharmCore {
        session: Arc::new(Mutex::new(Session::new())),
    })
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe session wrapper for FFI.
#[derive(uniffi::Object)]
pub struct DaypharmCore {
    session: Arc<Mutex<Session>>,
}

#[uniffi::export]
impl DaypharmCore {
    /// Session identifier.
    pub fn session_id(&self) -> Result<String, DaypharmError> {
        let session = self.session.lock()?;
        Ok(session.id().to_string())
    }

    /// Switch between pharmacist and patient views.
    pub fn set_role(&self, role: FfiRole) -> Result<(), DaypharmError> {
        let mut session = self.session.lock()?;
        session.set_role(role.into());
        Ok(())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register intake results and forward them to the pharmacy.
    pub fn record_intake(&self, intake: FfiIntake) -> Result<FfiPatient, DaypharmError> {
        let mut session = self.session.lock()?;
        let handle = session.record_intake(intake.into());
        patient_at(session.store(), handle)
    }

    /// Select the patient's own record and sync its medications.
    pub fn select_patient(&self, display_name: String) -> Result<FfiPatient, DaypharmError> {
        let mut session = self.session.lock()?;
        session.select_patient(&display_name)?;
        let handle = session.store().find_by_display_name(&display_name)?;
        patient_at(session.store(), handle)
    }

    /// Patient-side medication list.
    pub fn patient_medications(&self) -> Result<Vec<FfiMedication>, DaypharmError> {
        let session = self.session.lock()?;
        Ok(session
            .patient_medications()
            .iter()
            .cloned()
            .map(FfiMedication::from)
            .collect())
    }

    /// Weekly schedule starting at `start_date` (`YYYY-MM-DD`).
    pub fn weekly_schedule(&self, start_date: String) -> Result<Vec<FfiScheduleDay>, DaypharmError> {
        let start = parse_date(&start_date)?;
        let session = self.session.lock()?;
        let schedule = session.schedule(start);
        Ok(schedule
            .date_keys()
            .map(|key| FfiScheduleDay {
                date: key.to_string(),
                entries: schedule
                    .day_sorted(key)
                    .into_iter()
                    .map(FfiScheduleEntry::from)
                    .collect(),
            })
            .collect())
    }

    /// Tick or clear a schedule checkbox.
    pub fn set_taken(
        &self,
        date: String,
        time: String,
        slot: u32,
        medication: String,
        taken: bool,
    ) -> Result<(), DaypharmError> {
        let date = parse_date(&date)?;
        let time = DoseTime::from_clock(&time)
            .ok_or_else(|| DaypharmError::InvalidInput(format!("time '{}'", time)))?;
        let mut session = self.session.lock()?;
        session.set_taken(
            DoseKey {
                date,
                time,
                slot: slot as usize,
                medication,
            },
            taken,
        );
        Ok(())
    }

    // =========================================================================
    // Pharmacist Operations
    // =========================================================================

    /// All records in insertion order.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, DaypharmError> {
        let session = self.session.lock()?;
        let store = session.store();
        Ok(store
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| FfiPatient::from_record(i, record))
            .collect())
    }

    /// The last-appended record, if any.
    pub fn most_recent_patient(&self) -> Result<Option<FfiPatient>, DaypharmError> {
        let session = self.session.lock()?;
        Ok(session
            .store()
            .find_most_recent()
            .map(|(handle, record)| FfiPatient::from_record(handle.index(), record)))
    }

    /// Form prefilled from the selected (or most recent) record.
    pub fn prefill_form(&self, selected: Option<u32>) -> Result<FfiPharmacistForm, DaypharmError> {
        let session = self.session.lock()?;
        let handle = selected.map(|i| PatientHandle::from_index(i as usize));
        if let Some(handle) = handle {
            if session.store().get(handle).is_none() {
                return Err(DaypharmError::NotFound(format!("patient #{}", handle.index())));
            }
        }
        Ok(PharmacistForm::prefill(session.store(), handle).into())
    }

    /// Store a report written for the submitted form.
    pub fn submit_report(
        &self,
        form: FfiPharmacistForm,
        report: String,
    ) -> Result<FfiPatient, DaypharmError> {
        let mut session = self.session.lock()?;
        let handle = session.submit_report(&form.into(), report);
        patient_at(session.store(), handle)
    }
}

fn patient_at(store: &PatientStore, handle: PatientHandle) -> Result<FfiPatient, DaypharmError> {
    store
        .get(handle)
        .map(|record| FfiPatient::from_record(handle.index(), record))
        .ok_or_else(|| DaypharmError::NotFound(format!("patient #{}", handle.index())))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe role.
#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiRole {
    Pharmacist,
    Patient,
}

impl From<FfiRole> for Role {
    fn from(role: FfiRole) -> Self {
        match role {
            FfiRole::Pharmacist => Role::Pharmacist,
            FfiRole::Patient => Role::Patient,
        }
    }
}

/// FFI-safe medication record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub timing: Option<String>,
    pub duration: Option<String>,
}

impl From<MedicationRecord> for FfiMedication {
    fn from(record: MedicationRecord) -> Self {
        Self {
            name: record.name,
            dosage: record.dosage,
            frequency: record.frequency,
            timing: record.timing,
            duration: record.duration,
        }
    }
}

impl From<FfiMedication> for MedicationRecord {
    fn from(med: FfiMedication) -> Self {
        MedicationRecord {
            name: med.name,
            dosage: med.dosage,
            frequency: med.frequency,
            timing: med.timing,
            duration: med.duration,
        }
    }
}

/// FFI-safe intake result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIntake {
    pub name: String,
    pub age: String,
    pub medications: Vec<FfiMedication>,
}

impl From<FfiIntake> for PrescriptionIntake {
    fn from(intake: FfiIntake) -> Self {
        PrescriptionIntake {
            name: intake.name,
            age: intake.age,
            medications: intake.medications.into_iter().map(|m| m.into()).collect(),
        }
    }
}

/// FFI-safe patient record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub index: u32,
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub option_label: String,
    pub age: String,
    pub gender: String,
    pub conditions: String,
    pub memo: String,
    pub medications: Vec<String>,
    pub report: Option<String>,
}

impl FfiPatient {
    fn from_record(index: usize, record: &PatientRecord) -> Self {
        Self {
            index: index as u32,
            id: record.id.clone(),
            name: record.name.clone(),
            display_name: record.display_name().to_string(),
            option_label: record.option_label(),
            age: record.age.clone(),
            gender: record.gender.clone(),
            conditions: record.conditions.clone(),
            memo: record.memo.clone(),
            medications: record
                .medications
                .iter()
                .map(|m| m.display_name().to_string())
                .collect(),
            report: record.report.clone(),
        }
    }
}

/// FFI-safe pharmacist form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPharmacistForm {
    pub selected: Option<u32>,
    pub name: String,
    pub age: String,
    pub gender: String,
    pub conditions: String,
    pub medications_text: String,
    pub memo: String,
}

impl From<PharmacistForm> for FfiPharmacistForm {
    fn from(form: PharmacistForm) -> Self {
        Self {
            selected: form.selected.map(|h| h.index() as u32),
            name: form.name,
            age: form.age,
            gender: form.gender,
            conditions: form.conditions,
            medications_text: form.medications_text,
            memo: form.memo,
        }
    }
}

impl From<FfiPharmacistForm> for PharmacistForm {
    fn from(form: FfiPharmacistForm) -> Self {
        PharmacistForm {
            selected: form.selected.map(|i| PatientHandle::from_index(i as usize)),
            name: form.name,
            age: form.age,
            gender: form.gender,
            conditions: form.conditions,
            medications_text: form.medications_text,
            memo: form.memo,
        }
    }
}

/// FFI-safe schedule day, entries sorted by time.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScheduleDay {
    pub date: String,
    pub entries: Vec<FfiScheduleEntry>,
}

/// FFI-safe schedule entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScheduleEntry {
    pub time: String,
    pub slot: u32,
    pub medication: String,
    pub dosage: String,
    pub taken: bool,
}

impl From<&ScheduleEntry> for FfiScheduleEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            time: entry.time.clock().to_string(),
            slot: entry.slot as u32,
            medication: entry.medication.clone(),
            dosage: entry.dosage.clone(),
            taken: entry.taken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> FfiIntake {
        FfiIntake {
            name: "홍길동".into(),
            age: "45".into(),
            medications: vec![FfiMedication {
                name: Some("Amoxicillin".into()),
                dosage: Some("500mg".into()),
                frequency: Some("1일 3회".into()),
                timing: None,
                duration: Some("7일".into()),
            }],
        }
    }

    #[test]
    fn test_ffi_intake_and_schedule() {
        let core = new_session();
        let patient = core.record_intake(intake()).unwrap();
        assert_eq!(patient.index, 0);
        assert_eq!(patient.medications, vec!["Amoxicillin"]);

        let days = core.weekly_schedule("2024-01-01".into()).unwrap();
        assert_eq!(days.len(), 7);
        let times: Vec<_> = days[0].entries.iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times, vec!["08:00", "12:00", "18:00"]);
    }

    #[test]
    fn test_ffi_set_taken() {
        let core = new_session();
        core.record_intake(intake()).unwrap();
        core.set_taken("2024-01-01".into(), "12:00".into(), 0, "Amoxicillin".into(), true)
            .unwrap();

        let days = core.weekly_schedule("2024-01-01".into()).unwrap();
        let taken: Vec<_> = days[0].entries.iter().map(|e| e.taken).collect();
        assert_eq!(taken, vec![false, true, false]);
    }

    #[test]
    fn test_ffi_rejects_bad_input() {
        let core = new_session();
        assert!(matches!(
            core.weekly_schedule("01/01/2024".into()),
            Err(DaypharmError::InvalidInput(_))
        ));
        assert!(matches!(
            core.set_taken("2024-01-01".into(), "09:30".into(), 0, "x".into(), true),
            Err(DaypharmError::InvalidInput(_))
        ));
        assert!(matches!(
            core.select_patient("nobody".into()),
            Err(DaypharmError::NotFound(_))
        ));
    }

    #[test]
    fn test_ffi_report_round() {
        let core = new_session();
        core.record_intake(intake()).unwrap();

        let mut form = core.prefill_form(None).unwrap();
        assert_eq!(form.selected, Some(0));
        form.memo = "신기능 확인".into();

        let patient = core.submit_report(form, "리포트".into()).unwrap();
        assert_eq!(patient.report.as_deref(), Some("리포트"));
        assert_eq!(core.list_patients().unwrap().len(), 1);
        assert_eq!(core.most_recent_patient().unwrap().unwrap().memo, "신기능 확인");
    }

    #[test]
    fn test_ffi_taken_addresses_one_slot() {
        let core = new_session();
        core.record_intake(intake()).unwrap();
        core.record_intake(intake()).unwrap();

        let days = core.weekly_schedule("2024-01-01".into()).unwrap();
        let slots: Vec<_> = days[0].entries.iter().map(|e| (e.time.as_str(), e.slot)).collect();
        assert_eq!(slots[0], ("08:00", 0));
        assert_eq!(slots[1], ("08:00", 1));

        core.set_taken("2024-01-01".into(), "08:00".into(), 1, "Amoxicillin".into(), true)
            .unwrap();
        let days = core.weekly_schedule("2024-01-01".into()).unwrap();
        let morning: Vec<_> = days[0].entries[..2].iter().map(|e| e.taken).collect();
        assert_eq!(morning, vec![false, true]);
    }

    #[test]
    fn test_ffi_prefill_unknown_index_is_not_found() {
        let core = new_session();
        core.record_intake(intake()).unwrap();
        assert!(matches!(
            core.prefill_form(Some(5)),
            Err(DaypharmError::NotFound(_))
        ));
        assert_eq!(core.prefill_form(Some(0)).unwrap().selected, Some(0));
    }
}
