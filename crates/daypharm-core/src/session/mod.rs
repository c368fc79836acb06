//! Per-user session context.
//!
//! A session owns everything one dashboard user mutates: the patient
//! registry, the patient-side medication list, chat history and schedule
//! checkboxes. Sessions never share state, so concurrent users stay isolated.

mod intake;
mod pharmacist;

pub use intake::*;
pub use pharmacist::*;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    ChatMessage, DoseTime, MedicationRecord, PatientRecord, Schedule, ScheduleEntry,
    DEFAULT_FREQUENCY, DEFAULT_TIMING,
};
use crate::schedule::ScheduleEngine;
use crate::store::{PatientStore, StoreError, StoreResult};

/// Dashboard role of the acting user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Pharmacist,
    #[default]
    Patient,
}

/// Identity of one schedule checkbox.
///
/// `slot` is the medication's position in the patient list, so the same
/// medication registered twice gets two independent checkboxes. The name
/// must match too, which keeps marks from carrying over to a different
/// medication after the list is replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DoseKey {
    pub date: NaiveDate,
    pub time: DoseTime,
    pub slot: usize,
    pub medication: String,
}

impl DoseKey {
    /// Key addressing an existing schedule entry.
    pub fn for_entry(entry: &ScheduleEntry) -> Self {
        Self {
            date: entry.date,
            time: entry.time,
            slot: entry.slot,
            medication: entry.medication.clone(),
        }
    }
}

/// One user's dashboard state.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    role: Role,
    store: PatientStore,
    patient_medications: Vec<MedicationRecord>,
    chat_history: Vec<ChatMessage>,
    taken: BTreeSet<DoseKey>,
    engine: ScheduleEngine,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a new session with a fresh id and empty state.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::default(),
            store: PatientStore::new(),
            patient_medications: Vec::new(),
            chat_history: Vec::new(),
            taken: BTreeSet::new(),
            engine: ScheduleEngine::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        tracing::debug!(session = %self.id, ?role, "Role selected");
        self.role = role;
    }

    /// The session's patient registry.
    pub fn store(&self) -> &PatientStore {
        &self.store
    }

    /// Mutable access to the patient registry.
    pub fn store_mut(&mut self) -> &mut PatientStore {
        &mut self.store
    }

    /// Medications registered on the patient side.
    pub fn patient_medications(&self) -> &[MedicationRecord] {
        &self.patient_medications
    }

    /// Display names of the patient-side medications.
    pub fn medication_names(&self) -> Vec<String> {
        self.patient_medications
            .iter()
            .map(|m| m.display_name().to_string())
            .collect()
    }

    /// Select the patient's own record by display name.
    ///
    /// The record's medications replace the patient-side list, each with the
    /// default once-a-morning regimen since the pharmacist form stores names
    /// only.
    pub fn select_patient(&mut self, display_name: &str) -> StoreResult<&PatientRecord> {
        let handle = self.store.find_by_display_name(display_name)?;
        let record = self
            .store
            .get(handle)
            .ok_or_else(|| StoreError::NotFound(display_name.to_string()))?;

        self.patient_medications = record
            .medications
            .iter()
            .map(|entry| MedicationRecord {
                name: Some(entry.display_name().to_string()),
                dosage: Some(String::new()),
                frequency: Some(DEFAULT_FREQUENCY.to_string()),
                timing: Some(DEFAULT_TIMING.to_string()),
                duration: Some(String::new()),
            })
            .collect();

        tracing::debug!(
            session = %self.id,
            medications = self.patient_medications.len(),
            "Patient medications synchronized from record"
        );
        Ok(record)
    }

    /// Weekly schedule for the patient-side medications with checkbox state.
    pub fn schedule(&self, start: NaiveDate) -> Schedule {
        let mut schedule = self.engine.generate(&self.patient_medications, start);
        for entry in schedule.entries_mut() {
            entry.taken = self.taken.contains(&DoseKey::for_entry(entry));
        }
        schedule
    }

    /// Tick or clear a schedule checkbox.
    pub fn set_taken(&mut self, key: DoseKey, taken: bool) {
        if taken {
            self.taken.insert(key);
        } else {
            self.taken.remove(&key);
        }
    }

    /// Chat transcript in order.
    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }

    pub fn push_chat(&mut self, message: ChatMessage) {
        self.chat_history.push(message);
    }
}
