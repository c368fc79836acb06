//! Pharmacist-side report form.

use serde::{Deserialize, Serialize};

use super::Session;
use crate::models::{join_display_names, MedicationEntry, PatientData};
use crate::store::{PatientHandle, PatientStore};

/// Gender choices offered by the form.
pub const GENDER_OPTIONS: [&str; 4] = ["", "여성", "남성", "기타"];

/// Gender preselected when the record has none.
pub const DEFAULT_GENDER: &str = "여성";

/// The pharmacist's patient form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PharmacistForm {
    /// Record being edited; `None` creates a new record on submit
    pub selected: Option<PatientHandle>,
    pub name: String,
    pub age: String,
    pub gender: String,
    pub conditions: String,
    /// Comma-separated medication names
    pub medications_text: String,
    pub memo: String,
}

impl PharmacistForm {
    /// Form prefilled from the selected record, or from the most recent one
    /// when nothing is selected. An empty store yields a blank form.
    pub fn prefill(store: &PatientStore, selected: Option<PatientHandle>) -> Self {
        let found = match selected {
            Some(handle) => store.get(handle).map(|record| (handle, record)),
            None => store.find_most_recent(),
        };

        let Some((handle, record)) = found else {
            return Self {
                gender: DEFAULT_GENDER.to_string(),
                ..Default::default()
            };
        };

        Self {
            selected: Some(handle),
            name: record.name.clone(),
            age: record.age.clone(),
            gender: if record.gender.is_empty() {
                DEFAULT_GENDER.to_string()
            } else {
                record.gender.clone()
            },
            conditions: record.conditions.clone(),
            medications_text: join_display_names(&record.medications),
            memo: record.memo.clone(),
        }
    }

    /// Convert the form into a record payload.
    pub fn to_patient_data(&self) -> PatientData {
        PatientData {
            name: self.name.clone(),
            age: self.age.clone(),
            gender: self.gender.clone(),
            conditions: self.conditions.clone(),
            medications: parse_medication_list(&self.medications_text)
                .into_iter()
                .map(MedicationEntry::Label)
                .collect(),
            memo: self.memo.clone(),
        }
    }
}

/// Split comma-separated medication names, dropping blanks.
pub fn parse_medication_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

impl Session {
    /// Store a generated report: update the selected record in place or add
    /// a new one.
    pub fn submit_report(&mut self, form: &PharmacistForm, report: String) -> PatientHandle {
        let handle = self
            .store
            .upsert(form.selected, form.to_patient_data(), Some(report));
        tracing::info!(session = %self.id, index = handle.index(), "Pharmacist report stored");
        handle
    }
}
