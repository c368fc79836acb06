//! Patient models.

use serde::{Deserialize, Serialize};

use super::medication::{join_display_names, MedicationEntry};

/// Placeholder shown for a record without a name.
pub const UNNAMED_PATIENT: &str = "(이름없음)";

/// A patient record shared between the pharmacist and patient views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Creation timestamp, used as practical identity
    pub id: String,
    /// Patient name
    #[serde(default)]
    pub name: String,
    /// Age as entered (free text)
    #[serde(default)]
    pub age: String,
    /// Gender as entered
    #[serde(default)]
    pub gender: String,
    /// Diagnoses / conditions / symptoms
    #[serde(default)]
    pub conditions: String,
    /// Pharmacist memo
    #[serde(default)]
    pub memo: String,
    /// Current medications (labels or structured records)
    #[serde(default)]
    pub medications: Vec<MedicationEntry>,
    /// Narrative report written by the pharmacist workflow
    #[serde(default)]
    pub report: Option<String>,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: String,
}

impl PatientRecord {
    /// Create an empty record stamped with the current time.
    pub fn new() -> Self {
        let now = timestamp();
        Self {
            id: now.clone(),
            name: String::new(),
            age: String::new(),
            gender: String::new(),
            conditions: String::new(),
            memo: String::new(),
            medications: Vec::new(),
            report: None,
            updated_at: now,
        }
    }

    /// Create a record from a form payload.
    pub fn from_data(data: PatientData) -> Self {
        let mut record = Self::new();
        record.apply(data);
        record
    }

    /// Overwrite the form-updatable fields.
    pub fn apply(&mut self, data: PatientData) {
        self.name = data.name;
        self.age = data.age;
        self.gender = data.gender;
        self.conditions = data.conditions;
        self.medications = data.medications;
        self.memo = data.memo;
    }

    /// Name shown in selection lists.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNNAMED_PATIENT
        } else {
            &self.name
        }
    }

    /// Summary line used by the pharmacist's patient picker.
    pub fn option_label(&self) -> String {
        let name = if self.name.is_empty() { "이름없음" } else { &self.name };
        let age = if self.age.is_empty() { "?" } else { &self.age };
        format!("{} / {}세 / 약 {}개", name, age, self.medications.len())
    }

    /// Medication names joined for display.
    pub fn medication_summary(&self) -> String {
        join_display_names(&self.medications)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = timestamp();
    }
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self::new()
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Fields the pharmacist form can set on a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatientData {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub conditions: String,
    pub medications: Vec<MedicationEntry>,
    pub memo: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicationRecord;

    #[test]
    fn test_new_record() {
        let record = PatientRecord::new();
        assert!(record.name.is_empty());
        assert!(record.report.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&record.id).is_ok());
    }

    #[test]
    fn test_display_name_placeholder() {
        let mut record = PatientRecord::new();
        assert_eq!(record.display_name(), UNNAMED_PATIENT);
        record.name = "김철수".into();
        assert_eq!(record.display_name(), "김철수");
    }

    #[test]
    fn test_option_label() {
        let mut record = PatientRecord::new();
        assert_eq!(record.option_label(), "이름없음 / ?세 / 약 0개");

        record.name = "김철수".into();
        record.age = "67".into();
        record.medications = vec![
            MedicationEntry::from("Tylenol"),
            MedicationEntry::from(MedicationRecord::named("Amoxicillin")),
        ];
        assert_eq!(record.option_label(), "김철수 / 67세 / 약 2개");
        assert_eq!(record.medication_summary(), "Tylenol, Amoxicillin");
    }

    #[test]
    fn test_apply_keeps_id_and_report() {
        let mut record = PatientRecord::new();
        record.report = Some("old report".into());
        let id = record.id.clone();

        record.apply(PatientData {
            name: "이영희".into(),
            memo: "신기능 저하".into(),
            ..Default::default()
        });

        assert_eq!(record.id, id);
        assert_eq!(record.name, "이영희");
        assert_eq!(record.memo, "신기능 저하");
        assert_eq!(record.report.as_deref(), Some("old report"));
    }
}
