//! Patient-side intake.

use serde::{Deserialize, Serialize};

use super::Session;
use crate::models::{MedicationEntry, MedicationRecord, PatientRecord};
use crate::store::PatientHandle;

/// What intake learned from a prescription bag or manual form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrescriptionIntake {
    /// Patient name ("" when unreadable)
    pub name: String,
    /// Patient age ("" when unreadable)
    pub age: String,
    pub medications: Vec<MedicationRecord>,
}

impl Session {
    /// Register intake results on the patient side and forward them to the
    /// pharmacy as a new record.
    ///
    /// The medications extend the patient's own list; the forwarded record
    /// carries no gender, conditions or report.
    pub fn record_intake(&mut self, intake: PrescriptionIntake) -> PatientHandle {
        self.patient_medications
            .extend(intake.medications.iter().cloned());

        let mut record = PatientRecord::new();
        record.name = intake.name;
        record.age = intake.age;
        record.medications = intake
            .medications
            .into_iter()
            .map(MedicationEntry::from)
            .collect();

        let handle = self.store.append(record);
        tracing::info!(
            session = %self.id,
            index = handle.index(),
            medications = self.patient_medications.len(),
            "Intake forwarded to pharmacy"
        );
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_appends_and_extends() {
        let mut session = Session::new();
        let intake = PrescriptionIntake {
            name: "홍길동".into(),
            age: "45".into(),
            medications: vec![MedicationRecord::named("Amoxicillin")],
        };

        let first = session.record_intake(intake.clone());
        let second = session.record_intake(intake);

        assert_ne!(first, second);
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.patient_medications().len(), 2);

        let record = session.store().get(second).unwrap();
        assert_eq!(record.name, "홍길동");
        assert!(record.report.is_none());
        assert!(record.gender.is_empty());
        assert!(record.medications[0].as_record().is_some());
    }
}
