//! Medication models.

use serde::{Deserialize, Serialize};

/// Label used when a medication carries no usable name.
pub const UNNAMED_MEDICATION: &str = "이름 없음";

/// Frequency assumed when a record does not state one.
pub const DEFAULT_FREQUENCY: &str = "1일 1회";

/// Timing given to medications synced from a pharmacist record.
pub const DEFAULT_TIMING: &str = "아침";

/// A single medication as recorded by intake (OCR or manual form).
///
/// Every field is free text and may be missing; the record comes from an
/// untrusted extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MedicationRecord {
    /// Drug name
    pub name: Option<String>,
    /// Dose (e.g., "500mg")
    pub dosage: Option<String>,
    /// Count per day (e.g., "1일 3회")
    pub frequency: Option<String>,
    /// Dayparts (e.g., "아침 식후", "취침 전")
    pub timing: Option<String>,
    /// Course length (e.g., "7일"); not used by scheduling
    pub duration: Option<String>,
}

impl MedicationRecord {
    /// Create a record with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Name for display, or [`UNNAMED_MEDICATION`] when missing or blank.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => UNNAMED_MEDICATION,
        }
    }

    /// Dosage text, empty when missing.
    pub fn dosage_text(&self) -> &str {
        self.dosage.as_deref().unwrap_or("")
    }

    /// Frequency text, defaulting to [`DEFAULT_FREQUENCY`].
    pub fn frequency_text(&self) -> &str {
        self.frequency.as_deref().unwrap_or(DEFAULT_FREQUENCY)
    }

    /// Timing text, empty when missing.
    pub fn timing_text(&self) -> &str {
        self.timing.as_deref().unwrap_or("")
    }
}

/// A medication as stored on a patient record.
///
/// The pharmacist form stores bare names while patient intake stores full
/// records, so both shapes live side by side in one list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MedicationEntry {
    /// Plain drug name
    Label(String),
    /// Structured record from intake
    Structured(MedicationRecord),
}

impl MedicationEntry {
    /// Display name of the entry.
    ///
    /// Labels are returned verbatim; structured records fall back to an
    /// empty string when unnamed, matching how lists are joined for display.
    pub fn display_name(&self) -> &str {
        match self {
            MedicationEntry::Label(name) => name,
            MedicationEntry::Structured(record) => record.name.as_deref().unwrap_or(""),
        }
    }

    /// Structured view, if the entry carries one.
    pub fn as_record(&self) -> Option<&MedicationRecord> {
        match self {
            MedicationEntry::Label(_) => None,
            MedicationEntry::Structured(record) => Some(record),
        }
    }

    /// Normalize to a record that the schedule engine can consume.
    pub fn to_record(&self) -> MedicationRecord {
        match self {
            MedicationEntry::Label(name) => MedicationRecord::named(name.clone()),
            MedicationEntry::Structured(record) => record.clone(),
        }
    }
}

impl From<MedicationRecord> for MedicationEntry {
    fn from(record: MedicationRecord) -> Self {
        MedicationEntry::Structured(record)
    }
}

impl From<String> for MedicationEntry {
    fn from(name: String) -> Self {
        MedicationEntry::Label(name)
    }
}

impl From<&str> for MedicationEntry {
    fn from(name: &str) -> Self {
        MedicationEntry::Label(name.to_string())
    }
}

/// Join entry names with `", "` for display and form prefill.
pub fn join_display_names(entries: &[MedicationEntry]) -> String {
    entries
        .iter()
        .map(MedicationEntry::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}
