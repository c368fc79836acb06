//! Session-scoped patient registry shared by the pharmacist and patient views.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PatientData, PatientRecord};

/// Store errors.
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Patient not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Selection identity of a record within one store.
///
/// Records are never removed during a session, so a handle stays valid for
/// the lifetime of the store that issued it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PatientHandle(usize);

impl PatientHandle {
    /// Position of the record in insertion order.
    pub fn index(&self) -> usize {
        self.0
    }

    /// Handle for a position, as sent back by a selection control.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Ordered list of patient records. Last writer wins; there is no versioning.
#[derive(Debug, Clone, Default)]
pub struct PatientStore {
    records: Vec<PatientRecord>,
}

impl PatientStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Duplicate names become distinct entries.
    pub fn append(&mut self, record: PatientRecord) -> PatientHandle {
        self.records.push(record);
        let handle = PatientHandle(self.records.len() - 1);
        tracing::debug!(index = handle.index(), "Patient record appended");
        handle
    }

    /// The last-appended record, if any.
    pub fn find_most_recent(&self) -> Option<(PatientHandle, &PatientRecord)> {
        self.records
            .last()
            .map(|record| (PatientHandle(self.records.len() - 1), record))
    }

    /// First record whose display name equals `name`.
    ///
    /// Unnamed records match the `(이름없음)` placeholder.
    pub fn find_by_display_name(&self, name: &str) -> StoreResult<PatientHandle> {
        self.records
            .iter()
            .position(|record| record.display_name() == name)
            .map(PatientHandle)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Update the selected record in place, or append a new one.
    ///
    /// `report` overwrites the stored report only when supplied. A handle
    /// that does not resolve in this store counts as no selection.
    pub fn upsert(
        &mut self,
        matched: Option<PatientHandle>,
        data: PatientData,
        report: Option<String>,
    ) -> PatientHandle {
        if let Some(handle) = matched {
            if let Some(record) = self.records.get_mut(handle.index()) {
                record.apply(data);
                if report.is_some() {
                    record.report = report;
                }
                record.touch();
                tracing::debug!(index = handle.index(), "Patient record updated in place");
                return handle;
            }
            tracing::warn!(index = handle.index(), "Stale patient selection; appending instead");
        }

        let mut record = PatientRecord::from_data(data);
        record.report = report;
        self.append(record)
    }

    /// Get a record by handle.
    pub fn get(&self, handle: PatientHandle) -> Option<&PatientRecord> {
        self.records.get(handle.index())
    }

    /// Get a mutable record by handle.
    pub fn get_mut(&mut self, handle: PatientHandle) -> Option<&mut PatientRecord> {
        self.records.get_mut(handle.index())
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    /// Records newest first, with their handles.
    pub fn iter_recent_first(&self) -> impl Iterator<Item = (PatientHandle, &PatientRecord)> {
        self.records
            .iter()
            .enumerate()
            .rev()
            .map(|(i, record)| (PatientHandle(i), record))
    }

    /// Picker labels in insertion order.
    pub fn option_labels(&self) -> Vec<String> {
        self.records.iter().map(PatientRecord::option_label).collect()
    }

    /// Display names in insertion order (may contain duplicates).
    pub fn display_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.display_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicationEntry;

    fn named(name: &str) -> PatientRecord {
        let mut record = PatientRecord::new();
        record.name = name.into();
        record
    }

    #[test]
    fn test_find_most_recent() {
        let mut store = PatientStore::new();
        assert!(store.find_most_recent().is_none());

        let first = store.append(named("A"));
        assert_eq!(store.find_most_recent().unwrap().0, first);

        let second = store.append(named("B"));
        let (handle, record) = store.find_most_recent().unwrap();
        assert_eq!(handle, second);
        assert_eq!(record.name, "B");
    }

    #[test]
    fn test_duplicate_names_are_distinct() {
        let mut store = PatientStore::new();
        store.append(named("A"));
        store.append(named("A"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_display_name("A").unwrap().index(), 0);
    }

    #[test]
    fn test_find_by_display_name_placeholder() {
        let mut store = PatientStore::new();
        store.append(named("A"));
        store.append(named(""));

        assert_eq!(store.find_by_display_name("(이름없음)").unwrap().index(), 1);
        assert_eq!(
            store.find_by_display_name("Z"),
            Err(StoreError::NotFound("Z".into()))
        );
    }

    #[test]
    fn test_upsert_updates_in_place() {
        let mut store = PatientStore::new();
        store.append(named("A"));
        let target = store.append(named("B"));
        store.append(named("C"));
        let id = store.get(target).unwrap().id.clone();

        let data = PatientData {
            name: "B2".into(),
            medications: vec![MedicationEntry::from("Tylenol")],
            ..Default::default()
        };
        let handle = store.upsert(Some(target), data, Some("report".into()));

        assert_eq!(handle, target);
        assert_eq!(store.len(), 3);
        let record = store.get(target).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.name, "B2");
        assert_eq!(record.report.as_deref(), Some("report"));
    }

    #[test]
    fn test_upsert_without_report_keeps_existing() {
        let mut store = PatientStore::new();
        let mut record = named("A");
        record.report = Some("kept".into());
        let handle = store.append(record);

        store.upsert(Some(handle), PatientData::default(), None);
        assert_eq!(store.get(handle).unwrap().report.as_deref(), Some("kept"));
    }

    #[test]
    fn test_upsert_without_match_appends() {
        let mut store = PatientStore::new();
        store.append(named("A"));

        let handle = store.upsert(None, PatientData::default(), Some("r".into()));
        assert_eq!(store.len(), 2);
        assert_eq!(handle.index(), 1);
        assert_eq!(store.get(handle).unwrap().report.as_deref(), Some("r"));
    }

    #[test]
    fn test_upsert_with_stale_handle_appends() {
        let mut store = PatientStore::new();
        let handle = store.upsert(Some(PatientHandle::from_index(5)), PatientData::default(), None);
        assert_eq!(handle.index(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iter_recent_first() {
        let mut store = PatientStore::new();
        store.append(named("A"));
        store.append(named("B"));

        let names: Vec<_> = store.iter_recent_first().map(|(_, r)| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(store.display_names(), vec!["A", "B"]);
    }
}
