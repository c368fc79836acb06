//! Weekly dosing schedule generation.
//!
//! Pipeline: MedicationRecord → DoseRules (timing, then frequency) → 7-day Schedule

mod rules;

pub use rules::*;

use chrono::NaiveDate;

use crate::models::{DoseTime, MedicationRecord, Schedule, ScheduleEntry, SCHEDULE_DAYS};

/// Expands medication records into a repeating daily timetable.
///
/// Generation is pure: the same records and start date always yield the same
/// schedule. The caller supplies `start`; the engine never reads the clock.
#[derive(Debug, Clone, Default)]
pub struct ScheduleEngine {
    rules: DoseRules,
}

impl ScheduleEngine {
    /// Create an engine with the default keyword rules.
    pub fn new() -> Self {
        Self {
            rules: DoseRules::new(),
        }
    }

    /// Create an engine with custom rules.
    pub fn with_rules(rules: DoseRules) -> Self {
        Self { rules }
    }

    /// Get the rules for direct access.
    pub fn rules(&self) -> &DoseRules {
        &self.rules
    }

    /// Dayparts a single medication is taken at.
    pub fn times_for(&self, record: &MedicationRecord) -> Vec<DoseTime> {
        self.rules.times_for(record)
    }

    /// Generate the schedule for seven consecutive days starting at `start`.
    ///
    /// Every day key is present even when `medications` is empty.
    pub fn generate(&self, medications: &[MedicationRecord], start: NaiveDate) -> Schedule {
        let days: Vec<NaiveDate> = start.iter_days().take(SCHEDULE_DAYS as usize).collect();

        let mut schedule = Schedule::default();
        for date in &days {
            schedule.open_day(*date);
        }

        for (slot, record) in medications.iter().enumerate() {
            let times = self.times_for(record);
            let medication = record.display_name().to_string();
            let dosage = record.dosage_text().to_string();

            for date in &days {
                let day = schedule.open_day(*date);
                for time in &times {
                    day.push(ScheduleEntry {
                        date: *date,
                        time: *time,
                        slot,
                        medication: medication.clone(),
                        dosage: dosage.clone(),
                        taken: false,
                    });
                }
            }
        }

        schedule
    }
}

/// Generate a schedule with the default rules.
pub fn generate_schedule(medications: &[MedicationRecord], start: NaiveDate) -> Schedule {
    ScheduleEngine::new().generate(medications, start)
}
