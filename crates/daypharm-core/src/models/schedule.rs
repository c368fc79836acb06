//! Dosing schedule models.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of consecutive days in a generated schedule.
pub const SCHEDULE_DAYS: u32 = 7;

/// Fixed time of day used for dosing.
///
/// Variants are declared in clock order, so the derived `Ord` sorts by time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DoseTime {
    #[serde(rename = "08:00")]
    Morning,
    #[serde(rename = "12:00")]
    Lunch,
    #[serde(rename = "18:00")]
    Evening,
    #[serde(rename = "22:00")]
    Bedtime,
}

impl DoseTime {
    /// All dayparts in clock order.
    pub const ALL: [DoseTime; 4] = [
        DoseTime::Morning,
        DoseTime::Lunch,
        DoseTime::Evening,
        DoseTime::Bedtime,
    ];

    /// Clock time as `HH:MM`.
    pub fn clock(&self) -> &'static str {
        match self {
            DoseTime::Morning => "08:00",
            DoseTime::Lunch => "12:00",
            DoseTime::Evening => "18:00",
            DoseTime::Bedtime => "22:00",
        }
    }

    /// Parse an `HH:MM` clock string back into a daypart.
    pub fn from_clock(clock: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.clock() == clock.trim())
    }
}

impl fmt::Display for DoseTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clock())
    }
}

/// One dose slot in the weekly schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Calendar day
    pub date: NaiveDate,
    /// Daypart
    pub time: DoseTime,
    /// Position of the medication in the list the schedule was built from
    pub slot: usize,
    /// Medication display name
    pub medication: String,
    /// Dose text (may be empty)
    pub dosage: String,
    /// Checkbox state; never written back to the medication record
    pub taken: bool,
}

/// Format a date as the schedule's `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A weekly timetable grouped by date key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Schedule {
    days: BTreeMap<String, Vec<ScheduleEntry>>,
}

impl Schedule {
    /// Ensure a (possibly empty) day exists.
    pub(crate) fn open_day(&mut self, date: NaiveDate) -> &mut Vec<ScheduleEntry> {
        self.days.entry(date_key(date)).or_default()
    }

    /// Date keys in ascending order.
    pub fn date_keys(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    /// Entries for a day in generation order.
    pub fn day(&self, key: &str) -> &[ScheduleEntry] {
        self.days.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries for a day sorted ascending by time (stable).
    pub fn day_sorted(&self, key: &str) -> Vec<&ScheduleEntry> {
        let mut entries: Vec<&ScheduleEntry> = self.day(key).iter().collect();
        entries.sort_by_key(|e| e.time);
        entries
    }

    /// Iterate days in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ScheduleEntry])> {
        self.days.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Mutable access to every entry.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut ScheduleEntry> {
        self.days.values_mut().flatten()
    }

    /// Number of days.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// True when no day is present.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of entries across all days.
    pub fn entry_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dose_time_order() {
        let mut times = vec![DoseTime::Bedtime, DoseTime::Morning, DoseTime::Evening, DoseTime::Lunch];
        times.sort();
        assert_eq!(times, DoseTime::ALL.to_vec());
    }

    #[test]
    fn test_dose_time_serializes_as_clock() {
        assert_eq!(serde_json::to_string(&DoseTime::Lunch).unwrap(), "\"12:00\"");
        let parsed: DoseTime = serde_json::from_str("\"22:00\"").unwrap();
        assert_eq!(parsed, DoseTime::Bedtime);
        assert_eq!(DoseTime::from_clock("18:00"), Some(DoseTime::Evening));
        assert_eq!(DoseTime::from_clock("09:00"), None);
    }

    #[test]
    fn test_day_sorted_is_stable() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut schedule = Schedule::default();
        let day = schedule.open_day(date);
        for (slot, time, name) in [
            (0, DoseTime::Evening, "A"),
            (0, DoseTime::Morning, "A"),
            (1, DoseTime::Morning, "B"),
        ] {
            day.push(ScheduleEntry {
                date,
                time,
                slot,
                medication: name.into(),
                dosage: String::new(),
                taken: false,
            });
        }

        let sorted = schedule.day_sorted("2024-01-01");
        let order: Vec<_> = sorted.iter().map(|e| (e.time, e.medication.as_str())).collect();
        assert_eq!(
            order,
            vec![(DoseTime::Morning, "A"), (DoseTime::Morning, "B"), (DoseTime::Evening, "A")]
        );
        assert!(schedule.day("2024-01-02").is_empty());
    }
}
