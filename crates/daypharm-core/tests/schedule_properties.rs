//! Property tests for the schedule engine.

use chrono::{Days, NaiveDate};
use daypharm_core::models::{date_key, DoseTime, MedicationRecord};
use daypharm_core::schedule::ScheduleEngine;
use proptest::prelude::*;

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..20_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1990, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn arb_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just(String::new()),
        Just("아침".to_string()),
        Just("점심 식후".to_string()),
        Just("저녁".to_string()),
        Just("취침 전".to_string()),
        Just("1일 3회".to_string()),
        Just("1일 2회".to_string()),
        Just("Morning and Evening".to_string()),
        ".{0,12}",
    ])
}

fn arb_medication() -> impl Strategy<Value = MedicationRecord> {
    (
        prop::option::of("[A-Za-z가-힣 ]{0,10}"),
        arb_text(),
        arb_text(),
        arb_text(),
    )
        .prop_map(|(name, dosage, frequency, timing)| MedicationRecord {
            name,
            dosage,
            frequency,
            timing,
            duration: None,
        })
}

proptest! {
    #[test]
    fn seven_consecutive_days(
        meds in prop::collection::vec(arb_medication(), 0..6),
        start in arb_date(),
    ) {
        let schedule = ScheduleEngine::new().generate(&meds, start);

        let keys: Vec<String> = schedule.date_keys().map(String::from).collect();
        let expected: Vec<String> = start.iter_days().take(7).map(date_key).collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn generation_is_deterministic(
        meds in prop::collection::vec(arb_medication(), 0..6),
        start in arb_date(),
    ) {
        let engine = ScheduleEngine::new();
        prop_assert_eq!(engine.generate(&meds, start), engine.generate(&meds, start));
    }

    #[test]
    fn every_medication_gets_at_least_one_dose_per_day(
        med in arb_medication(),
        start in arb_date(),
    ) {
        let engine = ScheduleEngine::new();
        let times = engine.times_for(&med);
        prop_assert!(!times.is_empty());

        let schedule = engine.generate(std::slice::from_ref(&med), start);
        for (_, entries) in schedule.iter() {
            prop_assert_eq!(entries.len(), times.len());
            prop_assert!(entries.iter().all(|e| !e.taken));
        }
    }

    #[test]
    fn morning_and_evening_timing_overrides_frequency(
        frequency in arb_text(),
        prefix in "[a-z ]{0,4}",
    ) {
        let med = MedicationRecord {
            name: Some("A".into()),
            timing: Some(format!("{}아침 / 저녁", prefix)),
            frequency,
            ..Default::default()
        };
        prop_assert_eq!(
            ScheduleEngine::new().times_for(&med),
            vec![DoseTime::Morning, DoseTime::Evening]
        );
    }
}
