//! Keyword rules mapping timing/frequency text to dayparts.
//!
//! Handles:
//! - Timing keywords (아침→08:00, 점심→12:00, 저녁→18:00, 취침→22:00)
//! - Frequency fallback (3회→three doses, 2회→two doses, else one)

use crate::models::{DoseTime, MedicationRecord};

/// Timing keywords that select a single daypart.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRule {
    /// Lowercase substrings; any match selects the daypart
    pub keywords: Vec<String>,
    pub time: DoseTime,
}

/// Frequency keywords that select a full set of dayparts.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRule {
    /// Lowercase substrings; any match selects the times
    pub keywords: Vec<String>,
    pub times: Vec<DoseTime>,
}

/// Ordered rule tables used by the schedule engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseRules {
    timing: Vec<TimingRule>,
    frequency: Vec<FrequencyRule>,
    fallback: Vec<DoseTime>,
}

impl Default for DoseRules {
    fn default() -> Self {
        Self::new()
    }
}

impl DoseRules {
    /// Create the rule set with default keyword tables.
    pub fn new() -> Self {
        Self {
            timing: Self::default_timing_rules(),
            frequency: Self::default_frequency_rules(),
            fallback: vec![DoseTime::Morning],
        }
    }

    /// Dayparts for a medication.
    ///
    /// Timing keywords are checked first and union together. Frequency is
    /// consulted only when timing yields nothing; the first matching
    /// frequency rule wins, otherwise the fallback applies.
    pub fn times_for(&self, record: &MedicationRecord) -> Vec<DoseTime> {
        let times = self.match_timing(record.timing_text());
        if !times.is_empty() {
            return times;
        }
        self.match_frequency(record.frequency_text())
    }

    /// Dayparts named by timing text, in table order.
    pub fn match_timing(&self, timing: &str) -> Vec<DoseTime> {
        let timing = timing.to_lowercase();
        self.timing
            .iter()
            .filter(|rule| rule.keywords.iter().any(|k| timing.contains(k.as_str())))
            .map(|rule| rule.time)
            .collect()
    }

    /// Dayparts implied by frequency text. Never empty.
    pub fn match_frequency(&self, frequency: &str) -> Vec<DoseTime> {
        let frequency = frequency.to_lowercase();
        self.frequency
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| frequency.contains(k.as_str())))
            .map(|rule| rule.times.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Add a keyword to the timing rule for a daypart.
    pub fn add_timing_keyword(&mut self, keyword: &str, time: DoseTime) {
        let keyword = keyword.to_lowercase();
        match self.timing.iter_mut().find(|rule| rule.time == time) {
            Some(rule) => rule.keywords.push(keyword),
            None => self.timing.push(TimingRule {
                keywords: vec![keyword],
                time,
            }),
        }
    }

    /// Append a frequency rule; earlier rules take precedence.
    pub fn add_frequency_rule(&mut self, keyword: &str, times: Vec<DoseTime>) {
        self.frequency.push(FrequencyRule {
            keywords: vec![keyword.to_lowercase()],
            times,
        });
    }

    /// Timing rules in match order.
    pub fn timing_rules(&self) -> &[TimingRule] {
        &self.timing
    }

    /// Frequency rules in match order.
    pub fn frequency_rules(&self) -> &[FrequencyRule] {
        &self.frequency
    }

    /// Default timing keywords.
    fn default_timing_rules() -> Vec<TimingRule> {
        fn rule(keywords: &[&str], time: DoseTime) -> TimingRule {
            TimingRule {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                time,
            }
        }

        vec![
            rule(&["아침", "morning"], DoseTime::Morning),
            rule(&["점심", "lunch"], DoseTime::Lunch),
            rule(&["저녁", "evening"], DoseTime::Evening),
            rule(&["취침", "자기 전", "bedtime", "before sleep"], DoseTime::Bedtime),
        ]
    }

    /// Default frequency keywords.
    fn default_frequency_rules() -> Vec<FrequencyRule> {
        use DoseTime::*;

        vec![
            FrequencyRule {
                keywords: vec!["3회".into(), "3 times".into()],
                times: vec![Morning, Lunch, Evening],
            },
            FrequencyRule {
                keywords: vec!["2회".into(), "2 times".into()],
                times: vec![Morning, Evening],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timing: Option<&str>, frequency: Option<&str>) -> MedicationRecord {
        MedicationRecord {
            name: Some("test".into()),
            timing: timing.map(String::from),
            frequency: frequency.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_timing_keywords() {
        let rules = DoseRules::new();
        assert_eq!(rules.match_timing("아침 식후"), vec![DoseTime::Morning]);
        assert_eq!(rules.match_timing("점심 식후"), vec![DoseTime::Lunch]);
        assert_eq!(rules.match_timing("저녁 식후"), vec![DoseTime::Evening]);
        assert_eq!(rules.match_timing("취침 전"), vec![DoseTime::Bedtime]);
        assert_eq!(rules.match_timing("자기 전에"), vec![DoseTime::Bedtime]);
        assert!(rules.match_timing("식후 30분").is_empty());
    }

    #[test]
    fn test_timing_is_case_insensitive() {
        let rules = DoseRules::new();
        assert_eq!(
            rules.match_timing("Morning and EVENING"),
            vec![DoseTime::Morning, DoseTime::Evening]
        );
        assert_eq!(rules.match_timing("Before Sleep"), vec![DoseTime::Bedtime]);
    }

    #[test]
    fn test_bedtime_keywords_count_once() {
        let rules = DoseRules::new();
        assert_eq!(rules.match_timing("취침 전, 자기 전"), vec![DoseTime::Bedtime]);
    }

    #[test]
    fn test_frequency_fallback() {
        let rules = DoseRules::new();
        assert_eq!(
            rules.match_frequency("1일 3회"),
            vec![DoseTime::Morning, DoseTime::Lunch, DoseTime::Evening]
        );
        assert_eq!(rules.match_frequency("1일 2회"), vec![DoseTime::Morning, DoseTime::Evening]);
        assert_eq!(rules.match_frequency("2 times a day"), vec![DoseTime::Morning, DoseTime::Evening]);
        assert_eq!(rules.match_frequency("1일 1회"), vec![DoseTime::Morning]);
        assert_eq!(rules.match_frequency(""), vec![DoseTime::Morning]);
    }

    #[test]
    fn test_timing_short_circuits_frequency() {
        let rules = DoseRules::new();
        let times = rules.times_for(&record(Some("아침, 저녁"), Some("1일 3회")));
        assert_eq!(times, vec![DoseTime::Morning, DoseTime::Evening]);
    }

    #[test]
    fn test_missing_fields_default_to_morning() {
        let rules = DoseRules::new();
        assert_eq!(rules.times_for(&record(None, None)), vec![DoseTime::Morning]);
    }

    #[test]
    fn test_custom_keywords() {
        let mut rules = DoseRules::new();
        rules.add_timing_keyword("Noon", DoseTime::Lunch);
        rules.add_frequency_rule("4회", DoseTime::ALL.to_vec());

        assert_eq!(rules.match_timing("at noon"), vec![DoseTime::Lunch]);
        assert_eq!(rules.match_frequency("1일 4회"), DoseTime::ALL.to_vec());
        assert_eq!(rules.timing_rules().len(), 4);
        assert_eq!(rules.frequency_rules().len(), 3);
    }
}
