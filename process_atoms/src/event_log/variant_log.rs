use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::event_log_struct::EventLog;

///
/// A distinct trace variant: an ordered sequence of activity labels together
/// with the cases that exhibit it
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceVariant {
    /// The ordered activity labels of this variant
    pub activities: Vec<String>,
    /// Case ids of all traces sharing this label sequence
    pub cases: Vec<String>,
    /// Average trace duration over the cases of this variant (in seconds)
    pub average_duration_secs: f64,
}

impl TraceVariant {
    /// Number of cases exhibiting this variant
    pub fn frequency(&self) -> u64 {
        self.cases.len() as u64
    }
}

///
/// Projection of an event log onto its distinct trace variants
///
/// Checking and discovery iterate variants instead of cases: verdicts only depend
/// on the label sequence, so per-variant results are broadcast to all cases sharing it.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantLog {
    /// Distinct trace variants, ordered by label sequence
    pub variants: Vec<TraceVariant>,
    /// Total number of cases in the underlying log
    pub total_cases: u64,
}

impl VariantLog {
    /// The sorted set of distinct activity names occurring in any variant
    pub fn unique_activities(&self) -> Vec<String> {
        let mut acts: Vec<String> = self
            .variants
            .iter()
            .flat_map(|v| v.activities.iter().cloned())
            .collect();
        acts.sort();
        acts.dedup();
        acts
    }

    /// Build a variant log from plain label sequences (e.g., variants played out of a model)
    ///
    /// Sequences are deduplicated; each distinct sequence counts as one synthetic case.
    /// Empty sequences are dropped.
    pub fn from_label_sequences<I: IntoIterator<Item = Vec<String>>>(sequences: I) -> Self {
        let mut distinct: BTreeMap<Vec<String>, ()> = BTreeMap::new();
        for seq in sequences {
            if !seq.is_empty() {
                distinct.insert(seq, ());
            }
        }
        let variants: Vec<TraceVariant> = distinct
            .into_keys()
            .enumerate()
            .map(|(i, activities)| TraceVariant {
                activities,
                cases: vec![format!("c{}", i + 1)],
                average_duration_secs: 0.0,
            })
            .collect();
        let total_cases = variants.len() as u64;
        VariantLog {
            variants,
            total_cases,
        }
    }
}

impl From<&EventLog> for VariantLog {
    fn from(log: &EventLog) -> Self {
        let projected: Vec<(Vec<String>, String, f64)> = log
            .traces
            .par_iter()
            .enumerate()
            .map(|(i, t)| {
                let case_id = t
                    .case_id()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| format!("c{}", i + 1));
                (t.activity_sequence(), case_id, t.duration_secs())
            })
            .collect();

        let mut grouped: BTreeMap<Vec<String>, (Vec<String>, f64)> = BTreeMap::new();
        let mut total_cases = 0_u64;
        for (activities, case_id, duration) in projected {
            total_cases += 1;
            if activities.is_empty() {
                continue;
            }
            let entry = grouped.entry(activities).or_insert_with(|| (Vec::new(), 0.0));
            entry.0.push(case_id);
            entry.1 += duration;
        }

        let variants = grouped
            .into_iter()
            .map(|(activities, (cases, duration_sum))| {
                let average_duration_secs = duration_sum / cases.len() as f64;
                TraceVariant {
                    activities,
                    cases,
                    average_duration_secs,
                }
            })
            .collect();
        VariantLog {
            variants,
            total_cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::event_log_struct::{Event, Trace};

    fn trace_of(case: &str, acts: &[&str]) -> Trace {
        let mut t = Trace::new(case.to_string());
        for a in acts {
            t.events.push(Event::new(a.to_string()));
        }
        t
    }

    #[test]
    fn variants_group_cases() {
        let mut log = EventLog::new();
        log.traces.push(trace_of("c1", &["A", "B"]));
        log.traces.push(trace_of("c2", &["A", "B"]));
        log.traces.push(trace_of("c3", &["A", "C"]));

        let variants = VariantLog::from(&log);
        assert_eq!(variants.total_cases, 3);
        assert_eq!(variants.variants.len(), 2);
        let ab = variants
            .variants
            .iter()
            .find(|v| v.activities == ["A", "B"])
            .unwrap();
        assert_eq!(ab.frequency(), 2);
        assert_eq!(ab.cases, vec!["c1".to_string(), "c2".to_string()]);
        assert_eq!(
            variants.unique_activities(),
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn label_sequences_deduplicate() {
        let variants = VariantLog::from_label_sequences(vec![
            vec!["A".to_string()],
            vec!["A".to_string()],
            vec![],
        ]);
        assert_eq!(variants.variants.len(), 1);
        assert_eq!(variants.total_cases, 1);
    }
}
