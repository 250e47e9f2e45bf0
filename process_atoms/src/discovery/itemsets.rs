//! Frequent itemset computation over the trace-variant table.
//!
//! Discovery instantiates templates per frequent 1- and 2-itemset of
//! co-occurring activities. Support is presence-based: the fraction of cases
//! whose trace contains every item of the set, weighted by variant frequency.

use std::collections::BTreeSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::declare::conformance::ConfigurationError;
use crate::event_log::variant_log::VariantLog;

///
/// A set of co-occurring activities together with its support in the log
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentItemset {
    /// The activities of the set (sorted, distinct)
    pub items: Vec<String>,
    /// Fraction of cases containing all items
    pub support: f64,
}

impl FrequentItemset {
    /// Number of items in the set
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Weighted fraction of cases whose variant contains every item
fn itemset_support(log: &VariantLog, items: &[&String]) -> f64 {
    if log.total_cases == 0 {
        return 0.0;
    }
    let matching: u64 = log
        .variants
        .iter()
        .filter(|v| {
            items
                .iter()
                .all(|item| v.activities.iter().any(|a| a == *item))
        })
        .map(|v| v.frequency())
        .sum();
    matching as f64 / log.total_cases as f64
}

///
/// Compute all frequent 1- and 2-itemsets with support of at least `min_support`
///
/// With `min_support` of 0 every combination of distinct activities up to
/// `max_len` is returned (with its actual support). Itemset lengths beyond 2
/// are not needed by any template and are capped.
///
pub fn frequent_itemsets(
    log: &VariantLog,
    min_support: f64,
    max_len: usize,
) -> Result<Vec<FrequentItemset>, ConfigurationError> {
    if !(0.0..=1.0).contains(&min_support) {
        return Err(ConfigurationError::SupportOutOfRange(min_support));
    }
    let max_len = max_len.min(2);
    let activities = log.unique_activities();
    let mut itemsets = Vec::new();

    if max_len >= 1 {
        for act in &activities {
            let support = itemset_support(log, &[act]);
            if support >= min_support {
                itemsets.push(FrequentItemset {
                    items: vec![act.clone()],
                    support,
                });
            }
        }
    }
    if max_len >= 2 {
        // a pair can only be frequent if both items are; activities is sorted
        // and deduplicated, so pairs come out in canonical order
        let frequent_single: BTreeSet<String> = itemsets
            .iter()
            .filter(|i| i.len() == 1)
            .map(|i| i.items[0].clone())
            .collect();
        for (a, b) in activities.iter().tuple_combinations() {
            if min_support > 0.0
                && (!frequent_single.contains(a) || !frequent_single.contains(b))
            {
                continue;
            }
            let support = itemset_support(log, &[a, b]);
            if support >= min_support {
                itemsets.push(FrequentItemset {
                    items: vec![a.clone(), b.clone()],
                    support,
                });
            }
        }
    }
    Ok(itemsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::variant_log::TraceVariant;

    fn log() -> VariantLog {
        VariantLog {
            variants: vec![
                TraceVariant {
                    activities: vec!["A".into(), "B".into()],
                    cases: vec!["c1".into(), "c2".into(), "c3".into()],
                    average_duration_secs: 0.0,
                },
                TraceVariant {
                    activities: vec!["A".into(), "C".into()],
                    cases: vec!["c4".into()],
                    average_duration_secs: 0.0,
                },
            ],
            total_cases: 4,
        }
    }

    #[test]
    fn support_is_weighted_by_variant_frequency() {
        let itemsets = frequent_itemsets(&log(), 0.0, 2).unwrap();
        let ab = itemsets
            .iter()
            .find(|i| i.items == vec!["A".to_string(), "B".to_string()])
            .unwrap();
        assert!((ab.support - 0.75).abs() < 1e-9);
        let a = itemsets
            .iter()
            .find(|i| i.items == vec!["A".to_string()])
            .unwrap();
        assert!((a.support - 1.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_filters_itemsets() {
        let itemsets = frequent_itemsets(&log(), 0.5, 2).unwrap();
        assert!(itemsets
            .iter()
            .all(|i| i.support >= 0.5));
        assert!(!itemsets
            .iter()
            .any(|i| i.items.contains(&"C".to_string()) && i.len() == 2));
    }

    #[test]
    fn invalid_support_is_rejected() {
        assert!(matches!(
            frequent_itemsets(&log(), 1.5, 2),
            Err(ConfigurationError::SupportOutOfRange(_))
        ));
        assert!(matches!(
            frequent_itemsets(&log(), -0.1, 2),
            Err(ConfigurationError::SupportOutOfRange(_))
        ));
    }
}
