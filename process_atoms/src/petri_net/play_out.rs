use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::petri_net_struct::{Marking, PetriNet, TransitionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Bounds for the state-space exploration of [`net_variants`]
pub struct PlayOutOptions {
    /// Maximum number of times a single transition may fire along one path
    ///
    /// Bounds the state space of nets containing cycles.
    pub max_loop: u32,
    /// Wall-clock budget; on expiry the variants found so far are returned
    pub time_budget: Duration,
}

impl Default for PlayOutOptions {
    fn default() -> Self {
        PlayOutOptions {
            max_loop: 3,
            time_budget: Duration::from_secs(1),
        }
    }
}

struct ExplorationState {
    marking: Marking,
    labels: Vec<String>,
    firings: HashMap<TransitionId, u32>,
}

///
/// Enumerate all complete firing sequences of the net as label sequences ("variants")
///
/// Explores the marking graph from `initial_marking` with a work stack. A path is
/// complete once it reaches `final_marking`; completed paths are terminal and their
/// accumulated visible labels (silent transitions contribute none) are recorded.
/// Distinctness is by label sequence, so several firing sequences may collapse
/// into one variant.
///
/// Termination is guaranteed by the per-path loop cap and the cooperative time
/// budget of [`PlayOutOptions`]; running out of time yields the partial (but
/// valid) variant set found so far, never an error.
///
pub fn net_variants(
    net: &PetriNet,
    initial_marking: &Marking,
    final_marking: &Marking,
    options: &PlayOutOptions,
) -> HashSet<Vec<String>> {
    let mut variants: HashSet<Vec<String>> = HashSet::new();
    if final_marking.is_empty() {
        return variants;
    }
    let start = Instant::now();
    let mut stack = vec![ExplorationState {
        marking: initial_marking.clone(),
        labels: Vec::new(),
        firings: HashMap::new(),
    }];

    while let Some(state) = stack.pop() {
        if start.elapsed() > options.time_budget {
            return variants;
        }
        for t in net.transition_ids() {
            if *state.firings.get(&t).unwrap_or(&0) >= options.max_loop {
                continue;
            }
            let Some(next_marking) = net.fire(t, &state.marking) else {
                continue;
            };
            let mut next_labels = state.labels.clone();
            if let Some(label) = &net.transition(t).label {
                next_labels.push(label.clone());
            }
            if &next_marking == final_marking {
                variants.insert(next_labels);
                continue;
            }
            let mut next_firings = state.firings.clone();
            *next_firings.entry(t).or_insert(0) += 1;
            stack.push(ExplorationState {
                marking: next_marking,
                labels: next_labels,
                firings: next_firings,
            });
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petri_net::petri_net_struct::ArcType;

    #[test]
    fn single_path_yields_one_variant() {
        let mut net = PetriNet::new();
        let p0 = net.add_place(None);
        let p1 = net.add_place(None);
        let p2 = net.add_place(None);
        let a = net.add_transition(Some("A".into()));
        let tau = net.add_transition(None);
        net.add_arc(ArcType::place_to_transition(p0, a), None);
        net.add_arc(ArcType::transition_to_place(a, p1), None);
        net.add_arc(ArcType::place_to_transition(p1, tau), None);
        net.add_arc(ArcType::transition_to_place(tau, p2), None);

        let im: Marking = [(p0, 1)].into_iter().collect();
        let fm: Marking = [(p2, 1)].into_iter().collect();
        let variants = net_variants(&net, &im, &fm, &PlayOutOptions::default());
        assert_eq!(variants.len(), 1);
        assert!(variants.contains(&vec!["A".to_string()]));
    }

    #[test]
    fn self_loop_is_bounded_by_loop_cap() {
        // p0 --A--> p0 (self loop), p0 --B--> p1
        let mut net = PetriNet::new();
        let p0 = net.add_place(None);
        let p1 = net.add_place(None);
        let a = net.add_transition(Some("A".into()));
        let b = net.add_transition(Some("B".into()));
        net.add_arc(ArcType::place_to_transition(p0, a), None);
        net.add_arc(ArcType::transition_to_place(a, p0), None);
        net.add_arc(ArcType::place_to_transition(p0, b), None);
        net.add_arc(ArcType::transition_to_place(b, p1), None);

        let im: Marking = [(p0, 1)].into_iter().collect();
        let fm: Marking = [(p1, 1)].into_iter().collect();
        let options = PlayOutOptions {
            max_loop: 3,
            time_budget: Duration::from_secs(10),
        };
        let variants = net_variants(&net, &im, &fm, &options);

        // A fires at most 3 times along any path: B, AB, AAB, AAAB
        assert_eq!(variants.len(), 4);
        for variant in &variants {
            assert!(variant.iter().filter(|l| l.as_str() == "A").count() <= 3);
            assert_eq!(variant.last().map(String::as_str), Some("B"));
        }
    }

    #[test]
    fn completed_paths_are_terminal() {
        // after reaching the final marking, exploration of that path stops even
        // though the net could continue into a second loop iteration
        let mut net = PetriNet::new();
        let p0 = net.add_place(None);
        let p1 = net.add_place(None);
        let a = net.add_transition(Some("A".into()));
        let back = net.add_transition(Some("Back".into()));
        net.add_arc(ArcType::place_to_transition(p0, a), None);
        net.add_arc(ArcType::transition_to_place(a, p1), None);
        net.add_arc(ArcType::place_to_transition(p1, back), None);
        net.add_arc(ArcType::transition_to_place(back, p0), None);

        let im: Marking = [(p0, 1)].into_iter().collect();
        let fm: Marking = [(p1, 1)].into_iter().collect();
        let options = PlayOutOptions {
            max_loop: 5,
            time_budget: Duration::from_secs(10),
        };
        let variants = net_variants(&net, &im, &fm, &options);
        // only the direct completion is recorded, no A-Back-A continuations
        assert_eq!(variants.len(), 1);
        assert!(variants.contains(&vec!["A".to_string()]));
    }

    #[test]
    fn expired_budget_returns_partial_results() {
        let mut net = PetriNet::new();
        let p0 = net.add_place(None);
        let p1 = net.add_place(None);
        let a = net.add_transition(Some("A".into()));
        net.add_arc(ArcType::place_to_transition(p0, a), None);
        net.add_arc(ArcType::transition_to_place(a, p1), None);

        let im: Marking = [(p0, 1)].into_iter().collect();
        let fm: Marking = [(p1, 1)].into_iter().collect();
        let options = PlayOutOptions {
            max_loop: 3,
            time_budget: Duration::ZERO,
        };
        // not an error, just possibly incomplete
        let variants = net_variants(&net, &im, &fm, &options);
        assert!(variants.len() <= 1);
    }
}
