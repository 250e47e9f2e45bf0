use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
/// Index of a [`Place`] in its owning [`PetriNet`]
pub struct PlaceId(pub usize);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
/// Index of a [`Transition`] in its owning [`PetriNet`]
pub struct TransitionId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
/// Place in a Petri net
pub struct Place {
    /// Place label; only used while compiling a model, final nets carry labels on transitions only
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
/// Transition in a Petri net
pub struct Transition {
    /// Transition label (None if this transition is _silent_)
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "nodes")]
/// Arc type in a Petri net
///
/// Arcs always connect a place and a transition; the net is bipartite by construction.
pub enum ArcType {
    /// From Place to Transition
    PlaceTransition(PlaceId, TransitionId),
    /// From Transition to Place
    TransitionPlace(TransitionId, PlaceId),
}

impl ArcType {
    /// Create new from place to transition
    pub fn place_to_transition(from: PlaceId, to: TransitionId) -> ArcType {
        ArcType::PlaceTransition(from, to)
    }
    /// Create new from transition to place
    pub fn transition_to_place(from: TransitionId, to: PlaceId) -> ArcType {
        ArcType::TransitionPlace(from, to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Arc in a Petri net
pub struct Arc {
    /// Source and target of the arc
    pub from_to: ArcType,
    /// Weight (i.e., how many tokens this arc moves)
    pub weight: u64,
}

///
/// Marking of a Petri net: a multiset of tokens over [`PlaceId`]s
///
/// Entries with a zero count are never stored.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marking(BTreeMap<PlaceId, u64>);

impl Marking {
    /// Create an empty marking
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens at the given place (0 if absent)
    pub fn tokens(&self, place: PlaceId) -> u64 {
        *self.0.get(&place).unwrap_or(&0)
    }

    /// Add tokens to a place
    pub fn add_tokens(&mut self, place: PlaceId, count: u64) {
        if count > 0 {
            *self.0.entry(place).or_insert(0) += count;
        }
    }

    /// Remove tokens from a place, dropping the entry when it reaches zero
    ///
    /// Returns `false` (leaving the marking untouched) if not enough tokens are present.
    pub fn remove_tokens(&mut self, place: PlaceId, count: u64) -> bool {
        match self.0.get_mut(&place) {
            Some(current) if *current >= count => {
                *current -= count;
                if *current == 0 {
                    self.0.remove(&place);
                }
                true
            }
            _ => false,
        }
    }

    /// Submultiset test: every token count of `self` is available in `other`
    pub fn is_sub_marking(&self, other: &Marking) -> bool {
        self.0.iter().all(|(p, c)| other.tokens(*p) >= *c)
    }

    /// Whether no place carries a token
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (place, token count) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&PlaceId, &u64)> {
        self.0.iter()
    }
}

impl FromIterator<(PlaceId, u64)> for Marking {
    fn from_iter<T: IntoIterator<Item = (PlaceId, u64)>>(iter: T) -> Self {
        let mut m = Marking::new();
        for (p, c) in iter {
            m.add_tokens(p, c);
        }
        m
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
///
/// A Petri net of [`Place`]s and [`Transition`]s
///
/// Places and transitions live in arenas and are referred to by index
/// ([`PlaceId`] / [`TransitionId`]); arcs store index pairs. Pre- and postsets
/// are derived by scanning the arc list.
///
pub struct PetriNet {
    /// Places
    pub places: Vec<Place>,
    /// Transitions
    pub transitions: Vec<Transition>,
    /// Arcs
    pub arcs: Vec<Arc>,
    /// Initial marking
    pub initial_marking: Option<Marking>,
    /// Final marking
    pub final_marking: Option<Marking>,
}

impl PetriNet {
    /// Create new [`PetriNet`] with no places or transitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add a place with an optional label
    pub fn add_place(&mut self, label: Option<String>) -> PlaceId {
        self.places.push(Place { label });
        PlaceId(self.places.len() - 1)
    }

    /// Add a transition with a label (None for a silent transition)
    pub fn add_transition(&mut self, label: Option<String>) -> TransitionId {
        self.transitions.push(Transition { label });
        TransitionId(self.transitions.len() - 1)
    }

    /// Add an arc (weight defaults to 1)
    pub fn add_arc(&mut self, from_to: ArcType, weight: Option<u64>) {
        self.arcs.push(Arc {
            from_to,
            weight: weight.unwrap_or(1),
        });
    }

    /// Remove all arcs with the given endpoints
    pub fn remove_arc(&mut self, from_to: ArcType) {
        self.arcs.retain(|a| a.from_to != from_to);
    }

    /// Get a place by id
    pub fn place(&self, id: PlaceId) -> &Place {
        &self.places[id.0]
    }

    /// Get a transition by id
    pub fn transition(&self, id: TransitionId) -> &Transition {
        &self.transitions[id.0]
    }

    /// All place ids
    pub fn place_ids(&self) -> impl Iterator<Item = PlaceId> {
        (0..self.places.len()).map(PlaceId)
    }

    /// All transition ids
    pub fn transition_ids(&self) -> impl Iterator<Item = TransitionId> {
        (0..self.transitions.len()).map(TransitionId)
    }

    /// Get the preset of a place (transitions with an arc into it)
    pub fn preset_of_place(&self, p: PlaceId) -> Vec<TransitionId> {
        self.arcs
            .iter()
            .filter_map(|a| match a.from_to {
                ArcType::TransitionPlace(from, to) if to == p => Some(from),
                _ => None,
            })
            .collect()
    }

    /// Get the postset of a place (transitions it has an arc into)
    pub fn postset_of_place(&self, p: PlaceId) -> Vec<TransitionId> {
        self.arcs
            .iter()
            .filter_map(|a| match a.from_to {
                ArcType::PlaceTransition(from, to) if from == p => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Get the preset of a transition (places with an arc into it)
    pub fn preset_of_transition(&self, t: TransitionId) -> Vec<PlaceId> {
        self.arcs
            .iter()
            .filter_map(|a| match a.from_to {
                ArcType::PlaceTransition(from, to) if to == t => Some(from),
                _ => None,
            })
            .collect()
    }

    /// Get the postset of a transition (places it has an arc into)
    pub fn postset_of_transition(&self, t: TransitionId) -> Vec<PlaceId> {
        self.arcs
            .iter()
            .filter_map(|a| match a.from_to {
                ArcType::TransitionPlace(from, to) if from == t => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Input arcs of a transition as (place, weight) pairs
    pub fn input_arcs_of_transition(
        &self,
        t: TransitionId,
    ) -> impl Iterator<Item = (PlaceId, u64)> + '_ {
        self.arcs.iter().filter_map(move |a| match a.from_to {
            ArcType::PlaceTransition(from, to) if to == t => Some((from, a.weight)),
            _ => None,
        })
    }

    /// Output arcs of a transition as (place, weight) pairs
    pub fn output_arcs_of_transition(
        &self,
        t: TransitionId,
    ) -> impl Iterator<Item = (PlaceId, u64)> + '_ {
        self.arcs.iter().filter_map(move |a| match a.from_to {
            ArcType::TransitionPlace(from, to) if from == t => Some((to, a.weight)),
            _ => None,
        })
    }

    /// Check whether a transition is enabled in the given marking
    pub fn is_enabled(&self, t: TransitionId, marking: &Marking) -> bool {
        self.input_arcs_of_transition(t)
            .all(|(p, w)| marking.tokens(p) >= w)
    }

    /// Fire a transition, producing the successor marking
    ///
    /// Returns `None` if the transition is not enabled.
    pub fn fire(&self, t: TransitionId, marking: &Marking) -> Option<Marking> {
        if !self.is_enabled(t, marking) {
            return None;
        }
        let mut next = marking.clone();
        for (p, w) in self.input_arcs_of_transition(t) {
            next.remove_tokens(p, w);
        }
        for (p, w) in self.output_arcs_of_transition(t) {
            next.add_tokens(p, w);
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn petri_nets() {
        let mut net = PetriNet::new();
        let p1 = net.add_place(None);
        let t1 = net.add_transition(Some("Have fun".into()));
        let t2 = net.add_transition(Some("Sleep".into()));
        net.add_arc(ArcType::place_to_transition(p1, t1), None);
        net.add_arc(ArcType::transition_to_place(t2, p1), None);

        assert!(net.postset_of_transition(t1).is_empty());
        assert!(net.preset_of_transition(t1) == vec![p1]);
        assert!(net.postset_of_place(p1) == vec![t1]);
        assert!(net.preset_of_place(p1) == vec![t2]);
        assert!(net.preset_of_transition(t2).is_empty());
    }

    #[test]
    fn marking_arithmetic() {
        let p1 = PlaceId(0);
        let p2 = PlaceId(1);
        let mut m = Marking::new();
        m.add_tokens(p1, 2);
        m.add_tokens(p2, 1);
        assert_eq!(m.tokens(p1), 2);

        assert!(m.remove_tokens(p2, 1));
        assert_eq!(m.tokens(p2), 0);
        // zero entries are dropped
        assert!(m.iter().all(|(p, _)| *p != p2));
        // insufficient tokens are rejected
        assert!(!m.remove_tokens(p1, 3));
        assert_eq!(m.tokens(p1), 2);

        let smaller: Marking = [(p1, 1)].into_iter().collect();
        assert!(smaller.is_sub_marking(&m));
        assert!(!m.is_sub_marking(&smaller));
    }

    #[test]
    fn firing_rule() {
        let mut net = PetriNet::new();
        let p1 = net.add_place(None);
        let p2 = net.add_place(None);
        let t = net.add_transition(Some("A".into()));
        net.add_arc(ArcType::place_to_transition(p1, t), None);
        net.add_arc(ArcType::transition_to_place(t, p2), None);

        let m0: Marking = [(p1, 1)].into_iter().collect();
        assert!(net.is_enabled(t, &m0));
        let m1 = net.fire(t, &m0).unwrap();
        assert_eq!(m1.tokens(p1), 0);
        assert_eq!(m1.tokens(p2), 1);

        // firing a disabled transition is rejected
        assert!(net.fire(t, &m1).is_none());
    }

    #[test]
    fn json_roundtrip() {
        let mut net = PetriNet::new();
        let p = net.add_place(None);
        let t = net.add_transition(Some("A".into()));
        net.add_arc(ArcType::place_to_transition(p, t), None);
        net.initial_marking = Some([(p, 1)].into_iter().collect());

        let json = net.to_json();
        let back = PetriNet::from_json(&json).unwrap();
        assert_eq!(back.places.len(), 1);
        assert_eq!(back.transitions.len(), 1);
        assert_eq!(back.arcs.len(), 1);
    }
}
