use std::collections::{BTreeSet, HashMap, HashSet};

use crate::event_log::constants::is_useless_label;
use crate::flow_graph::flow_graph_struct::{ElementCategory, FlowElement, FlowGraph};

use super::petri_net_struct::{ArcType, Marking, PetriNet, PlaceId, TransitionId};

///
/// Compile a [`FlowGraph`] into a safe Petri net plus initial and final marking
///
/// Events become places, tasks and gateways become transitions; flow edges are
/// bridged so the net stays strictly bipartite. Parallel gateways get one place
/// per branch, choice gateways share a single place per side. Tasks with more
/// than one relevant predecessor are treated as implicit joins. Missing or
/// duplicate start/end events are normalized, boundary events are rewired into
/// exclusive alternatives, and places carrying a meaningful label are split so
/// that all observable labels live on transitions. The result is a re-indexed
/// clean copy.
///
/// When no source (or sink) place can be identified structurally, the compiler
/// degrades softly: it picks the lowest-index place without incoming (outgoing)
/// arcs, or returns an empty marking if none exists.
///
pub fn build_petri_net(flow: &FlowGraph) -> (PetriNet, Marking, Marking) {
    NetBuilder::new(flow).build()
}

struct NetBuilder<'a> {
    flow: &'a FlowGraph,
    net: PetriNet,
    place_of: HashMap<String, PlaceId>,
    transition_of: HashMap<String, TransitionId>,
    gateway_in: HashMap<String, PlaceId>,
    gateway_out: HashMap<String, PlaceId>,
    sources: BTreeSet<PlaceId>,
    sinks: BTreeSet<PlaceId>,
    implicit_joins: BTreeSet<String>,
    dead_places: HashSet<PlaceId>,
}

fn meaningful_label(label: &str) -> Option<String> {
    if is_useless_label(label) {
        None
    } else {
        Some(label.to_string())
    }
}

impl<'a> NetBuilder<'a> {
    fn new(flow: &'a FlowGraph) -> Self {
        NetBuilder {
            flow,
            net: PetriNet::new(),
            place_of: HashMap::new(),
            transition_of: HashMap::new(),
            gateway_in: HashMap::new(),
            gateway_out: HashMap::new(),
            sources: BTreeSet::new(),
            sinks: BTreeSet::new(),
            implicit_joins: BTreeSet::new(),
            dead_places: HashSet::new(),
        }
    }

    fn relevant_successors(&self, id: &str) -> Vec<&'a FlowElement> {
        self.flow
            .successors(id)
            .into_iter()
            .filter(|e| e.is_relevant())
            .collect()
    }

    fn relevant_predecessors(&self, id: &str) -> Vec<&'a FlowElement> {
        self.flow
            .predecessors(id)
            .into_iter()
            .filter(|e| e.is_relevant())
            .collect()
    }

    fn build(mut self) -> (PetriNet, Marking, Marking) {
        self.create_nodes();
        self.establish_flows();
        self.correct_implicit_joins();
        self.add_missing_boundaries();
        self.rewire_attached_events();
        self.merge_multiple_sources();
        self.merge_multiple_sinks();
        self.eliminate_labeled_places();
        let (im, fm) = self.determine_markings();
        self.clean_copy(im, fm)
    }

    /// Events become places, gateways and tasks become transitions
    fn create_nodes(&mut self) {
        for el in self.flow.elements() {
            match el.category {
                ElementCategory::Event => {
                    let p = self.net.add_place(meaningful_label(&el.label));
                    self.place_of.insert(el.id.clone(), p);
                    if self.relevant_successors(&el.id).is_empty() {
                        self.sinks.insert(p);
                    }
                    if self.relevant_predecessors(&el.id).is_empty() {
                        self.sources.insert(p);
                    }
                }
                ElementCategory::Gateway(_) => {
                    // gateways only route tokens, they stay silent
                    let t = self.net.add_transition(None);
                    self.transition_of.insert(el.id.clone(), t);
                }
                ElementCategory::Task => {
                    let t = self.net.add_transition(meaningful_label(&el.label));
                    self.transition_of.insert(el.id.clone(), t);
                    if self.relevant_predecessors(&el.id).len() > 1 {
                        self.implicit_joins.insert(el.id.clone());
                    }
                    // implicit splits need no handling, they behave as AND-splits
                }
                ElementCategory::Other => {}
            }
        }
    }

    fn new_place(&mut self) -> PlaceId {
        self.net.add_place(None)
    }

    fn new_silent_transition(&mut self) -> TransitionId {
        self.net.add_transition(None)
    }

    fn arc_pt(&mut self, p: PlaceId, t: TransitionId) {
        self.net.add_arc(ArcType::place_to_transition(p, t), None);
    }

    fn arc_tp(&mut self, t: TransitionId, p: PlaceId) {
        self.net.add_arc(ArcType::transition_to_place(t, p), None);
    }

    /// Bridge every flow edge so that places and transitions strictly alternate
    fn establish_flows(&mut self) {
        let elements: Vec<&FlowElement> =
            self.flow.elements().filter(|e| e.is_relevant()).collect();
        for el in elements {
            let postset = self.relevant_successors(&el.id);
            match el.category {
                ElementCategory::Event => {
                    let src_p = self.place_of[&el.id];
                    for target in postset {
                        if target.category == ElementCategory::Event {
                            // place -> place needs a silent bridge transition
                            let t = self.new_silent_transition();
                            self.arc_pt(src_p, t);
                            self.arc_tp(t, self.place_of[&target.id]);
                        } else {
                            self.arc_pt(src_p, self.transition_of[&target.id]);
                        }
                    }
                }
                ElementCategory::Task => {
                    let src_t = self.transition_of[&el.id];
                    for target in postset {
                        match target.category {
                            ElementCategory::Gateway(kind) if kind.is_choice() => {
                                // all arcs into a choice gateway share one place
                                let p = self.gateway_input_place(&target.id);
                                self.arc_tp(src_t, p);
                            }
                            ElementCategory::Gateway(_) => {
                                let p = self.new_place();
                                self.arc_tp(src_t, p);
                                self.arc_pt(p, self.transition_of[&target.id]);
                            }
                            ElementCategory::Task => {
                                // transition -> transition needs a bridge place
                                let p = self.new_place();
                                self.arc_tp(src_t, p);
                                self.arc_pt(p, self.transition_of[&target.id]);
                            }
                            ElementCategory::Event => {
                                self.arc_tp(src_t, self.place_of[&target.id]);
                            }
                            ElementCategory::Other => {}
                        }
                    }
                }
                ElementCategory::Gateway(kind) if !kind.is_choice() => {
                    let src_t = self.transition_of[&el.id];
                    for target in postset {
                        if target.category == ElementCategory::Event {
                            self.arc_tp(src_t, self.place_of[&target.id]);
                        } else {
                            // one fresh place per branch keeps parallel tokens independent
                            let p = self.new_place();
                            self.arc_tp(src_t, p);
                            self.arc_pt(p, self.transition_of[&target.id]);
                        }
                    }
                }
                ElementCategory::Gateway(_) => {
                    for target in postset {
                        self.establish_choice_gateway_flow(&el.id, target);
                    }
                }
                ElementCategory::Other => {}
            }
        }
    }

    /// Shared input place of a choice gateway, created on first use
    fn gateway_input_place(&mut self, gateway_id: &str) -> PlaceId {
        if let Some(&p) = self.gateway_in.get(gateway_id) {
            return p;
        }
        let p = self.new_place();
        self.gateway_in.insert(gateway_id.to_string(), p);
        self.arc_pt(p, self.transition_of[gateway_id]);
        p
    }

    /// Shared output place of a choice gateway, created on first use
    fn gateway_output_place(&mut self, gateway_id: &str) -> PlaceId {
        if let Some(&p) = self.gateway_out.get(gateway_id) {
            return p;
        }
        let p = self.new_place();
        self.gateway_out.insert(gateway_id.to_string(), p);
        self.arc_tp(self.transition_of[gateway_id], p);
        p
    }

    fn establish_choice_gateway_flow(&mut self, gateway_id: &str, target: &FlowElement) {
        let output_p = self.gateway_output_place(gateway_id);
        match target.category {
            ElementCategory::Event => {
                let t = self.new_silent_transition();
                self.arc_pt(output_p, t);
                self.arc_tp(t, self.place_of[&target.id]);
            }
            ElementCategory::Gateway(kind) if kind.is_choice() => {
                // reuse an existing input place of the target gateway if one exists
                let input_p = match self.gateway_in.get(&target.id) {
                    Some(&p) => p,
                    None => {
                        let preset = self.net.preset_of_transition(self.transition_of[&target.id]);
                        match preset.into_iter().min() {
                            Some(p) => p,
                            None => self.gateway_input_place(&target.id),
                        }
                    }
                };
                let t = self.new_silent_transition();
                self.arc_pt(output_p, t);
                self.arc_tp(t, input_p);
            }
            ElementCategory::Gateway(_) => {
                let p_in = self.new_place();
                let t = self.new_silent_transition();
                self.arc_pt(output_p, t);
                self.arc_tp(t, p_in);
                self.arc_pt(p_in, self.transition_of[&target.id]);
            }
            ElementCategory::Task => {
                self.arc_pt(output_p, self.transition_of[&target.id]);
            }
            ElementCategory::Other => {}
        }
    }

    /// Tasks with several incoming arcs must synchronize through a single place
    fn correct_implicit_joins(&mut self) {
        for task_id in self.implicit_joins.clone() {
            let t = self.transition_of[&task_id];
            let mut in_places = self.net.preset_of_transition(t);
            in_places.sort();
            in_places.dedup();
            let join_p = self.new_place();
            for p in &in_places {
                self.net.remove_arc(ArcType::place_to_transition(*p, t));
            }
            for p in in_places {
                let st = self.new_silent_transition();
                self.arc_pt(p, st);
                self.arc_tp(st, join_p);
            }
            self.arc_pt(join_p, t);
        }
    }

    /// Tasks without any predecessor/successor get a synthetic boundary place
    fn add_missing_boundaries(&mut self) {
        for el in self.flow.elements() {
            if el.category != ElementCategory::Task {
                continue;
            }
            let t = self.transition_of[&el.id];
            if self.flow.predecessors(&el.id).is_empty() {
                let p = self.new_place();
                self.arc_pt(p, t);
                self.sources.insert(p);
            }
            if self.flow.successors(&el.id).is_empty() {
                let p = self.new_place();
                self.arc_tp(t, p);
                self.sinks.insert(p);
            }
        }
    }

    /// Boundary events fire in exclusive alternative to the normal flow of their host
    fn rewire_attached_events(&mut self) {
        for el in self.flow.elements() {
            if el.category != ElementCategory::Event {
                continue;
            }
            let Some(host_id) = &el.attached_to else {
                continue;
            };
            let Some(&host_t) = self.transition_of.get(host_id) else {
                continue;
            };
            let event_p = self.place_of[&el.id];
            let mut host_outputs: Vec<PlaceId> = self
                .net
                .postset_of_transition(host_t)
                .into_iter()
                .filter(|p| *p != event_p)
                .collect();
            host_outputs.sort();
            host_outputs.dedup();
            // without a normal outflow the event was not properly attached
            let Some(&split_p) = host_outputs.first() else {
                continue;
            };
            self.net
                .remove_arc(ArcType::transition_to_place(host_t, event_p));
            let t = self.new_silent_transition();
            self.arc_pt(split_p, t);
            self.arc_tp(t, event_p);
        }
    }

    /// Multiple start events are assumed exclusive: one shared place chooses among them
    fn merge_multiple_sources(&mut self) {
        if self.sources.len() <= 1 {
            return;
        }
        let shared = self.new_place();
        for src in std::mem::take(&mut self.sources) {
            let t = self.new_silent_transition();
            self.arc_pt(shared, t);
            self.arc_tp(t, src);
        }
        self.sources.insert(shared);
    }

    /// Multiple end events are assumed exclusive as well
    fn merge_multiple_sinks(&mut self) {
        if self.sinks.len() <= 1 {
            return;
        }
        let shared = self.new_place();
        for sink in std::mem::take(&mut self.sinks) {
            let t = self.new_silent_transition();
            self.arc_pt(sink, t);
            self.arc_tp(t, shared);
        }
        self.sinks.insert(shared);
    }

    /// Observable labels must live on transitions: split every labeled place
    /// into place -> transition(label) -> place
    fn eliminate_labeled_places(&mut self) {
        let labeled: Vec<PlaceId> = self
            .net
            .place_ids()
            .filter(|p| self.net.place(*p).label.is_some())
            .collect();
        for p in labeled {
            let label = self.net.places[p.0].label.take();
            let in_transitions = self.net.preset_of_place(p);
            let out_transitions = self.net.postset_of_place(p);

            let t = self.net.add_transition(label);
            let p_in = self.new_place();
            let p_out = self.new_place();
            for src in in_transitions {
                self.arc_tp(src, p_in);
            }
            for dst in out_transitions {
                self.arc_pt(p_out, dst);
            }
            self.arc_pt(p_in, t);
            self.arc_tp(t, p_out);

            self.net.arcs.retain(|a| match a.from_to {
                ArcType::PlaceTransition(from, _) => from != p,
                ArcType::TransitionPlace(_, to) => to != p,
            });
            self.dead_places.insert(p);
            if self.sources.remove(&p) {
                self.sources.insert(p_in);
            }
            if self.sinks.remove(&p) {
                self.sinks.insert(p_out);
            }
        }
    }

    /// Pick the initial and final place; degrade softly if none was identified
    fn determine_markings(&mut self) -> (Marking, Marking) {
        if self.sources.is_empty() {
            let fallback = self
                .net
                .place_ids()
                .filter(|p| !self.dead_places.contains(p))
                .find(|p| self.net.preset_of_place(*p).is_empty());
            if let Some(p) = fallback {
                self.sources.insert(p);
            }
        }
        if self.sinks.is_empty() {
            let fallback = self
                .net
                .place_ids()
                .filter(|p| !self.dead_places.contains(p))
                .find(|p| self.net.postset_of_place(*p).is_empty());
            if let Some(p) = fallback {
                self.sinks.insert(p);
            }
        }
        let im: Marking = self.sources.iter().next().map(|p| (*p, 1)).into_iter().collect();
        let fm: Marking = self.sinks.iter().next().map(|p| (*p, 1)).into_iter().collect();
        (im, fm)
    }

    /// Re-index everything into a fresh net with sequential ids
    fn clean_copy(self, im: Marking, fm: Marking) -> (PetriNet, Marking, Marking) {
        let mut clean = PetriNet::new();
        let mut place_map: HashMap<PlaceId, PlaceId> = HashMap::new();
        for p in self.net.place_ids() {
            if self.dead_places.contains(&p) {
                continue;
            }
            place_map.insert(p, clean.add_place(None));
        }
        let mut transition_map: HashMap<TransitionId, TransitionId> = HashMap::new();
        for t in self.net.transition_ids() {
            transition_map.insert(t, clean.add_transition(self.net.transition(t).label.clone()));
        }
        for arc in &self.net.arcs {
            let from_to = match arc.from_to {
                ArcType::PlaceTransition(p, t) => {
                    ArcType::place_to_transition(place_map[&p], transition_map[&t])
                }
                ArcType::TransitionPlace(t, p) => {
                    ArcType::transition_to_place(transition_map[&t], place_map[&p])
                }
            };
            clean.add_arc(from_to, Some(arc.weight));
        }
        let im: Marking = im.iter().map(|(p, c)| (place_map[p], *c)).collect();
        let fm: Marking = fm.iter().map(|(p, c)| (place_map[p], *c)).collect();
        clean.initial_marking = Some(im.clone());
        clean.final_marking = Some(fm.clone());
        (clean, im, fm)
    }
}
