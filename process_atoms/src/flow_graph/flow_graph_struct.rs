use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

///
/// Gateway subtype of a BPMN gateway element
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayKind {
    /// Parallel (AND) gateway: all outgoing branches are taken
    Parallel,
    /// Exclusive (XOR) gateway: exactly one outgoing branch is taken
    Exclusive,
    /// Inclusive (OR) gateway
    Inclusive,
    /// Event-based gateway (treated as exclusive choice)
    EventBased,
}

impl GatewayKind {
    /// Whether this gateway models a choice between branches (everything except parallel)
    pub fn is_choice(&self) -> bool {
        !matches!(self, GatewayKind::Parallel)
    }
}

///
/// Category of a flow element
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementCategory {
    /// An activity/task
    Task,
    /// A start, end, intermediate or boundary event
    Event,
    /// A gateway with its subtype
    Gateway(GatewayKind),
    /// Anything else (pools, lanes, data objects, annotations); ignored by the compiler
    Other,
}

///
/// A single element of a BPMN flow graph, as produced by an external model parser
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowElement {
    /// Stable element id
    pub id: String,
    /// Sanitized display label
    pub label: String,
    /// Element category
    pub category: ElementCategory,
    /// For boundary events: the id of the element this event is attached to
    pub attached_to: Option<String>,
}

impl FlowElement {
    /// Create a task element
    pub fn task<S: Into<String>, L: Into<String>>(id: S, label: L) -> Self {
        FlowElement {
            id: id.into(),
            label: label.into(),
            category: ElementCategory::Task,
            attached_to: None,
        }
    }

    /// Create an event element
    pub fn event<S: Into<String>, L: Into<String>>(id: S, label: L) -> Self {
        FlowElement {
            id: id.into(),
            label: label.into(),
            category: ElementCategory::Event,
            attached_to: None,
        }
    }

    /// Create a gateway element
    pub fn gateway<S: Into<String>, L: Into<String>>(id: S, label: L, kind: GatewayKind) -> Self {
        FlowElement {
            id: id.into(),
            label: label.into(),
            category: ElementCategory::Gateway(kind),
            attached_to: None,
        }
    }

    /// Mark this element as attached to a host element (boundary event)
    pub fn attached_to<S: Into<String>>(mut self, host: S) -> Self {
        self.attached_to = Some(host.into());
        self
    }

    /// Whether the compiler should consider this element at all
    pub fn is_relevant(&self) -> bool {
        self.category != ElementCategory::Other
    }
}

///
/// Directed labeled graph of BPMN flow elements with successor/predecessor queries
///
/// Built by an external BPMN parser; consumed by the Petri net compiler.
/// Immutable once populated.
///
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    graph: DiGraph<FlowElement, ()>,
    id_to_node: HashMap<String, NodeIndex>,
}

impl FlowGraph {
    /// Create an empty flow graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element to the graph
    ///
    /// An element with an already-known id is ignored.
    pub fn add_element(&mut self, element: FlowElement) {
        if self.id_to_node.contains_key(&element.id) {
            return;
        }
        let id = element.id.clone();
        let node = self.graph.add_node(element);
        self.id_to_node.insert(id, node);
    }

    /// Add a sequence flow between two elements
    ///
    /// Returns `false` if either id is unknown.
    pub fn add_flow(&mut self, from: &str, to: &str) -> bool {
        match (self.id_to_node.get(from), self.id_to_node.get(to)) {
            (Some(&f), Some(&t)) => {
                self.graph.add_edge(f, t, ());
                true
            }
            _ => false,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no elements
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up an element by id
    pub fn get(&self, id: &str) -> Option<&FlowElement> {
        self.id_to_node.get(id).map(|&n| &self.graph[n])
    }

    /// All elements, in insertion order
    pub fn elements(&self) -> impl Iterator<Item = &FlowElement> {
        self.graph.node_indices().map(|n| &self.graph[n])
    }

    /// Direct successors of the element with the given id
    pub fn successors(&self, id: &str) -> Vec<&FlowElement> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Direct predecessors of the element with the given id
    pub fn predecessors(&self, id: &str) -> Vec<&FlowElement> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, dir: Direction) -> Vec<&FlowElement> {
        match self.id_to_node.get(id) {
            Some(&n) => {
                let mut elems: Vec<&FlowElement> = self
                    .graph
                    .neighbors_directed(n, dir)
                    .map(|m| &self.graph[m])
                    .collect();
                // neighbors_directed iterates in reverse insertion order
                elems.reverse();
                elems
            }
            None => Vec::new(),
        }
    }
}
