#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

///
/// Event logs and their projection onto distinct trace variants
///
pub mod event_log {
    /// Constants and label filters
    pub mod constants;
    /// [`EventLog`] struct and sub-structs
    pub mod event_log_struct;
    /// [`VariantLog`]: distinct trace variants with case ids and frequencies
    pub mod variant_log;

    pub use event_log_struct::{
        Attribute, AttributeAccess, AttributeValue, Attributes, Event, EventLog, Trace,
    };
    pub use variant_log::{TraceVariant, VariantLog};
}

///
/// BPMN flow graphs as produced by an external model parser
///
pub mod flow_graph {
    /// [`FlowGraph`] and [`FlowElement`] structs
    pub mod flow_graph_struct;
    /// Display-label sanitization
    pub mod sanitize;

    #[doc(inline)]
    pub use flow_graph_struct::{ElementCategory, FlowElement, FlowGraph, GatewayKind};
}

///
/// Petri nets: structure, compilation from flow graphs, and bounded play-out
///
pub mod petri_net {
    /// Compile a [`FlowGraph`](crate::flow_graph::FlowGraph) into a [`PetriNet`]
    pub mod bpmn_to_net;
    /// [`PetriNet`] struct and [`Marking`](petri_net_struct::Marking)s
    pub mod petri_net_struct;
    /// Bounded enumeration of trace variants from a net
    pub mod play_out;

    #[doc(inline)]
    pub use petri_net_struct::PetriNet;
}

///
/// DECLARE templates, single-trace checkers and conformance checking
///
pub mod declare {
    /// [`TraceState`](checker_result::TraceState), [`CheckerResult`](checker_result::CheckerResult) and the shared decision table
    pub mod checker_result;
    /// Sandboxed activation/correlation/time condition expressions
    pub mod condition;
    /// Constraint models and the general (semantic) evaluator
    pub mod conformance;
    /// The compiled-regex evaluator
    pub mod regex_checker;
    /// The template catalog
    pub mod templates;

    ///
    /// The per-template single-trace checker functions
    ///
    pub mod checkers {
        /// Choice, Exclusive Choice and Co-Existence
        pub mod choice;
        /// Existence, Absence, Exactly, Init and End
        pub mod existence;
        /// The negated relation templates
        pub mod negative_relation;
        /// The positive relation templates
        pub mod relation;
        /// Rule parameters shared by all checkers
        pub mod rules;
    }
}

///
/// Process atoms: the discovered/compiled constraint instances
///
pub mod atoms {
    /// [`ProcessAtom`](process_atom::ProcessAtom) and [`Violation`](process_atom::Violation) value objects
    pub mod process_atom;
    /// Deduplication, subsumption pruning and aggregation
    pub mod reduction;
}

///
/// Discovery of atoms from logs and models
///
pub mod discovery {
    /// Frequent itemset computation
    pub mod itemsets;
    /// Mining atoms from event logs
    pub mod log_discovery;
    /// Mining atoms from process models
    pub mod model_discovery;
}

#[doc(inline)]
pub use event_log::event_log_struct::EventLog;

#[doc(inline)]
pub use event_log::variant_log::VariantLog;

#[doc(inline)]
pub use flow_graph::flow_graph_struct::FlowGraph;

#[doc(inline)]
pub use petri_net::petri_net_struct::{Marking, PetriNet};

#[doc(inline)]
pub use petri_net::bpmn_to_net::build_petri_net;

#[doc(inline)]
pub use petri_net::play_out::{net_variants, PlayOutOptions};

#[doc(inline)]
pub use declare::templates::Template;

#[doc(inline)]
pub use declare::checker_result::{CheckerResult, TraceState};

#[doc(inline)]
pub use declare::conformance::{
    check_trace_conformance, conformance_checking, ConditionErrors, ConfigurationError,
    ConformanceReport, Constraint, DeclareModel,
};

#[doc(inline)]
pub use atoms::process_atom::{ProcessAtom, ProvisionType, Violation};

#[doc(inline)]
pub use atoms::reduction::{aggregate_atoms, reduce_redundancies, remove_useless_atoms};

#[doc(inline)]
pub use discovery::itemsets::{frequent_itemsets, FrequentItemset};

#[doc(inline)]
pub use discovery::log_discovery::{
    check_atom_violations, ConstraintQuery, DiscoveryOptions, LogMiner,
};

#[doc(inline)]
pub use discovery::model_discovery::ModelMiner;
