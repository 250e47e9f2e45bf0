//! Compilation of process models into process atoms, via the Petri-net
//! play-out path.

use crate::atoms::process_atom::{ProcessAtom, ProvisionType};
use crate::atoms::reduction::{reduce_redundancies, remove_useless_atoms};
use crate::declare::templates::Template;
use crate::event_log::constants::{is_relevant_label, is_useless_label};
use crate::event_log::variant_log::VariantLog;
use crate::flow_graph::flow_graph_struct::FlowGraph;
use crate::flow_graph::sanitize::{sanitize_label_full, replace_useless_substrings};
use crate::petri_net::bpmn_to_net::build_petri_net;
use crate::petri_net::play_out::{net_variants, PlayOutOptions};

use super::log_discovery::{DiscoveryOptions, LogMiner};

///
/// Mines process atoms from a BPMN flow graph
///
/// The model is converted to a Petri net, played out into its trace variants,
/// and the variants are mined like a log; only atoms holding in every variant
/// (support and confidence 1) survive, since a model makes no statistical
/// statements.
///
#[derive(Debug)]
pub struct ModelMiner<'a> {
    model_id: String,
    flow: &'a FlowGraph,
}

impl<'a> ModelMiner<'a> {
    /// Create a miner for the given model
    pub fn new<S: Into<String>>(model_id: S, flow: &'a FlowGraph) -> Self {
        ModelMiner {
            model_id: model_id.into(),
            flow,
        }
    }

    ///
    /// The distinct trace variants the model can produce, as a variant log
    ///
    /// Labels that are useless, sanitize to nothing or contain placeholders
    /// are dropped from the played-out traces.
    ///
    pub fn extract_variants(&self, options: &PlayOutOptions) -> VariantLog {
        let (net, initial_marking, final_marking) = build_petri_net(self.flow);
        let variants = net_variants(&net, &initial_marking, &final_marking, options);
        let filtered = variants.into_iter().map(|variant| {
            variant
                .into_iter()
                .filter(|label| {
                    !is_useless_label(label)
                        && is_relevant_label(label)
                        && !label.contains('?')
                        && !sanitize_label_full(&replace_useless_substrings(label)).is_empty()
                })
                .collect::<Vec<String>>()
        });
        VariantLog::from_label_sequences(filtered)
    }

    ///
    /// Mine the atoms every execution of the model agrees on
    ///
    pub fn mine_with_petri(
        &self,
        considered_templates: Option<Vec<Template>>,
        options: &PlayOutOptions,
    ) -> Vec<ProcessAtom> {
        let variant_log = self.extract_variants(options);
        if variant_log.variants.is_empty() {
            return Vec::new();
        }
        let miner = LogMiner::new(self.model_id.clone(), &variant_log);
        let discovery = DiscoveryOptions {
            min_support: 0.0,
            consider_vacuity: true,
            max_cardinality: 1,
            considered_templates,
        };
        let atoms = match miner.mine(&discovery) {
            Ok(atoms) => atoms,
            Err(_) => return Vec::new(),
        };
        let certain: Vec<ProcessAtom> = atoms
            .into_iter()
            .filter(|atom| atom.support >= 1.0 - 1e-9 && atom.confidence >= 1.0 - 1e-9)
            .map(|mut atom| {
                atom.provision_type = ProvisionType::BpmnMined;
                atom.providers = vec![self.model_id.clone()];
                atom
            })
            .collect();
        reduce_redundancies(remove_useless_atoms(certain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow_graph::flow_graph_struct::{FlowElement, GatewayKind};

    fn sequential_model() -> FlowGraph {
        let mut flow = FlowGraph::new();
        flow.add_element(FlowElement::event("s", "Start Event"));
        flow.add_element(FlowElement::task("a", "Register"));
        flow.add_element(FlowElement::task("b", "Check"));
        flow.add_element(FlowElement::event("e", "End Event"));
        flow.add_flow("s", "a");
        flow.add_flow("a", "b");
        flow.add_flow("b", "e");
        flow
    }

    #[test]
    fn extracts_variants_as_log() {
        let flow = sequential_model();
        let miner = ModelMiner::new("m1", &flow);
        let log = miner.extract_variants(&PlayOutOptions::default());
        assert_eq!(log.variants.len(), 1);
        assert_eq!(
            log.variants[0].activities,
            vec!["Register".to_string(), "Check".to_string()]
        );
    }

    #[test]
    fn mines_certain_atoms_only() {
        let flow = sequential_model();
        let miner = ModelMiner::new("m1", &flow);
        let atoms = miner.mine_with_petri(
            Some(vec![
                Template::Response,
                Template::Precedence,
                Template::Succession,
                Template::Init,
                Template::End,
            ]),
            &PlayOutOptions::default(),
        );
        assert!(!atoms.is_empty());
        for atom in &atoms {
            assert!(atom.support >= 1.0 - 1e-9);
            assert_eq!(atom.provision_type, ProvisionType::BpmnMined);
            assert_eq!(atom.providers, vec!["m1".to_string()]);
        }
        // the single variant [Register, Check] entails Succession, which
        // subsumes the weaker response/precedence relations on that pair
        assert!(atoms
            .iter()
            .any(|a| a.atom_type == Template::Succession
                && a.operands == vec!["Register".to_string(), "Check".to_string()]));
        assert!(!atoms
            .iter()
            .any(|a| a.atom_type == Template::Response
                && a.operands == vec!["Register".to_string(), "Check".to_string()]));
        assert!(atoms
            .iter()
            .any(|a| a.atom_type == Template::Init
                && a.operands == vec!["Register".to_string()]));
    }

    #[test]
    fn choice_model_yields_exclusive_choice() {
        let mut flow = FlowGraph::new();
        flow.add_element(FlowElement::event("s", "Start Event"));
        flow.add_element(FlowElement::gateway("g1", "Gateway", GatewayKind::Exclusive));
        flow.add_element(FlowElement::task("a", "Approve"));
        flow.add_element(FlowElement::task("b", "Reject"));
        flow.add_element(FlowElement::gateway("g2", "Gateway", GatewayKind::Exclusive));
        flow.add_element(FlowElement::event("e", "End Event"));
        flow.add_flow("s", "g1");
        flow.add_flow("g1", "a");
        flow.add_flow("g1", "b");
        flow.add_flow("a", "g2");
        flow.add_flow("b", "g2");
        flow.add_flow("g2", "e");

        let miner = ModelMiner::new("m2", &flow);
        let atoms = miner.mine_with_petri(
            Some(vec![Template::ExclusiveChoice]),
            &PlayOutOptions::default(),
        );
        assert!(atoms.iter().any(|a| {
            a.atom_type == Template::ExclusiveChoice
                && a.operands.contains(&"Approve".to_string())
                && a.operands.contains(&"Reject".to_string())
        }));
    }
}
