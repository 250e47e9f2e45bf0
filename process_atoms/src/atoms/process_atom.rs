use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::declare::templates::Template;

///
/// How a process atom was obtained
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvisionType {
    /// Compiled from a process model (via the Petri net play-out)
    BpmnMined,
    /// Discovered from an event log
    LogMined,
}

///
/// A single discovered or compiled constraint instance
///
/// Immutable value object; identity is the UUID, while equality for
/// deduplication purposes is structural (template + operands + cardinality,
/// see [`ProcessAtom::structural_key`]).
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessAtom {
    /// Unique id of this atom
    pub id: Uuid,
    /// The constraint template
    pub atom_type: Template,
    /// Canonical string form, e.g. `Response[a, b] | | |`
    pub atom_str: String,
    /// Number of operand activities (1 or 2)
    pub arity: usize,
    /// Cardinality for Existence/Absence/Exactly atoms (0 for binary atoms)
    pub cardinality: u32,
    /// Operand activity names
    pub operands: Vec<String>,
    /// Fraction of satisfying traces, weighted by variant frequency
    pub support: f64,
    /// Fraction of activated traces that also satisfy the constraint
    pub confidence: f64,
    /// Provenance of the atom
    pub provision_type: ProvisionType,
    /// Ids of the processes/models/logs this atom was derived from
    pub providers: Vec<String>,
    /// The operands whose occurrence activates the constraint
    pub activation_conditions: Vec<String>,
}

impl ProcessAtom {
    /// Create a new atom with a fresh id
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        atom_type: Template,
        operands: Vec<String>,
        cardinality: u32,
        support: f64,
        confidence: f64,
        provision_type: ProvisionType,
        provider: String,
    ) -> Self {
        let activation_conditions = atom_type
            .activation_operands()
            .iter()
            .filter_map(|&i| operands.get(i).cloned())
            .collect();
        ProcessAtom {
            id: Uuid::new_v4(),
            atom_type,
            atom_str: atom_string(atom_type, &operands, cardinality),
            arity: operands.len(),
            cardinality,
            operands,
            support,
            confidence,
            provision_type,
            providers: vec![provider],
            activation_conditions,
        }
    }

    /// The structural identity used for deduplication
    pub fn structural_key(&self) -> (Template, Vec<String>, u32) {
        (self.atom_type, self.operands.clone(), self.cardinality)
    }

    /// The atom string with swapped operands (only meaningful for binary atoms)
    pub fn inverse_atom_str(&self) -> String {
        if self.operands.len() != 2 {
            return self.atom_str.clone();
        }
        let swapped = vec![self.operands[1].clone(), self.operands[0].clone()];
        atom_string(self.atom_type, &swapped, self.cardinality)
    }
}

/// Canonical atom string: `Existence2[a] | |` for cardinality atoms,
/// `Response[a, b] | | |` for binary ones
pub fn atom_string(template: Template, operands: &[String], cardinality: u32) -> String {
    let ops = operands.join(", ");
    if template.is_binary() {
        format!("{}[{}] | | |", template.name(), ops)
    } else if template.supports_cardinality() {
        format!("{}{}[{}] | |", template.name(), cardinality, ops)
    } else {
        format!("{}[{}] | |", template.name(), ops)
    }
}

///
/// An atom together with the cases of a log that violate it
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Unique id of this violation record
    pub id: Uuid,
    /// The checked process/log
    pub log: String,
    /// The violated atom
    pub atom: ProcessAtom,
    /// Ids of the violating cases
    pub cases: Vec<String>,
    /// Number of violating cases
    pub frequency: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_strings() {
        let atom = ProcessAtom::new(
            Template::Response,
            vec!["a".into(), "b".into()],
            0,
            1.0,
            1.0,
            ProvisionType::BpmnMined,
            "model".into(),
        );
        assert_eq!(atom.atom_str, "Response[a, b] | | |");
        assert_eq!(atom.inverse_atom_str(), "Response[b, a] | | |");
        assert_eq!(atom.activation_conditions, vec!["a".to_string()]);

        let atom = ProcessAtom::new(
            Template::Existence,
            vec!["a".into()],
            2,
            0.5,
            1.0,
            ProvisionType::LogMined,
            "log".into(),
        );
        assert_eq!(atom.atom_str, "Existence2[a] | |");
        assert!(atom.activation_conditions.is_empty());
    }

    #[test]
    fn structural_key_ignores_id_and_support() {
        let a = ProcessAtom::new(
            Template::Response,
            vec!["a".into(), "b".into()],
            0,
            1.0,
            1.0,
            ProvisionType::BpmnMined,
            "m1".into(),
        );
        let b = ProcessAtom::new(
            Template::Response,
            vec!["a".into(), "b".into()],
            0,
            0.5,
            0.7,
            ProvisionType::LogMined,
            "m2".into(),
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.structural_key(), b.structural_key());
    }
}
