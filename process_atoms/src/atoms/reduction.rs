//! Deduplication and subsumption-based pruning of process atoms.
//!
//! All passes are order-independent: the output set only depends on which
//! atoms are structurally present, never on input order. Reduction is
//! idempotent.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::declare::templates::Template;
use crate::event_log::constants::is_useless_label;

use super::process_atom::ProcessAtom;

/// Drop atoms that constrain a useless label
pub fn remove_useless_atoms(atoms: Vec<ProcessAtom>) -> Vec<ProcessAtom> {
    atoms
        .into_iter()
        .filter(|atom| !atom.operands.iter().any(|op| is_useless_label(op)))
        .collect()
}

/// Sort atoms canonically so every downstream pass picks deterministic
/// representatives regardless of input order
fn canonical_sort(atoms: &mut [ProcessAtom]) {
    atoms.sort_by(|x, y| {
        x.structural_key()
            .cmp(&y.structural_key())
            .then_with(|| OrderedFloat(y.support).cmp(&OrderedFloat(x.support)))
            .then_with(|| OrderedFloat(y.confidence).cmp(&OrderedFloat(x.confidence)))
            .then_with(|| x.id.cmp(&y.id))
    });
}

/// The unordered operand pair of an atom
fn operand_set(atom: &ProcessAtom) -> Vec<String> {
    let mut ops = atom.operands.clone();
    ops.sort();
    ops
}

fn is_response_family(t: Template) -> bool {
    matches!(
        t,
        Template::Response | Template::AlternateResponse | Template::ChainResponse
    )
}

fn is_precedence_like(t: Template) -> bool {
    matches!(
        t,
        Template::Precedence
            | Template::AlternatePrecedence
            | Template::ChainPrecedence
            | Template::RespondedExistence
    )
}

fn is_succession_or_coexistence(t: Template) -> bool {
    t.is_succession_family() || t == Template::CoExistence
}

///
/// Reduce a set of atoms to a minimal non-redundant representative set
///
/// 1. Atoms identical in (template, operands, cardinality) are deduplicated.
/// 2. Non-directed templates are additionally deduplicated across operand
///    order; directed ones are not (`a` before `b` and `b` before `a` are
///    different facts).
/// 3. Per ordered operand pair, if a Succession-family atom is present, only
///    the strongest of the succession/co-existence atoms survives and the
///    weaker response/precedence relations implied by it are dropped.
///    Without a succession atom, the strongest of the precedence-like group
///    and the strongest of the response group are kept.
///
pub fn reduce_redundancies(atoms: Vec<ProcessAtom>) -> Vec<ProcessAtom> {
    let mut atoms = atoms;
    canonical_sort(&mut atoms);

    // structural dedup; for non-directed templates the operand order is
    // canonicalized first so mirrored duplicates collapse
    let mut seen: BTreeSet<(Template, Vec<String>, u32)> = BTreeSet::new();
    let mut deduped: Vec<ProcessAtom> = Vec::new();
    for atom in atoms {
        let key = if atom.atom_type.is_directed() {
            (atom.atom_type, atom.operands.clone(), atom.cardinality)
        } else {
            (atom.atom_type, operand_set(&atom), atom.cardinality)
        };
        if seen.insert(key) {
            deduped.push(atom);
        }
    }

    // group binary relation atoms by their ordered operand pair
    let mut retained: Vec<ProcessAtom> = Vec::new();
    let mut groups: BTreeMap<Vec<String>, Vec<ProcessAtom>> = BTreeMap::new();
    for atom in deduped {
        if atom.arity == 2 && !atom.atom_type.is_negative() {
            groups.entry(atom.operands.clone()).or_default().push(atom);
        } else {
            retained.push(atom);
        }
    }

    for (_, group) in groups {
        let has_succession = group.iter().any(|a| a.atom_type.is_succession_family());
        if has_succession {
            let strongest = group
                .iter()
                .filter(|a| is_succession_or_coexistence(a.atom_type))
                .min_by_key(|a| a.atom_type.subsumption_rank())
                .cloned();
            if let Some(atom) = strongest {
                retained.push(atom);
            }
            // everything else in the group is implied by the succession atom
            retained.extend(
                group
                    .into_iter()
                    .filter(|a| {
                        !is_succession_or_coexistence(a.atom_type)
                            && !is_precedence_like(a.atom_type)
                            && !is_response_family(a.atom_type)
                    }),
            );
        } else {
            let strongest_precedence = group
                .iter()
                .filter(|a| is_precedence_like(a.atom_type))
                .min_by_key(|a| a.atom_type.subsumption_rank())
                .cloned();
            let strongest_response = group
                .iter()
                .filter(|a| is_response_family(a.atom_type))
                .min_by_key(|a| a.atom_type.subsumption_rank())
                .cloned();
            retained.extend(strongest_precedence);
            retained.extend(strongest_response);
            retained.extend(group.into_iter().filter(|a| {
                !is_precedence_like(a.atom_type) && !is_response_family(a.atom_type)
            }));
        }
    }

    canonical_sort(&mut retained);
    retained
}

///
/// Aggregate structurally-identical atoms mined from different providers
///
/// Support values are summed, providers are unioned; the aggregate is then
/// cleaned of useless operands and reduced.
///
pub fn aggregate_atoms(atoms: Vec<ProcessAtom>) -> Vec<ProcessAtom> {
    let mut atoms = atoms;
    canonical_sort(&mut atoms);
    let grouped = atoms.into_iter().chunk_by(|a| a.atom_str.clone());
    let mut aggregated: Vec<ProcessAtom> = Vec::new();
    for (_, group) in &grouped {
        let group: Vec<ProcessAtom> = group.collect();
        let support = group.iter().map(|a| a.support).sum();
        let mut providers: Vec<String> = group
            .iter()
            .flat_map(|a| a.providers.iter().cloned())
            .collect();
        providers.sort();
        providers.dedup();
        let mut atom = group[0].clone();
        atom.support = support;
        atom.providers = providers;
        aggregated.push(atom);
    }
    reduce_redundancies(remove_useless_atoms(aggregated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::process_atom::ProvisionType;

    fn atom(template: Template, ops: &[&str]) -> ProcessAtom {
        ProcessAtom::new(
            template,
            ops.iter().map(|s| s.to_string()).collect(),
            if template.supports_cardinality() { 1 } else { 0 },
            1.0,
            1.0,
            ProvisionType::BpmnMined,
            "m".into(),
        )
    }

    fn keys(atoms: &[ProcessAtom]) -> BTreeSet<(Template, Vec<String>, u32)> {
        atoms.iter().map(|a| a.structural_key()).collect()
    }

    #[test]
    fn drops_useless_operands() {
        let atoms = vec![
            atom(Template::Response, &["a", "b"]),
            atom(Template::Response, &["a", "undefined"]),
        ];
        let cleaned = remove_useless_atoms(atoms);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].operands, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn deduplicates_structurally() {
        let atoms = vec![
            atom(Template::Response, &["a", "b"]),
            atom(Template::Response, &["a", "b"]),
        ];
        assert_eq!(reduce_redundancies(atoms).len(), 1);
    }

    #[test]
    fn non_directed_templates_merge_across_operand_order() {
        let atoms = vec![
            atom(Template::CoExistence, &["a", "b"]),
            atom(Template::CoExistence, &["b", "a"]),
        ];
        assert_eq!(reduce_redundancies(atoms).len(), 1);
    }

    #[test]
    fn directed_templates_keep_both_orders() {
        let atoms = vec![
            atom(Template::Response, &["a", "b"]),
            atom(Template::Response, &["b", "a"]),
        ];
        assert_eq!(reduce_redundancies(atoms).len(), 2);
    }

    #[test]
    fn succession_subsumes_weaker_relations() {
        let atoms = vec![
            atom(Template::Succession, &["a", "b"]),
            atom(Template::ChainSuccession, &["a", "b"]),
            atom(Template::Response, &["a", "b"]),
            atom(Template::Precedence, &["a", "b"]),
            atom(Template::CoExistence, &["a", "b"]),
        ];
        let reduced = reduce_redundancies(atoms);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced[0].atom_type, Template::ChainSuccession);
    }

    #[test]
    fn strongest_of_each_family_survives_without_succession() {
        let atoms = vec![
            atom(Template::Response, &["a", "b"]),
            atom(Template::ChainResponse, &["a", "b"]),
            atom(Template::Precedence, &["a", "b"]),
            atom(Template::AlternatePrecedence, &["a", "b"]),
            atom(Template::ExclusiveChoice, &["a", "b"]),
        ];
        let reduced = reduce_redundancies(atoms);
        let templates: BTreeSet<Template> = reduced.iter().map(|a| a.atom_type).collect();
        assert_eq!(
            templates,
            BTreeSet::from([
                Template::ChainResponse,
                Template::AlternatePrecedence,
                Template::ExclusiveChoice
            ])
        );
    }

    #[test]
    fn reduction_is_idempotent_and_order_independent() {
        let atoms = vec![
            atom(Template::Succession, &["a", "b"]),
            atom(Template::Response, &["a", "b"]),
            atom(Template::Precedence, &["a", "b"]),
            atom(Template::Choice, &["a", "b"]),
            atom(Template::Existence, &["c"]),
            atom(Template::NotResponse, &["b", "c"]),
        ];
        let once = reduce_redundancies(atoms.clone());
        let twice = reduce_redundancies(once.clone());
        assert_eq!(keys(&once), keys(&twice));

        let mut reversed = atoms;
        reversed.reverse();
        let from_reversed = reduce_redundancies(reversed);
        assert_eq!(keys(&once), keys(&from_reversed));
    }

    #[test]
    fn aggregation_merges_providers_and_support() {
        let mut a1 = atom(Template::Response, &["a", "b"]);
        a1.support = 0.4;
        a1.providers = vec!["p1".into()];
        let mut a2 = atom(Template::Response, &["a", "b"]);
        a2.support = 0.5;
        a2.providers = vec!["p2".into()];
        let aggregated = aggregate_atoms(vec![a1, a2]);
        assert_eq!(aggregated.len(), 1);
        assert!((aggregated[0].support - 0.9).abs() < 1e-9);
        assert_eq!(
            aggregated[0].providers,
            vec!["p1".to_string(), "p2".to_string()]
        );
    }
}
