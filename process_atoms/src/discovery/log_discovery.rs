//! Discovery of process atoms from event logs, and checking of atoms against
//! logs.
//!
//! The bulk discovery path evaluates compiled template regexes over encoded
//! trace variants; the direct path runs the general evaluator. Both agree on
//! every input. Evaluation per (itemset, template) pair is independent, so the
//! discovery loop is a parallel map over itemsets.

use rayon::prelude::*;
use uuid::Uuid;

use crate::atoms::process_atom::{ProcessAtom, ProvisionType, Violation};
use crate::declare::conformance::{
    CompiledConstraint, ConfigurationError, Constraint,
};
use crate::declare::regex_checker::{
    compile_template, is_activated, ActivityAlphabet,
};
use crate::declare::templates::Template;
use crate::event_log::variant_log::VariantLog;

use super::itemsets::{frequent_itemsets, FrequentItemset};

///
/// Parameters for atom discovery
///
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryOptions {
    /// Minimum support a discovered atom needs to be emitted
    pub min_support: f64,
    /// Whether vacuously satisfied variants count as satisfied
    pub consider_vacuity: bool,
    /// Cardinalities `1..=max_cardinality` are tried for Existence/Absence/Exactly
    pub max_cardinality: u32,
    /// Restrict discovery to these templates (`None` tries the whole catalog)
    pub considered_templates: Option<Vec<Template>>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        DiscoveryOptions {
            min_support: 0.0,
            consider_vacuity: true,
            max_cardinality: 1,
            considered_templates: None,
        }
    }
}

impl DiscoveryOptions {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.min_support) {
            return Err(ConfigurationError::SupportOutOfRange(self.min_support));
        }
        if self.max_cardinality == 0 {
            return Err(ConfigurationError::NonPositiveCardinality);
        }
        Ok(())
    }

    fn templates(&self) -> Vec<Template> {
        match &self.considered_templates {
            Some(templates) => templates.clone(),
            None => crate::declare::templates::ALL_TEMPLATES.to_vec(),
        }
    }
}

/// Per-variant data shared by all constraint evaluations of one discovery run
struct EncodedVariants {
    encoded: Vec<String>,
    frequencies: Vec<u64>,
    total_cases: u64,
}

impl EncodedVariants {
    fn new(log: &VariantLog, alphabet: &ActivityAlphabet) -> Self {
        EncodedVariants {
            encoded: log
                .variants
                .iter()
                .map(|v| alphabet.encode(&v.activities))
                .collect(),
            frequencies: log.variants.iter().map(|v| v.frequency()).collect(),
            total_cases: log.total_cases,
        }
    }
}

/// Support and confidence of one template instantiation over all variants
struct InstantiationStats {
    support: f64,
    confidence: f64,
    num_activations: u64,
    num_satisfactions: u64,
}

fn evaluate_instantiation(
    variants: &EncodedVariants,
    template: Template,
    a: char,
    b: Option<char>,
    n: u32,
    consider_vacuity: bool,
) -> InstantiationStats {
    let regex = compile_template(template, a, b, n);
    let mut num_satisfactions = 0_u64;
    let mut num_activations = 0_u64;
    let mut satisfied_when_activated = 0_u64;
    for (encoded, frequency) in variants.encoded.iter().zip(&variants.frequencies) {
        let satisfied = regex.is_match(encoded);
        let activated = is_activated(template, a, b, encoded);
        if activated {
            num_activations += frequency;
            if satisfied {
                satisfied_when_activated += frequency;
            }
        }
        if satisfied && (consider_vacuity || activated) {
            num_satisfactions += frequency;
        }
    }
    let support = if variants.total_cases > 0 {
        num_satisfactions as f64 / variants.total_cases as f64
    } else {
        0.0
    };
    let confidence = if num_activations > 0 {
        satisfied_when_activated as f64 / num_activations as f64
    } else {
        0.0
    };
    InstantiationStats {
        support,
        confidence,
        num_activations,
        num_satisfactions,
    }
}

///
/// Mines process atoms from an event log's trace variants
///
#[derive(Debug)]
pub struct LogMiner<'a> {
    process: String,
    log: &'a VariantLog,
}

impl<'a> LogMiner<'a> {
    /// Create a miner for the given process id and variant log
    pub fn new<S: Into<String>>(process: S, log: &'a VariantLog) -> Self {
        LogMiner {
            process: process.into(),
            log,
        }
    }

    ///
    /// Discover atoms using the compiled-regex evaluator (the bulk path)
    ///
    /// Every applicable template is instantiated per frequent itemset (binary
    /// templates in both operand orders, cardinality templates for every
    /// cardinality up to the configured maximum) and kept if its support
    /// reaches the threshold.
    ///
    pub fn mine(&self, options: &DiscoveryOptions) -> Result<Vec<ProcessAtom>, ConfigurationError> {
        options.validate()?;
        let itemsets = frequent_itemsets(self.log, options.min_support, 2)?;
        Ok(self.mine_itemsets(&itemsets, options))
    }

    ///
    /// Discover atoms for externally supplied frequent itemsets
    ///
    pub fn mine_itemsets(
        &self,
        itemsets: &[FrequentItemset],
        options: &DiscoveryOptions,
    ) -> Vec<ProcessAtom> {
        let activities = self.log.unique_activities();
        let alphabet = ActivityAlphabet::new(&activities);
        let variants = EncodedVariants::new(self.log, &alphabet);
        let templates = options.templates();

        itemsets
            .par_iter()
            .map(|itemset| {
                let mut atoms = Vec::new();
                for template in &templates {
                    match (itemset.items.as_slice(), template.is_binary()) {
                        ([single], false) => {
                            self.discover_unary(
                                &variants, &alphabet, *template, single, options, &mut atoms,
                            );
                        }
                        ([first, second], true) if first != second => {
                            self.discover_binary(
                                &variants, &alphabet, *template, first, second, options,
                                &mut atoms,
                            );
                            self.discover_binary(
                                &variants, &alphabet, *template, second, first, options,
                                &mut atoms,
                            );
                        }
                        _ => {}
                    }
                }
                atoms
            })
            .flatten()
            .collect()
    }

    fn discover_unary(
        &self,
        variants: &EncodedVariants,
        alphabet: &ActivityAlphabet,
        template: Template,
        activity: &str,
        options: &DiscoveryOptions,
        atoms: &mut Vec<ProcessAtom>,
    ) {
        let Some(a) = alphabet.code(activity) else {
            return;
        };
        let max_n = if template.supports_cardinality() {
            options.max_cardinality
        } else {
            1
        };
        for n in 1..=max_n {
            let stats =
                evaluate_instantiation(variants, template, a, None, n, options.consider_vacuity);
            if stats.num_satisfactions == 0 {
                continue;
            }
            if stats.support >= options.min_support {
                atoms.push(ProcessAtom::new(
                    template,
                    vec![activity.to_string()],
                    if template.supports_cardinality() { n } else { 0 },
                    stats.support,
                    stats.confidence,
                    ProvisionType::LogMined,
                    self.process.clone(),
                ));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn discover_binary(
        &self,
        variants: &EncodedVariants,
        alphabet: &ActivityAlphabet,
        template: Template,
        first: &str,
        second: &str,
        options: &DiscoveryOptions,
        atoms: &mut Vec<ProcessAtom>,
    ) {
        let (Some(a), Some(b)) = (alphabet.code(first), alphabet.code(second)) else {
            return;
        };
        let stats =
            evaluate_instantiation(variants, template, a, Some(b), 1, options.consider_vacuity);
        // a never-activated constraint carries no information about the log
        if (options.consider_vacuity && stats.num_activations == 0)
            || stats.num_satisfactions == 0
        {
            return;
        }
        if stats.support >= options.min_support {
            atoms.push(ProcessAtom::new(
                template,
                vec![first.to_string(), second.to_string()],
                0,
                stats.support,
                stats.confidence,
                ProvisionType::LogMined,
                self.process.clone(),
            ));
        }
    }

    ///
    /// Discover atoms using the general evaluator (the direct path)
    ///
    /// Semantically equivalent to [`LogMiner::mine`]; mostly useful for
    /// cross-checking the bulk path and for constraints with conditions.
    ///
    pub fn mine_direct(
        &self,
        options: &DiscoveryOptions,
    ) -> Result<Vec<ProcessAtom>, ConfigurationError> {
        options.validate()?;
        let itemsets = frequent_itemsets(self.log, options.min_support, 2)?;
        let templates = options.templates();
        let mut atoms = Vec::new();
        for itemset in &itemsets {
            for template in &templates {
                match (itemset.items.as_slice(), template.is_binary()) {
                    ([single], false) => {
                        let max_n = if template.supports_cardinality() {
                            options.max_cardinality
                        } else {
                            1
                        };
                        for n in 1..=max_n {
                            let constraint =
                                Constraint::new(*template, vec![single.clone()]).with_cardinality(n);
                            self.evaluate_direct(&constraint, options, &mut atoms);
                        }
                    }
                    ([first, second], true) if first != second => {
                        for (x, y) in [(first, second), (second, first)] {
                            let constraint =
                                Constraint::new(*template, vec![x.clone(), y.clone()]);
                            self.evaluate_direct(&constraint, options, &mut atoms);
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(atoms)
    }

    fn evaluate_direct(
        &self,
        constraint: &Constraint,
        options: &DiscoveryOptions,
        atoms: &mut Vec<ProcessAtom>,
    ) {
        // condition-free constraints always compile
        let Ok(compiled) = CompiledConstraint::compile(constraint) else {
            return;
        };
        let mut satisfied_weight = 0_u64;
        let mut activated_weight = 0_u64;
        let mut satisfied_and_activated = 0_u64;
        for variant in &self.log.variants {
            let result = compiled.check(&variant.activities, true, options.consider_vacuity);
            // checkers without activation counts fall back to operand presence
            let activated = match result.num_activations {
                Some(n) => n > 0,
                None => {
                    let ops = constraint.template.activation_operands();
                    ops.is_empty()
                        || ops.iter().any(|&i| {
                            constraint
                                .activities
                                .get(i)
                                .is_some_and(|op| variant.activities.contains(op))
                        })
                }
            };
            let weight = variant.frequency();
            if activated {
                activated_weight += weight;
                if result.is_satisfied() {
                    satisfied_and_activated += weight;
                }
            }
            if result.is_satisfied() {
                satisfied_weight += weight;
            }
        }
        if satisfied_weight == 0 {
            return;
        }
        let support = if self.log.total_cases > 0 {
            satisfied_weight as f64 / self.log.total_cases as f64
        } else {
            0.0
        };
        let confidence = if activated_weight > 0 {
            satisfied_and_activated as f64 / activated_weight as f64
        } else {
            0.0
        };
        if support >= options.min_support {
            atoms.push(ProcessAtom::new(
                constraint.template,
                constraint.activities.clone(),
                if constraint.template.supports_cardinality() {
                    constraint.cardinality
                } else {
                    0
                },
                support,
                confidence,
                ProvisionType::LogMined,
                self.process.clone(),
            ));
        }
    }
}

///
/// A query-checking request: find template instantiations holding in the log
///
/// At least one of template, activation and target must be given; the open
/// slots are enumerated over the log's activities.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintQuery {
    /// Restrict the query to one template
    pub template: Option<Template>,
    /// Fix the activation activity
    pub activation: Option<String>,
    /// Fix the target activity
    pub target: Option<String>,
    /// Minimum support a queried constraint needs to be returned
    pub min_support: f64,
    /// Whether vacuously satisfied variants count as satisfied
    pub consider_vacuity: bool,
    /// Maximum cardinality tried for Existence/Absence/Exactly
    pub max_cardinality: u32,
    /// Return only the first constraint reaching the minimum support
    pub return_first: bool,
}

impl Default for ConstraintQuery {
    fn default() -> Self {
        ConstraintQuery {
            template: None,
            activation: None,
            target: None,
            min_support: 1.0,
            consider_vacuity: true,
            max_cardinality: 1,
            return_first: false,
        }
    }
}

impl<'a> LogMiner<'a> {
    ///
    /// Query checking: enumerate instantiations matching the query and return
    /// those whose support reaches the threshold
    ///
    /// Per constraint, evaluation walks the variants with two early exits: it
    /// stops as soon as the threshold is reached, and gives up as soon as the
    /// remaining variants can no longer reach it.
    ///
    pub fn query_checking(
        &self,
        query: &ConstraintQuery,
    ) -> Result<Vec<Constraint>, ConfigurationError> {
        if !(0.0..=1.0).contains(&query.min_support) {
            return Err(ConfigurationError::SupportOutOfRange(query.min_support));
        }
        if query.max_cardinality == 0 {
            return Err(ConfigurationError::NonPositiveCardinality);
        }
        if query.template.is_none() && query.activation.is_none() && query.target.is_none() {
            return Err(ConfigurationError::InvalidQuery(
                "set at least one of template, activation and target",
            ));
        }
        if let Some(template) = query.template {
            if !template.is_binary() && query.target.is_some() {
                return Err(ConfigurationError::InvalidQuery(
                    "unary templates take no target activity",
                ));
            }
        }

        let templates: Vec<Template> = match query.template {
            Some(template) => vec![template],
            None => {
                let mut templates: Vec<Template> = Template::binary_templates().collect();
                if query.target.is_none() {
                    templates.extend(Template::unary_templates());
                }
                templates
            }
        };
        let activities = self.log.unique_activities();
        let activations: Vec<String> = match &query.activation {
            Some(act) => vec![act.clone()],
            None => activities.clone(),
        };
        let targets: Vec<String> = match &query.target {
            Some(tgt) => vec![tgt.clone()],
            None => activities,
        };

        let mut results = Vec::new();
        for template in templates {
            if template.is_binary() {
                for activation in &activations {
                    for target in &targets {
                        if activation == target {
                            continue;
                        }
                        let constraint = Constraint::new(
                            template,
                            vec![activation.clone(), target.clone()],
                        );
                        if self.query_constraint_holds(&constraint, query) {
                            results.push(constraint);
                            if query.return_first {
                                return Ok(results);
                            }
                        }
                    }
                }
            } else {
                let max_n = if template.supports_cardinality() {
                    query.max_cardinality
                } else {
                    1
                };
                for activation in &activations {
                    for n in 1..=max_n {
                        let constraint = Constraint::new(template, vec![activation.clone()])
                            .with_cardinality(n);
                        if self.query_constraint_holds(&constraint, query) {
                            results.push(constraint);
                            if query.return_first {
                                return Ok(results);
                            }
                        }
                    }
                }
            }
        }
        Ok(results)
    }

    fn query_constraint_holds(&self, constraint: &Constraint, query: &ConstraintQuery) -> bool {
        let Ok(compiled) = CompiledConstraint::compile(constraint) else {
            return false;
        };
        let total = self.log.total_cases;
        if total == 0 {
            return false;
        }
        let required = (total as f64 * query.min_support).ceil() as u64;
        let mut satisfied = 0_u64;
        let mut remaining = total;
        for variant in &self.log.variants {
            let weight = variant.frequency();
            remaining = remaining.saturating_sub(weight);
            let result = compiled.check(&variant.activities, true, query.consider_vacuity);
            if result.is_satisfied() {
                satisfied += weight;
                if satisfied as f64 / total as f64 >= query.min_support {
                    return true;
                }
            }
            // the remaining variants can no longer lift support over the bar
            if satisfied + remaining < required {
                return false;
            }
        }
        false
    }
}

///
/// Check a set of atoms against a log, returning one [`Violation`] record per atom
///
/// Atom operands missing from the log are included in the letter mapping so
/// constraints over unseen activities still evaluate (typically vacuously).
///
pub fn check_atom_violations(
    process: &str,
    log: &VariantLog,
    atoms: &[ProcessAtom],
    consider_vacuity: bool,
) -> Vec<Violation> {
    let mut activities = log.unique_activities();
    for atom in atoms {
        for op in &atom.operands {
            if !activities.contains(op) {
                activities.push(op.clone());
            }
        }
    }
    let alphabet = ActivityAlphabet::new(&activities);
    let encoded: Vec<String> = log
        .variants
        .iter()
        .map(|v| alphabet.encode(&v.activities))
        .collect();

    atoms
        .iter()
        .map(|atom| {
            let a = atom.operands.first().and_then(|op| alphabet.code(op));
            let b = atom.operands.get(1).and_then(|op| alphabet.code(op));
            let n = if atom.atom_type.supports_cardinality() {
                atom.cardinality
            } else {
                1
            };
            let mut cases: Vec<String> = Vec::new();
            if let Some(a) = a {
                let regex = compile_template(atom.atom_type, a, b, n);
                for (variant, encoded) in log.variants.iter().zip(&encoded) {
                    let satisfied = regex.is_match(encoded)
                        && (consider_vacuity || is_activated(atom.atom_type, a, b, encoded));
                    if !satisfied {
                        cases.extend(variant.cases.iter().cloned());
                    }
                }
            }
            Violation {
                id: Uuid::new_v4(),
                log: process.to_string(),
                atom: atom.clone(),
                frequency: cases.len(),
                cases,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::variant_log::TraceVariant;

    fn variant(acts: &[&str], cases: &[&str]) -> TraceVariant {
        TraceVariant {
            activities: acts.iter().map(|s| s.to_string()).collect(),
            cases: cases.iter().map(|s| s.to_string()).collect(),
            average_duration_secs: 0.0,
        }
    }

    fn log() -> VariantLog {
        VariantLog {
            variants: vec![
                variant(&["A", "B"], &["c1", "c2", "c3"]),
                variant(&["A", "C", "B"], &["c4"]),
                variant(&["B"], &["c5"]),
            ],
            total_cases: 5,
        }
    }

    #[test]
    fn mines_response_with_full_support() {
        let log = log();
        let miner = LogMiner::new("p", &log);
        let options = DiscoveryOptions {
            min_support: 0.7,
            considered_templates: Some(vec![Template::Response]),
            ..DiscoveryOptions::default()
        };
        let atoms = miner.mine(&options).unwrap();
        // Response[A, B] holds in all five cases (vacuously in the B-only one)
        assert!(atoms
            .iter()
            .any(|a| a.atom_type == Template::Response
                && a.operands == vec!["A".to_string(), "B".to_string()]
                && (a.support - 1.0).abs() < 1e-9));
        // Response[B, A] fails for the majority of cases
        assert!(!atoms
            .iter()
            .any(|a| a.operands == vec!["B".to_string(), "A".to_string()]));
    }

    #[test]
    fn direct_and_regex_paths_agree() {
        let log = log();
        let miner = LogMiner::new("p", &log);
        let options = DiscoveryOptions {
            min_support: 0.5,
            max_cardinality: 2,
            ..DiscoveryOptions::default()
        };
        let mut via_regex: Vec<(Template, Vec<String>, u32, String)> = miner
            .mine(&options)
            .unwrap()
            .into_iter()
            .map(|a| (a.atom_type, a.operands, a.cardinality, format!("{:.6}", a.support)))
            .collect();
        let mut via_general: Vec<(Template, Vec<String>, u32, String)> = miner
            .mine_direct(&options)
            .unwrap()
            .into_iter()
            .map(|a| (a.atom_type, a.operands, a.cardinality, format!("{:.6}", a.support)))
            .collect();
        via_regex.sort();
        via_general.sort();
        // the regex path additionally prunes never-activated and
        // never-satisfied instantiations, which the direct path prunes too;
        // the remaining sets must line up exactly on support
        assert_eq!(via_regex, via_general);
    }

    #[test]
    fn violations_are_reported_per_atom() {
        let log = log();
        let atom = ProcessAtom::new(
            Template::Response,
            vec!["A".into(), "B".into()],
            0,
            1.0,
            1.0,
            ProvisionType::LogMined,
            "p".into(),
        );
        let violations = check_atom_violations("p", &log, &[atom], true);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].cases.is_empty());

        let atom = ProcessAtom::new(
            Template::Response,
            vec!["B".into(), "A".into()],
            0,
            1.0,
            1.0,
            ProvisionType::LogMined,
            "p".into(),
        );
        let violations = check_atom_violations("p", &log, &[atom], true);
        // every case contains a B that is never followed by an A
        assert_eq!(violations[0].frequency, 5);
    }

    #[test]
    fn query_checking_enumerates_matching_constraints() {
        let log = log();
        let miner = LogMiner::new("p", &log);
        let query = ConstraintQuery {
            template: Some(Template::Response),
            activation: Some("A".into()),
            min_support: 1.0,
            ..ConstraintQuery::default()
        };
        let results = miner.query_checking(&query).unwrap();
        // with A fixed, only Response[A, B] holds in every case
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].activities,
            vec!["A".to_string(), "B".to_string()]
        );

        let query = ConstraintQuery {
            template: Some(Template::Response),
            activation: Some("A".into()),
            min_support: 1.0,
            return_first: true,
            ..ConstraintQuery::default()
        };
        assert_eq!(miner.query_checking(&query).unwrap().len(), 1);
    }

    #[test]
    fn underspecified_queries_are_rejected() {
        let log = log();
        let miner = LogMiner::new("p", &log);
        assert!(matches!(
            miner.query_checking(&ConstraintQuery::default()),
            Err(ConfigurationError::InvalidQuery(_))
        ));
        // unary template with a target makes no sense
        let query = ConstraintQuery {
            template: Some(Template::Existence),
            target: Some("A".into()),
            ..ConstraintQuery::default()
        };
        assert!(matches!(
            miner.query_checking(&query),
            Err(ConfigurationError::InvalidQuery(_))
        ));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let log = log();
        let miner = LogMiner::new("p", &log);
        let options = DiscoveryOptions {
            min_support: 2.0,
            ..DiscoveryOptions::default()
        };
        assert!(miner.mine(&options).is_err());
        let options = DiscoveryOptions {
            max_cardinality: 0,
            ..DiscoveryOptions::default()
        };
        assert!(miner.mine(&options).is_err());
    }
}
