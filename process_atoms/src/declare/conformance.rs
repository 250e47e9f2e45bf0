//! Constraint models and trace/log conformance checking with the general
//! (semantic) evaluator.

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event_log::variant_log::VariantLog;

use super::checker_result::{relation_state, CheckerResult, TraceState};
use super::checkers::choice::{choice, co_existence, exclusive_choice};
use super::checkers::existence::{absence, end, exactly, existence, init};
use super::checkers::negative_relation::{
    not_chain_precedence, not_chain_response, not_co_existence, not_precedence,
    not_responded_existence, not_response,
};
use super::checkers::relation::{
    alternate_precedence, alternate_response, chain_precedence, chain_response, precedence,
    responded_existence, response,
};
use super::checkers::rules::CheckRules;
use super::condition::{Condition, ConditionSyntaxError};
use super::templates::Template;

///
/// Invalid parameters, rejected eagerly before any computation begins
///
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A support threshold outside of `[0, 1]`
    SupportOutOfRange(f64),
    /// A cardinality bound that is not positive
    NonPositiveCardinality,
    /// A constraint whose operand count does not match its template
    ArityMismatch {
        /// The template of the offending constraint
        template: Template,
        /// Expected operand count
        expected: usize,
        /// Actual operand count
        got: usize,
    },
    /// A constraint query that cannot be answered as posed
    InvalidQuery(&'static str),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::SupportOutOfRange(s) => {
                write!(f, "min. support must be in range [0, 1], got {s}")
            }
            ConfigurationError::NonPositiveCardinality => {
                write!(f, "cardinality must be greater than 0")
            }
            ConfigurationError::ArityMismatch {
                template,
                expected,
                got,
            } => write!(
                f,
                "template {template} takes {expected} operand(s), got {got}"
            ),
            ConfigurationError::InvalidQuery(reason) => write!(f, "invalid query: {reason}"),
        }
    }
}

impl Error for ConfigurationError {}

///
/// A single constraint instance: template, operand activities and optional
/// user-supplied conditions
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// The template of this constraint
    pub template: Template,
    /// Operand activities (one for unary, two for binary templates)
    pub activities: Vec<String>,
    /// Cardinality bound for Existence/Absence/Exactly
    pub cardinality: u32,
    /// Activation condition (empty for none)
    pub activation_condition: String,
    /// Correlation condition (empty for none)
    pub correlation_condition: String,
    /// Time condition (empty for none)
    pub time_condition: String,
}

impl Constraint {
    /// Create a condition-free constraint
    pub fn new<S: Into<String>>(template: Template, activities: Vec<S>) -> Self {
        Constraint {
            template,
            activities: activities.into_iter().map(|a| a.into()).collect(),
            cardinality: 1,
            activation_condition: String::new(),
            correlation_condition: String::new(),
            time_condition: String::new(),
        }
    }

    /// Set the cardinality bound
    pub fn with_cardinality(mut self, n: u32) -> Self {
        self.cardinality = n;
        self
    }

    /// Expected operand count of this constraint's template
    pub fn expected_arity(&self) -> usize {
        if self.template.is_binary() {
            2
        } else {
            1
        }
    }

    /// Canonical string form, e.g. `Existence2[A] | |` or `Response[A, B] | | |`
    pub fn constraint_string(&self) -> String {
        let name = self.template.name();
        let ops = self.activities.join(", ");
        if self.template.is_binary() {
            format!(
                "{name}[{ops}] |{}|{}|{}",
                self.activation_condition, self.correlation_condition, self.time_condition
            )
        } else if self.template.supports_cardinality() {
            format!(
                "{name}{}[{ops}] |{}|{}",
                self.cardinality, self.activation_condition, self.time_condition
            )
        } else {
            format!(
                "{name}[{ops}] |{}|{}",
                self.activation_condition, self.time_condition
            )
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint_string())
    }
}

///
/// A set of constraints to check together
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclareModel {
    /// The constraints of the model
    pub constraints: Vec<Constraint>,
}

impl DeclareModel {
    /// Create a model from constraints
    pub fn new(constraints: Vec<Constraint>) -> Self {
        DeclareModel { constraints }
    }

    /// Eagerly validate arity and cardinality of every constraint
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for c in &self.constraints {
            let expected = c.expected_arity();
            if c.activities.len() != expected {
                return Err(ConfigurationError::ArityMismatch {
                    template: c.template,
                    expected,
                    got: c.activities.len(),
                });
            }
            if c.template.supports_cardinality() && c.cardinality == 0 {
                return Err(ConfigurationError::NonPositiveCardinality);
            }
        }
        Ok(())
    }
}

///
/// Accumulator for condition syntax errors encountered during checking
///
/// Each offending constraint is reported once per accumulator, and the
/// constraint is skipped without aborting the checking of others. Passing the
/// accumulator explicitly keeps repeated calls independent.
///
#[derive(Debug, Default)]
pub struct ConditionErrors {
    seen: BTreeSet<String>,
}

impl ConditionErrors {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a constraint, printing it on first sight only
    pub fn record(&mut self, constraint: &str, error: &ConditionSyntaxError) {
        if self.seen.insert(constraint.to_string()) {
            eprintln!("Condition not properly formatted for constraint \"{constraint}\": {error}");
        }
    }

    /// The distinct offending constraint strings seen so far
    pub fn distinct(&self) -> impl Iterator<Item = &String> {
        self.seen.iter()
    }

    /// Whether no error was recorded
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

///
/// A constraint with its conditions parsed once, ready for repeated evaluation
///
#[derive(Debug, Clone)]
pub struct CompiledConstraint {
    constraint: Constraint,
    activation: Condition,
    correlation: Condition,
    time: Condition,
}

impl CompiledConstraint {
    /// Parse the conditions of a constraint
    pub fn compile(constraint: &Constraint) -> Result<Self, ConditionSyntaxError> {
        Ok(CompiledConstraint {
            constraint: constraint.clone(),
            activation: Condition::parse(&constraint.activation_condition)?,
            correlation: Condition::parse(&constraint.correlation_condition)?,
            time: Condition::parse(&constraint.time_condition)?,
        })
    }

    /// The underlying constraint
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Check this constraint against a single trace
    ///
    /// `consider_vacuity` decides whether a never-activated constraint counts
    /// as satisfied. Evaluating the same (trace, constraint) pair twice always
    /// yields identical results.
    pub fn check(
        &self,
        trace: &[String],
        is_trace_complete: bool,
        consider_vacuity: bool,
    ) -> CheckerResult {
        let rules = CheckRules {
            activation: &self.activation,
            correlation: &self.correlation,
            time: &self.time,
            vacuous_satisfaction: consider_vacuity,
        };
        let a = self.constraint.activities[0].as_str();
        let n = self.constraint.cardinality;
        let done = is_trace_complete;
        match self.constraint.template {
            Template::Existence => existence(trace, done, a, n, &rules),
            Template::Absence => absence(trace, done, a, n, &rules),
            Template::Exactly => exactly(trace, done, a, n, &rules),
            Template::Init => init(trace, done, a, &rules),
            Template::End => end(trace, done, a, &rules),
            binary => {
                let b = self.constraint.activities[1].as_str();
                match binary {
                    Template::Choice => choice(trace, done, a, b, &rules),
                    Template::ExclusiveChoice => exclusive_choice(trace, done, a, b, &rules),
                    Template::RespondedExistence => responded_existence(trace, done, a, b, &rules),
                    Template::Response => response(trace, done, a, b, &rules),
                    Template::AlternateResponse => alternate_response(trace, done, a, b, &rules),
                    Template::ChainResponse => chain_response(trace, done, a, b, &rules),
                    Template::Precedence => precedence(trace, done, a, b, &rules),
                    Template::AlternatePrecedence => {
                        alternate_precedence(trace, done, a, b, &rules)
                    }
                    Template::ChainPrecedence => chain_precedence(trace, done, a, b, &rules),
                    Template::CoExistence => co_existence(trace, done, a, b, &rules),
                    Template::Succession => combine(
                        response(trace, done, a, b, &rules),
                        precedence(trace, done, a, b, &rules),
                        done,
                    ),
                    Template::AlternateSuccession => combine(
                        alternate_response(trace, done, a, b, &rules),
                        alternate_precedence(trace, done, a, b, &rules),
                        done,
                    ),
                    Template::ChainSuccession => combine(
                        chain_response(trace, done, a, b, &rules),
                        chain_precedence(trace, done, a, b, &rules),
                        done,
                    ),
                    Template::NotCoExistence => not_co_existence(trace, done, a, b, &rules),
                    Template::NotRespondedExistence => {
                        not_responded_existence(trace, done, a, b, &rules)
                    }
                    Template::NotResponse => not_response(trace, done, a, b, &rules),
                    Template::NotChainResponse => not_chain_response(trace, done, a, b, &rules),
                    Template::NotPrecedence => not_precedence(trace, done, a, b, &rules),
                    Template::NotChainPrecedence => {
                        not_chain_precedence(trace, done, a, b, &rules)
                    }
                    Template::NotSuccession | Template::NotAlternateSuccession => {
                        combine_negative(
                            not_response(trace, done, a, b, &rules),
                            not_precedence(trace, done, a, b, &rules),
                            done,
                            consider_vacuity,
                        )
                    }
                    Template::NotChainSuccession => combine_negative(
                        not_chain_response(trace, done, a, b, &rules),
                        not_chain_precedence(trace, done, a, b, &rules),
                        done,
                        consider_vacuity,
                    ),
                    // unary templates are handled above
                    Template::Existence
                    | Template::Absence
                    | Template::Exactly
                    | Template::Init
                    | Template::End => unreachable!(),
                }
            }
        }
    }
}

/// Combine the response- and precedence-half results of a succession-style
/// template: the constraint holds iff both halves hold. Counts are carried
/// over from the response half.
fn combine(
    response_half: CheckerResult,
    precedence_half: CheckerResult,
    is_trace_complete: bool,
) -> CheckerResult {
    let state = if response_half.state == TraceState::Violated
        || precedence_half.state == TraceState::Violated
    {
        TraceState::Violated
    } else if is_trace_complete {
        TraceState::Satisfied
    } else if response_half.state == TraceState::PossiblyViolated
        || precedence_half.state == TraceState::PossiblyViolated
    {
        TraceState::PossiblyViolated
    } else {
        TraceState::PossiblySatisfied
    };
    CheckerResult {
        num_fulfillments: response_half.num_fulfillments,
        num_violations: response_half.num_violations,
        num_pendings: None,
        num_activations: response_half.num_activations,
        state,
    }
}

/// Combine the halves of a negated succession-style template.
///
/// Unlike the positive family, the halves' own vacuity verdicts are discarded:
/// an occurrence of either operand activates the combined constraint, so the
/// verdict is derived from the pooled activation and violation counts.
fn combine_negative(
    response_half: CheckerResult,
    precedence_half: CheckerResult,
    is_trace_complete: bool,
    consider_vacuity: bool,
) -> CheckerResult {
    let num_activations = response_half.num_activations.unwrap_or(0)
        + precedence_half.num_activations.unwrap_or(0);
    let num_violations =
        response_half.num_violations.unwrap_or(0) + precedence_half.num_violations.unwrap_or(0);
    CheckerResult {
        num_fulfillments: response_half.num_fulfillments,
        num_violations: Some(num_violations),
        num_pendings: None,
        num_activations: Some(num_activations),
        state: relation_state(
            is_trace_complete,
            consider_vacuity,
            num_activations,
            num_violations,
        ),
    }
}

///
/// Check all constraints of a model against one trace
///
/// Returns the per-constraint results keyed by constraint string. Constraints
/// with malformed conditions are recorded in `errors` and skipped; they do not
/// abort the checking of other constraints.
///
pub fn check_trace_conformance(
    trace: &[String],
    model: &DeclareModel,
    consider_vacuity: bool,
    errors: &mut ConditionErrors,
) -> BTreeMap<String, CheckerResult> {
    let mut results = BTreeMap::new();
    for constraint in &model.constraints {
        let constraint_str = constraint.constraint_string();
        match CompiledConstraint::compile(constraint) {
            Ok(compiled) => {
                results.insert(constraint_str, compiled.check(trace, true, consider_vacuity));
            }
            Err(e) => errors.record(&constraint_str, &e),
        }
    }
    results
}

///
/// Result of checking a model against a whole log
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Per case: the constraint strings violated by that case's trace
    pub violations_by_case: BTreeMap<String, BTreeSet<String>>,
    /// Distinct constraint strings skipped due to malformed conditions
    pub condition_errors: Vec<String>,
}

///
/// Check a model against every distinct trace variant of a log
///
/// Verdicts are computed once per variant and broadcast to all cases sharing
/// it. Invalid constraint parameters are rejected before any computation.
///
pub fn conformance_checking(
    log: &VariantLog,
    model: &DeclareModel,
    consider_vacuity: bool,
) -> Result<ConformanceReport, ConfigurationError> {
    model.validate()?;
    let mut errors = ConditionErrors::new();
    let mut violations_by_case: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for variant in &log.variants {
        let results = check_trace_conformance(
            &variant.activities,
            model,
            consider_vacuity,
            &mut errors,
        );
        let violated: BTreeSet<String> = results
            .into_iter()
            .filter(|(_, res)| res.is_violated())
            .map(|(constraint, _)| constraint)
            .collect();
        for case in &variant.cases {
            violations_by_case.insert(case.clone(), violated.clone());
        }
    }
    Ok(ConformanceReport {
        violations_by_case,
        condition_errors: errors.distinct().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn check(template: Template, activities: &[&str], t: &[&str]) -> TraceState {
        let constraint = Constraint::new(template, activities.to_vec());
        let compiled = CompiledConstraint::compile(&constraint).unwrap();
        compiled.check(&trace(t), true, true).state
    }

    #[test]
    fn succession_is_conjunction() {
        assert_eq!(
            check(Template::Succession, &["A", "B"], &["A", "B"]),
            TraceState::Satisfied
        );
        // fails the precedence half
        assert_eq!(
            check(Template::Succession, &["A", "B"], &["B", "A"]),
            TraceState::Violated
        );
        assert_eq!(
            check(Template::ChainSuccession, &["A", "B"], &["A", "B"]),
            TraceState::Satisfied
        );
        assert_eq!(
            check(Template::ChainSuccession, &["A", "B"], &["A", "C", "B"]),
            TraceState::Violated
        );
    }

    #[test]
    fn malformed_conditions_skip_only_that_constraint() {
        let mut bad = Constraint::new(Template::Response, vec!["A", "B"]);
        bad.activation_condition = "A == ".to_string();
        let good = Constraint::new(Template::Response, vec!["A", "B"]);
        let model = DeclareModel::new(vec![bad, good.clone()]);

        let mut errors = ConditionErrors::new();
        let results = check_trace_conformance(&trace(&["A", "B"]), &model, true, &mut errors);
        assert_eq!(results.len(), 1);
        assert!(results.contains_key(&good.constraint_string()));
        assert_eq!(errors.distinct().count(), 1);

        // the same constraint is only reported once
        check_trace_conformance(&trace(&["A"]), &model, true, &mut errors);
        assert_eq!(errors.distinct().count(), 1);
    }

    #[test]
    fn conformance_broadcasts_to_cases() {
        use crate::event_log::variant_log::TraceVariant;
        let log = VariantLog {
            variants: vec![
                TraceVariant {
                    activities: trace(&["A", "B"]),
                    cases: vec!["c1".into(), "c2".into()],
                    average_duration_secs: 0.0,
                },
                TraceVariant {
                    activities: trace(&["A", "C"]),
                    cases: vec!["c3".into()],
                    average_duration_secs: 0.0,
                },
            ],
            total_cases: 3,
        };
        let model = DeclareModel::new(vec![Constraint::new(Template::Response, vec!["A", "B"])]);
        let report = conformance_checking(&log, &model, true).unwrap();
        assert!(report.violations_by_case["c1"].is_empty());
        assert!(report.violations_by_case["c2"].is_empty());
        assert_eq!(report.violations_by_case["c3"].len(), 1);
        assert!(report.condition_errors.is_empty());
    }

    #[test]
    fn invalid_parameters_are_rejected_eagerly() {
        let model = DeclareModel::new(vec![Constraint::new(Template::Response, vec!["A"])]);
        assert!(matches!(
            model.validate(),
            Err(ConfigurationError::ArityMismatch { .. })
        ));
        let model = DeclareModel::new(vec![
            Constraint::new(Template::Existence, vec!["A"]).with_cardinality(0)
        ]);
        assert_eq!(
            model.validate(),
            Err(ConfigurationError::NonPositiveCardinality)
        );
    }
}
