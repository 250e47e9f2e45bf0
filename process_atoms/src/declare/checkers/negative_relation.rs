//! Checkers for the negative relation templates: a fulfilled correlation of the
//! positive counterpart counts as a violation here, and vice versa.

use crate::declare::checker_result::{relation_state, CheckerResult};

use super::rules::CheckRules;

fn result(
    is_trace_complete: bool,
    rules: &CheckRules<'_>,
    num_activations: usize,
    num_fulfillments: usize,
    num_violations: usize,
    num_pendings: usize,
) -> CheckerResult {
    CheckerResult {
        num_fulfillments: Some(num_fulfillments),
        num_violations: Some(num_violations),
        num_pendings: Some(num_pendings),
        num_activations: Some(num_activations),
        state: relation_state(
            is_trace_complete,
            rules.vacuous_satisfaction,
            num_activations,
            num_violations,
        ),
    }
}

/// Not Responded Existence(a, b): if `a` occurs, no `b` may occur anywhere
///
/// Also the checker behind Not Co-Existence, which shares the satisfied set
/// (the constraints differ only in what counts as an activation).
pub fn not_responded_existence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut pendings: Vec<&str> = trace
        .iter()
        .filter(|e| e.as_str() == a && rules.activation_holds(e))
        .map(|e| e.as_str())
        .collect();
    let mut num_violations = 0;
    for event in trace {
        if pendings.is_empty() {
            break;
        }
        if event == b {
            pendings.retain(|activation| {
                if rules.correlation_holds(activation, event) {
                    num_violations += 1;
                    false
                } else {
                    true
                }
            });
        }
    }
    let (num_fulfillments, num_pendings) = if is_trace_complete {
        (pendings.len(), 0)
    } else {
        (0, pendings.len())
    };
    let num_activations = num_fulfillments + num_violations + num_pendings;
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        num_pendings,
    )
}

/// Not Co-Existence(a, b): `a` and `b` never occur in the same trace
///
/// Shares the violation logic of [`not_responded_existence`], but either
/// operand activates the constraint, which matters when vacuous satisfaction
/// is disallowed.
pub fn not_co_existence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let inner = not_responded_existence(trace, is_trace_complete, a, b, rules);
    let num_b = trace
        .iter()
        .filter(|e| e.as_str() == b && rules.activation_holds(e))
        .count();
    let num_activations = inner.num_activations.unwrap_or(0) + num_b;
    let num_violations = inner.num_violations.unwrap_or(0);
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_activations - num_violations - inner.num_pendings.unwrap_or(0),
        num_violations,
        inner.num_pendings.unwrap_or(0),
    )
}

/// Not Response(a, b): after an `a`, no `b` may occur
pub fn not_response(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut pendings: Vec<&str> = Vec::new();
    let mut num_violations = 0;
    for event in trace {
        if event == a && rules.activation_holds(event) {
            pendings.push(event.as_str());
        }
        if event == b && !pendings.is_empty() {
            pendings.retain(|activation| {
                if rules.correlation_holds(activation, event) {
                    num_violations += 1;
                    false
                } else {
                    true
                }
            });
        }
    }
    let (num_fulfillments, num_pendings) = if is_trace_complete {
        (pendings.len(), 0)
    } else {
        (0, pendings.len())
    };
    let num_activations = num_fulfillments + num_violations + num_pendings;
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        num_pendings,
    )
}

/// Not Chain Response(a, b): no `a` may be immediately followed by a `b`
pub fn not_chain_response(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_violations = 0;
    let mut num_pendings = 0;
    for (index, event) in trace.iter().enumerate() {
        if event == a && rules.activation_holds(event) {
            num_activations += 1;
            match trace.get(index + 1) {
                Some(next) => {
                    if next == b && rules.correlation_holds(event, next) {
                        num_violations += 1;
                    }
                }
                None => {
                    if !is_trace_complete {
                        num_pendings = 1;
                    }
                }
            }
        }
    }
    let num_fulfillments = num_activations - num_violations - num_pendings;
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        num_pendings,
    )
}

/// Not Precedence(a, b): no `a` may occur before a `b`
pub fn not_precedence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_violations = 0;
    let mut preceding: Vec<&str> = Vec::new();
    for event in trace {
        if event == a {
            preceding.push(event.as_str());
        }
        if event == b && rules.activation_holds(event) {
            num_activations += 1;
            if preceding
                .iter()
                .any(|target| rules.correlation_holds(event, target))
            {
                num_violations += 1;
            }
        }
    }
    let num_fulfillments = num_activations - num_violations;
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        0,
    )
}

/// Not Chain Precedence(a, b): no `a` may occur immediately before a `b`
pub fn not_chain_precedence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_violations = 0;
    for (index, event) in trace.iter().enumerate() {
        if event == b && rules.activation_holds(event) {
            num_activations += 1;
            if index > 0 {
                let previous = &trace[index - 1];
                if previous == a && rules.correlation_holds(event, previous) {
                    num_violations += 1;
                }
            }
        }
    }
    let num_fulfillments = num_activations - num_violations;
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::checker_result::TraceState;

    fn trace(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn not_response_forbids_following_b() {
        let rules = CheckRules::trivial();
        assert_eq!(
            not_response(&trace(&["A", "C", "B"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
        // b before a is fine
        assert_eq!(
            not_response(&trace(&["B", "A"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
    }

    #[test]
    fn not_chain_variants_forbid_adjacency_only() {
        let rules = CheckRules::trivial();
        assert_eq!(
            not_chain_response(&trace(&["A", "B"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
        assert_eq!(
            not_chain_response(&trace(&["A", "C", "B"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
        assert_eq!(
            not_chain_precedence(&trace(&["A", "B"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
        assert_eq!(
            not_chain_precedence(&trace(&["B", "A"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
    }

    #[test]
    fn not_precedence_forbids_earlier_a() {
        let rules = CheckRules::trivial();
        assert_eq!(
            not_precedence(&trace(&["A", "C", "B"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
        assert_eq!(
            not_precedence(&trace(&["B", "A"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
    }

    #[test]
    fn not_responded_existence_forbids_co_occurrence() {
        let rules = CheckRules::trivial();
        assert_eq!(
            not_responded_existence(&trace(&["B", "A"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
        assert_eq!(
            not_responded_existence(&trace(&["A", "A"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
    }

    #[test]
    fn not_co_existence_activates_on_either_operand() {
        let strict = CheckRules {
            vacuous_satisfaction: false,
            ..CheckRules::trivial()
        };
        // only b occurs: activated (and satisfied) for NotCoExistence...
        assert_eq!(
            not_co_existence(&trace(&["B"]), true, "A", "B", &strict).state,
            TraceState::Satisfied
        );
        // ...but vacuously violated for NotRespondedExistence
        assert_eq!(
            not_responded_existence(&trace(&["B"]), true, "A", "B", &strict).state,
            TraceState::Violated
        );
    }
}
