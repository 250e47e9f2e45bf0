//! Checkers for the order-free binary templates: Choice, Exclusive Choice and
//! Co-Existence.

use crate::declare::checker_result::{relation_state, CheckerResult, TraceState};

use super::rules::CheckRules;

/// Choice(a, b): `a` or `b` (or both) must occur
pub fn choice(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let occurs = trace
        .iter()
        .any(|e| (e == a || e == b) && rules.activation_holds(e));
    let state = if occurs {
        TraceState::Satisfied
    } else if is_trace_complete {
        TraceState::Violated
    } else {
        TraceState::PossiblyViolated
    };
    CheckerResult::of_state(state)
}

/// Exclusive Choice(a, b): exactly one of `a` and `b` must occur
pub fn exclusive_choice(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let a_occurs = trace.iter().any(|e| e == a && rules.activation_holds(e));
    let b_occurs = trace.iter().any(|e| e == b && rules.activation_holds(e));
    let state = match (a_occurs, b_occurs) {
        (true, true) => TraceState::Violated,
        (false, false) => {
            if is_trace_complete {
                TraceState::Violated
            } else {
                TraceState::PossiblyViolated
            }
        }
        _ => {
            if is_trace_complete {
                TraceState::Satisfied
            } else {
                TraceState::PossiblySatisfied
            }
        }
    };
    CheckerResult::of_state(state)
}

/// Co-Existence(a, b): `a` and `b` occur together or not at all
pub fn co_existence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let num_a = trace
        .iter()
        .filter(|e| e.as_str() == a && rules.activation_holds(e))
        .count();
    let num_b = trace
        .iter()
        .filter(|e| e.as_str() == b && rules.activation_holds(e))
        .count();
    let num_activations = num_a + num_b;

    // occurrences of the partner-less activity are unfulfilled activations
    let unmatched = match (num_a > 0, num_b > 0) {
        (true, false) => num_a,
        (false, true) => num_b,
        _ => 0,
    };
    let (num_violations, num_pendings) = if is_trace_complete {
        (unmatched, 0)
    } else {
        (0, unmatched)
    };
    let num_fulfillments = num_activations - num_violations - num_pendings;

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
