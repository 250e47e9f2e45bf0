//! Checkers for the unary templates: Existence, Absence, Exactly, Init and End.
//!
//! These carry their own state logic instead of the shared relation decision
//! table: the verdict follows directly from the activation count and the
//! cardinality bound.

use crate::declare::checker_result::{CheckerResult, TraceState};
use crate::declare::condition::ConditionEnv;

use super::rules::CheckRules;

/// Count occurrences of `a` satisfying the activation and time conditions
///
/// Conditions see the occurrence as `A` and the first event of the trace as `T`.
fn count_activations(trace: &[String], a: &str, rules: &CheckRules<'_>) -> usize {
    let first = trace.first().map(|s| s.as_str());
    trace
        .iter()
        .filter(|event| event.as_str() == a)
        .filter(|event| {
            let env = ConditionEnv {
                activation: event,
                target: first,
            };
            rules.activation.evaluate(&env) && rules.time.evaluate(&env)
        })
        .count()
}

/// Existence(n, a): `a` must occur at least `n` times
pub fn existence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    n: u32,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let num_activations = count_activations(trace, a, rules);
    let state = if num_activations >= n as usize {
        TraceState::Satisfied
    } else if is_trace_complete {
        TraceState::Violated
    } else {
        TraceState::PossiblyViolated
    };
    CheckerResult::of_state(state)
}

/// Absence(n, a): `a` must occur fewer than `n` times
pub fn absence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    n: u32,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let num_activations = count_activations(trace, a, rules);
    let state = if num_activations >= n as usize {
        TraceState::Violated
    } else if is_trace_complete {
        TraceState::Satisfied
    } else {
        TraceState::PossiblySatisfied
    };
    CheckerResult::of_state(state)
}

/// Exactly(n, a): `a` must occur exactly `n` times
pub fn exactly(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    n: u32,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let num_activations = count_activations(trace, a, rules);
    let n = n as usize;
    let state = if !is_trace_complete && num_activations < n {
        TraceState::PossiblyViolated
    } else if !is_trace_complete && num_activations == n {
        TraceState::PossiblySatisfied
    } else if num_activations > n || (is_trace_complete && num_activations < n) {
        TraceState::Violated
    } else {
        TraceState::Satisfied
    };
    CheckerResult::of_state(state)
}

/// Init(a): `a` must be the first event of the trace
pub fn init(trace: &[String], _is_trace_complete: bool, a: &str, rules: &CheckRules<'_>) -> CheckerResult {
    let state = match trace.first() {
        Some(event) if event == a && rules.activation_holds(event) => TraceState::Satisfied,
        _ => TraceState::Violated,
    };
    CheckerResult::of_state(state)
}

/// End(a): `a` must be the last event of the trace
pub fn end(trace: &[String], _is_trace_complete: bool, a: &str, rules: &CheckRules<'_>) -> CheckerResult {
    let state = match trace.last() {
        Some(event) if event == a && rules.activation_holds(event) => TraceState::Satisfied,
        _ => TraceState::Violated,
    };
    CheckerResult::of_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn existence_counts() {
        let rules = CheckRules::trivial();
        let t = trace(&["X", "Y", "X", "Z"]);
        assert_eq!(existence(&t, true, "X", 2, &rules).state, TraceState::Satisfied);
        let t = trace(&["X", "Y", "Z"]);
        assert_eq!(existence(&t, true, "X", 2, &rules).state, TraceState::Violated);
        // on an incomplete trace the count could still grow
        assert_eq!(
            existence(&t, false, "X", 2, &rules).state,
            TraceState::PossiblyViolated
        );
    }

    #[test]
    fn absence_and_exactly() {
        let rules = CheckRules::trivial();
        let t = trace(&["X", "Y", "X"]);
        assert_eq!(absence(&t, true, "X", 3, &rules).state, TraceState::Satisfied);
        assert_eq!(absence(&t, true, "X", 2, &rules).state, TraceState::Violated);
        assert_eq!(exactly(&t, true, "X", 2, &rules).state, TraceState::Satisfied);
        assert_eq!(exactly(&t, true, "X", 1, &rules).state, TraceState::Violated);
        assert_eq!(exactly(&t, true, "X", 3, &rules).state, TraceState::Violated);
    }

    #[test]
    fn init_and_end() {
        let rules = CheckRules::trivial();
        let t = trace(&["A", "B", "C"]);
        assert_eq!(init(&t, true, "A", &rules).state, TraceState::Satisfied);
        assert_eq!(init(&t, true, "B", &rules).state, TraceState::Violated);
        assert_eq!(end(&t, true, "C", &rules).state, TraceState::Satisfied);
        assert_eq!(end(&t, true, "A", &rules).state, TraceState::Violated);
        // empty traces violate both
        let empty = trace(&[]);
        assert_eq!(init(&empty, true, "A", &rules).state, TraceState::Violated);
        assert_eq!(end(&empty, true, "A", &rules).state, TraceState::Violated);
    }
}
