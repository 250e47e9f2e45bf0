//! Checkers for the positive binary relation templates.
//!
//! Every checker tracks activation, fulfillment, violation and pending counts
//! and derives its verdict through the shared decision table
//! ([`relation_state`]).

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

/// Responded Existence(a, b): if `a` occurs, `b` must occur somewhere (order-free)
pub fn responded_existence(
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
    let num_activations = pendings.len();
    let mut num_fulfillments = 0;
    for event in trace {
        if pendings.is_empty() {
            break;
        }
        if event == b {
            pendings.retain(|activation| {
                if rules.correlation_holds(activation, event) {
                    num_fulfillments += 1;
                    false
                } else {
                    true
                }
            });
        }
    }
    let (num_violations, num_pendings) = if is_trace_complete {
        (pendings.len(), 0)
    } else {
        (0, pendings.len())
    };
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        num_pendings,
    )
}

/// Response(a, b): every `a` must be followed by a `b` later in the trace
pub fn response(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_fulfillments = 0;
    let mut pendings: Vec<&str> = Vec::new();
    for event in trace {
        if event == a && rules.activation_holds(event) {
            num_activations += 1;
            pendings.push(event.as_str());
        }
        if event == b && !pendings.is_empty() {
            pendings.retain(|activation| {
                if rules.correlation_holds(activation, event) {
                    num_fulfillments += 1;
                    false
                } else {
                    true
                }
            });
        }
    }
    let (num_violations, num_pendings) = if is_trace_complete {
        (pendings.len(), 0)
    } else {
        (0, pendings.len())
    };
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        num_pendings,
    )
}

/// Alternate Response(a, b): every `a` must be followed by a `b` before the next `a`
pub fn alternate_response(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_fulfillments = 0;
    let mut num_violations = 0;
    let mut pending: Option<&str> = None;
    for event in trace {
        if event == b {
            if let Some(activation) = pending {
                if rules.correlation_holds(activation, event) {
                    num_fulfillments += 1;
                    pending = None;
                }
            }
        }
        if event == a && rules.activation_holds(event) {
            // a second activation before the matching target violates the first
            if pending.is_some() {
                num_violations += 1;
            }
            num_activations += 1;
            pending = Some(event.as_str());
        }
    }
    let num_pendings = match pending {
        Some(_) if !is_trace_complete => 1,
        Some(_) => {
            num_violations += 1;
            0
        }
        None => 0,
    };
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        num_pendings,
    )
}

/// Chain Response(a, b): every `a` must be immediately followed by a `b`
pub fn chain_response(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_fulfillments = 0;
    let mut num_violations = 0;
    let mut num_pendings = 0;
    for (index, event) in trace.iter().enumerate() {
        if event == a && rules.activation_holds(event) {
            num_activations += 1;
            match trace.get(index + 1) {
                Some(next) if next == b && rules.correlation_holds(event, next) => {
                    num_fulfillments += 1;
                }
                Some(_) => num_violations += 1,
                None => {
                    if is_trace_complete {
                        num_violations += 1;
                    } else {
                        num_pendings = 1;
                    }
                }
            }
        }
    }
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        num_pendings,
    )
}

/// Precedence(a, b): every `b` must be preceded by an `a`
pub fn precedence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_fulfillments = 0;
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
                num_fulfillments += 1;
            }
        }
    }
    let num_violations = num_activations - num_fulfillments;
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        0,
    )
}

/// Alternate Precedence(a, b): every `b` must be preceded by an `a`, with no
/// other `b` in between
pub fn alternate_precedence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_fulfillments = 0;
    let mut armed: Option<&str> = None;
    for event in trace {
        if event == a {
            armed = Some(event.as_str());
        }
        if event == b && rules.activation_holds(event) {
            num_activations += 1;
            if let Some(target) = armed {
                if rules.correlation_holds(event, target) {
                    num_fulfillments += 1;
                }
            }
            // the next b needs a fresh a either way
            armed = None;
        }
    }
    let num_violations = num_activations - num_fulfillments;
    result(
        is_trace_complete,
        rules,
        num_activations,
        num_fulfillments,
        num_violations,
        0,
    )
}

/// Chain Precedence(a, b): every `b` must be immediately preceded by an `a`
pub fn chain_precedence(
    trace: &[String],
    is_trace_complete: bool,
    a: &str,
    b: &str,
    rules: &CheckRules<'_>,
) -> CheckerResult {
    let mut num_activations = 0;
    let mut num_fulfillments = 0;
    for (index, event) in trace.iter().enumerate() {
        if event == b && rules.activation_holds(event) {
            num_activations += 1;
            if index > 0 {
                let previous = &trace[index - 1];
                if previous == a && rules.correlation_holds(event, previous) {
                    num_fulfillments += 1;
                }
            }
        }
    }
    let num_violations = num_activations - num_fulfillments;
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
    fn response_semantics() {
        let rules = CheckRules::trivial();
        assert_eq!(
            response(&trace(&["A", "B"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
        assert_eq!(
            response(&trace(&["A", "C"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
        // the A at position 1 is still followed by a B
        assert_eq!(
            response(&trace(&["B", "A", "B"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
    }

    #[test]
    fn chain_response_semantics() {
        let rules = CheckRules::trivial();
        assert_eq!(
            chain_response(&trace(&["A", "B"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
        assert_eq!(
            chain_response(&trace(&["A", "C", "B"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
    }

    #[test]
    fn alternate_response_semantics() {
        let rules = CheckRules::trivial();
        assert_eq!(
            alternate_response(&trace(&["A", "B", "A", "B"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
        // second A before the first matching B
        assert_eq!(
            alternate_response(&trace(&["A", "A", "B"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
    }

    #[test]
    fn precedence_family_semantics() {
        let rules = CheckRules::trivial();
        assert_eq!(
            precedence(&trace(&["A", "B"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
        assert_eq!(
            precedence(&trace(&["B", "A"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
        assert_eq!(
            alternate_precedence(&trace(&["A", "B", "B"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
        assert_eq!(
            alternate_precedence(&trace(&["A", "B", "A", "B"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
        assert_eq!(
            chain_precedence(&trace(&["C", "A", "B"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
        assert_eq!(
            chain_precedence(&trace(&["A", "C", "B"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
    }

    #[test]
    fn responded_existence_is_order_free() {
        let rules = CheckRules::trivial();
        assert_eq!(
            responded_existence(&trace(&["B", "A"]), true, "A", "B", &rules).state,
            TraceState::Satisfied
        );
        assert_eq!(
            responded_existence(&trace(&["A", "C"]), true, "A", "B", &rules).state,
            TraceState::Violated
        );
    }

    #[test]
    fn vacuous_activation_counts() {
        let strict = CheckRules {
            vacuous_satisfaction: false,
            ..CheckRules::trivial()
        };
        // no activation at all: violated without vacuous satisfaction
        assert_eq!(
            response(&trace(&["C"]), true, "A", "B", &strict).state,
            TraceState::Violated
        );
        let res = response(&trace(&["A", "B", "A", "B"]), true, "A", "B", &strict);
        assert_eq!(res.num_activations, Some(2));
        assert_eq!(res.num_fulfillments, Some(2));
        assert_eq!(res.num_violations, Some(0));
    }
}
