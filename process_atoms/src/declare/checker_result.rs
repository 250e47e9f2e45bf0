use serde::{Deserialize, Serialize};

///
/// Verdict of a single-trace constraint check
///
/// The "possibly" states only arise on trace prefixes (`is_trace_complete = false`);
/// a complete trace always ends up `Satisfied` or `Violated`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceState {
    /// The constraint is violated by the trace
    Violated,
    /// The constraint is satisfied by the trace
    Satisfied,
    /// The prefix seen so far violates the constraint but a continuation could still satisfy it
    PossiblyViolated,
    /// The prefix seen so far satisfies the constraint but a continuation could still violate it
    PossiblySatisfied,
}

///
/// Outcome of checking one constraint against one trace
///
/// Carries the verdict together with activation/fulfillment/violation/pending
/// counts where the checker tracks them (`None` otherwise).
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerResult {
    /// Number of fulfilled activations
    pub num_fulfillments: Option<usize>,
    /// Number of violated activations
    pub num_violations: Option<usize>,
    /// Number of activations still awaiting their target (prefix mode only)
    pub num_pendings: Option<usize>,
    /// Total number of activations
    pub num_activations: Option<usize>,
    /// Final verdict
    pub state: TraceState,
}

impl CheckerResult {
    /// A result carrying only a verdict, without counts
    pub fn of_state(state: TraceState) -> Self {
        CheckerResult {
            num_fulfillments: None,
            num_violations: None,
            num_pendings: None,
            num_activations: None,
            state,
        }
    }

    /// Whether the verdict is `Violated`
    pub fn is_violated(&self) -> bool {
        self.state == TraceState::Violated
    }

    /// Whether the verdict is `Satisfied`
    pub fn is_satisfied(&self) -> bool {
        self.state == TraceState::Satisfied
    }
}

///
/// The shared decision table deriving the final [`TraceState`] of a relation checker
///
/// Identical for every binary template (the uniform tie-break rules of the
/// DECLARE checkers): without vacuous satisfaction, zero activations means the
/// constraint is (possibly) violated; otherwise any violation forces `Violated`,
/// and a violation-free trace is `Satisfied` when complete, `PossiblySatisfied`
/// when it is a prefix.
///
pub fn relation_state(
    is_trace_complete: bool,
    vacuous_satisfaction: bool,
    num_activations: usize,
    num_violations: usize,
) -> TraceState {
    if !vacuous_satisfaction && num_activations == 0 {
        if is_trace_complete {
            TraceState::Violated
        } else {
            TraceState::PossiblyViolated
        }
    } else if !is_trace_complete && num_violations == 0 {
        TraceState::PossiblySatisfied
    } else if num_violations > 0 {
        TraceState::Violated
    } else {
        TraceState::Satisfied
    }
}
