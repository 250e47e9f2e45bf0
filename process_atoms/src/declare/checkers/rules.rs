use crate::declare::condition::{Condition, ConditionEnv};

///
/// The parsed rule parameters a checker evaluates a constraint under
///
/// Activation, correlation and time conditions are opaque user-supplied
/// predicates (see [`Condition`]); `vacuous_satisfaction` steers the shared
/// decision table when a constraint is never activated.
///
#[derive(Debug, Clone, Copy)]
pub struct CheckRules<'a> {
    /// Condition an event must satisfy to activate the constraint
    pub activation: &'a Condition,
    /// Condition the (activation, target) pair must satisfy to correlate
    pub correlation: &'a Condition,
    /// Additional time condition evaluated together with the correlation
    pub time: &'a Condition,
    /// Whether never-activated constraints count as satisfied
    pub vacuous_satisfaction: bool,
}

pub(crate) static TRIVIAL: Condition = Condition::True;

impl<'a> CheckRules<'a> {
    /// Rules with no conditions and vacuous satisfaction allowed
    pub fn trivial() -> CheckRules<'static> {
        CheckRules {
            activation: &TRIVIAL,
            correlation: &TRIVIAL,
            time: &TRIVIAL,
            vacuous_satisfaction: true,
        }
    }

    /// Evaluate the activation condition for an event
    pub fn activation_holds(&self, event: &str) -> bool {
        self.activation.evaluate(&ConditionEnv {
            activation: event,
            target: None,
        })
    }

    /// Evaluate correlation and time conditions for an (activation, target) pair
    pub fn correlation_holds(&self, activation: &str, target: &str) -> bool {
        let env = ConditionEnv {
            activation,
            target: Some(target),
        };
        self.correlation.evaluate(&env) && self.time.evaluate(&env)
    }
}
