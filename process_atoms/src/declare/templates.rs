use std::fmt;

use serde::{Deserialize, Serialize};

///
/// The catalog of DECLARE constraint templates
///
/// Closed sum type: the conformance dispatcher matches exhaustively over it,
/// so adding a template without a checker fails at compile time.
///
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Template {
    /// `a` occurs at least `n` times
    Existence,
    /// `a` occurs fewer than `n` times
    Absence,
    /// `a` occurs exactly `n` times
    Exactly,
    /// `a` is the first event of the trace
    Init,
    /// `a` is the last event of the trace
    End,
    /// `a` or `b` (or both) occur
    Choice,
    /// exactly one of `a` and `b` occurs
    ExclusiveChoice,
    /// if `a` occurs, `b` occurs as well (order-free)
    RespondedExistence,
    /// every `a` is eventually followed by a `b`
    Response,
    /// every `a` is followed by a `b` before the next `a`
    AlternateResponse,
    /// every `a` is immediately followed by a `b`
    ChainResponse,
    /// every `b` is preceded by an `a`
    Precedence,
    /// every `b` is preceded by an `a` with no other `b` in between
    AlternatePrecedence,
    /// every `b` is immediately preceded by an `a`
    ChainPrecedence,
    /// Response and Precedence combined
    Succession,
    /// Alternate Response and Alternate Precedence combined
    AlternateSuccession,
    /// Chain Response and Chain Precedence combined
    ChainSuccession,
    /// `a` and `b` occur together or not at all
    CoExistence,
    /// `a` and `b` never occur in the same trace
    NotCoExistence,
    /// if `a` occurs, `b` does not occur
    NotRespondedExistence,
    /// no `b` occurs after an `a`
    NotResponse,
    /// no `b` occurs immediately after an `a`
    NotChainResponse,
    /// no `a` occurs before a `b`
    NotPrecedence,
    /// no `a` occurs immediately before a `b`
    NotChainPrecedence,
    /// negated Succession
    NotSuccession,
    /// negated Alternate Succession
    NotAlternateSuccession,
    /// negated Chain Succession
    NotChainSuccession,
}

/// All 27 supported templates
pub const ALL_TEMPLATES: [Template; 27] = [
    Template::Existence,
    Template::Absence,
    Template::Exactly,
    Template::Init,
    Template::End,
    Template::Choice,
    Template::ExclusiveChoice,
    Template::RespondedExistence,
    Template::Response,
    Template::AlternateResponse,
    Template::ChainResponse,
    Template::Precedence,
    Template::AlternatePrecedence,
    Template::ChainPrecedence,
    Template::Succession,
    Template::AlternateSuccession,
    Template::ChainSuccession,
    Template::CoExistence,
    Template::NotCoExistence,
    Template::NotRespondedExistence,
    Template::NotResponse,
    Template::NotChainResponse,
    Template::NotPrecedence,
    Template::NotChainPrecedence,
    Template::NotSuccession,
    Template::NotAlternateSuccession,
    Template::NotChainSuccession,
];

impl Template {
    /// Canonical display name of the template
    pub fn name(&self) -> &'static str {
        match self {
            Template::Existence => "Existence",
            Template::Absence => "Absence",
            Template::Exactly => "Exactly",
            Template::Init => "Init",
            Template::End => "End",
            Template::Choice => "Choice",
            Template::ExclusiveChoice => "Exclusive Choice",
            Template::RespondedExistence => "Responded Existence",
            Template::Response => "Response",
            Template::AlternateResponse => "Alternate Response",
            Template::ChainResponse => "Chain Response",
            Template::Precedence => "Precedence",
            Template::AlternatePrecedence => "Alternate Precedence",
            Template::ChainPrecedence => "Chain Precedence",
            Template::Succession => "Succession",
            Template::AlternateSuccession => "Alternate Succession",
            Template::ChainSuccession => "Chain Succession",
            Template::CoExistence => "Co-Existence",
            Template::NotCoExistence => "Not Co-Existence",
            Template::NotRespondedExistence => "Not Responded Existence",
            Template::NotResponse => "Not Response",
            Template::NotChainResponse => "Not Chain Response",
            Template::NotPrecedence => "Not Precedence",
            Template::NotChainPrecedence => "Not Chain Precedence",
            Template::NotSuccession => "Not Succession",
            Template::NotAlternateSuccession => "Not Alternate Succession",
            Template::NotChainSuccession => "Not Chain Succession",
        }
    }

    /// Look up a template by its display name
    pub fn from_name(name: &str) -> Option<Template> {
        ALL_TEMPLATES.into_iter().find(|t| t.name() == name)
    }

    /// Whether the template takes two operand activities
    pub fn is_binary(&self) -> bool {
        !matches!(
            self,
            Template::Existence
                | Template::Absence
                | Template::Exactly
                | Template::Init
                | Template::End
        )
    }

    /// Whether the template negates a behavioral relation
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Template::NotCoExistence
                | Template::NotRespondedExistence
                | Template::NotResponse
                | Template::NotChainResponse
                | Template::NotPrecedence
                | Template::NotChainPrecedence
                | Template::NotSuccession
                | Template::NotAlternateSuccession
                | Template::NotChainSuccession
        )
    }

    /// Whether the template takes a cardinality parameter `n`
    pub fn supports_cardinality(&self) -> bool {
        matches!(
            self,
            Template::Existence | Template::Absence | Template::Exactly
        )
    }

    /// Whether swapping the operands changes the meaning of the constraint
    ///
    /// Directed constraints on (a, b) and (b, a) are different facts and are
    /// never merged during redundancy reduction.
    pub fn is_directed(&self) -> bool {
        matches!(
            self,
            Template::Response
                | Template::AlternateResponse
                | Template::ChainResponse
                | Template::Precedence
                | Template::AlternatePrecedence
                | Template::ChainPrecedence
                | Template::Succession
                | Template::AlternateSuccession
                | Template::ChainSuccession
                | Template::NotResponse
                | Template::NotChainResponse
                | Template::NotPrecedence
                | Template::NotChainPrecedence
                | Template::NotSuccession
                | Template::NotAlternateSuccession
                | Template::NotChainSuccession
        )
    }

    /// Position in the subsumption hierarchy; lower rank means stronger
    ///
    /// Satisfying a lower-ranked template implies satisfying the higher-ranked
    /// ones of the same family on the same operands (Chain beats Alternate
    /// beats the plain relation). Templates outside any family rank strongest.
    pub fn subsumption_rank(&self) -> u8 {
        match self {
            Template::RespondedExistence => 4,
            Template::Response => 3,
            Template::AlternateResponse => 2,
            Template::ChainResponse => 1,
            Template::Precedence => 3,
            Template::AlternatePrecedence => 2,
            Template::ChainPrecedence => 1,
            Template::CoExistence => 4,
            Template::Succession => 3,
            Template::AlternateSuccession => 2,
            Template::ChainSuccession => 1,
            Template::NotCoExistence => 1,
            Template::NotChainSuccession => 2,
            Template::NotSuccession => 3,
            _ => 1,
        }
    }

    /// Which operand positions activate the constraint (by index)
    pub fn activation_operands(&self) -> &'static [usize] {
        match self {
            Template::Existence
            | Template::Absence
            | Template::Exactly
            | Template::Init
            | Template::End => &[],
            Template::RespondedExistence
            | Template::Response
            | Template::AlternateResponse
            | Template::ChainResponse
            | Template::NotRespondedExistence
            | Template::NotResponse
            | Template::NotChainResponse => &[0],
            Template::Precedence
            | Template::AlternatePrecedence
            | Template::ChainPrecedence
            | Template::NotPrecedence
            | Template::NotChainPrecedence => &[1],
            _ => &[0, 1],
        }
    }

    /// Whether the template belongs to the positive Succession family
    pub fn is_succession_family(&self) -> bool {
        matches!(
            self,
            Template::Succession | Template::AlternateSuccession | Template::ChainSuccession
        )
    }

    /// The unary templates
    pub fn unary_templates() -> impl Iterator<Item = Template> {
        ALL_TEMPLATES.into_iter().filter(|t| !t.is_binary())
    }

    /// The binary templates
    pub fn binary_templates() -> impl Iterator<Item = Template> {
        ALL_TEMPLATES.into_iter().filter(|t| t.is_binary())
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
