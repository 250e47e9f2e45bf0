//! Activation, correlation and time conditions attached to constraints.
//!
//! Conditions are small boolean expressions over the named variables `A` (the
//! activation event) and `T` (the target event), written by the user alongside
//! a constraint. They are parsed once into a [`Condition`] AST and evaluated
//! against a fixed, typed [`ConditionEnv`] per matching event; no
//! general-purpose expression evaluation is involved.
//!
//! Grammar:
//!
//! ```text
//! expr    := or
//! or      := and ("or" and)*
//! and     := unary ("and" unary)*
//! unary   := "not" unary | primary
//! primary := "(" expr ")"
//!          | var ("==" | "!=") string
//!          | var "in" "(" string ("," string)* ")"
//! var     := "A" | "T"
//! ```
//!
//! The empty string parses to a condition that is always true.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

///
/// A user-supplied condition failed to parse
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSyntaxError {
    /// The offending condition string
    pub condition: String,
    /// What went wrong
    pub message: String,
}

impl fmt::Display for ConditionSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "condition {:?} is not properly formatted: {}",
            self.condition, self.message
        )
    }
}

impl Error for ConditionSyntaxError {}

/// Variable referenced by a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionVar {
    /// `A`: the activity of the activation event
    Activation,
    /// `T`: the activity of the target event
    Target,
}

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

///
/// Parsed condition expression
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Always true (the empty condition)
    True,
    /// Variable comparison against a string literal
    Cmp {
        /// Compared variable
        var: ConditionVar,
        /// Comparison operator
        op: CmpOp,
        /// Literal to compare against
        value: String,
    },
    /// Variable membership in a literal set
    In {
        /// Tested variable
        var: ConditionVar,
        /// Literal values
        values: Vec<String>,
    },
    /// Logical negation
    Not(Box<Condition>),
    /// Logical conjunction
    And(Box<Condition>, Box<Condition>),
    /// Logical disjunction
    Or(Box<Condition>, Box<Condition>),
}

///
/// The typed environment a condition is evaluated against
///
#[derive(Debug, Clone, Copy)]
pub struct ConditionEnv<'a> {
    /// Activity of the activation event (`A`)
    pub activation: &'a str,
    /// Activity of the target event (`T`), absent for unary checks
    pub target: Option<&'a str>,
}

impl Condition {
    /// Parse a condition string; the empty string yields [`Condition::True`]
    pub fn parse(input: &str) -> Result<Condition, ConditionSyntaxError> {
        if input.trim().is_empty() {
            return Ok(Condition::True);
        }
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let expr = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("trailing input after expression"));
        }
        Ok(expr)
    }

    /// Evaluate against an environment
    ///
    /// A comparison referencing the absent target variable evaluates to false.
    pub fn evaluate(&self, env: &ConditionEnv<'_>) -> bool {
        match self {
            Condition::True => true,
            Condition::Cmp { var, op, value } => match resolve(*var, env) {
                Some(actual) => match op {
                    CmpOp::Eq => actual == value,
                    CmpOp::Ne => actual != value,
                },
                None => false,
            },
            Condition::In { var, values } => match resolve(*var, env) {
                Some(actual) => values.iter().any(|v| v == actual),
                None => false,
            },
            Condition::Not(inner) => !inner.evaluate(env),
            Condition::And(l, r) => l.evaluate(env) && r.evaluate(env),
            Condition::Or(l, r) => l.evaluate(env) || r.evaluate(env),
        }
    }
}

fn resolve<'a>(var: ConditionVar, env: &ConditionEnv<'a>) -> Option<&'a str> {
    match var {
        ConditionVar::Activation => Some(env.activation),
        ConditionVar::Target => env.target,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    EqEq,
    NotEq,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ConditionSyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '=' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err(syntax_error(input, "expected '=='"));
                }
                tokens.push(Token::EqEq);
            }
            '!' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err(syntax_error(input, "expected '!='"));
                }
                tokens.push(Token::NotEq);
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => literal.push(c),
                        None => return Err(syntax_error(input, "unterminated string literal")),
                    }
                }
                tokens.push(Token::Str(literal));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(syntax_error(
                    input,
                    &format!("unexpected character '{other}'"),
                ));
            }
        }
    }
    Ok(tokens)
}

fn syntax_error(input: &str, message: &str) -> ConditionSyntaxError {
    ConditionSyntaxError {
        condition: input.to_string(),
        message: message.to_string(),
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> ConditionSyntaxError {
        syntax_error(self.input, message)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat_ident(&mut self, ident: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(i)) if i == ident) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Condition, ConditionSyntaxError> {
        let mut left = self.parse_and()?;
        while self.eat_ident("or") {
            let right = self.parse_and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Condition, ConditionSyntaxError> {
        let mut left = self.parse_unary()?;
        while self.eat_ident("and") {
            let right = self.parse_unary()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Condition, ConditionSyntaxError> {
        if self.eat_ident("not") {
            let inner = self.parse_unary()?;
            return Ok(Condition::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Condition, ConditionSyntaxError> {
        match self.next().cloned() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.error("expected ')'")),
                }
            }
            Some(Token::Ident(ident)) => {
                let var = match ident.as_str() {
                    "A" => ConditionVar::Activation,
                    "T" => ConditionVar::Target,
                    other => {
                        return Err(self.error(&format!("unknown variable '{other}'")));
                    }
                };
                match self.next().cloned() {
                    Some(Token::EqEq) => self.parse_literal(var, CmpOp::Eq),
                    Some(Token::NotEq) => self.parse_literal(var, CmpOp::Ne),
                    Some(Token::Ident(kw)) if kw == "in" => self.parse_in(var),
                    _ => Err(self.error("expected '==', '!=' or 'in'")),
                }
            }
            _ => Err(self.error("expected '(' or a variable")),
        }
    }

    fn parse_literal(
        &mut self,
        var: ConditionVar,
        op: CmpOp,
    ) -> Result<Condition, ConditionSyntaxError> {
        match self.next().cloned() {
            Some(Token::Str(value)) => Ok(Condition::Cmp { var, op, value }),
            _ => Err(self.error("expected a string literal")),
        }
    }

    fn parse_in(&mut self, var: ConditionVar) -> Result<Condition, ConditionSyntaxError> {
        if self.next() != Some(&Token::LParen) {
            return Err(self.error("expected '(' after 'in'"));
        }
        let mut values = Vec::new();
        loop {
            match self.next().cloned() {
                Some(Token::Str(value)) => values.push(value),
                _ => return Err(self.error("expected a string literal")),
            }
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }
        Ok(Condition::In { var, values })
    }
}
