use thiserror::Error;

use crate::formula::Token;
use crate::proof::{RuleName, StepId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unrecognized character '{character}' at position {position}")]
    UnrecognizedCharacter { position: usize, character: char },
    #[error(
        "invalid operator at position {position}: expected '->', found '-' followed by {}",
        describe_following(.found)
    )]
    InvalidOperatorSequence { position: usize, found: Option<char> },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            Self::UnrecognizedCharacter { position, .. }
            | Self::InvalidOperatorSequence { position, .. } => *position,
        }
    }
}

fn describe_following(found: &Option<char>) -> String {
    match found {
        Some(ch) => format!("'{ch}'"),
        None => "end of input".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected {token}: expected {expected}")]
    UnexpectedToken { token: Token, expected: &'static str },
    #[error("missing ')' before {token}")]
    MissingCloseParen { token: Token },
    #[error("unexpected trailing input: {token}")]
    TrailingInput { token: Token },
    #[error("formula nested deeper than {limit} levels at {token}")]
    NestingTooDeep { token: Token, limit: usize },
}

impl ParseError {
    /// The token at which parsing stopped.
    pub fn token(&self) -> &Token {
        match self {
            Self::UnexpectedToken { token, .. }
            | Self::MissingCloseParen { token }
            | Self::TrailingInput { token }
            | Self::NestingTooDeep { token, .. } => token,
        }
    }

    pub fn position(&self) -> usize {
        self.token().position
    }
}

/// Failure to turn formula text into a [`Formula`](crate::formula::Formula).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FormulaError {
    pub fn position(&self) -> usize {
        match self {
            Self::Lex(err) => err.position(),
            Self::Parse(err) => err.position(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("{rule} takes {expected} selected step(s), got {actual}")]
    ArityMismatch {
        rule: RuleName,
        expected: usize,
        actual: usize,
    },
    #[error("no step with id {id}")]
    StepNotFound { id: StepId },
    #[error("{rule} needs a secondary formula for the new disjunct")]
    MissingSecondaryFormula { rule: RuleName },
    #[error("{rule} does not apply: {expected}")]
    PatternMismatch { rule: RuleName, expected: String },
    #[error("{rule} is not an inference rule; add assumptions with `assume`")]
    NotAnInference { rule: RuleName },
    #[error("step ids are exhausted (next id is {next_id})")]
    IdsExhausted { next_id: StepId },
}

impl RuleError {
    pub fn rule(&self) -> Option<RuleName> {
        match self {
            Self::ArityMismatch { rule, .. }
            | Self::MissingSecondaryFormula { rule }
            | Self::PatternMismatch { rule, .. }
            | Self::NotAnInference { rule } => Some(*rule),
            Self::StepNotFound { .. } | Self::IdsExhausted { .. } => None,
        }
    }
}

/// A deserialized proof state that breaks the numbering invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("nextId {next_id} must exceed every step id (largest is {max_id})")]
    StaleNextId { next_id: StepId, max_id: StepId },
    #[error("step id {id} appears more than once")]
    DuplicateStepId { id: StepId },
}
