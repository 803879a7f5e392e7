use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Connective {
    And,
    Or,
    Implies,
}

impl Connective {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::And => "∧",
            Self::Or => "∨",
            Self::Implies => "→",
        }
    }

    // Higher binds tighter. Negation and atoms sit above all three.
    const fn precedence(self) -> u8 {
        match self {
            Self::And => 3,
            Self::Or => 2,
            Self::Implies => 1,
        }
    }

    const fn is_right_associative(self) -> bool {
        matches!(self, Self::Implies)
    }
}

/// A propositional formula.
///
/// Equality is structural: two formulas are equal iff their shapes and atom
/// names agree recursively, with `left`/`right` order significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Formula {
    Atom {
        name: String,
    },
    Not {
        inner: Box<Formula>,
    },
    Binary {
        connective: Connective,
        left: Box<Formula>,
        right: Box<Formula>,
    },
}

impl Formula {
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom { name: name.into() }
    }

    pub fn not(inner: Formula) -> Self {
        Self::Not {
            inner: Box::new(inner),
        }
    }

    pub fn binary(connective: Connective, left: Formula, right: Formula) -> Self {
        Self::Binary {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Formula, right: Formula) -> Self {
        Self::binary(Connective::And, left, right)
    }

    pub fn or(left: Formula, right: Formula) -> Self {
        Self::binary(Connective::Or, left, right)
    }

    pub fn implies(left: Formula, right: Formula) -> Self {
        Self::binary(Connective::Implies, left, right)
    }

    pub fn as_negation(&self) -> Option<&Formula> {
        match self {
            Self::Not { inner } => Some(&**inner),
            _ => None,
        }
    }

    pub fn as_binary(&self, expected: Connective) -> Option<(&Formula, &Formula)> {
        match self {
            Self::Binary {
                connective,
                left,
                right,
            } if *connective == expected => Some((&**left, &**right)),
            _ => None,
        }
    }

    pub fn as_conjunction(&self) -> Option<(&Formula, &Formula)> {
        self.as_binary(Connective::And)
    }

    pub fn as_disjunction(&self) -> Option<(&Formula, &Formula)> {
        self.as_binary(Connective::Or)
    }

    pub fn as_implication(&self) -> Option<(&Formula, &Formula)> {
        self.as_binary(Connective::Implies)
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Self::Atom { .. } => 1,
            Self::Not { inner } => 1 + inner.size(),
            Self::Binary { left, right, .. } => 1 + left.size() + right.size(),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Atom { .. } | Self::Not { .. } => 4,
            Self::Binary { connective, .. } => connective.precedence(),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom { name } => write!(f, "{name}"),
            Self::Not { inner } => {
                write!(f, "¬")?;
                write_operand(f, inner, matches!(**inner, Self::Binary { .. }))
            }
            Self::Binary {
                connective,
                left,
                right,
            } => {
                let own = connective.precedence();
                let left_parens = left.precedence() < own
                    || (left.precedence() == own && connective.is_right_associative());
                let right_parens = right.precedence() < own
                    || (right.precedence() == own && !connective.is_right_associative());
                write_operand(f, left, left_parens)?;
                write!(f, " {} ", connective.symbol())?;
                write_operand(f, right, right_parens)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Formula, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}
