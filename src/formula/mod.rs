use crate::core::FormulaError;

mod lexer;
mod parser;
mod syntax;

pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse, MAX_NESTING};
pub use syntax::{Connective, Formula};

/// Lexes and parses formula text such as `"(P -> Q) ∧ ~R"`.
pub fn parse_formula(source: &str) -> Result<Formula, FormulaError> {
    let tokens = tokenize(source)?;
    Ok(parse(tokens)?)
}
