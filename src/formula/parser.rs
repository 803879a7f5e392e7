use crate::core::ParseError;

use super::lexer::{Token, TokenKind};
use super::syntax::{Connective, Formula};

/// Parses a token sequence produced by [`tokenize`](super::tokenize).
///
/// Precedence from tightest to loosest is `¬`, `∧`, `∨`, `→`. Conjunction and
/// disjunction associate to the left, implication to the right.
pub fn parse(tokens: Vec<Token>) -> Result<Formula, ParseError> {
    let mut parser = Parser::new(tokens);
    let (formula, _) = parser.parse_implication()?;
    parser.expect_eof()?;
    tracing::trace!(%formula, "parsed formula");
    Ok(formula)
}

/// Deepest formula tree, and deepest run of `(`/`¬`, the parser accepts.
pub const MAX_NESTING: usize = 100;

/// A parsed subformula with the height of its tree.
type Parsed = (Formula, usize);

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    nesting: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::Eof) {
            let position = tokens
                .last()
                .map_or(0, |token| token.position + token.value.chars().count());
            tokens.push(Token::eof(position));
        }
        Self {
            tokens,
            index: 0,
            nesting: 0,
        }
    }

    // Operands are collected first and folded from the right, so long chains
    // do not recurse.
    fn parse_implication(&mut self) -> Result<Parsed, ParseError> {
        let first = self.parse_disjunction()?;
        let mut rest = Vec::new();
        while self.consume(TokenKind::Implies) {
            rest.push(self.parse_disjunction()?);
        }

        let Some(mut formula) = rest.pop() else {
            return Ok(first);
        };
        while let Some(left) = rest.pop() {
            formula = self.join(Connective::Implies, left, formula)?;
        }
        self.join(Connective::Implies, first, formula)
    }

    fn parse_disjunction(&mut self) -> Result<Parsed, ParseError> {
        let mut formula = self.parse_conjunction()?;
        while self.consume(TokenKind::Or) {
            let right = self.parse_conjunction()?;
            formula = self.join(Connective::Or, formula, right)?;
        }
        Ok(formula)
    }

    fn parse_conjunction(&mut self) -> Result<Parsed, ParseError> {
        let mut formula = self.parse_unary()?;
        while self.consume(TokenKind::And) {
            let right = self.parse_unary()?;
            formula = self.join(Connective::And, formula, right)?;
        }
        Ok(formula)
    }

    fn parse_unary(&mut self) -> Result<Parsed, ParseError> {
        if self.consume(TokenKind::Not) {
            let (inner, height) = self.nested(Self::parse_unary)?;
            self.check_height(height + 1)?;
            return Ok((Formula::not(inner), height + 1));
        }

        if self.consume(TokenKind::LeftParen) {
            let formula = self.nested(Self::parse_implication)?;
            self.expect_close_paren()?;
            return Ok(formula);
        }

        let token = self.peek();
        if token.kind == TokenKind::Proposition {
            let formula = Formula::atom(token.value.clone());
            self.bump();
            return Ok((formula, 1));
        }

        Err(ParseError::UnexpectedToken {
            token: token.clone(),
            expected: "a proposition, a negation or '('",
        })
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Parsed, ParseError>,
    ) -> Result<Parsed, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn join(
        &self,
        connective: Connective,
        (left, left_height): Parsed,
        (right, right_height): Parsed,
    ) -> Result<Parsed, ParseError> {
        let height = left_height.max(right_height) + 1;
        self.check_height(height)?;
        Ok((Formula::binary(connective, left, right), height))
    }

    fn check_height(&self, height: usize) -> Result<(), ParseError> {
        if height > MAX_NESTING {
            Err(self.too_deep())
        } else {
            Ok(())
        }
    }

    fn too_deep(&self) -> ParseError {
        ParseError::NestingTooDeep {
            token: self.peek().clone(),
            limit: MAX_NESTING,
        }
    }

    fn expect_close_paren(&mut self) -> Result<(), ParseError> {
        if self.consume(TokenKind::RightParen) {
            Ok(())
        } else {
            Err(ParseError::MissingCloseParen {
                token: self.peek().clone(),
            })
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.peek().kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(ParseError::TrailingInput {
                token: self.peek().clone(),
            })
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn bump(&mut self) {
        if self.peek().kind != TokenKind::Eof {
            self.index += 1;
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index]
    }
}
