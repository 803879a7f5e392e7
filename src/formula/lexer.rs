use std::fmt;

use crate::core::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Proposition,
    Implies,
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
    Eof,
}

/// A lexeme with its source text and the character offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: usize,
}

impl Token {
    pub fn eof(position: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            value: String::new(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input at position {}", self.position),
            _ => write!(f, "'{}' at position {}", self.value, self.position),
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;

        match token.kind {
            TokenKind::Eof => {
                tokens.push(token);
                break;
            }
            _ => tokens.push(token),
        }
    }

    tracing::trace!(count = tokens.len(), "tokenized formula");
    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    index: usize,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            index: 0,
            position: 0,
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let position = self.position;

        let Some(ch) = self.peek_char() else {
            return Ok(Token::eof(position));
        };

        match ch {
            '(' => Ok(self.single(ch, TokenKind::LeftParen)),
            ')' => Ok(self.single(ch, TokenKind::RightParen)),
            '~' | '¬' => Ok(self.single(ch, TokenKind::Not)),
            '∧' => Ok(self.single(ch, TokenKind::And)),
            '∨' => Ok(self.single(ch, TokenKind::Or)),
            '→' => Ok(self.single(ch, TokenKind::Implies)),
            '-' => self.lex_arrow(),
            c if c.is_ascii_uppercase() => Ok(self.single(ch, TokenKind::Proposition)),
            _ => Err(LexError::UnrecognizedCharacter {
                position,
                character: ch,
            }),
        }
    }

    fn single(&mut self, ch: char, kind: TokenKind) -> Token {
        let position = self.position;
        self.bump_char(ch);
        Token {
            kind,
            value: ch.to_string(),
            position,
        }
    }

    fn lex_arrow(&mut self) -> Result<Token, LexError> {
        let position = self.position;
        self.bump_char('-');

        match self.peek_char() {
            Some('>') => {
                self.bump_char('>');
                Ok(Token {
                    kind: TokenKind::Implies,
                    value: "->".to_string(),
                    position,
                })
            }
            found => Err(LexError::InvalidOperatorSequence { position, found }),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.bump_char(ch);
            } else {
                break;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.index..].chars().next()
    }

    fn bump_char(&mut self, ch: char) {
        self.index += ch.len_utf8();
        self.position += 1;
    }
}
