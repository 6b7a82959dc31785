//! Tokenizer for the LP dialect
//!
//! [`Lexer`] turns source text into a lazy stream of [`Token`]s. Comments start
//! with `#` and run to the end of the line; they never produce tokens. Line
//! breaks produce [`TokenKind::EndOfLine`]; spaces, tabs and carriage returns are skipped.
//!
//! Token rules are declared on [`TokenKind`] with `logos`; [`Lexer`] adds line
//! and column positions and joins the two words of `subject to`. It is `Clone`,
//! so a stream can be restarted from any point, and it stops after the first
//! [`LexError`].
//!
//! ```
//! use lpparse::lexer::{Keyword, Lexer, TokenKind};
//!
//! let kinds: Vec<_> = Lexer::new("var x_1; # decision variable")
//!     .map(|t| t.map(|t| t.kind))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(kinds[0], TokenKind::Keyword(Keyword::Var));
//! assert_eq!(kinds[1], TokenKind::Identifier("x_1"));
//! assert_eq!(kinds.len(), 3);
//! ```

mod token;

pub use token::{Keyword, Operator, Position, Punctuation, Token, TokenKind};

use logos::Logos;
use std::{error::Error, fmt};

/// An unrecognised character in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub character: char,
    pub position: Position,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognised character {:?} at {}",
            self.character, self.position
        )
    }
}

impl Error for LexError {}

/// Positioned token stream over [`TokenKind`]'s logos lexer.
#[derive(Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    tokens: logos::Lexer<'a, TokenKind<'a>>,
    line: usize,
    /// Byte offset where `line` starts
    line_start: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: TokenKind::lexer(source),
            line: 1,
            line_start: 0,
            failed: false,
        }
    }

    /// Position just past the last token read.
    pub fn position(&self) -> Position {
        self.position_at(self.tokens.span().end)
    }

    fn position_at(&self, offset: usize) -> Position {
        let column = self.source[self.line_start..offset].chars().count() + 1;
        Position::new(self.line, column)
    }

    /// Folds a `to` following `subject` into one keyword. Line breaks and
    /// comments may sit between the two words.
    fn subject_to(&mut self) -> Option<TokenKind<'a>> {
        let mut ahead = self.tokens.clone();
        let (mut line, mut line_start) = (self.line, self.line_start);

        loop {
            match ahead.next()? {
                Ok(TokenKind::EndOfLine) => {
                    line += 1;
                    line_start = ahead.span().end;
                }
                Ok(TokenKind::Identifier("to")) => break,
                _ => return None,
            }
        }

        self.tokens = ahead;
        self.line = line;
        self.line_start = line_start;
        Some(TokenKind::Keyword(Keyword::SubjectTo))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let next = self.tokens.next()?;
        let span = self.tokens.span();
        let position = self.position_at(span.start);

        let kind = match next {
            Ok(TokenKind::EndOfLine) => {
                self.line += 1;
                self.line_start = span.end;
                TokenKind::EndOfLine
            }
            Ok(kind @ TokenKind::Identifier("subject")) => self.subject_to().unwrap_or(kind),
            Ok(kind) => kind,
            Err(()) => {
                self.failed = true;
                let character = self.source[span.start..].chars().next().unwrap_or_default();
                return Some(Err(LexError {
                    character,
                    position,
                }));
            }
        };

        Some(Ok(Token::new(kind, position)))
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
