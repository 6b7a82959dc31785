//! Model builder for the LP dialect
//!
//! The parser pulls tokens from a [`Lexer`] and feeds a [`ModelBuilder`]. It is a
//! flat loop over statements, and expressions are read term by term, so input
//! nesting never grows the call stack.
//!
//! ```text
//! model        := (declaration | objective | constraint)*
//! declaration  := 'var' IDENT ';'
//! objective    := ('minimize' | 'maximize') LABEL ':' expr ';'
//! constraint   := 'subject to' LABEL ':' expr RELOP ['+' | '-'] NUMBER ';'
//! expr         := ['+' | '-'] term (('+' | '-') ['+' | '-'] term)*
//! term         := [NUMBER '*'] IDENT | NUMBER
//! RELOP        := '<=' | '==' | '=' | '>='
//! ```
//!
//! Parsing stops at the first error; every error carries the position of the
//! offending token.

mod options;
#[cfg(test)]
mod tests;

pub use options::{DECLARATIONS_ENV, DeclarationPolicy, ParserOptions, UNIQUE_LABELS_ENV};

use std::{error::Error as StdError, fmt, iter::Peekable};

use crate::{
    Error,
    lexer::{Keyword, Lexer, Operator, Position, Punctuation, Token, TokenKind},
    model::{
        Constraint, LinearExpression, Model, ModelBuilder, ModelError, OptimizationSense,
        Relation, Symbol, VariableId,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },
    DuplicateObjective,
    MissingObjective,
    InvalidNumber(String),
    UnknownOperator(String),
    UndeclaredVariableUse(Symbol),
    DuplicateLabel(Symbol),
}

/// Structural error of a parse, located at the offending token
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self { kind, position }
    }

    fn from_model(err: ModelError, position: Position) -> Self {
        let kind = match err {
            ModelError::DuplicateObjective => ParseErrorKind::DuplicateObjective,
            ModelError::MissingObjective => ParseErrorKind::MissingObjective,
            ModelError::NonFiniteCoefficient(value) => {
                ParseErrorKind::InvalidNumber(value.to_string())
            }
            ModelError::DuplicateLabel(label) => ParseErrorKind::DuplicateLabel(label),
            ModelError::InvalidName(name) => ParseErrorKind::UnexpectedToken {
                found: name,
                expected: "a valid identifier",
            },
            ModelError::UnknownVariable(id) => {
                ParseErrorKind::UndeclaredVariableUse(Symbol::from(format!("#{}", id.index())))
            }
        };
        Self::new(kind, position)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.position)?;
        match &self.kind {
            ParseErrorKind::UnexpectedToken { found, expected } => {
                write!(f, "unexpected {}, expected {}", found, expected)
            }
            ParseErrorKind::DuplicateObjective => write!(f, "model already has an objective"),
            ParseErrorKind::MissingObjective => write!(f, "model has no objective"),
            ParseErrorKind::InvalidNumber(text) => write!(f, "invalid number {}", text),
            ParseErrorKind::UnknownOperator(op) => write!(f, "unknown operator `{}`", op),
            ParseErrorKind::UndeclaredVariableUse(name) => {
                write!(f, "variable `{}` used before declaration", name)
            }
            ParseErrorKind::DuplicateLabel(label) => write!(f, "duplicate label `{}`", label),
        }
    }
}

impl StdError for ParseError {}

/// Position just past the last character of `source`.
fn end_position(source: &str) -> Position {
    let line = source.matches('\n').count() + 1;
    let last_line = source.rsplit('\n').next().unwrap_or("");
    Position::new(line, last_line.chars().count() + 1)
}

pub struct Parser<'a> {
    tokens: Peekable<Lexer<'a>>,
    options: ParserOptions,
    builder: ModelBuilder,
    end: Position,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: ParserOptions) -> Self {
        let builder = if options.unique_labels {
            ModelBuilder::new().with_unique_labels()
        } else {
            ModelBuilder::new()
        };

        Self {
            tokens: Lexer::new(source).peekable(),
            options,
            builder,
            end: end_position(source),
        }
    }

    /// Consume the whole input and return the finished model.
    pub fn parse_model(mut self) -> Result<Model, Error> {
        while let Some(token) = self.next_token()? {
            match token.kind {
                TokenKind::Keyword(Keyword::Var) => self.declaration()?,
                TokenKind::Keyword(Keyword::Minimize) => {
                    self.objective(token, OptimizationSense::Minimize)?
                }
                TokenKind::Keyword(Keyword::Maximize) => {
                    self.objective(token, OptimizationSense::Maximize)?
                }
                TokenKind::Keyword(Keyword::SubjectTo) => self.constraint()?,
                _ => {
                    return Err(self.unexpected(
                        Some(token),
                        "`var`, `minimize`, `maximize` or `subject to`",
                    ));
                }
            }
        }

        let end = self.end;
        self.builder
            .build()
            .map_err(|e| ParseError::from_model(e, end).into())
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, Error> {
        for token in self.tokens.by_ref() {
            let token = token?;
            if token.kind != TokenKind::EndOfLine {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }

    fn peek_token(&mut self) -> Result<Option<Token<'a>>, Error> {
        while let Some(Ok(Token {
            kind: TokenKind::EndOfLine,
            ..
        })) = self.tokens.peek()
        {
            self.tokens.next();
        }

        match self.tokens.peek() {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some(*token)),
            Some(Err(err)) => Err((*err).into()),
        }
    }

    fn unexpected(&self, token: Option<Token<'a>>, expected: &'static str) -> Error {
        let (found, position) = match token {
            Some(token) => (token.kind.to_string(), token.position),
            None => ("end of input".to_string(), self.end),
        };
        ParseError::new(ParseErrorKind::UnexpectedToken { found, expected }, position).into()
    }

    fn expect(&mut self, kind: TokenKind<'a>, expected: &'static str) -> Result<Token<'a>, Error> {
        match self.next_token()? {
            Some(token) if token.kind == kind => Ok(token),
            other => Err(self.unexpected(other, expected)),
        }
    }

    fn identifier(&mut self, expected: &'static str) -> Result<(&'a str, Position), Error> {
        match self.next_token()? {
            Some(Token {
                kind: TokenKind::Identifier(name),
                position,
            }) => Ok((name, position)),
            other => Err(self.unexpected(other, expected)),
        }
    }

    fn number(&self, text: &str, position: Position) -> Result<f64, Error> {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::new(ParseErrorKind::InvalidNumber(text.to_string()), position).into()),
        }
    }

    /// Optional `+`/`-` prefix, as a multiplier.
    fn sign(&mut self) -> Result<f64, Error> {
        let sign = match self.peek_token()? {
            Some(Token {
                kind: TokenKind::Operator(Operator::Plus),
                ..
            }) => 1.0,
            Some(Token {
                kind: TokenKind::Operator(Operator::Minus),
                ..
            }) => -1.0,
            _ => return Ok(1.0),
        };
        self.next_token()?;
        Ok(sign)
    }

    fn variable(&mut self, name: &str, position: Position) -> Result<VariableId, Error> {
        let id = match self.options.declarations {
            DeclarationPolicy::Implicit => self
                .builder
                .add_variable(name)
                .map_err(|e| ParseError::from_model(e, position))?,
            DeclarationPolicy::Explicit => self.builder.variable(name).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::UndeclaredVariableUse(Symbol::from(name)),
                    position,
                )
            })?,
        };
        Ok(id)
    }

    fn declaration(&mut self) -> Result<(), Error> {
        let (name, position) = self.identifier("variable name")?;
        self.expect(TokenKind::Punctuation(Punctuation::Semicolon), "`;`")?;

        let known = self.builder.variable(name).is_some();
        self.builder
            .add_variable(name)
            .map_err(|e| ParseError::from_model(e, position))?;

        tracing::debug!(
            component = "parser",
            operation = "declaration",
            name,
            line = position.line,
            redeclared = known,
            "Declared variable"
        );
        Ok(())
    }

    fn objective(&mut self, keyword: Token<'a>, sense: OptimizationSense) -> Result<(), Error> {
        if self.builder.has_objective() {
            return Err(ParseError::new(ParseErrorKind::DuplicateObjective, keyword.position).into());
        }

        let (label, position) = self.identifier("objective label")?;
        self.expect(TokenKind::Punctuation(Punctuation::Colon), "`:`")?;
        let expression = self.expression()?;
        self.expect(TokenKind::Punctuation(Punctuation::Semicolon), "`;` or `+`/`-`")?;

        let terms = expression.terms.len();
        self.builder
            .set_objective(label, sense, expression)
            .map_err(|e| ParseError::from_model(e, position))?;

        tracing::debug!(
            component = "parser",
            operation = "objective",
            label,
            sense = %sense,
            terms,
            line = position.line,
            "Parsed objective"
        );
        Ok(())
    }

    fn constraint(&mut self) -> Result<(), Error> {
        let (label, position) = self.identifier("constraint label")?;
        self.expect(TokenKind::Punctuation(Punctuation::Colon), "`:`")?;
        let expression = self.expression()?;

        let relation = match self.next_token()? {
            Some(Token {
                kind: TokenKind::Operator(Operator::Relation(op)),
                position,
            }) => Relation::from_operator(op).ok_or_else(|| {
                ParseError::new(ParseErrorKind::UnknownOperator(op.to_string()), position)
            })?,
            other => return Err(self.unexpected(other, "`<=`, `==`, `=` or `>=`")),
        };

        let sign = self.sign()?;
        let rhs = match self.next_token()? {
            Some(Token {
                kind: TokenKind::Number(text),
                position,
            }) => sign * self.number(text, position)?,
            other => return Err(self.unexpected(other, "right-hand side number")),
        };
        self.expect(TokenKind::Punctuation(Punctuation::Semicolon), "`;`")?;

        let terms = expression.terms.len();
        self.builder
            .add_constraint(Constraint::new(label, expression, relation, rhs))
            .map_err(|e| ParseError::from_model(e, position))?;

        tracing::debug!(
            component = "parser",
            operation = "constraint",
            label,
            relation = %relation,
            rhs,
            terms,
            line = position.line,
            "Parsed constraint"
        );
        Ok(())
    }

    fn expression(&mut self) -> Result<LinearExpression, Error> {
        let mut expression = LinearExpression::new(0.0);
        let mut sign = self.sign()?;

        loop {
            self.term(sign, &mut expression)?;

            sign = match self.peek_token()? {
                Some(Token {
                    kind: TokenKind::Operator(Operator::Plus),
                    ..
                }) => 1.0,
                Some(Token {
                    kind: TokenKind::Operator(Operator::Minus),
                    ..
                }) => -1.0,
                _ => return Ok(expression),
            };
            self.next_token()?;
            sign *= self.sign()?;
        }
    }

    fn term(&mut self, sign: f64, expression: &mut LinearExpression) -> Result<(), Error> {
        match self.next_token()? {
            Some(Token {
                kind: TokenKind::Number(text),
                position,
            }) => {
                let value = sign * self.number(text, position)?;
                if let Some(Token {
                    kind: TokenKind::Operator(Operator::Times),
                    ..
                }) = self.peek_token()?
                {
                    self.next_token()?;
                    let (name, position) = self.identifier("variable name after `*`")?;
                    let variable = self.variable(name, position)?;
                    expression.add_term(value, variable);
                } else {
                    expression.constant += value;
                    if !expression.constant.is_finite() {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidNumber(text.to_string()),
                            position,
                        )
                        .into());
                    }
                }
            }
            Some(Token {
                kind: TokenKind::Identifier(name),
                position,
            }) => {
                let variable = self.variable(name, position)?;
                expression.add_term(sign, variable);
            }
            other => return Err(self.unexpected(other, "a number or variable name")),
        }
        Ok(())
    }
}
