//! LP-dialect parser and in-memory linear program model
//!
//! This library reads linear programs written in a small plain-text LP dialect and
//! turns them into a [`Model`] that solver front-ends can consume.
//!
//! # Overview
//!
//! Data flows one way: text → tokens → model. The [`lexer`] produces a lazy stream
//! of positioned tokens, the [`parser`] validates the grammar and assembles the
//! [`model`]. From there a model can be written back out as text
//! ([`model::serialisation`]), lowered to dense standard form
//! ([`model::standard_form`]) or summarised as tables ([`model::pretty`]).
//!
//! # The Dialect
//!
//! ```text
//! # radiation therapy planning
//! var x_1;
//! var x_2;
//!
//! minimize healthy_anatomy_exposure: 0.4*x_1 + 0.5*x_2;
//!
//! subject to critical_tissues: 0.3*x_1 + 0.1*x_2 <= 2.7;
//! subject to tumor_region: 0.5*x_1 + 0.5*x_2 == 6;
//! subject to tumor_center: 0.6*x_1 + 0.4*x_2 >= 6;
//! ```
//!
//! Every statement ends with `;`. `var` declarations are optional by default: a
//! variable is registered the first time it appears (see [`ParserOptions`]).
//! Exactly one objective is required; constraints are optional.
//!
//! # Usage Example
//!
//! ```
//! use lpparse::model::{OptimizationSense, Relation};
//!
//! let model = lpparse::parse(
//!     "maximize profit: 3*a + 2*b;
//!      subject to budget: a + b <= 4;",
//! )?;
//!
//! assert_eq!(model.objective().sense, OptimizationSense::Maximize);
//! assert_eq!(model.constraints()[0].relation, Relation::LessEqual);
//! assert_eq!(model.variables().len(), 2);
//! # Ok::<(), lpparse::Error>(())
//! ```
//!
//! # Errors
//!
//! Parsing stops at the first problem. Unrecognised characters produce a
//! [`LexError`], grammar and model problems a [`ParseError`]; both carry the
//! line and column of the offending input and are wrapped in [`Error`].
//!
//! # Concurrency
//!
//! Parsing keeps no shared state. [`parse_batch`] parses many independent inputs
//! in parallel and returns one result per input.

use rayon::prelude::*;
use std::{error::Error as StdError, fmt, io::Read};

pub mod lexer;
pub mod model;
pub mod parser;

pub use lexer::{LexError, Position};
pub use model::{Model, Symbol};
pub use parser::{DeclarationPolicy, ParseError, ParseErrorKind, ParserOptions};

/// Any failure of a parse call
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::Lex(err) => err.position,
            Error::Parse(err) => err.position,
        }
    }

    /// The parse error kind, `None` for lexical errors.
    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            Error::Lex(_) => None,
            Error::Parse(err) => Some(&err.kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(err) => write!(f, "{}", err),
            Error::Parse(err) => write!(f, "{}", err),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Lex(err) => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Lex(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

/// Parses a model with the default [`ParserOptions`].
pub fn parse(input: &str) -> Result<Model, Error> {
    parse_with(input, ParserOptions::default())
}

/// Parses a model with explicit options.
///
/// ```
/// use lpparse::{DeclarationPolicy, ParseErrorKind, ParserOptions};
///
/// let options = ParserOptions::default().with_declarations(DeclarationPolicy::Explicit);
/// let err = lpparse::parse_with("minimize cost: x;", options).unwrap_err();
///
/// assert!(matches!(
///     err.parse_kind(),
///     Some(ParseErrorKind::UndeclaredVariableUse(name)) if &**name == "x"
/// ));
/// ```
pub fn parse_with(input: &str, options: ParserOptions) -> Result<Model, Error> {
    let model = parser::Parser::new(input, options).parse_model()?;

    tracing::debug!(
        component = "parser",
        operation = "parse",
        status = "success",
        variables = model.variables().len(),
        constraints = model.constraints().len(),
        "Parsed model"
    );
    Ok(model)
}

/// Reads a UTF-8 byte stream and parses it.
///
/// Options come from the environment (see [`ParserOptions::from_env`]).
///
/// # Example
///
/// ```
/// # fn main() -> anyhow::Result<()> {
/// let bytes: &[u8] = b"var x;\nminimize cost: 2*x;\n";
/// let model = lpparse::parse_reader(bytes)?;
/// assert_eq!(model.variables().len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn parse_reader<R: Read>(mut reader: R) -> anyhow::Result<Model> {
    let options = ParserOptions::from_env()?;
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(parse_with(&input, options)?)
}

/// Parses independent inputs in parallel, one result per input in input order.
pub fn parse_batch<S>(inputs: &[S], options: ParserOptions) -> Vec<Result<Model, Error>>
where
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|input| parse_with(input.as_ref(), options))
        .collect()
}
