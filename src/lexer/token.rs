use logos::Logos;
use std::fmt;

/// Line/column of a token in the source text, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Var,
    Minimize,
    Maximize,
    /// The two-word `subject to` that opens a constraint.
    SubjectTo,
}

impl Keyword {
    /// Single-word keywords; these are reserved and never identifiers.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "var" => Some(Keyword::Var),
            "minimize" => Some(Keyword::Minimize),
            "maximize" => Some(Keyword::Maximize),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Var => write!(f, "var"),
            Keyword::Minimize => write!(f, "minimize"),
            Keyword::Maximize => write!(f, "maximize"),
            Keyword::SubjectTo => write!(f, "subject to"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator<'a> {
    Plus,
    Minus,
    Times,
    /// Raw run of `<`, `>`, `=` and `!` characters, validated by the parser.
    Relation(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuation {
    Colon,
    Semicolon,
}

/// Token kinds of the dialect.
///
/// Spaces, tabs and `#` comments are skipped; a line break is its own token.
/// `subject` and `to` come out as two identifiers and are joined into
/// [`Keyword::SubjectTo`] by [`Lexer`](super::Lexer).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")] // Skip blanks
#[logos(skip r"#[^\n]*")] // Skip comments
pub enum TokenKind<'a> {
    #[token("var", |_| Keyword::Var)]
    #[token("minimize", |_| Keyword::Minimize)]
    #[token("maximize", |_| Keyword::Maximize)]
    Keyword(Keyword),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Identifier(&'a str),

    /// Raw text of an unsigned numeric literal.
    #[regex(r"[0-9]+(\.[0-9]*)?", number)]
    #[regex(r"\.[0-9]+", number)]
    Number(&'a str),

    #[token("+", |_| Operator::Plus)]
    #[token("-", |_| Operator::Minus)]
    #[token("*", |_| Operator::Times)]
    #[regex(r"[<>=!]+", |lex| Operator::Relation(lex.slice()))]
    Operator(Operator<'a>),

    #[token(":", |_| Punctuation::Colon)]
    #[token(";", |_| Punctuation::Semicolon)]
    Punctuation(Punctuation),

    #[token("\n")]
    EndOfLine,
}

/// Extends a matched mantissa with an exponent, when digits follow the marker.
fn number<'a>(lex: &mut logos::Lexer<'a, TokenKind<'a>>) -> &'a str {
    let rest = lex.remainder().as_bytes();
    let marker = match rest {
        [b'e' | b'E', b'+' | b'-', ..] => 2,
        [b'e' | b'E', ..] => 1,
        _ => 0,
    };
    if marker > 0 {
        let digits = rest[marker..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 {
            lex.bump(marker + digits);
        }
    }
    lex.slice()
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "keyword `{}`", k),
            TokenKind::Identifier(name) => write!(f, "identifier `{}`", name),
            TokenKind::Number(text) => write!(f, "number `{}`", text),
            TokenKind::Operator(Operator::Plus) => write!(f, "`+`"),
            TokenKind::Operator(Operator::Minus) => write!(f, "`-`"),
            TokenKind::Operator(Operator::Times) => write!(f, "`*`"),
            TokenKind::Operator(Operator::Relation(op)) => write!(f, "`{}`", op),
            TokenKind::Punctuation(Punctuation::Colon) => write!(f, "`:`"),
            TokenKind::Punctuation(Punctuation::Semicolon) => write!(f, "`;`"),
            TokenKind::EndOfLine => write!(f, "end of line"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub position: Position,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, position: Position) -> Self {
        Self { kind, position }
    }
}
