//! Token model and the spelling tables shared by the tokenizer and the
//! diagnostics.

use std::fmt;

use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    // Literals
    Integer,
    Double,
    Char,
    String,
    // Keywords
    Define,
    New,
    Create,
    Delete,
    Return,
    Undefined,
    Nan,
    Null,
    And,
    Or,
    Not,
    Xor,
    // Value relations
    Assign,    // =
    Allocate,  // :
    Reference, // :=
    Semicolon,
    // Brackets
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    PlusAssign,
    MinusAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    Increment,
    Decrement,
    // Comparison
    Equals,
    NotEquals,
    Greater,
    Less,
    GreaterEquals,
    LessEquals,
    Comma,
}

pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("define", TokenKind::Define),
    ("new", TokenKind::New),
    ("create", TokenKind::Create),
    ("delete", TokenKind::Delete),
    ("return", TokenKind::Return),
    ("undefined", TokenKind::Undefined),
    ("nan", TokenKind::Nan),
    ("null", TokenKind::Null),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("not", TokenKind::Not),
    ("xor", TokenKind::Xor),
];

pub const OPERATORS: &[(&str, TokenKind)] = &[
    ("=", TokenKind::Assign),
    (":", TokenKind::Allocate),
    (":=", TokenKind::Reference),
    (";", TokenKind::Semicolon),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Multiply),
    ("/", TokenKind::Divide),
    ("%", TokenKind::Modulo),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("*=", TokenKind::MultiplyAssign),
    ("/=", TokenKind::DivideAssign),
    ("%=", TokenKind::ModuloAssign),
    ("++", TokenKind::Increment),
    ("--", TokenKind::Decrement),
    ("==", TokenKind::Equals),
    ("!=", TokenKind::NotEquals),
    (">", TokenKind::Greater),
    ("<", TokenKind::Less),
    (">=", TokenKind::GreaterEquals),
    ("<=", TokenKind::LessEquals),
    (",", TokenKind::Comma),
];

fn lookup(table: &[(&str, TokenKind)], spelling: &str) -> Option<TokenKind> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == spelling)
        .map(|(_, kind)| *kind)
}

/// Length in characters of the longest operator spelling.
pub fn longest_operator() -> usize {
    OPERATORS
        .iter()
        .map(|(spelling, _)| spelling.chars().count())
        .max()
        .unwrap_or(0)
}

impl TokenKind {
    pub fn keyword(spelling: &str) -> Option<Self> {
        lookup(KEYWORDS, spelling)
    }

    pub fn operator(spelling: &str) -> Option<Self> {
        lookup(OPERATORS, spelling)
    }

    /// Source spelling for keywords and operators, a category name for the rest.
    pub fn spelling(self) -> &'static str {
        if let Some((spelling, _)) = KEYWORDS
            .iter()
            .chain(OPERATORS)
            .find(|(_, kind)| *kind == self)
        {
            return *spelling;
        }
        match self {
            Self::Identifier => "identifier",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Char => "char",
            Self::String => "string",
            _ => "unknown",
        }
    }

    /// Kinds whose tokens carry a literal value.
    pub fn carries_literal(self) -> bool {
        matches!(
            self,
            Self::Identifier | Self::Integer | Self::Double | Self::Char | Self::String
        )
    }

    pub fn opens_group(self) -> bool {
        matches!(self, Self::LBrace | Self::LParen | Self::LBracket)
    }

    pub fn closes_group(self) -> bool {
        matches!(self, Self::RBrace | Self::RParen | Self::RBracket)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.carries_literal() {
            f.write_str(self.spelling())
        } else {
            write!(f, "`{}`", self.spelling())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Double(f64),
    Char(char),
    String(String),
}

/// A lexical token. The literal is present exactly for identifiers and
/// literal kinds; the constructors keep it that way.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    literal: Option<Literal>,
    position: Position,
}

impl Token {
    /// Keyword or operator token.
    pub fn new(kind: TokenKind, position: Position) -> Self {
        debug_assert!(!kind.carries_literal(), "{kind:?} needs a literal");
        Self { kind, literal: None, position }
    }

    pub fn identifier(name: impl Into<String>, position: Position) -> Self {
        Self::with_literal(TokenKind::Identifier, Literal::String(name.into()), position)
    }

    pub fn integer(value: i64, position: Position) -> Self {
        Self::with_literal(TokenKind::Integer, Literal::Integer(value), position)
    }

    pub fn double(value: f64, position: Position) -> Self {
        Self::with_literal(TokenKind::Double, Literal::Double(value), position)
    }

    pub fn char(value: char, position: Position) -> Self {
        Self::with_literal(TokenKind::Char, Literal::Char(value), position)
    }

    pub fn string(value: impl Into<String>, position: Position) -> Self {
        Self::with_literal(TokenKind::String, Literal::String(value.into()), position)
    }

    fn with_literal(kind: TokenKind, literal: Literal, position: Position) -> Self {
        Self {
            kind,
            literal: Some(literal),
            position,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn literal(&self) -> Option<&Literal> {
        self.literal.as_ref()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Identifier spelling, `None` for every other kind.
    pub fn name(&self) -> Option<&str> {
        match (&self.kind, &self.literal) {
            (TokenKind::Identifier, Some(Literal::String(name))) => Some(name),
            _ => None,
        }
    }

    /// The token written back as source text.
    pub fn text(&self) -> String {
        match &self.literal {
            None => self.kind.spelling().to_string(),
            Some(Literal::Integer(value)) => value.to_string(),
            Some(Literal::Double(value)) => format_double(*value),
            Some(Literal::Char(value)) => format!("'{}'", escape(&value.to_string())),
            Some(Literal::String(value)) if self.kind == TokenKind::Identifier => value.clone(),
            Some(Literal::String(value)) => format!("\"{}\"", escape(value)),
        }
    }

    /// Short description for diagnostics, e.g. "`;`" or "identifier `x`".
    pub fn describe(&self) -> String {
        if self.kind.carries_literal() {
            format!("{} `{}`", self.kind, self.text())
        } else {
            self.kind.to_string()
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Decimal rendering that always keeps a fractional part, so it lexes back
/// as a double.
pub fn format_double(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// Re-applies escape sequences to decoded literal text.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\u{7}' => escaped.push_str("\\a"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{b}' => escaped.push_str("\\v"),
            '\u{c}' => escaped.push_str("\\f"),
            '\0' => escaped.push_str("\\0"),
            other => escaped.push(other),
        }
    }
    escaped
}
