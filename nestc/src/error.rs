use std::path::PathBuf;

use thiserror::Error;

use crate::parser::token::TokenKind;
use crate::position::Position;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Error, Debug)]
pub enum CompileError {
    // Lexical errors: the tokenizer cannot produce the next token.
    #[error("{position}: malformed number `{text}`: {reason}")]
    MalformedNumber {
        text: String,
        reason: String,
        position: Position,
    },

    #[error("{position}: unterminated literal, missing closing `{quote}`")]
    UnterminatedLiteral { quote: char, position: Position },

    #[error("{position}: unknown escape sequence `{sequence}`")]
    UnknownEscape { sequence: String, position: Position },

    #[error("{position}: unintelligible token `{text}`")]
    UnintelligibleToken { text: String, position: Position },

    // Syntactic errors: the current statement is abandoned.
    #[error("{position}: unexpected {found}")]
    UnexpectedToken { found: String, position: Position },

    #[error("{position}: expected {expected} but got {found}")]
    Mismatch {
        expected: TokenKind,
        found: String,
        position: Position,
    },

    #[error("{position}: expected one of `=`, `:`, `:=` but got {found}")]
    ExpectedValueRelation { found: String, position: Position },

    #[error("{position}: expected a value but got {found}")]
    ExpectedValue { found: String, position: Position },

    #[error("{position}: missing closing brace for block opened here")]
    MissingClosingBrace { position: Position },

    #[error("{position}: nesting too deep, the limit is {limit}")]
    NestingTooDeep { limit: usize, position: Position },

    #[error("{position}: expected {expected} but reached the end of the statement")]
    UnexpectedEnd { expected: String, position: Position },

    // Setup errors.
    #[error("no source files given")]
    NoSourceFiles,

    #[error("cannot open {}: {source}", .path.display())]
    SourceOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CompileError {
    /// True for errors raised by the tokenizer.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            Self::MalformedNumber { .. }
                | Self::UnterminatedLiteral { .. }
                | Self::UnknownEscape { .. }
                | Self::UnintelligibleToken { .. }
        )
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::MalformedNumber { position, .. }
            | Self::UnterminatedLiteral { position, .. }
            | Self::UnknownEscape { position, .. }
            | Self::UnintelligibleToken { position, .. }
            | Self::UnexpectedToken { position, .. }
            | Self::Mismatch { position, .. }
            | Self::ExpectedValueRelation { position, .. }
            | Self::ExpectedValue { position, .. }
            | Self::MissingClosingBrace { position }
            | Self::NestingTooDeep { position, .. }
            | Self::UnexpectedEnd { position, .. } => Some(*position),
            Self::NoSourceFiles | Self::SourceOpen { .. } | Self::IoError { .. } => None,
        }
    }
}
