//! Front end of the nest statement language: tokenizer, statement
//! accumulator and recursive-descent parser producing an owned AST.

pub mod config;
pub mod error;
pub mod ir;
pub mod parser;
pub mod position;

pub use config::CompileContext;
pub use error::{CompileError, CompileResult};
pub use ir::ast::Node;
pub use parser::lexer::Tokenizer;
pub use parser::parser::Parser;
pub use parser::token::{Token, TokenKind};
pub use parser::{Statements, parse_file, parse_source};
pub use position::Position;
