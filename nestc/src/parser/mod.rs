pub mod lexer;
pub mod parser;
pub mod statement;
pub mod token;

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::config::CompileContext;
use crate::error::CompileResult;
use crate::ir::ast::Node;

use lexer::Tokenizer;
use parser::Parser;

/// Pulls tokens and yields one parse result per top-level statement.
///
/// A syntax error costs only the statement it occurs in; the next item
/// starts from a fresh buffer. A lexical error is yielded once and ends the
/// iteration.
pub struct Statements<R> {
    tokenizer: Tokenizer<R>,
    parser: Parser,
    done: bool,
}

impl<R: BufRead> Statements<R> {
    pub fn new(tokenizer: Tokenizer<R>, context: &CompileContext) -> Self {
        Self {
            tokenizer,
            parser: Parser::new(context),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Statements<R> {
    type Item = CompileResult<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.tokenizer.next_token() {
                Ok(Some(token)) => {
                    self.parser.consume(token);
                    if self.parser.statement_ready() {
                        return Some(self.parser.parse());
                    }
                }
                Ok(None) => {
                    self.done = true;
                    return self.parser.finish();
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Parses in-memory source text into per-statement results.
pub fn parse_source(source: &str, context: &CompileContext) -> Vec<CompileResult<Node>> {
    Statements::new(Tokenizer::from_source(source), context).collect()
}

/// Opens the first source file of `context` and returns its statements.
#[tracing::instrument(skip_all, fields(source = ?context.primary_source()))]
pub fn parse_file(context: &CompileContext) -> CompileResult<Statements<BufReader<File>>> {
    let tokenizer = Tokenizer::open(context)?;
    Ok(Statements::new(tokenizer, context))
}
