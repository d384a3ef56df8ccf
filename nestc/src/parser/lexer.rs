//! Line-based tokenizer with one token of lookahead.
//!
//! The tokenizer owns its reader and pulls one physical line at a time. Each
//! call to [`Tokenizer::next_token`] skips whitespace, classifies the first
//! remaining character and consumes exactly the characters of one token.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::config::CompileContext;
use crate::error::{CompileError, CompileResult};
use crate::position::Position;

use super::token::{Token, TokenKind, longest_operator};

pub struct Tokenizer<R> {
    reader: R,
    line: Vec<char>,
    at_line: usize,
    at_column: usize,
    peeked: Option<Option<Token>>,
    failed: bool,
}

impl Tokenizer<BufReader<File>> {
    /// Opens the first source file of `context`.
    pub fn open(context: &CompileContext) -> CompileResult<Self> {
        let path = context.primary_source().ok_or(CompileError::NoSourceFiles)?;
        if context.source_files.len() > 1 {
            tracing::warn!(
                ignored = context.source_files.len() - 1,
                "only the first source file is tokenized"
            );
        }
        let file = File::open(path).map_err(|source| CompileError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened source");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<'a> Tokenizer<&'a [u8]> {
    pub fn from_source(source: &'a str) -> Self {
        Self::new(source.as_bytes())
    }
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            at_line: 0,
            at_column: 0,
            peeked: None,
            failed: false,
        }
    }

    /// Returns the next token, or `None` at the end of input.
    pub fn next_token(&mut self) -> CompileResult<Option<Token>> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.tokenize_at_position()
    }

    /// Returns the token `next_token` will return, without consuming it.
    pub fn peek_token(&mut self) -> CompileResult<Option<Token>> {
        if self.peeked.is_none() {
            let token = self.tokenize_at_position()?;
            self.peeked = Some(token);
        }
        Ok(self.peeked.clone().flatten())
    }

    /// Number of physical lines read so far.
    pub fn line_number(&self) -> usize {
        self.at_line
    }

    fn cursor(&self) -> Position {
        Position::new(self.at_line, self.at_column)
    }

    fn rest(&self) -> &[char] {
        &self.line[self.at_column..]
    }

    fn read_line(&mut self) -> CompileResult<bool> {
        let mut buffer = String::new();
        if self.reader.read_line(&mut buffer)? == 0 {
            return Ok(false);
        }
        self.line = buffer.trim_end_matches(['\n', '\r']).chars().collect();
        self.at_line += 1;
        self.at_column = 0;
        tracing::debug!(line = self.at_line, "read source line");
        Ok(true)
    }

    fn tokenize_at_position(&mut self) -> CompileResult<Option<Token>> {
        loop {
            while self.at_column < self.line.len() && self.line[self.at_column].is_whitespace() {
                self.at_column += 1;
            }
            if self.at_column < self.line.len() {
                break;
            }
            if !self.read_line()? {
                return Ok(None);
            }
        }

        let ch = self.line[self.at_column];
        let token = if ch.is_ascii_alphabetic() || ch == '_' {
            self.lex_identifier_or_keyword()
        } else if ch.is_ascii_digit() {
            self.lex_number()?
        } else if ch == '\'' {
            self.lex_quoted('\'')?
        } else if ch == '"' {
            self.lex_quoted('"')?
        } else {
            self.lex_operator()?
        };
        tracing::trace!(position = %token.position(), kind = ?token.kind(), "token");
        Ok(Some(token))
    }

    fn lex_identifier_or_keyword(&mut self) -> Token {
        let count = self
            .rest()
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
            .count();
        let text: String = self.rest()[..count].iter().collect();
        self.at_column += count;

        match TokenKind::keyword(&text) {
            Some(kind) => Token::new(kind, self.cursor()),
            None => Token::identifier(text, self.cursor()),
        }
    }

    fn lex_number(&mut self) -> CompileResult<Token> {
        let rest = self.rest();
        let whole = count_digits(rest, 0);
        let (length, is_double) = if rest.get(whole) == Some(&'.') {
            (whole + 1 + count_digits(rest, whole + 1), true)
        } else {
            (whole, false)
        };
        // A second `.` makes the whole dotted run malformed.
        let trailing = match rest.get(length) {
            Some(&'.') => rest[length..]
                .iter()
                .take_while(|c| c.is_ascii_digit() || **c == '.')
                .count(),
            _ => 0,
        };
        let text: String = rest[..length + trailing].iter().collect();

        self.at_column += length + trailing;
        let position = self.cursor();
        if trailing > 0 {
            return Err(CompileError::MalformedNumber {
                text,
                reason: "unexpected characters after the literal".to_string(),
                position,
            });
        }

        let malformed = |reason: String| CompileError::MalformedNumber {
            text: text.clone(),
            reason,
            position,
        };
        if is_double {
            let value = text.parse::<f64>().map_err(|err| malformed(err.to_string()))?;
            Ok(Token::double(value, position))
        } else {
            let value = text.parse::<i64>().map_err(|err| malformed(err.to_string()))?;
            Ok(Token::integer(value, position))
        }
    }

    /// Scans a literal delimited by `quote`. Single quotes yield a `Char`
    /// when the decoded text is one character long.
    fn lex_quoted(&mut self, quote: char) -> CompileResult<Token> {
        let rest = self.rest();
        let mut escaped = false;
        let mut close = None;
        for (index, &c) in rest.iter().enumerate().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                close = Some(index);
                break;
            }
        }

        let Some(close) = close else {
            let length = rest.len();
            self.at_column += length;
            return Err(CompileError::UnterminatedLiteral {
                quote,
                position: self.cursor(),
            });
        };

        let inner: String = rest[1..close].iter().collect();
        self.at_column += close + 1;
        let position = self.cursor();
        let text = unescape(&inner, position)?;

        if quote == '\'' {
            let mut chars = text.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(Token::char(c, position));
            }
        }
        Ok(Token::string(text, position))
    }

    /// Longest operator spelling that prefixes the current non-whitespace run.
    fn lex_operator(&mut self) -> CompileResult<Token> {
        let rest = self.rest();
        let window = rest
            .iter()
            .take(longest_operator())
            .take_while(|c| !c.is_whitespace())
            .count();

        let matched = (1..=window).rev().find_map(|length| {
            let candidate: String = rest[..length].iter().collect();
            TokenKind::operator(&candidate).map(|kind| (length, kind))
        });

        match matched {
            Some((length, kind)) => {
                self.at_column += length;
                Ok(Token::new(kind, self.cursor()))
            }
            None => {
                let run = rest.iter().take_while(|c| !c.is_whitespace()).count();
                let text: String = rest[..run].iter().collect();
                self.at_column += run;
                Err(CompileError::UnintelligibleToken {
                    text,
                    position: self.cursor(),
                })
            }
        }
    }
}

impl<R: BufRead> Iterator for Tokenizer<R> {
    type Item = CompileResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_token().transpose();
        self.failed = matches!(item, Some(Err(_)));
        item
    }
}

fn count_digits(chars: &[char], from: usize) -> usize {
    chars
        .get(from..)
        .map_or(0, |tail| tail.iter().take_while(|c| c.is_ascii_digit()).count())
}

#[derive(Clone, Copy)]
enum EscapeState {
    Plain,
    Escape,
}

/// Decodes backslash escapes in the text between two quotes.
fn unescape(input: &str, position: Position) -> CompileResult<String> {
    let mut decoded = String::with_capacity(input.len());
    let mut state = EscapeState::Plain;

    for ch in input.chars() {
        match state {
            EscapeState::Plain if ch == '\\' => state = EscapeState::Escape,
            EscapeState::Plain => decoded.push(ch),
            EscapeState::Escape => {
                decoded.push(match ch {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '\'' => '\'',
                    '"' => '"',
                    '?' => '?',
                    'a' => '\u{7}',
                    'b' => '\u{8}',
                    'v' => '\u{b}',
                    'f' => '\u{c}',
                    '0' => '\0',
                    other => {
                        return Err(CompileError::UnknownEscape {
                            sequence: format!("\\{other}"),
                            position,
                        });
                    }
                });
                state = EscapeState::Plain;
            }
        }
    }

    match state {
        EscapeState::Plain => Ok(decoded),
        EscapeState::Escape => Err(CompileError::UnknownEscape {
            sequence: "\\".to_string(),
            position,
        }),
    }
}
