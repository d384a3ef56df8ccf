use crate::config::CompileContext;
use crate::error::{CompileError, CompileResult};
use crate::ir::ast::{self, Node, SetKind, Variable};

use super::statement::StatementBuffer;
use super::token::{Literal, Token, TokenKind};

/// Recursive-descent parser over one buffered statement.
///
/// Tokens are collected with [`Parser::consume`] until
/// [`Parser::statement_ready`], then [`Parser::parse`] turns the buffer into a
/// single [`Node`]. Nested blocks are parsed in place over the same buffer;
/// `nest_level` tracks how many blocks are open.
pub struct Parser {
    buffer: StatementBuffer,
    position: usize,
    nest_level: usize,
    max_nesting: usize,
}

impl Parser {
    pub fn new(context: &CompileContext) -> Self {
        Self::with_max_nesting(context.max_nesting)
    }

    pub fn with_max_nesting(max_nesting: usize) -> Self {
        Self {
            buffer: StatementBuffer::new(),
            position: 0,
            nest_level: 0,
            max_nesting,
        }
    }

    pub fn consume(&mut self, token: Token) {
        self.buffer.consume(token);
    }

    pub fn statement_ready(&self) -> bool {
        self.buffer.statement_ready()
    }

    /// True while tokens of an unfinished statement are buffered.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Parses the buffered statement and resets the parser, whatever the outcome.
    #[tracing::instrument(skip_all, fields(token_count = self.buffer.len()))]
    pub fn parse(&mut self) -> CompileResult<Node> {
        let result = self.parse_buffered();
        match &result {
            Ok(node) => tracing::debug!(kind = node.kind_name(), "statement parsed"),
            Err(err) => tracing::debug!(%err, "statement abandoned"),
        }
        self.reset();
        result
    }

    /// Parses whatever is left at the end of input, `None` if nothing is buffered.
    pub fn finish(&mut self) -> Option<CompileResult<Node>> {
        self.has_pending().then(|| self.parse())
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.position = 0;
        self.nest_level = 0;
    }

    fn parse_buffered(&mut self) -> CompileResult<Node> {
        let node = self.parse_statement()?;
        if let Some(token) = self.current() {
            return Err(CompileError::UnexpectedToken {
                found: token.describe(),
                position: token.position(),
            });
        }
        Ok(node)
    }

    fn parse_statement(&mut self) -> CompileResult<Node> {
        let Some(token) = self.current() else {
            return Err(self.unexpected_end("a statement"));
        };
        match token.kind() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(Node::Empty)
            }
            TokenKind::Define | TokenKind::New => self.parse_variable(),
            TokenKind::LBrace => self.parse_block(),
            _ => Err(CompileError::UnexpectedToken {
                found: token.describe(),
                position: token.position(),
            }),
        }
    }

    // define|new name ;
    // define|new name (= | : | :=) value ;
    fn parse_variable(&mut self) -> CompileResult<Node> {
        let specifier = self.advance().ok_or_else(|| self.unexpected_end("`define` or `new`"))?;
        let is_runtime = specifier.kind() == TokenKind::New;

        let identifier = self.expect(TokenKind::Identifier)?;
        let name = identifier.name().unwrap_or_default().to_string();

        let relation = match self.current() {
            Some(token) if token.kind() == TokenKind::Semicolon => {
                self.advance();
                return Ok(Node::VarDeclaration(Variable::declaration(name, is_runtime)));
            }
            Some(token)
                if matches!(
                    token.kind(),
                    TokenKind::Assign | TokenKind::Allocate | TokenKind::Reference
                ) =>
            {
                token.kind()
            }
            Some(token) => {
                return Err(CompileError::ExpectedValueRelation {
                    found: token.describe(),
                    position: token.position(),
                });
            }
            None => return Err(self.unexpected_end("one of `=`, `:`, `:=`")),
        };
        self.advance();

        let value = self.parse_rvalue(relation)?;
        self.expect(TokenKind::Semicolon)?;

        let variable = Variable::with_value(name, is_runtime, value);
        Ok(match relation {
            TokenKind::Assign => Node::VarDefinition(variable),
            TokenKind::Allocate => Node::VarAllocation(variable),
            _ => Node::VarReference(variable),
        })
    }

    fn parse_block(&mut self) -> CompileResult<Node> {
        let open = self.expect(TokenKind::LBrace)?;
        self.nest_level += 1;
        if self.nest_level > self.max_nesting {
            return Err(CompileError::NestingTooDeep {
                limit: self.max_nesting,
                position: open.position(),
            });
        }

        let mut block = ast::Block::default();
        loop {
            match self.current().map(Token::kind) {
                None => {
                    return Err(CompileError::MissingClosingBrace {
                        position: open.position(),
                    });
                }
                Some(TokenKind::RBrace) => {
                    self.advance();
                    self.nest_level -= 1;
                    break;
                }
                Some(_) => block.statements.push(self.parse_statement()?),
            }
        }
        Ok(Node::Block(block))
    }

    /// Value on the right of `=`, `:` or `:=`. An allocation may leave it out.
    fn parse_rvalue(&mut self, relation: TokenKind) -> CompileResult<Option<Node>> {
        let Some(token) = self.current() else {
            return Err(self.unexpected_end("a value"));
        };
        match token.kind() {
            TokenKind::Semicolon if relation == TokenKind::Allocate => Ok(None),
            TokenKind::LBrace => self.parse_set(SetKind::Literal).map(Some),
            TokenKind::LParen => self.parse_set(SetKind::Value).map(Some),
            TokenKind::Identifier => {
                let name = token.name().unwrap_or_default().to_string();
                self.advance();
                Ok(Some(Node::Lvalue(name)))
            }
            _ => self.parse_literal().map(|value| Some(Node::Literal(value))),
        }
    }

    fn parse_set(&mut self, kind: SetKind) -> CompileResult<Node> {
        let close = match kind {
            SetKind::Literal => TokenKind::RBrace,
            SetKind::Value => TokenKind::RParen,
        };
        self.advance();

        let mut elements = Vec::new();
        if self.current().map(Token::kind) == Some(close) {
            self.advance();
            return Ok(Node::Set(ast::Set { kind, elements }));
        }
        loop {
            elements.push(self.parse_literal()?);
            match self.current() {
                Some(token) if token.kind() == TokenKind::Comma => {
                    self.advance();
                }
                Some(token) if token.kind() == close => {
                    self.advance();
                    break;
                }
                Some(token) => {
                    return Err(CompileError::Mismatch {
                        expected: close,
                        found: token.describe(),
                        position: token.position(),
                    });
                }
                None => return Err(self.unexpected_end(&close.to_string())),
            }
        }
        Ok(Node::Set(ast::Set { kind, elements }))
    }

    fn parse_literal(&mut self) -> CompileResult<ast::Value> {
        let Some(token) = self.current() else {
            return Err(self.unexpected_end("a value"));
        };
        let value = match (token.kind(), token.literal()) {
            (TokenKind::Integer, Some(Literal::Integer(value))) => ast::Value::Integer(*value),
            (TokenKind::Double, Some(Literal::Double(value))) => ast::Value::Double(*value),
            (TokenKind::Char, Some(Literal::Char(value))) => ast::Value::Char(*value),
            (TokenKind::String, Some(Literal::String(value))) => ast::Value::String(value.clone()),
            (TokenKind::Undefined, _) => ast::Value::Undefined,
            (TokenKind::Nan, _) => ast::Value::Nan,
            (TokenKind::Null, _) => ast::Value::Null,
            _ => {
                return Err(CompileError::ExpectedValue {
                    found: token.describe(),
                    position: token.position(),
                });
            }
        };
        self.advance();
        Ok(value)
    }

    // Helpers

    fn current(&self) -> Option<&Token> {
        self.buffer.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.buffer.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected: TokenKind) -> CompileResult<Token> {
        match self.current() {
            Some(token) if token.kind() == expected => self
                .advance()
                .ok_or_else(|| self.unexpected_end(&expected.to_string())),
            Some(token) => Err(CompileError::Mismatch {
                expected,
                found: token.describe(),
                position: token.position(),
            }),
            None => Err(self.unexpected_end(&expected.to_string())),
        }
    }

    fn unexpected_end(&self, expected: &str) -> CompileError {
        CompileError::UnexpectedEnd {
            expected: expected.to_string(),
            position: self.buffer.last().map(Token::position).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ast::{Block, Set, Value};
    use crate::parser::lexer::Tokenizer;
    use crate::position::Position;

    fn parser_with(source: &str, max_nesting: usize) -> Parser {
        let mut parser = Parser::with_max_nesting(max_nesting);
        for token in Tokenizer::from_source(source) {
            parser.consume(token.unwrap());
        }
        parser
    }

    fn parse_one(source: &str) -> CompileResult<Node> {
        let mut parser = parser_with(source, 500);
        assert!(parser.statement_ready(), "statement not complete: {source}");
        parser.parse()
    }

    fn variable(node: &Node) -> &Variable {
        node.variable().expect("variable node")
    }

    #[test]
    fn test_declaration() {
        let node = parse_one("define x;").unwrap();
        assert!(matches!(node, Node::VarDeclaration(_)));
        let var = variable(&node);
        assert_eq!(var.name, "x");
        assert!(!var.is_runtime);
        assert!(var.is_declaration_only);
        assert!(var.value.is_none());
    }

    #[test]
    fn test_runtime_definition() {
        let node = parse_one("new y = 5;").unwrap();
        assert!(matches!(node, Node::VarDefinition(_)));
        let var = variable(&node);
        assert_eq!(var.name, "y");
        assert!(var.is_runtime);
        assert!(var.is_declaration_only);
        assert_eq!(var.value.as_deref(), Some(&Node::Literal(Value::Integer(5))));
    }

    #[test]
    fn test_value_relations() {
        let node = parse_one("define r := other;").unwrap();
        assert!(matches!(node, Node::VarReference(_)));
        assert_eq!(variable(&node).value.as_deref(), Some(&Node::Lvalue("other".into())));

        let node = parse_one("new buf: 16;").unwrap();
        assert!(matches!(node, Node::VarAllocation(_)));

        let node = parse_one("new buf: ;").unwrap();
        assert!(matches!(node, Node::VarAllocation(ref var) if var.value.is_none()));
    }

    #[test]
    fn test_literal_values() {
        for (source, expected) in [
            ("define d = 2.5;", Value::Double(2.5)),
            ("define c = 'c';", Value::Char('c')),
            ("define s = \"text\";", Value::String("text".into())),
            ("define u = undefined;", Value::Undefined),
            ("define n = nan;", Value::Nan),
            ("define p = null;", Value::Null),
        ] {
            let node = parse_one(source).unwrap();
            assert_eq!(variable(&node).value.as_deref(), Some(&Node::Literal(expected)), "{source}");
        }
    }

    #[test]
    fn test_sets() {
        let node = parse_one("define s = {1, 2.5, 'x'};").unwrap();
        assert_eq!(
            variable(&node).value.as_deref(),
            Some(&Node::Set(Set {
                kind: SetKind::Literal,
                elements: vec![Value::Integer(1), Value::Double(2.5), Value::Char('x')],
            }))
        );

        let node = parse_one("new t = ();").unwrap();
        assert_eq!(
            variable(&node).value.as_deref(),
            Some(&Node::Set(Set {
                kind: SetKind::Value,
                elements: vec![],
            }))
        );
    }

    #[test]
    fn test_set_with_wrong_closer() {
        let err = parse_one("define s = (1, 2};").unwrap_err();
        assert!(matches!(err, CompileError::Mismatch { expected: TokenKind::RParen, .. }));
    }

    #[test]
    fn test_empty_statement() {
        assert_eq!(parse_one(";").unwrap(), Node::Empty);
    }

    #[test]
    fn test_nested_block() {
        let node = parse_one("{ new a: ; { new b = 1; } }").unwrap();
        let Node::Block(outer) = node else {
            panic!("expected block");
        };
        assert_eq!(outer.statements.len(), 2);
        assert!(matches!(&outer.statements[0], Node::VarAllocation(var) if var.name == "a"));
        let Node::Block(inner) = &outer.statements[1] else {
            panic!("expected inner block");
        };
        assert_eq!(inner.statements.len(), 1);
        assert!(matches!(&inner.statements[0], Node::VarDefinition(var) if var.name == "b"));
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(parse_one("{}").unwrap(), Node::Block(Block::default()));
    }

    #[test]
    fn test_missing_identifier() {
        let err = parse_one("define = 5;").unwrap_err();
        assert_eq!(err.to_string(), "1:8: expected identifier but got `=`");
    }

    #[test]
    fn test_wrong_value_relation() {
        let err = parse_one("define x == 5;").unwrap_err();
        assert_eq!(
            err.to_string(),
            "1:11: expected one of `=`, `:`, `:=` but got `==`"
        );
    }

    #[test]
    fn test_definition_needs_a_value() {
        let err = parse_one("define x = ;").unwrap_err();
        assert!(matches!(err, CompileError::ExpectedValue { .. }));
    }

    #[test]
    fn test_missing_semicolon_after_value() {
        let err = parse_one("define x = 5 6;").unwrap_err();
        assert_eq!(err.to_string(), "1:14: expected `;` but got integer `6`");
    }

    #[test]
    fn test_unexpected_statement_start() {
        let err = parse_one("x = 5;").unwrap_err();
        assert!(matches!(err, CompileError::UnexpectedToken { ref found, .. } if found == "identifier `x`"));
    }

    #[test]
    fn test_missing_closing_brace() {
        let mut parser = parser_with("{ define x;\n  new y;", 500);
        assert!(!parser.statement_ready());
        let err = parser.finish().unwrap().unwrap_err();
        match err {
            CompileError::MissingClosingBrace { position } => assert_eq!(position, Position::new(1, 1)),
            other => panic!("expected missing brace, got {other:?}"),
        }
        assert!(!parser.has_pending());
        assert!(parser.finish().is_none());
    }

    #[test]
    fn test_nesting_limit() {
        let source = format!("{}{}", "{".repeat(4), "}".repeat(4));
        assert!(parser_with(&source, 4).parse().is_ok());

        let source = format!("{}{}", "{".repeat(5), "}".repeat(5));
        let err = parser_with(&source, 4).parse().unwrap_err();
        match err {
            CompileError::NestingTooDeep { limit, position } => {
                assert_eq!(limit, 4);
                assert_eq!(position, Position::new(1, 5));
            }
            other => panic!("expected nesting error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_nesting_limit() {
        let context = CompileContext::default();
        let parse_depth = |depth: usize| {
            let mut parser = Parser::new(&context);
            let source = format!("{} new x; {}", "{".repeat(depth), "}".repeat(depth));
            for token in Tokenizer::from_source(&source) {
                parser.consume(token.unwrap());
            }
            parser.parse()
        };
        assert!(parse_depth(500).is_ok());
        assert!(matches!(
            parse_depth(501).unwrap_err(),
            CompileError::NestingTooDeep { limit: 500, .. }
        ));
    }

    #[test]
    fn test_parser_is_reusable_after_failure() {
        let mut parser = parser_with("define = ;", 500);
        assert!(parser.parse().is_err());
        assert!(!parser.statement_ready());
        assert!(!parser.has_pending());

        for token in Tokenizer::from_source("define ok;") {
            parser.consume(token.unwrap());
        }
        assert!(matches!(parser.parse(), Ok(Node::VarDeclaration(_))));
    }
}
