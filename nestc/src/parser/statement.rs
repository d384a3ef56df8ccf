//! Groups tokens into complete top-level statements.

use super::token::{Token, TokenKind};

/// Buffer of the tokens of the statement being collected.
///
/// A statement is complete at a semicolon consumed while no brace, paren or
/// bracket is open, or at the `}` that closes a statement starting with `{`.
#[derive(Debug, Default)]
pub struct StatementBuffer {
    tokens: Vec<Token>,
    depth: usize,
    ready: bool,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consume(&mut self, token: Token) {
        let kind = token.kind();
        self.tokens.push(token);

        if kind.opens_group() {
            self.depth += 1;
        } else if kind.closes_group() {
            self.depth = self.depth.saturating_sub(1);
            if kind == TokenKind::RBrace && self.depth == 0 && self.starts_with_block() {
                self.ready = true;
            }
        } else if kind == TokenKind::Semicolon && self.depth == 0 {
            self.ready = true;
        }
    }

    pub fn statement_ready(&self) -> bool {
        self.ready
    }

    /// Currently open brace/paren/bracket scopes.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
        self.depth = 0;
        self.ready = false;
    }

    fn starts_with_block(&self) -> bool {
        self.tokens
            .first()
            .is_some_and(|token| token.kind() == TokenKind::LBrace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use proptest::prelude::*;

    fn token(kind: TokenKind) -> Token {
        match kind {
            TokenKind::Identifier => Token::identifier("x", Position::default()),
            kind => Token::new(kind, Position::default()),
        }
    }

    fn feed(buffer: &mut StatementBuffer, kinds: &[TokenKind]) -> Vec<bool> {
        kinds
            .iter()
            .map(|kind| {
                buffer.consume(token(*kind));
                buffer.statement_ready()
            })
            .collect()
    }

    #[test]
    fn ready_at_top_level_semicolon() {
        use TokenKind::*;
        let mut buffer = StatementBuffer::new();
        assert_eq!(
            feed(&mut buffer, &[Define, Identifier, Semicolon]),
            [false, false, true]
        );
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn nested_semicolons_do_not_end_the_statement() {
        use TokenKind::*;
        let mut buffer = StatementBuffer::new();
        let ready = feed(
            &mut buffer,
            &[Define, Identifier, Assign, LParen, Semicolon, LBracket, Semicolon, RBracket, RParen, Semicolon],
        );
        assert_eq!(ready.iter().position(|r| *r), Some(9));
        assert_eq!(buffer.depth(), 0);
    }

    #[test]
    fn closing_a_leading_block_ends_the_statement() {
        use TokenKind::*;
        let mut buffer = StatementBuffer::new();
        let ready = feed(
            &mut buffer,
            &[LBrace, New, Identifier, Semicolon, LBrace, RBrace, RBrace],
        );
        assert_eq!(ready, [false, false, false, false, false, false, true]);
    }

    #[test]
    fn braced_value_does_not_end_the_statement() {
        use TokenKind::*;
        let mut buffer = StatementBuffer::new();
        let ready = feed(&mut buffer, &[Define, Identifier, Assign, LBrace, RBrace]);
        assert!(ready.iter().all(|r| !r));
    }

    #[test]
    fn clear_resets_everything() {
        use TokenKind::*;
        let mut buffer = StatementBuffer::new();
        feed(&mut buffer, &[LBrace, LBrace, Semicolon]);
        assert_eq!(buffer.depth(), 2);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.depth(), 0);
        assert!(!buffer.statement_ready());
    }

    proptest! {
        #[test]
        fn prop_ready_only_at_depth_zero(
            kinds in prop::collection::vec(
                prop::sample::select(vec![
                    TokenKind::LBrace,
                    TokenKind::RBrace,
                    TokenKind::LParen,
                    TokenKind::RParen,
                    TokenKind::Semicolon,
                    TokenKind::Identifier,
                ]),
                1..40,
            )
        ) {
            let mut buffer = StatementBuffer::new();
            let mut depth = 0usize;
            let mut expected = false;
            for kind in kinds.iter().copied() {
                match kind {
                    TokenKind::LBrace | TokenKind::LParen => depth += 1,
                    TokenKind::RBrace | TokenKind::RParen => {
                        depth = depth.saturating_sub(1);
                        if kind == TokenKind::RBrace && depth == 0 && kinds[0] == TokenKind::LBrace {
                            expected = true;
                        }
                    }
                    TokenKind::Semicolon if depth == 0 => expected = true,
                    _ => {}
                }
                buffer.consume(token(kind));
                prop_assert_eq!(buffer.statement_ready(), expected);
                prop_assert_eq!(buffer.depth(), depth);
            }
        }
    }
}
