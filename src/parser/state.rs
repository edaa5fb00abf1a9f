use crate::lexer::{Position, Token, TokenKind};

/// ParserState keeps track of the token slice and the current cursor.
///
/// The slice always contains an end-of-stream token; the first one marks the
/// end and the cursor never moves past it. Tokens after it are ignored.
pub(super) struct ParserState<'t> {
    tokens: &'t [Token],
    offset: usize,
    end: usize,
}

impl<'t> ParserState<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        debug_assert!(tokens.iter().any(Token::is_eof));
        let end = tokens
            .iter()
            .position(Token::is_eof)
            .unwrap_or(tokens.len().saturating_sub(1));
        Self {
            tokens,
            offset: 0,
            end,
        }
    }

    pub fn current(&self) -> &'t Token {
        &self.tokens[self.offset]
    }

    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Token `n` places ahead of the cursor, clamped to the end marker.
    pub fn peek(&self, n: usize) -> &'t Token {
        &self.tokens[(self.offset + n).min(self.end)]
    }

    pub fn advance(&mut self) {
        if self.offset < self.end {
            self.offset += 1;
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.end
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn checkpoint(&self) -> usize {
        self.offset
    }

    pub fn rewind(&mut self, checkpoint: usize) {
        self.offset = checkpoint.min(self.end);
    }

    /// Position just past the last consumed token.
    pub fn last_end(&self) -> Position {
        match self.offset.checked_sub(1) {
            Some(previous) => self.tokens[previous].end(),
            None => self.current().position,
        }
    }
}
