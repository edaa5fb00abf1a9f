use std::collections::HashSet;

use crate::ast::{Document, NodeId};
use crate::error::{MarkdownError, Result};
use crate::lexer::{Position, Range, Token, TokenKind};

use super::config::ParseOptions;
use super::state::ParserState;

/// Inline constructs that open with a marker and may fail to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum SpanKind {
    Bold,
    Italic,
    Code,
    Link,
}

/// A failed inline attempt: the opener's offset, what it tried to open, and
/// whether it sat inside link text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct SpanKey {
    pub offset: usize,
    pub kind: SpanKind,
    pub in_link: bool,
}

/// Recursive-descent parser over one token slice.
///
/// Nodes go straight into the shared [`Document`]. A quote parses its body
/// with a second `Parser` over a derived token slice that writes into the
/// same document.
pub(super) struct Parser<'t, 'd> {
    pub(super) state: ParserState<'t>,
    pub(super) doc: &'d mut Document,
    pub(super) options: ParseOptions,
    /// Open quotes, spans and links around the cursor.
    pub(super) depth: usize,
    /// Quote markers in front of every line of this token slice.
    pub(super) quote_depth: usize,
    pub(super) failed_spans: HashSet<SpanKey>,
}

impl<'t, 'd> Parser<'t, 'd> {
    pub fn new(
        tokens: &'t [Token],
        options: ParseOptions,
        doc: &'d mut Document,
        depth: usize,
        quote_depth: usize,
    ) -> Self {
        Self {
            state: ParserState::new(tokens),
            doc,
            options,
            depth,
            quote_depth,
            failed_spans: HashSet::new(),
        }
    }

    /// Runs `rule` and keeps its effects only if it returns `Some`.
    ///
    /// On `None` the cursor goes back to where it was and every node the rule
    /// created is dropped from the arena.
    pub fn attempt<T, F>(&mut self, rule: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut Self) -> Result<Option<T>>,
    {
        let checkpoint = self.state.checkpoint();
        let arena = self.doc.len();
        match rule(self)? {
            Some(value) => Ok(Some(value)),
            None => {
                self.state.rewind(checkpoint);
                self.doc.truncate(arena);
                Ok(None)
            }
        }
    }

    /// Runs `rule` one nesting level deeper.
    pub fn nested<T, F>(&mut self, rule: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    pub fn can_nest(&self) -> bool {
        self.depth < self.options.max_nesting_depth
    }

    /// Consumes a token of `kind`. Dispatch only calls this after checking the
    /// kind, so a mismatch is a parser defect.
    pub fn expect(&mut self, kind: TokenKind) -> Result<&'t Token> {
        let token = self.state.current();
        if token.kind != kind {
            return Err(MarkdownError::internal_error(
                token.position,
                format!("expected {kind}, found {}", token.kind),
            ));
        }
        self.state.advance();
        Ok(token)
    }

    /// Skips spaces and tabs.
    pub fn skip_blanks(&mut self) {
        while self.state.kind().is_blank() {
            self.state.advance();
        }
    }

    /// Stamps `id` with the span from `start` to the last consumed token.
    pub fn finish(&mut self, id: NodeId, start: Position) -> NodeId {
        self.doc.set_range(id, Range::new(start, self.state.last_end()));
        id
    }
}
