use super::position::Position;
use super::rules;
use super::token::{Token, TokenKind};

/// Single-pass lexer over newline-normalized input.
///
/// The cursor owns the remaining input slice and the running [`Position`].
/// Each call to [`Lexer::next_token`] runs the scanning rules in `rules.rs`
/// against the remaining input and stamps the token with the position where
/// its literal starts:
///
/// ```text
/// normalized source ➜ cursor (position + line-start state) ➜ rules (nom) ➜ tokens
/// ```
///
/// List item markers are only recognized while the cursor is at the start of
/// a line (after nothing but indentation and quote markers). The cursor also
/// remembers whether the current line opened with a quote marker, since only
/// then may a fence's closing line carry quote markers.
#[derive(Debug, Clone)]
pub struct Lexer<'input> {
    rest: &'input str,
    position: Position,
    line_start: bool,
    line_quoted: bool,
    finished: bool,
}

impl<'input> Lexer<'input> {
    /// Creates a lexer over `input`, which must already be newline-normalized.
    pub fn new(input: &'input str) -> Self {
        Self {
            rest: input,
            position: Position::new(),
            line_start: true,
            line_quoted: false,
            finished: false,
        }
    }

    /// Returns the position of the next token.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.rest.is_empty()
    }

    /// Consumes and returns the next token. Once the input is exhausted every
    /// call returns an end-of-stream token.
    pub fn next_token(&mut self) -> Token {
        if self.rest.is_empty() {
            return Token::eof(self.position);
        }

        let (kind, literal) = self.scan_token();
        let token = Token::new(kind, literal, self.position);

        self.position = self.position.advanced_by(literal);
        self.rest = &self.rest[literal.len()..];
        self.line_quoted = match kind {
            TokenKind::Newline => false,
            TokenKind::GreaterThan => self.line_quoted || self.line_start,
            _ => self.line_quoted,
        };
        self.line_start = match kind {
            TokenKind::Newline => true,
            TokenKind::Whitespace | TokenKind::Tab | TokenKind::GreaterThan => self.line_start,
            _ => false,
        };

        token
    }

    /// Peeks at the next token without consuming it.
    pub fn peek_token(&self) -> Token {
        self.clone().next_token()
    }

    fn scan_token(&self) -> (TokenKind, &'input str) {
        let rest = self.rest;

        if self.line_start {
            if let Ok((_, literal)) = rules::list_item(rest) {
                return (TokenKind::ListItem, literal);
            }
        }

        match rules::token(rest, self.line_quoted) {
            Ok((_, scanned)) => scanned,
            // Every character belongs to some rule, so this only guards
            // against a rule set that stops covering one.
            Err(_) => {
                let width = rest.chars().next().map_or(rest.len(), char::len_utf8);
                (TokenKind::Text, &rest[..width])
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token including the final end-of-stream marker, then `None`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.finished = true;
        }
        Some(token)
    }
}
