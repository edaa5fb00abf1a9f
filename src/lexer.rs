//! Lexical analysis module for tokenizing Markdown input.
//!
//! This module provides the [`Lexer`] cursor and the [`tokenize`] entry point
//! that break Markdown text into the flat token sequence consumed by the
//! parser. Tokenization is total: every input, including the empty string,
//! produces a sequence that ends with a single [`TokenKind::Eof`].
use std::borrow::Cow;

use tracing::trace;

mod cursor;
mod position;
mod rules;
mod token;

pub use cursor::Lexer;
pub use position::{Position, Range};
pub use token::{Token, TokenKind};

/// Converts CR LF pairs and lone CRs to LF.
pub fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if input.contains('\r') {
        Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Tokenizes `input` into a materialized token sequence.
///
/// Newlines are normalized first, so positions refer to the normalized text.
/// Concatenating the literals of every token reproduces that text.
pub fn tokenize(input: &str) -> Vec<Token> {
    let source = normalize_newlines(input);
    let tokens: Vec<Token> = Lexer::new(&source).collect();
    trace!(
        chars = source.chars().count(),
        tokens = tokens.len(),
        "tokenized input"
    );
    tokens
}
