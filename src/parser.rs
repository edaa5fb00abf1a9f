//! Recursive-descent parser from tokens to a [`Document`].
//!
//! Parsing never fails on user input: anything that does not form a complete
//! construct degrades to literal text. Backtracking goes through
//! `Parser::attempt`, which restores the cursor and drops the nodes a failed
//! rule created.
mod block;
mod config;
mod core;
mod inline;
mod state;

#[cfg(test)]
mod tests;

use std::borrow::Cow;

use tracing::debug;

pub use config::{ParseOptions, ParseOptionsBuilder};

use crate::ast::Document;
use crate::error::Result;
use crate::lexer::{Position, Token};

use self::core::Parser;

/// Parses `tokens` into a document.
///
/// # Panics
///
/// Panics if the parser detects an internal inconsistency. That only happens
/// on a parser defect; use [`try_parse`] to get it as an error instead.
pub fn parse(tokens: &[Token], options: &ParseOptions) -> Document {
    match try_parse(tokens, options) {
        Ok(document) => document,
        Err(error) => panic!("{error}"),
    }
}

/// Parses `tokens` into a document, reporting internal inconsistencies.
///
/// A token slice without an end-of-stream token gets one appended.
pub fn try_parse(tokens: &[Token], options: &ParseOptions) -> Result<Document> {
    let tokens = with_eof(tokens);
    debug!(tokens = tokens.len(), "parsing token stream");

    let mut document = Document::new();
    let blocks = Parser::new(&tokens, *options, &mut document, 0, 0).parse_blocks()?;
    document.document(blocks, Position::new());

    debug!(
        nodes = document.len(),
        blocks = document.children(document.root()).len(),
        "parsed document"
    );
    Ok(document)
}

fn with_eof(tokens: &[Token]) -> Cow<'_, [Token]> {
    if tokens.iter().any(Token::is_eof) {
        return Cow::Borrowed(tokens);
    }
    let end = tokens.last().map_or_else(Position::new, Token::end);
    let mut owned = tokens.to_vec();
    owned.push(Token::eof(end));
    Cow::Owned(owned)
}
