use std::fmt;

use super::position::{Position, Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed vocabulary of token classes shared by the lexer, the parser and
/// anything that inspects a token stream.
///
/// The `as_str` identifiers are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    /// Run of one to six `#`.
    HeadingMark,
    /// `**`
    BoldMark,
    /// `*`
    ItalicMark,
    /// A whole fenced block, from the opening to the closing fence.
    CodeBlockMark,
    /// Backtick run that is not a fence.
    Backtick,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Bang,
    GreaterThan,
    /// One or two `-`.
    Minus,
    Dot,
    /// Run of ASCII digits.
    Digit,
    /// Run of spaces.
    Whitespace,
    /// A single tab.
    Tab,
    Newline,
    /// Three or more `-`.
    HorizontalRule,
    /// List marker at the start of a line, including a task box if present.
    ListItem,
    /// Maximal run of characters with no dedicated rule.
    Text,
    /// Zero-length end-of-stream marker.
    Eof,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::HeadingMark => "heading_mark",
            TokenKind::BoldMark => "bold_mark",
            TokenKind::ItalicMark => "italic_mark",
            TokenKind::CodeBlockMark => "code_block_mark",
            TokenKind::Backtick => "backtick",
            TokenKind::LeftBracket => "left_bracket",
            TokenKind::RightBracket => "right_bracket",
            TokenKind::LeftParen => "left_paren",
            TokenKind::RightParen => "right_paren",
            TokenKind::Bang => "bang",
            TokenKind::GreaterThan => "greater_than",
            TokenKind::Minus => "minus",
            TokenKind::Dot => "dot",
            TokenKind::Digit => "digit",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Tab => "tab",
            TokenKind::Newline => "newline",
            TokenKind::HorizontalRule => "horizontal_rule",
            TokenKind::ListItem => "list_item",
            TokenKind::Text => "text",
            TokenKind::Eof => "eof",
        }
    }

    /// Tokens that open a block when they appear at the start of a line.
    pub fn starts_block(self) -> bool {
        matches!(
            self,
            TokenKind::HeadingMark
                | TokenKind::CodeBlockMark
                | TokenKind::GreaterThan
                | TokenKind::HorizontalRule
                | TokenKind::ListItem
        )
    }

    /// Indentation tokens.
    pub fn is_blank(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Tab)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, positioned fragment of the normalized input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub position: Position,
    /// Length of `literal` in Unicode scalar values.
    pub length: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, position: Position) -> Self {
        let literal = literal.into();
        let length = literal.chars().count();
        Self {
            kind,
            literal,
            position,
            length,
        }
    }

    /// The end-of-stream marker at `position`.
    pub fn eof(position: Position) -> Self {
        Self {
            kind: TokenKind::Eof,
            literal: String::new(),
            position,
            length: 0,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Position just past the last character of the literal.
    pub fn end(&self) -> Position {
        self.position.advanced_by(&self.literal)
    }

    pub fn range(&self) -> Range {
        Range::new(self.position, self.end())
    }
}
