use tracing::{debug, trace};

use crate::ast::{Document, NodeId};
use crate::error::Result;
use crate::lexer::{Position, Range, Token, TokenKind};

use super::core::{Parser, SpanKey, SpanKind};

/// Where an inline run sits: inside link text, inside which span, and
/// whether the run belongs to a paragraph that any block marker ends.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct InlineContext {
    pub in_link: bool,
    pub closer: Option<TokenKind>,
    pub stops_at_blocks: bool,
}

impl InlineContext {
    /// Context of a paragraph line or list item content.
    pub(super) fn paragraph() -> Self {
        Self {
            stops_at_blocks: true,
            ..Self::default()
        }
    }

    fn within(self, kind: SpanKind) -> Self {
        Self {
            closer: Some(kind.marker()),
            ..self
        }
    }

    fn link_text(self) -> Self {
        Self {
            in_link: true,
            closer: None,
            ..self
        }
    }

    /// A block marker the enclosing paragraph must hand back to the block
    /// parser.
    fn at_block(&self, token: &Token) -> bool {
        self.stops_at_blocks && token.kind.starts_block()
    }

    fn ends_at(&self, token: &Token) -> bool {
        if self.at_block(token) {
            return true;
        }
        match token.kind {
            TokenKind::Newline | TokenKind::Eof => true,
            TokenKind::RightBracket => self.in_link,
            kind => self.closer == Some(kind),
        }
    }
}

impl SpanKind {
    fn marker(self) -> TokenKind {
        match self {
            SpanKind::Bold => TokenKind::BoldMark,
            SpanKind::Italic => TokenKind::ItalicMark,
            SpanKind::Code => TokenKind::Backtick,
            SpanKind::Link => TokenKind::LeftBracket,
        }
    }
}

/// Literal text waiting to become a single text node.
#[derive(Default)]
struct TextBuffer {
    value: String,
    start: Option<Position>,
    end: Position,
}

impl TextBuffer {
    fn push(&mut self, token: &Token) {
        self.start.get_or_insert(token.position);
        self.value.push_str(&token.literal);
        self.end = token.end();
    }
}

fn flush_text(doc: &mut Document, buffer: &mut TextBuffer, output: &mut Vec<NodeId>) {
    let Some(start) = buffer.start.take() else {
        return;
    };
    let id = doc.text(std::mem::take(&mut buffer.value), start);
    doc.set_range(id, Range::new(start, buffer.end));
    output.push(id);
}

/// Splits `url "title"` or `url 'title'`; anything else is all url.
fn split_destination(raw: &str) -> (String, Option<String>) {
    let trimmed = raw.trim();
    if let Some(gap) = trimmed.find(char::is_whitespace) {
        let (url, rest) = trimmed.split_at(gap);
        let rest = rest.trim_start();
        for quote in ['"', '\''] {
            if rest.len() >= 2 && rest.starts_with(quote) && rest.ends_with(quote) {
                let title = &rest[1..rest.len() - 1];
                return (url.to_string(), Some(title.to_string()));
            }
        }
    }
    (trimmed.to_string(), None)
}

impl<'t, 'd> Parser<'t, 'd> {
    /// Parses inlines until a newline, the end, or whatever `context` stops
    /// at. The stopping token is not consumed.
    ///
    /// Plain tokens coalesce into one text node. An opener that fails to
    /// open its construct becomes a text node of its own.
    pub(super) fn parse_inlines(&mut self, context: InlineContext) -> Result<Vec<NodeId>> {
        let mut output = Vec::new();
        let mut buffer = TextBuffer::default();

        loop {
            let token = self.state.current();
            if context.ends_at(token) {
                break;
            }

            let attempted = match token.kind {
                TokenKind::BoldMark => Some(self.parse_span(SpanKind::Bold, context)?),
                TokenKind::ItalicMark => Some(self.parse_span(SpanKind::Italic, context)?),
                TokenKind::Backtick => Some(self.parse_span(SpanKind::Code, context)?),
                TokenKind::LeftBracket if !context.in_link => {
                    Some(self.parse_span(SpanKind::Link, context)?)
                }
                TokenKind::Bang
                    if !context.in_link && self.state.peek(1).is(TokenKind::LeftBracket) =>
                {
                    Some(self.parse_image()?)
                }
                _ => None,
            };

            match attempted {
                Some(Some(node)) => {
                    flush_text(self.doc, &mut buffer, &mut output);
                    output.push(node);
                }
                Some(None) => {
                    flush_text(self.doc, &mut buffer, &mut output);
                    buffer.push(token);
                    flush_text(self.doc, &mut buffer, &mut output);
                    self.state.advance();
                }
                None => {
                    buffer.push(token);
                    self.state.advance();
                }
            }
        }

        flush_text(self.doc, &mut buffer, &mut output);
        Ok(output)
    }

    /// Span or link starting at the cursor. `None` leaves the cursor on the
    /// opening marker, and a failure at the same opener is not retried.
    fn parse_span(&mut self, kind: SpanKind, context: InlineContext) -> Result<Option<NodeId>> {
        let key = SpanKey {
            offset: self.state.offset(),
            kind,
            in_link: context.in_link,
        };
        if self.failed_spans.contains(&key) {
            return Ok(None);
        }
        if kind != SpanKind::Code && !self.can_nest() {
            debug!(depth = self.depth, ?kind, "nesting limit reached, marker kept as text");
            return Ok(None);
        }

        let parsed = match kind {
            SpanKind::Code => self.attempt(|p| p.code_span(context))?,
            SpanKind::Link => self.attempt(|p| p.nested(|p| p.link_body(context)))?,
            SpanKind::Bold | SpanKind::Italic => {
                self.attempt(|p| p.nested(|p| p.emphasis_span(kind, context)))?
            }
        };
        if parsed.is_none() {
            let opener = self.state.current();
            trace!(
                ?kind,
                line = opener.position.line,
                column = opener.position.column,
                "unterminated span, marker kept as text"
            );
            self.failed_spans.insert(key);
        }
        Ok(parsed)
    }

    fn emphasis_span(&mut self, kind: SpanKind, context: InlineContext) -> Result<Option<NodeId>> {
        let start = self.state.current().position;
        self.expect(kind.marker())?;
        let children = self.parse_inlines(context.within(kind))?;
        if !self.state.at(kind.marker()) {
            return Ok(None);
        }
        self.state.advance();

        let id = match kind {
            SpanKind::Bold => self.doc.bold(children, start),
            _ => self.doc.italic(children, start),
        };
        Ok(Some(self.finish(id, start)))
    }

    /// Code content is raw: the literals between two backtick runs of the
    /// same length, on one line.
    fn code_span(&mut self, context: InlineContext) -> Result<Option<NodeId>> {
        let start = self.state.current().position;
        let opener = self.expect(TokenKind::Backtick)?;
        let mut value = String::new();
        loop {
            let token = self.state.current();
            match token.kind {
                TokenKind::Newline | TokenKind::Eof | TokenKind::CodeBlockMark => return Ok(None),
                TokenKind::RightBracket if context.in_link => return Ok(None),
                TokenKind::Backtick if token.literal == opener.literal => {
                    self.state.advance();
                    break;
                }
                _ => {
                    value.push_str(&token.literal);
                    self.state.advance();
                }
            }
        }
        let id = self.doc.code(value, start);
        Ok(Some(self.finish(id, start)))
    }

    /// `[text](destination)`, with no links or images inside the text.
    fn link_body(&mut self, context: InlineContext) -> Result<Option<NodeId>> {
        let start = self.state.current().position;
        self.expect(TokenKind::LeftBracket)?;
        let children = self.parse_inlines(context.link_text())?;
        if !self.state.at(TokenKind::RightBracket) {
            return Ok(None);
        }
        self.state.advance();

        let Some(destination) = self.destination() else {
            return Ok(None);
        };
        let (url, title) = split_destination(&destination);
        let id = self.doc.link(url, title, children, start);
        Ok(Some(self.finish(id, start)))
    }

    fn parse_image(&mut self) -> Result<Option<NodeId>> {
        let parsed = self.attempt(|p| p.image_body())?;
        if parsed.is_none() {
            trace!(
                line = self.state.current().position.line,
                column = self.state.current().position.column,
                "not an image, bang kept as text"
            );
        }
        Ok(parsed)
    }

    /// `![alt](destination)`; the alt text is taken literally.
    fn image_body(&mut self) -> Result<Option<NodeId>> {
        let start = self.state.current().position;
        self.expect(TokenKind::Bang)?;
        self.expect(TokenKind::LeftBracket)?;

        let mut alt = String::new();
        loop {
            let token = self.state.current();
            match token.kind {
                TokenKind::Newline | TokenKind::Eof | TokenKind::CodeBlockMark => return Ok(None),
                TokenKind::RightBracket => {
                    self.state.advance();
                    break;
                }
                _ => {
                    alt.push_str(&token.literal);
                    self.state.advance();
                }
            }
        }

        let Some(destination) = self.destination() else {
            return Ok(None);
        };
        let (url, title) = split_destination(&destination);
        let id = self.doc.image(url, alt, title, start);
        Ok(Some(self.finish(id, start)))
    }

    /// Raw `( ... )` after link or image text, on one line.
    fn destination(&mut self) -> Option<String> {
        if !self.state.at(TokenKind::LeftParen) {
            return None;
        }
        self.state.advance();
        let mut raw = String::new();
        loop {
            let token = self.state.current();
            match token.kind {
                TokenKind::Newline | TokenKind::Eof | TokenKind::CodeBlockMark => return None,
                TokenKind::RightParen => {
                    self.state.advance();
                    return Some(raw);
                }
                _ => {
                    raw.push_str(&token.literal);
                    self.state.advance();
                }
            }
        }
    }
}
