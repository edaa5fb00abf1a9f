use tracing::debug;

use crate::ast::NodeId;
use crate::error::Result;
use crate::lexer::{Position, Range, Token, TokenKind};

use super::core::Parser;
use super::inline::InlineContext;

/// A list item whose content is still being collected; nested lists are
/// appended to it before the item node is built.
struct PendingItem {
    checked: Option<bool>,
    position: Position,
    end: Position,
    children: Vec<NodeId>,
}

/// Ordered-ness, start number and marker glyph of a list marker literal.
fn classify_marker(literal: &str) -> (bool, Option<u64>, String) {
    let marker = literal.trim_start();
    let digits: String = marker.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        let bullet = marker.chars().next().map(String::from).unwrap_or_default();
        (false, None, bullet)
    } else {
        (true, digits.parse().ok(), ".".to_string())
    }
}

/// Task state from the marker literal: `[x]`/`[X]` done, `[ ]` open.
fn task_state(literal: &str) -> Option<bool> {
    let marker = literal.trim_end();
    if marker.ends_with("[x]") || marker.ends_with("[X]") {
        Some(true)
    } else if marker.ends_with("[ ]") {
        Some(false)
    } else {
        None
    }
}

/// Removes up to `depth` quote markers, each with one following space.
fn strip_quote_prefix(line: &str, depth: usize) -> &str {
    let mut rest = line;
    for _ in 0..depth {
        match rest.trim_start_matches(' ').strip_prefix('>') {
            Some(after) => rest = after.strip_prefix(' ').unwrap_or(after),
            None => break,
        }
    }
    rest
}

impl<'t, 'd> Parser<'t, 'd> {
    /// Parses blocks until the end of the token slice.
    pub(super) fn parse_blocks(&mut self) -> Result<Vec<NodeId>> {
        let mut blocks = Vec::new();
        loop {
            self.skip_gaps();
            if self.state.is_at_end() {
                break;
            }
            let before = self.state.offset();
            if let Some(block) = self.parse_block()? {
                blocks.push(block);
            }
            if self.state.offset() == before {
                self.state.advance();
            }
        }
        Ok(blocks)
    }

    /// Skips blank lines and indentation, except indentation in front of a
    /// list item.
    fn skip_gaps(&mut self) {
        loop {
            match self.state.kind() {
                TokenKind::Newline => self.state.advance(),
                kind if kind.is_blank() => {
                    if self.list_line(0).is_some() {
                        return;
                    }
                    self.skip_blanks();
                }
                _ => return,
            }
        }
    }

    fn parse_block(&mut self) -> Result<Option<NodeId>> {
        match self.state.kind() {
            TokenKind::HeadingMark => self.parse_heading(),
            TokenKind::CodeBlockMark => self.parse_code_block(),
            TokenKind::GreaterThan => self.parse_quote(),
            TokenKind::HorizontalRule => self.parse_rule(),
            _ if self.list_line(0).is_some() => self.parse_list(),
            _ => self.parse_paragraph(),
        }
    }

    /// Indent level and marker of a list item line starting `from` tokens
    /// ahead of the cursor.
    fn list_line(&self, from: usize) -> Option<(usize, &'t Token)> {
        let mut width = 0;
        let mut ahead = from;
        loop {
            let token = self.state.peek(ahead);
            match token.kind {
                TokenKind::Whitespace => width += token.length,
                TokenKind::Tab => width += self.options.indent_unit(),
                TokenKind::ListItem => return Some((width / self.options.indent_unit(), token)),
                _ => return None,
            }
            ahead += 1;
        }
    }

    fn parse_heading(&mut self) -> Result<Option<NodeId>> {
        let start = self.state.current().position;
        let mark = self.expect(TokenKind::HeadingMark)?;
        let level = u8::try_from(mark.length).unwrap_or(6);
        self.skip_blanks();
        let children = self.parse_inlines(InlineContext::default())?;
        let id = self.doc.heading(level, children, start);
        Ok(Some(self.finish(id, start)))
    }

    fn parse_code_block(&mut self) -> Result<Option<NodeId>> {
        let start = self.state.current().position;
        let fence = self.expect(TokenKind::CodeBlockMark)?;

        let lines: Vec<&str> = fence.literal.split('\n').collect();
        let info = lines[0].trim_start_matches('`').trim();
        let language = (!info.is_empty()).then(|| info.to_string());

        // Quote markers only lead a closing line inside a quote.
        let prefix: &[char] = if self.quote_depth > 0 { &[' ', '>'] } else { &[' '] };
        let closed = lines.len() > 1 && lines[lines.len() - 1].trim_start_matches(prefix) == "```";
        let interior_end = if closed { lines.len() - 1 } else { lines.len() };
        let code = lines
            .get(1..interior_end)
            .unwrap_or_default()
            .iter()
            .map(|line| strip_quote_prefix(line, self.quote_depth))
            .collect::<Vec<_>>()
            .join("\n");

        let id = self.doc.code_block(language, code, start);
        Ok(Some(self.finish(id, start)))
    }

    /// Collects the lines of a quote into a derived token slice and parses
    /// that as a block sequence of its own.
    fn parse_quote(&mut self) -> Result<Option<NodeId>> {
        if !self.can_nest() {
            debug!(
                depth = self.depth,
                line = self.state.current().position.line,
                "nesting limit reached, quote kept as text"
            );
            return self.parse_paragraph();
        }

        let start = self.state.current().position;
        let mut inner: Vec<Token> = Vec::new();
        loop {
            self.expect(TokenKind::GreaterThan)?;
            let after = self.state.current();
            if after.is(TokenKind::Whitespace) {
                if after.length > 1 {
                    let position = after.position.advanced_by(" ");
                    inner.push(Token::new(TokenKind::Whitespace, &after.literal[1..], position));
                }
                self.state.advance();
            }
            while !matches!(self.state.kind(), TokenKind::Newline | TokenKind::Eof) {
                inner.push(self.state.current().clone());
                self.state.advance();
            }
            if self.state.at(TokenKind::Newline) && self.state.peek(1).is(TokenKind::GreaterThan) {
                inner.push(self.state.current().clone());
                self.state.advance();
                continue;
            }
            break;
        }
        inner.push(Token::eof(self.state.last_end()));

        let children = {
            let mut body = Parser::new(
                &inner,
                self.options,
                &mut *self.doc,
                self.depth + 1,
                self.quote_depth + 1,
            );
            body.parse_blocks()?
        };
        let id = self.doc.quote(children, start);
        Ok(Some(self.finish(id, start)))
    }

    /// Parses consecutive list item lines at the indent level of the first.
    /// Deeper lines form nested lists inside the preceding item.
    fn parse_list(&mut self) -> Result<Option<NodeId>> {
        let Some((base, first)) = self.list_line(0) else {
            return self.parse_paragraph();
        };
        let (ordered, start_number, marker) = classify_marker(&first.literal);
        let start = first.position;
        let mut items: Vec<PendingItem> = Vec::new();

        loop {
            let Some((level, _)) = self.list_line(0) else {
                break;
            };
            if level > base && !items.is_empty() {
                let nested = self.parse_list()?;
                let end = self.state.last_end();
                if let (Some(nested), Some(item)) = (nested, items.last_mut()) {
                    item.children.push(nested);
                    item.end = end;
                }
            } else {
                self.skip_blanks();
                let token = self.expect(TokenKind::ListItem)?;
                let content = self.parse_inlines(InlineContext::paragraph())?;
                let mut children = Vec::new();
                if let Some(&first_inline) = content.first() {
                    let position = self.doc.position(first_inline);
                    let paragraph = self.doc.paragraph(content, position);
                    children.push(self.finish(paragraph, position));
                }
                items.push(PendingItem {
                    checked: task_state(&token.literal),
                    position: token.position,
                    end: self.state.last_end(),
                    children,
                });
            }

            let continues = self.state.at(TokenKind::Newline)
                && self.list_line(1).is_some_and(|(level, _)| level >= base);
            if !continues {
                break;
            }
            self.state.advance();
        }

        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let id = self.doc.list_item(item.checked, item.children, item.position);
            self.doc.set_range(id, Range::new(item.position, item.end));
            ids.push(id);
        }
        let id = self.doc.list(ordered, start_number, marker, ids, start);
        Ok(Some(self.finish(id, start)))
    }

    fn parse_rule(&mut self) -> Result<Option<NodeId>> {
        let start = self.state.current().position;
        self.expect(TokenKind::HorizontalRule)?;
        let end = self.state.last_end();
        self.skip_blanks();
        let id = self.doc.horizontal_rule(start);
        self.doc.set_range(id, Range::new(start, end));
        Ok(Some(id))
    }

    /// One inline run up to a newline or a block marker; with soft breaks,
    /// further lines that do not open a block are joined with newline nodes.
    ///
    /// A block marker under the cursor here could not open its block, so it
    /// and the rest of its line are text.
    fn parse_paragraph(&mut self) -> Result<Option<NodeId>> {
        let start = self.state.current().position;
        let mut children = Vec::new();
        let mut context = InlineContext::paragraph();
        let marker = self.state.current();
        if marker.kind.starts_block() {
            let id = self.doc.text(marker.literal.clone(), marker.position);
            self.doc.set_range(id, marker.range());
            children.push(id);
            self.state.advance();
            context = InlineContext::default();
        }
        children.extend(self.parse_inlines(context)?);

        if self.options.soft_breaks {
            while self.state.at(TokenKind::Newline) && self.continues_paragraph() {
                let position = self.state.current().position;
                self.state.advance();
                let newline = self.doc.newline(position);
                children.push(self.finish(newline, position));
                self.skip_blanks();
                children.extend(self.parse_inlines(InlineContext::paragraph())?);
            }
        }

        if children.is_empty() {
            return Ok(None);
        }
        let id = self.doc.paragraph(children, start);
        Ok(Some(self.finish(id, start)))
    }

    /// Whether the line after the newline under the cursor continues the
    /// current paragraph.
    fn continues_paragraph(&self) -> bool {
        let mut ahead = 1;
        while self.state.peek(ahead).kind.is_blank() {
            ahead += 1;
        }
        let kind = self.state.peek(ahead).kind;
        !matches!(kind, TokenKind::Newline | TokenKind::Eof) && !kind.starts_block()
    }
}
