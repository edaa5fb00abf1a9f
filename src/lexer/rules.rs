use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while_m_n, take_while1};
use nom::character::complete::{char, digit1, one_of, space1};
use nom::combinator::{eof, map, not, opt, peek, recognize};
use nom::sequence::{pair, terminated, tuple};

use super::token::TokenKind;

/// Result of a scanning rule: the token class and the literal it consumed.
pub(super) type Scan<'a> = IResult<&'a str, (TokenKind, &'a str)>;

/// Characters that have a dedicated rule and therefore end a text run.
pub(super) fn is_special(c: char) -> bool {
    matches!(
        c,
        '#' | '*' | '`' | '[' | ']' | '(' | ')' | '!' | '>' | '-' | '.' | ' ' | '\t' | '\n'
    ) || c.is_ascii_digit()
}

/// Scans one token with the rules that apply anywhere on a line. `quoted`
/// tells whether the line started with quote markers.
pub(super) fn token(input: &str, quoted: bool) -> Scan<'_> {
    alt((
        newline,
        spaces,
        tab,
        heading_mark,
        emphasis_mark,
        map(fenced_block(quoted), |matched| (TokenKind::CodeBlockMark, matched)),
        backtick_run,
        minus_run,
        punctuation,
        digits,
        text,
    ))(input)
}

pub(super) fn newline(input: &str) -> Scan<'_> {
    map(tag("\n"), |matched| (TokenKind::Newline, matched))(input)
}

pub(super) fn spaces(input: &str) -> Scan<'_> {
    map(take_while1(|c: char| c == ' '), |matched| {
        (TokenKind::Whitespace, matched)
    })(input)
}

pub(super) fn tab(input: &str) -> Scan<'_> {
    map(tag("\t"), |matched| (TokenKind::Tab, matched))(input)
}

/// At most six `#`; a longer run is picked up by the next call.
pub(super) fn heading_mark(input: &str) -> Scan<'_> {
    map(take_while_m_n(1, 6, |c: char| c == '#'), |matched| {
        (TokenKind::HeadingMark, matched)
    })(input)
}

/// Greedy two-then-one split of a `*` run.
pub(super) fn emphasis_mark(input: &str) -> Scan<'_> {
    map(take_while_m_n(1, 2, |c: char| c == '*'), |matched: &str| {
        let kind = if matched.len() == 2 {
            TokenKind::BoldMark
        } else {
            TokenKind::ItalicMark
        };
        (kind, matched)
    })(input)
}

pub(super) fn backtick_run(input: &str) -> Scan<'_> {
    map(take_while1(|c: char| c == '`'), |matched| {
        (TokenKind::Backtick, matched)
    })(input)
}

pub(super) fn minus_run(input: &str) -> Scan<'_> {
    map(take_while1(|c: char| c == '-'), |matched: &str| {
        let kind = if matched.len() >= 3 {
            TokenKind::HorizontalRule
        } else {
            TokenKind::Minus
        };
        (kind, matched)
    })(input)
}

pub(super) fn punctuation(input: &str) -> Scan<'_> {
    map(recognize(one_of("[]()!>.")), |matched: &str| {
        let kind = match matched {
            "[" => TokenKind::LeftBracket,
            "]" => TokenKind::RightBracket,
            "(" => TokenKind::LeftParen,
            ")" => TokenKind::RightParen,
            "!" => TokenKind::Bang,
            ">" => TokenKind::GreaterThan,
            _ => TokenKind::Dot,
        };
        (kind, matched)
    })(input)
}

pub(super) fn digits(input: &str) -> Scan<'_> {
    map(digit1, |matched| (TokenKind::Digit, matched))(input)
}

pub(super) fn text(input: &str) -> Scan<'_> {
    map(take_while1(|c: char| !is_special(c)), |matched| {
        (TokenKind::Text, matched)
    })(input)
}

// Line-start rules

/// `- `, `* `, `+ ` or `12. `, optionally followed by a task box.
pub(super) fn list_item(input: &str) -> IResult<&str, &str> {
    recognize(tuple((list_marker, space1, opt(task_box_with_gap))))(input)
}

fn list_marker(input: &str) -> IResult<&str, &str> {
    alt((recognize(one_of("-*+")), recognize(pair(digit1, char('.')))))(input)
}

/// `[ ]`, `[x]` or `[X]`.
pub(super) fn task_box(input: &str) -> IResult<&str, &str> {
    recognize(tuple((char('['), one_of(" xX"), char(']'))))(input)
}

fn task_box_with_gap(input: &str) -> IResult<&str, &str> {
    recognize(pair(task_box, alt((space1, peek(tag("\n")), eof))))(input)
}

/// An opening run of exactly three backticks through the closing fence, or
/// through the end of input when the fence is never closed.
///
/// On a `quoted` line the closing line may carry quote markers in front of
/// the fence; otherwise only indentation.
pub(super) fn fenced_block<'a>(quoted: bool) -> impl Fn(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (body, _) = terminated(tag("```"), not(char('`')))(input)?;
        let opening = input.len() - body.len();
        let consumed = closing_fence_end(body, quoted).map_or(input.len(), |end| opening + end);
        Ok((&input[consumed..], &input[..consumed]))
    }
}

/// Byte offset in `body` just past the closing backticks.
fn closing_fence_end(body: &str, quoted: bool) -> Option<usize> {
    let prefix: &[char] = if quoted { &[' ', '>'] } else { &[' '] };
    body.match_indices('\n').find_map(|(newline, _)| {
        let line_start = newline + 1;
        let line = &body[line_start..];
        let fence = line.trim_start_matches(prefix);
        fence
            .starts_with("```")
            .then(|| line_start + (line.len() - fence.len()) + 3)
    })
}
