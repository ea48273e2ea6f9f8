//! Token scanning over a [`ParseInput`].

use sapwood_core::{Length, Symbol};
use sapwood_lib::ParseInput;

use super::{COMMENT, EQUALS, IDENTIFIER, LPAREN, MINUS, NUMBER, PLUS, RPAREN, SEMICOLON, SLASH, STAR};

/// One scanned token. `start` and `end` are absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Token {
    pub symbol: Symbol,
    pub start: Length,
    pub end: Length,
}

/// Skips whitespace and excluded text from `position`.
///
/// Returns where the next token starts, or `None` at the end of input.
pub(super) fn skip_padding(input: &ParseInput<'_>, mut position: Length) -> Option<Length> {
    loop {
        position = input.next_included(position)?;
        let (ch, width) = input.decode(position.bytes)?;
        if !ch.is_whitespace() {
            return Some(position);
        }
        position = input.advance(position, ch, width);
    }
}

/// Absolute position of the end of the text.
pub(super) fn end_of_text(input: &ParseInput<'_>, mut position: Length) -> Length {
    while let Some((ch, width)) = input.decode(position.bytes) {
        position = input.advance(position, ch, width);
    }
    position
}

/// Scans one token starting exactly at `start`, staying inside the
/// included range that contains it.
pub(super) fn scan(input: &ParseInput<'_>, start: Length) -> Option<Token> {
    let limit = input.included_end(start.bytes);
    let (first, width) = input.decode(start.bytes)?;
    let mut end = input.advance(start, first, width);

    let take_while = |end: &mut Length, accept: &dyn Fn(char) -> bool| {
        while end.bytes < limit {
            match input.decode(end.bytes) {
                Some((ch, width)) if accept(ch) => *end = input.advance(*end, ch, width),
                _ => break,
            }
        }
    };

    let symbol = match first {
        c if c.is_ascii_alphabetic() || c == '_' => {
            take_while(&mut end, &|c| c.is_ascii_alphanumeric() || c == '_');
            IDENTIFIER
        }
        c if c.is_ascii_digit() => {
            take_while(&mut end, &|c| c.is_ascii_digit());
            if end.bytes < limit
                && let Some(('.', dot_width)) = input.decode(end.bytes)
                && let Some((next, _)) = input.decode(end.bytes + dot_width)
                && next.is_ascii_digit()
                && end.bytes + dot_width < limit
            {
                end = input.advance(end, '.', dot_width);
                take_while(&mut end, &|c| c.is_ascii_digit());
            }
            NUMBER
        }
        '#' => {
            take_while(&mut end, &|c| c != '\n');
            COMMENT
        }
        '=' => EQUALS,
        '+' => PLUS,
        '-' => MINUS,
        '*' => STAR,
        '/' => SLASH,
        '(' => LPAREN,
        ')' => RPAREN,
        ';' => SEMICOLON,
        _ => Symbol::ERROR,
    };

    Some(Token { symbol, start, end })
}
