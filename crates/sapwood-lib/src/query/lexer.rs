//! Tokenizer for query patterns.
//!
//! Tokens are spans; text is sliced from the source only when the parser
//! hands it to the tree builder. Runs of unrecognized characters collapse
//! into one `Garbage` token.

use logos::Logos;
use rowan::TextRange;

use super::cst::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: std::ops::Range<usize>) -> Self {
        let span = TextRange::new((span.start as u32).into(), (span.end as u32).into());
        Self { kind, span }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.span.start().into()
    }
}

pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut garbage_start: Option<usize> = None;

    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => {
                if let Some(start) = garbage_start.take() {
                    tokens.push(Token::new(SyntaxKind::Garbage, start..lexer.span().start));
                }
                tokens.push(Token::new(kind, lexer.span()));
            }
            Err(()) => {
                garbage_start.get_or_insert(lexer.span().start);
            }
        }
    }
    if let Some(start) = garbage_start {
        tokens.push(Token::new(SyntaxKind::Garbage, start..source.len()));
    }

    tokens
}

#[inline]
pub fn token_text<'q>(source: &'q str, token: &Token) -> &'q str {
    &source[std::ops::Range::<usize>::from(token.span)]
}
