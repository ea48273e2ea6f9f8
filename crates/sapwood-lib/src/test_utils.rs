//! A tiny line-oriented grammar for unit tests.
//!
//! `words` splits each line into `word`, `number` and `","` tokens under a
//! `line` node. The first token of a line fills the `head` field. With three
//! or more lines the first two sit in a hidden `_lines` node, so hidden-node
//! flattening is always exercised.

use std::sync::LazyLock;

use sapwood_core::{FieldId, LANGUAGE_VERSION, Length, Symbol, SymbolMetadata};

use crate::language::{Grammar, Language, ParseStep, ParseTask};
use crate::parser::{ParseInput, Parser};
use crate::tree::{Child, Tree, TreeBuilder};

pub const WORD: Symbol = Symbol(1);
pub const NUMBER: Symbol = Symbol(2);
pub const COMMA: Symbol = Symbol(3);
pub const DOCUMENT: Symbol = Symbol(4);
pub const LINE: Symbol = Symbol(5);
pub const LINES: Symbol = Symbol(6);

pub const FIELD_HEAD: FieldId = FieldId::new(1).unwrap();

const SYMBOLS: &[(&str, SymbolMetadata)] = &[
    ("end", SymbolMetadata::AUXILIARY),
    ("word", SymbolMetadata::REGULAR),
    ("number", SymbolMetadata::REGULAR),
    (",", SymbolMetadata::ANONYMOUS),
    ("document", SymbolMetadata::REGULAR),
    ("line", SymbolMetadata::REGULAR),
    ("_lines", SymbolMetadata::AUXILIARY),
];

#[derive(Debug)]
pub struct WordsGrammar;

impl Grammar for WordsGrammar {
    fn name(&self) -> &str {
        "words"
    }

    fn abi_version(&self) -> u32 {
        LANGUAGE_VERSION
    }

    fn symbol_count(&self) -> usize {
        SYMBOLS.len()
    }

    fn symbol_name(&self, symbol: Symbol) -> Option<&str> {
        SYMBOLS.get(symbol.0 as usize).map(|(name, _)| *name)
    }

    fn symbol_metadata(&self, symbol: Symbol) -> Option<SymbolMetadata> {
        SYMBOLS.get(symbol.0 as usize).map(|(_, metadata)| *metadata)
    }

    fn field_count(&self) -> usize {
        1
    }

    fn field_name(&self, field: FieldId) -> Option<&str> {
        (field == FIELD_HEAD).then_some("head")
    }

    fn start_parse(&self) -> Box<dyn ParseTask> {
        Box::new(WordsParse)
    }
}

pub fn words() -> Language {
    static LANG: LazyLock<Language> = LazyLock::new(|| Language::new(WordsGrammar));
    LANG.clone()
}

pub fn parse(text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(words()).unwrap();
    parser.parse(text, None).unwrap()
}

fn class(ch: char) -> Option<Symbol> {
    match ch {
        ',' => Some(COMMA),
        c if c.is_ascii_digit() => Some(NUMBER),
        c if c.is_alphabetic() => Some(WORD),
        _ => None,
    }
}

struct WordsParse;

impl ParseTask for WordsParse {
    fn advance(&mut self, input: &ParseInput<'_>, builder: &mut TreeBuilder) -> ParseStep {
        let mut lines: Vec<Child> = Vec::new();
        let mut tokens: Vec<Child> = Vec::new();
        let mut offset = Length::ZERO;
        let mut position = Length::ZERO;

        while let Some((ch, width)) = input.decode(position.bytes) {
            let symbol = class(ch);
            let start = position;
            position = input.advance(position, ch, width);
            if ch == '\n' && !tokens.is_empty() {
                lines.push(builder.node(LINE, std::mem::take(&mut tokens)).into());
            }
            let Some(symbol) = symbol else {
                continue;
            };
            if symbol != COMMA {
                while let Some((next, width)) = input.decode(position.bytes)
                    && class(next) == Some(symbol)
                {
                    position = input.advance(position, next, width);
                }
            }
            let leaf = builder.leaf(input, symbol, offset, start - offset, position - start);
            tokens.push(if tokens.is_empty() {
                Child::with_field(leaf, FIELD_HEAD)
            } else {
                Child::new(leaf)
            });
            offset = position;
        }
        if !tokens.is_empty() {
            lines.push(builder.node(LINE, tokens).into());
        }

        if lines.len() >= 3 {
            let rest = lines.split_off(2);
            lines = std::iter::once(builder.node(LINES, lines).into()).chain(rest).collect();
        }
        lines.push(builder.leaf(input, Symbol::END, offset, position - offset, Length::ZERO).into());
        ParseStep::Finished(builder.root(DOCUMENT, lines))
    }
}
