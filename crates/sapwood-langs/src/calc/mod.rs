//! A small expression language.
//!
//! ```text
//! program    = statement*
//! statement  = identifier "=" expression [";"]   -> assignment
//!            | expression [";"]                  -> expression_statement
//! expression = expression ("+" | "-" | "*" | "/") expression
//!            | "-" expression | "(" expression ")" | identifier | number
//! ```
//!
//! A statement ends at `;`, or at a line break once it is complete. Comments
//! (`# ...`) are extras. Long programs group statements under hidden
//! `program_repeat1` nodes.

mod lexer;
mod parse;

use sapwood_core::{FieldId, LANGUAGE_VERSION, Symbol, SymbolMetadata};
use sapwood_lib::{Grammar, ParseTask};

pub const END: Symbol = Symbol::END;
pub const IDENTIFIER: Symbol = Symbol(1);
pub const NUMBER: Symbol = Symbol(2);
pub const COMMENT: Symbol = Symbol(3);
pub const EQUALS: Symbol = Symbol(4);
pub const PLUS: Symbol = Symbol(5);
pub const MINUS: Symbol = Symbol(6);
pub const STAR: Symbol = Symbol(7);
pub const SLASH: Symbol = Symbol(8);
pub const LPAREN: Symbol = Symbol(9);
pub const RPAREN: Symbol = Symbol(10);
pub const SEMICOLON: Symbol = Symbol(11);
pub const PROGRAM: Symbol = Symbol(12);
pub const ASSIGNMENT: Symbol = Symbol(13);
pub const EXPRESSION_STATEMENT: Symbol = Symbol(14);
pub const BINARY_EXPRESSION: Symbol = Symbol(15);
pub const UNARY_EXPRESSION: Symbol = Symbol(16);
pub const PARENTHESIZED_EXPRESSION: Symbol = Symbol(17);
pub const PROGRAM_REPEAT: Symbol = Symbol(18);

const SYMBOLS: &[(&str, SymbolMetadata)] = &[
    ("end", SymbolMetadata::AUXILIARY),
    ("identifier", SymbolMetadata::REGULAR),
    ("number", SymbolMetadata::REGULAR),
    ("comment", SymbolMetadata::REGULAR),
    ("=", SymbolMetadata::ANONYMOUS),
    ("+", SymbolMetadata::ANONYMOUS),
    ("-", SymbolMetadata::ANONYMOUS),
    ("*", SymbolMetadata::ANONYMOUS),
    ("/", SymbolMetadata::ANONYMOUS),
    ("(", SymbolMetadata::ANONYMOUS),
    (")", SymbolMetadata::ANONYMOUS),
    (";", SymbolMetadata::ANONYMOUS),
    ("program", SymbolMetadata::REGULAR),
    ("assignment", SymbolMetadata::REGULAR),
    ("expression_statement", SymbolMetadata::REGULAR),
    ("binary_expression", SymbolMetadata::REGULAR),
    ("unary_expression", SymbolMetadata::REGULAR),
    ("parenthesized_expression", SymbolMetadata::REGULAR),
    ("program_repeat1", SymbolMetadata::AUXILIARY),
];

const FIELDS: &[&str] = &["left", "operator", "right", "operand"];

pub const FIELD_LEFT: FieldId = FieldId::new(1).unwrap();
pub const FIELD_OPERATOR: FieldId = FieldId::new(2).unwrap();
pub const FIELD_RIGHT: FieldId = FieldId::new(3).unwrap();
pub const FIELD_OPERAND: FieldId = FieldId::new(4).unwrap();

/// Grammar tables and entry point for `calc`.
#[derive(Debug, Clone)]
pub struct CalcGrammar {
    abi_version: u32,
}

impl Default for CalcGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl CalcGrammar {
    pub fn new() -> Self {
        Self {
            abi_version: LANGUAGE_VERSION,
        }
    }

    /// Pretends to be built against another ABI.
    pub fn with_abi_version(mut self, version: u32) -> Self {
        self.abi_version = version;
        self
    }
}

impl Grammar for CalcGrammar {
    fn name(&self) -> &str {
        "calc"
    }

    fn abi_version(&self) -> u32 {
        self.abi_version
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
        FIELDS.len()
    }

    fn field_name(&self, field: FieldId) -> Option<&str> {
        FIELDS.get(field.get() as usize - 1).copied()
    }

    fn start_parse(&self) -> Box<dyn ParseTask> {
        Box::new(parse::CalcParse::default())
    }
}

#[cfg(test)]
mod parse_tests;
