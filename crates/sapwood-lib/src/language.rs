//! Grammar facade.
//!
//! A [`Grammar`] owns the symbol and field tables for one language and knows
//! how to start a parse. The engine only talks to it through [`Language`],
//! a cheap shared handle.

use std::fmt;
use std::sync::Arc;

use sapwood_core::{FieldId, Symbol, SymbolMetadata, SymbolType};

use crate::parser::ParseInput;
use crate::tree::{Subtree, TreeBuilder};

/// Compiled grammar for one language.
///
/// Symbol `0` is reserved for the hidden end-of-input token and
/// `Symbol::ERROR` for error nodes. [`Language`] answers for both, so
/// grammars only describe their own symbols.
pub trait Grammar: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// ABI version the grammar was built against.
    fn abi_version(&self) -> u32;

    fn symbol_count(&self) -> usize;

    fn symbol_name(&self, symbol: Symbol) -> Option<&str>;

    fn symbol_metadata(&self, symbol: Symbol) -> Option<SymbolMetadata>;

    fn field_count(&self) -> usize;

    fn field_name(&self, field: FieldId) -> Option<&str>;

    /// Begins a parse. All progress lives in the returned task.
    fn start_parse(&self) -> Box<dyn ParseTask>;

    fn symbol_for_name(&self, name: &str, named: bool) -> Option<Symbol> {
        (1..self.symbol_count() as u16).map(Symbol).find(|&symbol| {
            self.symbol_name(symbol) == Some(name)
                && self
                    .symbol_metadata(symbol)
                    .is_some_and(|m| m.visible && m.named == named)
        })
    }

    fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
        (1..=self.field_count() as u16)
            .filter_map(FieldId::new)
            .find(|&field| self.field_name(field) == Some(name))
    }
}

/// Outcome of one bounded unit of parsing work.
#[derive(Debug)]
pub enum ParseStep {
    Continue,
    Finished(Subtree),
}

/// An in-progress parse.
///
/// The parser calls [`ParseTask::advance`] repeatedly, checking for
/// cancellation and timeouts between calls. A task that was interrupted is
/// resumed with the same input on the next parse.
pub trait ParseTask: Send {
    fn advance(&mut self, input: &ParseInput<'_>, builder: &mut TreeBuilder) -> ParseStep;
}

/// Shared handle to a [`Grammar`]. Equality is identity.
#[derive(Clone)]
pub struct Language(Arc<dyn Grammar>);

impl Language {
    pub fn new(grammar: impl Grammar + 'static) -> Self {
        Self(Arc::new(grammar))
    }

    pub fn from_arc(grammar: Arc<dyn Grammar>) -> Self {
        Self(grammar)
    }

    pub fn grammar(&self) -> &dyn Grammar {
        &*self.0
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn version(&self) -> u32 {
        self.0.abi_version()
    }

    pub fn symbol_count(&self) -> usize {
        self.0.symbol_count()
    }

    pub fn field_count(&self) -> usize {
        self.0.field_count()
    }

    pub fn symbol_name(&self, symbol: Symbol) -> Option<&str> {
        match symbol {
            Symbol::ERROR => Some("ERROR"),
            Symbol::END => Some(self.0.symbol_name(symbol).unwrap_or("end")),
            _ => self.0.symbol_name(symbol),
        }
    }

    pub fn symbol_metadata(&self, symbol: Symbol) -> Option<SymbolMetadata> {
        match symbol {
            Symbol::ERROR => Some(SymbolMetadata::REGULAR),
            Symbol::END => Some(SymbolMetadata::AUXILIARY),
            _ => self.0.symbol_metadata(symbol),
        }
    }

    pub fn symbol_type(&self, symbol: Symbol) -> Option<SymbolType> {
        self.symbol_metadata(symbol).map(SymbolMetadata::symbol_type)
    }

    /// Visible symbol with this name. `ERROR` resolves to the builtin.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<Symbol> {
        if named && name == "ERROR" {
            return Some(Symbol::ERROR);
        }
        self.0.symbol_for_name(name, named)
    }

    pub fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
        self.0.field_id_for_name(name)
    }

    pub fn field_name_for_id(&self, field: FieldId) -> Option<&str> {
        self.0.field_name(field)
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl Eq for Language {}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("version", &self.version())
            .finish()
    }
}
