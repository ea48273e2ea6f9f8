//! Grammar handles: symbols and fields.
//!
//! Names and visibility live in the grammar; these are bare integers.

use std::fmt;
use std::num::NonZeroU16;

/// Grammar rule or token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub u16);

impl Symbol {
    /// Hidden end-of-input token, present in every grammar.
    pub const END: Symbol = Symbol(0);
    /// Error recovery node, present in every grammar.
    pub const ERROR: Symbol = Symbol(u16::MAX);

    #[inline]
    pub fn as_u16(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_builtin(self) -> bool {
        self == Self::END || self == Self::ERROR
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Child slot in a production. Zero is reserved for "no field".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(NonZeroU16);

impl FieldId {
    pub const fn new(id: u16) -> Option<Self> {
        match NonZeroU16::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    #[inline]
    pub fn get(self) -> u16 {
        self.0.get()
    }
}

/// How a symbol appears in trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    /// Named and visible, e.g. `identifier`.
    Regular,
    /// Visible literal token, e.g. `"="`.
    Anonymous,
    /// Hidden helper rule; its children surface in its place.
    Auxiliary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SymbolMetadata {
    pub visible: bool,
    pub named: bool,
}

impl SymbolMetadata {
    pub const REGULAR: SymbolMetadata = SymbolMetadata {
        visible: true,
        named: true,
    };
    pub const ANONYMOUS: SymbolMetadata = SymbolMetadata {
        visible: true,
        named: false,
    };
    pub const AUXILIARY: SymbolMetadata = SymbolMetadata {
        visible: false,
        named: false,
    };

    pub fn symbol_type(self) -> SymbolType {
        match (self.visible, self.named) {
            (true, true) => SymbolType::Regular,
            (true, false) => SymbolType::Anonymous,
            (false, _) => SymbolType::Auxiliary,
        }
    }
}
