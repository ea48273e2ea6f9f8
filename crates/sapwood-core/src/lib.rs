#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Value types shared by every sapwood crate.
//!
//! Nothing here knows about trees or grammars beyond small integer handles:
//! - **Positions**: [`Point`], [`Range`] and the relative [`Length`]
//! - **Edits**: [`Edit`], a single text replacement in byte and point space
//! - **Grammar handles**: [`Symbol`], [`FieldId`], [`SymbolType`]
//! - **Interning**: [`Interner`] for capture names and literals

mod edit;
mod interner;
mod position;
mod symbol;

pub use edit::Edit;
pub use interner::{Interner, StringId};
pub use position::{Length, Point, Range};
pub use symbol::{FieldId, Symbol, SymbolMetadata, SymbolType};

/// Newest grammar ABI version this engine understands.
pub const LANGUAGE_VERSION: u32 = 14;

/// Oldest grammar ABI version this engine still accepts.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: u32 = 13;

/// Text encoding of a parse input, declared by the caller.
///
/// Offsets and columns always count encoded bytes, so a UTF-16 column
/// advances by two per code unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum InputEncoding {
    #[default]
    Utf8,
    /// Little-endian code units.
    Utf16,
}

impl InputEncoding {
    /// Smallest unit a valid offset can point between.
    pub fn unit_width(self) -> u32 {
        match self {
            InputEncoding::Utf8 => 1,
            InputEncoding::Utf16 => 2,
        }
    }
}

#[cfg(test)]
mod edit_tests;
#[cfg(test)]
mod position_tests;
