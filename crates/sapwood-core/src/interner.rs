//! String interning for query capture names and literals.
//!
//! Ids are dense and assigned in insertion order, so they double as
//! indices into per-capture tables.

use indexmap::IndexSet;

/// Handle to an interned string. O(1) comparison.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StringId(u32);

impl StringId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Rebuild from a raw index handed out by [`StringId::as_u32`].
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// Deduplicating string table.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    strings: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing id when `s` was seen before.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(index) = self.strings.get_index_of(s) {
            return StringId(index as u32);
        }
        let (index, _) = self.strings.insert_full(s.into());
        StringId(index as u32)
    }

    pub fn lookup(&self, s: &str) -> Option<StringId> {
        self.strings.get_index_of(s).map(|i| StringId(i as u32))
    }

    #[inline]
    pub fn resolve(&self, id: StringId) -> Option<&str> {
        self.strings.get_index(id.index()).map(|s| &**s)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StringId, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (StringId(i as u32), &**s))
    }
}
