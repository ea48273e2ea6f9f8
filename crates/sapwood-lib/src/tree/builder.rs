//! Subtree construction for grammars.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use sapwood_core::{Length, Symbol};

use super::subtree::{Child, Flags, Subtree, SubtreeData};
use crate::language::Language;
use crate::parser::ParseInput;

/// Builds subtrees whose flags come from the language's symbol table.
///
/// Passed to [`ParseTask::advance`](crate::ParseTask::advance) on every
/// step; it also survives interrupted parses.
#[derive(Debug)]
pub struct TreeBuilder {
    language: Language,
    reused: u32,
}

impl TreeBuilder {
    pub fn new(language: Language) -> Self {
        Self { language, reused: 0 }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    fn flags(&self, symbol: Symbol) -> Flags {
        let metadata = self.language.symbol_metadata(symbol).unwrap_or_default();
        Flags {
            visible: metadata.visible,
            named: metadata.named,
            has_error: symbol == Symbol::ERROR,
            ..Flags::default()
        }
    }

    /// A token whose padding starts at `offset`.
    pub fn leaf(
        &self,
        input: &ParseInput<'_>,
        symbol: Symbol,
        offset: Length,
        padding: Length,
        size: Length,
    ) -> Subtree {
        let start = offset.bytes as usize;
        let end = start + (padding.bytes + size.bytes) as usize;
        let mut hasher = FxHasher::default();
        symbol.hash(&mut hasher);
        input.text().get(start..end).unwrap_or_default().hash(&mut hasher);

        Subtree::from_data(SubtreeData {
            symbol,
            padding,
            size,
            flags: self.flags(symbol),
            children: Vec::new(),
            fingerprint: hasher.finish(),
            visible_child_count: 0,
            named_child_count: 0,
        })
    }

    /// A zero-width token the parser expected but did not find.
    pub fn missing(&self, symbol: Symbol, padding: Length) -> Subtree {
        let mut flags = self.flags(symbol);
        flags.missing = true;
        flags.has_error = true;
        Subtree::from_data(SubtreeData {
            symbol,
            padding,
            size: Length::ZERO,
            flags,
            children: Vec::new(),
            fingerprint: 0,
            visible_child_count: 0,
            named_child_count: 0,
        })
    }

    /// An inner node spanning its children.
    pub fn node(&self, symbol: Symbol, children: Vec<Child>) -> Subtree {
        let padding = children
            .first()
            .map_or(Length::ZERO, |c| c.subtree.padding());
        self.summarize(symbol, children, padding)
    }

    pub fn error(&self, children: Vec<Child>) -> Subtree {
        self.node(Symbol::ERROR, children)
    }

    /// Like [`TreeBuilder::node`], but starting at the document start so
    /// leading whitespace belongs to the root.
    pub fn root(&self, symbol: Symbol, children: Vec<Child>) -> Subtree {
        self.summarize(symbol, children, Length::ZERO)
    }

    pub fn extra(&self, mut subtree: Subtree) -> Subtree {
        std::sync::Arc::make_mut(&mut subtree.0).flags.extra = true;
        subtree
    }

    /// Marks `subtree` as taken from the old tree.
    pub fn reuse(&mut self, subtree: Subtree) -> Subtree {
        self.reused += 1;
        tracing::trace!(symbol = %subtree.symbol(), bytes = subtree.total_size().bytes, "reusing subtree");
        subtree
    }

    pub fn reused_count(&self) -> u32 {
        self.reused
    }

    fn summarize(&self, symbol: Symbol, children: Vec<Child>, padding: Length) -> Subtree {
        let total = children
            .iter()
            .fold(Length::ZERO, |acc, c| acc + c.subtree.total_size());
        let mut flags = self.flags(symbol);
        let mut visible_child_count = 0;
        let mut named_child_count = 0;
        for child in &children {
            let subtree = &child.subtree;
            flags.has_error |= subtree.has_error();
            if subtree.is_visible() {
                visible_child_count += 1;
                named_child_count += u32::from(subtree.is_named());
            } else {
                visible_child_count += subtree.visible_child_count();
                named_child_count += subtree.named_child_count();
            }
        }

        Subtree::from_data(SubtreeData {
            symbol,
            padding,
            size: total - padding,
            flags,
            children,
            fingerprint: 0,
            visible_child_count,
            named_child_count,
        })
    }
}
