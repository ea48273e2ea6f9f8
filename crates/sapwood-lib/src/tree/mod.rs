//! Syntax trees.

mod builder;
mod changes;
mod cursor;
mod iter;
mod node;
mod subtree;

use std::fmt;

use sapwood_core::{Edit, Length, Range};

use crate::language::Language;

pub use builder::TreeBuilder;
pub use cursor::TreeCursor;
pub use node::Node;
pub use subtree::{Child, Subtree};

/// One parse generation.
///
/// `Clone` is the cheap copy: both trees share every subtree, and
/// [`Tree::edit`] copies only the nodes it changes, so a clone can be moved
/// to another thread while the original keeps being edited.
#[derive(Clone)]
pub struct Tree {
    root: Subtree,
    language: Language,
    included_ranges: Vec<Range>,
}

impl Tree {
    pub(crate) fn new(root: Subtree, language: Language, included_ranges: Vec<Range>) -> Self {
        Self {
            root,
            language,
            included_ranges,
        }
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, &self.root, Length::ZERO)
    }

    pub(crate) fn root_subtree(&self) -> &Subtree {
        &self.root
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn included_ranges(&self) -> &[Range] {
        &self.included_ranges
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        self.root_node().walk()
    }

    /// Records a text change without reparsing.
    ///
    /// Positions after the edit shift; nodes overlapping it are flagged as
    /// changed so the next parse re-derives them.
    pub fn edit(&mut self, edit: &Edit) {
        if edit.is_noop() {
            return;
        }
        tracing::trace!(
            start = edit.start_byte,
            old_end = edit.old_end_byte,
            new_end = edit.new_end_byte,
            "editing tree"
        );
        self.root.edit(edit);
        // Text inserted at the very start lands in the root's padding.
        self.root.absorb_padding();
        if self.included_ranges != [Range::FULL] {
            for range in &mut self.included_ranges {
                edit.edit_range(range);
            }
        }
    }

    /// Regions whose structure differs between `old`, an edited tree, and
    /// this tree, its reparse. Sorted and non-overlapping.
    pub fn changed_ranges(&self, old: &Tree) -> Vec<Range> {
        changes::changed_ranges(old, self)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Tree {}}}", self.root_node().to_sexp())
    }
}

#[cfg(test)]
mod cursor_tests;
#[cfg(test)]
mod node_tests;
