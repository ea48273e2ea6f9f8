//! Child iteration with absolute positions.

use std::slice;

use sapwood_core::{FieldId, Length};

use super::subtree::{Child, Subtree};

/// A raw child with its absolute padding start.
#[derive(Clone, Copy)]
pub(crate) struct Positioned<'t> {
    pub subtree: &'t Subtree,
    /// Where the child's padding begins.
    pub offset: Length,
    pub field: Option<FieldId>,
    pub index: usize,
}

impl Positioned<'_> {
    pub fn start(&self) -> Length {
        self.offset + self.subtree.padding()
    }

    pub fn end(&self) -> Length {
        self.start() + self.subtree.size()
    }
}

/// Direct children, hidden ones included.
pub(crate) struct RawChildren<'t> {
    children: slice::Iter<'t, Child>,
    offset: Length,
    index: usize,
}

impl<'t> RawChildren<'t> {
    pub fn new(parent: &'t Subtree, offset: Length) -> Self {
        Self {
            children: parent.children().iter(),
            offset,
            index: 0,
        }
    }
}

impl<'t> Iterator for RawChildren<'t> {
    type Item = Positioned<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.children.next()?;
        let item = Positioned {
            subtree: &child.subtree,
            offset: self.offset,
            field: child.field,
            index: self.index,
        };
        self.offset += child.subtree.total_size();
        self.index += 1;
        Some(item)
    }
}

/// Visible children, looking through hidden nodes.
///
/// A hidden node's field is inherited by the visible nodes it surfaces.
pub(crate) struct VisibleChildren<'t> {
    stack: Vec<(RawChildren<'t>, Option<FieldId>)>,
}

impl<'t> VisibleChildren<'t> {
    pub fn new(parent: &'t Subtree, offset: Length) -> Self {
        Self {
            stack: vec![(RawChildren::new(parent, offset), None)],
        }
    }
}

impl<'t> Iterator for VisibleChildren<'t> {
    type Item = Positioned<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (children, inherited) = self.stack.last_mut()?;
            let inherited = *inherited;
            let Some(mut child) = children.next() else {
                self.stack.pop();
                continue;
            };
            child.field = child.field.or(inherited);
            if child.subtree.is_visible() {
                return Some(child);
            }
            if child.subtree.visible_child_count() > 0 {
                self.stack
                    .push((RawChildren::new(child.subtree, child.offset), child.field));
            }
        }
    }
}
