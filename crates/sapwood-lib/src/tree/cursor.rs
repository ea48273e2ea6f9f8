//! Stateful depth-first traversal.
//!
//! The cursor keeps the whole path from its starting node, hidden nodes
//! included, so moving never searches from the root.

use sapwood_core::{FieldId, Length, Point};

use super::iter::RawChildren;
use super::node::Node;
use super::subtree::Subtree;
use super::Tree;

#[derive(Clone, Copy)]
struct Frame<'tree> {
    subtree: &'tree Subtree,
    offset: Length,
    /// Index among the parent's raw children.
    index: usize,
    /// Own field, or the nearest one inherited through hidden parents.
    field: Option<FieldId>,
}

impl Frame<'_> {
    fn is_visible(&self) -> bool {
        self.subtree.is_visible()
    }

    fn has_visible_children(&self) -> bool {
        self.subtree.visible_child_count() > 0
    }
}

/// Walks a tree one step at a time. `Clone` gives an independent copy.
///
/// Every move returns whether it succeeded and leaves the cursor in place
/// when it did not. The cursor never climbs above the node it started at.
#[derive(Clone)]
pub struct TreeCursor<'tree> {
    tree: &'tree Tree,
    stack: Vec<Frame<'tree>>,
}

impl<'tree> TreeCursor<'tree> {
    pub fn new(node: Node<'tree>) -> Self {
        let mut cursor = Self {
            tree: node.tree(),
            stack: Vec::with_capacity(16),
        };
        cursor.reset(node);
        cursor
    }

    /// Restarts at `node`, which becomes the new upper bound.
    pub fn reset(&mut self, node: Node<'tree>) {
        self.tree = node.tree();
        self.stack.clear();
        self.stack.push(Frame {
            subtree: node.subtree(),
            offset: node.offset(),
            index: 0,
            field: None,
        });
    }

    pub fn node(&self) -> Node<'tree> {
        let frame = self.current();
        Node::new(self.tree, frame.subtree, frame.offset)
    }

    pub fn field_id(&self) -> Option<FieldId> {
        if self.stack.len() <= 1 {
            return None;
        }
        self.current().field
    }

    pub fn field_name(&self) -> Option<&'tree str> {
        self.tree.language().field_name_for_id(self.field_id()?)
    }

    /// Visible levels below the starting node.
    pub fn depth(&self) -> usize {
        self.stack[1..].iter().filter(|f| f.is_visible()).count()
    }

    pub fn goto_first_child(&mut self) -> bool {
        self.enter_first_visible()
    }

    pub fn goto_last_child(&mut self) -> bool {
        self.enter_last_visible()
    }

    pub fn goto_parent(&mut self) -> bool {
        let Some(level) = (0..self.stack.len() - 1)
            .rev()
            .find(|&level| self.stack[level].is_visible() || level == 0)
        else {
            return false;
        };
        self.stack.truncate(level + 1);
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let mut level = self.stack.len() - 1;
        while level > 0 {
            let frame = self.stack[level];
            let parent = self.stack[level - 1];
            let next = child_frames(&parent)
                .skip(frame.index + 1)
                .find(|f| f.is_visible() || f.has_visible_children());
            if let Some(next) = next {
                self.stack.truncate(level);
                self.stack.push(next);
                return next.is_visible() || self.enter_first_visible();
            }
            if parent.is_visible() {
                return false;
            }
            level -= 1;
        }
        false
    }

    pub fn goto_previous_sibling(&mut self) -> bool {
        let mut level = self.stack.len() - 1;
        while level > 0 {
            let frame = self.stack[level];
            let parent = self.stack[level - 1];
            let previous = child_frames(&parent)
                .take(frame.index)
                .filter(|f| f.is_visible() || f.has_visible_children())
                .last();
            if let Some(previous) = previous {
                self.stack.truncate(level);
                self.stack.push(previous);
                return previous.is_visible() || self.enter_last_visible();
            }
            if parent.is_visible() {
                return false;
            }
            level -= 1;
        }
        false
    }

    /// Moves to the first child extending past `byte` and returns its index
    /// among the visible children.
    pub fn goto_first_child_for_byte(&mut self, byte: u32) -> Option<usize> {
        self.goto_first_child_where(|node| node.end_byte() > byte)
    }

    pub fn goto_first_child_for_point(&mut self, point: Point) -> Option<usize> {
        self.goto_first_child_where(|node| node.end_position() > point)
    }

    fn goto_first_child_where(&mut self, accept: impl Fn(&Node<'tree>) -> bool) -> Option<usize> {
        let saved = self.stack.len();
        if !self.goto_first_child() {
            return None;
        }
        let mut index = 0;
        loop {
            if accept(&self.node()) {
                return Some(index);
            }
            if !self.goto_next_sibling() {
                self.stack.truncate(saved);
                return None;
            }
            index += 1;
        }
    }

    fn current(&self) -> &Frame<'tree> {
        // Never empty: `reset` always pushes the starting frame.
        &self.stack[self.stack.len() - 1]
    }

    fn enter_first_visible(&mut self) -> bool {
        let top = *self.current();
        for frame in child_frames(&top) {
            if frame.is_visible() {
                self.stack.push(frame);
                return true;
            }
            if frame.has_visible_children() {
                self.stack.push(frame);
                if self.enter_first_visible() {
                    return true;
                }
                self.stack.pop();
            }
        }
        false
    }

    fn enter_last_visible(&mut self) -> bool {
        let top = *self.current();
        let frames: Vec<_> = child_frames(&top).collect();
        for frame in frames.into_iter().rev() {
            if frame.is_visible() {
                self.stack.push(frame);
                return true;
            }
            if frame.has_visible_children() {
                self.stack.push(frame);
                if self.enter_last_visible() {
                    return true;
                }
                self.stack.pop();
            }
        }
        false
    }
}

fn child_frames<'tree>(parent: &Frame<'tree>) -> impl Iterator<Item = Frame<'tree>> + use<'tree> {
    let inherited = if parent.is_visible() { None } else { parent.field };
    RawChildren::new(parent.subtree, parent.offset).map(move |child| Frame {
        subtree: child.subtree,
        offset: child.offset,
        index: child.index,
        field: child.field.or(inherited),
    })
}
