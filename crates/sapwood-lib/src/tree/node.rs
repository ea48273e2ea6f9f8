//! Node handles.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::Utf8Error;

use sapwood_core::{Edit, FieldId, Length, Point, Range, Symbol};

use super::cursor::TreeCursor;
use super::iter::{Positioned, VisibleChildren};
use super::subtree::Subtree;
use super::Tree;
use crate::language::Language;

/// A view of one visible node in a [`Tree`].
///
/// Nodes are positions, not owners: they borrow the tree and stay valid for
/// as long as it does. After [`Tree::edit`] old nodes keep their old
/// coordinates unless [`Node::edit`] is applied to them too.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    subtree: &'tree Subtree,
    /// Absolute start of the padding.
    offset: Length,
    start: Length,
}

impl<'tree> Node<'tree> {
    pub(crate) fn new(tree: &'tree Tree, subtree: &'tree Subtree, offset: Length) -> Self {
        Self {
            tree,
            subtree,
            offset,
            start: offset + subtree.padding(),
        }
    }

    pub(crate) fn from_positioned(tree: &'tree Tree, child: Positioned<'tree>) -> Self {
        Self::new(tree, child.subtree, child.offset)
    }

    pub(crate) fn subtree(&self) -> &'tree Subtree {
        self.subtree
    }

    pub(crate) fn offset(&self) -> Length {
        self.offset
    }

    pub(crate) fn visible_children(&self) -> impl Iterator<Item = (Node<'tree>, Option<FieldId>)> + use<'tree> {
        let tree = self.tree;
        VisibleChildren::new(self.subtree, self.offset)
            .map(move |child| (Node::from_positioned(tree, child), child.field))
    }

    /// Stable for the lifetime of the subtree; shared subtrees keep their id
    /// across trees.
    pub fn id(&self) -> usize {
        self.subtree.id()
    }

    pub fn tree(&self) -> &'tree Tree {
        self.tree
    }

    pub fn language(&self) -> &'tree Language {
        self.tree.language()
    }

    pub fn symbol(&self) -> Symbol {
        self.subtree.symbol()
    }

    pub fn kind(&self) -> &'tree str {
        self.tree.language().symbol_name(self.symbol()).unwrap_or("")
    }

    /// Name of the grammar rule that produced the node. Same as
    /// [`Node::kind`] while grammars have no aliases.
    pub fn grammar_name(&self) -> &'tree str {
        self.kind()
    }

    pub fn is_named(&self) -> bool {
        self.subtree.is_named()
    }

    pub fn is_missing(&self) -> bool {
        self.subtree.is_missing()
    }

    pub fn is_extra(&self) -> bool {
        self.subtree.is_extra()
    }

    pub fn is_error(&self) -> bool {
        self.subtree.is_error()
    }

    /// Touched by an edit since it was parsed.
    pub fn has_changes(&self) -> bool {
        self.subtree.has_changes()
    }

    /// Is or contains an error or missing node.
    pub fn has_error(&self) -> bool {
        self.subtree.has_error()
    }

    pub fn start_byte(&self) -> u32 {
        self.start.bytes
    }

    pub fn end_byte(&self) -> u32 {
        self.start.bytes + self.subtree.size().bytes
    }

    pub fn start_position(&self) -> Point {
        self.start.extent
    }

    pub fn end_position(&self) -> Point {
        (self.start + self.subtree.size()).extent
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start_byte() as usize..self.end_byte() as usize
    }

    pub fn range(&self) -> Range {
        Range::from_lengths(self.start, self.start + self.subtree.size())
    }

    pub fn child_count(&self) -> usize {
        self.subtree.visible_child_count() as usize
    }

    pub fn named_child_count(&self) -> usize {
        self.subtree.named_child_count() as usize
    }

    pub fn child(&self, index: usize) -> Option<Node<'tree>> {
        self.children().nth(index)
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'tree>> {
        self.named_children().nth(index)
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.visible_children().map(|(node, _)| node)
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.children().filter(Node::is_named)
    }

    pub fn child_by_field_id(&self, field: FieldId) -> Option<Node<'tree>> {
        self.children_by_field_id(field).next()
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'tree>> {
        let field = self.language().field_id_for_name(name)?;
        self.child_by_field_id(field)
    }

    pub fn children_by_field_id(&self, field: FieldId) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.visible_children()
            .filter(move |(_, f)| *f == Some(field))
            .map(|(node, _)| node)
    }

    /// Empty when the language has no such field.
    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        let field = self.language().field_id_for_name(name);
        self.visible_children()
            .filter(move |(_, f)| field.is_some() && *f == field)
            .map(|(node, _)| node)
    }

    pub fn field_name_for_child(&self, index: usize) -> Option<&'tree str> {
        let (_, field) = self.visible_children().nth(index)?;
        self.language().field_name_for_id(field?)
    }

    /// Found by descending from the root, so O(depth × width).
    pub fn parent(&self) -> Option<Node<'tree>> {
        let root = self.tree.root_node();
        if *self == root {
            return None;
        }
        find_parent(root, self)
    }

    /// Looks the parent up first, so walking a long child list this way is
    /// quadratic. Use [`TreeCursor::goto_next_sibling`] or
    /// [`Node::children`] for that.
    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        let mut siblings = parent.children().skip_while(|n| n != self);
        siblings.next()?;
        siblings.next()
    }

    /// Same cost as [`Node::next_sibling`].
    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        parent.children().take_while(|n| n != self).last()
    }

    pub fn next_named_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        let mut siblings = parent.children().skip_while(|n| n != self);
        siblings.next()?;
        siblings.find(Node::is_named)
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        parent
            .children()
            .take_while(|n| n != self)
            .filter(Node::is_named)
            .last()
    }

    /// First child extending past `byte`.
    pub fn first_child_for_byte(&self, byte: u32) -> Option<Node<'tree>> {
        self.children().find(|child| child.end_byte() > byte)
    }

    pub fn first_named_child_for_byte(&self, byte: u32) -> Option<Node<'tree>> {
        self.named_children().find(|child| child.end_byte() > byte)
    }

    /// Smallest node within this one spanning `start..end`.
    pub fn descendant_for_byte_range(&self, start: u32, end: u32) -> Option<Node<'tree>> {
        self.descendant_spanning(start, end, false, Node::start_byte, Node::end_byte)
    }

    pub fn named_descendant_for_byte_range(&self, start: u32, end: u32) -> Option<Node<'tree>> {
        self.descendant_spanning(start, end, true, Node::start_byte, Node::end_byte)
    }

    pub fn descendant_for_point_range(&self, start: Point, end: Point) -> Option<Node<'tree>> {
        self.descendant_spanning(start, end, false, Node::start_position, Node::end_position)
    }

    pub fn named_descendant_for_point_range(&self, start: Point, end: Point) -> Option<Node<'tree>> {
        self.descendant_spanning(start, end, true, Node::start_position, Node::end_position)
    }

    fn descendant_spanning<K: Ord + Copy>(
        &self,
        start: K,
        end: K,
        named_only: bool,
        start_of: fn(&Node<'tree>) -> K,
        end_of: fn(&Node<'tree>) -> K,
    ) -> Option<Node<'tree>> {
        if start > end || start < start_of(self) || end > end_of(self) {
            return None;
        }

        let mut node = *self;
        let mut found = *self;
        'descend: loop {
            for child in node.children() {
                let child_end = end_of(&child);
                // Must reach the end of the range and pass its start.
                if child_end < end || (child_end <= start && start_of(&child) < start) {
                    continue;
                }
                if start < start_of(&child) {
                    break;
                }
                node = child;
                if !named_only || child.is_named() {
                    found = child;
                }
                continue 'descend;
            }
            return Some(found);
        }
    }

    /// S-expression of the named structure, with field labels.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out, None);
        out
    }

    fn write_sexp(&self, out: &mut String, field: Option<&str>) {
        let shown = self.is_named() || self.is_missing();
        if shown {
            if !out.is_empty() {
                out.push(' ');
            }
            if let Some(field) = field {
                out.push_str(field);
                out.push_str(": ");
            }
            out.push('(');
            if self.is_missing() {
                out.push_str("MISSING ");
                if self.is_named() {
                    out.push_str(self.kind());
                } else {
                    out.push('"');
                    out.push_str(self.kind());
                    out.push('"');
                }
            } else {
                out.push_str(self.kind());
            }
        }
        for (child, child_field) in self.visible_children() {
            let name = child_field.and_then(|f| self.language().field_name_for_id(f));
            child.write_sexp(out, name);
        }
        if shown {
            out.push(')');
        }
    }

    pub fn utf8_text<'a>(&self, source: &'a [u8]) -> Result<&'a str, Utf8Error> {
        let bytes = source
            .get(self.byte_range())
            .unwrap_or_default();
        std::str::from_utf8(bytes)
    }

    /// Text of a node parsed from UTF-16 input.
    pub fn utf16_text<'a>(&self, source: &'a [u16]) -> &'a [u16] {
        let start = self.start_byte() as usize / 2;
        let end = self.end_byte() as usize / 2;
        source.get(start..end).unwrap_or_default()
    }

    pub fn walk(&self) -> TreeCursor<'tree> {
        TreeCursor::new(*self)
    }

    /// Moves this handle's position through `edit`, the way
    /// [`Tree::edit`] moves the tree.
    pub fn edit(&mut self, edit: &Edit) {
        self.offset = edit.edit_position(self.offset);
        self.start = edit.edit_position(self.start);
    }
}

fn find_parent<'tree>(node: Node<'tree>, target: &Node<'tree>) -> Option<Node<'tree>> {
    for child in node.children() {
        if child == *target {
            return Some(node);
        }
        if child.start_byte() > target.start_byte() {
            break;
        }
        if target.end_byte() <= child.end_byte()
            && child.child_count() > 0
            && let Some(found) = find_parent(child, target)
        {
            return Some(found);
        }
    }
    None
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && self.subtree.ptr_eq(other.subtree)
            && self.start == other.start
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.subtree.id().hash(state);
        self.start.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Node {} {} - {}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}
