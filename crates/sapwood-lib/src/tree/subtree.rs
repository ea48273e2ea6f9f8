//! Shared subtree storage.
//!
//! Positions are relative: each subtree records the whitespace before it
//! (`padding`) and its own `size`. Absolute positions are recovered by summing
//! while descending, which is what lets an edit touch only the spine of nodes
//! that contain it.

use std::fmt;
use std::sync::Arc;

use sapwood_core::{Edit, FieldId, Length, Symbol};

/// Reference-counted node storage. Cloning shares, editing copies on write.
#[derive(Clone)]
pub struct Subtree(pub(crate) Arc<SubtreeData>);

#[derive(Clone)]
pub(crate) struct SubtreeData {
    pub symbol: Symbol,
    pub padding: Length,
    pub size: Length,
    pub flags: Flags,
    pub children: Vec<Child>,
    /// Hash of the padding and content text, leaves only.
    pub fingerprint: u64,
    /// Children as seen through hidden nodes.
    pub visible_child_count: u32,
    pub named_child_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Flags {
    pub visible: bool,
    pub named: bool,
    pub extra: bool,
    pub missing: bool,
    pub has_changes: bool,
    pub has_error: bool,
}

/// A subtree in its parent's child list, with the field it fills.
#[derive(Clone)]
pub struct Child {
    pub(crate) subtree: Subtree,
    pub(crate) field: Option<FieldId>,
}

impl Child {
    pub fn new(subtree: Subtree) -> Self {
        Self {
            subtree,
            field: None,
        }
    }

    pub fn with_field(subtree: Subtree, field: FieldId) -> Self {
        Self {
            subtree,
            field: Some(field),
        }
    }

    pub fn subtree(&self) -> &Subtree {
        &self.subtree
    }

    pub fn field(&self) -> Option<FieldId> {
        self.field
    }
}

impl From<Subtree> for Child {
    fn from(subtree: Subtree) -> Self {
        Child::new(subtree)
    }
}

impl Subtree {
    pub(crate) fn from_data(data: SubtreeData) -> Self {
        Self(Arc::new(data))
    }

    pub fn symbol(&self) -> Symbol {
        self.0.symbol
    }

    pub fn padding(&self) -> Length {
        self.0.padding
    }

    pub fn size(&self) -> Length {
        self.0.size
    }

    pub fn total_size(&self) -> Length {
        self.0.padding + self.0.size
    }

    pub fn children(&self) -> &[Child] {
        &self.0.children
    }

    pub fn child_count(&self) -> usize {
        self.0.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.0.children.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.0.flags.visible
    }

    pub fn is_named(&self) -> bool {
        self.0.flags.named
    }

    pub fn is_extra(&self) -> bool {
        self.0.flags.extra
    }

    pub fn is_missing(&self) -> bool {
        self.0.flags.missing
    }

    pub fn is_error(&self) -> bool {
        self.0.symbol == Symbol::ERROR
    }

    pub fn has_changes(&self) -> bool {
        self.0.flags.has_changes
    }

    pub fn has_error(&self) -> bool {
        self.0.flags.has_error
    }

    pub(crate) fn flags(&self) -> Flags {
        self.0.flags
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        self.0.fingerprint
    }

    pub(crate) fn visible_child_count(&self) -> u32 {
        self.0.visible_child_count
    }

    pub(crate) fn named_child_count(&self) -> u32 {
        self.0.named_child_count
    }

    /// Same allocation.
    pub fn ptr_eq(&self, other: &Subtree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Applies `edit`, given in this subtree's coordinates, copying every
    /// shared node it has to touch.
    /// Folds leading whitespace into the size so the node starts where its
    /// padding did. Children keep their positions.
    pub(crate) fn absorb_padding(&mut self) {
        if self.padding().bytes == 0 {
            return;
        }
        let data = Arc::make_mut(&mut self.0);
        data.size = data.padding + data.size;
        data.padding = Length::ZERO;
    }

    pub(crate) fn edit(&mut self, edit: &Edit) {
        let edit = RelativeEdit {
            start: edit.start(),
            old_end: edit.old_end(),
            new_end: edit.new_end(),
        };
        edit_subtree(self, edit);
    }
}

impl fmt::Debug for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subtree")
            .field("symbol", &self.0.symbol)
            .field("padding", &self.0.padding.bytes)
            .field("size", &self.0.size.bytes)
            .field("children", &self.0.children.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct RelativeEdit {
    start: Length,
    old_end: Length,
    new_end: Length,
}

fn edit_subtree(tree: &mut Subtree, mut edit: RelativeEdit) {
    let is_noop = edit.old_end.bytes == edit.start.bytes && edit.new_end.bytes == edit.start.bytes;
    let mut is_pure_insertion = edit.old_end.bytes == edit.start.bytes;
    let column_shifted = edit.new_end.extent.column != edit.old_end.extent.column;

    let mut padding = tree.padding();
    let mut size = tree.size();
    let total = padding + size;

    if edit.start.bytes > total.bytes || (is_noop && edit.start.bytes == total.bytes) {
        return;
    }

    if edit.old_end.bytes <= padding.bytes {
        // Entirely inside the leading whitespace: shift, keep the size.
        padding = edit.new_end + (padding - edit.old_end);
    } else if edit.start.bytes < padding.bytes {
        // Starts in the whitespace, ends inside the content.
        size = size - (edit.old_end - padding);
        padding = edit.new_end;
    } else if edit.start.bytes < total.bytes
        || (edit.start.bytes == total.bytes && is_pure_insertion)
    {
        size = (edit.new_end - padding) + (total - edit.old_end);
    }

    let data = Arc::make_mut(&mut tree.0);
    data.padding = padding;
    data.size = size;
    data.flags.has_changes = true;

    let mut child_right = Length::ZERO;
    for (i, child) in data.children.iter_mut().enumerate() {
        let child_size = child.subtree.total_size();
        let child_left = child_right;
        child_right = child_left + child_size;

        if child_right.bytes < edit.start.bytes {
            continue;
        }

        // Stop at the first child starting after the edit, unless columns
        // moved on the edited row.
        let starts_after = child_left.bytes > edit.old_end.bytes
            || (child_left.bytes == edit.old_end.bytes && child_size.bytes > 0 && i > 0);
        if starts_after && (!column_shifted || child_left.extent.row > edit.old_end.extent.row) {
            break;
        }

        let child_edit = RelativeEdit {
            start: edit.start - child_left,
            old_end: edit.old_end - child_left,
            new_end: edit.new_end - child_left,
        };

        // Inserted text belongs to the first child touching the edit; later
        // children only see the removal.
        if child_right.bytes > edit.start.bytes
            || (child_right.bytes == edit.start.bytes && is_pure_insertion)
        {
            edit.new_end = edit.start;
            is_pure_insertion = false;
        }

        edit_subtree(&mut child.subtree, child_edit);
    }
}
