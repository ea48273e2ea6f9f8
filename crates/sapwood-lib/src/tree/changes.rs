//! Structural diff between an edited tree and its reparse.

use sapwood_core::{Length, Range};

use super::Tree;
use super::iter::{Positioned, RawChildren};

pub(super) fn changed_ranges(old: &Tree, new: &Tree) -> Vec<Range> {
    let mut changes = Changes::default();
    let old_root = root_entry(old);
    let new_root = root_entry(new);

    if old_root.subtree.total_size().bytes != new_root.subtree.total_size().bytes {
        tracing::debug!(
            old = old_root.subtree.total_size().bytes,
            new = new_root.subtree.total_size().bytes,
            "trees disagree on document length"
        );
        changes.mark(Range::from_lengths(Length::ZERO, new_root.end()));
    } else {
        compare(old_root, new_root, &mut changes);
    }

    let document_end = new_root.end();
    for range in symmetric_difference(old.included_ranges(), new.included_ranges()) {
        if range.start_byte >= document_end.bytes {
            continue;
        }
        let end = if range.end_byte > document_end.bytes { document_end } else { range.end() };
        changes.mark(Range::from_lengths(range.start(), end));
    }

    changes.finish()
}

fn root_entry(tree: &Tree) -> Positioned<'_> {
    Positioned {
        subtree: tree.root_subtree(),
        offset: Length::ZERO,
        field: None,
        index: 0,
    }
}

fn compare(old: Positioned<'_>, new: Positioned<'_>, changes: &mut Changes) {
    let (old_tree, new_tree) = (old.subtree, new.subtree);
    if old.offset == new.offset && old_tree.ptr_eq(new_tree) && !old_tree.has_changes() {
        return;
    }

    let same_shape = old_tree.symbol() == new_tree.symbol()
        && old.start().bytes == new.start().bytes
        && old.end().bytes == new.end().bytes
        && old_tree.is_leaf() == new_tree.is_leaf()
        && same_flags(old_tree, new_tree);
    if !same_shape {
        changes.mark_pair(old, new);
        return;
    }

    if old_tree.is_leaf() {
        let same_text = old.offset == new.offset && old_tree.fingerprint() == new_tree.fingerprint();
        if old_tree.has_changes() && !same_text {
            changes.mark_pair(old, new);
        }
        return;
    }

    compare_children(old, new, changes);
}

fn same_flags(a: &super::Subtree, b: &super::Subtree) -> bool {
    let (a, b) = (a.flags(), b.flags());
    a.visible == b.visible && a.named == b.named && a.extra == b.extra && a.missing == b.missing
}

/// Pairs children by position; anything without an exact partner changed.
fn compare_children(old: Positioned<'_>, new: Positioned<'_>, changes: &mut Changes) {
    let mut old_children = RawChildren::new(old.subtree, old.offset);
    let mut new_children = RawChildren::new(new.subtree, new.offset);
    let mut old_child = old_children.next();
    let mut new_child = new_children.next();

    loop {
        match (old_child, new_child) {
            (Some(o), Some(n)) => {
                if o.start().bytes == n.start().bytes && o.end().bytes == n.end().bytes {
                    compare(o, n, changes);
                    old_child = old_children.next();
                    new_child = new_children.next();
                    continue;
                }
                changes.mark_pair(o, n);
                let (old_end, new_end) = (o.end().bytes, n.end().bytes);
                if old_end <= new_end {
                    old_child = old_children.next();
                }
                if new_end <= old_end {
                    new_child = new_children.next();
                }
            }
            (Some(o), None) => {
                changes.mark(span(o));
                old_child = old_children.next();
            }
            (None, Some(n)) => {
                changes.mark(span(n));
                new_child = new_children.next();
            }
            (None, None) => break,
        }
    }
}

/// Padding-inclusive extent, so whitespace edits are reported too.
fn span(entry: Positioned<'_>) -> Range {
    Range::from_lengths(entry.offset, entry.end())
}

fn symmetric_difference<'a>(old: &'a [Range], new: &'a [Range]) -> impl Iterator<Item = &'a Range> {
    let removed = old.iter().filter(move |r| !new.contains(r));
    let added = new.iter().filter(move |r| !old.contains(r));
    removed.chain(added)
}

#[derive(Default)]
struct Changes {
    ranges: Vec<Range>,
}

impl Changes {
    fn mark(&mut self, range: Range) {
        self.ranges.push(range);
    }

    fn mark_pair(&mut self, old: Positioned<'_>, new: Positioned<'_>) {
        self.mark(span(old).union(&span(new)));
    }

    /// Sorted, with overlapping and touching ranges merged.
    fn finish(mut self) -> Vec<Range> {
        self.ranges.sort_by_key(|r| (r.start_byte, r.end_byte));
        let mut merged: Vec<Range> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges {
            match merged.last_mut() {
                Some(last) if range.start_byte <= last.end_byte => {
                    if range.end_byte > last.end_byte {
                        last.end_byte = range.end_byte;
                        last.end_point = range.end_point;
                    }
                }
                _ => merged.push(range),
            }
        }
        merged
    }
}
