//! Backtracking matcher for compiled patterns.
//!
//! Matching is written in continuation-passing style: every step hands the
//! position after what it consumed to the rest of the sequence, so plain
//! steps can enumerate every candidate child while quantified steps commit to
//! the longest run whose continuation succeeds. Continuations report whether
//! they reached at least one complete match, or break to abandon the search.

use std::ops::ControlFlow;

use rustc_hash::FxHashSet;
use sapwood_core::FieldId;

use super::pattern::{Matcher, NodeKind, NodePattern, Pattern, SeqItem, Step};
use crate::tree::Node;

/// A visible child together with the field it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sibling<'tree> {
    pub node: Node<'tree>,
    pub field: Option<FieldId>,
}

/// `(capture id, node)` pairs in pattern order.
pub(crate) type Bindings<'tree> = Vec<(u32, Node<'tree>)>;

/// `Continue(found)` or `Break` once the caller has seen enough.
type Flow = ControlFlow<(), bool>;

type Continuation<'k, 'tree> = &'k mut dyn FnMut(usize, &mut Bindings<'tree>) -> Flow;

pub(crate) fn children_of(node: Node<'_>) -> Vec<Sibling<'_>> {
    node.visible_children()
        .map(|(node, field)| Sibling { node, field })
        .collect()
}

/// Where the next step may start looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Start {
    /// Any later child.
    Free,
    /// Only past anonymous children, up to the next named one.
    Adjacent,
    /// Exactly at the position.
    Exact,
}

/// Distinct sets of bindings for `pattern` rooted at `siblings[index]`, in
/// discovery order. Enumeration stops after `max` results.
pub(crate) fn match_at<'tree>(
    pattern: &Pattern,
    siblings: &[Sibling<'tree>],
    index: usize,
    max: usize,
) -> Vec<Bindings<'tree>> {
    let mut results: Vec<Bindings<'tree>> = Vec::new();
    if max == 0 || index >= siblings.len() || continues_run(pattern, siblings, index) {
        return results;
    }

    let mut seen: FxHashSet<Bindings<'tree>> = FxHashSet::default();
    let mut bindings = Vec::new();
    let _ = sequence(
        &pattern.items,
        siblings,
        index,
        Start::Exact,
        &mut bindings,
        &mut |_, bindings| {
            if seen.insert(bindings.clone()) {
                results.push(bindings.clone());
                if results.len() >= max {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(true)
        },
    );
    results
}

/// A leading repetition only starts at the first node of its run.
fn continues_run(pattern: &Pattern, siblings: &[Sibling<'_>], index: usize) -> bool {
    let Some(step) = pattern.leading_repetition() else {
        return false;
    };
    for previous in (0..index).rev() {
        if first_solution(step, siblings, previous).is_some() {
            return true;
        }
        let node = siblings[previous].node;
        if node.is_named() && !node.is_extra() {
            return false;
        }
    }
    false
}

fn sequence<'tree>(
    items: &[SeqItem],
    children: &[Sibling<'tree>],
    pos: usize,
    start: Start,
    bindings: &mut Bindings<'tree>,
    k: Continuation<'_, 'tree>,
) -> Flow {
    match items.split_first() {
        None => k(pos, bindings),
        Some((SeqItem::Anchor, rest)) => {
            if rest.iter().all(|item| *item == SeqItem::Anchor) {
                // Nothing named may follow the last step.
                if children[pos..].iter().any(|c| c.node.is_named()) {
                    return ControlFlow::Continue(false);
                }
                k(pos, bindings)
            } else {
                let start = if start == Start::Exact {
                    Start::Exact
                } else {
                    Start::Adjacent
                };
                sequence(rest, children, pos, start, bindings, k)
            }
        }
        Some((SeqItem::Step(step), rest)) => step_at(
            step,
            children,
            pos,
            start,
            bindings,
            &mut |end, bindings| sequence(rest, children, end, Start::Free, bindings, k),
        ),
    }
}

fn candidates(children: &[Sibling<'_>], pos: usize, start: Start) -> std::ops::Range<usize> {
    let len = children.len();
    let end = match start {
        Start::Free => len,
        Start::Exact => (pos + 1).min(len),
        Start::Adjacent => children[pos.min(len)..]
            .iter()
            .position(|c| c.node.is_named())
            .map_or(len, |offset| pos + offset + 1),
    };
    pos.min(end)..end
}

fn step_at<'tree>(
    step: &Step,
    children: &[Sibling<'tree>],
    pos: usize,
    start: Start,
    bindings: &mut Bindings<'tree>,
    k: Continuation<'_, 'tree>,
) -> Flow {
    if step.quantifier.repeats() || step.quantifier.min() == 0 {
        return repetition(step, children, pos, start, bindings, k);
    }
    let mut found = false;
    for index in candidates(children, pos, start) {
        found |= unit(step, children, index, bindings, k)?;
    }
    ControlFlow::Continue(found)
}

/// One occurrence of `step` starting at `children[index]`.
fn unit<'tree>(
    step: &Step,
    children: &[Sibling<'tree>],
    index: usize,
    bindings: &mut Bindings<'tree>,
    k: Continuation<'_, 'tree>,
) -> Flow {
    let child = children[index];
    if step.field.is_some() && child.field != step.field {
        return ControlFlow::Continue(false);
    }

    let mark = bindings.len();
    bindings.extend(step.captures.iter().map(|&capture| (capture, child.node)));
    let found = match &step.matcher {
        Matcher::Node(pattern) => node(pattern, child.node, bindings, &mut |bindings| {
            k(index + 1, bindings)
        }),
        Matcher::Alternation(branches) => {
            let mut found = false;
            for branch in branches {
                match sequence(branch, children, index, Start::Exact, bindings, k) {
                    ControlFlow::Continue(hit) => found |= hit,
                    ControlFlow::Break(()) => {
                        bindings.truncate(mark);
                        return ControlFlow::Break(());
                    }
                }
            }
            ControlFlow::Continue(found)
        }
        Matcher::Group(items) => sequence(items, children, index, Start::Exact, bindings, k),
    };
    bindings.truncate(mark);
    found
}

fn node<'tree>(
    pattern: &NodePattern,
    node: Node<'tree>,
    bindings: &mut Bindings<'tree>,
    k: &mut dyn FnMut(&mut Bindings<'tree>) -> Flow,
) -> Flow {
    if !kind_matches(pattern.kind, node) {
        return ControlFlow::Continue(false);
    }
    if pattern
        .negated_fields
        .iter()
        .any(|&field| node.child_by_field_id(field).is_some())
    {
        return ControlFlow::Continue(false);
    }
    if pattern.children.is_empty() {
        return k(bindings);
    }
    let children = children_of(node);
    sequence(&pattern.children, &children, 0, Start::Free, bindings, &mut |_, bindings| {
        k(bindings)
    })
}

fn kind_matches(kind: NodeKind, node: Node<'_>) -> bool {
    match kind {
        NodeKind::Symbol(symbol) => node.symbol() == symbol,
        NodeKind::Named => node.is_named(),
        NodeKind::Any => true,
        NodeKind::Error => node.is_error(),
        NodeKind::Missing(None) => node.is_missing(),
        NodeKind::Missing(Some(symbol)) => node.is_missing() && node.symbol() == symbol,
    }
}

/// The first way `step` matches at `children[index]`: where it ends and
/// what it binds.
fn first_solution<'tree>(
    step: &Step,
    children: &[Sibling<'tree>],
    index: usize,
) -> Option<(usize, Bindings<'tree>)> {
    let mut first = None;
    let mut scratch = Vec::new();
    let _ = unit(step, children, index, &mut scratch, &mut |end, bindings| {
        first = Some((end, bindings.clone()));
        ControlFlow::Break(())
    });
    first
}

/// Greedy run of `step`.
///
/// The run starts at the first candidate that matches and then extends over
/// consecutive occurrences, stepping over anonymous and extra children that
/// don't match. A named child that doesn't match ends it. Lengths are tried
/// longest first; the first one whose continuation succeeds wins.
fn repetition<'tree>(
    step: &Step,
    children: &[Sibling<'tree>],
    pos: usize,
    start: Start,
    bindings: &mut Bindings<'tree>,
    k: Continuation<'_, 'tree>,
) -> Flow {
    let max = step.quantifier.max();
    let min = step.quantifier.min();

    let mut run: Vec<(usize, Bindings<'tree>)> = Vec::new();
    if let Some(first) = candidates(children, pos, start).find_map(|i| first_solution(step, children, i)) {
        let mut next = first.0;
        run.push(first);
        while run.len() < max && next < children.len() {
            if let Some(occurrence) = first_solution(step, children, next) {
                // Zero-width groups would never advance.
                if occurrence.0 <= next {
                    break;
                }
                next = occurrence.0;
                run.push(occurrence);
                continue;
            }
            let sibling = children[next].node;
            if sibling.is_named() && !sibling.is_extra() {
                break;
            }
            next += 1;
        }
    }

    for len in (min.max(1)..=run.len()).rev() {
        let mark = bindings.len();
        for (_, unit_bindings) in &run[..len] {
            bindings.extend(unit_bindings.iter().copied());
        }
        let found = k(run[len - 1].0, bindings);
        bindings.truncate(mark);
        if found != ControlFlow::Continue(false) {
            return found;
        }
    }
    if min == 0 {
        k(pos, bindings)
    } else {
        ControlFlow::Continue(false)
    }
}
