//! Lazy execution of a [`Query`] over one subtree.
//!
//! The cursor walks the tree depth-first. When it enters a node it runs every
//! enabled pattern rooted there and buffers the matches; when it leaves the
//! node those matches become available to [`QueryCursor::next_match`]. The
//! capture stream is ordered by `(start byte, capture id, pattern, match)`
//! and a capture is held back until the traversal has entered a node that
//! starts after it, since no later match can bind anything earlier.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Range;

use sapwood_core::Point;

use super::matcher::{Bindings, Sibling, children_of, match_at};
use super::{Query, QueryCapture, QueryMatch};
use crate::tree::Node;

/// Runs a query against the subtree of one node.
///
/// Nothing is traversed until the first call to a `next_*` method.
pub struct QueryCursor<'query, 'tree> {
    query: &'query Query,
    root: Node<'tree>,
    byte_range: Option<Range<u32>>,
    point_range: Option<Range<Point>>,
    match_limit: Option<usize>,
    execution: Option<Execution<'tree>>,
}

impl<'query, 'tree> QueryCursor<'query, 'tree> {
    pub fn new(query: &'query Query, node: Node<'tree>) -> Self {
        Self {
            query,
            root: node,
            byte_range: None,
            point_range: None,
            match_limit: None,
            execution: None,
        }
    }

    /// Caps how many matches may wait for delivery at once.
    pub fn with_match_limit(mut self, limit: usize) -> Self {
        self.match_limit = Some(limit);
        self
    }

    pub fn match_limit(&self) -> Option<usize> {
        self.match_limit
    }

    /// True once a buffered match was dropped to honor the match limit.
    pub fn did_exceed_match_limit(&self) -> bool {
        self.execution.as_ref().is_some_and(|e| e.exceeded_match_limit)
    }

    /// Starts over at `node`, keeping the range and limit.
    pub fn reset(&mut self, node: Node<'tree>) {
        self.root = node;
        self.execution = None;
    }

    /// Only report matches rooted at nodes intersecting `range`.
    pub fn set_byte_range(&mut self, range: Range<u32>) -> &mut Self {
        if self.started() {
            tracing::warn!(?range, "ignoring byte range set after execution started");
        } else {
            self.byte_range = Some(range);
        }
        self
    }

    pub fn set_point_range(&mut self, range: Range<Point>) -> &mut Self {
        if self.started() {
            tracing::warn!(?range, "ignoring point range set after execution started");
        } else {
            self.point_range = Some(range);
        }
        self
    }

    fn started(&self) -> bool {
        self.execution.is_some()
    }

    fn execution(&mut self) -> &mut Execution<'tree> {
        let root = self.root;
        let bounds = Bounds {
            bytes: self.byte_range.clone(),
            points: self.point_range.clone(),
        };
        let match_limit = self.match_limit;
        self.execution
            .get_or_insert_with(|| Execution::new(root, bounds, match_limit))
    }

    /// The next match in discovery order.
    ///
    /// Matches rooted at a node are discovered when the traversal leaves it,
    /// so they are not sorted by position.
    pub fn next_match(&mut self) -> Option<QueryMatch<'tree>> {
        let query = self.query;
        let execution = self.execution();
        loop {
            if let Some(found) = execution.take_ready_match() {
                return Some(found);
            }
            if !execution.advance(query) {
                return None;
            }
        }
    }

    /// The next capture in position order.
    pub fn next_capture(&mut self) -> Option<QueryCapture<'tree>> {
        self.next_capture_with_match()
            .map(|(found, position)| found.captures[position])
    }

    /// The next capture in position order, with the match it belongs to and
    /// its position in that match's captures.
    pub fn next_capture_with_match(&mut self) -> Option<(QueryMatch<'tree>, usize)> {
        let query = self.query;
        let execution = self.execution();
        execution.streaming = true;
        loop {
            if let Some(released) = execution.release_capture() {
                return Some(released);
            }
            if execution.done {
                return None;
            }
            execution.advance(query);
        }
    }

    /// Forgets a match so none of its remaining captures are delivered.
    pub fn remove_match(&mut self, id: u32) {
        if let Some(execution) = self.execution.as_mut() {
            execution.remove(id);
        }
    }

    pub fn matches(&mut self) -> QueryMatches<'_, 'query, 'tree> {
        QueryMatches { cursor: self }
    }

    pub fn captures(&mut self) -> QueryCaptures<'_, 'query, 'tree> {
        QueryCaptures { cursor: self }
    }
}

pub struct QueryMatches<'c, 'query, 'tree> {
    cursor: &'c mut QueryCursor<'query, 'tree>,
}

impl<'tree> Iterator for QueryMatches<'_, '_, 'tree> {
    type Item = QueryMatch<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_match()
    }
}

pub struct QueryCaptures<'c, 'query, 'tree> {
    cursor: &'c mut QueryCursor<'query, 'tree>,
}

impl<'tree> Iterator for QueryCaptures<'_, '_, 'tree> {
    type Item = QueryCapture<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_capture()
    }
}

struct Bounds {
    bytes: Option<Range<u32>>,
    points: Option<Range<Point>>,
}

impl Bounds {
    fn intersects(&self, node: &Node<'_>) -> bool {
        let bytes = self.bytes.as_ref().is_none_or(|r| {
            overlaps(r, node.start_byte(), node.end_byte())
        });
        let points = self.points.as_ref().is_none_or(|r| {
            overlaps(r, node.start_position(), node.end_position())
        });
        bytes && points
    }
}

/// An empty range still touches the nodes around its position.
fn overlaps<T: Ord + Copy>(range: &Range<T>, start: T, end: T) -> bool {
    if range.start == range.end {
        start <= range.start && range.start <= end
    } else {
        end > range.start && start < range.end
    }
}

/// A child list being walked, and the matches rooted at its current child.
struct Frame<'tree> {
    siblings: Vec<Sibling<'tree>>,
    index: usize,
    /// The current child has moved the frontier but not been matched yet.
    announced: bool,
    entered: Vec<u32>,
}

impl<'tree> Frame<'tree> {
    fn new(siblings: Vec<Sibling<'tree>>) -> Self {
        Self {
            siblings,
            index: 0,
            announced: false,
            entered: Vec::new(),
        }
    }

    fn next_child(&mut self) {
        self.index += 1;
        self.announced = false;
    }
}

struct Pending<'tree> {
    pattern_index: u16,
    captures: Vec<QueryCapture<'tree>>,
    /// Captures already handed out by the capture stream.
    streamed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct CaptureKey {
    start_byte: u32,
    capture: u32,
    pattern_index: u16,
    match_id: u32,
    position: usize,
}

struct Execution<'tree> {
    stack: Vec<Frame<'tree>>,
    bounds: Bounds,
    done: bool,
    /// Start byte of the last node entered. No future match binds anything
    /// before it.
    frontier: u32,
    next_id: u32,
    pending: BTreeMap<u32, Pending<'tree>>,
    ready: VecDeque<u32>,
    captures: BTreeSet<CaptureKey>,
    /// Set by the capture stream; capture-less matches are then dropped.
    streaming: bool,
    match_limit: Option<usize>,
    exceeded_match_limit: bool,
}

impl<'tree> Execution<'tree> {
    fn new(root: Node<'tree>, bounds: Bounds, match_limit: Option<usize>) -> Self {
        Self {
            stack: vec![Frame::new(vec![Sibling {
                node: root,
                field: None,
            }])],
            bounds,
            done: false,
            frontier: 0,
            next_id: 0,
            pending: BTreeMap::new(),
            ready: VecDeque::new(),
            captures: BTreeSet::new(),
            streaming: false,
            match_limit,
            exceeded_match_limit: false,
        }
    }

    /// One traversal event: reaching a node, matching at it, or leaving a
    /// child list. Returns false once the traversal is over.
    ///
    /// Reaching a node only moves the frontier, so captures before it can be
    /// released before the node's own matches are buffered.
    fn advance(&mut self, query: &Query) -> bool {
        let Some(frame) = self.stack.last_mut() else {
            self.done = true;
            return false;
        };

        if frame.index >= frame.siblings.len() {
            self.stack.pop();
            if let Some(parent) = self.stack.last_mut() {
                let entered = std::mem::take(&mut parent.entered);
                parent.next_child();
                self.make_ready(entered);
            }
            return true;
        }

        let index = frame.index;
        let node = frame.siblings[index].node;
        if !frame.announced {
            frame.announced = true;
            self.frontier = node.start_byte();
            return true;
        }

        let inside = self.bounds.intersects(&node);
        // One past the limit is enough to overflow it; the rest would only
        // evict matches found here.
        let max = self.match_limit.map_or(usize::MAX, |limit| limit.saturating_add(1));
        let found: Vec<(u16, Bindings<'tree>)> = if inside {
            query
                .enabled_patterns()
                .flat_map(|(pattern_index, pattern)| {
                    match_at(pattern, &frame.siblings, index, max)
                        .into_iter()
                        .map(move |bindings| (pattern_index, bindings))
                })
                .collect()
        } else {
            Vec::new()
        };

        let entered: Vec<u32> = found
            .into_iter()
            .filter_map(|(pattern_index, bindings)| self.register(query, pattern_index, bindings))
            .collect();

        if inside && node.child_count() > 0 {
            if let Some(frame) = self.stack.last_mut() {
                frame.entered = entered;
            }
            self.stack.push(Frame::new(children_of(node)));
        } else {
            if let Some(frame) = self.stack.last_mut() {
                frame.next_child();
            }
            self.make_ready(entered);
        }
        true
    }

    /// Once the capture stream has started, it is the only way matches are
    /// delivered.
    fn make_ready(&mut self, ids: Vec<u32>) {
        if !self.streaming {
            self.ready.extend(ids);
        }
    }

    fn register(&mut self, query: &Query, pattern_index: u16, bindings: Bindings<'tree>) -> Option<u32> {
        let captures: Vec<QueryCapture<'tree>> = bindings
            .into_iter()
            .filter(|(index, _)| !query.is_capture_disabled(*index))
            .map(|(index, node)| QueryCapture { node, index })
            .collect();
        if self.streaming && captures.is_empty() {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        tracing::trace!(id, pattern = pattern_index, captures = captures.len(), "match found");

        for (position, capture) in captures.iter().enumerate() {
            self.captures.insert(CaptureKey {
                start_byte: capture.node.start_byte(),
                capture: capture.index,
                pattern_index,
                match_id: id,
                position,
            });
        }
        self.pending.insert(
            id,
            Pending {
                pattern_index,
                captures,
                streamed: 0,
            },
        );

        if let Some(limit) = self.match_limit
            && self.pending.len() > limit
            && let Some((oldest, dropped)) = self.pending.pop_first()
        {
            tracing::debug!(id = oldest, limit, "match limit exceeded, dropping oldest match");
            self.forget_captures(oldest, &dropped);
            self.exceeded_match_limit = true;
        }
        Some(id)
    }

    fn take_ready_match(&mut self) -> Option<QueryMatch<'tree>> {
        while let Some(id) = self.ready.pop_front() {
            let untouched = self.pending.get(&id).is_some_and(|p| p.streamed == 0);
            if !untouched {
                continue;
            }
            if let Some(pending) = self.pending.remove(&id) {
                self.forget_captures(id, &pending);
                return Some(QueryMatch {
                    id,
                    pattern_index: pending.pattern_index,
                    captures: pending.captures,
                });
            }
        }
        None
    }

    fn release_capture(&mut self) -> Option<(QueryMatch<'tree>, usize)> {
        let first = *self.captures.first()?;
        if !self.done && first.start_byte >= self.frontier {
            return None;
        }
        self.captures.pop_first();

        let pending = self.pending.get_mut(&first.match_id)?;
        pending.streamed += 1;
        let found = QueryMatch {
            id: first.match_id,
            pattern_index: pending.pattern_index,
            captures: pending.captures.clone(),
        };
        if pending.streamed == pending.captures.len() {
            self.pending.remove(&first.match_id);
        }
        Some((found, first.position))
    }

    fn remove(&mut self, id: u32) {
        if let Some(pending) = self.pending.remove(&id) {
            tracing::trace!(id, "match removed");
            self.forget_captures(id, &pending);
        }
    }

    fn forget_captures(&mut self, id: u32, pending: &Pending<'tree>) {
        for (position, capture) in pending.captures.iter().enumerate() {
            self.captures.remove(&CaptureKey {
                start_byte: capture.node.start_byte(),
                capture: capture.index,
                pattern_index: pending.pattern_index,
                match_id: id,
                position,
            });
        }
    }
}
