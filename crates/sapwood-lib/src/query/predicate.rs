//! Predicates attached to patterns.
//!
//! Predicates are recorded, never evaluated. Each one is available in two
//! shapes: structured [`QueryPredicate`]s, and the flat step list where a
//! [`PredicateStep::Done`] closes every clause.

/// One entry of the flat predicate encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateStep {
    /// Capture id, see [`Query::capture_name_for_id`](super::Query::capture_name_for_id).
    Capture(u32),
    /// String id, see [`Query::string_value_for_id`](super::Query::string_value_for_id).
    String(u32),
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PredicateArg {
    Capture(u32),
    String(Box<str>),
}

/// A clause like `(#eq? @name "main")`; `operator` is `eq?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryPredicate {
    pub operator: Box<str>,
    pub args: Vec<PredicateArg>,
}
