//! Compiled pattern representation.

use sapwood_core::{FieldId, Symbol};

use super::predicate::{PredicateStep, QueryPredicate};

/// One top-level pattern of a query.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    /// Sibling steps; the first is matched at the candidate node.
    pub items: Vec<SeqItem>,
    pub predicates: Vec<QueryPredicate>,
    pub predicate_steps: Vec<PredicateStep>,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Pattern {
    /// The leading step when it repeats, like `(comment)+ @doc`.
    pub fn leading_repetition(&self) -> Option<&Step> {
        match self.items.first() {
            Some(SeqItem::Step(step)) if step.quantifier.repeats() => Some(step),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SeqItem {
    Step(Step),
    /// `.` between, before or after steps.
    Anchor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    pub matcher: Matcher,
    pub field: Option<FieldId>,
    /// Bound to the first node the step consumes.
    pub captures: Vec<u32>,
    pub quantifier: Quantifier,
}

impl Step {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            matcher,
            field: None,
            captures: Vec::new(),
            quantifier: Quantifier::One,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Matcher {
    Node(NodePattern),
    /// Each branch must start at the same child.
    Alternation(Vec<Vec<SeqItem>>),
    Group(Vec<SeqItem>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodePattern {
    pub kind: NodeKind,
    pub negated_fields: Vec<FieldId>,
    pub children: Vec<SeqItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Symbol(Symbol),
    /// `(_)`
    Named,
    /// `_`
    Any,
    /// `(ERROR)`
    Error,
    /// `(MISSING)` or `(MISSING kind)`
    Missing(Option<Symbol>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quantifier {
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    pub fn min(self) -> usize {
        match self {
            Quantifier::One | Quantifier::OneOrMore => 1,
            Quantifier::ZeroOrOne | Quantifier::ZeroOrMore => 0,
        }
    }

    pub fn max(self) -> usize {
        match self {
            Quantifier::One | Quantifier::ZeroOrOne => 1,
            Quantifier::ZeroOrMore | Quantifier::OneOrMore => usize::MAX,
        }
    }

    pub fn repeats(self) -> bool {
        self.max() > 1
    }
}
