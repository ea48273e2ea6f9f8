//! Structural queries over syntax trees.
//!
//! # Pipeline
//!
//! Query source is lexed with Logos, parsed into a lossless Rowan CST, viewed
//! through typed AST wrappers and compiled into [`pattern`] steps with every
//! name resolved against the [`Language`]. [`QueryCursor`] runs the compiled
//! patterns over a tree.
//!
//! Compilation stops at the first problem and reports it as a [`QueryError`]
//! with its byte offset.

mod ast;
mod compile;
mod cst;
mod cursor;
mod error;
mod lexer;
mod matcher;
mod parser;
mod pattern;
mod predicate;

use sapwood_core::{Interner, StringId};

pub use cursor::{QueryCaptures, QueryCursor, QueryMatches};
pub use error::{QueryError, QueryErrorKind};
pub use predicate::{PredicateArg, PredicateStep, QueryPredicate};

use crate::language::Language;
use crate::tree::Node;
use pattern::Pattern;

/// Compiled patterns for one language.
#[derive(Debug, Clone)]
pub struct Query {
    language: Language,
    patterns: Vec<Pattern>,
    captures: Interner,
    strings: Interner,
    disabled_captures: Vec<bool>,
    disabled_patterns: Vec<bool>,
}

impl Query {
    pub fn new(language: &Language, source: &str) -> Result<Self, QueryError> {
        let root = parser::parse(source)?;
        let Some(root) = ast::Root::cast(root) else {
            return Err(QueryError::new(QueryErrorKind::Syntax, source, 0..0, "malformed query"));
        };

        let mut compiler = compile::Compiler::new(source, language);
        let patterns = compiler.compile(&root)?;
        if let Some(extra) = patterns.get(usize::from(u16::MAX) + 1) {
            return Err(QueryError::new(
                QueryErrorKind::Unknown,
                source,
                extra.start_byte..extra.end_byte,
                "too many patterns",
            ));
        }
        tracing::debug!(
            language = language.name(),
            patterns = patterns.len(),
            captures = compiler.captures.len(),
            "compiled query"
        );

        Ok(Self {
            language: language.clone(),
            disabled_captures: vec![false; compiler.captures.len()],
            disabled_patterns: vec![false; patterns.len()],
            patterns,
            captures: compiler.captures,
            strings: compiler.strings,
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Capture names indexed by capture id.
    pub fn capture_names(&self) -> Vec<&str> {
        self.captures.iter().map(|(_, name)| name).collect()
    }

    pub fn capture_name_for_id(&self, id: u32) -> Option<&str> {
        self.captures.resolve(StringId::from_raw(id))
    }

    pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
        self.captures.lookup(name).map(StringId::as_u32)
    }

    pub fn string_value_for_id(&self, id: u32) -> Option<&str> {
        self.strings.resolve(StringId::from_raw(id))
    }

    /// Byte offset where the pattern's text starts in the query source.
    pub fn start_byte_for_pattern(&self, index: usize) -> Option<usize> {
        self.patterns.get(index).map(|p| p.start_byte)
    }

    pub fn end_byte_for_pattern(&self, index: usize) -> Option<usize> {
        self.patterns.get(index).map(|p| p.end_byte)
    }

    /// Flat predicate encoding: each clause is its operator string followed by
    /// its arguments and closed by [`PredicateStep::Done`].
    pub fn predicate_steps(&self, index: usize) -> &[PredicateStep] {
        self.patterns
            .get(index)
            .map_or(&[], |p| p.predicate_steps.as_slice())
    }

    pub fn predicates(&self, index: usize) -> &[QueryPredicate] {
        self.patterns.get(index).map_or(&[], |p| p.predicates.as_slice())
    }

    /// Stops reporting `name` in matches. Structure is still matched, so
    /// patterns keep matching the same nodes. Cannot be undone.
    pub fn disable_capture(&mut self, name: &str) {
        if let Some(id) = self.captures.lookup(name) {
            tracing::debug!(capture = name, "disabling capture");
            self.disabled_captures[id.index()] = true;
        }
    }

    /// Removes the pattern from matching. Cannot be undone.
    pub fn disable_pattern(&mut self, index: usize) {
        if let Some(disabled) = self.disabled_patterns.get_mut(index) {
            tracing::debug!(pattern = index, "disabling pattern");
            *disabled = true;
        }
    }

    pub fn is_capture_disabled(&self, id: u32) -> bool {
        self.disabled_captures.get(id as usize).copied().unwrap_or(false)
    }

    pub fn is_pattern_disabled(&self, index: usize) -> bool {
        self.disabled_patterns.get(index).copied().unwrap_or(false)
    }

    /// Pattern counts never exceed `u16::MAX + 1`, so indices fit.
    pub(crate) fn enabled_patterns(&self) -> impl Iterator<Item = (u16, &Pattern)> {
        self.patterns
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.disabled_patterns[*index])
            .map(|(index, pattern)| (index as u16, pattern))
    }
}

/// A node bound to a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapture<'tree> {
    pub node: Node<'tree>,
    pub index: u32,
}

/// One way a pattern matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'tree> {
    /// Unique within the cursor that produced it; pass to
    /// [`QueryCursor::remove_match`].
    pub id: u32,
    /// Index into the query's patterns; pass through `usize::from` for
    /// [`Query::predicates`] and friends.
    pub pattern_index: u16,
    pub captures: Vec<QueryCapture<'tree>>,
}

impl<'tree> QueryMatch<'tree> {
    pub fn nodes_for_capture_index(&self, index: u32) -> impl Iterator<Item = Node<'tree>> + '_ {
        self.captures
            .iter()
            .filter(move |c| c.index == index)
            .map(|c| c.node)
    }
}
