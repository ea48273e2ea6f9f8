//! sapwood: incremental syntax trees and structural queries.
//!
//! A [`Parser`] drives a [`Grammar`] over source text and produces a [`Tree`].
//! Trees are cheap to clone, can be [edited](Tree::edit) in place after a text
//! change, and handed back to the parser so unchanged subtrees are reused.
//! [`Query`] compiles S-expression patterns; [`QueryCursor`] runs them.
//!
//! # Example
//!
//! ```
//! use sapwood_lib::{Parser, Query, QueryCursor};
//!
//! let mut parser = Parser::new();
//! parser.set_language(sapwood_langs::calc()).unwrap();
//! let tree = parser.parse("x = 1", None).unwrap();
//!
//! let query = Query::new(tree.language(), "(identifier) @id").unwrap();
//! let mut cursor = QueryCursor::new(&query, tree.root_node());
//! let m = cursor.next_match().unwrap();
//! assert_eq!(m.captures[0].node.byte_range(), 0..1);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod error;
pub mod language;
pub mod parser;
pub mod query;
pub mod tree;

#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};
pub use language::{Grammar, Language, ParseStep, ParseTask};
pub use parser::{CancellationFlag, ParseInput, ParseOptions, Parser};
pub use query::{
    PredicateArg, PredicateStep, Query, QueryCapture, QueryCaptures, QueryCursor, QueryError,
    QueryErrorKind, QueryMatch, QueryMatches, QueryPredicate,
};
pub use tree::{Child, Node, Subtree, Tree, TreeBuilder, TreeCursor};

pub use sapwood_core::{
    Edit, FieldId, InputEncoding, LANGUAGE_VERSION, Length, MIN_COMPATIBLE_LANGUAGE_VERSION, Point,
    Range, Symbol, SymbolMetadata, SymbolType,
};
