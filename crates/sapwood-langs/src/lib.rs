#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Grammars for sapwood.
//!
//! Each grammar is exposed as a function returning a shared [`Language`];
//! repeated calls hand out the same handle.

use std::sync::LazyLock;

use sapwood_lib::Language;

pub mod calc;

pub use calc::CalcGrammar;

/// The `calc` language: assignments and arithmetic, one statement per line.
pub fn calc() -> Language {
    static LANG: LazyLock<Language> = LazyLock::new(|| Language::new(CalcGrammar::new()));
    LANG.clone()
}

pub fn from_name(name: &str) -> Option<Language> {
    match name.to_ascii_lowercase().as_str() {
        "calc" | "calculator" => Some(calc()),
        _ => None,
    }
}

pub fn from_ext(ext: &str) -> Option<Language> {
    match ext.to_ascii_lowercase().as_str() {
        "calc" => Some(calc()),
        _ => None,
    }
}

pub fn all() -> Vec<Language> {
    vec![calc()]
}
