//! Syntax kinds for query patterns.
//!
//! `SyntaxKind` covers both the tokens recognized by the lexer and the node
//! kinds built by the parser. `PatternLang` plugs it into Rowan.

use logos::Logos;
use rowan::Language;

/// Tokens first, then nodes, then the `__LAST` sentinel.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    #[token("!")]
    Negation,

    #[token("_", priority = 3)]
    Underscore,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    /// Quoted literal, escapes included. Unterminated strings lex as `Garbage`.
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Str,

    #[token("ERROR")]
    KwError,

    #[token("MISSING")]
    KwMissing,

    /// Node, field and capture names. Keywords win on exact matches.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Id,

    /// `#eq?`, `#match?`, `#set!` and friends.
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_.\-]*[?!]?")]
    PredicateName,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r";[^\n]*", allow_greedy = true)]
    Comment,

    /// Coalesced unrecognized characters.
    Garbage,

    // Nodes
    Root,
    /// `(kind ...)`, `(_ ...)`, `(ERROR)`, `(MISSING kind)`
    NamedNode,
    /// `"text"`
    AnonymousNode,
    /// Bare `_`
    Wildcard,
    /// `[ ... ]`
    Alternation,
    /// `( (a) (b) )`
    Group,
    /// `name: pattern`
    Field,
    /// `!name`
    NegatedField,
    /// `pattern @name`
    Capture,
    /// `pattern*`, `pattern+`, `pattern?`
    Quantified,
    /// `.`
    Anchor,
    /// `(#name? args)`
    Predicate,
    /// `@name` as a predicate argument
    CaptureRef,

    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Comment)
    }

    pub fn is_quantifier(self) -> bool {
        matches!(self, Star | Plus | Question)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternLang {}

impl Language for PatternLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: bounds checked above and SyntaxKind is repr(u16).
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<PatternLang>;
pub type SyntaxToken = rowan::SyntaxToken<PatternLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;
