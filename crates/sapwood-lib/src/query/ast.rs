//! Typed views over the pattern CST.

use rowan::TextRange;

use super::cst::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            pub fn text_range(&self) -> TextRange {
                self.0.text_range()
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(NamedNode, NamedNode);
ast_node!(AnonymousNode, AnonymousNode);
ast_node!(Wildcard, Wildcard);
ast_node!(Alternation, Alternation);
ast_node!(Group, Group);
ast_node!(Field, Field);
ast_node!(NegatedField, NegatedField);
ast_node!(Capture, Capture);
ast_node!(Quantified, Quantified);
ast_node!(Anchor, Anchor);
ast_node!(Predicate, Predicate);
ast_node!(CaptureRef, CaptureRef);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    NamedNode(NamedNode),
    AnonymousNode(AnonymousNode),
    Wildcard(Wildcard),
    Alternation(Alternation),
    Group(Group),
    Field(Field),
    NegatedField(NegatedField),
    Capture(Capture),
    Quantified(Quantified),
    Anchor(Anchor),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::NamedNode => NamedNode::cast(node).map(Expr::NamedNode),
            SyntaxKind::AnonymousNode => AnonymousNode::cast(node).map(Expr::AnonymousNode),
            SyntaxKind::Wildcard => Wildcard::cast(node).map(Expr::Wildcard),
            SyntaxKind::Alternation => Alternation::cast(node).map(Expr::Alternation),
            SyntaxKind::Group => Group::cast(node).map(Expr::Group),
            SyntaxKind::Field => Field::cast(node).map(Expr::Field),
            SyntaxKind::NegatedField => NegatedField::cast(node).map(Expr::NegatedField),
            SyntaxKind::Capture => Capture::cast(node).map(Expr::Capture),
            SyntaxKind::Quantified => Quantified::cast(node).map(Expr::Quantified),
            SyntaxKind::Anchor => Anchor::cast(node).map(Expr::Anchor),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Expr::NamedNode(n) => n.as_cst(),
            Expr::AnonymousNode(n) => n.as_cst(),
            Expr::Wildcard(n) => n.as_cst(),
            Expr::Alternation(n) => n.as_cst(),
            Expr::Group(n) => n.as_cst(),
            Expr::Field(n) => n.as_cst(),
            Expr::NegatedField(n) => n.as_cst(),
            Expr::Capture(n) => n.as_cst(),
            Expr::Quantified(n) => n.as_cst(),
            Expr::Anchor(n) => n.as_cst(),
        }
    }

    /// Range without leading trivia.
    pub fn text_range(&self) -> TextRange {
        trimmed_range(self.as_cst())
    }
}

/// An entry in a node's or group's child list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Expr(Expr),
    Predicate(Predicate),
}

fn items(node: &SyntaxNode) -> impl Iterator<Item = Item> + '_ {
    node.children().filter_map(|child| match child.kind() {
        SyntaxKind::Predicate => Predicate::cast(child).map(Item::Predicate),
        _ => Expr::cast(child).map(Item::Expr),
    })
}

fn tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + '_ {
    node.children_with_tokens().filter_map(SyntaxElement::into_token)
}

fn first_token(node: &SyntaxNode, kinds: &[SyntaxKind]) -> Option<SyntaxToken> {
    tokens(node).find(|t| kinds.contains(&t.kind()))
}

fn trimmed_range(node: &SyntaxNode) -> TextRange {
    let start = node
        .descendants_with_tokens()
        .filter_map(SyntaxElement::into_token)
        .find(|t| !t.kind().is_trivia())
        .map_or(node.text_range().start(), |t| t.text_range().start());
    TextRange::new(start, node.text_range().end())
}

impl Root {
    pub fn patterns(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

impl NamedNode {
    /// `Id`, `_`, `ERROR` or `MISSING`.
    pub fn kind_token(&self) -> Option<SyntaxToken> {
        first_token(
            &self.0,
            &[
                SyntaxKind::Id,
                SyntaxKind::Underscore,
                SyntaxKind::KwError,
                SyntaxKind::KwMissing,
            ],
        )
    }

    /// The node type named after `MISSING`, if any.
    pub fn missing_kind(&self) -> Option<SyntaxToken> {
        tokens(&self.0)
            .skip_while(|t| t.kind() != SyntaxKind::KwMissing)
            .skip(1)
            .find(|t| !t.kind().is_trivia())
            .filter(|t| matches!(t.kind(), SyntaxKind::Id | SyntaxKind::Str))
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        items(&self.0)
    }
}

impl AnonymousNode {
    pub fn literal(&self) -> Option<SyntaxToken> {
        first_token(&self.0, &[SyntaxKind::Str])
    }
}

impl Alternation {
    pub fn branches(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

impl Group {
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        items(&self.0)
    }
}

impl Field {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, &[SyntaxKind::Id])
    }

    pub fn value(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl NegatedField {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, &[SyntaxKind::Id])
    }
}

impl Capture {
    pub fn inner(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    /// The `@` token.
    pub fn at(&self) -> Option<SyntaxToken> {
        first_token(&self.0, &[SyntaxKind::At])
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, &[SyntaxKind::Id])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantifierKind {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Quantified {
    pub fn inner(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        first_token(
            &self.0,
            &[SyntaxKind::Question, SyntaxKind::Star, SyntaxKind::Plus],
        )
    }

    pub fn kind(&self) -> Option<QuantifierKind> {
        match self.operator()?.kind() {
            SyntaxKind::Question => Some(QuantifierKind::ZeroOrOne),
            SyntaxKind::Star => Some(QuantifierKind::ZeroOrMore),
            SyntaxKind::Plus => Some(QuantifierKind::OneOrMore),
            _ => None,
        }
    }
}

/// A predicate argument, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PredicateArgument {
    Capture(CaptureRef),
    /// A quoted string or a bare identifier.
    Text(SyntaxToken),
}

impl Predicate {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, &[SyntaxKind::PredicateName])
    }

    pub fn arguments(&self) -> impl Iterator<Item = PredicateArgument> + '_ {
        self.0.children_with_tokens().filter_map(|element| match element {
            rowan::NodeOrToken::Node(node) => CaptureRef::cast(node).map(PredicateArgument::Capture),
            rowan::NodeOrToken::Token(token) => matches!(token.kind(), SyntaxKind::Str | SyntaxKind::Id)
                .then_some(PredicateArgument::Text(token)),
        })
    }
}

impl CaptureRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, &[SyntaxKind::Id])
    }
}

/// Text of a `Str` or `Id` token, with quotes removed and escapes resolved.
pub fn token_value(token: &SyntaxToken) -> String {
    let text = token.text();
    if token.kind() != SyntaxKind::Str {
        return text.to_string();
    }
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}
