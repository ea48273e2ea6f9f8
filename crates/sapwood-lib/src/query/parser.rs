//! Recursive-descent parser building a Rowan CST for query sources.
//!
//! Trivia is buffered and flushed into the tree in front of the next node or
//! token. Postfix quantifiers and captures wrap the pattern they follow
//! through checkpoints. The first syntax error aborts the parse.

use rowan::{Checkpoint, GreenNodeBuilder};

use super::cst::{SyntaxKind, SyntaxNode};
use super::error::{QueryError, QueryErrorKind};
use super::lexer::{Token, lex, token_text};

use SyntaxKind::*;

/// Nesting depth of parentheses and brackets.
const MAX_DEPTH: u32 = 256;

type ParseResult<T = ()> = Result<T, QueryError>;

pub fn parse(source: &str) -> ParseResult<SyntaxNode> {
    let mut parser = PatternParser::new(source, lex(source));
    parser.parse_root()?;
    Ok(SyntaxNode::new_root(parser.builder.finish()))
}

struct PatternParser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    trivia: Vec<Token>,
    builder: GreenNodeBuilder<'static>,
    depth: u32,
}

impl<'src> PatternParser<'src> {
    fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            trivia: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            depth: 0,
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos)
            && token.kind.is_trivia()
        {
            self.trivia.push(*token);
            self.pos += 1;
        }
    }

    fn drain_trivia(&mut self) {
        for token in self.trivia.drain(..) {
            self.builder.token(token.kind.into(), token_text(self.source, &token));
        }
    }

    /// Current non-trivia kind, `None` at the end.
    fn current(&mut self) -> Option<SyntaxKind> {
        self.skip_trivia();
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    /// Lookahead past trivia; `nth(0)` is the current token.
    fn nth(&mut self, n: usize) -> Option<SyntaxKind> {
        self.skip_trivia();
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map(|t| t.kind)
    }

    fn at(&mut self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    /// Next token glued to the previous one, with no trivia in between.
    fn at_adjacent(&self, kind: SyntaxKind) -> bool {
        self.trivia.is_empty() && self.tokens.get(self.pos).is_some_and(|t| t.kind == kind)
    }

    fn bump(&mut self) {
        self.drain_trivia();
        if let Some(token) = self.tokens.get(self.pos).copied() {
            self.builder.token(token.kind.into(), token_text(self.source, &token));
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> ParseResult {
        if self.at(kind) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.drain_trivia();
        self.builder.checkpoint()
    }

    /// A syntax error at the current token, or at the end of the source.
    fn error(&mut self, message: impl Into<String>) -> QueryError {
        self.skip_trivia();
        let span = match self.tokens.get(self.pos) {
            Some(token) => token.start()..usize::from(token.span.end()),
            None => self.source.len()..self.source.len(),
        };
        QueryError::new(QueryErrorKind::Syntax, self.source, span, message)
    }

    fn enter(&mut self) -> ParseResult {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("pattern nests too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn parse_root(&mut self) -> ParseResult {
        self.start_node(Root);
        while let Some(kind) = self.current() {
            if kind == ParenOpen && self.nth(1) == Some(PredicateName) {
                return Err(self.error("predicates must be placed inside a pattern"));
            }
            self.parse_pattern()?;
        }
        self.drain_trivia();
        self.finish_node();
        Ok(())
    }

    /// One pattern with its quantifier and captures.
    fn parse_pattern(&mut self) -> ParseResult {
        let checkpoint = self.checkpoint();
        self.parse_primary()?;

        if let Some(kind) = self.current()
            && kind.is_quantifier()
        {
            self.start_node_at(checkpoint, Quantified);
            self.bump();
            self.finish_node();
        }

        while self.at(At) {
            self.start_node_at(checkpoint, Capture);
            self.bump();
            if !self.at_adjacent(Id) {
                return Err(self.error("expected a capture name after `@`"));
            }
            self.bump();
            self.finish_node();
        }
        Ok(())
    }

    fn parse_primary(&mut self) -> ParseResult {
        match self.current() {
            Some(ParenOpen) => match self.nth(1) {
                Some(ParenOpen | BracketOpen | Str) => self.parse_group(),
                Some(Id | Underscore | KwError | KwMissing) => self.parse_named_node(),
                Some(PredicateName) => Err(self.error("predicates must follow the patterns they test")),
                _ => {
                    self.bump_silently();
                    Err(self.error("expected a node name, `_` or a nested pattern"))
                }
            },
            Some(BracketOpen) => self.parse_alternation(),
            Some(Str) => self.leaf_node(AnonymousNode),
            Some(Underscore) => self.leaf_node(Wildcard),
            Some(Dot) => self.leaf_node(Anchor),
            Some(Negation) => {
                self.start_node(NegatedField);
                self.bump();
                if !self.at_adjacent(Id) {
                    return Err(self.error("expected a field name after `!`"));
                }
                self.bump();
                self.finish_node();
                Ok(())
            }
            Some(Id) if self.nth(1) == Some(Colon) => {
                self.start_node(Field);
                self.bump();
                self.bump();
                if !self.current().is_some_and(starts_pattern) {
                    return Err(self.error("expected a pattern after the field name"));
                }
                self.parse_pattern()?;
                self.finish_node();
                Ok(())
            }
            Some(Id) => Err(self.error("node names must be wrapped in parentheses")),
            Some(ParenClose | BracketClose) => Err(self.error("unexpected closing delimiter")),
            Some(_) => Err(self.error("unexpected token")),
            None => Err(self.error("unexpected end of query")),
        }
    }

    /// Moves past the current token without building, so the next error
    /// points at what follows it.
    fn bump_silently(&mut self) {
        self.skip_trivia();
        self.pos += 1;
        self.trivia.clear();
    }

    fn leaf_node(&mut self, kind: SyntaxKind) -> ParseResult {
        self.start_node(kind);
        self.bump();
        self.finish_node();
        Ok(())
    }

    fn parse_named_node(&mut self) -> ParseResult {
        self.enter()?;
        self.start_node(NamedNode);
        self.bump();
        let is_missing = self.at(KwMissing);
        self.bump();
        if is_missing && matches!(self.current(), Some(Id | Str)) {
            self.bump();
        }
        self.parse_children(ParenClose, "`)`")?;
        self.finish_node();
        self.exit();
        Ok(())
    }

    fn parse_group(&mut self) -> ParseResult {
        self.enter()?;
        self.start_node(Group);
        self.bump();
        self.parse_children(ParenClose, "`)`")?;
        self.finish_node();
        self.exit();
        Ok(())
    }

    fn parse_alternation(&mut self) -> ParseResult {
        self.enter()?;
        self.start_node(Alternation);
        self.bump();
        loop {
            match self.current() {
                Some(BracketClose) => break,
                None => return Err(self.error("unclosed `[`, expected `]`")),
                Some(ParenOpen) if self.nth(1) == Some(PredicateName) => {
                    return Err(self.error("predicates are not allowed inside alternations"));
                }
                Some(_) => self.parse_pattern()?,
            }
        }
        self.bump();
        self.finish_node();
        self.exit();
        Ok(())
    }

    /// Child patterns and predicates up to `close`, which is consumed.
    fn parse_children(&mut self, close: SyntaxKind, what: &str) -> ParseResult {
        loop {
            match self.current() {
                Some(kind) if kind == close => break,
                None => return Err(self.error(format!("unclosed delimiter, expected {what}"))),
                Some(ParenOpen) if self.nth(1) == Some(PredicateName) => self.parse_predicate()?,
                Some(_) => self.parse_pattern()?,
            }
        }
        self.expect(close, what)
    }

    fn parse_predicate(&mut self) -> ParseResult {
        self.start_node(Predicate);
        self.bump();
        self.bump();
        loop {
            match self.current() {
                Some(ParenClose) => break,
                Some(At) => {
                    self.start_node(CaptureRef);
                    self.bump();
                    if !self.at_adjacent(Id) {
                        return Err(self.error("expected a capture name after `@`"));
                    }
                    self.bump();
                    self.finish_node();
                }
                Some(Str | Id) => self.bump(),
                None => return Err(self.error("unclosed predicate, expected `)`")),
                Some(_) => return Err(self.error("expected a capture, string or identifier")),
            }
        }
        self.bump();
        self.finish_node();
        Ok(())
    }
}

fn starts_pattern(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        ParenOpen | BracketOpen | Str | Underscore | Dot | Negation | Id
    )
}
