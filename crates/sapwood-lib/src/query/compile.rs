//! Lowers the typed AST into matchable patterns, resolving names against
//! the language.

use rowan::TextRange;
use sapwood_core::Interner;

use super::ast::{self, Expr, Item, PredicateArgument};
use super::cst::SyntaxToken;
use super::error::{QueryError, QueryErrorKind};
use super::pattern::{Matcher, NodeKind, NodePattern, Pattern, Quantifier, SeqItem, Step};
use super::predicate::{PredicateArg, PredicateStep, QueryPredicate};
use crate::language::Language;

type CompileResult<T> = Result<T, QueryError>;

pub(crate) struct Compiler<'a> {
    source: &'a str,
    language: &'a Language,
    pub captures: Interner,
    pub strings: Interner,
    /// Capture ids bound by the pattern being compiled.
    bound: Vec<u32>,
    /// Predicates of the pattern being compiled, in source order.
    predicates: Vec<ast::Predicate>,
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str, language: &'a Language) -> Self {
        Self {
            source,
            language,
            captures: Interner::new(),
            strings: Interner::new(),
            bound: Vec::new(),
            predicates: Vec::new(),
        }
    }

    pub fn compile(&mut self, root: &ast::Root) -> CompileResult<Vec<Pattern>> {
        root.patterns().map(|expr| self.pattern(&expr)).collect()
    }

    fn error(&self, kind: QueryErrorKind, range: TextRange, message: impl Into<String>) -> QueryError {
        QueryError::new(kind, self.source, range.into(), message)
    }

    fn unknown(&self, expr: &Expr, message: impl Into<String>) -> QueryError {
        self.error(QueryErrorKind::Unknown, expr.text_range(), message)
    }

    fn pattern(&mut self, expr: &Expr) -> CompileResult<Pattern> {
        self.bound.clear();
        self.predicates.clear();

        let mut items = match expr {
            Expr::Field(_) | Expr::NegatedField(_) => {
                return Err(self.unknown(expr, "fields can only constrain children of a node"));
            }
            Expr::Anchor(_) => {
                return Err(self.unknown(expr, "anchors can only appear among the children of a node"));
            }
            Expr::Group(group) => self.sequence(group.items(), None)?,
            _ => vec![SeqItem::Step(self.step(expr)?)],
        };
        if !items.iter().any(|item| matches!(item, SeqItem::Step(_))) {
            return Err(self.unknown(expr, "pattern has nothing to match"));
        }
        // A match must consume the node it is rooted at.
        if let Some(SeqItem::Step(first)) = items.first_mut() {
            first.quantifier = match first.quantifier {
                Quantifier::ZeroOrOne => Quantifier::One,
                Quantifier::ZeroOrMore => Quantifier::OneOrMore,
                other => other,
            };
        }

        let (predicates, predicate_steps) = self.lower_predicates()?;
        let range = expr.text_range();
        Ok(Pattern {
            items,
            predicates,
            predicate_steps,
            start_byte: range.start().into(),
            end_byte: range.end().into(),
        })
    }

    /// Children of a node (`negated` is `Some`) or a group.
    fn sequence(
        &mut self,
        items: impl Iterator<Item = Item>,
        mut negated: Option<&mut Vec<sapwood_core::FieldId>>,
    ) -> CompileResult<Vec<SeqItem>> {
        let mut sequence = Vec::new();
        for item in items {
            let expr = match item {
                Item::Predicate(predicate) => {
                    self.predicates.push(predicate);
                    continue;
                }
                Item::Expr(expr) => expr,
            };
            match &expr {
                Expr::Anchor(_) => {
                    if sequence.last() != Some(&SeqItem::Anchor) {
                        sequence.push(SeqItem::Anchor);
                    }
                }
                Expr::NegatedField(field) => {
                    let Some(negated) = negated.as_deref_mut() else {
                        return Err(self.unknown(&expr, "negated fields can only appear inside a node"));
                    };
                    let Some(name) = field.name() else {
                        return Err(self.unknown(&expr, "missing field name"));
                    };
                    negated.push(self.field_id(&name)?);
                }
                _ => sequence.push(SeqItem::Step(self.step(&expr)?)),
            }
        }
        Ok(sequence)
    }

    fn step(&mut self, expr: &Expr) -> CompileResult<Step> {
        match expr {
            Expr::Capture(capture) => {
                let mut step = self.inner_step(expr, capture.inner())?;
                if let Some(name) = capture.name() {
                    let id = self.captures.intern(name.text()).as_u32();
                    if !self.bound.contains(&id) {
                        self.bound.push(id);
                    }
                    step.captures.push(id);
                }
                Ok(step)
            }
            Expr::Quantified(quantified) => {
                let mut step = self.inner_step(expr, quantified.inner())?;
                if step.quantifier != Quantifier::One {
                    return Err(self.unknown(expr, "a pattern takes at most one quantifier"));
                }
                step.quantifier = match quantified.kind() {
                    Some(ast::QuantifierKind::ZeroOrOne) => Quantifier::ZeroOrOne,
                    Some(ast::QuantifierKind::ZeroOrMore) => Quantifier::ZeroOrMore,
                    Some(ast::QuantifierKind::OneOrMore) => Quantifier::OneOrMore,
                    None => Quantifier::One,
                };
                Ok(step)
            }
            Expr::Field(field) => {
                let Some(name) = field.name() else {
                    return Err(self.unknown(expr, "missing field name"));
                };
                let id = self.field_id(&name)?;
                let mut step = self.inner_step(expr, field.value())?;
                if step.field.is_some() || matches!(step.matcher, Matcher::Group(_)) {
                    return Err(self.unknown(expr, "a field must constrain a single node"));
                }
                step.field = Some(id);
                Ok(step)
            }
            Expr::NamedNode(node) => Ok(Step::new(Matcher::Node(self.named_node(node)?))),
            Expr::AnonymousNode(node) => {
                let Some(literal) = node.literal() else {
                    return Err(self.unknown(expr, "missing literal"));
                };
                let symbol = self.symbol(&literal, false)?;
                Ok(Step::new(Matcher::Node(leaf(NodeKind::Symbol(symbol)))))
            }
            Expr::Wildcard(_) => Ok(Step::new(Matcher::Node(leaf(NodeKind::Any)))),
            Expr::Alternation(alternation) => {
                let mut branches = Vec::new();
                for branch in alternation.branches() {
                    let sequence = match &branch {
                        Expr::Group(group) => self.sequence(group.items(), None)?,
                        Expr::Anchor(_) | Expr::NegatedField(_) => {
                            return Err(self.unknown(&branch, "alternation branches must match nodes"));
                        }
                        _ => vec![SeqItem::Step(self.step(&branch)?)],
                    };
                    if !matches!(sequence.first(), Some(SeqItem::Step(_))) {
                        return Err(self.unknown(&branch, "alternation branches must start with a node"));
                    }
                    branches.push(sequence);
                }
                if branches.is_empty() {
                    return Err(self.unknown(expr, "empty alternation"));
                }
                Ok(Step::new(Matcher::Alternation(branches)))
            }
            Expr::Group(group) => {
                let sequence = self.sequence(group.items(), None)?;
                if !matches!(sequence.first(), Some(SeqItem::Step(_))) {
                    return Err(self.unknown(expr, "a group must start with a node"));
                }
                Ok(Step::new(Matcher::Group(sequence)))
            }
            Expr::Anchor(_) => Err(self.unknown(expr, "anchors cannot be quantified or captured")),
            Expr::NegatedField(_) => Err(self.unknown(expr, "negated fields cannot be quantified or captured")),
        }
    }

    fn inner_step(&mut self, outer: &Expr, inner: Option<Expr>) -> CompileResult<Step> {
        match inner {
            Some(inner) => self.step(&inner),
            None => Err(self.unknown(outer, "missing pattern")),
        }
    }

    fn named_node(&mut self, node: &ast::NamedNode) -> CompileResult<NodePattern> {
        let Some(kind_token) = node.kind_token() else {
            return Err(self.error(QueryErrorKind::Syntax, node.text_range(), "missing node type"));
        };
        let kind = match kind_token.kind() {
            super::cst::SyntaxKind::Underscore => NodeKind::Named,
            super::cst::SyntaxKind::KwError => NodeKind::Error,
            super::cst::SyntaxKind::KwMissing => match node.missing_kind() {
                Some(token) => {
                    let named = token.kind() == super::cst::SyntaxKind::Id;
                    NodeKind::Missing(Some(self.symbol(&token, named)?))
                }
                None => NodeKind::Missing(None),
            },
            _ => NodeKind::Symbol(self.symbol(&kind_token, true)?),
        };

        let mut negated_fields = Vec::new();
        let children = self.sequence(node.items(), Some(&mut negated_fields))?;
        Ok(NodePattern {
            kind,
            negated_fields,
            children,
        })
    }

    fn symbol(&self, token: &SyntaxToken, named: bool) -> CompileResult<sapwood_core::Symbol> {
        let name = ast::token_value(token);
        self.language.symbol_for_name(&name, named).ok_or_else(|| {
            self.error(
                QueryErrorKind::NodeType,
                token.text_range(),
                format!("unknown node type `{name}`"),
            )
        })
    }

    fn field_id(&self, token: &SyntaxToken) -> CompileResult<sapwood_core::FieldId> {
        self.language.field_id_for_name(token.text()).ok_or_else(|| {
            self.error(
                QueryErrorKind::Field,
                token.text_range(),
                format!("unknown field `{}`", token.text()),
            )
        })
    }

    fn lower_predicates(&mut self) -> CompileResult<(Vec<QueryPredicate>, Vec<PredicateStep>)> {
        let mut predicates = Vec::new();
        let mut steps = Vec::new();
        for predicate in std::mem::take(&mut self.predicates) {
            let operator = predicate
                .name()
                .map(|t| t.text().trim_start_matches('#').to_string())
                .unwrap_or_default();
            steps.push(PredicateStep::String(self.strings.intern(&operator).as_u32()));

            let mut args = Vec::new();
            for argument in predicate.arguments() {
                match argument {
                    PredicateArgument::Capture(capture) => {
                        let name = capture.name().map(|t| t.text().to_string()).unwrap_or_default();
                        let id = self
                            .captures
                            .lookup(&name)
                            .map(|id| id.as_u32())
                            .filter(|id| self.bound.contains(id))
                            .ok_or_else(|| {
                                self.error(
                                    QueryErrorKind::Capture,
                                    capture.text_range(),
                                    format!("capture `@{name}` is not defined in this pattern"),
                                )
                            })?;
                        steps.push(PredicateStep::Capture(id));
                        args.push(PredicateArg::Capture(id));
                    }
                    PredicateArgument::Text(token) => {
                        let value = ast::token_value(&token);
                        steps.push(PredicateStep::String(self.strings.intern(&value).as_u32()));
                        args.push(PredicateArg::String(value.into_boxed_str()));
                    }
                }
            }
            steps.push(PredicateStep::Done);
            predicates.push(QueryPredicate {
                operator: operator.into_boxed_str(),
                args,
            });
        }
        Ok((predicates, steps))
    }
}

fn leaf(kind: NodeKind) -> NodePattern {
    NodePattern {
        kind,
        negated_fields: Vec::new(),
        children: Vec::new(),
    }
}
