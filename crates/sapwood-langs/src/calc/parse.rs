//! Step-wise parse task for `calc`.
//!
//! Each step either reuses a whole statement from the old tree or scans one
//! token. Statements are parsed by recursive descent once their last token
//! has been seen.

use sapwood_core::{FieldId, Length, Symbol};
use sapwood_lib::{Child, ParseInput, ParseStep, ParseTask, Subtree, TreeBuilder};

use super::lexer::{self, Token};
use super::{
    ASSIGNMENT, BINARY_EXPRESSION, COMMENT, EQUALS, EXPRESSION_STATEMENT, FIELD_LEFT,
    FIELD_OPERAND, FIELD_OPERATOR, FIELD_RIGHT, IDENTIFIER, LPAREN, MINUS, NUMBER,
    PARENTHESIZED_EXPRESSION, PLUS, PROGRAM, PROGRAM_REPEAT, RPAREN, SEMICOLON, SLASH, STAR,
    UNARY_EXPRESSION,
};

/// Statements per hidden `program_repeat1` node.
const CHUNK: usize = 4;

#[derive(Debug, Default)]
pub(super) struct CalcParse {
    /// Where the next token's padding starts.
    position: Length,
    /// Tokens of the statement being collected.
    pending: Vec<Subtree>,
    /// Open parentheses in `pending`.
    depth: i32,
    items: Vec<Subtree>,
}

impl ParseTask for CalcParse {
    fn advance(&mut self, input: &ParseInput<'_>, builder: &mut TreeBuilder) -> ParseStep {
        if self.statement_complete() && self.next_token_on_new_line(input, self.position) {
            self.flush_statement(builder);
        }

        if self.pending.is_empty()
            && let Some(reused) = input.reusable_subtree(self.position, is_reusable)
            && self.still_terminated(input, &reused)
        {
            tracing::trace!(
                offset = self.position.bytes,
                bytes = reused.total_size().bytes,
                "reusing statement"
            );
            self.position += reused.total_size();
            self.items.push(builder.reuse(reused));
            return ParseStep::Continue;
        }

        let Some(start) = lexer::skip_padding(input, self.position) else {
            return ParseStep::Finished(self.finish(input, builder));
        };
        let Some(token) = lexer::scan(input, start) else {
            return ParseStep::Finished(self.finish(input, builder));
        };

        let leaf = self.leaf(input, builder, token);
        self.position = token.end;

        if token.symbol == COMMENT {
            let comment = builder.extra(leaf);
            if self.pending.is_empty() {
                self.items.push(comment);
            } else {
                self.pending.push(comment);
            }
            return ParseStep::Continue;
        }

        match token.symbol {
            LPAREN => self.depth += 1,
            RPAREN => self.depth -= 1,
            _ => {}
        }
        self.pending.push(leaf);
        if token.symbol == SEMICOLON {
            self.flush_statement(builder);
        }
        ParseStep::Continue
    }
}

impl CalcParse {
    fn leaf(&self, input: &ParseInput<'_>, builder: &TreeBuilder, token: Token) -> Subtree {
        builder.leaf(
            input,
            token.symbol,
            self.position,
            token.start - self.position,
            token.end - token.start,
        )
    }

    /// Nothing left dangling: balanced parentheses and no trailing operator.
    fn statement_complete(&self) -> bool {
        let last = self.pending.iter().rev().find(|t| !t.is_extra());
        match last {
            None => false,
            Some(token) => {
                self.depth <= 0
                    && !matches!(token.symbol(), EQUALS | PLUS | MINUS | STAR | SLASH | LPAREN)
            }
        }
    }

    /// True at the end of input too.
    fn next_token_on_new_line(&self, input: &ParseInput<'_>, from: Length) -> bool {
        lexer::skip_padding(input, from).is_none_or(|next| next.extent.row > from.extent.row)
    }

    /// An old statement that ended at a line break only stays one if the
    /// text after it still starts on a later line.
    fn still_terminated(&self, input: &ParseInput<'_>, reused: &Subtree) -> bool {
        let last = reused
            .children()
            .iter()
            .rev()
            .map(Child::subtree)
            .find(|s| !s.is_extra());
        reused.symbol() == COMMENT
            || last.is_some_and(|s| s.symbol() == SEMICOLON)
            || self.next_token_on_new_line(input, self.position + reused.total_size())
    }

    fn flush_statement(&mut self, builder: &TreeBuilder) {
        if self.pending.is_empty() {
            return;
        }
        let tokens = std::mem::take(&mut self.pending);
        self.depth = 0;
        self.items.push(StatementParser::new(tokens, builder).statement());
    }

    fn finish(&mut self, input: &ParseInput<'_>, builder: &TreeBuilder) -> Subtree {
        self.flush_statement(builder);

        let end = lexer::end_of_text(input, self.position);
        let padding = end - self.position;
        let eof = builder.leaf(input, Symbol::END, self.position, padding, Length::ZERO);

        let items = std::mem::take(&mut self.items);
        let mut children: Vec<Child> = if items.len() > CHUNK {
            items
                .chunks(CHUNK)
                .map(|chunk| {
                    let statements = chunk.iter().cloned().map(Child::new).collect();
                    Child::new(builder.node(PROGRAM_REPEAT, statements))
                })
                .collect()
        } else {
            items.into_iter().map(Child::new).collect()
        };
        children.push(Child::new(eof));
        builder.root(PROGRAM, children)
    }
}

fn is_reusable(symbol: Symbol) -> bool {
    matches!(symbol, ASSIGNMENT | EXPRESSION_STATEMENT | COMMENT)
}

fn precedence(symbol: Symbol) -> Option<u8> {
    match symbol {
        PLUS | MINUS => Some(1),
        STAR | SLASH => Some(2),
        _ => None,
    }
}

fn starts_expression(symbol: Symbol) -> bool {
    matches!(symbol, IDENTIFIER | NUMBER | LPAREN | MINUS)
}

/// Recursive descent over one statement's tokens.
///
/// Extras are never returned as results: whoever consumes the next real
/// token first receives the extras in front of it, so child order always
/// follows the text.
struct StatementParser<'b> {
    tokens: Vec<Subtree>,
    pos: usize,
    builder: &'b TreeBuilder,
}

impl<'b> StatementParser<'b> {
    fn new(tokens: Vec<Subtree>, builder: &'b TreeBuilder) -> Self {
        Self {
            tokens,
            pos: 0,
            builder,
        }
    }

    fn peek_nth(&self, n: usize) -> Option<Symbol> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.is_extra())
            .nth(n)
            .map(Subtree::symbol)
    }

    fn peek(&self) -> Option<Symbol> {
        self.peek_nth(0)
    }

    fn take_extras(&mut self, out: &mut Vec<Child>) {
        while let Some(token) = self.tokens.get(self.pos)
            && token.is_extra()
        {
            out.push(Child::new(token.clone()));
            self.pos += 1;
        }
    }

    fn next_token(&mut self, out: &mut Vec<Child>) -> Option<Subtree> {
        self.take_extras(out);
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(token)
    }

    fn bump(&mut self, out: &mut Vec<Child>, field: Option<FieldId>) {
        if let Some(token) = self.next_token(out) {
            out.push(with_field(token, field));
        }
    }

    fn statement(mut self) -> Subtree {
        let mut children = Vec::new();

        if !self.peek().is_some_and(starts_expression) && !self.is_assignment() {
            while self.pos < self.tokens.len() {
                self.bump(&mut children, None);
            }
            return self.error(children);
        }

        let kind = if self.is_assignment() {
            self.bump(&mut children, Some(FIELD_LEFT));
            self.bump(&mut children, None);
            let right = self.expression(&mut children, 0);
            children.push(Child::with_field(right, FIELD_RIGHT));
            ASSIGNMENT
        } else {
            let expression = self.expression(&mut children, 0);
            children.push(Child::new(expression));
            EXPRESSION_STATEMENT
        };

        let mut junk = Vec::new();
        while let Some(symbol) = self.peek()
            && symbol != SEMICOLON
        {
            self.bump(&mut junk, None);
        }
        if !junk.is_empty() {
            children.push(Child::new(self.error(junk)));
        }
        if self.peek() == Some(SEMICOLON) {
            self.bump(&mut children, None);
        }
        self.take_extras(&mut children);

        self.builder.node(kind, children)
    }

    /// A lone unrecognized token is already an error node.
    fn error(&self, children: Vec<Child>) -> Subtree {
        match children.as_slice() {
            [only] if only.subtree().is_error() => only.subtree().clone(),
            _ => self.builder.error(children),
        }
    }

    fn is_assignment(&self) -> bool {
        self.peek() == Some(IDENTIFIER) && self.peek_nth(1) == Some(EQUALS)
    }

    /// Leading extras go to `out`; the expression itself is returned.
    fn expression(&mut self, out: &mut Vec<Child>, min_precedence: u8) -> Subtree {
        let mut left = self.unary(out);
        while let Some(operator) = self.peek()
            && let Some(precedence) = precedence(operator)
            && precedence >= min_precedence
        {
            let mut children = vec![Child::with_field(left, FIELD_LEFT)];
            self.bump(&mut children, Some(FIELD_OPERATOR));
            let right = self.expression(&mut children, precedence + 1);
            children.push(Child::with_field(right, FIELD_RIGHT));
            left = self.builder.node(BINARY_EXPRESSION, children);
        }
        left
    }

    fn unary(&mut self, out: &mut Vec<Child>) -> Subtree {
        if self.peek() != Some(MINUS) {
            return self.primary(out);
        }
        self.take_extras(out);
        let mut children = Vec::new();
        self.bump(&mut children, Some(FIELD_OPERATOR));
        let operand = self.unary(&mut children);
        children.push(Child::with_field(operand, FIELD_OPERAND));
        self.builder.node(UNARY_EXPRESSION, children)
    }

    fn primary(&mut self, out: &mut Vec<Child>) -> Subtree {
        match self.peek() {
            Some(IDENTIFIER | NUMBER) => match self.next_token(out) {
                Some(token) => token,
                None => self.builder.missing(IDENTIFIER, Length::ZERO),
            },
            Some(LPAREN) => {
                self.take_extras(out);
                let mut children = Vec::new();
                self.bump(&mut children, None);
                let inner = self.expression(&mut children, 0);
                children.push(Child::new(inner));
                if self.peek() == Some(RPAREN) {
                    self.bump(&mut children, None);
                } else {
                    children.push(Child::new(self.builder.missing(RPAREN, Length::ZERO)));
                }
                self.builder.node(PARENTHESIZED_EXPRESSION, children)
            }
            _ => self.builder.missing(IDENTIFIER, Length::ZERO),
        }
    }
}

fn with_field(subtree: Subtree, field: Option<FieldId>) -> Child {
    match field {
        Some(field) => Child::with_field(subtree, field),
        None => Child::new(subtree),
    }
}
