use indoc::indoc;
use sapwood_core::{Edit, Point, Range};
use sapwood_lib::{Parser, Tree};

use crate::calc;

fn parse(text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(calc()).unwrap();
    parser.parse(text, None).unwrap()
}

fn sexp(text: &str) -> String {
    parse(text).root_node().to_sexp()
}

#[test]
fn assignment() {
    insta::assert_snapshot!(sexp("x = 1"), @"(program (assignment left: (identifier) right: (number)))");
}

#[test]
fn precedence_and_associativity() {
    insta::assert_snapshot!(
        sexp("1 + 2 * 3"),
        @"(program (expression_statement (binary_expression left: (number) right: (binary_expression left: (number) right: (number)))))"
    );
    insta::assert_snapshot!(
        sexp("a - b - c"),
        @"(program (expression_statement (binary_expression left: (binary_expression left: (identifier) right: (identifier)) right: (identifier))))"
    );
}

#[test]
fn unary_and_parentheses() {
    insta::assert_snapshot!(
        sexp("-(x + 1.5)"),
        @"(program (expression_statement (unary_expression operand: (parenthesized_expression (binary_expression left: (identifier) right: (number))))))"
    );
}

#[test]
fn statements_end_at_complete_lines() {
    let text = indoc! {"
        x = 1 +
          2
        y
    "};
    insta::assert_snapshot!(
        sexp(text),
        @"(program (assignment left: (identifier) right: (binary_expression left: (number) right: (number))) (expression_statement (identifier)))"
    );
}

#[test]
fn semicolons_split_a_line() {
    insta::assert_snapshot!(
        sexp("a = 1; b = 2;"),
        @"(program (assignment left: (identifier) right: (number)) (assignment left: (identifier) right: (number)))"
    );
}

#[test]
fn comments_are_extras() {
    let text = indoc! {"
        # header
        x = 1 # trailing
    "};
    let tree = parse(text);
    insta::assert_snapshot!(
        tree.root_node().to_sexp(),
        @"(program (comment) (assignment left: (identifier) right: (number) (comment)))"
    );
    let comment = tree.root_node().child(0).unwrap();
    assert!(comment.is_extra());
    assert_eq!(comment.utf8_text(text.as_bytes()).unwrap(), "# header");
}

#[test]
fn missing_tokens() {
    insta::assert_snapshot!(sexp("x ="), @"(program (assignment left: (identifier) right: (MISSING identifier)))");
    insta::assert_snapshot!(
        sexp("(1"),
        @r#"(program (expression_statement (parenthesized_expression (number) (MISSING ")"))))"#
    );

    let tree = parse("(1");
    assert!(tree.root_node().has_error());
    let parenthesized = tree.root_node().child(0).unwrap().child(0).unwrap();
    let missing = parenthesized.child(2).unwrap();
    assert!(missing.is_missing());
    assert_eq!(missing.start_byte(), 2);
    assert_eq!(missing.end_byte(), 2);
}

#[test]
fn leftover_tokens_become_errors() {
    insta::assert_snapshot!(sexp("x = 1 )"), @"(program (assignment left: (identifier) right: (number) (ERROR)))");
    insta::assert_snapshot!(sexp("$"), @"(program (ERROR))");
    insta::assert_snapshot!(sexp("= 2"), @"(program (ERROR (number)))");
}

#[test]
fn root_spans_surrounding_whitespace() {
    let tree = parse("  x = 1\n\n");
    let root = tree.root_node();
    assert_eq!(root.start_byte(), 0);
    assert_eq!(root.end_byte(), 9);
    assert_eq!(root.end_position(), Point::new(2, 0));

    let statement = root.child(0).unwrap();
    assert_eq!(statement.start_byte(), 2);
    assert_eq!(statement.end_byte(), 7);
}

#[test]
fn empty_document() {
    let tree = parse("");
    assert_eq!(tree.root_node().to_sexp(), "(program)");
    assert_eq!(tree.root_node().end_byte(), 0);
}

#[test]
fn long_programs_are_flattened() {
    let tree = parse("a\nb\nc\nd\ne\nf");
    let root = tree.root_node();
    assert_eq!(root.child_count(), 6);
    assert_eq!(root.named_child_count(), 6);
    let last = root.child(5).unwrap();
    assert_eq!(last.kind(), "expression_statement");
    assert_eq!(last.parent().unwrap().kind(), "program");
    assert_eq!(last.prev_sibling().unwrap().start_byte(), 8);
}

#[test]
fn fields_are_reachable() {
    let text = "total = a * b";
    let tree = parse(text);
    let assignment = tree.root_node().child(0).unwrap();
    let right = assignment.child_by_field_name("right").unwrap();
    assert_eq!(right.kind(), "binary_expression");

    let operator = right.child_by_field_name("operator").unwrap();
    assert!(!operator.is_named());
    assert_eq!(operator.utf8_text(text.as_bytes()).unwrap(), "*");
    assert_eq!(right.field_name_for_child(2), Some("right"));
}

#[test]
fn utf16_input() {
    let text: Vec<u16> = "x = 1".encode_utf16().collect();
    let mut parser = Parser::new();
    parser.set_language(calc()).unwrap();
    let tree = parser.parse_utf16(&text, None).unwrap();

    let root = tree.root_node();
    assert_eq!(root.end_byte(), 10);
    let number = root.child(0).unwrap().child_by_field_name("right").unwrap();
    assert_eq!(number.start_byte(), 8);
    assert_eq!(number.start_position(), Point::new(0, 8));
    assert_eq!(String::from_utf16_lossy(number.utf16_text(&text)), "1");
}

#[test]
fn included_ranges_skip_foreign_text() {
    let text = "x = 1\n$$$\ny";
    let mut parser = Parser::new();
    parser.set_language(calc()).unwrap();
    parser
        .set_included_ranges(&[
            Range::new(0, 6, Point::new(0, 0), Point::new(1, 0)),
            Range::new(10, 11, Point::new(2, 0), Point::new(2, 1)),
        ])
        .unwrap();
    let tree = parser.parse(text, None).unwrap();

    insta::assert_snapshot!(
        tree.root_node().to_sexp(),
        @"(program (assignment left: (identifier) right: (number)) (expression_statement (identifier)))"
    );
    assert_eq!(tree.included_ranges().len(), 2);
}

#[test]
fn reparse_reuses_untouched_statements() {
    let mut parser = Parser::new();
    parser.set_language(calc()).unwrap();
    let mut old = parser.parse("a = 1;\nb = 2;\n", None).unwrap();

    old.edit(&Edit {
        start_byte: 11,
        old_end_byte: 12,
        new_end_byte: 12,
        start_point: Point::new(1, 4),
        old_end_point: Point::new(1, 5),
        new_end_point: Point::new(1, 5),
    });
    let new_text = "a = 1;\nb = 3;\n";
    let new = parser.parse(new_text, Some(&old)).unwrap();

    let old_first = old.root_node().child(0).unwrap();
    let new_first = new.root_node().child(0).unwrap();
    assert_eq!(old_first.id(), new_first.id());
    assert_ne!(old.root_node().child(1).unwrap().id(), new.root_node().child(1).unwrap().id());
    assert_eq!(new.root_node().to_sexp(), parse(new_text).root_node().to_sexp());
}

#[test]
fn reused_statement_rejoins_when_line_break_removed() {
    let mut parser = Parser::new();
    parser.set_language(calc()).unwrap();
    let mut old = parser.parse("x = 1\ny", None).unwrap();

    old.edit(&Edit {
        start_byte: 5,
        old_end_byte: 6,
        new_end_byte: 6,
        start_point: Point::new(0, 5),
        old_end_point: Point::new(1, 0),
        new_end_point: Point::new(0, 6),
    });
    let new_text = "x = 1 y";
    let new = parser.parse(new_text, Some(&old)).unwrap();

    assert_eq!(new.root_node().to_sexp(), parse(new_text).root_node().to_sexp());
    insta::assert_snapshot!(
        new.root_node().to_sexp(),
        @"(program (assignment left: (identifier) right: (number) (ERROR (identifier))))"
    );
}
