use std::time::Duration;

use sapwood_langs::{CalcGrammar, calc};
use sapwood_lib::{
    CancellationFlag, Edit, Error, Language, ParseOptions, Parser, Point, Range, Tree,
};

fn parser() -> Parser {
    let mut parser = Parser::new();
    parser.set_language(calc()).unwrap();
    parser
}

fn long_program(statements: usize) -> String {
    (0..statements).map(|i| format!("v{i} = {i} + 1\n")).collect()
}

#[test]
fn parse_requires_a_language() {
    let mut parser = Parser::new();
    assert_eq!(parser.parse("x = 1", None).unwrap_err(), Error::NoLanguage);
}

#[test]
fn incompatible_language_keeps_previous() {
    let mut parser = parser();
    let old = Language::new(CalcGrammar::new().with_abi_version(12));

    let error = parser.set_language(old).unwrap_err();
    assert_eq!(error, Error::LanguageVersionMismatch { version: 12 });
    insta::assert_snapshot!(error, @"incompatible language version 12, expected 13..=14");
    assert_eq!(parser.language(), Some(&calc()));

    let oldest = Language::new(CalcGrammar::new().with_abi_version(13));
    parser.set_language(oldest.clone()).unwrap();
    assert_eq!(parser.language(), Some(&oldest));
}

#[test]
fn included_ranges_are_validated() {
    let mut parser = parser();
    let range = |start: u32, end: u32| Range::new(start, end, Point::new(0, start), Point::new(0, end));

    let error = parser.set_included_ranges(&[range(0, 4), range(2, 6)]).unwrap_err();
    assert_eq!(error, Error::InvalidRanges { index: 1 });
    assert_eq!(parser.set_included_ranges(&[range(5, 3)]).unwrap_err(), Error::InvalidRanges { index: 0 });
    assert_eq!(parser.included_ranges(), [Range::FULL]);

    parser.set_included_ranges(&[range(0, 4), range(4, 6)]).unwrap();
    assert_eq!(parser.included_ranges().len(), 2);
    parser.set_included_ranges(&[]).unwrap();
    assert_eq!(parser.included_ranges(), [Range::FULL]);
}

#[test]
fn timeout_interrupts_and_resumes() {
    let text = long_program(2000);
    let mut parser = parser();
    parser.set_timeout_micros(1);
    assert_eq!(parser.timeout(), Duration::from_micros(1));

    assert_eq!(parser.parse(&text, None).unwrap_err(), Error::TimedOut);

    parser.set_timeout(Duration::ZERO);
    let tree = parser.parse(&text, None).unwrap();
    assert_eq!(tree.root_node().end_byte() as usize, text.len());
    assert_eq!(tree.root_node().to_sexp(), self::parser().parse(&text, None).unwrap().root_node().to_sexp());
}

#[test]
fn resuming_with_different_text_starts_over() {
    let mut parser = parser();
    parser.set_timeout_micros(1);
    assert_eq!(parser.parse(long_program(3000), None).unwrap_err(), Error::TimedOut);

    parser.set_timeout(Duration::ZERO);
    let text = "y = 2\n";
    let tree = parser.parse(text, None).unwrap();
    assert_eq!(tree.root_node().end_byte() as usize, text.len());
    insta::assert_snapshot!(tree.root_node().to_sexp(), @"(program (assignment left: (identifier) right: (number)))");
}

#[test]
fn cancellation_resumes_until_reset() {
    let flag = CancellationFlag::new();
    let mut parser = Parser::with_options(ParseOptions::new().with_cancellation_flag(flag.clone())).unwrap();
    parser.set_language(calc()).unwrap();

    flag.cancel();
    assert_eq!(parser.parse("x = 1", None).unwrap_err(), Error::Cancelled);
    // The flag stays raised until the caller clears it.
    assert_eq!(parser.parse("x = 1", None).unwrap_err(), Error::Cancelled);

    flag.clear();
    let resumed = parser.parse("x = 1", None).unwrap();
    insta::assert_snapshot!(resumed.root_node().to_sexp(), @"(program (assignment left: (identifier) right: (number)))");

    flag.cancel();
    assert!(parser.parse("x = 1", None).is_err());
    parser.reset();
    flag.clear();
    let fresh = parser.parse("y", None).unwrap();
    insta::assert_snapshot!(fresh.root_node().to_sexp(), @"(program (expression_statement (identifier)))");
}

#[test]
fn options_apply_to_new_parser() {
    let parser = Parser::with_options(ParseOptions::new().with_timeout(Duration::from_millis(5))).unwrap();
    assert_eq!(parser.timeout_micros(), 5000);
    assert!(parser.language().is_none());
    assert!(!parser.cancellation_flag().is_cancelled());
}

#[test]
fn old_tree_from_other_language_is_ignored() {
    let text = "x = 1\n";
    let other = Language::new(CalcGrammar::new());
    let mut other_parser = Parser::new();
    other_parser.set_language(other).unwrap();
    let foreign = other_parser.parse(text, None).unwrap();

    let tree = parser().parse(text, Some(&foreign)).unwrap();
    assert_eq!(tree.language(), &calc());
    assert_ne!(tree.root_node().child(0).unwrap().id(), foreign.root_node().child(0).unwrap().id());
}

fn edit_and_reparse(parser: &mut Parser, old: &mut Tree, edit: Edit, text: &str) -> Tree {
    old.edit(&edit);
    parser.parse(text, Some(old)).unwrap()
}

#[test]
fn reparse_covers_whole_document() {
    let mut parser = parser();
    let mut old = parser.parse("a = 1\n", None).unwrap();

    let text = "a = 1\nb = a * 2\n";
    let new = edit_and_reparse(
        &mut parser,
        &mut old,
        Edit {
            start_byte: 6,
            old_end_byte: 6,
            new_end_byte: 16,
            start_point: Point::new(1, 0),
            old_end_point: Point::new(1, 0),
            new_end_point: Point::new(2, 0),
        },
        text,
    );

    let root = new.root_node();
    assert_eq!(root.start_byte(), 0);
    assert_eq!(root.end_byte() as usize, text.len());
    assert_eq!(root.end_position(), Point::new(2, 0));
    assert_eq!(root.to_sexp(), parser.parse(text, None).unwrap().root_node().to_sexp());

    let ranges = new.changed_ranges(&old);
    assert!(!ranges.is_empty());
    assert!(ranges.iter().any(|r| r.contains_byte(10)));
}

#[test]
fn changed_ranges_follow_edits() {
    let mut parser = parser();
    let text = "a = 1;\nb = 2;\n";
    let mut old = parser.parse(text, None).unwrap();

    // An edit that changes nothing.
    let same = edit_and_reparse(
        &mut parser,
        &mut old.clone(),
        Edit {
            start_byte: 4,
            old_end_byte: 4,
            new_end_byte: 4,
            start_point: Point::new(0, 4),
            old_end_point: Point::new(0, 4),
            new_end_point: Point::new(0, 4),
        },
        text,
    );
    assert!(same.changed_ranges(&old).is_empty());

    let new = edit_and_reparse(
        &mut parser,
        &mut old,
        Edit {
            start_byte: 11,
            old_end_byte: 12,
            new_end_byte: 12,
            start_point: Point::new(1, 4),
            old_end_point: Point::new(1, 5),
            new_end_point: Point::new(1, 5),
        },
        "a = 1;\nb = 3;\n",
    );
    let ranges = new.changed_ranges(&old);
    assert!(!ranges.is_empty());
    assert!(ranges.iter().all(|r| r.start_byte >= 7));
    assert!(ranges.iter().any(|r| r.contains_byte(11)));
    assert!(ranges.windows(2).all(|pair| pair[0].end_byte < pair[1].start_byte));
}

#[test]
fn changed_ranges_skip_reused_statements() {
    let mut parser = parser();
    let mut old = parser.parse("b = 2;\nc = 3;\nd = 4;\n", None).unwrap();

    let text = "a = 1;\nb = 2;\nc = 3;\nd = 4;\n";
    let new = edit_and_reparse(
        &mut parser,
        &mut old,
        Edit {
            start_byte: 0,
            old_end_byte: 0,
            new_end_byte: 7,
            start_point: Point::new(0, 0),
            old_end_point: Point::new(0, 0),
            new_end_point: Point::new(1, 0),
        },
        text,
    );
    assert_eq!(old.root_node().start_byte(), 0);
    assert_eq!(new.root_node().child(2).unwrap().id(), old.root_node().child(1).unwrap().id());

    let ranges: Vec<_> = new
        .changed_ranges(&old)
        .iter()
        .map(|r| (r.start_byte, r.end_byte, r.end_point))
        .collect();
    assert_eq!(ranges, [(0, 13, Point::new(1, 6))]);
}

#[test]
fn clones_are_independent() {
    let mut parser = parser();
    let tree = parser.parse("x = 1 + 2\n", None).unwrap();
    let mut copy = tree.clone();

    assert_eq!(copy.root_node().to_sexp(), tree.root_node().to_sexp());
    assert_eq!(copy.root_node().id(), tree.root_node().id());

    copy.edit(&Edit {
        start_byte: 0,
        old_end_byte: 0,
        new_end_byte: 2,
        start_point: Point::new(0, 0),
        old_end_point: Point::new(0, 0),
        new_end_point: Point::new(0, 2),
    });
    assert_eq!(copy.root_node().end_byte(), 12);
    assert_eq!(tree.root_node().end_byte(), 10);
    assert!(!tree.root_node().has_changes());
    assert!(copy.root_node().has_changes());
}

#[test]
fn utf16_offsets_count_bytes() {
    let text: Vec<u16> = "é = 1".encode_utf16().collect();
    let tree = parser().parse_utf16(&text, None).unwrap();
    let root = tree.root_node();

    assert_eq!(root.end_byte(), 10);
    let number = root.child(0).unwrap().child_by_field_name("right").unwrap();
    assert_eq!(number.start_byte(), 8);
    assert_eq!(String::from_utf16_lossy(number.utf16_text(&text)), "1");
}
