use sapwood_core::Point;

use crate::test_utils::{FIELD_HEAD, parse};

const TEXT: &str = "alpha 12, beta\ngamma\ndelta 7\n";

#[test]
fn sexp_flattens_hidden_nodes() {
    let tree = parse(TEXT);

    insta::assert_snapshot!(
        tree.root_node().to_sexp(),
        @"(document (line head: (word) (number) (word)) (line head: (word)) (line head: (word) (number)))"
    );
}

#[test]
fn root_spans_the_whole_text() {
    let tree = parse(TEXT);
    let root = tree.root_node();

    assert_eq!(root.kind(), "document");
    assert_eq!(root.start_byte(), 0);
    assert_eq!(root.end_byte(), TEXT.len() as u32);
    assert_eq!(root.end_position(), Point::new(3, 0));
    assert!(root.parent().is_none());
    assert!(!root.has_error());
}

#[test]
fn empty_text() {
    let tree = parse("");
    let root = tree.root_node();

    assert_eq!(root.to_sexp(), "(document)");
    assert_eq!(root.child_count(), 0);
    assert_eq!(root.byte_range(), 0..0);
}

#[test]
fn child_counts() {
    let tree = parse(TEXT);
    let root = tree.root_node();
    let first = root.child(0).unwrap();

    assert_eq!(root.child_count(), 3);
    assert_eq!(root.named_child_count(), 3);
    assert_eq!(first.child_count(), 4);
    assert_eq!(first.named_child_count(), 3);

    let comma = first.child(2).unwrap();
    assert_eq!(comma.kind(), ",");
    assert!(!comma.is_named());
    assert_eq!(first.named_child(2).unwrap().kind(), "word");
    assert!(root.child(3).is_none());
}

#[test]
fn fields() {
    let tree = parse(TEXT);
    let first = tree.root_node().child(0).unwrap();

    let head = first.child_by_field_name("head").unwrap();
    assert_eq!(head.utf8_text(TEXT.as_bytes()).unwrap(), "alpha");
    assert_eq!(first.child_by_field_id(FIELD_HEAD), Some(head));
    assert_eq!(first.field_name_for_child(0), Some("head"));
    assert_eq!(first.field_name_for_child(1), None);
    assert_eq!(first.children_by_field_name("head").count(), 1);
    assert_eq!(first.children_by_field_name("tail").count(), 0);
    assert!(first.child_by_field_name("tail").is_none());
}

#[test]
fn parents_skip_hidden_nodes() {
    let tree = parse(TEXT);
    let root = tree.root_node();
    let second = root.child(1).unwrap();
    let gamma = second.child(0).unwrap();

    assert_eq!(second.parent(), Some(root));
    assert_eq!(gamma.parent(), Some(second));
}

#[test]
fn siblings() {
    let tree = parse(TEXT);
    let root = tree.root_node();
    let lines: Vec<_> = root.children().collect();

    assert_eq!(lines[0].next_sibling(), Some(lines[1]));
    assert_eq!(lines[1].next_sibling(), Some(lines[2]));
    assert_eq!(lines[2].next_sibling(), None);
    assert_eq!(lines[2].prev_sibling(), Some(lines[1]));
    assert_eq!(lines[0].prev_sibling(), None);

    let number = lines[0].child(1).unwrap();
    assert_eq!(number.next_sibling().unwrap().kind(), ",");
    let beta = number.next_named_sibling().unwrap();
    assert_eq!(beta.utf8_text(TEXT.as_bytes()).unwrap(), "beta");
    assert_eq!(beta.prev_named_sibling(), Some(number));
}

#[test]
fn cursor_sibling_walk_agrees_with_next_sibling() {
    let tree = parse("a\nb\nc\nd\n");
    let root = tree.root_node();

    let mut cursor = root.walk();
    assert!(cursor.goto_first_child());
    let mut walked = vec![cursor.node()];
    while cursor.goto_next_sibling() {
        walked.push(cursor.node());
    }

    let chained: Vec<_> = std::iter::successors(root.child(0), |n| n.next_sibling()).collect();
    assert_eq!(walked, chained);
    assert_eq!(walked.len(), 4);
}

#[test]
fn positions() {
    let tree = parse(TEXT);
    let root = tree.root_node();
    let gamma = root.child(1).unwrap().child(0).unwrap();

    assert_eq!(gamma.byte_range(), 15..20);
    assert_eq!(gamma.start_position(), Point::new(1, 0));
    assert_eq!(gamma.end_position(), Point::new(1, 5));

    let last = root.child(2).unwrap();
    let range = last.range();
    assert_eq!((range.start_byte, range.end_byte), (21, 28));
    assert_eq!((range.start_point, range.end_point), (Point::new(2, 0), Point::new(2, 7)));
}

#[test]
fn descendants_for_ranges() {
    let tree = parse(TEXT);
    let root = tree.root_node();

    let gamma = root.descendant_for_byte_range(16, 17).unwrap();
    assert_eq!(gamma.kind(), "word");
    assert_eq!(gamma.start_byte(), 15);

    let comma = root.descendant_for_byte_range(8, 9).unwrap();
    assert_eq!(comma.kind(), ",");
    let line = root.named_descendant_for_byte_range(8, 9).unwrap();
    assert_eq!(line.kind(), "line");

    let seven = root
        .descendant_for_point_range(Point::new(2, 6), Point::new(2, 7))
        .unwrap();
    assert_eq!(seven.utf8_text(TEXT.as_bytes()).unwrap(), "7");

    assert!(root.descendant_for_byte_range(5, 100).is_none());
}

#[test]
fn first_child_for_byte() {
    let tree = parse(TEXT);
    let first = tree.root_node().child(0).unwrap();

    assert_eq!(first.first_child_for_byte(6).unwrap().kind(), "number");
    assert_eq!(first.first_named_child_for_byte(8).unwrap().kind(), "word");
    assert!(first.first_child_for_byte(14).is_none());
}

#[test]
fn ids_survive_clones() {
    let tree = parse(TEXT);
    let copy = tree.clone();

    let ids = |t: &crate::Tree| t.root_node().children().map(|n| n.id()).collect::<Vec<_>>();
    assert_eq!(ids(&tree), ids(&copy));
    assert_eq!(tree.root_node().to_sexp(), copy.root_node().to_sexp());
    assert_ne!(tree.root_node(), copy.root_node());
}

#[test]
fn debug_format() {
    let tree = parse("one\n");
    let word = tree.root_node().child(0).unwrap().child(0).unwrap();

    insta::assert_snapshot!(format!("{word:?}"), @"{Node word (0, 0) - (0, 3)}");
    insta::assert_snapshot!(format!("{tree:?}"), @"{Tree (document (line head: (word)))}");
}
