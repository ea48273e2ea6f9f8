use indoc::indoc;
use sapwood_core::Point;

use crate::test_utils::parse;
use crate::tree::TreeCursor;

const TEXT: &str = "alpha 12, beta\ngamma\ndelta 7\n";

fn preorder(cursor: &mut TreeCursor<'_>) -> String {
    let mut out = String::new();
    loop {
        let node = cursor.node();
        let indent = "  ".repeat(cursor.depth());
        let field = cursor.field_name().map(|f| format!("{f}: ")).unwrap_or_default();
        out.push_str(&format!("{indent}{field}{} {:?}\n", node.kind(), node.byte_range()));

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}

#[test]
fn walks_in_preorder() {
    let tree = parse(TEXT);
    let mut cursor = tree.walk();

    insta::assert_snapshot!(preorder(&mut cursor), @r#"
    document 0..29
      line 0..14
        head: word 0..5
        number 6..8
        , 8..9
        word 10..14
      line 15..20
        head: word 15..20
      line 21..28
        head: word 21..26
        number 27..28
    "#);
}

#[test]
fn sibling_moves_cross_hidden_nodes() {
    let tree = parse(TEXT);
    let mut cursor = tree.walk();

    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().start_byte(), 0);
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().start_byte(), 15);
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().start_byte(), 21);
    assert!(!cursor.goto_next_sibling());
    assert_eq!(cursor.node().start_byte(), 21);

    assert!(cursor.goto_previous_sibling());
    assert_eq!(cursor.node().start_byte(), 15);
    assert_eq!(cursor.depth(), 1);

    assert!(cursor.goto_parent());
    assert_eq!(cursor.node(), tree.root_node());
    assert!(!cursor.goto_parent());
}

#[test]
fn last_child_skips_hidden_end() {
    let tree = parse(TEXT);
    let mut cursor = tree.walk();

    assert!(cursor.goto_last_child());
    assert_eq!(cursor.node().byte_range(), 21..28);
    assert!(cursor.goto_last_child());
    assert_eq!(cursor.node().kind(), "number");
    assert!(!cursor.goto_first_child());
}

#[test]
fn fields() {
    let tree = parse(TEXT);
    let mut cursor = tree.walk();

    assert_eq!(cursor.field_name(), None);
    cursor.goto_first_child();
    cursor.goto_first_child();
    assert_eq!(cursor.field_name(), Some("head"));
    cursor.goto_next_sibling();
    assert_eq!(cursor.field_id(), None);
}

#[test]
fn first_child_for_offsets() {
    let tree = parse(TEXT);
    let mut cursor = tree.walk();

    assert_eq!(cursor.goto_first_child_for_byte(16), Some(1));
    assert_eq!(cursor.node().byte_range(), 15..20);

    cursor.reset(tree.root_node());
    assert_eq!(cursor.goto_first_child_for_point(Point::new(2, 0)), Some(2));

    cursor.reset(tree.root_node());
    assert_eq!(cursor.goto_first_child_for_byte(29), None);
    assert_eq!(cursor.node(), tree.root_node());
}

#[test]
fn reset_bounds_the_walk() {
    let tree = parse(TEXT);
    let second = tree.root_node().child(1).unwrap();
    let mut cursor = tree.walk();
    cursor.reset(second);

    assert!(!cursor.goto_next_sibling());
    assert!(!cursor.goto_parent());
    insta::assert_snapshot!(preorder(&mut cursor), @r#"
    line 15..20
      head: word 15..20
    "#);
}

#[test]
fn clones_move_independently() {
    let tree = parse(indoc! {"
        one
        two
    "});
    let mut cursor = tree.walk();
    cursor.goto_first_child();
    let mut copy = cursor.clone();

    assert!(copy.goto_next_sibling());
    assert_eq!(cursor.node().start_byte(), 0);
    assert_eq!(copy.node().start_byte(), 4);
}
