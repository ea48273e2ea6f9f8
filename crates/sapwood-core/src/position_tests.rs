use crate::{Length, Point, Range, SymbolMetadata, SymbolType};

fn len(bytes: u32, row: u32, column: u32) -> Length {
    Length::new(bytes, Point::new(row, column))
}

#[test]
fn points_order_by_row_then_column() {
    let mut points = vec![Point::new(1, 0), Point::new(0, 9), Point::new(1, 2), Point::new(0, 0)];
    points.sort();

    assert_eq!(
        points,
        vec![Point::new(0, 0), Point::new(0, 9), Point::new(1, 0), Point::new(1, 2)]
    );
}

#[test]
fn length_add_on_same_row_accumulates_columns() {
    assert_eq!(len(3, 0, 3) + len(2, 0, 2), len(5, 0, 5));
}

#[test]
fn length_add_across_rows_resets_column() {
    assert_eq!(len(3, 1, 3) + len(4, 2, 1), len(7, 3, 1));
}

#[test]
fn length_sub_inverts_add() {
    let base = len(10, 1, 4);
    let delta = len(6, 1, 2);
    let sum = base + delta;

    assert_eq!(sum - base, delta);
}

#[test]
fn length_sub_saturates() {
    assert_eq!(len(2, 0, 2) - len(5, 0, 5), Length::ZERO);
}

#[test]
fn range_intersection() {
    let a = Range::from_lengths(len(0, 0, 0), len(5, 0, 5));
    let b = Range::from_lengths(len(5, 0, 5), len(9, 0, 9));
    let c = Range::from_lengths(len(4, 0, 4), len(6, 0, 6));
    let empty = Range::from_lengths(len(5, 0, 5), len(5, 0, 5));

    assert!(!a.intersects(&b));
    assert!(a.intersects(&c));
    assert!(b.intersects(&c));
    assert!(empty.intersects(&a));
    assert!(empty.intersects(&b));
}

#[test]
fn range_union_covers_both() {
    let a = Range::from_lengths(len(2, 0, 2), len(5, 0, 5));
    let b = Range::from_lengths(len(4, 0, 4), len(11, 1, 3));

    assert_eq!(a.union(&b), Range::from_lengths(len(2, 0, 2), len(11, 1, 3)));
}

#[test]
fn full_range_is_well_formed() {
    assert!(Range::FULL.is_well_formed());
    assert!(Range::FULL.contains_byte(1 << 20));
}

#[test]
fn metadata_maps_to_symbol_type() {
    assert_eq!(SymbolMetadata::REGULAR.symbol_type(), SymbolType::Regular);
    assert_eq!(SymbolMetadata::ANONYMOUS.symbol_type(), SymbolType::Anonymous);
    assert_eq!(SymbolMetadata::AUXILIARY.symbol_type(), SymbolType::Auxiliary);
}

#[test]
fn range_serializes_with_field_names() {
    let range = Range::from_lengths(len(1, 0, 1), len(3, 0, 3));
    let json = serde_json::to_string(&range).unwrap();

    assert_eq!(
        json,
        r#"{"start_byte":1,"end_byte":3,"start_point":{"row":0,"column":1},"end_point":{"row":0,"column":3}}"#
    );
}
