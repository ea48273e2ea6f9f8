use crate::{Edit, Length, Point, Range};

fn insertion(at: u32, text_len: u32) -> Edit {
    Edit {
        start_byte: at,
        old_end_byte: at,
        new_end_byte: at + text_len,
        start_point: Point::new(0, at),
        old_end_point: Point::new(0, at),
        new_end_point: Point::new(0, at + text_len),
    }
}

#[test]
fn classification() {
    let noop = insertion(4, 0);
    let insert = insertion(4, 2);
    let delete = Edit {
        start_byte: 1,
        old_end_byte: 3,
        new_end_byte: 1,
        start_point: Point::new(0, 1),
        old_end_point: Point::new(0, 3),
        new_end_point: Point::new(0, 1),
    };

    assert!(noop.is_noop());
    assert!(insert.is_pure_insertion() && !insert.is_noop());
    assert!(!delete.is_pure_insertion());
    assert!(delete.is_well_formed());
}

#[test]
fn positions_after_edit_shift_by_delta() {
    let edit = insertion(2, 3);

    let moved = edit.edit_position(Length::new(5, Point::new(0, 5)));
    assert_eq!(moved, Length::new(8, Point::new(0, 8)));

    let at_start = edit.edit_position(Length::new(2, Point::new(0, 2)));
    assert_eq!(at_start, Length::new(5, Point::new(0, 5)));
}

#[test]
fn positions_before_edit_stay() {
    let edit = insertion(2, 3);

    assert_eq!(
        edit.edit_position(Length::new(1, Point::new(0, 1))),
        Length::new(1, Point::new(0, 1))
    );
}

#[test]
fn positions_inside_replaced_region_snap_to_new_end() {
    let edit = Edit {
        start_byte: 2,
        old_end_byte: 10,
        new_end_byte: 4,
        start_point: Point::new(0, 2),
        old_end_point: Point::new(1, 3),
        new_end_point: Point::new(0, 4),
    };

    assert_eq!(
        edit.edit_position(Length::new(6, Point::new(0, 6))),
        Length::new(4, Point::new(0, 4))
    );
}

#[test]
fn later_rows_keep_their_column() {
    // "ab\ncd" -> insert "x\n" at 1
    let edit = Edit {
        start_byte: 1,
        old_end_byte: 1,
        new_end_byte: 3,
        start_point: Point::new(0, 1),
        old_end_point: Point::new(0, 1),
        new_end_point: Point::new(1, 0),
    };

    // "c" was at (1, 0); same row as nothing in the edit, so only the row shifts.
    assert_eq!(
        edit.edit_position(Length::new(3, Point::new(1, 0))),
        Length::new(5, Point::new(2, 0))
    );
    // "b" was at (0, 1) on the edit row; it lands after the inserted newline.
    assert_eq!(
        edit.edit_position(Length::new(1, Point::new(0, 1))),
        Length::new(3, Point::new(1, 0))
    );
}

#[test]
fn edit_range_moves_both_ends() {
    let edit = insertion(0, 4);
    let mut range = Range::new(2, 6, Point::new(0, 2), Point::new(0, 6));

    edit.edit_range(&mut range);

    assert_eq!(range, Range::new(6, 10, Point::new(0, 6), Point::new(0, 10)));
}

#[test]
fn edit_range_keeps_unbounded_end() {
    let edit = insertion(2, 4);
    let mut range = Range::FULL;

    edit.edit_range(&mut range);

    assert_eq!(range.end_byte, u32::MAX);
    assert_eq!(range.start_byte, 0);
}

#[test]
fn edit_range_clamps_ends_inside_deletion() {
    let edit = Edit {
        start_byte: 4,
        old_end_byte: 12,
        new_end_byte: 4,
        start_point: Point::new(0, 4),
        old_end_point: Point::new(0, 12),
        new_end_point: Point::new(0, 4),
    };
    let mut range = Range::new(6, 8, Point::new(0, 6), Point::new(0, 8));

    edit.edit_range(&mut range);

    assert_eq!(range, Range::new(4, 4, Point::new(0, 4), Point::new(0, 4)));
}
