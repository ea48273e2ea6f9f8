use crate::position::{Length, Point, Range};

/// One text replacement: bytes `start_byte..old_end_byte` became
/// `start_byte..new_end_byte`, with the matching points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Edit {
    pub start_byte: u32,
    pub old_end_byte: u32,
    pub new_end_byte: u32,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

impl Edit {
    pub fn start(&self) -> Length {
        Length::new(self.start_byte, self.start_point)
    }

    pub fn old_end(&self) -> Length {
        Length::new(self.old_end_byte, self.old_end_point)
    }

    pub fn new_end(&self) -> Length {
        Length::new(self.new_end_byte, self.new_end_point)
    }

    /// Nothing removed, nothing inserted.
    pub fn is_noop(&self) -> bool {
        self.start_byte == self.old_end_byte && self.start_byte == self.new_end_byte
    }

    pub fn is_pure_insertion(&self) -> bool {
        self.start_byte == self.old_end_byte
    }

    /// Both ends ordered after the start in byte and point space.
    pub fn is_well_formed(&self) -> bool {
        self.start_byte <= self.old_end_byte
            && self.start_byte <= self.new_end_byte
            && self.start_point <= self.old_end_point
            && self.start_point <= self.new_end_point
    }

    /// Maps an absolute position through this edit.
    ///
    /// Positions at or past the old end move with the text that follows the
    /// edit. Positions strictly inside the replaced region snap to the new end.
    pub fn edit_position(&self, position: Length) -> Length {
        if position.bytes >= self.old_end_byte {
            let bytes = self.new_end_byte + (position.bytes - self.old_end_byte);
            let extent = if position.extent.row > self.old_end_point.row {
                Point::new(
                    self.new_end_point.row + (position.extent.row - self.old_end_point.row),
                    position.extent.column,
                )
            } else {
                Point::new(
                    self.new_end_point.row,
                    self.new_end_point.column + position.extent.column.saturating_sub(self.old_end_point.column),
                )
            };
            Length::new(bytes, extent)
        } else if position.bytes > self.start_byte {
            self.new_end()
        } else {
            position
        }
    }

    /// Moves an included range through this edit.
    ///
    /// Unlike [`Edit::edit_position`], ends inside the replaced region clamp
    /// back to the edit start. An end pinned at `u32::MAX` stays unbounded.
    pub fn edit_range(&self, range: &mut Range) {
        if range.end_byte >= self.old_end_byte {
            if range.end_byte != u32::MAX {
                let end = self.edit_position(range.end());
                range.end_byte = end.bytes;
                range.end_point = end.extent;
            }
        } else if range.end_byte > self.start_byte {
            range.end_byte = self.start_byte;
            range.end_point = self.start_point;
        }

        if range.start_byte >= self.old_end_byte {
            let start = self.edit_position(range.start());
            range.start_byte = start.bytes;
            range.start_point = start.extent;
        } else if range.start_byte > self.start_byte {
            range.start_byte = self.start_byte;
            range.start_point = self.start_point;
        }
    }
}
