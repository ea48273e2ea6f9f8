//! Row/column points, document ranges and relative lengths.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A zero-based row/column position. Columns count bytes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub const ZERO: Point = Point { row: 0, column: 0 };
    pub const MAX: Point = Point {
        row: u32::MAX,
        column: u32::MAX,
    };

    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A span of the document in both byte and point coordinates.
///
/// Ordering compares start positions first, then ends.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Range {
    pub start_byte: u32,
    pub end_byte: u32,
    pub start_point: Point,
    pub end_point: Point,
}

impl Range {
    /// The whole addressable document.
    pub const FULL: Range = Range {
        start_byte: 0,
        end_byte: u32::MAX,
        start_point: Point::ZERO,
        end_point: Point::MAX,
    };

    pub const fn new(start_byte: u32, end_byte: u32, start_point: Point, end_point: Point) -> Self {
        Self {
            start_byte,
            end_byte,
            start_point,
            end_point,
        }
    }

    pub fn from_lengths(start: Length, end: Length) -> Self {
        Self::new(start.bytes, end.bytes, start.extent, end.extent)
    }

    /// Start and end in byte and point space are both ordered.
    pub fn is_well_formed(&self) -> bool {
        self.start_byte <= self.end_byte && self.start_point <= self.end_point
    }

    pub fn len(&self) -> u32 {
        self.end_byte.saturating_sub(self.start_byte)
    }

    pub fn is_empty(&self) -> bool {
        self.start_byte >= self.end_byte
    }

    pub fn contains_byte(&self, byte: u32) -> bool {
        self.start_byte <= byte && byte < self.end_byte
    }

    /// Overlap test where an empty range touching the other counts.
    pub fn intersects(&self, other: &Range) -> bool {
        if self.is_empty() {
            return other.start_byte <= self.start_byte && self.start_byte <= other.end_byte;
        }
        if other.is_empty() {
            return self.start_byte <= other.start_byte && other.start_byte <= self.end_byte;
        }
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }

    pub fn start(&self) -> Length {
        Length::new(self.start_byte, self.start_point)
    }

    pub fn end(&self) -> Length {
        Length::new(self.end_byte, self.end_point)
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &Range) -> Range {
        let start = if other.start_byte < self.start_byte { other.start() } else { self.start() };
        let end = if other.end_byte > self.end_byte { other.end() } else { self.end() };
        Range::from_lengths(start, end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}] {}-{}",
            self.start_byte, self.end_byte, self.start_point, self.end_point
        )
    }
}

/// A byte count paired with the row/column extent it spans.
///
/// Used both as a relative length (padding, size) and as an absolute
/// position measured from the document start. Adding a length whose
/// extent has rows resets the column, like moving across newlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Length {
    pub bytes: u32,
    pub extent: Point,
}

impl Length {
    pub const ZERO: Length = Length {
        bytes: 0,
        extent: Point::ZERO,
    };

    pub const fn new(bytes: u32, extent: Point) -> Self {
        Self { bytes, extent }
    }

    pub fn is_zero(&self) -> bool {
        self.bytes == 0 && self.extent == Point::ZERO
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        let extent = if rhs.extent.row > 0 {
            Point::new(self.extent.row + rhs.extent.row, rhs.extent.column)
        } else {
            Point::new(self.extent.row, self.extent.column + rhs.extent.column)
        };
        Length::new(self.bytes + rhs.bytes, extent)
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Length) {
        *self = *self + rhs;
    }
}

/// Length from `rhs` to `self`. Saturates when `rhs` lies after `self`.
impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        let extent = if self.extent.row > rhs.extent.row {
            Point::new(self.extent.row - rhs.extent.row, self.extent.column)
        } else {
            Point::new(0, self.extent.column.saturating_sub(rhs.extent.column))
        };
        Length::new(self.bytes.saturating_sub(rhs.bytes), extent)
    }
}
