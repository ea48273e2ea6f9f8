//! The view of the source a grammar works against.

use sapwood_core::{InputEncoding, Length, Point, Range, Symbol};

use crate::tree::{Subtree, Tree};

/// Source text plus everything a grammar needs to parse it incrementally.
///
/// Offsets are byte offsets into the encoded text.
#[derive(Clone, Copy)]
pub struct ParseInput<'a> {
    text: &'a [u8],
    encoding: InputEncoding,
    included_ranges: &'a [Range],
    old_tree: Option<&'a Tree>,
}

impl<'a> ParseInput<'a> {
    pub fn new(
        text: &'a [u8],
        encoding: InputEncoding,
        included_ranges: &'a [Range],
        old_tree: Option<&'a Tree>,
    ) -> Self {
        Self {
            text,
            encoding,
            included_ranges,
            old_tree,
        }
    }

    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    pub fn len(&self) -> u32 {
        self.text.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn encoding(&self) -> InputEncoding {
        self.encoding
    }

    pub fn included_ranges(&self) -> &'a [Range] {
        self.included_ranges
    }

    pub fn old_tree(&self) -> Option<&'a Tree> {
        self.old_tree
    }

    /// Character at `byte` and its encoded width.
    ///
    /// Malformed sequences decode as U+FFFD spanning one code unit.
    pub fn decode(&self, byte: u32) -> Option<(char, u32)> {
        let rest = self.text.get(byte as usize..).filter(|r| !r.is_empty())?;
        match self.encoding {
            InputEncoding::Utf8 => Some(decode_utf8(rest)),
            InputEncoding::Utf16 => decode_utf16(rest),
        }
    }

    /// Position after `ch`, which starts at `position`.
    pub fn advance(&self, position: Length, ch: char, width: u32) -> Length {
        if ch == '\n' {
            Length::new(position.bytes + width, Point::new(position.extent.row + 1, 0))
        } else {
            Length::new(
                position.bytes + width,
                Point::new(position.extent.row, position.extent.column + width),
            )
        }
    }

    /// `position`, or the start of the next included range when it falls
    /// outside all of them. `None` past the last range or the text end.
    pub fn next_included(&self, position: Length) -> Option<Length> {
        if position.bytes >= self.len() {
            return None;
        }
        let range = self
            .included_ranges
            .iter()
            .find(|r| position.bytes < r.end_byte)?;
        if position.bytes >= range.start_byte {
            Some(position)
        } else if range.start_byte < self.len() {
            Some(range.start())
        } else {
            None
        }
    }

    /// End of the included range containing `byte`, capped at the text end.
    pub fn included_end(&self, byte: u32) -> u32 {
        self.included_ranges
            .iter()
            .find(|r| r.start_byte <= byte && byte < r.end_byte)
            .map_or(byte, |r| r.end_byte)
            .min(self.len())
    }

    /// The outermost unchanged, error-free subtree of the old tree whose
    /// padding starts exactly at `position` and whose symbol is accepted.
    pub fn reusable_subtree(&self, position: Length, accept: impl Fn(Symbol) -> bool) -> Option<Subtree> {
        let tree = self.old_tree?;
        let mut parent = tree.root_subtree();
        let mut offset = Length::ZERO;
        'descend: loop {
            for child in parent.children() {
                let subtree = child.subtree();
                let end = offset.bytes + subtree.total_size().bytes;
                if offset.bytes > position.bytes {
                    return None;
                }
                if offset.bytes == position.bytes
                    && offset.extent == position.extent
                    && accept(subtree.symbol())
                    && !subtree.has_changes()
                    && !subtree.has_error()
                    && end > offset.bytes
                {
                    return Some(subtree.clone());
                }
                if position.bytes < end {
                    if subtree.is_leaf() {
                        return None;
                    }
                    parent = subtree;
                    continue 'descend;
                }
                offset += subtree.total_size();
            }
            return None;
        }
    }
}

fn decode_utf8(bytes: &[u8]) -> (char, u32) {
    let width = match bytes[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    bytes
        .get(..width)
        .and_then(|b| std::str::from_utf8(b).ok())
        .and_then(|s| s.chars().next())
        .map_or((char::REPLACEMENT_CHARACTER, 1), |c| (c, width as u32))
}

fn decode_utf16(bytes: &[u8]) -> Option<(char, u32)> {
    let unit = |i: usize| bytes.get(i..i + 2).map(|b| u16::from_le_bytes([b[0], b[1]]));
    let first = unit(0)?;
    let units = [first, unit(2).unwrap_or(0)];
    match char::decode_utf16(units).next() {
        Some(Ok(c)) => Some((c, c.len_utf16() as u32 * 2)),
        _ => Some((char::REPLACEMENT_CHARACTER, 2)),
    }
}
