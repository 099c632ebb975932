//! Rectangular cell ranges

use crate::cell::SimpleCellAddress;
use std::fmt;

/// A rectangular span of absolute addresses on one sheet
///
/// Width and height are always at least 1 and every address the range yields
/// lies on `start.sheet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsoluteCellRange {
    /// Top-left corner
    pub start: SimpleCellAddress,
    width: u32,
    height: u32,
}

impl AbsoluteCellRange {
    /// Create a range spanning `width` columns and `height` rows from `start`
    ///
    /// Zero dimensions are clamped to 1.
    pub fn spanning(start: SimpleCellAddress, width: u32, height: u32) -> Self {
        Self {
            start,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Create the range covered by two opposite corners
    ///
    /// The corners may be given in any order; the sheet of `a` wins.
    pub fn from_corners(a: SimpleCellAddress, b: SimpleCellAddress) -> Self {
        let start = SimpleCellAddress::new(a.sheet, a.col.min(b.col), a.row.min(b.row));
        let width = a.col.max(b.col) - start.col + 1;
        let height = a.row.max(b.row) - start.row + 1;
        Self {
            start,
            width,
            height,
        }
    }

    /// Number of columns
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells
    pub fn size(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Bottom-right corner
    pub fn end(&self) -> SimpleCellAddress {
        SimpleCellAddress::new(
            self.start.sheet,
            self.start.col + self.width - 1,
            self.start.row + self.height - 1,
        )
    }

    /// Address at a column/row offset from the top-left corner
    ///
    /// Offsets are not bounds-checked against the range.
    pub fn address(&self, col_offset: u32, row_offset: u32) -> SimpleCellAddress {
        SimpleCellAddress::new(
            self.start.sheet,
            self.start.col + col_offset,
            self.start.row + row_offset,
        )
    }

    /// The first column of the range
    pub fn first_column(&self) -> Self {
        Self::spanning(self.start, 1, self.height)
    }

    /// Check if an address lies within this range
    pub fn contains(&self, addr: &SimpleCellAddress) -> bool {
        addr.sheet == self.start.sheet
            && addr.col >= self.start.col
            && addr.col - self.start.col < self.width
            && addr.row >= self.start.row
            && addr.row - self.start.row < self.height
    }

    /// Iterate over all addresses in the range (row by row)
    pub fn addresses(&self) -> AddressIterator {
        AddressIterator {
            range: *self,
            next: 0,
        }
    }
}

impl fmt::Display for AbsoluteCellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end())
    }
}

/// Iterator over the addresses of a range, row by row
pub struct AddressIterator {
    range: AbsoluteCellRange,
    next: u64,
}

impl Iterator for AddressIterator {
    type Item = SimpleCellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.range.size() {
            return None;
        }

        let width = self.range.width as u64;
        let col_offset = (self.next % width) as u32;
        let row_offset = (self.next / width) as u32;
        self.next += 1;

        Some(self.range.address(col_offset, row_offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.range.size() - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AddressIterator {}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(col: u32, row: u32) -> SimpleCellAddress {
        SimpleCellAddress::new(0, col, row)
    }

    #[test]
    fn test_from_corners_normalizes() {
        let range = AbsoluteCellRange::from_corners(addr(2, 3), addr(0, 1));
        assert_eq!(range.start, addr(0, 1));
        assert_eq!(range.width(), 3);
        assert_eq!(range.height(), 3);
        assert_eq!(range.end(), addr(2, 3));
    }

    #[test]
    fn test_spanning_clamps_zero() {
        let range = AbsoluteCellRange::spanning(addr(0, 0), 0, 0);
        assert_eq!(range.width(), 1);
        assert_eq!(range.height(), 1);
    }

    #[test]
    fn test_contains() {
        let range = AbsoluteCellRange::from_corners(addr(1, 1), addr(3, 3));
        assert!(range.contains(&addr(1, 1)));
        assert!(range.contains(&addr(3, 3)));
        assert!(!range.contains(&addr(0, 0)));
        assert!(!range.contains(&addr(4, 1)));
        assert!(!range.contains(&SimpleCellAddress::new(1, 2, 2)));
    }

    #[test]
    fn test_address_iterator_is_row_major() {
        let range = AbsoluteCellRange::from_corners(addr(0, 0), addr(1, 1));
        let cells: Vec<_> = range.addresses().collect();

        assert_eq!(cells, vec![addr(0, 0), addr(1, 0), addr(0, 1), addr(1, 1)]);
        assert_eq!(range.addresses().len(), 4);
    }

    #[test]
    fn test_first_column_and_display() {
        let range = AbsoluteCellRange::from_corners(addr(1, 0), addr(2, 8));
        assert_eq!(range.first_column().to_string(), "B1:B9");
        assert_eq!(range.to_string(), "B1:C9");
    }
}
