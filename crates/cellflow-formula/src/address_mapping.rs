//! Address → vertex lookup

use crate::vertex::VertexId;
use ahash::AHashMap;
use cellflow_core::{AbsoluteCellRange, Error, Result, SimpleCellAddress};

/// Sparse map from cell addresses to vertices, bounded by the loaded sheet
///
/// Bounds are fixed when the mapping is created from the sheet's shape. Only
/// occupied or referenced addresses have an entry.
#[derive(Debug, Clone, Default)]
pub struct AddressMapping {
    sheet: u32,
    width: u32,
    height: u32,
    cells: AHashMap<SimpleCellAddress, VertexId>,
}

impl AddressMapping {
    /// Create a mapping for a `width` x `height` sheet
    pub fn new(sheet: u32, width: u32, height: u32) -> Self {
        Self {
            sheet,
            width,
            height,
            cells: AHashMap::new(),
        }
    }

    /// Sheet the mapping covers
    pub fn sheet(&self) -> u32 {
        self.sheet
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check whether an address lies within the loaded bounds
    pub fn is_in_bounds(&self, address: &SimpleCellAddress) -> bool {
        address.sheet == self.sheet && address.col < self.width && address.row < self.height
    }

    /// Check whether every cell of a range lies within the loaded bounds
    pub fn is_range_in_bounds(&self, range: &AbsoluteCellRange) -> bool {
        self.is_in_bounds(&range.start) && self.is_in_bounds(&range.end())
    }

    /// Vertex at `address`, `None` for an unoccupied in-bounds address
    ///
    /// Fails for addresses outside the loaded bounds.
    pub fn get_cell(&self, address: &SimpleCellAddress) -> Result<Option<VertexId>> {
        self.check_bounds(address)?;
        Ok(self.cells.get(address).copied())
    }

    /// Record the vertex for `address`, replacing any previous entry
    pub fn set_cell(&mut self, address: SimpleCellAddress, vertex: VertexId) -> Result<()> {
        self.check_bounds(&address)?;
        self.cells.insert(address, vertex);
        Ok(())
    }

    /// Number of addresses with a vertex
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn check_bounds(&self, address: &SimpleCellAddress) -> Result<()> {
        if self.is_in_bounds(address) {
            Ok(())
        } else {
            Err(Error::AddressOutOfBounds {
                address: *address,
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Map from ranges used as arguments to their range vertices
///
/// Formulas naming the same range share one vertex, and with it one cache.
#[derive(Debug, Clone, Default)]
pub struct RangeMapping {
    ranges: AHashMap<AbsoluteCellRange, VertexId>,
}

impl RangeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_range(&self, range: &AbsoluteCellRange) -> Option<VertexId> {
        self.ranges.get(range).copied()
    }

    pub fn set_range(&mut self, range: AbsoluteCellRange, vertex: VertexId) {
        self.ranges.insert(range, vertex);
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
