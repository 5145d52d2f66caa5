use std::fmt::{Debug, Formatter};

use geo::Coordinate;

use crate::coord::GRID_SPAN;

/// Node of the implicit quadtree over the quantized world grid,
/// identified by its depth and the path taken from the root. Children
/// append 2 bits to the path, so the encoding is deterministic for a
/// given (level, path) pair.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct CellId {
    level: u8,
    bits: u64,
}

impl CellId {
    pub const MAX_CHILDREN: usize = 4;

    pub fn root() -> Self {
        CellId { level: 0, bits: 0 }
    }

    pub fn from_bits_and_level(bits: u64, level: u8) -> Self {
        debug_assert!(
            bits < Self::total_cells_on_level(level),
            "bits {:#b} out of range for level {}",
            bits,
            level
        );
        CellId { level, bits }
    }

    pub fn level(self) -> u8 {
        self.level
    }

    pub fn child(self, i: u8) -> Self {
        debug_assert!((i as usize) < Self::MAX_CHILDREN);
        CellId {
            level: self.level + 1,
            bits: self.bits << 2 | u64::from(i),
        }
    }

    pub fn children(self) -> [CellId; 4] {
        [self.child(0), self.child(1), self.child(2), self.child(3)]
    }

    pub fn total_cells_on_level(level: u8) -> u64 {
        1 << (2 * u32::from(level))
    }

    /// Complete tiling of the world at the given level
    pub fn cells_on_level(level: u8) -> impl Iterator<Item = CellId> {
        (0..Self::total_cells_on_level(level)).map(move |bits| Self::from_bits_and_level(bits, level))
    }

    /// (min, max) corners of this cell on the coordinate grid. Spans are
    /// powers of two, so shared edges between neighbouring cells are
    /// bit-identical
    pub fn grid_bounds(self) -> (Coordinate<f64>, Coordinate<f64>) {
        let mut min_x = 0u64;
        let mut min_y = 0u64;
        for l in 0..self.level {
            let quadrant = (self.bits >> (2 * (self.level - 1 - l))) & 0b11;
            let half = GRID_SPAN >> (l + 1);
            if quadrant & 0b01 != 0 {
                min_x += half;
            }
            if quadrant & 0b10 != 0 {
                min_y += half;
            }
        }

        let size = GRID_SPAN >> self.level;
        (
            Coordinate {
                x: min_x as f64,
                y: min_y as f64,
            },
            Coordinate {
                x: (min_x + size) as f64,
                y: (min_y + size) as f64,
            },
        )
    }

    /// Linear index within a quadtree of the given depth, unique across
    /// levels. Used to address output cells independently of how deep
    /// they were actually split
    pub fn to_int64(self, depth: u8) -> i64 {
        debug_assert!(self.level < depth);
        let shallower = ((1u64 << (2 * u32::from(self.level))) - 1) / 3;
        (shallower + self.bits) as i64 + 1
    }
}

impl Debug for CellId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[L{} {:#b}]", self.level, self.bits)
    }
}
