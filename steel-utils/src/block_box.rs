//! Inclusive axis-aligned voxel regions.

use std::fmt::{self, Display};

use crate::math::Vector3;
use crate::types::{BlockPos, CHUNK_WIDTH, ChunkPos};

/// An axis-aligned box of block positions. Both corners are inclusive.
///
/// `min` is always component-wise less than or equal to `max`; the
/// constructors normalize their input so a box is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockBox {
    /// The lowest corner.
    pub min: BlockPos,
    /// The highest corner.
    pub max: BlockPos,
}

impl BlockBox {
    /// Creates a box spanning both corners, in any order.
    #[must_use]
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos(a.0.min(b.0)),
            max: BlockPos(a.0.max(b.0)),
        }
    }

    /// A box containing a single block.
    #[must_use]
    pub const fn single(pos: BlockPos) -> Self {
        Self { min: pos, max: pos }
    }

    /// The full column box of a chunk between `min_y` and `max_y` (exclusive).
    #[must_use]
    pub const fn chunk(pos: ChunkPos, min_y: i32, max_y: i32) -> Self {
        let x = pos.min_block_x();
        let z = pos.min_block_z();
        Self {
            min: BlockPos::new(x, min_y, z),
            max: BlockPos::new(x + CHUNK_WIDTH - 1, max_y - 1, z + CHUNK_WIDTH - 1),
        }
    }

    /// Whether the two boxes share at least one block.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.0.x <= other.max.0.x
            && other.min.0.x <= self.max.0.x
            && self.min.0.y <= other.max.0.y
            && other.min.0.y <= self.max.0.y
            && self.min.0.z <= other.max.0.z
            && other.min.0.z <= self.max.0.z
    }

    /// The smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: BlockPos(self.min.0.min(other.min.0)),
            max: BlockPos(self.max.0.max(other.max.0)),
        }
    }

    /// Whether the position lies inside the box.
    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min.0.x..=self.max.0.x).contains(&pos.0.x)
            && (self.min.0.y..=self.max.0.y).contains(&pos.0.y)
            && (self.min.0.z..=self.max.0.z).contains(&pos.0.z)
    }

    /// Extent of the box along each axis.
    #[must_use]
    pub fn size(&self) -> Vector3<i64> {
        Vector3::new(
            i64::from(self.max.0.x) - i64::from(self.min.0.x) + 1,
            i64::from(self.max.0.y) - i64::from(self.min.0.y) + 1,
            i64::from(self.max.0.z) - i64::from(self.min.0.z) + 1,
        )
    }

    /// Number of blocks in the box.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let size = self.size();
        (size.x * size.y * size.z) as u64
    }
}

impl Display for BlockBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}
