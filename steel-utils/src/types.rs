// Wrapper types making it harder to accidentaly use the wrong underlying type.

use std::fmt::{self, Display};

use crate::math::{vector2::Vector2, vector3::Vector3};

/// Width of a chunk column along both the x and z axes.
pub const CHUNK_WIDTH: i32 = 16;

// A raw block state. The upper 12 bits hold the block identity, the lower 4 bits its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockStateId(pub u16);

impl BlockStateId {
    /// The air block state.
    pub const AIR: Self = Self(0);

    /// Packs a block identity and its metadata into a state id.
    #[must_use]
    pub const fn new(block_id: u16, metadata: u8) -> Self {
        debug_assert!(block_id < 0x1000, "Block id must fit in 12 bits");
        Self((block_id << 4) | (metadata as u16 & 0x0F))
    }

    /// Returns the block identity without metadata.
    #[must_use]
    #[inline]
    pub const fn block_id(self) -> u16 {
        self.0 >> 4
    }

    /// Returns the metadata nibble.
    #[must_use]
    #[inline]
    pub const fn metadata(self) -> u8 {
        (self.0 & 0x0F) as u8
    }

    /// Whether two states refer to the same block identity.
    #[must_use]
    #[inline]
    pub const fn same_block(self, other: Self) -> bool {
        self.block_id() == other.block_id()
    }
}

// A chunk position. `0.y` is the world z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos(pub Vector2<i32>);

impl ChunkPos {
    /// Creates a chunk position from chunk coordinates.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self(Vector2::new(x, z))
    }

    /// The chunk x coordinate.
    #[must_use]
    #[inline]
    pub const fn x(self) -> i32 {
        self.0.x
    }

    /// The chunk z coordinate.
    #[must_use]
    #[inline]
    pub const fn z(self) -> i32 {
        self.0.y
    }

    /// World x coordinate of the chunk's first column.
    #[must_use]
    pub const fn min_block_x(self) -> i32 {
        self.0.x * CHUNK_WIDTH
    }

    /// World z coordinate of the chunk's first column.
    #[must_use]
    pub const fn min_block_z(self) -> i32 {
        self.0.y * CHUNK_WIDTH
    }
}

impl Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.0.x, self.0.y)
    }
}

// A block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos(pub Vector3<i32>);

impl BlockPos {
    /// Creates a block position from world coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// The world x coordinate.
    #[must_use]
    #[inline]
    pub const fn x(self) -> i32 {
        self.0.x
    }

    /// The world y coordinate.
    #[must_use]
    #[inline]
    pub const fn y(self) -> i32 {
        self.0.y
    }

    /// The world z coordinate.
    #[must_use]
    #[inline]
    pub const fn z(self) -> i32 {
        self.0.z
    }

    /// Returns the position shifted by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.0.x + dx, self.0.y + dy, self.0.z + dz)
    }

    /// The chunk column containing this position.
    #[must_use]
    #[inline]
    pub const fn chunk_pos(self) -> ChunkPos {
        ChunkPos::new(self.0.x >> 4, self.0.z >> 4)
    }

    /// X coordinate inside the containing chunk (0-15).
    #[must_use]
    #[inline]
    pub const fn local_x(self) -> usize {
        (self.0.x & (CHUNK_WIDTH - 1)) as usize
    }

    /// Z coordinate inside the containing chunk (0-15).
    #[must_use]
    #[inline]
    pub const fn local_z(self) -> usize {
        (self.0.z & (CHUNK_WIDTH - 1)) as usize
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}
