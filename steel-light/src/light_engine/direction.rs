//! The six axis directions light travels along.

use steel_utils::BlockPos;

/// Six axis-aligned directions.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// -Y
    Down = 0,
    /// +Y
    Up = 1,
    /// -Z
    North = 2,
    /// +Z
    South = 3,
    /// -X
    West = 4,
    /// +X
    East = 5,
}

impl Direction {
    /// All six directions in array form for iteration.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// The three directions pointing towards lower coordinates, x then y then z.
    pub const NEGATIVE: [Direction; 3] = [Direction::West, Direction::Down, Direction::North];

    /// The three directions pointing towards higher coordinates, x then y then z.
    pub const POSITIVE: [Direction; 3] = [Direction::East, Direction::Up, Direction::South];

    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Gets the offset in the given direction as (dx, dy, dz).
    #[must_use]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::Down => (0, -1, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }

    /// Whether the direction points towards higher coordinates.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Up | Self::South | Self::East)
    }

    /// Returns the neighbor of `pos` in this direction.
    #[must_use]
    #[inline]
    pub const fn relative(self, pos: BlockPos) -> BlockPos {
        let (dx, dy, dz) = self.offset();
        pos.offset(dx, dy, dz)
    }
}
