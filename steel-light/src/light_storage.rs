//! Packed nibble light storage for one 16x16x16 section.
//!
//! Two 4-bit light values share a byte, so a section needs 2048 bytes once it
//! holds more than one distinct level. Until then it stays homogeneous.

use crate::world::MAX_LIGHT;

/// Bytes needed to store one light channel of a 16x16x16 section.
pub const LIGHT_ARRAY_SIZE: usize = 2048;

/// One light channel of a chunk section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightStorage {
    /// Every block in the section has the same level.
    Homogeneous(u8),
    /// Per-block levels, two per byte. The low nibble holds the even index.
    Heterogeneous(Box<[u8; LIGHT_ARRAY_SIZE]>),
}

#[inline]
fn nibble_index(x: usize, y: usize, z: usize) -> (usize, bool) {
    debug_assert!(x < 16 && y < 16 && z < 16, "Coordinates must be 0-15");
    let block_index = (y << 8) | (z << 4) | x;
    (block_index >> 1, block_index & 1 == 1)
}

impl LightStorage {
    /// Creates a section where every block has the given level.
    #[must_use]
    pub fn new_filled(light_level: u8) -> Self {
        debug_assert!(light_level <= MAX_LIGHT, "Light level must be 0-15");
        Self::Homogeneous(light_level)
    }

    /// Creates a dark section.
    #[must_use]
    pub fn new_empty() -> Self {
        Self::Homogeneous(0)
    }

    /// Gets the level at a section-local position.
    #[must_use]
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        match self {
            Self::Homogeneous(level) => *level,
            Self::Heterogeneous(data) => {
                let (byte_index, upper) = nibble_index(x, y, z);
                if upper {
                    data[byte_index] >> 4
                } else {
                    data[byte_index] & 0x0F
                }
            }
        }
    }

    /// Sets the level at a section-local position, upgrading to per-block storage when needed.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, light_level: u8) {
        debug_assert!(light_level <= MAX_LIGHT, "Light level must be 0-15");
        if let Self::Homogeneous(current) = self {
            if *current == light_level {
                return;
            }
            let packed = *current | (*current << 4);
            *self = Self::Heterogeneous(Box::new([packed; LIGHT_ARRAY_SIZE]));
        }

        if let Self::Heterogeneous(data) = self {
            let (byte_index, upper) = nibble_index(x, y, z);
            let level = light_level & 0x0F;
            data[byte_index] = if upper {
                (data[byte_index] & 0x0F) | (level << 4)
            } else {
                (data[byte_index] & 0xF0) | level
            };
        }
    }

    /// Whether the whole section shares one level.
    #[must_use]
    pub fn is_homogeneous(&self) -> bool {
        matches!(self, Self::Homogeneous(_))
    }
}

impl Default for LightStorage {
    fn default() -> Self {
        Self::new_empty()
    }
}
