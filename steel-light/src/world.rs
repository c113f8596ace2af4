//! Collaborator interfaces the light engine reads from and writes into.
//!
//! The engine never owns chunks. It resolves them through a [`LightWorld`],
//! reads block properties through a [`BlockLightProperties`] table, and is told
//! about world mutations through a registered [`WorldListener`].

use std::sync::Arc;

use steel_utils::{BlockPos, BlockStateId, ChunkPos};

/// Highest light level of either channel.
pub const MAX_LIGHT: u8 = 15;

/// The two independent light channels stored per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightChannel {
    /// Unobstructed sunlight exposure.
    Sky,
    /// Light emitted by luminous blocks.
    Block,
}

impl LightChannel {
    /// Both channels, sky first.
    pub const ALL: [LightChannel; 2] = [LightChannel::Sky, LightChannel::Block];
}

/// Light related properties of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LightProperties {
    /// Attenuation suffered by light passing through the block (0-15).
    pub opacity: u8,
    /// Light emitted by the block into the block channel (0-15).
    pub luminance: u8,
}

impl LightProperties {
    /// A fully transparent, non-emissive block such as air.
    pub const TRANSPARENT: Self = Self::new(0, 0);
    /// A fully opaque, non-emissive block such as stone.
    pub const OPAQUE: Self = Self::new(MAX_LIGHT, 0);

    /// Creates properties, clamping both values to the light range.
    #[must_use]
    pub const fn new(opacity: u8, luminance: u8) -> Self {
        Self {
            opacity: if opacity > MAX_LIGHT { MAX_LIGHT } else { opacity },
            luminance: if luminance > MAX_LIGHT { MAX_LIGHT } else { luminance },
        }
    }
}

/// Maps a block state to its light properties.
pub trait BlockLightProperties: Send + Sync {
    /// Returns the light properties of the given block state.
    fn light_properties(&self, block: BlockStateId) -> LightProperties;
}

/// Light-relevant view of a single chunk column.
///
/// `x` and `z` are local to the chunk (0-15), `y` is a world coordinate.
pub trait LightChunk {
    /// The position of this chunk.
    fn pos(&self) -> ChunkPos;

    /// Whether terrain population has finished and lighting may run.
    fn is_populated(&self) -> bool;

    /// Lowest y coordinate stored by the chunk.
    fn min_y(&self) -> i32;

    /// One past the highest y coordinate stored by the chunk.
    fn max_y(&self) -> i32;

    /// The block state at the given local position.
    fn block(&self, x: usize, y: i32, z: usize) -> BlockStateId;

    /// The stored light level of a channel at the given local position.
    fn light(&self, channel: LightChannel, x: usize, y: i32, z: usize) -> u8;

    /// Stores a light level (0-15) for a channel at the given local position.
    fn set_light(&mut self, channel: LightChannel, x: usize, y: i32, z: usize, level: u8);
}

/// Observer registered against a world. Replaces ambient event subscription.
pub trait WorldListener: Send + Sync {
    /// A chunk finished generating for the first time.
    fn chunk_generated(&self, chunk: &dyn LightChunk);

    /// A previously generated chunk was loaded.
    fn chunk_loaded(&self, chunk: &dyn LightChunk);

    /// The block at `pos` (inside `chunk`) changed from `old` to `new`.
    fn block_changed(&self, chunk: &dyn LightChunk, pos: BlockPos, old: BlockStateId, new: BlockStateId);
}

/// The world the light engine operates on.
pub trait LightWorld {
    /// The chunk type stored by this world.
    type Chunk: LightChunk;

    /// Lowest valid y coordinate.
    fn min_y(&self) -> i32;

    /// One past the highest valid y coordinate.
    fn max_y(&self) -> i32;

    /// Whether the position lies inside the world's bounds.
    fn is_valid(&self, pos: BlockPos) -> bool {
        pos.y() >= self.min_y() && pos.y() < self.max_y()
    }

    /// Resolves a chunk without generating or loading it.
    fn chunk(&self, pos: ChunkPos) -> Option<&Self::Chunk>;

    /// Resolves a chunk mutably without generating or loading it.
    fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Self::Chunk>;

    /// Positions of all currently loaded chunks.
    fn loaded_chunks(&self) -> Vec<ChunkPos>;

    /// Registers a listener for generation, load and block change notifications.
    fn add_listener(&mut self, listener: Arc<dyn WorldListener>);
}
