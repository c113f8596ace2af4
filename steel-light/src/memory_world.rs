//! An in-memory world of column chunks.
//!
//! Blocks are stored in 16-high sections and light in packed nibble
//! sections. Chunks are never generated on read: a missing chunk stays
//! missing until [`MemoryWorld::generate_chunk`] or
//! [`MemoryWorld::load_chunk`] inserts it.

use std::{mem, sync::Arc};

use rustc_hash::FxHashMap;
use steel_utils::{BlockPos, BlockStateId, ChunkPos};

use crate::light_storage::LightStorage;
use crate::world::{LightChannel, LightChunk, LightWorld, WorldListener};

const SECTION_VOLUME: usize = 16 * 16 * 16;

/// One 16x16x16 slice of a chunk.
#[derive(Debug, Clone)]
struct ChunkSection {
    blocks: Box<[BlockStateId; SECTION_VOLUME]>,
    sky_light: LightStorage,
    block_light: LightStorage,
}

impl ChunkSection {
    fn new() -> Self {
        Self {
            blocks: Box::new([BlockStateId::AIR; SECTION_VOLUME]),
            sky_light: LightStorage::new_empty(),
            block_light: LightStorage::new_empty(),
        }
    }

    #[inline]
    fn block_index(x: usize, y: usize, z: usize) -> usize {
        (y << 8) | (z << 4) | x
    }

    fn light(&self, channel: LightChannel) -> &LightStorage {
        match channel {
            LightChannel::Sky => &self.sky_light,
            LightChannel::Block => &self.block_light,
        }
    }

    fn light_mut(&mut self, channel: LightChannel) -> &mut LightStorage {
        match channel {
            LightChannel::Sky => &mut self.sky_light,
            LightChannel::Block => &mut self.block_light,
        }
    }
}

/// A column chunk spanning `[min_y, max_y)`.
#[derive(Debug, Clone)]
pub struct MemoryChunk {
    pos: ChunkPos,
    min_y: i32,
    max_y: i32,
    populated: bool,
    sections: Vec<ChunkSection>,
}

impl MemoryChunk {
    /// Creates an empty, unpopulated chunk filled with air and no light.
    #[must_use]
    pub fn new(pos: ChunkPos, min_y: i32, max_y: i32) -> Self {
        debug_assert!(min_y < max_y, "Chunk must span at least one block");
        let height = (max_y - min_y).max(0) as usize;
        Self {
            pos,
            min_y,
            max_y,
            populated: false,
            sections: (0..height.div_ceil(16)).map(|_| ChunkSection::new()).collect(),
        }
    }

    /// Marks terrain population as finished or not.
    pub fn set_populated(&mut self, populated: bool) {
        self.populated = populated;
    }

    /// Resolves the section holding `y` and the section-local y.
    #[inline]
    fn locate(&self, y: i32) -> Option<(usize, usize)> {
        if y < self.min_y || y >= self.max_y {
            return None;
        }
        let rel_y = (y - self.min_y) as usize;
        Some((rel_y >> 4, rel_y & 15))
    }

    /// Replaces the block at a local position, returning the previous one.
    ///
    /// Out of range positions are ignored and report air.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, block: BlockStateId) -> BlockStateId {
        let Some((section, local_y)) = self.locate(y) else {
            return BlockStateId::AIR;
        };
        let slot = &mut self.sections[section].blocks[ChunkSection::block_index(x, local_y, z)];
        mem::replace(slot, block)
    }

    /// Sets the blocks of one column between `min_y` and `max_y` (exclusive).
    pub fn fill_column(&mut self, x: usize, z: usize, min_y: i32, max_y: i32, block: BlockStateId) {
        for y in min_y.max(self.min_y)..max_y.min(self.max_y) {
            self.set_block(x, y, z, block);
        }
    }

    /// Sets every block between `min_y` and `max_y` (exclusive) to `block`.
    pub fn fill_layers(&mut self, min_y: i32, max_y: i32, block: BlockStateId) {
        for z in 0..16 {
            for x in 0..16 {
                self.fill_column(x, z, min_y, max_y, block);
            }
        }
    }
}

impl LightChunk for MemoryChunk {
    fn pos(&self) -> ChunkPos {
        self.pos
    }

    fn is_populated(&self) -> bool {
        self.populated
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }

    fn max_y(&self) -> i32 {
        self.max_y
    }

    fn block(&self, x: usize, y: i32, z: usize) -> BlockStateId {
        self.locate(y).map_or(BlockStateId::AIR, |(section, local_y)| {
            self.sections[section].blocks[ChunkSection::block_index(x, local_y, z)]
        })
    }

    fn light(&self, channel: LightChannel, x: usize, y: i32, z: usize) -> u8 {
        self.locate(y).map_or(0, |(section, local_y)| {
            self.sections[section].light(channel).get(x, local_y, z)
        })
    }

    fn set_light(&mut self, channel: LightChannel, x: usize, y: i32, z: usize, level: u8) {
        if let Some((section, local_y)) = self.locate(y) {
            self.sections[section]
                .light_mut(channel)
                .set(x, local_y, z, level);
        }
    }
}

/// A world holding [`MemoryChunk`]s keyed by position.
pub struct MemoryWorld {
    min_y: i32,
    max_y: i32,
    chunks: FxHashMap<ChunkPos, MemoryChunk>,
    listeners: Vec<Arc<dyn WorldListener>>,
}

impl MemoryWorld {
    /// Creates an empty world spanning `[min_y, max_y)`.
    #[must_use]
    pub fn new(min_y: i32, max_y: i32) -> Self {
        Self {
            min_y,
            max_y,
            chunks: FxHashMap::default(),
            listeners: Vec::new(),
        }
    }

    /// Generates a chunk, lets `fill` shape its terrain, marks it populated
    /// and notifies listeners. An existing chunk at `pos` is replaced.
    pub fn generate_chunk(&mut self, pos: ChunkPos, fill: impl FnOnce(&mut MemoryChunk)) {
        let mut chunk = MemoryChunk::new(pos, self.min_y, self.max_y);
        fill(&mut chunk);
        chunk.set_populated(true);
        self.chunks.insert(pos, chunk);

        log::debug!("Generated chunk {pos}");
        if let Some(chunk) = self.chunks.get(&pos) {
            for listener in &self.listeners {
                listener.chunk_generated(chunk);
            }
        }
    }

    /// Inserts a previously generated chunk and notifies listeners.
    pub fn load_chunk(&mut self, chunk: MemoryChunk) {
        let pos = chunk.pos();
        self.chunks.insert(pos, chunk);
        if let Some(chunk) = self.chunks.get(&pos) {
            for listener in &self.listeners {
                listener.chunk_loaded(chunk);
            }
        }
    }

    /// Removes a chunk, handing it back to the caller.
    pub fn unload_chunk(&mut self, pos: ChunkPos) -> Option<MemoryChunk> {
        self.chunks.remove(&pos)
    }

    /// Changes the population flag of a loaded chunk. Returns whether the chunk exists.
    pub fn set_populated(&mut self, pos: ChunkPos, populated: bool) -> bool {
        let Some(chunk) = self.chunks.get_mut(&pos) else {
            return false;
        };
        chunk.set_populated(populated);
        true
    }

    /// Replaces a block and notifies listeners when the state changed.
    ///
    /// Returns the previous block, or `None` if the position is out of
    /// bounds or its chunk is not loaded.
    pub fn set_block(&mut self, pos: BlockPos, block: BlockStateId) -> Option<BlockStateId> {
        if !self.is_valid(pos) {
            return None;
        }
        let chunk = self.chunks.get_mut(&pos.chunk_pos())?;
        let old = chunk.set_block(pos.local_x(), pos.y(), pos.local_z(), block);
        if old != block {
            for listener in &self.listeners {
                listener.block_changed(&*chunk, pos, old, block);
            }
        }
        Some(old)
    }

    /// The block at `pos`, if its chunk is loaded.
    #[must_use]
    pub fn block(&self, pos: BlockPos) -> Option<BlockStateId> {
        if !self.is_valid(pos) {
            return None;
        }
        self.chunks
            .get(&pos.chunk_pos())
            .map(|chunk| chunk.block(pos.local_x(), pos.y(), pos.local_z()))
    }

    /// The stored light of a channel at `pos`, if its chunk is loaded.
    #[must_use]
    pub fn light(&self, channel: LightChannel, pos: BlockPos) -> Option<u8> {
        if !self.is_valid(pos) {
            return None;
        }
        self.chunks
            .get(&pos.chunk_pos())
            .map(|chunk| chunk.light(channel, pos.local_x(), pos.y(), pos.local_z()))
    }
}

impl LightWorld for MemoryWorld {
    type Chunk = MemoryChunk;

    fn min_y(&self) -> i32 {
        self.min_y
    }

    fn max_y(&self) -> i32 {
        self.max_y
    }

    fn chunk(&self, pos: ChunkPos) -> Option<&MemoryChunk> {
        self.chunks.get(&pos)
    }

    fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut MemoryChunk> {
        self.chunks.get_mut(&pos)
    }

    fn loaded_chunks(&self) -> Vec<ChunkPos> {
        self.chunks.keys().copied().collect()
    }

    fn add_listener(&mut self, listener: Arc<dyn WorldListener>) {
        self.listeners.push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const STONE: BlockStateId = BlockStateId::new(1, 0);

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl WorldListener for Recorder {
        fn chunk_generated(&self, chunk: &dyn LightChunk) {
            self.events.lock().push(format!("generated {}", chunk.pos()));
        }

        fn chunk_loaded(&self, chunk: &dyn LightChunk) {
            self.events.lock().push(format!("loaded {}", chunk.pos()));
        }

        fn block_changed(&self, _chunk: &dyn LightChunk, pos: BlockPos, old: BlockStateId, new: BlockStateId) {
            self.events
                .lock()
                .push(format!("changed {pos} {} -> {}", old.block_id(), new.block_id()));
        }
    }

    #[test]
    fn test_chunk_blocks_and_light() {
        let mut chunk = MemoryChunk::new(ChunkPos::new(0, 0), -16, 32);
        assert_eq!(chunk.set_block(1, -16, 2, STONE), BlockStateId::AIR);
        assert_eq!(chunk.block(1, -16, 2), STONE);
        assert_eq!(chunk.set_block(1, -16, 2, BlockStateId::AIR), STONE);

        chunk.set_light(LightChannel::Block, 3, 31, 3, 9);
        assert_eq!(chunk.light(LightChannel::Block, 3, 31, 3), 9);
        assert_eq!(chunk.light(LightChannel::Sky, 3, 31, 3), 0);
    }

    #[test]
    fn test_out_of_range_reads_are_empty() {
        let mut chunk = MemoryChunk::new(ChunkPos::new(0, 0), 0, 16);
        chunk.set_light(LightChannel::Sky, 0, 16, 0, 15);
        assert_eq!(chunk.light(LightChannel::Sky, 0, 16, 0), 0);
        assert_eq!(chunk.block(0, -1, 0), BlockStateId::AIR);
    }

    #[test]
    fn test_generate_marks_populated_and_notifies() {
        let recorder = Arc::new(Recorder::default());
        let mut world = MemoryWorld::new(0, 16);
        world.add_listener(recorder.clone());

        world.generate_chunk(ChunkPos::new(2, -1), |chunk| chunk.fill_layers(0, 1, STONE));
        let chunk = world.chunk(ChunkPos::new(2, -1)).expect("chunk was generated");
        assert!(chunk.is_populated());
        assert_eq!(world.block(BlockPos::new(32, 0, -16)), Some(STONE));
        assert_eq!(*recorder.events.lock(), vec!["generated [2, -1]".to_string()]);
    }

    #[test]
    fn test_set_block_notifies_only_on_change() {
        let recorder = Arc::new(Recorder::default());
        let mut world = MemoryWorld::new(0, 16);
        world.generate_chunk(ChunkPos::new(0, 0), |_| {});
        world.add_listener(recorder.clone());

        assert_eq!(world.set_block(BlockPos::new(1, 2, 3), STONE), Some(BlockStateId::AIR));
        assert_eq!(world.set_block(BlockPos::new(1, 2, 3), STONE), Some(STONE));
        assert_eq!(world.set_block(BlockPos::new(1, 99, 3), STONE), None);
        assert_eq!(world.set_block(BlockPos::new(100, 2, 3), STONE), None);
        assert_eq!(recorder.events.lock().len(), 1);
    }

    #[test]
    fn test_reads_never_generate() {
        let world = MemoryWorld::new(0, 16);
        assert_eq!(world.light(LightChannel::Sky, BlockPos::new(0, 0, 0)), None);
        assert!(world.chunk(ChunkPos::new(0, 0)).is_none());
        assert!(world.loaded_chunks().is_empty());
    }

    #[test]
    fn test_unload_and_load() {
        let recorder = Arc::new(Recorder::default());
        let mut world = MemoryWorld::new(0, 16);
        world.add_listener(recorder.clone());
        world.generate_chunk(ChunkPos::new(0, 0), |_| {});

        let chunk = world.unload_chunk(ChunkPos::new(0, 0)).expect("chunk was loaded");
        assert!(world.block(BlockPos::new(0, 0, 0)).is_none());
        world.load_chunk(chunk);
        assert_eq!(recorder.events.lock().last().map(String::as_str), Some("loaded [0, 0]"));
    }
}
