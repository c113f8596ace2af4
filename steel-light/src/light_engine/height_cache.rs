//! Per-column sky exposure heights.

use rustc_hash::FxHashMap;
use steel_utils::{BlockPos, ChunkPos};

use crate::world::{BlockLightProperties, LightChunk};

/// Number of columns in a chunk.
const COLUMNS: usize = 16 * 16;

/// Height entries of one chunk, one per XZ column.
///
/// Stored in Z-major order: index = z * 16 + x.
#[derive(Debug, Clone)]
struct ColumnHeights {
    heights: Box<[i32; COLUMNS]>,
}

impl ColumnHeights {
    #[inline]
    fn get(&self, x: usize, z: usize) -> i32 {
        debug_assert!(x < 16 && z < 16, "Column coordinates must be 0-15");
        self.heights[z * 16 + x]
    }

    #[inline]
    fn set(&mut self, x: usize, z: usize, y: i32) {
        debug_assert!(x < 16 && z < 16, "Column coordinates must be 0-15");
        self.heights[z * 16 + x] = y;
    }
}

/// Scans a column from the top of the chunk down.
///
/// Returns the first `y` whose block below (`y - 1`) has nonzero opacity, or
/// the chunk floor when the whole column is transparent.
fn scan_column(
    chunk: &dyn LightChunk,
    properties: &dyn BlockLightProperties,
    x: usize,
    z: usize,
) -> i32 {
    let min_y = chunk.min_y();
    for y in (min_y + 1..=chunk.max_y()).rev() {
        if properties.light_properties(chunk.block(x, y - 1, z)).opacity > 0 {
            return y;
        }
    }
    min_y
}

/// Tracks, for every column of every observed chunk, the lowest y at and
/// above which sky light is full regardless of neighbors.
///
/// The cache is the only owner of its per-chunk arrays. Callers read single
/// entries by value and never get a reference into the storage.
#[derive(Debug, Default)]
pub struct HeightCache {
    chunks: FxHashMap<ChunkPos, ColumnHeights>,
}

impl HeightCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes every column of a chunk, replacing any existing entry.
    pub fn generate(&mut self, chunk: &dyn LightChunk, properties: &dyn BlockLightProperties) {
        let mut columns = ColumnHeights {
            heights: Box::new([chunk.min_y(); COLUMNS]),
        };
        for z in 0..16 {
            for x in 0..16 {
                columns.set(x, z, scan_column(chunk, properties, x, z));
            }
        }
        self.chunks.insert(chunk.pos(), columns);
    }

    /// Recomputes the column containing `pos`.
    ///
    /// Returns the previous and new height of the column, or `None` without
    /// touching anything if the chunk was never generated or loaded through
    /// this cache.
    pub fn update(
        &mut self,
        chunk: &dyn LightChunk,
        pos: BlockPos,
        properties: &dyn BlockLightProperties,
    ) -> Option<(i32, i32)> {
        let columns = self.chunks.get_mut(&chunk.pos())?;
        let (x, z) = (pos.local_x(), pos.local_z());
        let previous = columns.get(x, z);
        let height = scan_column(chunk, properties, x, z);
        columns.set(x, z, height);
        Some((previous, height))
    }

    /// The height entry of the column containing `pos`, if its chunk is tracked.
    #[must_use]
    #[inline]
    pub fn get(&self, pos: BlockPos) -> Option<i32> {
        self.chunks
            .get(&pos.chunk_pos())
            .map(|columns| columns.get(pos.local_x(), pos.local_z()))
    }

    /// Whether the chunk has an entry.
    #[must_use]
    pub fn contains(&self, chunk: ChunkPos) -> bool {
        self.chunks.contains_key(&chunk)
    }

    /// Drops the entry of a chunk. Returns whether one existed.
    pub fn remove(&mut self, chunk: ChunkPos) -> bool {
        self.chunks.remove(&chunk).is_some()
    }

    /// Number of tracked chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
