//! The incremental light engine.
//!
//! World notifications keep the [`HeightCache`] current and schedule relight
//! jobs. An external driver calls [`LightEngine::try_step`] repeatedly to
//! drain the queue at its own pace. Enqueueing is safe from any thread;
//! stepping is expected to happen from one lighting thread at a time.

use std::sync::Arc;

use parking_lot::RwLock;
use steel_utils::{BlockBox, BlockPos, BlockStateId, ChunkPos};

use super::height_cache::HeightCache;
use super::operation_queue::{OperationQueue, RegionJob};
use super::solver::{JobStats, LightSolver};
use crate::config::LightConfig;
use crate::properties::LightPropertyTable;
use crate::world::{BlockLightProperties, LightChannel, LightChunk, LightWorld, WorldListener};

/// Maintains per-column sun heights and a queue of pending relight jobs.
pub struct LightEngine {
    config: LightConfig,
    properties: Arc<dyn BlockLightProperties>,
    heights: RwLock<HeightCache>,
    queue: OperationQueue,
}

impl LightEngine {
    /// Creates an engine reading block properties from `properties`.
    #[must_use]
    pub fn new(config: LightConfig, properties: Arc<dyn BlockLightProperties>) -> Arc<Self> {
        let queue = OperationQueue::new(config.merge_lookback);
        Arc::new(Self {
            config,
            properties,
            heights: RwLock::new(HeightCache::new()),
            queue,
        })
    }

    /// Creates an engine whose property table is seeded from the config's block list.
    #[must_use]
    pub fn from_config(config: LightConfig) -> Arc<Self> {
        let table = LightPropertyTable::from_entries(&config.blocks);
        Self::new(config, Arc::new(table))
    }

    /// Registers the engine as a listener of `world` and primes every chunk
    /// that is already loaded.
    pub fn attach<W: LightWorld>(self: &Arc<Self>, world: &mut W) {
        world.add_listener(Arc::clone(self) as Arc<dyn WorldListener>);

        let loaded = world.loaded_chunks();
        for pos in &loaded {
            if let Some(chunk) = world.chunk(*pos) {
                self.track_chunk(chunk, "already loaded");
            }
        }
        log::debug!("Light engine attached, primed {} chunks", loaded.len());
    }

    /// Computes the chunk's height entries and, if configured, seeds a
    /// first-time relight of the whole chunk for both channels.
    fn track_chunk(&self, chunk: &dyn LightChunk, reason: &str) {
        self.heights.write().generate(chunk, &*self.properties);
        log::debug!("Tracking heights of chunk {} ({reason})", chunk.pos());

        if self.config.schedule_on_notify {
            let region = BlockBox::chunk(chunk.pos(), chunk.min_y(), chunk.max_y());
            for channel in LightChannel::ALL {
                self.enqueue(region, channel, true);
            }
        }
    }

    /// Schedules a relight of `region` for one channel.
    ///
    /// Returns `true` if the job was merged into an already queued one.
    pub fn enqueue(&self, region: BlockBox, channel: LightChannel, initial: bool) -> bool {
        self.queue.enqueue(RegionJob::new(region, channel, initial))
    }

    /// Pops and executes the oldest job, returning what it did.
    ///
    /// The queue lock is only held while popping, so producers are never
    /// blocked by a running job.
    pub fn step<W: LightWorld>(&self, world: &mut W) -> Option<JobStats> {
        let job = self.queue.pop()?;
        let heights = self.heights.read();
        Some(LightSolver::new(world, &heights, &*self.properties, &self.queue).execute(&job))
    }

    /// Executes at most one queued job. Returns whether there was work.
    pub fn try_step<W: LightWorld>(&self, world: &mut W) -> bool {
        self.step(world).is_some()
    }

    /// Calls [`Self::try_step`] up to `budget` times, stopping early once the
    /// queue is empty. Returns the number of jobs executed.
    pub fn run_steps<W: LightWorld>(&self, world: &mut W, budget: usize) -> usize {
        let mut executed = 0;
        while executed < budget && self.try_step(world) {
            executed += 1;
        }
        executed
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// The cached sun height of the column containing `pos`.
    #[must_use]
    pub fn height(&self, pos: BlockPos) -> Option<i32> {
        self.heights.read().get(pos)
    }

    /// Drops the height entries of an unloaded chunk.
    pub fn forget_chunk(&self, pos: ChunkPos) {
        if self.heights.write().remove(pos) {
            log::debug!("Forgot heights of chunk {pos}");
        }
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &LightConfig {
        &self.config
    }
}

impl WorldListener for LightEngine {
    fn chunk_generated(&self, chunk: &dyn LightChunk) {
        self.track_chunk(chunk, "generated");
    }

    fn chunk_loaded(&self, chunk: &dyn LightChunk) {
        self.track_chunk(chunk, "loaded");
    }

    fn block_changed(&self, chunk: &dyn LightChunk, pos: BlockPos, old: BlockStateId, new: BlockStateId) {
        // Metadata never affects light.
        if old.same_block(new) {
            return;
        }

        let update = self.heights.write().update(chunk, pos, &*self.properties);
        if update.is_none() {
            log::debug!("Block change at {pos} in untracked chunk {}, height not updated", chunk.pos());
        }
        if !self.config.schedule_on_notify {
            return;
        }

        for channel in LightChannel::ALL {
            self.enqueue(BlockBox::single(pos), channel, false);
        }
        // Blocks between the old and new height gained or lost direct sun.
        if let Some((previous, height)) = update
            && previous != height
        {
            let column = BlockBox::new(
                BlockPos::new(pos.x(), previous.min(height), pos.z()),
                BlockPos::new(pos.x(), previous.max(height) - 1, pos.z()),
            );
            self.enqueue(column, LightChannel::Sky, false);
        }
    }
}
