//! Voxel level light recomputation.
//!
//! A job is executed in one synchronous sweep over its region. Each block's
//! level is relaxed once against the stored levels of its six neighbors;
//! blocks earlier in the sweep are already updated when later ones read them.
//! Whenever a block's level changes, follow-up single-block jobs are queued
//! for neighbors that may now disagree with it. Iterating those jobs through
//! the [`OperationQueue`] converges to a fixpoint without recursion.

use steel_utils::{BlockBox, BlockPos};

use super::direction::Direction;
use super::height_cache::HeightCache;
use super::operation_queue::{OperationQueue, RegionJob};
use crate::world::{
    BlockLightProperties, LightChannel, LightChunk, LightProperties, LightWorld, MAX_LIGHT,
};

/// Counters describing what executing one job did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobStats {
    /// The job was dropped because its chunk was missing or unpopulated.
    pub dropped: bool,
    /// Blocks whose level was recomputed.
    pub recomputed: u64,
    /// Blocks whose stored level changed.
    pub changed: u64,
    /// Follow-up jobs handed to the queue.
    pub spawned: u64,
}

/// Executes region jobs against a world.
pub struct LightSolver<'a, W: LightWorld> {
    world: &'a mut W,
    heights: &'a HeightCache,
    properties: &'a dyn BlockLightProperties,
    queue: &'a OperationQueue,
}

impl<'a, W: LightWorld> LightSolver<'a, W> {
    /// Creates a solver reading and writing `world`, queueing follow-ups into `queue`.
    pub fn new(
        world: &'a mut W,
        heights: &'a HeightCache,
        properties: &'a dyn BlockLightProperties,
        queue: &'a OperationQueue,
    ) -> Self {
        Self {
            world,
            heights,
            properties,
            queue,
        }
    }

    /// Recomputes every block of the job's region, top layer first.
    ///
    /// The whole job is dropped when the chunk holding the region's lowest
    /// corner is missing or not yet populated. It is not retried.
    pub fn execute(&mut self, job: &RegionJob) -> JobStats {
        let mut stats = JobStats::default();
        if self.ready_chunk(job.region.min).is_none() {
            log::trace!("Dropping {:?} job over {}: chunk not ready", job.channel, job.region);
            stats.dropped = true;
            return stats;
        }

        let BlockBox { min, max } = job.region;
        let top = max.y().min(self.world.max_y() - 1);
        let bottom = min.y().max(self.world.min_y());
        for y in (bottom..=top).rev() {
            for x in min.x()..=max.x() {
                for z in min.z()..=max.z() {
                    self.recompute(BlockPos::new(x, y, z), job, &mut stats);
                }
            }
        }

        log::trace!(
            "{:?} job over {}: {} recomputed, {} changed, {} spawned",
            job.channel,
            job.region,
            stats.recomputed,
            stats.changed,
            stats.spawned
        );
        stats
    }

    /// Resolves the populated chunk holding `pos`, never generating one.
    fn ready_chunk(&self, pos: BlockPos) -> Option<&W::Chunk> {
        self.world
            .chunk(pos.chunk_pos())
            .filter(|chunk| chunk.is_populated())
    }

    /// Light a block contributes on its own, before any neighbor is considered.
    fn emissiveness(&self, pos: BlockPos, channel: LightChannel, block: LightProperties) -> u8 {
        match channel {
            LightChannel::Block => block.luminance,
            LightChannel::Sky => {
                let sunlit = self.heights.get(pos).is_some_and(|height| pos.y() >= height);
                if sunlit { MAX_LIGHT } else { 0 }
            }
        }
    }

    /// Highest stored level among the six neighbors whose chunk exists.
    fn max_neighbor(&self, pos: BlockPos, channel: LightChannel) -> u8 {
        Direction::ALL
            .iter()
            .map(|dir| dir.relative(pos))
            .filter(|neighbor| self.world.is_valid(*neighbor))
            .filter_map(|neighbor| {
                self.world.chunk(neighbor.chunk_pos()).map(|chunk| {
                    chunk.light(channel, neighbor.local_x(), neighbor.y(), neighbor.local_z())
                })
            })
            .max()
            .unwrap_or(0)
    }

    fn recompute(&mut self, pos: BlockPos, job: &RegionJob, stats: &mut JobStats) {
        if !self.world.is_valid(pos) {
            return;
        }
        let channel = job.channel;
        let (x, y, z) = (pos.local_x(), pos.y(), pos.local_z());
        let Some(chunk) = self.ready_chunk(pos) else {
            return;
        };
        let current = chunk.light(channel, x, y, z);
        let block = self.properties.light_properties(chunk.block(x, y, z));

        // Every block attenuates by at least one so light always dies out.
        let opacity = block.opacity.max(1);
        let emissiveness = self.emissiveness(pos, channel, block);
        let level = if opacity < MAX_LIGHT || emissiveness != 0 {
            self.max_neighbor(pos, channel)
                .saturating_sub(opacity)
                .max(emissiveness)
                .min(MAX_LIGHT)
        } else {
            0
        };

        stats.recomputed += 1;
        if level == current {
            return;
        }
        if let Some(chunk) = self.world.chunk_mut(pos.chunk_pos()) {
            chunk.set_light(channel, x, y, z, level);
        }
        stats.changed += 1;

        let propagated = level.saturating_sub(1);
        for dir in Direction::NEGATIVE {
            self.propagate_event(dir.relative(pos), propagated, job, stats);
        }
        // Forward neighbors still inside the region are visited later in this sweep.
        for dir in Direction::POSITIVE {
            if on_far_edge(pos, dir, &job.region) {
                self.propagate_event(dir.relative(pos), propagated, job, stats);
            }
        }
    }

    /// Queues a single-block job at `pos` unless its stored level already equals `proposed`.
    fn propagate_event(&self, pos: BlockPos, proposed: u8, job: &RegionJob, stats: &mut JobStats) {
        if !self.world.is_valid(pos) {
            return;
        }
        let Some(chunk) = self.ready_chunk(pos) else {
            return;
        };
        let (x, y, z) = (pos.local_x(), pos.y(), pos.local_z());
        let stored = chunk.light(job.channel, x, y, z);
        if stored == proposed {
            return;
        }
        if job.initial {
            let block = self.properties.light_properties(chunk.block(x, y, z));
            if self.emissiveness(pos, job.channel, block) >= stored {
                return;
            }
        }

        self.queue
            .enqueue(RegionJob::new(BlockBox::single(pos), job.channel, false));
        stats.spawned += 1;
    }
}

/// Whether `pos` sits on or past the region's upper face along `dir`'s axis.
fn on_far_edge(pos: BlockPos, dir: Direction, region: &BlockBox) -> bool {
    match dir {
        Direction::East => pos.x() >= region.max.x(),
        Direction::Up => pos.y() >= region.max.y(),
        Direction::South => pos.z() >= region.max.z(),
        Direction::West | Direction::Down | Direction::North => false,
    }
}
