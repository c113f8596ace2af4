//! Pending relight jobs with bounded merging.
//!
//! The queue is FIFO except that a new job is folded into one of the newest
//! few entries when their regions overlap. Only that small window is
//! scanned, so overlapping work further back is not merged and the total
//! queued volume can exceed the minimal region needing a relight.

use std::collections::VecDeque;

use parking_lot::Mutex;
use steel_utils::BlockBox;

use crate::world::LightChannel;

/// Default number of newest entries scanned for a merge candidate.
pub const DEFAULT_MERGE_LOOKBACK: usize = 4;

/// A pending relight of one channel over a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionJob {
    /// The blocks to recompute.
    pub region: BlockBox,
    /// The channel to recompute.
    pub channel: LightChannel,
    /// Whether this job seeds freshly available terrain.
    pub initial: bool,
}

impl RegionJob {
    /// Creates a job.
    #[must_use]
    pub const fn new(region: BlockBox, channel: LightChannel, initial: bool) -> Self {
        Self {
            region,
            channel,
            initial,
        }
    }

    /// Tries to absorb `other` into this job.
    ///
    /// Succeeds when both jobs target the same channel and their regions
    /// intersect. The merged job keeps the first-time seeding shortcut only
    /// if both jobs had it.
    fn try_merge(&mut self, other: &RegionJob) -> bool {
        if self.channel != other.channel || !self.region.intersects(&other.region) {
            return false;
        }
        self.region = self.region.union(&other.region);
        self.initial &= other.initial;
        true
    }
}

/// Thread-safe queue of [`RegionJob`]s.
///
/// Every operation takes the single internal lock for O(lookback) time at
/// most. Producers may enqueue from any thread.
#[derive(Debug)]
pub struct OperationQueue {
    jobs: Mutex<VecDeque<RegionJob>>,
    lookback: usize,
}

impl OperationQueue {
    /// Creates an empty queue scanning the newest `lookback` entries on enqueue.
    #[must_use]
    pub fn new(lookback: usize) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            lookback: lookback.max(1),
        }
    }

    /// Adds a job, merging it into a recent overlapping job when possible.
    ///
    /// Returns `true` if the job was merged instead of appended.
    pub fn enqueue(&self, job: RegionJob) -> bool {
        let mut jobs = self.jobs.lock();
        if jobs
            .iter_mut()
            .rev()
            .take(self.lookback)
            .any(|queued| queued.try_merge(&job))
        {
            return true;
        }
        jobs.push_back(job);
        false
    }

    /// Removes and returns the oldest job.
    pub fn pop(&self) -> Option<RegionJob> {
        self.jobs.lock().pop_front()
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Whether no job is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Copies the queued jobs in order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RegionJob> {
        self.jobs.lock().iter().copied().collect()
    }
}

impl Default for OperationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MERGE_LOOKBACK)
    }
}
