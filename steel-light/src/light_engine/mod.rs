//! Incremental sky and block light propagation.

pub mod direction;
mod engine;
pub mod height_cache;
pub mod operation_queue;
pub mod solver;

// Re-export main types for convenience
pub use direction::Direction;
pub use engine::LightEngine;
pub use height_cache::HeightCache;
pub use operation_queue::{DEFAULT_MERGE_LOOKBACK, OperationQueue, RegionJob};
pub use solver::{JobStats, LightSolver};
