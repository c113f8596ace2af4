//! Shared value types for the Steel lighting workspace.

pub mod block_box;
pub mod math;
pub mod types;

pub use block_box::BlockBox;
pub use types::{BlockPos, BlockStateId, ChunkPos, CHUNK_WIDTH};
