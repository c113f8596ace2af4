//! Incremental voxel lighting for chunked worlds.
//!
//! Two channels are tracked per block: sky light, which is full at and above
//! each column's sun height, and block light emitted by luminous blocks.
//! Changes are relit by draining a queue of region jobs through
//! [`LightEngine::try_step`].

pub mod config;
pub mod light_engine;
pub mod light_storage;
pub mod memory_world;
pub mod properties;
pub mod world;

pub use config::{BlockLightEntry, ConfigError, LightConfig};
pub use light_engine::{JobStats, LightEngine};
pub use memory_world::{MemoryChunk, MemoryWorld};
pub use properties::LightPropertyTable;
pub use world::{
    BlockLightProperties, LightChannel, LightChunk, LightProperties, LightWorld, MAX_LIGHT,
    WorldListener,
};
