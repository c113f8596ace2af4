//! Block light property table keyed by block identity.

use rustc_hash::FxHashMap;
use steel_utils::BlockStateId;

use crate::config::BlockLightEntry;
use crate::world::{BlockLightProperties, LightProperties};

/// Lookup table from block identity to light properties.
///
/// Metadata is ignored: every state of a block shares its properties.
/// Unknown blocks resolve to the table's fallback, which is fully opaque
/// unless changed. Air (id 0) is registered as transparent by default.
#[derive(Debug, Clone)]
pub struct LightPropertyTable {
    entries: FxHashMap<u16, LightProperties>,
    fallback: LightProperties,
}

impl LightPropertyTable {
    /// Creates a table that only knows about air.
    #[must_use]
    pub fn new() -> Self {
        let mut entries = FxHashMap::default();
        entries.insert(BlockStateId::AIR.block_id(), LightProperties::TRANSPARENT);
        Self {
            entries,
            fallback: LightProperties::OPAQUE,
        }
    }

    /// Builds a table from configured entries.
    #[must_use]
    pub fn from_entries(entries: &[BlockLightEntry]) -> Self {
        entries.iter().fold(Self::new(), |table, entry| {
            table.with(entry.id, LightProperties::new(entry.opacity, entry.luminance))
        })
    }

    /// Registers the properties of a block identity.
    #[must_use]
    pub fn with(mut self, block_id: u16, properties: LightProperties) -> Self {
        self.insert(block_id, properties);
        self
    }

    /// Sets the properties used for unregistered blocks.
    #[must_use]
    pub fn with_fallback(mut self, properties: LightProperties) -> Self {
        self.fallback = properties;
        self
    }

    /// Registers or replaces the properties of a block identity.
    pub fn insert(&mut self, block_id: u16, properties: LightProperties) {
        self.entries.insert(block_id, properties);
    }

    /// Number of registered block identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no block identity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LightPropertyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockLightProperties for LightPropertyTable {
    #[inline]
    fn light_properties(&self, block: BlockStateId) -> LightProperties {
        self.entries
            .get(&block.block_id())
            .copied()
            .unwrap_or(self.fallback)
    }
}
