//! Light engine configuration, stored as JSON5.

use serde::Deserialize;
use std::{fs, io, path::Path};
use thiserror::Error;

use crate::light_engine::DEFAULT_MERGE_LOOKBACK;
use crate::world::MAX_LIGHT;

const DEFAULT_CONFIG: &str = include_str!("../package-content/light_config.json5");

/// Errors raised while loading a [`LightConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("failed to access light config: {0}")]
    Io(#[from] io::Error),
    /// The config file is not valid JSON5 or has the wrong shape.
    #[error("failed to parse light config: {0}")]
    Parse(#[from] serde_json5::Error),
    /// The config parsed but holds out of range values.
    #[error("invalid light config: {0}")]
    Invalid(&'static str),
}

/// Light properties of one block identity as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BlockLightEntry {
    /// Block identity (without metadata).
    pub id: u16,
    /// Attenuation (0-15).
    #[serde(default)]
    pub opacity: u8,
    /// Emitted light (0-15).
    #[serde(default)]
    pub luminance: u8,
}

/// Tunables of the light engine and its driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Number of newest queue entries scanned for a merge candidate.
    pub merge_lookback: usize,
    /// Whether world notifications also enqueue relight jobs.
    pub schedule_on_notify: bool,
    /// Maximum `try_step` calls a driver performs per tick.
    pub steps_per_tick: usize,
    /// Block light properties seeded into the property table.
    pub blocks: Vec<BlockLightEntry>,
}

impl LightConfig {
    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(path)?;
        Self::parse(&config_str)
    }

    /// Reads the config at `path`, writing the bundled default there first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG)?;
        }
        Self::load(path)
    }

    /// Parses and validates a config from JSON5 text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: LightConfig = serde_json5::from_str(text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Checks that all values are in range.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=64).contains(&self.merge_lookback) {
            return Err("Merge lookback must be in range 1..=64");
        }
        if self.steps_per_tick == 0 {
            return Err("Steps per tick must be at least 1");
        }
        for entry in &self.blocks {
            if entry.opacity > MAX_LIGHT {
                return Err("Block opacity must be in range 0..=15");
            }
            if entry.luminance > MAX_LIGHT {
                return Err("Block luminance must be in range 0..=15");
            }
        }
        Ok(())
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            merge_lookback: DEFAULT_MERGE_LOOKBACK,
            schedule_on_notify: true,
            steps_per_tick: 64,
            blocks: Vec::new(),
        }
    }
}
