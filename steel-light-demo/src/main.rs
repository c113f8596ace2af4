//! Generates a small terrain in memory and lights it tick by tick.
//!
//! Usage: `steel-light-demo [config path]`. The config is created from the
//! bundled default when missing. Set `RUST_LOG=steel_light=debug` for chunk
//! level engine output or `trace` for every executed job.

use std::{env, path::PathBuf, time::Instant};

use anyhow::{Context, anyhow};
use steel_light::{LightChannel, LightConfig, LightEngine, MemoryChunk, MemoryWorld};
use steel_utils::{BlockPos, BlockStateId, ChunkPos};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/light_config.json5";
const MIN_Y: i32 = -64;
const MAX_Y: i32 = 128;
const RADIUS: i32 = 2;
const MAX_TICKS: usize = 1_000_000;

const STONE: BlockStateId = BlockStateId::new(1, 0);
const WATER: BlockStateId = BlockStateId::new(8, 0);
const LEAVES: BlockStateId = BlockStateId::new(18, 0);
const TORCH: BlockStateId = BlockStateId::new(50, 0);
const GLOWSTONE: BlockStateId = BlockStateId::new(89, 0);

const SEA_LEVEL: i32 = 62;

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Rolling hills of stone with water in the valleys and a leaf canopy here and there.
fn shape_terrain(chunk: &mut MemoryChunk, pos: ChunkPos) {
    for z in 0..16 {
        for x in 0..16 {
            let wx = pos.min_block_x() + x as i32;
            let wz = pos.min_block_z() + z as i32;
            let surface = 58 + (wx * 3 + wz * 5).rem_euclid(11);
            chunk.fill_column(x, z, MIN_Y, surface, STONE);
            if surface < SEA_LEVEL {
                chunk.fill_column(x, z, surface, SEA_LEVEL, WATER);
            } else if (wx ^ wz).rem_euclid(7) == 0 {
                chunk.fill_column(x, z, surface + 3, surface + 5, LEAVES);
            }
        }
    }
    chunk.set_block(8, 20, 8, GLOWSTONE);
}

/// Runs ticks of `steps_per_tick` steps until the queue drains.
fn drain(engine: &LightEngine, world: &mut MemoryWorld, label: &str) -> anyhow::Result<()> {
    let start = Instant::now();
    let budget = engine.config().steps_per_tick;
    let mut ticks = 0;
    let mut jobs = 0;
    while !engine.is_idle() {
        if ticks == MAX_TICKS {
            return Err(anyhow!(
                "{label}: queue still holds {} jobs after {MAX_TICKS} ticks",
                engine.pending_jobs()
            ));
        }
        jobs += engine.run_steps(world, budget);
        ticks += 1;
        if ticks % 1000 == 0 {
            info!("{label}: tick {ticks}, {} jobs pending", engine.pending_jobs());
        }
    }
    info!("{label}: {jobs} jobs over {ticks} ticks in {:?}", start.elapsed());
    Ok(())
}

fn report(world: &MemoryWorld, pos: BlockPos) {
    let sky = world.light(LightChannel::Sky, pos);
    let block = world.light(LightChannel::Block, pos);
    match (sky, block) {
        (Some(sky), Some(block)) => info!("Light at {pos}: sky {sky}, block {block}"),
        _ => warn!("Light at {pos} is not loaded"),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let path = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = LightConfig::load_or_create(&path)
        .with_context(|| format!("failed to load light config from {}", path.display()))?;
    info!(
        "Loaded light config: lookback {}, {} steps per tick, {} block entries",
        config.merge_lookback,
        config.steps_per_tick,
        config.blocks.len()
    );

    let engine = LightEngine::from_config(config);
    let mut world = MemoryWorld::new(MIN_Y, MAX_Y);
    engine.attach(&mut world);

    for x in -RADIUS..=RADIUS {
        for z in -RADIUS..=RADIUS {
            let pos = ChunkPos::new(x, z);
            world.generate_chunk(pos, |chunk| shape_terrain(chunk, pos));
        }
    }
    drain(&engine, &mut world, "Initial lighting")?;
    report(&world, BlockPos::new(0, 100, 0));

    // Dig a shaft down to the glowstone and light it with torches.
    let surface = engine.height(BlockPos::new(8, 0, 8)).unwrap_or(MIN_Y);
    for y in (21..surface).rev() {
        world.set_block(BlockPos::new(8, y, 8), BlockStateId::AIR);
    }
    for y in (24..surface).step_by(6) {
        world.set_block(BlockPos::new(9, y, 8), TORCH);
    }
    drain(&engine, &mut world, "Shaft")?;
    report(&world, BlockPos::new(8, 21, 8));
    report(&world, BlockPos::new(8, 40, 8));

    // Cover the shaft again.
    world.set_block(BlockPos::new(8, surface - 1, 8), STONE);
    drain(&engine, &mut world, "Covered shaft")?;
    report(&world, BlockPos::new(8, 40, 8));

    let edge = ChunkPos::new(RADIUS, RADIUS);
    if world.unload_chunk(edge).is_some() {
        engine.forget_chunk(edge);
        info!("Unloaded chunk {edge}");
    }
    Ok(())
}
