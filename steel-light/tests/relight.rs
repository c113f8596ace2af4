use std::sync::Arc;

use steel_light::{
    LightChannel, LightConfig, LightEngine, LightProperties, LightPropertyTable, LightWorld,
    MemoryWorld,
};
use steel_utils::{BlockBox, BlockPos, BlockStateId, ChunkPos};

const STONE: BlockStateId = BlockStateId::new(1, 0);
const TORCH: BlockStateId = BlockStateId::new(50, 0);
const MAX_STEPS: usize = 5_000_000;

fn table() -> LightPropertyTable {
    LightPropertyTable::new()
        .with(1, LightProperties::OPAQUE)
        .with(50, LightProperties::new(0, 14))
}

/// A 3x3 chunk world, 32 blocks high, with a stone floor at y = 0.
fn floored_world() -> (MemoryWorld, Arc<LightEngine>) {
    let mut world = MemoryWorld::new(0, 32);
    let engine = LightEngine::new(LightConfig::default(), Arc::new(table()));
    engine.attach(&mut world);
    for x in -1..=1 {
        for z in -1..=1 {
            world.generate_chunk(ChunkPos::new(x, z), |chunk| chunk.fill_layers(0, 1, STONE));
        }
    }
    drain(&engine, &mut world);
    (world, engine)
}

fn drain(engine: &LightEngine, world: &mut MemoryWorld) -> usize {
    let steps = engine.run_steps(world, MAX_STEPS);
    assert!(engine.is_idle(), "queue did not drain within {MAX_STEPS} steps");
    steps
}

fn sky(world: &MemoryWorld, x: i32, y: i32, z: i32) -> u8 {
    world
        .light(LightChannel::Sky, BlockPos::new(x, y, z))
        .expect("position is loaded")
}

fn block(world: &MemoryWorld, x: i32, y: i32, z: i32) -> u8 {
    world
        .light(LightChannel::Block, BlockPos::new(x, y, z))
        .expect("position is loaded")
}

fn manhattan(a: BlockPos, b: BlockPos) -> i32 {
    (a.x() - b.x()).abs() + (a.y() - b.y()).abs() + (a.z() - b.z()).abs()
}

fn each_block(mut f: impl FnMut(BlockPos)) {
    for y in 0..32 {
        for x in -16..32 {
            for z in -16..32 {
                f(BlockPos::new(x, y, z));
            }
        }
    }
}

#[test]
fn test_open_columns_are_fully_sunlit() {
    let (world, engine) = floored_world();

    each_block(|pos| {
        let height = engine.height(pos).expect("chunk is tracked");
        assert_eq!(height, 1);
        let expected = if pos.y() >= height { 15 } else { 0 };
        assert_eq!(sky(&world, pos.x(), pos.y(), pos.z()), expected, "sky light at {pos}");
    });
}

#[test]
fn test_roof_shades_column_and_removal_restores_sun() {
    let (mut world, engine) = floored_world();

    world.set_block(BlockPos::new(8, 20, 8), STONE);
    assert_eq!(engine.height(BlockPos::new(8, 0, 8)), Some(21));
    drain(&engine, &mut world);

    assert_eq!(sky(&world, 8, 21, 8), 15);
    assert_eq!(sky(&world, 8, 20, 8), 0);
    for y in 1..20 {
        // Lit sideways by the sunlit neighbor columns.
        assert_eq!(sky(&world, 8, y, 8), 14, "sky light at y = {y}");
    }
    assert_eq!(sky(&world, 9, 10, 8), 15);

    world.set_block(BlockPos::new(8, 20, 8), BlockStateId::AIR);
    assert_eq!(engine.height(BlockPos::new(8, 0, 8)), Some(1));
    drain(&engine, &mut world);
    for y in 1..32 {
        assert_eq!(sky(&world, 8, y, 8), 15, "sky light at y = {y}");
    }
}

#[test]
fn test_single_source_decays_with_distance() {
    let (mut world, engine) = floored_world();
    let source = BlockPos::new(8, 16, 8);

    world.set_block(source, TORCH);
    drain(&engine, &mut world);

    assert_eq!(block(&world, 8, 16, 8), 14);
    assert_eq!(block(&world, 9, 16, 8), 13);
    assert_eq!(block(&world, 8, 15, 8), 13);
    assert_eq!(block(&world, 8, 16, 7), 13);
    // Fourteen blocks out along each axis the light is gone.
    assert_eq!(block(&world, 21, 16, 8), 1);
    assert_eq!(block(&world, 22, 16, 8), 0);
    assert_eq!(block(&world, -6, 16, 8), 0);
    assert_eq!(block(&world, 8, 30, 8), 0);
    assert_eq!(block(&world, 8, 2, 8), 0);

    each_block(|pos| {
        let expected = if pos.y() == 0 {
            0
        } else {
            (14 - manhattan(pos, source)).max(0) as u8
        };
        assert_eq!(block(&world, pos.x(), pos.y(), pos.z()), expected, "block light at {pos}");
    });
}

#[test]
fn test_removing_source_converges_down() {
    let (mut world, engine) = floored_world();
    world.set_block(BlockPos::new(8, 16, 8), TORCH);
    drain(&engine, &mut world);
    assert_eq!(block(&world, 9, 16, 8), 13);

    world.set_block(BlockPos::new(8, 16, 8), BlockStateId::AIR);
    drain(&engine, &mut world);

    each_block(|pos| {
        assert_eq!(block(&world, pos.x(), pos.y(), pos.z()), 0, "block light at {pos}");
    });
}

#[test]
fn test_removing_one_of_two_sources() {
    let (mut world, engine) = floored_world();
    world.set_block(BlockPos::new(8, 16, 8), TORCH);
    world.set_block(BlockPos::new(12, 16, 8), TORCH);
    drain(&engine, &mut world);
    assert_eq!(block(&world, 9, 16, 8), 13);

    world.set_block(BlockPos::new(8, 16, 8), BlockStateId::AIR);
    drain(&engine, &mut world);

    // Best remaining neighbor minus one block of attenuation.
    assert_eq!(block(&world, 10, 16, 8), 12);
    assert_eq!(block(&world, 9, 16, 8), 11);
    assert_eq!(block(&world, 8, 16, 8), 10);
    assert_eq!(block(&world, 12, 16, 8), 14);
}

#[test]
fn test_relighting_converged_region_is_a_no_op() {
    let (mut world, engine) = floored_world();
    world.set_block(BlockPos::new(8, 16, 8), TORCH);
    world.set_block(BlockPos::new(3, 25, 3), STONE);
    drain(&engine, &mut world);

    for channel in LightChannel::ALL {
        for x in -1..=1 {
            for z in -1..=1 {
                engine.enqueue(BlockBox::chunk(ChunkPos::new(x, z), 0, 32), channel, false);
            }
        }
    }
    while let Some(stats) = engine.step(&mut world) {
        assert!(!stats.dropped);
        assert_eq!(stats.changed, 0);
        assert_eq!(stats.spawned, 0);
    }
}

#[test]
fn test_many_changes_terminate() {
    let (mut world, engine) = floored_world();

    // A deterministic scatter of stone and torches, relit in small budgets.
    let mut seed: u32 = 0x2545_f491;
    for _ in 0..60 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let x = (seed % 48) as i32 - 16;
        let y = ((seed >> 8) % 31) as i32 + 1;
        let z = ((seed >> 16) % 48) as i32 - 16;
        let state = match seed % 3 {
            0 => STONE,
            1 => TORCH,
            _ => BlockStateId::AIR,
        };
        world.set_block(BlockPos::new(x, y, z), state);
        engine.run_steps(&mut world, 16);
    }
    drain(&engine, &mut world);

    each_block(|pos| {
        for channel in LightChannel::ALL {
            let level = world.light(channel, pos).expect("position is loaded");
            assert!(level <= 15);
        }
    });
}

#[test]
fn test_unpopulated_chunk_is_skipped_until_reloaded() {
    let mut world = MemoryWorld::new(0, 16);
    let engine = LightEngine::new(LightConfig::default(), Arc::new(table()));
    engine.attach(&mut world);

    let pos = ChunkPos::new(0, 0);
    world.generate_chunk(pos, |_| {});
    world.set_populated(pos, false);
    assert_eq!(engine.pending_jobs(), 2);

    let stats = engine.step(&mut world).expect("a job was queued");
    assert!(stats.dropped);
    assert!(engine.try_step(&mut world));
    assert!(engine.is_idle());
    assert_eq!(sky(&world, 0, 15, 0), 0);

    // Nothing retries on its own; reloading the populated chunk does.
    let mut chunk = world.unload_chunk(pos).expect("chunk is loaded");
    engine.forget_chunk(pos);
    chunk.set_populated(true);
    world.load_chunk(chunk);
    drain(&engine, &mut world);

    assert!(world.chunk(pos).is_some());
    for y in 0..16 {
        assert_eq!(sky(&world, 4, y, 4), 15);
    }
}
