use std::sync::Arc;

use proptest::prelude::*;
use steel_light::{
    LightChannel, LightConfig, LightEngine, LightProperties, LightPropertyTable, MAX_LIGHT,
    MemoryWorld,
};
use steel_utils::{BlockPos, BlockStateId, ChunkPos};

const STEP_LIMIT: usize = 1_000_000;

fn table() -> LightPropertyTable {
    LightPropertyTable::new()
        .with(1, LightProperties::OPAQUE)
        .with(8, LightProperties::new(2, 0))
        .with(50, LightProperties::new(0, 14))
        .with(89, LightProperties::new(15, 15))
}

fn block_state() -> impl Strategy<Value = BlockStateId> {
    prop_oneof![
        Just(BlockStateId::AIR),
        Just(BlockStateId::new(1, 0)),
        Just(BlockStateId::new(8, 0)),
        Just(BlockStateId::new(50, 0)),
        Just(BlockStateId::new(89, 0)),
    ]
}

/// A block placement followed by a step budget.
fn edit() -> impl Strategy<Value = (BlockPos, BlockStateId, usize)> {
    ((0i32..32, 0i32..16, 0i32..16), block_state(), 0usize..32)
        .prop_map(|((x, y, z), state, budget)| (BlockPos::new(x, y, z), state, budget))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // Levels stay in range and the queue always drains, whatever the edits.
    #[test]
    fn light_is_bounded_and_queue_drains(edits in prop::collection::vec(edit(), 1..24)) {
        let mut world = MemoryWorld::new(0, 16);
        let engine = LightEngine::new(LightConfig::default(), Arc::new(table()));
        engine.attach(&mut world);
        world.generate_chunk(ChunkPos::new(0, 0), |_| {});
        world.generate_chunk(ChunkPos::new(1, 0), |_| {});

        for (pos, state, budget) in edits {
            world.set_block(pos, state);
            engine.run_steps(&mut world, budget);
        }
        engine.run_steps(&mut world, STEP_LIMIT);
        prop_assert!(engine.is_idle());

        for x in 0..32 {
            for y in 0..16 {
                for z in 0..16 {
                    for channel in LightChannel::ALL {
                        let level = world.light(channel, BlockPos::new(x, y, z));
                        prop_assert!(level.is_some_and(|level| level <= MAX_LIGHT));
                    }
                }
            }
        }
    }

    // A lone emitter always holds its own luminance once the queue drains.
    #[test]
    fn emitter_keeps_its_luminance((x, y, z) in (0i32..16, 0i32..16, 0i32..16)) {
        let mut world = MemoryWorld::new(0, 16);
        let engine = LightEngine::new(LightConfig::default(), Arc::new(table()));
        engine.attach(&mut world);
        world.generate_chunk(ChunkPos::new(0, 0), |_| {});
        engine.run_steps(&mut world, STEP_LIMIT);

        let pos = BlockPos::new(x, y, z);
        world.set_block(pos, BlockStateId::new(89, 0));
        engine.run_steps(&mut world, STEP_LIMIT);
        prop_assert!(engine.is_idle());
        prop_assert_eq!(world.light(LightChannel::Block, pos), Some(15));
    }
}
