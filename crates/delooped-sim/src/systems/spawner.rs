//! Wave spawning: drops the wave for the current cycle onto random loops.

use rand::Rng;

use delooped_core::constants::ENEMY_BASE_ENERGY;
use delooped_core::enums::RunUpgrade;
use delooped_core::events::SimEvent;
use delooped_core::types::{EnemyId, LoopPos};

use crate::run_state::RunState;
use crate::setup;

/// Spawn the wave for `run.cycle`. Returns the number of enemies spawned.
pub fn spawn_wave<R: Rng>(run: &mut RunState, rng: &mut R, events: &mut Vec<SimEvent>) -> u32 {
    let count = setup::wave_size(rng, run.cycle, run.mode);
    let positions: Vec<LoopPos> = run.loops.keys().copied().collect();
    if positions.is_empty() {
        return 0;
    }
    let loot = ENEMY_BASE_ENERGY + run.run_upgrade_level(RunUpgrade::EnemyEnergy) as f64;

    for _ in 0..count {
        let id = EnemyId(run.next_enemy_id);
        run.next_enemy_id += 1;
        let enemy = setup::roll_enemy(rng, id, run.cycle, run.mode, loot);
        let pos = positions[rng.gen_range(0..positions.len())];
        if let Some(lp) = run.loops.get_mut(&pos) {
            lp.enemies.push(enemy);
        }
    }

    events.push(SimEvent::WaveSpawned {
        cycle: run.cycle,
        count,
    });
    count
}
