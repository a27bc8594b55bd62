//! Board factories: the seed board of a fresh run and spawned enemies.

use rand::Rng;

use delooped_core::components::{Enemy, Loop};
use delooped_core::constants::*;
use delooped_core::enums::{GameMode, ResourceId};
use delooped_core::types::{EnemyId, LoopPos, ResourceMap};

use crate::run_state::Loops;

fn energy_loot(amount: f64) -> ResourceMap {
    let mut loot = ResourceMap::new();
    loot.insert(ResourceId::Energy, amount);
    loot
}

/// One loop at the origin holding a single, almost motionless weak enemy.
pub fn seed_board(next_enemy_id: &mut u64) -> Loops {
    let id = EnemyId(*next_enemy_id);
    *next_enemy_id += 1;
    let seed = Enemy::new(
        id,
        0.0,
        f64::EPSILON,
        SEED_ENEMY_HEALTH,
        energy_loot(SEED_ENEMY_ENERGY),
    );
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![seed],
        },
    );
    loops
}

/// Number of enemies in the wave for `cycle`, with the fractional part
/// rounded up with matching probability.
pub fn wave_size<R: Rng>(rng: &mut R, cycle: u32, mode: GameMode) -> u32 {
    let c = (cycle as f64).powf(mode.enemy_exponent());
    let base = 1.0 + 0.1 * c + 0.01 * c * c;
    let extra = if rng.gen::<f64>() < base.fract() { 1 } else { 0 };
    base.floor() as u32 + extra
}

/// Roll a fresh enemy for `cycle`. The position on its loop is rolled too.
pub fn roll_enemy<R: Rng>(
    rng: &mut R,
    id: EnemyId,
    cycle: u32,
    mode: GameMode,
    loot_energy: f64,
) -> Enemy {
    let exponent = mode.enemy_exponent();
    let spread = rng.gen_range(1.0 - ENEMY_HEALTH_SPREAD..1.0 + ENEMY_HEALTH_SPREAD);
    let health = ENEMY_BASE_HEALTH * ENEMY_HEALTH_GROWTH.powf((cycle as f64).powf(exponent)) * spread;
    let angle = rng.gen::<f64>();
    let magnitude = rng.gen_range(ENEMY_MIN_SPEED..ENEMY_MAX_SPEED)
        + ENEMY_SPEED_PER_CYCLE * cycle as f64 * exponent;
    let speed = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
    Enemy::new(id, angle, speed, health, energy_loot(loot_energy))
}
