//! Enemy movement around loops and boundary crossing detection.
//!
//! Transitions are only decided here. The actual hand-off between loops
//! happens after the building pass, in `combat::apply_moves`.

use std::collections::BTreeSet;

use rand::Rng;

use delooped_core::components::Enemy;
use delooped_core::constants::ANGULAR_SCALE;
use delooped_core::effects;
use delooped_core::enums::Direction;
use delooped_core::events::SimEvent;
use delooped_core::types::{EnemyId, LoopPos};

use crate::connections::Connections;
use crate::run_state::RunState;

/// An enemy that won its transition roll this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingMove {
    pub id: EnemyId,
    pub from: LoopPos,
    pub to: LoopPos,
}

/// Wrap an angle into `[0, 1)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(1.0);
    // rem_euclid can round tiny negatives up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Which ring boundary lies strictly between two normalized angles.
///
/// Exactly one side is reported. The wrap point is checked first, as a
/// sweep across 0 shows up as a pair spanning both 0.25 and 0.75.
pub fn crossed_boundary(prev: f64, next: f64) -> Option<Direction> {
    let (min, max) = (prev.min(next), prev.max(next));
    if min < 0.25 && max > 0.75 {
        Some(Direction::Bottom)
    } else if min < 0.25 && max > 0.25 {
        Some(Direction::Right)
    } else if min < 0.5 && max > 0.5 {
        Some(Direction::Top)
    } else if min < 0.75 && max > 0.75 {
        Some(Direction::Left)
    } else {
        None
    }
}

/// Entry angle on the neighbouring ring after crossing `side`.
pub fn reflect(angle: f64, side: Direction) -> f64 {
    let mirrored = match side {
        Direction::Bottom | Direction::Top => 0.5 - angle,
        Direction::Right | Direction::Left => 1.0 - angle,
    };
    normalize_angle(mirrored)
}

/// Advance one enemy by `delta` seconds. Returns the previous angle and the
/// signed distance travelled.
pub fn advance(enemy: &mut Enemy, delta: f64) -> (f64, f64) {
    let prev = enemy.angle;
    let dist = enemy.speed * ANGULAR_SCALE * delta * effects::movement_multiplier(enemy);
    enemy.angle = normalize_angle(enemy.angle + dist);
    enemy.lifetime += dist.abs();
    (prev, dist)
}

/// Move every enemy, pay out the dead and roll transitions.
pub fn run<R: Rng>(
    run: &mut RunState,
    delta: f64,
    transition_chance: f64,
    rng: &mut R,
    connections: &mut Connections,
    events: &mut Vec<SimEvent>,
) -> Vec<PendingMove> {
    let occupied: BTreeSet<LoopPos> = run.loops.keys().copied().collect();
    let mut moves = Vec::new();

    for (&pos, lp) in run.loops.iter_mut() {
        let mut dead = Vec::new();
        for enemy in lp.enemies.iter_mut() {
            let (prev, dist) = advance(enemy, delta);

            if enemy.is_dead() {
                dead.push(enemy.id);
            } else if let Some(side) = crossed_boundary(prev, enemy.angle) {
                let to = pos.neighbor(side);
                if occupied.contains(&to) && rng.gen::<f64>() < transition_chance {
                    enemy.angle = reflect(enemy.angle, side);
                    enemy.speed = -enemy.speed;
                    moves.push(PendingMove {
                        id: enemy.id,
                        from: pos,
                        to,
                    });
                }
            }

            effects::decay(enemy, dist);
        }

        for id in dead {
            let Some(index) = lp.position_of(id) else {
                continue;
            };
            let enemy = lp.enemies.remove(index);
            run.ledger.earn_all(&enemy.loot);
            connections.forget(id);
            events.push(SimEvent::EnemyKilled {
                id,
                pos,
                loot: enemy.loot,
            });
        }
    }

    moves
}
