//! Building callbacks: per-tick updates, enter/exit hooks and the influence
//! vectors handed to them.

use std::collections::BTreeMap;

use rand::Rng;

use delooped_buildings::behavior;
use delooped_buildings::{BuildingContext, Influence};
use delooped_core::components::Building;
use delooped_core::enums::{BuildingKind, Direction};
use delooped_core::events::SimEvent;
use delooped_core::types::LoopPos;

use crate::connections::Connections;
use crate::run_state::{Loops, RunState};
use crate::systems::economy;
use crate::systems::movement::PendingMove;

/// Product of the influences projected onto `pos` by its neighbours.
pub fn influence_at(loops: &Loops, pos: LoopPos) -> Influence {
    let mut flu = Influence::new();
    for side in Direction::ALL {
        let neighbour = loops
            .get(&pos.neighbor(side))
            .and_then(|lp| lp.building.as_ref())
            .and_then(behavior::influences);
        if let Some(f) = neighbour {
            flu.absorb(&f);
        }
    }
    flu
}

/// Influence for every loop, computed once per pass.
pub fn influence_map(loops: &Loops) -> BTreeMap<LoopPos, Influence> {
    loops
        .keys()
        .map(|&pos| (pos, influence_at(loops, pos)))
        .collect()
}

/// Drop a building that asked to be removed. No refund is paid.
fn remove_spent(run: &mut RunState, pos: LoopPos, kind: BuildingKind, events: &mut Vec<SimEvent>) {
    economy::release_cost_factor(run, kind);
    log::debug!("{kind:?} on {pos} removed itself");
    events.push(SimEvent::BuildingRemoved { pos, kind });
}

/// Run `on_update` for every building on the board.
pub fn update_buildings<R: Rng>(
    run: &mut RunState,
    delta: f64,
    rng: &mut R,
    connections: &mut Connections,
    events: &mut Vec<SimEvent>,
) {
    let influences = influence_map(&run.loops);
    let mut spent = Vec::new();

    for (&pos, lp) in run.loops.iter_mut() {
        let Some(mut building) = lp.building.take() else {
            continue;
        };
        let flu = influences.get(&pos).cloned().unwrap_or_default();
        let mut ctx = BuildingContext::new(&mut *rng, &flu, &mut run.next_enemy_id);
        behavior::on_update(&mut building, &mut lp.enemies, delta, &mut ctx);
        for &id in ctx.touched() {
            connections.record(pos, id);
        }
        if ctx.remove_self() {
            spent.push((pos, building.kind));
        } else {
            lp.building = Some(building);
        }
    }

    for (pos, kind) in spent {
        remove_spent(run, pos, kind, events);
    }
}

/// Fire `on_enemy_enter` on `pos` for the enemy at `index`.
///
/// Returns `false` when the building removed itself.
fn enter<R: Rng>(
    run: &mut RunState,
    pos: LoopPos,
    index: usize,
    flu: &Influence,
    rng: &mut R,
    connections: &mut Connections,
    events: &mut Vec<SimEvent>,
) -> bool {
    let Some(lp) = run.loops.get_mut(&pos) else {
        return false;
    };
    let Some(mut building) = lp.building.take() else {
        return false;
    };
    let mut ctx = BuildingContext::new(&mut *rng, flu, &mut run.next_enemy_id);
    behavior::on_enemy_enter(&mut building, &mut lp.enemies, index, &mut ctx);
    for &id in ctx.touched() {
        connections.record(pos, id);
    }
    if ctx.remove_self() {
        let kind = building.kind;
        remove_spent(run, pos, kind, events);
        false
    } else {
        lp.building = Some(building);
        true
    }
}

/// Synthetic `on_enemy_enter` for every enemy already on `pos`, used when a
/// building is placed. Clones created during the sweep are not re-entered.
pub fn enter_occupants<R: Rng>(
    run: &mut RunState,
    pos: LoopPos,
    rng: &mut R,
    connections: &mut Connections,
    events: &mut Vec<SimEvent>,
) {
    let flu = influence_at(&run.loops, pos);
    let occupants = run.loops.get(&pos).map(|lp| lp.enemies.len()).unwrap_or(0);
    for index in 0..occupants {
        if !enter(run, pos, index, &flu, rng, connections, events) {
            break;
        }
    }
}

/// Hand every pending mover over to its new loop, firing the exit hook of
/// the old loop and the enter hook of the new one.
///
/// Movers that vanished since the roll (killed, or a loop that went away)
/// are skipped.
pub fn apply_moves<R: Rng>(
    run: &mut RunState,
    moves: Vec<PendingMove>,
    rng: &mut R,
    connections: &mut Connections,
    events: &mut Vec<SimEvent>,
) {
    for mv in moves {
        if !run.loops.contains_key(&mv.to) {
            continue;
        }
        let from_flu = influence_at(&run.loops, mv.from);
        let to_flu = influence_at(&run.loops, mv.to);

        let Some(from) = run.loops.get_mut(&mv.from) else {
            continue;
        };
        let Some(index) = from.position_of(mv.id) else {
            continue;
        };
        let mut enemy = from.enemies.remove(index);

        if let Some(building) = from.building.as_mut() {
            let mut ctx = BuildingContext::new(&mut *rng, &from_flu, &mut run.next_enemy_id);
            behavior::on_enemy_exit(building, &mut enemy, &mut ctx);
            for &id in ctx.touched() {
                connections.record(mv.from, id);
            }
        }

        let Some(to) = run.loops.get_mut(&mv.to) else {
            continue;
        };
        to.enemies.push(enemy);
        let index = to.enemies.len() - 1;
        log::trace!("enemy {:?} moved {} -> {}", mv.id, mv.from, mv.to);
        events.push(SimEvent::EnemyTransferred {
            id: mv.id,
            from: mv.from,
            to: mv.to,
        });
        enter(run, mv.to, index, &to_flu, rng, connections, events);
    }
}

/// Whether any loop carries a building of the damager class.
pub fn board_has_damager(loops: &Loops) -> bool {
    loops
        .values()
        .filter_map(|lp| lp.building.as_ref())
        .any(|b: &Building| delooped_buildings::get_def(b.kind).is_damager())
}
