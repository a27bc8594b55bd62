//! Snapshot system: builds a complete `RunSnapshot` from the run state.
//!
//! This system is read-only. It never modifies the run.

use delooped_buildings::behavior;
use delooped_core::components::{Building, Enemy, Loop};
use delooped_core::events::SimEvent;
use delooped_core::state::*;
use delooped_core::types::{LoopPos, SimTime};

use crate::connections::Connections;
use crate::run_state::RunState;
use crate::systems::economy;

/// Build a complete RunSnapshot from the current run state.
pub fn build_snapshot(
    run: &RunState,
    time: &SimTime,
    connections: &Connections,
    events: Vec<SimEvent>,
) -> RunSnapshot {
    RunSnapshot {
        time: *time,
        game_state: run.game_state,
        mode: run.mode,
        cycle: run.cycle,
        cycle_progress: run.cycle_progress,
        health: run.health,
        stress: run.stress,
        game_speed: run.game_speed,
        paused: run.paused,
        lifetime: run.lifetime,
        resources: run.ledger.amounts().clone(),
        resource_totals: run.ledger.totals().clone(),
        sell_cooldown: run.sell_cooldown,
        selected_building: run.selected_building,
        selected_loop: run.selected_loop,
        building_costs: run
            .loadout()
            .iter()
            .map(|&kind| (kind, economy::next_price(run, kind)))
            .collect(),
        loops: run
            .loops
            .iter()
            .map(|(&pos, lp)| build_loop(pos, lp))
            .collect(),
        connections: connections.views(),
        events,
    }
}

fn build_loop(pos: LoopPos, lp: &Loop) -> LoopView {
    LoopView {
        pos,
        building: lp.building.as_ref().map(build_building),
        enemies: lp.enemies.iter().map(build_enemy).collect(),
    }
}

fn build_building(building: &Building) -> BuildingView {
    BuildingView {
        kind: building.kind,
        upgrades: building.upgrades.clone(),
        progress: behavior::progress(building).map(|p| p.clamp(0.0, 1.0)),
        sell_value: building.sell_value.clone(),
    }
}

fn build_enemy(enemy: &Enemy) -> EnemyView {
    EnemyView {
        id: enemy.id,
        angle: enemy.angle,
        speed: enemy.speed,
        health: enemy.health,
        max_health: enemy.max_health,
        effects: enemy.effects.keys().copied().collect(),
    }
}
