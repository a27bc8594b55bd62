//! Run lifecycle: start and end of runs, cycle progression, stress and
//! health, stuck detection and the special triggers.

use rand::Rng;

use delooped_buildings::get_def;
use delooped_core::commands::RunSetup;
use delooped_core::constants::*;
use delooped_core::enums::*;
use delooped_core::events::{RunStats, SimEvent};
use delooped_core::ledger::ResourceLedger;

use crate::connections::Connections;
use crate::grid;
use crate::run_state::{Loops, RunState};
use crate::setup;
use crate::systems::{combat, economy, spawner};

/// Reset `run` to the opening board of a fresh run.
pub fn start_run(
    run: &mut RunState,
    setup: RunSetup,
    connections: &mut Connections,
    events: &mut Vec<SimEvent>,
) {
    let mode = setup.mode;
    let mut ledger = ResourceLedger::new();
    ledger.set(ResourceId::Energy, setup.starting_energy);

    let mut next_enemy_id = 0;
    let loops = setup::seed_board(&mut next_enemy_id);

    *run = RunState {
        game_state: GameState::Started,
        mode,
        health: mode.starting_health(),
        game_speed: 1.0,
        ledger,
        loops,
        setup: Some(setup),
        next_enemy_id,
        ..RunState::default()
    };
    connections.clear();

    log::info!(
        "run started: {mode:?}, {} energy",
        run.ledger.amount(ResourceId::Energy)
    );
    events.push(SimEvent::RunStarted { mode });
}

/// Final score of the run.
pub fn xp_worth(run: &RunState) -> f64 {
    let bonus = run.setup.as_ref().map(|s| s.xp_bonus_pct).unwrap_or(0.0);
    let diversity: f64 = 1.0
        + run
            .ledger
            .totals()
            .values()
            .map(|&total| (total.max(0.0) + 1.0).log10())
            .sum::<f64>();
    (run.cycle as f64).sqrt()
        * (run.lifetime / 60.0).sqrt()
        * (1.0 + bonus / 100.0)
        * diversity
        * run.mode.reward_multiplier()
}

/// Stop the run and report its final stats.
pub fn end_run(run: &mut RunState, reason: EndReason, events: &mut Vec<SimEvent>) {
    if !run.is_running() {
        return;
    }
    run.game_state = GameState::Stopped;
    run.stuck_timer = None;
    run.selected_building = None;
    run.selected_loop = None;

    let stats = RunStats {
        mode: run.mode,
        cycle: run.cycle,
        lifetime: run.lifetime,
        resource_totals: run.ledger.totals().clone(),
        reason,
        xp_worth: xp_worth(run),
    };
    log::info!(
        "run ended ({reason:?}) at cycle {} after {:.1}s, worth {:.2} xp",
        stats.cycle,
        stats.lifetime,
        stats.xp_worth
    );
    events.push(SimEvent::RunEnded { stats });
}

/// Raise a special trigger once per run.
pub fn trigger_special(run: &mut RunState, objective: SpecialObjective, events: &mut Vec<SimEvent>) {
    if run.triggered.contains(&objective) {
        return;
    }
    run.triggered.push(objective);
    log::info!("special triggered: {objective:?}");
    events.push(SimEvent::SpecialTriggered { objective });
}

/// Advance to the next cycle: spawn its wave and, on every other cycle,
/// grow the grid.
pub fn advance_cycle<R: Rng>(
    run: &mut RunState,
    rng: &mut R,
    forced: bool,
    events: &mut Vec<SimEvent>,
) {
    run.cycle += 1;
    log::info!("cycle {} reached", run.cycle);
    events.push(SimEvent::CycleAdvanced {
        cycle: run.cycle,
        forced,
    });
    spawner::spawn_wave(run, rng, events);
    if (run.cycle + 1) % EXPANSION_CYCLE_PERIOD == 0 {
        if let Some(pos) = grid::expand(&mut run.loops, rng) {
            events.push(SimEvent::LoopSpawned { pos });
        }
    }
}

/// Fill the cycle bar; the bar only runs once the first cycle is reached.
pub fn progress_cycle<R: Rng>(
    run: &mut RunState,
    delta: f64,
    rng: &mut R,
    events: &mut Vec<SimEvent>,
) {
    if run.cycle < 1 {
        return;
    }
    run.cycle_progress += delta / (CYCLE_BASE_SECS + (run.cycle as f64).sqrt());
    if run.cycle_progress >= 1.0 {
        run.cycle_progress -= 1.0;
        advance_cycle(run, rng, false, events);
    }
}

/// Skip straight to the next cycle when the board is empty.
pub fn force_cycle_if_empty<R: Rng>(run: &mut RunState, rng: &mut R, events: &mut Vec<SimEvent>) {
    if run.enemy_count() == 0 {
        run.cycle_progress = 0.0;
        advance_cycle(run, rng, true, events);
    }
}

/// Divisor applied to stress by the in-run tolerance research.
pub fn stress_divisor(tolerance_level: u32) -> f64 {
    1.0 + tolerance_level as f64 / 100.0
}

/// Total enemy lifetime relative to what the board tolerates.
pub fn compute_stress(loops: &Loops, tolerance_level: u32) -> f64 {
    if loops.is_empty() {
        return 0.0;
    }
    let total: f64 = loops
        .values()
        .flat_map(|lp| lp.enemies.iter())
        .map(|e| e.lifetime)
        .sum();
    total / (loops.len() as f64 * STRESS_PER_LOOP * stress_divisor(tolerance_level))
}

/// Recompute stress and drain health when it runs over.
pub fn apply_stress(run: &mut RunState, delta: f64, events: &mut Vec<SimEvent>) {
    run.stress = compute_stress(
        &run.loops,
        run.run_upgrade_level(RunUpgrade::StressTolerance),
    );
    if run.stress > STRESS_DRAIN_THRESHOLD {
        run.health -= 2f64.powf(run.stress) * delta;
    }
    if run.stress >= STRESS_ANXIETY_LEVEL {
        trigger_special(run, SpecialObjective::Anxiety, events);
    }
}

/// No damager on the board, and none in the loadout that can be afforded.
pub fn is_stuck(run: &RunState) -> bool {
    if combat::board_has_damager(&run.loops) {
        return false;
    }
    !run
        .loadout()
        .iter()
        .any(|&kind| get_def(kind).is_damager() && economy::can_afford_building(run, kind))
}

/// Track the stuck grace window. Returns `true` when the run was ended.
///
/// `real_delta` is unscaled: the grace window is wall time.
pub fn check_stuck(
    run: &mut RunState,
    real_delta: f64,
    grace_secs: f64,
    events: &mut Vec<SimEvent>,
) -> bool {
    if !is_stuck(run) {
        if run.stuck_timer.take().is_some() {
            log::debug!("board is no longer stuck");
        }
        return false;
    }
    match run.stuck_timer {
        None => {
            log::debug!("board is stuck, ending in {grace_secs}s");
            run.stuck_timer = Some(grace_secs);
            events.push(SimEvent::StuckDetected);
            trigger_special(run, SpecialObjective::Stucked, events);
            false
        }
        Some(remaining) => {
            let remaining = remaining - real_delta;
            if remaining <= 0.0 {
                end_run(run, EndReason::Stuck, events);
                true
            } else {
                run.stuck_timer = Some(remaining);
                false
            }
        }
    }
}

pub fn check_wysi(run: &mut RunState, events: &mut Vec<SimEvent>) {
    if run.ledger.amount(ResourceId::Energy).floor() == WYSI_ENERGY {
        trigger_special(run, SpecialObjective::Wysi, events);
    }
}
