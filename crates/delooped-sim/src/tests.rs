//! Tests for the engine, movement and transitions, the run lifecycle and
//! the economy.

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rstest::rstest;

use delooped_core::commands::{PlayerCommand, RunSetup};
use delooped_core::components::{Building, Enemy, Loop};
use delooped_core::enums::*;
use delooped_core::events::SimEvent;
use delooped_core::state::RunSnapshot;
use delooped_core::types::{EnemyId, LoopPos, ResourceMap};

use crate::connections::Connections;
use crate::engine::{SimConfig, Simulation};
use crate::error::ActionError;
use crate::grid;
use crate::run_state::{Loops, RunState};
use crate::setup;
use crate::systems::movement::{self, PendingMove};
use crate::systems::{combat, economy, lifecycle};

fn started(seed: u64, setup: RunSetup) -> Simulation {
    let mut sim = Simulation::new(SimConfig {
        seed,
        ..Default::default()
    });
    sim.apply(PlayerCommand::StartRun { setup }).unwrap();
    sim
}

fn place(sim: &mut Simulation, kind: BuildingKind, pos: LoopPos) -> Result<(), ActionError> {
    sim.apply(PlayerCommand::SelectBuilding { kind: Some(kind) })?;
    sim.apply(PlayerCommand::SelectLoop { pos: Some(pos) })?;
    sim.apply(PlayerCommand::PlaceOnSelectedLoop)
}

fn enemy_at(id: u64, angle: f64, speed: f64, health: f64) -> Enemy {
    let mut loot = ResourceMap::new();
    loot.insert(ResourceId::Energy, 10.0);
    Enemy::new(EnemyId(id), angle, speed, health, loot)
}

fn running_state(loops: Loops) -> RunState {
    RunState {
        game_state: GameState::Started,
        health: 100.0,
        game_speed: 1.0,
        loops,
        setup: Some(RunSetup::default()),
        ..RunState::default()
    }
}

fn has_event(snap: &RunSnapshot, pred: impl Fn(&SimEvent) -> bool) -> bool {
    snap.events.iter().any(pred)
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut a = started(12345, RunSetup::default());
    let mut b = started(12345, RunSetup::default());
    place(&mut a, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();
    place(&mut b, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();

    for _ in 0..900 {
        let json_a = serde_json::to_string(&a.tick()).unwrap();
        let json_b = serde_json::to_string(&b.tick()).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged with the same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut a = started(111, RunSetup::default());
    let mut b = started(222, RunSetup::default());
    place(&mut a, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();
    place(&mut b, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();

    let mut diverged = false;
    for _ in 0..900 {
        let json_a = serde_json::to_string(&a.tick()).unwrap();
        let json_b = serde_json::to_string(&b.tick()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "different seeds should give different waves");
}

// ---- Run start and the opening scenario ----

#[test]
fn test_start_run_seeds_board() {
    let sim = started(1, RunSetup::default());
    let run = sim.run();
    assert_eq!(run.game_state, GameState::Started);
    assert_relative_eq!(run.health, 100.0);
    assert_relative_eq!(run.game_speed, 1.0);
    assert_relative_eq!(run.ledger.amount(ResourceId::Energy), 100.0);
    assert_eq!(run.cycle, 0);
    assert_eq!(run.loops.len(), 1);

    let origin = &run.loops[&LoopPos::ORIGIN];
    assert!(origin.building.is_none());
    assert_eq!(origin.enemies.len(), 1);
    assert_relative_eq!(origin.enemies[0].health, 20.0);
    assert_relative_eq!(origin.enemies[0].loot[&ResourceId::Energy], 100.0);
}

#[test]
fn test_start_run_mode_health() {
    let sim = started(
        1,
        RunSetup {
            mode: GameMode::Boosted,
            ..Default::default()
        },
    );
    assert_relative_eq!(sim.run().health, 50.0);
}

#[test]
fn test_start_run_rejected_while_running() {
    let mut sim = started(1, RunSetup::default());
    let err = sim
        .apply(PlayerCommand::StartRun {
            setup: RunSetup::default(),
        })
        .unwrap_err();
    assert_eq!(err, ActionError::InvalidState(GameState::Started));
}

#[test]
fn test_opening_scenario() {
    let mut sim = started(7, RunSetup::default());
    place(&mut sim, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();

    {
        let run = sim.run();
        assert_relative_eq!(run.ledger.amount(ResourceId::Energy), 0.0);
        let beamer = run.loops[&LoopPos::ORIGIN].building.as_ref().unwrap();
        assert_eq!(beamer.kind, BuildingKind::Beamer);
        assert_relative_eq!(beamer.sell_value[&ResourceId::Energy], 75.0);
        assert_eq!(run.building_factor, 1);
        assert!(run.selected_building.is_none());
    }

    // Beam until the seed enemy is reaped.
    let mut killed = false;
    for _ in 0..600 {
        let snap = sim.tick();
        if has_event(&snap, |e| matches!(e, SimEvent::EnemyKilled { .. })) {
            killed = true;
            break;
        }
        assert_eq!(snap.cycle, 0);
    }
    assert!(killed, "seed enemy should die to the beamer");
    assert_relative_eq!(sim.run().ledger.amount(ResourceId::Energy), 100.0);
    assert_relative_eq!(sim.run().ledger.total(ResourceId::Energy), 100.0);
    assert!(sim.run().loops[&LoopPos::ORIGIN].enemies.is_empty());

    // The empty board forces the first cycle on the next tick.
    let snap = sim.tick();
    assert_eq!(snap.cycle, 1);
    assert!(has_event(&snap, |e| matches!(
        e,
        SimEvent::CycleAdvanced {
            cycle: 1,
            forced: true
        }
    )));
    let spawned = snap.events.iter().find_map(|e| match e {
        SimEvent::WaveSpawned { cycle: 1, count } => Some(*count),
        _ => None,
    });
    assert!(matches!(spawned, Some(1) | Some(2)));
    assert!(has_event(&snap, |e| matches!(e, SimEvent::LoopSpawned { .. })));
    assert_eq!(snap.loops.len(), 2);
}

// ---- Movement ----

#[rstest]
#[case(-0.25, 0.75)]
#[case(1.5, 0.5)]
#[case(3.0, 0.0)]
#[case(0.3, 0.3)]
fn test_normalize_angle(#[case] input: f64, #[case] expected: f64) {
    assert_relative_eq!(movement::normalize_angle(input), expected);
}

#[test]
fn test_normalize_angle_tiny_negative() {
    let a = movement::normalize_angle(-1e-20);
    assert!((0.0..1.0).contains(&a));
}

#[rstest]
#[case(0.24, 0.26, Some(Direction::Right))]
#[case(0.26, 0.24, Some(Direction::Right))]
#[case(0.95, 0.05, Some(Direction::Bottom))]
#[case(0.49, 0.51, Some(Direction::Top))]
#[case(0.74, 0.76, Some(Direction::Left))]
#[case(0.1, 0.2, None)]
fn test_crossed_boundary(
    #[case] prev: f64,
    #[case] next: f64,
    #[case] expected: Option<Direction>,
) {
    assert_eq!(movement::crossed_boundary(prev, next), expected);
}

#[test]
fn test_transition_reflects_angle_and_speed() {
    let right = LoopPos::ORIGIN.neighbor(Direction::Right);
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![enemy_at(0, 0.24, 1.0, 50.0)],
        },
    );
    loops.insert(right, Loop::default());
    let mut run = running_state(loops);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut connections = Connections::default();
    let mut events = Vec::new();

    let moves = movement::run(&mut run, 0.2, 1.0, &mut rng, &mut connections, &mut events);
    assert_eq!(
        moves,
        vec![PendingMove {
            id: EnemyId(0),
            from: LoopPos::ORIGIN,
            to: right
        }]
    );
    let enemy = &run.loops[&LoopPos::ORIGIN].enemies[0];
    assert_relative_eq!(enemy.angle, 0.74, epsilon = 1e-9);
    assert_relative_eq!(enemy.speed, -1.0);

    combat::apply_moves(&mut run, moves, &mut rng, &mut connections, &mut events);
    assert!(run.loops[&LoopPos::ORIGIN].enemies.is_empty());
    assert_eq!(run.loops[&right].enemies.len(), 1);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::EnemyTransferred { to, .. } if *to == right)));
}

#[test]
fn test_no_transition_without_neighbour() {
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![enemy_at(0, 0.24, 1.0, 50.0)],
        },
    );
    let mut run = running_state(loops);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let moves = movement::run(
        &mut run,
        0.2,
        1.0,
        &mut rng,
        &mut Connections::default(),
        &mut Vec::new(),
    );
    assert!(moves.is_empty());
    let enemy = &run.loops[&LoopPos::ORIGIN].enemies[0];
    assert_relative_eq!(enemy.angle, 0.26, epsilon = 1e-9);
    assert_relative_eq!(enemy.speed, 1.0);
}

#[test]
fn test_dead_enemy_pays_loot_and_is_removed() {
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![enemy_at(0, 0.1, 1.0, 0.0), enemy_at(1, 0.6, 1.0, 5.0)],
        },
    );
    let mut run = running_state(loops);
    let mut events = Vec::new();
    movement::run(
        &mut run,
        0.1,
        0.5,
        &mut ChaCha8Rng::seed_from_u64(1),
        &mut Connections::default(),
        &mut events,
    );
    assert_eq!(run.loops[&LoopPos::ORIGIN].enemies.len(), 1);
    assert_relative_eq!(run.ledger.amount(ResourceId::Energy), 10.0);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SimEvent::EnemyKilled { id: EnemyId(0), .. }));
}

#[test]
fn test_vanished_mover_is_skipped() {
    let right = LoopPos::ORIGIN.neighbor(Direction::Right);
    let mut loops = Loops::new();
    loops.insert(LoopPos::ORIGIN, Loop::default());
    loops.insert(right, Loop::default());
    let mut run = running_state(loops);
    let mut events = Vec::new();
    combat::apply_moves(
        &mut run,
        vec![PendingMove {
            id: EnemyId(9),
            from: LoopPos::ORIGIN,
            to: right,
        }],
        &mut ChaCha8Rng::seed_from_u64(1),
        &mut Connections::default(),
        &mut events,
    );
    assert!(events.is_empty());
    assert_eq!(run.enemy_count(), 0);
}

// ---- Building hooks and influence ----

#[test]
fn test_neighbour_influences_multiply() {
    let right = LoopPos::ORIGIN.neighbor(Direction::Right);
    let left = LoopPos::ORIGIN.neighbor(Direction::Left);
    let top = LoopPos::ORIGIN.neighbor(Direction::Top);
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: Some(Building::new(BuildingKind::Plasma)),
            enemies: vec![enemy_at(0, 0.5, 0.0, 50.0)],
        },
    );
    for (pos, kind) in [
        (right, BuildingKind::Sharpener),
        (left, BuildingKind::Sharpener),
        (top, BuildingKind::Overclocker),
    ] {
        loops.insert(
            pos,
            Loop {
                building: Some(Building::new(kind)),
                enemies: Vec::new(),
            },
        );
    }
    let mut run = running_state(loops);

    let flu = combat::influence_at(&run.loops, LoopPos::ORIGIN);
    assert_relative_eq!(flu.factor(InfluenceAttr::Damage), 1.5625);
    assert_relative_eq!(flu.factor(InfluenceAttr::Speed), 1.2);
    assert_relative_eq!(flu.factor(InfluenceAttr::Amount), 1.0);

    // Plasma deals 3 per second before influence.
    combat::update_buildings(
        &mut run,
        1.0,
        &mut ChaCha8Rng::seed_from_u64(1),
        &mut Connections::default(),
        &mut Vec::new(),
    );
    assert_relative_eq!(
        run.loops[&LoopPos::ORIGIN].enemies[0].health,
        50.0 - 3.0 * 1.5625,
        epsilon = 1e-9
    );
}

#[test]
fn test_placement_enters_every_occupant() {
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![enemy_at(0, 0.1, 1.0, 50.0), enemy_at(1, 0.6, 1.0, 50.0)],
        },
    );
    let mut run = running_state(loops);
    run.ledger.set(ResourceId::Energy, 1_000.0);
    run.selected_building = Some(BuildingKind::Igniter);
    run.selected_loop = Some(LoopPos::ORIGIN);
    let mut connections = Connections::default();
    let mut events = Vec::new();

    economy::place_on_selected_loop(
        &mut run,
        &mut ChaCha8Rng::seed_from_u64(1),
        &mut connections,
        &mut events,
    )
    .unwrap();

    let lp = &run.loops[&LoopPos::ORIGIN];
    assert_eq!(lp.building.as_ref().map(|b| b.kind), Some(BuildingKind::Igniter));
    for enemy in &lp.enemies {
        assert_eq!(enemy.effects, BTreeMap::from([(EffectKind::Blaze, 1.0)]));
    }
    assert_eq!(connections.len(), 2);
    assert_eq!(
        events,
        vec![SimEvent::BuildingPlaced {
            pos: LoopPos::ORIGIN,
            kind: BuildingKind::Igniter
        }]
    );
}

#[test]
fn test_transition_fires_exit_then_enter() {
    let right = LoopPos::ORIGIN.neighbor(Direction::Right);
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: Some(Building::new(BuildingKind::Freezer)),
            enemies: vec![enemy_at(0, 0.74, -1.0, 50.0)],
        },
    );
    loops.insert(
        right,
        Loop {
            building: Some(Building::new(BuildingKind::Igniter)),
            enemies: Vec::new(),
        },
    );
    let mut run = running_state(loops);
    let mut connections = Connections::default();

    combat::apply_moves(
        &mut run,
        vec![PendingMove {
            id: EnemyId(0),
            from: LoopPos::ORIGIN,
            to: right,
        }],
        &mut ChaCha8Rng::seed_from_u64(1),
        &mut connections,
        &mut Vec::new(),
    );

    // Freeze from the exit is cancelled by the blaze on entry.
    let moved = &run.loops[&right].enemies[0];
    assert_eq!(moved.effects, BTreeMap::from([(EffectKind::Blaze, 1.0)]));
    assert_eq!(connections.len(), 2);
}

#[test]
fn test_spent_pins_remove_themselves() {
    let right = LoopPos::ORIGIN.neighbor(Direction::Right);
    let mut sim = started(
        1,
        RunSetup {
            loadout: vec![BuildingKind::Pins, BuildingKind::Beamer],
            ..Default::default()
        },
    );
    // The opening enemy is the first use.
    place(&mut sim, BuildingKind::Pins, LoopPos::ORIGIN).unwrap();
    assert_eq!(sim.run().building_factor, 1);

    let movers: Vec<Enemy> = (10..14).map(|id| enemy_at(id, 0.74, 1.0, 100.0)).collect();
    let moves: Vec<PendingMove> = movers
        .iter()
        .map(|e| PendingMove {
            id: e.id,
            from: right,
            to: LoopPos::ORIGIN,
        })
        .collect();
    sim.run_mut().loops.insert(
        right,
        Loop {
            building: None,
            enemies: movers,
        },
    );

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut connections = Connections::default();
    let mut events = Vec::new();
    let (first, last) = moves.split_at(3);
    combat::apply_moves(sim.run_mut(), first.to_vec(), &mut rng, &mut connections, &mut events);
    assert!(sim.run().loops[&LoopPos::ORIGIN].building.is_some());

    combat::apply_moves(sim.run_mut(), last.to_vec(), &mut rng, &mut connections, &mut events);
    let run = sim.run();
    assert!(run.loops[&LoopPos::ORIGIN].building.is_none());
    assert_eq!(run.building_factor, 0);
    assert_relative_eq!(economy::cost_factor(run, BuildingKind::Pins), 1.0);
    assert!(events.contains(&SimEvent::BuildingRemoved {
        pos: LoopPos::ORIGIN,
        kind: BuildingKind::Pins
    }));
    for enemy in run.loops[&LoopPos::ORIGIN].enemies.iter().filter(|e| e.id.0 >= 10) {
        assert_relative_eq!(enemy.health, 75.0);
    }
}

// ---- Stress and health ----

#[test]
fn test_stress_formula() {
    let mut loops = Loops::new();
    let mut a = enemy_at(0, 0.0, 1.0, 10.0);
    a.lifetime = 12.0;
    let mut b = enemy_at(1, 0.0, 1.0, 10.0);
    b.lifetime = 18.0;
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![a, b],
        },
    );
    loops.insert(LoopPos::new(1, 0), Loop::default());

    assert_relative_eq!(lifecycle::compute_stress(&loops, 0), 30.0 / 20.0);
    assert_relative_eq!(lifecycle::compute_stress(&loops, 50), 30.0 / (20.0 * 1.5));
}

#[test]
fn test_health_drain_above_threshold() {
    let mut e = enemy_at(0, 0.0, 1.0, 10.0);
    e.lifetime = 15.0;
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![e],
        },
    );
    let mut run = running_state(loops);
    let mut events = Vec::new();
    lifecycle::apply_stress(&mut run, 0.5, &mut events);
    assert_relative_eq!(run.stress, 1.5);
    assert_relative_eq!(run.health, 100.0 - 2f64.powf(1.5) * 0.5);
    assert!(events.is_empty());
}

#[test]
fn test_no_drain_at_or_below_threshold() {
    let mut e = enemy_at(0, 0.0, 1.0, 10.0);
    e.lifetime = 10.0;
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![e],
        },
    );
    let mut run = running_state(loops);
    lifecycle::apply_stress(&mut run, 1.0, &mut Vec::new());
    assert_relative_eq!(run.stress, 1.0);
    assert_relative_eq!(run.health, 100.0);
}

#[test]
fn test_anxiety_triggers_once() {
    let mut e = enemy_at(0, 0.0, 1.0, 10.0);
    e.lifetime = 25.0;
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![e],
        },
    );
    let mut run = running_state(loops);
    let mut events = Vec::new();
    lifecycle::apply_stress(&mut run, 0.01, &mut events);
    lifecycle::apply_stress(&mut run, 0.01, &mut events);
    let count = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                SimEvent::SpecialTriggered {
                    objective: SpecialObjective::Anxiety
                }
            )
        })
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_health_depleted_ends_run() {
    let mut sim = started(3, RunSetup::default());
    place(&mut sim, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();
    {
        let run = sim.run_mut();
        run.health = 0.001;
        let enemy = &mut run.loops.get_mut(&LoopPos::ORIGIN).unwrap().enemies[0];
        enemy.lifetime = 40.0;
    }
    let snap = sim.tick();
    assert_eq!(snap.game_state, GameState::Stopped);
    let ended = snap.events.iter().find_map(|e| match e {
        SimEvent::RunEnded { stats } => Some(stats.reason),
        _ => None,
    });
    assert_eq!(ended, Some(EndReason::HealthDepleted));

    // Nothing moves once the run is over.
    let after = sim.tick();
    assert_eq!(after.time.tick, snap.time.tick);
}

// ---- Cycles and waves ----

#[test]
fn test_progress_bar_advances_exactly_once() {
    let mut loops = Loops::new();
    loops.insert(
        LoopPos::ORIGIN,
        Loop {
            building: None,
            enemies: vec![enemy_at(0, 0.0, 1.0, 10.0)],
        },
    );
    let mut run = running_state(loops);
    run.cycle = 1;
    run.cycle_progress = 0.99;
    run.next_enemy_id = 1;
    let mut events = Vec::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    lifecycle::progress_cycle(&mut run, 1.0, &mut rng, &mut events);

    assert_eq!(run.cycle, 2);
    let waves = events
        .iter()
        .filter(|e| matches!(e, SimEvent::WaveSpawned { .. }))
        .count();
    assert_eq!(waves, 1);
    assert!(run.cycle_progress < 1.0);
    assert_eq!(run.loops.len(), 1);
}

#[test]
fn test_progress_bar_idle_before_first_cycle() {
    let mut run = running_state(setup::seed_board(&mut 0));
    lifecycle::progress_cycle(
        &mut run,
        100.0,
        &mut ChaCha8Rng::seed_from_u64(5),
        &mut Vec::new(),
    );
    assert_eq!(run.cycle, 0);
    assert_relative_eq!(run.cycle_progress, 0.0);
}

#[test]
fn test_forced_advance_on_empty_board() {
    let mut loops = Loops::new();
    loops.insert(LoopPos::ORIGIN, Loop::default());
    let mut run = running_state(loops);
    run.cycle = 2;
    run.cycle_progress = 0.4;
    let mut events = Vec::new();
    lifecycle::force_cycle_if_empty(&mut run, &mut ChaCha8Rng::seed_from_u64(5), &mut events);

    assert_eq!(run.cycle, 3);
    assert_relative_eq!(run.cycle_progress, 0.0);
    let waves = events
        .iter()
        .filter(|e| matches!(e, SimEvent::WaveSpawned { .. }))
        .count();
    assert_eq!(waves, 1);
    assert!(run.enemy_count() >= 1);
    // Odd cycles grow the grid.
    assert_eq!(run.loops.len(), 2);
}

#[test]
fn test_wave_size_formula() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..20 {
        assert_eq!(setup::wave_size(&mut rng, 0, GameMode::Standard), 1);
        assert_eq!(setup::wave_size(&mut rng, 10, GameMode::Standard), 3);
        let n = setup::wave_size(&mut rng, 5, GameMode::Standard);
        assert!(n == 1 || n == 2, "cycle 5 gives 1.75, got {n}");
    }
}

#[test]
fn test_rolled_enemy_ranges() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for i in 0..50 {
        let e = setup::roll_enemy(&mut rng, EnemyId(i), 4, GameMode::Standard, 25.0);
        let base = 18.0 * 1.05f64.powi(4);
        assert!(e.health >= base * 0.9 && e.health <= base * 1.1);
        assert_relative_eq!(e.health, e.max_health);
        let magnitude = e.speed.abs();
        assert!((1.0..1.4).contains(&magnitude));
        assert!((0.0..1.0).contains(&e.angle));
        assert_relative_eq!(e.loot[&ResourceId::Energy], 25.0);
    }
}

// ---- Grid ----

#[test]
fn test_single_loop_expands_to_a_neighbour() {
    for seed in 0..10 {
        let mut loops = Loops::new();
        loops.insert(LoopPos::ORIGIN, Loop::default());
        let pos = grid::expand(&mut loops, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        assert!(LoopPos::ORIGIN.neighbors().contains(&pos));
        assert_eq!(loops.len(), 2);
    }
}

#[test]
fn test_boxed_in_loop_has_no_vacant_neighbour() {
    let mut loops = Loops::new();
    loops.insert(LoopPos::ORIGIN, Loop::default());
    for n in LoopPos::ORIGIN.neighbors() {
        loops.insert(n, Loop::default());
    }
    assert!(grid::vacant_neighbors(&loops, LoopPos::ORIGIN).is_empty());
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let cell = grid::find_expansion_cell(&loops, &mut rng).unwrap();
    assert!(!loops.contains_key(&cell));
}

#[test]
fn test_empty_grid_cannot_expand() {
    let mut loops = Loops::new();
    assert!(grid::expand(&mut loops, &mut ChaCha8Rng::seed_from_u64(3)).is_none());
}

// ---- Economy ----

#[test]
fn test_unaffordable_placement_clears_pick() {
    let mut sim = started(1, RunSetup::default());
    sim.run_mut().ledger.set(ResourceId::Energy, 10.0);
    let err = place(&mut sim, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap_err();
    assert_eq!(err, ActionError::InsufficientResources);
    assert!(sim.run().selected_building.is_none());
    assert!(sim.run().loops[&LoopPos::ORIGIN].building.is_none());
}

#[test]
fn test_occupied_loop_rejected() {
    let mut sim = started(1, RunSetup::default());
    sim.run_mut().ledger.set(ResourceId::Energy, 10_000.0);
    place(&mut sim, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();
    let err = place(&mut sim, BuildingKind::Plasma, LoopPos::ORIGIN).unwrap_err();
    assert_eq!(err, ActionError::LoopOccupied(LoopPos::ORIGIN));
    assert!(sim.run().selected_loop.is_none());
}

#[test]
fn test_building_outside_loadout_rejected() {
    let mut sim = started(1, RunSetup::default());
    let err = sim
        .apply(PlayerCommand::SelectBuilding {
            kind: Some(BuildingKind::Pagoda),
        })
        .unwrap_err();
    assert_eq!(err, ActionError::NotInLoadout(BuildingKind::Pagoda));
}

#[test]
fn test_cost_factor_escalates() {
    let mut sim = started(1, RunSetup::default());
    sim.run_mut().ledger.set(ResourceId::Energy, 10_000.0);
    sim.run_mut()
        .loops
        .insert(LoopPos::new(1, 0), Loop::default());
    place(&mut sim, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();
    assert_relative_eq!(
        economy::cost_factor(sim.run(), BuildingKind::Beamer),
        1.1f64.powi(2)
    );
    assert_relative_eq!(economy::cost_factor(sim.run(), BuildingKind::Plasma), 1.1);

    place(&mut sim, BuildingKind::Beamer, LoopPos::new(1, 0)).unwrap();
    assert_relative_eq!(
        sim.run().ledger.amount(ResourceId::Energy),
        10_000.0 - 100.0 - 121.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_snapshot_lists_next_prices() {
    let mut sim = started(1, RunSetup::default());
    let snap = sim.snapshot();
    assert_eq!(snap.building_costs.len(), 4);
    assert_relative_eq!(
        snap.building_costs[&BuildingKind::Plasma][&ResourceId::Energy],
        400.0
    );

    place(&mut sim, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();
    let snap = sim.snapshot();
    assert_relative_eq!(
        snap.building_costs[&BuildingKind::Beamer][&ResourceId::Energy],
        121.0,
        epsilon = 1e-9
    );
    assert!(!snap.building_costs.contains_key(&BuildingKind::Pins));
}

#[test]
fn test_sell_refunds_and_starts_cooldown() {
    let mut sim = started(
        1,
        RunSetup {
            sell_cooldown_level: 2,
            ..Default::default()
        },
    );
    place(&mut sim, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();
    sim.apply(PlayerCommand::SellBuilding {
        pos: LoopPos::ORIGIN,
    })
    .unwrap();

    let run = sim.run();
    assert!(run.loops[&LoopPos::ORIGIN].building.is_none());
    assert_relative_eq!(run.ledger.amount(ResourceId::Energy), 75.0);
    assert_relative_eq!(run.sell_cooldown, 50.0);
    assert_eq!(run.building_factor, 0);
    assert_relative_eq!(economy::cost_factor(run, BuildingKind::Beamer), 1.0);

    place(&mut sim, BuildingKind::Freezer, LoopPos::ORIGIN).unwrap_err();
    sim.run_mut().ledger.set(ResourceId::Energy, 1_000.0);
    place(&mut sim, BuildingKind::Plasma, LoopPos::ORIGIN).unwrap();
    let err = sim
        .apply(PlayerCommand::SellBuilding {
            pos: LoopPos::ORIGIN,
        })
        .unwrap_err();
    assert!(matches!(err, ActionError::SellOnCooldown(_)));
}

#[test]
fn test_pins_cannot_be_sold() {
    let mut sim = started(1, RunSetup::default());
    sim.run_mut()
        .loops
        .get_mut(&LoopPos::ORIGIN)
        .unwrap()
        .building = Some(Building::new(BuildingKind::Pins));
    let err = sim
        .apply(PlayerCommand::SellBuilding {
            pos: LoopPos::ORIGIN,
        })
        .unwrap_err();
    assert_eq!(err, ActionError::NotSellable(BuildingKind::Pins));
}

#[test]
fn test_upgrade_purchase_and_max() {
    let mut sim = started(1, RunSetup::default());
    sim.run_mut().ledger.set(ResourceId::Energy, 1e12);
    place(&mut sim, BuildingKind::Beamer, LoopPos::ORIGIN).unwrap();

    let before = sim.run().ledger.amount(ResourceId::Energy);
    sim.apply(PlayerCommand::BuyUpgrade {
        pos: LoopPos::ORIGIN,
        upgrade: UpgradeId::Damage,
    })
    .unwrap();
    let run = sim.run();
    let building = run.loops[&LoopPos::ORIGIN].building.as_ref().unwrap();
    assert_eq!(building.level(UpgradeId::Damage), 1);
    let paid = before - run.ledger.amount(ResourceId::Energy);
    assert!(paid > 0.0);
    assert_relative_eq!(
        building.sell_value[&ResourceId::Energy],
        75.0 + paid * 0.5,
        epsilon = 1e-9
    );

    sim.run_mut()
        .loops
        .get_mut(&LoopPos::ORIGIN)
        .unwrap()
        .building
        .as_mut()
        .unwrap()
        .upgrades
        .insert(UpgradeId::Interval, 14);
    let err = sim
        .apply(PlayerCommand::BuyUpgrade {
            pos: LoopPos::ORIGIN,
            upgrade: UpgradeId::Interval,
        })
        .unwrap_err();
    assert_eq!(err, ActionError::UpgradeMaxed(UpgradeId::Interval));

    let err = sim
        .apply(PlayerCommand::BuyUpgrade {
            pos: LoopPos::ORIGIN,
            upgrade: UpgradeId::Uses,
        })
        .unwrap_err();
    assert_eq!(
        err,
        ActionError::UnknownUpgrade(BuildingKind::Beamer, UpgradeId::Uses)
    );
}

#[test]
fn test_run_upgrades_cost_info() {
    let mut sim = started(1, RunSetup::default());
    let err = sim
        .apply(PlayerCommand::BuyRunUpgrade {
            upgrade: RunUpgrade::EnemyEnergy,
        })
        .unwrap_err();
    assert_eq!(err, ActionError::InsufficientResources);

    sim.run_mut().ledger.set(ResourceId::Info, 100.0);
    sim.apply(PlayerCommand::BuyRunUpgrade {
        upgrade: RunUpgrade::EnemyEnergy,
    })
    .unwrap();
    assert_eq!(sim.run().run_upgrade_level(RunUpgrade::EnemyEnergy), 1);
    assert_relative_eq!(sim.run().ledger.amount(ResourceId::Info), 50.0);
    assert_relative_eq!(
        economy::run_upgrade_cost(RunUpgrade::EnemyEnergy, 1),
        57.5,
        epsilon = 1e-9
    );
}

// ---- Stuck detection ----

#[test]
fn test_stuck_board_ends_after_grace() {
    let mut sim = started(
        1,
        RunSetup {
            loadout: vec![BuildingKind::Freezer, BuildingKind::Energizer],
            ..Default::default()
        },
    );
    let first = sim.tick();
    assert!(has_event(&first, |e| matches!(e, SimEvent::StuckDetected)));
    assert!(has_event(&first, |e| matches!(
        e,
        SimEvent::SpecialTriggered {
            objective: SpecialObjective::Stucked
        }
    )));
    assert_eq!(first.game_state, GameState::Started);

    let mut reason = None;
    for _ in 0..120 {
        let snap = sim.tick();
        if let Some(r) = snap.events.iter().find_map(|e| match e {
            SimEvent::RunEnded { stats } => Some(stats.reason),
            _ => None,
        }) {
            reason = Some(r);
            break;
        }
    }
    assert_eq!(reason, Some(EndReason::Stuck));
    assert_eq!(sim.game_state(), GameState::Stopped);
}

#[test]
fn test_affordable_damager_is_not_stuck() {
    let mut sim = started(1, RunSetup::default());
    for _ in 0..200 {
        let snap = sim.tick();
        assert!(!has_event(&snap, |e| matches!(e, SimEvent::StuckDetected)));
    }
    assert!(sim.run().is_running());
}

#[test]
fn test_stuck_timer_resets_when_resolved() {
    let mut sim = started(
        1,
        RunSetup {
            loadout: vec![BuildingKind::Beamer],
            ..Default::default()
        },
    );
    sim.run_mut().ledger.set(ResourceId::Energy, 0.0);
    sim.tick();
    assert!(sim.run().stuck_timer.is_some());
    sim.run_mut().ledger.set(ResourceId::Energy, 500.0);
    sim.tick();
    assert!(sim.run().stuck_timer.is_none());
    assert!(sim.run().is_running());
}

// ---- Lifecycle ----

#[test]
fn test_forfeit_replay_and_idle() {
    let mut sim = started(1, RunSetup::default());
    sim.apply(PlayerCommand::ForfeitRun).unwrap();
    let snap = sim.snapshot();
    assert_eq!(snap.game_state, GameState::Stopped);
    assert!(has_event(&snap, |e| matches!(
        e,
        SimEvent::RunEnded { stats } if stats.reason == EndReason::Forfeit
    )));

    sim.apply(PlayerCommand::Replay).unwrap();
    assert_eq!(sim.game_state(), GameState::Started);
    assert_eq!(sim.run().loops.len(), 1);

    sim.apply(PlayerCommand::ForfeitRun).unwrap();
    sim.apply(PlayerCommand::ContinueToIdle).unwrap();
    assert_eq!(sim.game_state(), GameState::Idle);
    assert_eq!(
        sim.apply(PlayerCommand::ForfeitRun).unwrap_err(),
        ActionError::NoRunActive
    );
}

#[test]
fn test_xp_worth_formula() {
    let mut run = running_state(Loops::new());
    run.cycle = 4;
    run.lifetime = 240.0;
    assert_relative_eq!(lifecycle::xp_worth(&run), 4.0);

    run.ledger.earn(ResourceId::Energy, 99.0);
    run.mode = GameMode::Hardcore;
    assert_relative_eq!(lifecycle::xp_worth(&run), 4.0 * 3.0 * 2.0, epsilon = 1e-9);
}

#[test]
fn test_wysi_trigger() {
    let mut run = running_state(Loops::new());
    run.ledger.set(ResourceId::Energy, 727.4);
    let mut events = Vec::new();
    lifecycle::check_wysi(&mut run, &mut events);
    lifecycle::check_wysi(&mut run, &mut events);
    assert_eq!(
        events,
        vec![SimEvent::SpecialTriggered {
            objective: SpecialObjective::Wysi
        }]
    );
}

// ---- Speed ----

#[test]
fn test_speed_locked_in_hardcore() {
    let mut sim = started(
        1,
        RunSetup {
            mode: GameMode::Hardcore,
            max_speed: 4.0,
            ..Default::default()
        },
    );
    assert_eq!(
        sim.apply(PlayerCommand::SetGameSpeed { speed: 2.0 }),
        Err(ActionError::SpeedLocked)
    );
    sim.apply(PlayerCommand::Pause).unwrap();
    assert!(sim.run().paused);
}

#[test]
fn test_speed_clamped_to_research() {
    let mut sim = started(
        1,
        RunSetup {
            max_speed: 2.0,
            ..Default::default()
        },
    );
    sim.apply(PlayerCommand::SetGameSpeed { speed: 3.0 }).unwrap();
    assert_relative_eq!(sim.run().game_speed, 2.0);

    let mut locked = started(1, RunSetup::default());
    assert_eq!(
        locked.apply(PlayerCommand::SetGameSpeed { speed: 2.0 }),
        Err(ActionError::SpeedLocked)
    );
}

#[test]
fn test_first_speed_level_offers_pause_or_normal() {
    let mut sim = started(
        1,
        RunSetup {
            max_speed: 1.0,
            ..Default::default()
        },
    );
    assert_eq!(
        sim.apply(PlayerCommand::SetGameSpeed { speed: 0.37 }),
        Err(ActionError::UnsupportedSpeed(0.37))
    );
    assert_relative_eq!(sim.run().game_speed, 1.0);

    sim.apply(PlayerCommand::SetGameSpeed { speed: 0.0 }).unwrap();
    assert_relative_eq!(sim.run().game_speed, 0.0);
    sim.apply(PlayerCommand::SetGameSpeed { speed: 3.0 }).unwrap();
    assert_relative_eq!(sim.run().game_speed, 1.0);
}

#[test]
fn test_stuck_window_runs_while_held() {
    for hold in [PlayerCommand::SetGameSpeed { speed: 0.0 }, PlayerCommand::Pause] {
        let mut sim = started(
            1,
            RunSetup {
                loadout: vec![BuildingKind::Freezer, BuildingKind::Energizer],
                max_speed: 1.0,
                ..Default::default()
            },
        );
        sim.apply(hold.clone()).unwrap();

        let mut reason = None;
        for _ in 0..200 {
            let snap = sim.tick();
            assert_relative_eq!(snap.lifetime, 0.0);
            if let Some(r) = snap.events.iter().find_map(|e| match e {
                SimEvent::RunEnded { stats } => Some(stats.reason),
                _ => None,
            }) {
                reason = Some(r);
                break;
            }
        }
        assert_eq!(reason, Some(EndReason::Stuck), "{hold:?} froze the grace window");
        assert_eq!(sim.game_state(), GameState::Stopped);
    }
}

#[test]
fn test_pause_freezes_time() {
    let mut sim = started(1, RunSetup::default());
    sim.queue_command(PlayerCommand::Pause);
    let snap = sim.tick();
    assert_eq!(snap.time.tick, 0);
    assert_relative_eq!(snap.lifetime, 0.0);
    sim.queue_command(PlayerCommand::Resume);
    let snap = sim.tick();
    assert_eq!(snap.time.tick, 1);
}

#[test]
fn test_game_speed_scales_lifetime() {
    let mut sim = started(
        1,
        RunSetup {
            max_speed: 2.0,
            ..Default::default()
        },
    );
    sim.apply(PlayerCommand::SetGameSpeed { speed: 2.0 }).unwrap();
    let snap = sim.tick_delta(0.5);
    assert_relative_eq!(snap.lifetime, 1.0);
    assert_relative_eq!(snap.time.elapsed_secs, 0.5);
}

// ---- Persistence shape ----

#[test]
fn test_run_state_round_trips_as_keyed_loops() {
    let sim = started(1, RunSetup::default());
    let json = serde_json::to_value(sim.run()).unwrap();
    assert!(json["loops"]["0x0"]["enemies"].is_array());
    let back: RunState = serde_json::from_value(json).unwrap();
    assert_eq!(back.loops.len(), 1);
    let resumed = Simulation::from_state(SimConfig::default(), back);
    assert_eq!(resumed.game_state(), GameState::Started);
}
