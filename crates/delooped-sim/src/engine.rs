//! Simulation engine, the core of the game.
//!
//! `Simulation` owns the run state, processes player commands, runs all
//! systems and produces `RunSnapshot`s. Completely headless, which keeps it
//! deterministic under test.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use delooped_core::commands::{PlayerCommand, RunSetup};
use delooped_core::constants::{STUCK_GRACE_SECS, TICK_RATE, TRANSITION_CHANCE};
use delooped_core::enums::{EndReason, GameState};
use delooped_core::events::SimEvent;
use delooped_core::state::RunSnapshot;
use delooped_core::types::SimTime;

use crate::connections::Connections;
use crate::error::ActionError;
use crate::run_state::RunState;
use crate::systems;

/// Configuration for a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed. Same seed and same commands give the same run.
    pub seed: u64,
    /// Chance that an enemy crossing into an existing neighbour moves over.
    pub transition_chance: f64,
    /// Seconds a stuck board is tolerated before the run is ended.
    pub stuck_grace_secs: f64,
    /// Fixed ticks per second used by `tick()`.
    pub tick_rate: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            transition_chance: TRANSITION_CHANCE,
            stuck_grace_secs: STUCK_GRACE_SECS,
            tick_rate: TICK_RATE,
        }
    }
}

/// The simulation engine. Owns the run and all per-run side tables.
pub struct Simulation {
    config: SimConfig,
    run: RunState,
    rng: ChaCha8Rng,
    time: SimTime,
    command_queue: VecDeque<PlayerCommand>,
    events: Vec<SimEvent>,
    connections: Connections,
    last_setup: Option<RunSetup>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self::from_state(config, RunState::default())
    }

    /// Resume from a persisted run.
    pub fn from_state(config: SimConfig, run: RunState) -> Self {
        let last_setup = run.setup.clone();
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            run,
            time: SimTime::default(),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            connections: Connections::default(),
            last_setup,
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance by one fixed tick and return the resulting snapshot.
    pub fn tick(&mut self) -> RunSnapshot {
        let dt = 1.0 / self.config.tick_rate.max(1) as f64;
        self.tick_delta(dt)
    }

    /// Advance by `delta` real seconds and return the resulting snapshot.
    pub fn tick_delta(&mut self, delta: f64) -> RunSnapshot {
        self.process_commands();

        if self.run.is_running() {
            if !self.run.paused && self.run.game_speed > 0.0 {
                self.run_systems(delta);
                self.time.advance(delta);
            } else {
                self.hold(delta);
            }
        }

        self.snapshot()
    }

    /// Snapshot of the current state, handing over pending events.
    pub fn snapshot(&mut self) -> RunSnapshot {
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.run, &self.time, &self.connections, events)
    }

    pub fn game_state(&self) -> GameState {
        self.run.game_state
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Read-only view of the run, e.g. for persistence.
    pub fn run(&self) -> &RunState {
        &self.run
    }

    #[cfg(test)]
    pub fn run_mut(&mut self) -> &mut RunState {
        &mut self.run
    }

    /// Apply a command immediately, reporting why it was rejected.
    pub fn apply(&mut self, command: PlayerCommand) -> Result<(), ActionError> {
        let run = &mut self.run;
        let events = &mut self.events;
        match command {
            PlayerCommand::StartRun { setup } => {
                if run.game_state == GameState::Started {
                    return Err(ActionError::InvalidState(run.game_state));
                }
                self.last_setup = Some(setup.clone());
                systems::lifecycle::start_run(run, setup, &mut self.connections, events);
                Ok(())
            }
            PlayerCommand::ForfeitRun => {
                if !run.is_running() {
                    return Err(ActionError::NoRunActive);
                }
                systems::lifecycle::end_run(run, EndReason::Forfeit, events);
                Ok(())
            }
            PlayerCommand::Replay => {
                if run.game_state != GameState::Stopped {
                    return Err(ActionError::InvalidState(run.game_state));
                }
                let setup = self.last_setup.clone().unwrap_or_default();
                systems::lifecycle::start_run(run, setup, &mut self.connections, events);
                Ok(())
            }
            PlayerCommand::ContinueToIdle => {
                if run.game_state != GameState::Stopped {
                    return Err(ActionError::InvalidState(run.game_state));
                }
                run.game_state = GameState::Idle;
                Ok(())
            }
            PlayerCommand::SelectBuilding { kind } => systems::economy::select_building(run, kind),
            PlayerCommand::SelectLoop { pos } => systems::economy::select_loop(run, pos),
            PlayerCommand::PlaceOnSelectedLoop => systems::economy::place_on_selected_loop(
                run,
                &mut self.rng,
                &mut self.connections,
                events,
            ),
            PlayerCommand::SellBuilding { pos } => {
                systems::economy::sell_building(run, pos, events)
            }
            PlayerCommand::BuyUpgrade { pos, upgrade } => {
                systems::economy::buy_upgrade(run, pos, upgrade, events)
            }
            PlayerCommand::BuyRunUpgrade { upgrade } => {
                systems::economy::buy_run_upgrade(run, upgrade, events)
            }
            PlayerCommand::SetGameSpeed { speed } => systems::economy::set_game_speed(run, speed),
            PlayerCommand::Pause | PlayerCommand::Resume => {
                if !run.is_running() {
                    return Err(ActionError::NoRunActive);
                }
                run.paused = matches!(command, PlayerCommand::Pause);
                Ok(())
            }
        }
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Rejected commands are no-ops.
    fn handle_command(&mut self, command: PlayerCommand) {
        let label = format!("{command:?}");
        if let Err(err) = self.apply(command) {
            log::debug!("rejected {label}: {err}");
        }
    }

    /// Held clock (paused or speed 0). The stuck grace window still runs on
    /// wall time.
    fn hold(&mut self, real_delta: f64) {
        systems::lifecycle::check_stuck(
            &mut self.run,
            real_delta,
            self.config.stuck_grace_secs,
            &mut self.events,
        );
    }

    /// Run all systems in order. `real_delta` is unscaled.
    fn run_systems(&mut self, real_delta: f64) {
        use systems::{combat, economy, lifecycle, movement};

        let run = &mut self.run;
        let rng = &mut self.rng;
        let events = &mut self.events;
        let connections = &mut self.connections;
        let delta = real_delta * run.game_speed;

        // 1. Clocks
        run.lifetime += delta;
        run.sell_cooldown = (run.sell_cooldown - delta).max(0.0);
        connections.tick(delta);

        // 2. Cycle bar, then forced advance on an empty board
        lifecycle::progress_cycle(run, delta, rng, events);
        lifecycle::force_cycle_if_empty(run, rng, events);

        // 3. Terminal and special checks
        if lifecycle::check_stuck(run, real_delta, self.config.stuck_grace_secs, events) {
            return;
        }
        lifecycle::check_wysi(run, events);

        // 4. Movement, deaths and transition rolls
        let moves = movement::run(
            run,
            delta,
            self.config.transition_chance,
            rng,
            connections,
            events,
        );

        // 5. Building updates
        combat::update_buildings(run, delta, rng, connections, events);

        // 6. Stress and health
        lifecycle::apply_stress(run, delta, events);
        if run.health <= 0.0 {
            lifecycle::end_run(run, EndReason::HealthDepleted, events);
            return;
        }

        // 7. Deferred loop hand-offs
        combat::apply_moves(run, moves, rng, connections, events);

        // 8. Placement commit for a standing selection
        if run.selected_building.is_some() && run.selected_loop.is_some() {
            if let Err(err) = economy::place_on_selected_loop(run, rng, connections, events) {
                log::trace!("placement not committed: {err}");
            }
        }
    }
}
