//! A play session: the hub and the engine, and the hand-offs between them.
//!
//! Data only crosses at run boundaries. The hub produces a `RunSetup` when a
//! run starts. The engine reports specials and the final `RunStats` through
//! its events, and the session applies them to the hub as they arrive.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use delooped_core::commands::PlayerCommand;
use delooped_core::enums::GameState;
use delooped_core::events::{RunStats, SimEvent};
use delooped_core::state::RunSnapshot;
use delooped_hub::hub::{Feature, SpecialStatus};
use delooped_hub::objectives::ObjectiveId;
use delooped_hub::research::ResearchId;
use delooped_hub::{HubError, HubState};
use delooped_sim::{ActionError, SimConfig, Simulation};

use crate::autopilot::Autopilot;
use crate::game_loop;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("hub refused to start a run: {0}")]
    Hub(#[from] HubError),
    #[error("engine refused to start a run: {0}")]
    Action(#[from] ActionError),
    #[error("cannot start the game loop: {0}")]
    GameLoop(#[from] io::Error),
    #[error("game loop stopped before the run ended")]
    LoopStopped,
}

pub struct Session {
    hub: HubState,
    sim: Simulation,
    autopilot: Option<Autopilot>,
    /// Capsule rolls. Kept apart from the engine stream.
    rng: ChaCha8Rng,
    history: Vec<RunStats>,
}

impl Session {
    pub fn new(hub: HubState, config: SimConfig) -> Self {
        Self {
            hub,
            rng: ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1)),
            sim: Simulation::new(config),
            autopilot: None,
            history: Vec::new(),
        }
    }

    pub fn set_autopilot(&mut self, autopilot: Option<Autopilot>) {
        self.autopilot = autopilot;
    }

    pub fn hub(&self) -> &HubState {
        &self.hub
    }

    pub fn hub_mut(&mut self) -> &mut HubState {
        &mut self.hub
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Finished runs, oldest first.
    pub fn history(&self) -> &[RunStats] {
        &self.history
    }

    /// Start a run with the hub's current setup.
    pub fn start_run(&mut self) -> Result<(), SessionError> {
        let setup = self.hub.run_setup()?;
        self.sim.apply(PlayerCommand::StartRun { setup })?;
        Ok(())
    }

    /// Apply a snapshot's events to the hub. Returns the stats of a run that
    /// ended in it, after its reward has been claimed.
    pub fn observe(&mut self, snapshot: &RunSnapshot) -> Option<RunStats> {
        let mut finished = None;
        for event in &snapshot.events {
            match event {
                SimEvent::SpecialTriggered { objective } => self.hub.trigger_special(*objective),
                SimEvent::RunEnded { stats } => {
                    self.hub.claim_run_reward(stats);
                    self.history.push(stats.clone());
                    finished = Some(stats.clone());
                }
                _ => {}
            }
        }
        finished
    }

    /// Play one run to the end on this thread, as fast as possible.
    ///
    /// After `max_ticks` ticks the run is forfeited.
    pub fn play_run(&mut self, max_ticks: u64) -> Result<RunStats, SessionError> {
        self.start_run()?;
        let mut ticks = 0;
        loop {
            let snapshot = self.sim.tick();
            ticks += 1;
            if let Some(stats) = self.observe(&snapshot) {
                self.after_run(ticks);
                return Ok(stats);
            }
            if snapshot.game_state != GameState::Started {
                return Err(SessionError::LoopStopped);
            }
            if ticks >= max_ticks {
                self.sim.apply(PlayerCommand::ForfeitRun)?;
                let snapshot = self.sim.snapshot();
                let stats = self.observe(&snapshot).ok_or(SessionError::LoopStopped)?;
                self.after_run(ticks);
                return Ok(stats);
            }
            if let Some(autopilot) = &self.autopilot {
                self.sim.queue_commands(autopilot.plan(&snapshot));
            }
        }
    }

    /// Play one run on the paced game-loop thread.
    pub fn play_run_realtime(&mut self, max_ticks: u64) -> Result<RunStats, SessionError> {
        let setup = self.hub.run_setup()?;
        let config = self.sim.config().clone();
        let sim = std::mem::replace(&mut self.sim, Simulation::new(config));

        let latest = Arc::new(Mutex::new(None));
        let (snapshot_tx, snapshot_rx) = mpsc::channel();
        let handle = game_loop::spawn_game_loop(sim, latest, snapshot_tx)?;
        handle.send(PlayerCommand::StartRun { setup });

        let mut outcome = Err(SessionError::LoopStopped);
        let mut ticks = 0;
        for snapshot in snapshot_rx.iter() {
            ticks += 1;
            if let Some(stats) = self.observe(&snapshot) {
                outcome = Ok(stats);
                break;
            }
            if ticks >= max_ticks {
                handle.send(PlayerCommand::ForfeitRun);
            } else if let Some(autopilot) = &self.autopilot {
                for command in autopilot.plan(&snapshot) {
                    handle.send(command);
                }
            }
        }

        if let Some(sim) = handle.shutdown() {
            self.sim = sim;
        }
        if outcome.is_ok() {
            self.after_run(ticks);
        }
        outcome
    }

    /// Hub upkeep between runs: idle capsule accrual, and with the
    /// autopilot on, spending on everything the hub offers.
    fn after_run(&mut self, ticks: u64) {
        let secs = ticks as f64 / self.sim.config().tick_rate.max(1) as f64;
        self.hub.accrue_capsules(secs);
        if self.autopilot.is_some() {
            self.manage_hub();
        }
    }

    fn manage_hub(&mut self) {
        let hub = &mut self.hub;
        for feature in [
            Feature::Collection,
            Feature::Objectives,
            Feature::Research,
            Feature::Capsules,
        ] {
            if !hub.has_feature(feature) && hub.unlock_feature(feature).is_ok() {
                log::info!("unlocked the {feature:?} menu");
            }
        }

        let specials: Vec<_> = hub
            .specials
            .iter()
            .filter(|(_, &status)| status == SpecialStatus::Claimable)
            .map(|(&objective, _)| objective)
            .collect();
        for objective in specials {
            if let Ok(kind) = hub.claim_special(objective) {
                log::info!("special {objective:?} unlocked {kind:?}");
            }
        }
        for id in ObjectiveId::ALL {
            let levels = hub.claimable_levels(id);
            if levels > 0 && hub.claim_objective(id, levels).is_ok() {
                log::info!("claimed {levels} level(s) of {id:?}");
            }
        }

        if let Ok(count) = hub.claim_capsules() {
            log::debug!("claimed {count} capsule(s)");
        }
        while hub.capsules > 0 {
            if hub.open_capsule(&mut self.rng).is_err() {
                break;
            }
        }

        for id in [ResearchId::StartEnergy, ResearchId::Inventory] {
            while hub.buy_research(id).is_ok() {}
        }
        let unlocked: Vec<_> = hub.unlocked_buildings.iter().copied().collect();
        for kind in unlocked {
            if let Err(err) = hub.equip(kind) {
                log::debug!("not equipping {kind:?}: {err}");
            }
        }
    }
}
