//! Persisted state of a single run.
//!
//! Everything here is plain data so external persistence can serialize it
//! as-is. Loops own their building and enemies by value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use delooped_core::commands::RunSetup;
use delooped_core::components::Loop;
use delooped_core::enums::*;
use delooped_core::ledger::ResourceLedger;
use delooped_core::types::LoopPos;

/// The loops of the board, keyed by grid position.
pub type Loops = BTreeMap<LoopPos, Loop>;

/// Complete state of the active run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    pub game_state: GameState,
    pub mode: GameMode,
    pub cycle: u32,
    pub cycle_progress: f64,
    pub health: f64,
    /// Recomputed every tick.
    pub stress: f64,
    pub game_speed: f64,
    pub paused: bool,
    /// Elapsed run seconds, scaled by game speed.
    pub lifetime: f64,
    pub ledger: ResourceLedger,
    pub loops: Loops,
    /// Buildings bought this run, any kind.
    pub building_factor: u32,
    /// Buildings bought this run, per kind.
    #[serde(default)]
    pub building_factors: BTreeMap<BuildingKind, u32>,
    pub sell_cooldown: f64,
    pub selected_building: Option<BuildingKind>,
    pub selected_loop: Option<LoopPos>,
    /// Remaining grace seconds once the board is found stuck.
    pub stuck_timer: Option<f64>,
    #[serde(default)]
    pub run_upgrades: BTreeMap<RunUpgrade, u32>,
    /// Specials already reported this run.
    #[serde(default)]
    pub triggered: Vec<SpecialObjective>,
    pub setup: Option<RunSetup>,
    pub next_enemy_id: u64,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        self.game_state == GameState::Started
    }

    pub fn run_upgrade_level(&self, upgrade: RunUpgrade) -> u32 {
        self.run_upgrades.get(&upgrade).copied().unwrap_or(0)
    }

    pub fn enemy_count(&self) -> usize {
        self.loops.values().map(Loop::enemy_count).sum()
    }

    pub fn loadout(&self) -> &[BuildingKind] {
        self.setup.as_ref().map(|s| s.loadout.as_slice()).unwrap_or(&[])
    }
}
