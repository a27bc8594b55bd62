//! Player commands sent from the frontend to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::constants::BASE_STARTING_ENERGY;
use crate::enums::*;
use crate::types::LoopPos;

/// All possible player actions during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Run lifecycle ---
    /// Start a fresh run with the given hub-provided setup.
    StartRun { setup: RunSetup },
    /// Give up the current run.
    ForfeitRun,
    /// Restart with the previous run's setup from the summary screen.
    Replay,
    /// Leave the summary screen for the hub.
    ContinueToIdle,

    // --- Board ---
    /// Pick a building type to place, or clear the pick.
    SelectBuilding { kind: Option<BuildingKind> },
    /// Select a loop, or clear the selection.
    SelectLoop { pos: Option<LoopPos> },
    /// Commit the selected building onto the selected loop.
    PlaceOnSelectedLoop,
    /// Sell the building on `pos`.
    SellBuilding { pos: LoopPos },
    /// Buy the next level of `upgrade` on the building at `pos`.
    BuyUpgrade { pos: LoopPos, upgrade: UpgradeId },
    /// Buy the next level of an in-run research.
    BuyRunUpgrade { upgrade: RunUpgrade },

    // --- Simulation control ---
    /// Set the game speed multiplier.
    SetGameSpeed { speed: f64 },
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}

/// Everything a run needs from meta-progression, fixed at run start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSetup {
    pub mode: GameMode,
    /// Equipped buildings, in loadout order.
    pub loadout: Vec<BuildingKind>,
    pub starting_energy: f64,
    /// Percent bonus applied to the xp worth of the run.
    pub xp_bonus_pct: f64,
    /// Hub research level reducing the sell cooldown.
    pub sell_cooldown_level: u32,
    /// Highest game speed the player may select (0 = locked at 1×).
    pub max_speed: f64,
    /// Discount multiplier applied on top of the cost factor.
    pub cost_multiplier: f64,
}

impl Default for RunSetup {
    fn default() -> Self {
        Self {
            mode: GameMode::Standard,
            loadout: vec![
                BuildingKind::Beamer,
                BuildingKind::Plasma,
                BuildingKind::Freezer,
                BuildingKind::Energizer,
            ],
            starting_energy: BASE_STARTING_ENERGY,
            xp_bonus_pct: 0.0,
            sell_cooldown_level: 0,
            max_speed: 0.0,
            cost_multiplier: 1.0,
        }
    }
}
