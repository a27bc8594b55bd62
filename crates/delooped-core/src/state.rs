//! Run snapshot: the complete visible state handed to the frontend each tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{EnemyId, LoopPos, ResourceMap, SimTime};

/// Complete run state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub time: SimTime,
    pub game_state: GameState,
    pub mode: GameMode,
    pub cycle: u32,
    pub cycle_progress: f64,
    pub health: f64,
    pub stress: f64,
    pub game_speed: f64,
    pub paused: bool,
    /// Elapsed run seconds.
    pub lifetime: f64,
    pub resources: ResourceMap,
    pub resource_totals: ResourceMap,
    pub sell_cooldown: f64,
    pub selected_building: Option<BuildingKind>,
    pub selected_loop: Option<LoopPos>,
    /// Price of the next purchase of each loadout building.
    #[serde(default)]
    pub building_costs: BTreeMap<BuildingKind, ResourceMap>,
    pub loops: Vec<LoopView>,
    /// Transient building→enemy links for drawing.
    pub connections: Vec<ConnectionView>,
    pub events: Vec<SimEvent>,
}

/// One loop on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopView {
    pub pos: LoopPos,
    pub building: Option<BuildingView>,
    pub enemies: Vec<EnemyView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingView {
    pub kind: BuildingKind,
    pub upgrades: BTreeMap<UpgradeId, u32>,
    /// Charge/timer progress in `[0, 1]` when the building exposes one.
    pub progress: Option<f64>,
    pub sell_value: ResourceMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub angle: f64,
    pub speed: f64,
    pub health: f64,
    pub max_health: f64,
    pub effects: Vec<EffectKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionView {
    pub from: LoopPos,
    pub enemy: EnemyId,
    pub remaining: f64,
}
