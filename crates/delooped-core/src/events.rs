//! Events emitted by the simulation for the hub, UI and logging.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EnemyId, LoopPos, ResourceMap};

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    RunStarted { mode: GameMode },
    /// Cycle counter advanced; `forced` when the board was empty.
    CycleAdvanced { cycle: u32, forced: bool },
    WaveSpawned { cycle: u32, count: u32 },
    /// The grid grew by one loop.
    LoopSpawned { pos: LoopPos },
    EnemyKilled {
        id: EnemyId,
        pos: LoopPos,
        loot: ResourceMap,
    },
    EnemyTransferred {
        id: EnemyId,
        from: LoopPos,
        to: LoopPos,
    },
    BuildingPlaced { pos: LoopPos, kind: BuildingKind },
    BuildingSold {
        pos: LoopPos,
        kind: BuildingKind,
        refund: ResourceMap,
    },
    /// A building removed itself (e.g. spent trap).
    BuildingRemoved { pos: LoopPos, kind: BuildingKind },
    UpgradePurchased {
        pos: LoopPos,
        upgrade: UpgradeId,
        level: u32,
    },
    RunUpgradePurchased { upgrade: RunUpgrade, level: u32 },
    StuckDetected,
    SpecialTriggered { objective: SpecialObjective },
    RunEnded { stats: RunStats },
}

/// Final statistics of a finished run, consumed by the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub mode: GameMode,
    pub cycle: u32,
    /// Elapsed run seconds.
    pub lifetime: f64,
    /// Lifetime earned per resource.
    pub resource_totals: ResourceMap,
    pub reason: EndReason,
    pub xp_worth: f64,
}
