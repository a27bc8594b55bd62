use serde::{Deserialize, Serialize};

use delooped_core::constants::MAX_GAME_SPEED;

/// Starting energy granted per level of `StartEnergy`.
pub const START_ENERGY_PER_LEVEL: f64 = 25.0;

/// Loadout slots before any `Inventory` research.
pub const BASE_LOADOUT_SLOTS: usize = 6;

/// Repeatable hub research, paid in xp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchId {
    /// +25 starting energy.
    StartEnergy,
    /// +1 loadout slot.
    Inventory,
    /// Unlocks pausing, then faster game speeds.
    SpeedManipulation,
    /// −5 s sell cooldown.
    Decommission,
    /// +1 % capsule production.
    CapsuleProductor,
    /// +1 capsule capacity.
    CapsuleStorage,
}

impl ResearchId {
    pub const ALL: [ResearchId; 6] = [
        ResearchId::StartEnergy,
        ResearchId::Inventory,
        ResearchId::SpeedManipulation,
        ResearchId::Decommission,
        ResearchId::CapsuleProductor,
        ResearchId::CapsuleStorage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResearchId::StartEnergy => "Better Funding",
            ResearchId::Inventory => "Bigger Inventory",
            ResearchId::SpeedManipulation => "Speed Manipulation",
            ResearchId::Decommission => "Decommission Machine",
            ResearchId::CapsuleProductor => "Capsule Productor",
            ResearchId::CapsuleStorage => "Capsule Storage",
        }
    }

    /// Highest level that can be bought, if any.
    pub fn limit(self) -> Option<u32> {
        match self {
            ResearchId::StartEnergy => Some(9),
            ResearchId::Inventory => Some(8),
            ResearchId::SpeedManipulation => Some(4),
            ResearchId::Decommission => Some(10),
            ResearchId::CapsuleProductor | ResearchId::CapsuleStorage => None,
        }
    }

    /// Whether this research only shows once capsules are unlocked.
    pub fn needs_capsules(self) -> bool {
        matches!(
            self,
            ResearchId::CapsuleProductor | ResearchId::CapsuleStorage
        )
    }
}

/// Xp cost of the next level, or `None` at the limit.
pub fn research_cost(id: ResearchId, current_level: u32) -> Option<f64> {
    if id.limit().is_some_and(|limit| current_level >= limit) {
        return None;
    }
    let x = current_level as i32;
    let cost = match id {
        ResearchId::StartEnergy => 200.0 * 1.3f64.powi(x) - 200.0,
        ResearchId::Inventory => 300.0 * 1.6f64.powi(x),
        ResearchId::SpeedManipulation => 200.0 * 3f64.powi(x),
        ResearchId::Decommission => 200.0 * 1.4f64.powi(x),
        ResearchId::CapsuleProductor => 175.0 * 1.3f64.powi(x),
        ResearchId::CapsuleStorage => 200.0 * 1.6f64.powi(x),
    };
    Some(cost)
}

/// Highest selectable game speed for a `SpeedManipulation` level.
///
/// Level 0 locks the speed, level 1 only allows pausing (speeds in `[0, 1]`).
pub fn max_game_speed(level: u32) -> f64 {
    match level {
        0 => 0.0,
        1 => 1.0,
        n => (n as f64).min(MAX_GAME_SPEED),
    }
}
