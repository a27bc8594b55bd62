//! Board entities: loops, the enemies circulating on them and the buildings
//! placed on them.
//!
//! These are plain data structs. The persisted form is a tree: a loop owns
//! its building and its enemies by value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{BuildingKind, EffectKind, UpgradeId};
use crate::types::{EnemyId, ResourceMap};

/// A ring-shaped track node on the grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Loop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<Building>,
    /// Enemies currently on this ring. Order carries no meaning.
    #[serde(default)]
    pub enemies: Vec<Enemy>,
}

/// An enemy travelling around a loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    /// Position around the ring in `[0, 1)`, clockwise.
    pub angle: f64,
    /// Accumulated absolute distance travelled.
    pub lifetime: f64,
    /// Signed angular rate; the sign is the direction of travel.
    pub speed: f64,
    pub health: f64,
    pub max_health: f64,
    /// Remaining duration (in ring distance) per active effect.
    #[serde(default)]
    pub effects: BTreeMap<EffectKind, f64>,
    /// Resources paid out when this enemy is killed.
    #[serde(default)]
    pub loot: ResourceMap,
}

/// A structure placed on a loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    /// Purchased level per upgrade; missing entries are level 0.
    #[serde(default)]
    pub upgrades: BTreeMap<UpgradeId, u32>,
    /// Engine-private scratch state (charge progress, timers, use counters).
    #[serde(default)]
    pub data: BTreeMap<String, f64>,
    /// Refund paid out when the building is sold.
    #[serde(default)]
    pub sell_value: ResourceMap,
}

impl Enemy {
    pub fn new(id: EnemyId, angle: f64, speed: f64, health: f64, loot: ResourceMap) -> Self {
        Self {
            id,
            angle,
            lifetime: 0.0,
            speed,
            health,
            max_health: health,
            effects: BTreeMap::new(),
            loot,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

impl Building {
    pub fn new(kind: BuildingKind) -> Self {
        Self {
            kind,
            upgrades: BTreeMap::new(),
            data: BTreeMap::new(),
            sell_value: ResourceMap::new(),
        }
    }

    /// Purchased level of `upgrade` (0 when never bought).
    pub fn level(&self, upgrade: UpgradeId) -> u32 {
        self.upgrades.get(&upgrade).copied().unwrap_or(0)
    }

    /// Scratch value stored under `key` (0 when unset).
    pub fn datum(&self, key: &str) -> f64 {
        self.data.get(key).copied().unwrap_or(0.0)
    }

    pub fn set_datum(&mut self, key: &str, value: f64) {
        self.data.insert(key.to_string(), value);
    }
}

impl Loop {
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Index of the enemy with `id`, if it is still on this loop.
    pub fn position_of(&self, id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }
}
