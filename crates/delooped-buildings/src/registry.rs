//! Static building catalog.
//!
//! Every kind has a fixed definition: display name and icon, class, base
//! cost and its upgrade tracks. Upgrade tracks map a purchased level to an
//! effect value and to the price of the next level.

use delooped_core::components::Building;
use delooped_core::enums::{BuildingClass, BuildingKind, ResourceId, UpgradeId};
use delooped_core::types::ResourceMap;

/// One upgrade track of a building kind.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeDef {
    pub id: UpgradeId,
    pub name: &'static str,
    /// Effect value at a purchased level.
    pub effect: fn(u32) -> f64,
    /// Energy price of buying the level after `level`.
    pub cost: fn(u32) -> f64,
    /// Purchases are allowed while `level < max - 1`.
    pub max: Option<u32>,
}

impl UpgradeDef {
    pub fn cost_map(&self, level: u32) -> ResourceMap {
        energy((self.cost)(level))
    }

    /// Whether another level may be bought on top of `level`.
    pub fn can_buy(&self, level: u32) -> bool {
        match self.max {
            Some(max) => level + 1 < max,
            None => true,
        }
    }
}

/// Static definition of a building kind.
#[derive(Debug, Clone, Copy)]
pub struct BuildingDef {
    pub kind: BuildingKind,
    pub name: &'static str,
    pub icon: &'static str,
    pub class: BuildingClass,
    /// Energy price before cost factors.
    pub base_cost: f64,
    pub upgrades: &'static [UpgradeDef],
    /// Whether the kind acts on its own every tick.
    pub has_update: bool,
    pub sellable: bool,
}

impl BuildingDef {
    pub fn base_cost_map(&self) -> ResourceMap {
        energy(self.base_cost)
    }

    pub fn upgrade(&self, id: UpgradeId) -> Option<&'static UpgradeDef> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    /// Effect of `id` at the building's current level. Kinds without that
    /// track yield 0.
    pub fn effect(&self, building: &Building, id: UpgradeId) -> f64 {
        self.upgrade(id)
            .map(|u| (u.effect)(building.level(id)))
            .unwrap_or(0.0)
    }

    pub fn is_damager(&self) -> bool {
        self.class == BuildingClass::Damager
    }
}

fn energy(amount: f64) -> ResourceMap {
    let mut map = ResourceMap::new();
    map.insert(ResourceId::Energy, amount);
    map
}

fn lvl(x: u32) -> f64 {
    x as f64
}

static BEAMER_UPGRADES: [UpgradeDef; 2] = [
    UpgradeDef {
        id: UpgradeId::Damage,
        name: "Damage",
        effect: |x| 10.0 + 2.0 * lvl(x),
        cost: |x| 50.0 * 1.2f64.powf(lvl(x)),
        max: None,
    },
    UpgradeDef {
        id: UpgradeId::Interval,
        name: "Interval",
        effect: |x| 2.0 * 0.9f64.powf(lvl(x)),
        cost: |x| 50.0 * 1.3f64.powf(lvl(x)),
        max: Some(15),
    },
];

static PLASMA_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Damage,
    name: "Damage",
    effect: |x| 3.0 + lvl(x),
    cost: |x| 200.0 * 1.2f64.powf(lvl(x)),
    max: None,
}];

static PINS_UPGRADES: [UpgradeDef; 2] = [
    UpgradeDef {
        id: UpgradeId::Damage,
        name: "Damage",
        effect: |x| 25.0 + 5.0 * lvl(x),
        cost: |x| 40.0 * 1.2f64.powf(lvl(x)),
        max: None,
    },
    UpgradeDef {
        id: UpgradeId::Uses,
        name: "Uses",
        effect: |x| 5.0 + lvl(x),
        cost: |x| 60.0 * 1.25f64.powf(lvl(x)),
        max: None,
    },
];

static STUNNER_UPGRADES: [UpgradeDef; 2] = [
    UpgradeDef {
        id: UpgradeId::Interval,
        name: "Charge",
        effect: |x| 5.0 * 0.92f64.powf(lvl(x)),
        cost: |x| 150.0 * 1.3f64.powf(lvl(x)),
        max: Some(20),
    },
    UpgradeDef {
        id: UpgradeId::Damage,
        name: "Damage",
        effect: |x| 8.0 + 2.0 * lvl(x),
        cost: |x| 150.0 * 1.25f64.powf(lvl(x)),
        max: None,
    },
];

static FREEZER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Duration,
    name: "Duration",
    effect: |x| 2.0 + 0.4 * lvl(x),
    cost: |x| 300.0 * 1.4f64.powf(lvl(x)),
    max: None,
}];

static IGNITER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Duration,
    name: "Duration",
    effect: |x| 1.0 + 0.25 * lvl(x),
    cost: |x| 250.0 * 1.4f64.powf(lvl(x)),
    max: None,
}];

static DECAYER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Duration,
    name: "Duration",
    effect: |x| 3.0 + 0.5 * lvl(x),
    cost: |x| 200.0 * 1.4f64.powf(lvl(x)),
    max: None,
}];

static PAGODA_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Duration,
    name: "Duration",
    effect: |x| 4.0 + lvl(x),
    cost: |x| 300.0 * 1.5f64.powf(lvl(x)),
    max: None,
}];

static SPLITTER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Threshold,
    name: "Threshold",
    effect: |x| 8.0 * 0.85f64.powf(lvl(x)),
    cost: |x| 300.0 * 1.5f64.powf(lvl(x)),
    max: Some(10),
}];

static ENERGIZER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Amount,
    name: "Amount",
    effect: |x| 4.0 + lvl(x) * (lvl(x) + 1.0),
    cost: |x| 400.0 * 3f64.powf(lvl(x)),
    max: None,
}];

static THINKER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Amount,
    name: "Amount",
    effect: |x| 0.5 + 0.25 * lvl(x),
    cost: |x| 300.0 * 1.5f64.powf(lvl(x)),
    max: None,
}];

static SHARPENER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Boost,
    name: "Boost",
    effect: |x| 1.25 + 0.05 * lvl(x),
    cost: |x| 200.0 * 1.5f64.powf(lvl(x)),
    max: None,
}];

static OVERCLOCKER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Boost,
    name: "Boost",
    effect: |x| 1.2 + 0.05 * lvl(x),
    cost: |x| 200.0 * 1.5f64.powf(lvl(x)),
    max: None,
}];

static MULTIPLIER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Boost,
    name: "Boost",
    effect: |x| 1.5 + 0.1 * lvl(x),
    cost: |x| 300.0 * 1.6f64.powf(lvl(x)),
    max: None,
}];

static STABILIZER_UPGRADES: [UpgradeDef; 1] = [UpgradeDef {
    id: UpgradeId::Boost,
    name: "Boost",
    effect: |x| 1.3 + 0.1 * lvl(x),
    cost: |x| 300.0 * 1.6f64.powf(lvl(x)),
    max: None,
}];

/// Get the definition of a building kind.
pub fn get_def(kind: BuildingKind) -> BuildingDef {
    use BuildingClass::*;

    let (name, icon, class, base_cost, upgrades, has_update): (
        &'static str,
        &'static str,
        BuildingClass,
        f64,
        &'static [UpgradeDef],
        bool,
    ) = match kind {
        BuildingKind::Beamer => ("Beamer", "💠", Damager, 100.0, &BEAMER_UPGRADES[..], true),
        BuildingKind::Plasma => ("Plasma", "🔺", Damager, 400.0, &PLASMA_UPGRADES[..], true),
        BuildingKind::Pins => ("Pins", "📌", Damager, 80.0, &PINS_UPGRADES[..], false),
        BuildingKind::Stunner => ("Stunner", "⚡", Damager, 350.0, &STUNNER_UPGRADES[..], true),
        BuildingKind::Freezer => ("Freezer", "❄️", Effector, 500.0, &FREEZER_UPGRADES[..], false),
        BuildingKind::Igniter => ("Igniter", "🔥", Effector, 450.0, &IGNITER_UPGRADES[..], false),
        BuildingKind::Decayer => ("Decayer", "☣️", Effector, 350.0, &DECAYER_UPGRADES[..], false),
        BuildingKind::Pagoda => ("Pagoda", "⛩️", Effector, 600.0, &PAGODA_UPGRADES[..], false),
        BuildingKind::Splitter => ("Splitter", "✂️", Effector, 550.0, &SPLITTER_UPGRADES[..], false),
        BuildingKind::Energizer => {
            ("Energizer", "🔋", Generator, 200.0, &ENERGIZER_UPGRADES[..], true)
        }
        BuildingKind::Thinker => ("Thinker", "💡", Generator, 300.0, &THINKER_UPGRADES[..], true),
        BuildingKind::Sharpener => {
            ("Sharpener", "🗡️", Influencer, 300.0, &SHARPENER_UPGRADES[..], false)
        }
        BuildingKind::Overclocker => {
            ("Overclocker", "⏩", Influencer, 300.0, &OVERCLOCKER_UPGRADES[..], false)
        }
        BuildingKind::Multiplier => {
            ("Multiplier", "✖️", Influencer, 400.0, &MULTIPLIER_UPGRADES[..], false)
        }
        BuildingKind::Stabilizer => {
            ("Stabilizer", "⚖️", Influencer, 450.0, &STABILIZER_UPGRADES[..], false)
        }
    };

    BuildingDef {
        kind,
        name,
        icon,
        class,
        base_cost,
        upgrades,
        has_update,
        sellable: kind != BuildingKind::Pins,
    }
}
