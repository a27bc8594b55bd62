//! Enumeration types used throughout the simulation.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Run lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// No run has ever been started.
    #[default]
    New,
    /// A run is in progress.
    Started,
    /// The run has ended; summary pending.
    Stopped,
    /// Back at the hub after a finished run.
    Idle,
}

/// Game mode selected at the hub.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Standard rules.
    #[default]
    Standard,
    /// Harder enemies, faster health drain.
    Boosted,
    /// Hardest enemies, no speed changes, any stress is lethal.
    Hardcore,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Standard, GameMode::Boosted, GameMode::Hardcore];

    /// Health a run of this mode starts with.
    pub fn starting_health(self) -> f64 {
        match self {
            GameMode::Standard => 100.0,
            GameMode::Boosted => 50.0,
            GameMode::Hardcore => f64::EPSILON,
        }
    }

    /// Exponent applied to the cycle number in enemy scaling.
    pub fn enemy_exponent(self) -> f64 {
        match self {
            GameMode::Standard => 1.0,
            GameMode::Boosted => 1.1,
            GameMode::Hardcore => 1.2,
        }
    }

    /// Multiplier applied to the end-of-run xp worth.
    pub fn reward_multiplier(self) -> f64 {
        match self {
            GameMode::Standard => 1.0,
            GameMode::Boosted => 1.5,
            GameMode::Hardcore => 2.0,
        }
    }

    /// Whether the player may change game speed in this mode.
    pub fn allows_speed_change(self) -> bool {
        !matches!(self, GameMode::Hardcore)
    }
}

/// Spendable run resource.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceId {
    #[default]
    Energy,
    Info,
}

impl ResourceId {
    pub const ALL: [ResourceId; 2] = [ResourceId::Energy, ResourceId::Info];
}

/// Broad role of a building type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingClass {
    /// Deals damage to enemies.
    Damager,
    /// Applies status effects or otherwise alters enemies.
    Effector,
    /// Increases loot carried by enemies.
    Generator,
    /// Buffs buildings on adjacent loops.
    Influencer,
}

/// Building type, the key into the building registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Beamer,
    Plasma,
    Pins,
    Stunner,
    Freezer,
    Igniter,
    Decayer,
    Pagoda,
    Splitter,
    Energizer,
    Thinker,
    Sharpener,
    Overclocker,
    Multiplier,
    Stabilizer,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 15] = [
        BuildingKind::Beamer,
        BuildingKind::Plasma,
        BuildingKind::Pins,
        BuildingKind::Stunner,
        BuildingKind::Freezer,
        BuildingKind::Igniter,
        BuildingKind::Decayer,
        BuildingKind::Pagoda,
        BuildingKind::Splitter,
        BuildingKind::Energizer,
        BuildingKind::Thinker,
        BuildingKind::Sharpener,
        BuildingKind::Overclocker,
        BuildingKind::Multiplier,
        BuildingKind::Stabilizer,
    ];
}

/// Upgrade slot on a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    Damage,
    Interval,
    Duration,
    Amount,
    Uses,
    Threshold,
    Boost,
}

/// Attribute that influencer buildings scale on neighbouring loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceAttr {
    Damage,
    Speed,
    Amount,
    Threshold,
    Duration,
}

/// Transient status effect on an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Halves movement.
    Freeze,
    /// Doubles movement, quadruples damage taken.
    Blaze,
    /// Doubles damage taken.
    Decay,
    /// Lets freeze and blaze coexist.
    Duality,
}

/// Exit side of a loop, named after the boundary angle it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Angle 0 (wrap point), neighbour at +y.
    Bottom,
    /// Angle 0.25, neighbour at +x.
    Right,
    /// Angle 0.5, neighbour at -y.
    Top,
    /// Angle 0.75, neighbour at -x.
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Bottom,
        Direction::Right,
        Direction::Top,
        Direction::Left,
    ];

    /// Grid offset of the neighbour on this side.
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Bottom => IVec2::Y,
            Direction::Right => IVec2::X,
            Direction::Top => IVec2::NEG_Y,
            Direction::Left => IVec2::NEG_X,
        }
    }

    /// Angle of the ring boundary this side is attached to.
    pub fn boundary(self) -> f64 {
        match self {
            Direction::Bottom => 0.0,
            Direction::Right => 0.25,
            Direction::Top => 0.5,
            Direction::Left => 0.75,
        }
    }
}

/// Repeatable research bought during a run with info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunUpgrade {
    /// Raises the stress divisor by 1% per level.
    StressTolerance,
    /// Adds 1 energy to every spawned enemy's loot per level.
    EnemyEnergy,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    HealthDepleted,
    Stuck,
    Forfeit,
}

/// Binary objectives triggered by specific in-run conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialObjective {
    /// Stress reached 200%.
    Anxiety,
    /// The run softlocked itself.
    Stucked,
    /// Energy was exactly 727 at some point.
    Wysi,
}

impl SpecialObjective {
    pub const ALL: [SpecialObjective; 3] = [
        SpecialObjective::Anxiety,
        SpecialObjective::Stucked,
        SpecialObjective::Wysi,
    ];
}
