//! Objective tables: leveled counters with polynomial goals, and the binary
//! special objectives raised by the simulation.

use serde::{Deserialize, Serialize};

use delooped_core::enums::{BuildingKind, SpecialObjective};

/// Leveled objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveId {
    StandardCycle,
    BoostedCycle,
    HardcoreCycle,
    UpgradeCount,
    CapsuleCount,
    TotalXp,
    BestEnergy,
    BestInfo,
    BestTime,
    Meta,
}

impl ObjectiveId {
    pub const ALL: [ObjectiveId; 10] = [
        ObjectiveId::StandardCycle,
        ObjectiveId::BoostedCycle,
        ObjectiveId::HardcoreCycle,
        ObjectiveId::UpgradeCount,
        ObjectiveId::CapsuleCount,
        ObjectiveId::TotalXp,
        ObjectiveId::BestEnergy,
        ObjectiveId::BestInfo,
        ObjectiveId::BestTime,
        ObjectiveId::Meta,
    ];
}

/// Currency paid for a completed level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum Reward {
    Xp(f64),
    Capsules(u64),
}

/// Static description of a leveled objective.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveDef {
    pub id: ObjectiveId,
    pub name: &'static str,
    /// Counter value needed to complete `level`.
    pub goal: fn(u32) -> f64,
    /// Currency paid for completing `level`.
    pub reward: fn(u32) -> Reward,
    /// Levels that unlock a building instead of paying currency.
    pub exclusive: &'static [(u32, BuildingKind)],
}

impl ObjectiveDef {
    /// Building unlocked instead of the currency reward at `level`.
    pub fn exclusive_at(&self, level: u32) -> Option<BuildingKind> {
        self.exclusive
            .iter()
            .find(|(at, _)| *at == level)
            .map(|(_, kind)| *kind)
    }
}

/// x(x+1)(x+2), the tetrahedral growth most objectives share.
fn tri(x: u32) -> f64 {
    let x = x as f64;
    x * (x + 1.0) * (x + 2.0)
}

fn cycle_goal(x: u32) -> f64 {
    10.0 + 5.0 * x as f64
}

fn upgrade_goal(x: u32) -> f64 {
    3.0 + 2.0 * x as f64
}

fn capsule_goal(x: u32) -> f64 {
    let x = x as f64;
    10.0 + 4.0 * x + x * (x + 1.0) / 2.0 + (x * x * x / 32.0).floor()
}

fn xp_goal(x: u32) -> f64 {
    500.0 + tri(x) * 250.0
}

fn energy_goal(x: u32) -> f64 {
    10_000.0 + tri(x) * 500.0
}

fn info_goal(x: u32) -> f64 {
    1_000.0 + tri(x) * 50.0
}

fn time_goal(x: u32) -> f64 {
    let x = x as f64;
    300.0 + 80.0 * x + 20.0 * x * x
}

fn meta_goal(x: u32) -> f64 {
    let x = x as f64;
    20.0 + 4.0 * x + x * (x + 1.0) / 2.0
}

fn standard_reward(x: u32) -> Reward {
    Reward::Xp(10.0 + tri(x) / 6.0)
}

fn boosted_reward(x: u32) -> Reward {
    Reward::Xp(12.0 + tri(x) / 3.0)
}

fn hardcore_reward(x: u32) -> Reward {
    Reward::Xp(15.0 + tri(x) / 2.0)
}

fn half_level_capsules(x: u32) -> Reward {
    Reward::Capsules(3 + x as u64 / 2)
}

fn capsule_reward(x: u32) -> Reward {
    Reward::Xp(50.0 + 4.0 * x as f64 + tri(x) / 6.0)
}

fn energy_reward(x: u32) -> Reward {
    Reward::Xp(20.0 + tri(x) * 1.5)
}

fn info_reward(x: u32) -> Reward {
    Reward::Xp(40.0 + tri(x) * 2.5)
}

fn time_reward(x: u32) -> Reward {
    Reward::Xp(40.0 + tri(x))
}

fn meta_reward(x: u32) -> Reward {
    Reward::Capsules(3 + x as u64 / 3)
}

static STANDARD_EXCLUSIVE: [(u32, BuildingKind); 2] =
    [(3, BuildingKind::Splitter), (6, BuildingKind::Stunner)];
static BOOSTED_EXCLUSIVE: [(u32, BuildingKind); 1] = [(3, BuildingKind::Decayer)];
static HARDCORE_EXCLUSIVE: [(u32, BuildingKind); 1] = [(3, BuildingKind::Igniter)];
static UPGRADE_EXCLUSIVE: [(u32, BuildingKind); 2] =
    [(6, BuildingKind::Overclocker), (9, BuildingKind::Sharpener)];
static ENERGY_EXCLUSIVE: [(u32, BuildingKind); 1] = [(3, BuildingKind::Multiplier)];
static INFO_EXCLUSIVE: [(u32, BuildingKind); 1] = [(3, BuildingKind::Thinker)];
static NO_EXCLUSIVE: [(u32, BuildingKind); 0] = [];

fn def(
    id: ObjectiveId,
    name: &'static str,
    goal: fn(u32) -> f64,
    reward: fn(u32) -> Reward,
    exclusive: &'static [(u32, BuildingKind)],
) -> ObjectiveDef {
    ObjectiveDef {
        id,
        name,
        goal,
        reward,
        exclusive,
    }
}

pub fn get_objective(id: ObjectiveId) -> ObjectiveDef {
    match id {
        ObjectiveId::StandardCycle => def(
            id,
            "First Cycle",
            cycle_goal,
            standard_reward,
            &STANDARD_EXCLUSIVE[..],
        ),
        ObjectiveId::BoostedCycle => def(
            id,
            "Second Cycle",
            cycle_goal,
            boosted_reward,
            &BOOSTED_EXCLUSIVE[..],
        ),
        ObjectiveId::HardcoreCycle => def(
            id,
            "Third Cycle",
            cycle_goal,
            hardcore_reward,
            &HARDCORE_EXCLUSIVE[..],
        ),
        ObjectiveId::UpgradeCount => def(
            id,
            "Not Really a Fair Game",
            upgrade_goal,
            half_level_capsules,
            &UPGRADE_EXCLUSIVE[..],
        ),
        ObjectiveId::CapsuleCount => def(
            id,
            "Is This P2W?",
            capsule_goal,
            capsule_reward,
            &NO_EXCLUSIVE[..],
        ),
        ObjectiveId::TotalXp => def(
            id,
            "Look how much you've grown!",
            xp_goal,
            half_level_capsules,
            &NO_EXCLUSIVE[..],
        ),
        ObjectiveId::BestEnergy => def(
            id,
            "Power Player",
            energy_goal,
            energy_reward,
            &ENERGY_EXCLUSIVE[..],
        ),
        ObjectiveId::BestInfo => def(id, "Knowledged Looper", info_goal, info_reward, &INFO_EXCLUSIVE[..]),
        ObjectiveId::BestTime => def(id, "Marathoner", time_goal, time_reward, &NO_EXCLUSIVE[..]),
        ObjectiveId::Meta => def(
            id,
            "Very Creative Objective",
            meta_goal,
            meta_reward,
            &NO_EXCLUSIVE[..],
        ),
    }
}

/// Building unlocked by claiming a special objective.
pub fn special_reward(objective: SpecialObjective) -> BuildingKind {
    match objective {
        SpecialObjective::Anxiety => BuildingKind::Stabilizer,
        SpecialObjective::Stucked => BuildingKind::Pins,
        SpecialObjective::Wysi => BuildingKind::Pagoda,
    }
}
