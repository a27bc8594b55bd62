//! Persistent hub state and every action the hub menus perform on it.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use delooped_buildings::get_def;
use delooped_core::commands::RunSetup;
use delooped_core::constants::BASE_STARTING_ENERGY;
use delooped_core::enums::*;
use delooped_core::events::RunStats;

use crate::capsules::{self, CoreId};
use crate::error::HubError;
use crate::objectives::{self, ObjectiveId, Reward};
use crate::research::{self, ResearchId};

/// Buildings every profile starts with, in loadout order.
pub const STARTER_BUILDINGS: [BuildingKind; 4] = [
    BuildingKind::Beamer,
    BuildingKind::Plasma,
    BuildingKind::Freezer,
    BuildingKind::Energizer,
];

/// Hub menus that must be bought before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Collection,
    Research,
    Objectives,
    Capsules,
}

/// Price of a hub feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureCost {
    Xp(f64),
    Capsules(u64),
}

impl Feature {
    pub fn cost(self) -> FeatureCost {
        match self {
            Feature::Collection => FeatureCost::Xp(0.0),
            Feature::Research => FeatureCost::Xp(250.0),
            Feature::Objectives => FeatureCost::Xp(0.0),
            Feature::Capsules => FeatureCost::Capsules(1),
        }
    }
}

/// Claim state of a special objective. Absent means not yet triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialStatus {
    Claimable,
    Claimed,
}

/// Everything that persists between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubState {
    pub xp: f64,
    /// Xp ever earned, spent or not.
    pub xp_total: f64,
    pub capsules: u64,
    /// Accrued capsules not yet claimed.
    pub pending_capsules: f64,
    pub selected_mode: GameMode,
    pub best_cycle: BTreeMap<GameMode, u32>,
    /// Best per-run lifetime totals.
    pub best_totals: BTreeMap<ResourceId, f64>,
    /// Longest run, in seconds.
    pub best_time: f64,
    pub features: BTreeSet<Feature>,
    pub unlocked_buildings: BTreeSet<BuildingKind>,
    pub loadout: Vec<BuildingKind>,
    pub research: BTreeMap<ResearchId, u32>,
    /// Completed levels per objective.
    pub objectives: BTreeMap<ObjectiveId, u32>,
    pub specials: BTreeMap<SpecialObjective, SpecialStatus>,
    /// Opened capsules per core.
    pub cores: BTreeMap<CoreId, u32>,
}

impl Default for HubState {
    fn default() -> Self {
        Self {
            xp: 0.0,
            xp_total: 0.0,
            capsules: 0,
            pending_capsules: 0.0,
            selected_mode: GameMode::Standard,
            best_cycle: BTreeMap::new(),
            best_totals: BTreeMap::new(),
            best_time: 0.0,
            features: BTreeSet::new(),
            unlocked_buildings: STARTER_BUILDINGS.into_iter().collect(),
            loadout: STARTER_BUILDINGS.to_vec(),
            research: BTreeMap::new(),
            objectives: BTreeMap::new(),
            specials: BTreeMap::new(),
            cores: BTreeMap::new(),
        }
    }
}

impl HubState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Currencies ---

    fn earn_xp(&mut self, amount: f64) {
        self.xp += amount;
        self.xp_total += amount;
    }

    fn spend_xp(&mut self, cost: f64) -> Result<(), HubError> {
        if self.xp < cost {
            return Err(HubError::NotEnoughXp {
                need: cost,
                have: self.xp,
            });
        }
        self.xp -= cost;
        Ok(())
    }

    fn spend_capsules(&mut self, cost: u64) -> Result<(), HubError> {
        if self.capsules < cost {
            return Err(HubError::NotEnoughCapsules {
                need: cost,
                have: self.capsules,
            });
        }
        self.capsules -= cost;
        Ok(())
    }

    fn grant(&mut self, reward: Reward) {
        match reward {
            Reward::Xp(amount) => self.earn_xp(amount),
            Reward::Capsules(count) => self.capsules += count,
        }
    }

    // --- Features ---

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    fn require(&self, feature: Feature) -> Result<(), HubError> {
        if self.has_feature(feature) {
            Ok(())
        } else {
            Err(HubError::FeatureLocked(feature))
        }
    }

    pub fn unlock_feature(&mut self, feature: Feature) -> Result<(), HubError> {
        if self.has_feature(feature) {
            return Err(HubError::AlreadyUnlocked(feature));
        }
        match feature.cost() {
            FeatureCost::Xp(cost) => self.spend_xp(cost)?,
            FeatureCost::Capsules(cost) => self.spend_capsules(cost)?,
        }
        self.features.insert(feature);
        log::info!("hub feature unlocked: {feature:?}");
        Ok(())
    }

    // --- Research ---

    pub fn research_level(&self, id: ResearchId) -> u32 {
        self.research.get(&id).copied().unwrap_or(0)
    }

    pub fn buy_research(&mut self, id: ResearchId) -> Result<u32, HubError> {
        self.require(Feature::Research)?;
        if id.needs_capsules() {
            self.require(Feature::Capsules)?;
        }
        let level = self.research_level(id);
        let cost = research::research_cost(id, level).ok_or(HubError::ResearchMaxed(id))?;
        self.spend_xp(cost)?;
        self.research.insert(id, level + 1);
        log::debug!("research {id:?} -> level {}", level + 1);
        Ok(level + 1)
    }

    /// Research levels bought, all tracks together.
    pub fn research_count(&self) -> u32 {
        self.research.values().sum()
    }

    // --- Collection and loadout ---

    pub fn is_unlocked(&self, kind: BuildingKind) -> bool {
        self.unlocked_buildings.contains(&kind)
    }

    fn unlock_building(&mut self, kind: BuildingKind) {
        if self.unlocked_buildings.insert(kind) {
            log::info!("building unlocked: {kind:?}");
        }
    }

    pub fn loadout_capacity(&self) -> usize {
        research::BASE_LOADOUT_SLOTS + self.research_level(ResearchId::Inventory) as usize
    }

    pub fn equip(&mut self, kind: BuildingKind) -> Result<(), HubError> {
        self.require(Feature::Collection)?;
        if !self.is_unlocked(kind) {
            return Err(HubError::BuildingLocked(kind));
        }
        if self.loadout.contains(&kind) {
            return Err(HubError::AlreadyEquipped(kind));
        }
        let capacity = self.loadout_capacity();
        if self.loadout.len() >= capacity {
            return Err(HubError::LoadoutFull(capacity));
        }
        self.loadout.push(kind);
        Ok(())
    }

    pub fn unequip(&mut self, kind: BuildingKind) -> Result<(), HubError> {
        self.require(Feature::Collection)?;
        let index = self
            .loadout
            .iter()
            .position(|&k| k == kind)
            .ok_or(HubError::NotEquipped(kind))?;
        self.loadout.remove(index);
        Ok(())
    }

    // --- Run hand-off ---

    pub fn select_mode(&mut self, mode: GameMode) {
        self.selected_mode = mode;
    }

    pub fn best_cycle(&self, mode: GameMode) -> u32 {
        self.best_cycle.get(&mode).copied().unwrap_or(0)
    }

    pub fn core_level(&self, core: CoreId) -> u32 {
        self.cores.get(&core).copied().unwrap_or(0)
    }

    pub fn core_effect(&self, core: CoreId) -> f64 {
        core.effect(self.core_level(core))
    }

    pub fn starting_energy(&self) -> f64 {
        BASE_STARTING_ENERGY
            + research::START_ENERGY_PER_LEVEL * self.research_level(ResearchId::StartEnergy) as f64
            + self.core_effect(CoreId::Energy)
    }

    pub fn cost_multiplier(&self) -> f64 {
        self.core_effect(CoreId::Thrift)
    }

    /// A run needs an updating damager it can afford on the first tick.
    pub fn can_start(&self) -> bool {
        let budget = self.starting_energy();
        let discount = self.cost_multiplier();
        self.loadout.iter().any(|&kind| {
            let def = get_def(kind);
            def.is_damager() && def.has_update && def.base_cost * discount <= budget
        })
    }

    /// Everything the next run takes from the hub.
    pub fn run_setup(&self) -> Result<RunSetup, HubError> {
        if !self.can_start() {
            return Err(HubError::NoStartingDamager);
        }
        Ok(RunSetup {
            mode: self.selected_mode,
            loadout: self.loadout.clone(),
            starting_energy: self.starting_energy(),
            xp_bonus_pct: self.core_effect(CoreId::Xp),
            sell_cooldown_level: self.research_level(ResearchId::Decommission),
            max_speed: research::max_game_speed(self.research_level(ResearchId::SpeedManipulation)),
            cost_multiplier: self.cost_multiplier(),
        })
    }

    /// Apply the result of a finished run. Returns the xp granted.
    pub fn claim_run_reward(&mut self, stats: &RunStats) -> f64 {
        let xp = stats.xp_worth.max(0.0);
        self.earn_xp(xp);

        let best = self.best_cycle.entry(stats.mode).or_insert(0);
        *best = (*best).max(stats.cycle);
        for (&id, &total) in &stats.resource_totals {
            let best = self.best_totals.entry(id).or_insert(0.0);
            *best = best.max(total);
        }
        self.best_time = self.best_time.max(stats.lifetime);

        log::info!(
            "run reward: {xp:.2} xp, best {:?} cycle {}",
            stats.mode,
            self.best_cycle(stats.mode)
        );
        xp
    }

    // --- Objectives ---

    pub fn objective_level(&self, id: ObjectiveId) -> u32 {
        self.objectives.get(&id).copied().unwrap_or(0)
    }

    /// Current counter value an objective is measured against.
    pub fn objective_progress(&self, id: ObjectiveId) -> f64 {
        match id {
            ObjectiveId::StandardCycle => self.best_cycle(GameMode::Standard) as f64,
            ObjectiveId::BoostedCycle => self.best_cycle(GameMode::Boosted) as f64,
            ObjectiveId::HardcoreCycle => self.best_cycle(GameMode::Hardcore) as f64,
            ObjectiveId::UpgradeCount => self.research_count() as f64,
            ObjectiveId::CapsuleCount => self.cores.values().sum::<u32>() as f64,
            ObjectiveId::TotalXp => self.xp_total,
            ObjectiveId::BestEnergy => self.best_totals.get(&ResourceId::Energy).copied().unwrap_or(0.0),
            ObjectiveId::BestInfo => self.best_totals.get(&ResourceId::Info).copied().unwrap_or(0.0),
            ObjectiveId::BestTime => self.best_time,
            ObjectiveId::Meta => {
                let claimed_specials = self
                    .specials
                    .values()
                    .filter(|&&s| s == SpecialStatus::Claimed)
                    .count() as u32;
                (self.objectives.values().sum::<u32>() + claimed_specials) as f64
            }
        }
    }

    /// Consecutive levels whose goal is already met.
    pub fn claimable_levels(&self, id: ObjectiveId) -> u32 {
        let def = objectives::get_objective(id);
        let progress = self.objective_progress(id);
        let mut level = self.objective_level(id);
        let mut count = 0;
        while progress >= (def.goal)(level) {
            level += 1;
            count += 1;
        }
        count
    }

    /// Claim the next `levels` levels of an objective at once.
    pub fn claim_objective(&mut self, id: ObjectiveId, levels: u32) -> Result<(), HubError> {
        self.require(Feature::Objectives)?;
        if levels == 0 {
            return Err(HubError::NothingToClaim);
        }
        let def = objectives::get_objective(id);
        let start = self.objective_level(id);
        let last = start + levels - 1;
        if self.objective_progress(id) < (def.goal)(last) {
            return Err(HubError::GoalNotReached(id));
        }
        for level in start..=last {
            match def.exclusive_at(level) {
                Some(kind) => self.unlock_building(kind),
                None => self.grant((def.reward)(level)),
            }
            self.objectives.insert(id, level + 1);
        }
        log::debug!("objective {id:?} claimed up to level {}", last + 1);
        Ok(())
    }

    /// Mark a special objective as reached. Idempotent.
    pub fn trigger_special(&mut self, objective: SpecialObjective) {
        if !self.specials.contains_key(&objective) {
            log::info!("special objective reached: {objective:?}");
            self.specials.insert(objective, SpecialStatus::Claimable);
        }
    }

    pub fn claim_special(&mut self, objective: SpecialObjective) -> Result<BuildingKind, HubError> {
        self.require(Feature::Objectives)?;
        if self.specials.get(&objective) != Some(&SpecialStatus::Claimable) {
            return Err(HubError::SpecialNotClaimable(objective));
        }
        let kind = objectives::special_reward(objective);
        self.unlock_building(kind);
        self.specials.insert(objective, SpecialStatus::Claimed);
        Ok(kind)
    }

    /// Re-grant the buildings earned by already claimed objective levels,
    /// for profiles loaded from older saves.
    pub fn restore_unlocks(&mut self) {
        let mut earned = Vec::new();
        for id in ObjectiveId::ALL {
            let level = self.objective_level(id);
            let def = objectives::get_objective(id);
            earned.extend(
                def.exclusive
                    .iter()
                    .filter(|(at, _)| *at < level)
                    .map(|(_, kind)| *kind),
            );
        }
        for (&objective, &status) in &self.specials {
            if status == SpecialStatus::Claimed {
                earned.push(objectives::special_reward(objective));
            }
        }
        for kind in earned {
            self.unlock_building(kind);
        }
    }

    // --- Capsules ---

    pub fn capsule_interval(&self) -> f64 {
        capsules::capsule_interval(
            self.core_effect(CoreId::Capsules),
            self.research_level(ResearchId::CapsuleProductor),
        )
    }

    pub fn capsule_capacity(&self) -> f64 {
        capsules::capsule_capacity(
            self.core_effect(CoreId::Capacity),
            self.research_level(ResearchId::CapsuleStorage),
        )
    }

    /// Accrue capsules over `secs` of real time, up to capacity.
    pub fn accrue_capsules(&mut self, secs: f64) {
        if !self.has_feature(Feature::Capsules) {
            return;
        }
        let gained = secs.max(0.0) / self.capsule_interval();
        self.pending_capsules = (self.pending_capsules + gained).min(self.capsule_capacity());
    }

    /// Move the whole part of the pending capsules into the wallet.
    pub fn claim_capsules(&mut self) -> Result<u64, HubError> {
        self.require(Feature::Capsules)?;
        let whole = self.pending_capsules.floor();
        if whole < 1.0 {
            return Err(HubError::NothingToClaim);
        }
        self.pending_capsules -= whole;
        self.capsules += whole as u64;
        Ok(whole as u64)
    }

    /// Spend one capsule on a random core.
    pub fn open_capsule<R: Rng>(&mut self, rng: &mut R) -> Result<CoreId, HubError> {
        self.require(Feature::Capsules)?;
        self.spend_capsules(1)?;
        let core = capsules::roll_core(rng);
        *self.cores.entry(core).or_insert(0) += 1;
        log::debug!("capsule opened into {core:?}");
        Ok(core)
    }
}
