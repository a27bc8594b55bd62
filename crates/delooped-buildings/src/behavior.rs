//! Building behaviour callbacks.
//!
//! The engine lends a building and its loop's enemies to these functions.
//! Influence scaling is applied here, by each kind, before its numbers are
//! used. Side effects the engine must apply (self-removal, touched enemies
//! for link drawing) are reported through the [`BuildingContext`].

use rand::Rng;

use delooped_core::components::{Building, Enemy};
use delooped_core::effects;
use delooped_core::enums::{BuildingKind, EffectKind, InfluenceAttr, ResourceId, UpgradeId};
use delooped_core::types::EnemyId;

use crate::influence::Influence;
use crate::registry::get_def;

/// Seconds a stunner stays inert after discharging.
pub const STUNNER_COOLDOWN_SECS: f64 = 2.0;

/// Base freeze duration of a stunner discharge.
pub const STUNNER_FREEZE: f64 = 1.0;

const CHARGE: &str = "prg";
const COOLDOWN: &str = "cooldown";
const USED: &str = "used";

/// Per-call environment handed to building callbacks.
pub struct BuildingContext<'a, R: Rng> {
    pub rng: &'a mut R,
    pub influence: &'a Influence,
    next_enemy_id: &'a mut u64,
    touched: Vec<EnemyId>,
    remove_self: bool,
}

impl<'a, R: Rng> BuildingContext<'a, R> {
    pub fn new(rng: &'a mut R, influence: &'a Influence, next_enemy_id: &'a mut u64) -> Self {
        Self {
            rng,
            influence,
            next_enemy_id,
            touched: Vec::new(),
            remove_self: false,
        }
    }

    fn touch(&mut self, id: EnemyId) {
        self.touched.push(id);
    }

    fn alloc_id(&mut self) -> EnemyId {
        let id = EnemyId(*self.next_enemy_id);
        *self.next_enemy_id += 1;
        id
    }

    fn factor(&self, attr: InfluenceAttr) -> f64 {
        self.influence.factor(attr)
    }

    /// Enemies the building acted on during this call.
    pub fn touched(&self) -> &[EnemyId] {
        &self.touched
    }

    /// Whether the building asked to be removed from its loop.
    pub fn remove_self(&self) -> bool {
        self.remove_self
    }
}

/// Per-tick update. Only kinds with `has_update` do anything.
pub fn on_update<R: Rng>(
    building: &mut Building,
    enemies: &mut [Enemy],
    delta: f64,
    ctx: &mut BuildingContext<'_, R>,
) {
    let def = get_def(building.kind);
    match building.kind {
        BuildingKind::Beamer => {
            if enemies.is_empty() {
                building.set_datum(CHARGE, 0.0);
                return;
            }
            let interval = def.effect(building, UpgradeId::Interval);
            let mut charge = building.datum(CHARGE) + delta * ctx.factor(InfluenceAttr::Speed) / interval;
            if charge >= 1.0 {
                let target = ctx.rng.gen_range(0..enemies.len());
                let damage = def.effect(building, UpgradeId::Damage) * ctx.factor(InfluenceAttr::Damage);
                effects::deal_damage(&mut enemies[target], damage);
                ctx.touch(enemies[target].id);
                charge -= 1.0;
            }
            building.set_datum(CHARGE, charge);
        }
        BuildingKind::Plasma => {
            let damage = def.effect(building, UpgradeId::Damage) * ctx.factor(InfluenceAttr::Damage) * delta;
            for enemy in enemies.iter_mut() {
                effects::deal_damage(enemy, damage);
                ctx.touch(enemy.id);
            }
        }
        BuildingKind::Stunner => {
            let cooldown = building.datum(COOLDOWN);
            if cooldown > 0.0 {
                building.set_datum(COOLDOWN, (cooldown - delta).max(0.0));
                return;
            }
            let interval = def.effect(building, UpgradeId::Interval);
            let charge = (building.datum(CHARGE) + delta * ctx.factor(InfluenceAttr::Speed) / interval).min(1.0);
            if charge >= 1.0 && !enemies.is_empty() {
                let damage = def.effect(building, UpgradeId::Damage) * ctx.factor(InfluenceAttr::Damage);
                let freeze = STUNNER_FREEZE * ctx.factor(InfluenceAttr::Duration);
                for enemy in enemies.iter_mut() {
                    effects::deal_damage(enemy, damage);
                    effects::apply(enemy, EffectKind::Freeze, freeze);
                    ctx.touch(enemy.id);
                }
                building.set_datum(CHARGE, 0.0);
                building.set_datum(COOLDOWN, STUNNER_COOLDOWN_SECS);
            } else {
                building.set_datum(CHARGE, charge);
            }
        }
        BuildingKind::Energizer | BuildingKind::Thinker => {
            let resource = if building.kind == BuildingKind::Energizer {
                ResourceId::Energy
            } else {
                ResourceId::Info
            };
            let amount = def.effect(building, UpgradeId::Amount) * ctx.factor(InfluenceAttr::Amount) * delta;
            for enemy in enemies.iter_mut() {
                *enemy.loot.entry(resource).or_insert(0.0) += amount;
                ctx.touch(enemy.id);
            }
        }
        _ => {}
    }
}

/// Called when `enemies[index]` arrives on the building's loop, and for
/// every occupant when the building is placed.
pub fn on_enemy_enter<R: Rng>(
    building: &mut Building,
    enemies: &mut Vec<Enemy>,
    index: usize,
    ctx: &mut BuildingContext<'_, R>,
) {
    let def = get_def(building.kind);
    let Some(enemy) = enemies.get_mut(index) else {
        return;
    };
    match building.kind {
        BuildingKind::Pins => {
            let damage = def.effect(building, UpgradeId::Damage) * ctx.factor(InfluenceAttr::Damage);
            effects::deal_damage(enemy, damage);
            ctx.touch(enemy.id);
            let used = building.datum(USED) + 1.0;
            building.set_datum(USED, used);
            if used >= def.effect(building, UpgradeId::Uses) {
                ctx.remove_self = true;
            }
        }
        BuildingKind::Igniter => {
            let duration = def.effect(building, UpgradeId::Duration) * ctx.factor(InfluenceAttr::Duration);
            effects::apply(enemy, EffectKind::Blaze, duration);
            ctx.touch(enemy.id);
        }
        BuildingKind::Decayer => {
            let duration = def.effect(building, UpgradeId::Duration) * ctx.factor(InfluenceAttr::Duration);
            effects::apply(enemy, EffectKind::Decay, duration);
            ctx.touch(enemy.id);
        }
        BuildingKind::Pagoda => {
            let duration = def.effect(building, UpgradeId::Duration) * ctx.factor(InfluenceAttr::Duration);
            effects::apply(enemy, EffectKind::Duality, duration);
            ctx.touch(enemy.id);
        }
        BuildingKind::Splitter => {
            let threshold = def.effect(building, UpgradeId::Threshold) * ctx.factor(InfluenceAttr::Threshold);
            if enemy.health < threshold {
                return;
            }
            enemy.health /= 2.0;
            enemy.max_health /= 2.0;
            for amount in enemy.loot.values_mut() {
                *amount /= 2.0;
            }
            let mut clone = enemy.clone();
            let original = enemy.id;
            clone.id = ctx.alloc_id();
            clone.speed = -clone.speed;
            clone.lifetime = 0.0;
            ctx.touch(original);
            ctx.touch(clone.id);
            enemies.push(clone);
        }
        _ => {}
    }
}

/// Called with an enemy that just left the building's loop.
pub fn on_enemy_exit<R: Rng>(
    building: &mut Building,
    enemy: &mut Enemy,
    ctx: &mut BuildingContext<'_, R>,
) {
    let def = get_def(building.kind);
    if building.kind == BuildingKind::Freezer {
        let duration = def.effect(building, UpgradeId::Duration) * ctx.factor(InfluenceAttr::Duration);
        effects::apply(enemy, EffectKind::Freeze, duration);
        ctx.touch(enemy.id);
    }
}

/// Influence this building projects onto its orthogonal neighbours.
pub fn influences(building: &Building) -> Option<Influence> {
    let def = get_def(building.kind);
    let boost = def.effect(building, UpgradeId::Boost);
    let flu = match building.kind {
        BuildingKind::Sharpener => Influence::new().with(InfluenceAttr::Damage, boost),
        BuildingKind::Overclocker => Influence::new().with(InfluenceAttr::Speed, boost),
        BuildingKind::Multiplier => Influence::new().with(InfluenceAttr::Amount, boost),
        BuildingKind::Stabilizer => Influence::new()
            .with(InfluenceAttr::Duration, boost)
            .with(InfluenceAttr::Threshold, 0.9),
        _ => return None,
    };
    Some(flu)
}

/// Presentation hint in `[0, 1]` for kinds with a visible timer or counter.
pub fn progress(building: &Building) -> Option<f64> {
    match building.kind {
        BuildingKind::Beamer => Some(building.datum(CHARGE).clamp(0.0, 1.0)),
        BuildingKind::Stunner => {
            let cooldown = building.datum(COOLDOWN);
            if cooldown > 0.0 {
                Some(1.0 - cooldown / STUNNER_COOLDOWN_SECS)
            } else {
                Some(building.datum(CHARGE).clamp(0.0, 1.0))
            }
        }
        BuildingKind::Pins => {
            let uses = get_def(building.kind).effect(building, UpgradeId::Uses);
            Some((1.0 - building.datum(USED) / uses).clamp(0.0, 1.0))
        }
        _ => None,
    }
}
