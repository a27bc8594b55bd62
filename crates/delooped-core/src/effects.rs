//! Enemy status effects: application rules, movement and damage multipliers,
//! and timed decay.
//!
//! Effect durations are measured in ring distance, not seconds: they tick
//! down by the absolute distance the enemy travels.

use crate::components::Enemy;
use crate::constants::*;
use crate::enums::EffectKind;

pub fn has(enemy: &Enemy, kind: EffectKind) -> bool {
    enemy.effects.contains_key(&kind)
}

/// Apply `kind` for `duration`, keeping the longer of the old and new
/// remaining durations.
///
/// Freeze and blaze cancel each other unless the enemy carries duality.
pub fn apply(enemy: &mut Enemy, kind: EffectKind, duration: f64) {
    if duration <= 0.0 {
        return;
    }
    if !has(enemy, EffectKind::Duality) {
        match kind {
            EffectKind::Freeze => {
                enemy.effects.remove(&EffectKind::Blaze);
            }
            EffectKind::Blaze => {
                enemy.effects.remove(&EffectKind::Freeze);
            }
            EffectKind::Decay | EffectKind::Duality => {}
        }
    }
    let slot = enemy.effects.entry(kind).or_insert(0.0);
    *slot = slot.max(duration);
}

/// Multiplier on the enemy's angular increment. Freeze applies first, then blaze.
pub fn movement_multiplier(enemy: &Enemy) -> f64 {
    let mut factor = 1.0;
    if has(enemy, EffectKind::Freeze) {
        factor *= FREEZE_MOVE_FACTOR;
    }
    if has(enemy, EffectKind::Blaze) {
        factor *= BLAZE_MOVE_FACTOR;
    }
    factor
}

/// Multiplier on damage taken: decay ×2, blaze ×4, both ×8.
pub fn damage_multiplier(enemy: &Enemy) -> f64 {
    let mut factor = 1.0;
    if has(enemy, EffectKind::Decay) {
        factor *= DECAY_DAMAGE_FACTOR;
    }
    if has(enemy, EffectKind::Blaze) {
        factor *= BLAZE_DAMAGE_FACTOR;
    }
    factor
}

/// Deal `damage` to `enemy` after status multipliers. Returns the damage dealt.
pub fn deal_damage(enemy: &mut Enemy, damage: f64) -> f64 {
    let dealt = damage * damage_multiplier(enemy);
    enemy.health -= dealt;
    dealt
}

/// Tick every effect down by `distance` and drop the ones that ran out.
pub fn decay(enemy: &mut Enemy, distance: f64) {
    let distance = distance.abs();
    enemy.effects.retain(|_, remaining| {
        *remaining -= distance;
        *remaining > 0.0
    });
}
