//! Run economy: building prices, placement, selling, upgrades, in-run
//! research and game speed.

use rand::Rng;

use delooped_buildings::get_def;
use delooped_core::components::Building;
use delooped_core::constants::*;
use delooped_core::enums::*;
use delooped_core::events::SimEvent;
use delooped_core::types::{LoopPos, ResourceMap};

use crate::connections::Connections;
use crate::error::ActionError;
use crate::run_state::RunState;
use crate::systems::combat;

fn require_running(run: &RunState) -> Result<(), ActionError> {
    if run.is_running() {
        Ok(())
    } else {
        Err(ActionError::NoRunActive)
    }
}

/// Price multiplier for the next `kind` bought this run.
pub fn cost_factor(run: &RunState, kind: BuildingKind) -> f64 {
    let owned = run.building_factor + run.building_factors.get(&kind).copied().unwrap_or(0);
    let discount = run.setup.as_ref().map(|s| s.cost_multiplier).unwrap_or(1.0);
    COST_FACTOR_BASE.powi(owned as i32) * discount
}

/// Resources the next `kind` bought this run would cost.
pub fn next_price(run: &RunState, kind: BuildingKind) -> ResourceMap {
    let factor = cost_factor(run, kind);
    get_def(kind)
        .base_cost_map()
        .into_iter()
        .map(|(id, amount)| (id, amount * factor))
        .collect()
}

pub fn can_afford_building(run: &RunState, kind: BuildingKind) -> bool {
    run.ledger
        .can_afford(&get_def(kind).base_cost_map(), cost_factor(run, kind))
}

fn claim_cost_factor(run: &mut RunState, kind: BuildingKind) {
    run.building_factor += 1;
    *run.building_factors.entry(kind).or_insert(0) += 1;
}

/// Undo one purchase's contribution to the cost factors.
pub fn release_cost_factor(run: &mut RunState, kind: BuildingKind) {
    run.building_factor = run.building_factor.saturating_sub(1);
    if let Some(count) = run.building_factors.get_mut(&kind) {
        *count = count.saturating_sub(1);
    }
}

pub fn select_building(run: &mut RunState, kind: Option<BuildingKind>) -> Result<(), ActionError> {
    require_running(run)?;
    if let Some(kind) = kind {
        if !run.loadout().contains(&kind) {
            return Err(ActionError::NotInLoadout(kind));
        }
    }
    run.selected_building = kind;
    Ok(())
}

pub fn select_loop(run: &mut RunState, pos: Option<LoopPos>) -> Result<(), ActionError> {
    require_running(run)?;
    if let Some(pos) = pos {
        if !run.loops.contains_key(&pos) {
            return Err(ActionError::NoSuchLoop(pos));
        }
    }
    run.selected_loop = pos;
    Ok(())
}

/// Commit the selected building onto the selected loop.
///
/// An unaffordable pick clears the building selection and an occupied loop
/// clears the loop selection.
pub fn place_on_selected_loop<R: Rng>(
    run: &mut RunState,
    rng: &mut R,
    connections: &mut Connections,
    events: &mut Vec<SimEvent>,
) -> Result<(), ActionError> {
    require_running(run)?;
    let Some(kind) = run.selected_building else {
        return Err(ActionError::NothingSelected);
    };
    if !can_afford_building(run, kind) {
        run.selected_building = None;
        return Err(ActionError::InsufficientResources);
    }
    let Some(pos) = run.selected_loop else {
        return Err(ActionError::NothingSelected);
    };
    let occupied = match run.loops.get(&pos) {
        Some(lp) => lp.building.is_some(),
        None => {
            run.selected_loop = None;
            return Err(ActionError::NoSuchLoop(pos));
        }
    };
    if occupied {
        run.selected_loop = None;
        return Err(ActionError::LoopOccupied(pos));
    }

    let factor = cost_factor(run, kind);
    let charged = run.ledger.spend(&get_def(kind).base_cost_map(), factor);
    let mut building = Building::new(kind);
    building.sell_value = charged
        .iter()
        .map(|(&id, &amount)| (id, amount * PLACEMENT_REFUND_RATIO))
        .collect();
    if let Some(lp) = run.loops.get_mut(&pos) {
        lp.building = Some(building);
    }
    claim_cost_factor(run, kind);
    run.selected_building = None;

    log::debug!("placed {kind:?} on {pos} for {charged:?}");
    events.push(SimEvent::BuildingPlaced { pos, kind });
    combat::enter_occupants(run, pos, rng, connections, events);
    Ok(())
}

/// Sell the building on `pos` for its accumulated sell value.
pub fn sell_building(
    run: &mut RunState,
    pos: LoopPos,
    events: &mut Vec<SimEvent>,
) -> Result<(), ActionError> {
    require_running(run)?;
    let lp = run.loops.get(&pos).ok_or(ActionError::NoSuchLoop(pos))?;
    let kind = lp.building.as_ref().ok_or(ActionError::NoBuilding(pos))?.kind;
    if !get_def(kind).sellable {
        return Err(ActionError::NotSellable(kind));
    }
    if run.sell_cooldown > 0.0 {
        return Err(ActionError::SellOnCooldown(run.sell_cooldown));
    }

    let refund: ResourceMap = run
        .loops
        .get_mut(&pos)
        .and_then(|lp| lp.building.take())
        .map(|b| b.sell_value)
        .unwrap_or_default();
    run.ledger.refund_all(&refund);
    release_cost_factor(run, kind);
    let level = run.setup.as_ref().map(|s| s.sell_cooldown_level).unwrap_or(0);
    run.sell_cooldown = (SELL_COOLDOWN_SECS - SELL_COOLDOWN_PER_LEVEL * level as f64).max(0.0);

    log::debug!("sold {kind:?} on {pos} for {refund:?}");
    events.push(SimEvent::BuildingSold { pos, kind, refund });
    Ok(())
}

/// Buy the next level of `upgrade` on the building at `pos`.
pub fn buy_upgrade(
    run: &mut RunState,
    pos: LoopPos,
    upgrade: UpgradeId,
    events: &mut Vec<SimEvent>,
) -> Result<(), ActionError> {
    require_running(run)?;
    let lp = run.loops.get(&pos).ok_or(ActionError::NoSuchLoop(pos))?;
    let building = lp.building.as_ref().ok_or(ActionError::NoBuilding(pos))?;
    let def = get_def(building.kind)
        .upgrade(upgrade)
        .ok_or(ActionError::UnknownUpgrade(building.kind, upgrade))?;
    let level = building.level(upgrade);
    if !def.can_buy(level) {
        return Err(ActionError::UpgradeMaxed(upgrade));
    }
    let cost = def.cost_map(level);
    if !run.ledger.can_afford(&cost, 1.0) {
        return Err(ActionError::InsufficientResources);
    }

    let charged = run.ledger.spend(&cost, 1.0);
    if let Some(building) = run.loops.get_mut(&pos).and_then(|lp| lp.building.as_mut()) {
        building.upgrades.insert(upgrade, level + 1);
        for (id, amount) in charged {
            *building.sell_value.entry(id).or_insert(0.0) += amount * UPGRADE_REFUND_RATIO;
        }
    }
    events.push(SimEvent::UpgradePurchased {
        pos,
        upgrade,
        level: level + 1,
    });
    Ok(())
}

/// Info price of the next level of an in-run research.
pub fn run_upgrade_cost(upgrade: RunUpgrade, level: u32) -> f64 {
    let base: f64 = match upgrade {
        RunUpgrade::StressTolerance => 1.1,
        RunUpgrade::EnemyEnergy => 1.15,
    };
    50.0 * base.powi(level as i32)
}

pub fn buy_run_upgrade(
    run: &mut RunState,
    upgrade: RunUpgrade,
    events: &mut Vec<SimEvent>,
) -> Result<(), ActionError> {
    require_running(run)?;
    let level = run.run_upgrade_level(upgrade);
    let cost = run_upgrade_cost(upgrade, level);
    if run.ledger.amount(ResourceId::Info) < cost {
        return Err(ActionError::InsufficientResources);
    }
    let mut price = ResourceMap::new();
    price.insert(ResourceId::Info, cost);
    run.ledger.spend(&price, 1.0);
    run.run_upgrades.insert(upgrade, level + 1);
    events.push(SimEvent::RunUpgradePurchased {
        upgrade,
        level: level + 1,
    });
    Ok(())
}

/// Change the game speed within what the hub research allows.
pub fn set_game_speed(run: &mut RunState, speed: f64) -> Result<(), ActionError> {
    require_running(run)?;
    if !run.mode.allows_speed_change() {
        return Err(ActionError::SpeedLocked);
    }
    let max_speed = run.setup.as_ref().map(|s| s.max_speed).unwrap_or(0.0);
    if max_speed <= 0.0 {
        return Err(ActionError::SpeedLocked);
    }
    let speed = speed.clamp(0.0, max_speed.min(MAX_GAME_SPEED));
    // The first speed level only offers pause or normal speed.
    if max_speed <= 1.0 && speed > 0.0 && speed < 1.0 {
        return Err(ActionError::UnsupportedSpeed(speed));
    }
    run.game_speed = speed;
    Ok(())
}
