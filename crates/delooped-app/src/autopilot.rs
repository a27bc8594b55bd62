//! A simple unattended player for batch runs and smoke tests.
//!
//! Reads nothing but the published snapshot and answers with ordinary
//! player commands, so it can drive the engine directly or across the
//! game-loop channel.

use delooped_buildings::get_def;
use delooped_core::commands::PlayerCommand;
use delooped_core::enums::{BuildingClass, BuildingKind, GameState};
use delooped_core::state::{LoopView, RunSnapshot};
use delooped_core::types::{LoopPos, ResourceMap};

#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Damagers that must stand before quiet loops get generators.
    pub damagers_before_generators: usize,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            damagers_before_generators: 2,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands for the next tick. Empty when there is nothing worth doing.
    pub fn plan(&self, snapshot: &RunSnapshot) -> Vec<PlayerCommand> {
        if snapshot.game_state != GameState::Started || snapshot.paused {
            return Vec::new();
        }

        if let Some(pos) = busiest_empty_loop(&snapshot.loops) {
            if let Some(kind) = cheapest_affordable(snapshot, BuildingClass::Damager) {
                return place(kind, pos);
            }
        }

        let damagers = snapshot
            .loops
            .iter()
            .filter_map(|lp| lp.building.as_ref())
            .filter(|b| get_def(b.kind).is_damager())
            .count();
        if damagers >= self.damagers_before_generators {
            let quiet = snapshot
                .loops
                .iter()
                .find(|lp| lp.building.is_none() && lp.enemies.is_empty());
            if let (Some(lp), Some(kind)) =
                (quiet, cheapest_affordable(snapshot, BuildingClass::Generator))
            {
                return place(kind, lp.pos);
            }
        }

        Vec::new()
    }
}

fn place(kind: BuildingKind, pos: LoopPos) -> Vec<PlayerCommand> {
    log::debug!("autopilot places {kind:?} on {pos}");
    vec![
        PlayerCommand::SelectBuilding { kind: Some(kind) },
        PlayerCommand::SelectLoop { pos: Some(pos) },
        PlayerCommand::PlaceOnSelectedLoop,
    ]
}

/// Empty loop with the most enemies on it. Ties go to the first in grid order.
fn busiest_empty_loop(loops: &[LoopView]) -> Option<LoopPos> {
    let mut best: Option<&LoopView> = None;
    for lp in loops {
        if lp.building.is_some() || lp.enemies.is_empty() {
            continue;
        }
        if best.map_or(true, |b| lp.enemies.len() > b.enemies.len()) {
            best = Some(lp);
        }
    }
    best.map(|lp| lp.pos)
}

fn affordable(snapshot: &RunSnapshot, price: &ResourceMap) -> bool {
    price
        .iter()
        .all(|(id, &amount)| snapshot.resources.get(id).copied().unwrap_or(0.0) >= amount)
}

/// Cheapest loadout building of `class` that acts on its own every tick.
fn cheapest_affordable(snapshot: &RunSnapshot, class: BuildingClass) -> Option<BuildingKind> {
    snapshot
        .building_costs
        .iter()
        .filter(|(&kind, price)| {
            let def = get_def(kind);
            def.class == class && def.has_update && affordable(snapshot, price)
        })
        .map(|(&kind, price)| (kind, price.values().sum::<f64>()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(kind, _)| kind)
}
