//! Run resource ledger: current amounts plus lifetime totals used for scoring.

use serde::{Deserialize, Serialize};

use crate::enums::ResourceId;
use crate::types::ResourceMap;

/// Current and lifetime-earned amount of every run resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    amounts: ResourceMap,
    totals: ResourceMap,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(&self, id: ResourceId) -> f64 {
        self.amounts.get(&id).copied().unwrap_or(0.0)
    }

    /// Lifetime amount earned this run.
    pub fn total(&self, id: ResourceId) -> f64 {
        self.totals.get(&id).copied().unwrap_or(0.0)
    }

    pub fn amounts(&self) -> &ResourceMap {
        &self.amounts
    }

    pub fn totals(&self) -> &ResourceMap {
        &self.totals
    }

    /// Set an amount directly without touching totals (run setup).
    pub fn set(&mut self, id: ResourceId, value: f64) {
        self.amounts.insert(id, value);
    }

    /// Earn `value`; counts toward the lifetime total.
    pub fn earn(&mut self, id: ResourceId, value: f64) {
        *self.amounts.entry(id).or_insert(0.0) += value;
        *self.totals.entry(id).or_insert(0.0) += value;
    }

    /// Earn every entry of `map`.
    pub fn earn_all(&mut self, map: &ResourceMap) {
        for (&id, &value) in map {
            self.earn(id, value);
        }
    }

    /// Refund `map`. Refunds return spent resources, so they are taken back
    /// out of the lifetime totals.
    pub fn refund_all(&mut self, map: &ResourceMap) {
        for (&id, &value) in map {
            *self.amounts.entry(id).or_insert(0.0) += value;
            *self.totals.entry(id).or_insert(0.0) -= value;
        }
    }

    /// Whether every entry of `cost` scaled by `factor` is covered.
    pub fn can_afford(&self, cost: &ResourceMap, factor: f64) -> bool {
        cost.iter()
            .all(|(&id, &value)| self.amount(id) >= value * factor)
    }

    /// Deduct `cost` scaled by `factor` and return what was actually charged.
    /// Callers check `can_afford` first.
    pub fn spend(&mut self, cost: &ResourceMap, factor: f64) -> ResourceMap {
        let mut charged = ResourceMap::new();
        for (&id, &value) in cost {
            let real = value * factor;
            *self.amounts.entry(id).or_insert(0.0) -= real;
            charged.insert(id, real);
        }
        charged
    }
}
