//! Influence vectors: per-attribute multiplicative buffs projected onto a
//! loop by influencer buildings on its orthogonal neighbours.

use std::collections::BTreeMap;

use delooped_core::enums::InfluenceAttr;

/// Product of all neighbour influence factors. Unset attributes read as 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Influence {
    factors: BTreeMap<InfluenceAttr, f64>,
}

impl Influence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style single factor.
    pub fn with(mut self, attr: InfluenceAttr, factor: f64) -> Self {
        self.multiply(attr, factor);
        self
    }

    pub fn factor(&self, attr: InfluenceAttr) -> f64 {
        self.factors.get(&attr).copied().unwrap_or(1.0)
    }

    pub fn multiply(&mut self, attr: InfluenceAttr, factor: f64) {
        *self.factors.entry(attr).or_insert(1.0) *= factor;
    }

    /// Fold another influence into this one, attribute by attribute.
    pub fn absorb(&mut self, other: &Influence) {
        for (&attr, &factor) in &other.factors {
            self.multiply(attr, factor);
        }
    }
}
