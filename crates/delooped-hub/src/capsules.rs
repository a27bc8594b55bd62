//! Capsule economy: passive accrual, and the cores capsules are opened into.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Seconds per capsule with no bonuses.
pub const BASE_CAPSULE_INTERVAL_SECS: f64 = 900.0;

/// Pending capsules that fit before accrual stops, with no bonuses.
pub const BASE_CAPSULE_CAPACITY: f64 = 20.0;

/// Permanent bonus a capsule can be opened into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreId {
    /// +x % run xp.
    Xp,
    /// +x starting energy.
    Energy,
    /// +√x % capsule production.
    Capsules,
    /// +√(x/10) capsule capacity.
    Capacity,
    /// Building cost discount.
    Thrift,
}

impl CoreId {
    pub const ALL: [CoreId; 5] = [
        CoreId::Xp,
        CoreId::Energy,
        CoreId::Capsules,
        CoreId::Capacity,
        CoreId::Thrift,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CoreId::Xp => "XP Core",
            CoreId::Energy => "Energy Core",
            CoreId::Capsules => "Capsule Core",
            CoreId::Capacity => "Capacity Core",
            CoreId::Thrift => "Thrift Core",
        }
    }

    /// Effect of `count` capsules allocated to this core.
    pub fn effect(self, count: u32) -> f64 {
        let x = count as f64;
        match self {
            CoreId::Xp | CoreId::Energy => x,
            CoreId::Capsules => x.sqrt(),
            CoreId::Capacity => (x / 10.0).sqrt(),
            CoreId::Thrift => 1.0 / (1.0 + x.sqrt() / 100.0),
        }
    }
}

/// Seconds per capsule.
pub fn capsule_interval(core_effect: f64, productor_level: u32) -> f64 {
    BASE_CAPSULE_INTERVAL_SECS
        / ((1.0 + core_effect / 100.0) * (1.0 + productor_level as f64 / 100.0))
}

/// Maximum pending capsules.
pub fn capsule_capacity(core_effect: f64, storage_level: u32) -> f64 {
    BASE_CAPSULE_CAPACITY + core_effect + storage_level as f64
}

/// Pick the core an opened capsule goes to, uniformly.
pub fn roll_core<R: Rng>(rng: &mut R) -> CoreId {
    CoreId::ALL[rng.gen_range(0..CoreId::ALL.len())]
}
