//! Fundamental grid and bookkeeping types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use glam::IVec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::enums::{Direction, ResourceId};

/// Amount per resource. Used for costs, loot and sell values.
pub type ResourceMap = BTreeMap<ResourceId, f64>;

/// Integer grid coordinate of a loop.
///
/// Serializes as its string key (`"{x}x{y}"`), so a map keyed by `LoopPos`
/// becomes a plain JSON object keyed by loop id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopPos {
    pub x: i32,
    pub y: i32,
}

/// Stable identity of an enemy for side tables (presentation links).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EnemyId(pub u64);

impl LoopPos {
    pub const ORIGIN: LoopPos = LoopPos { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The orthogonal neighbour in `direction`.
    pub fn neighbor(&self, direction: Direction) -> LoopPos {
        (IVec2::from(*self) + direction.offset()).into()
    }

    /// All four orthogonal neighbours in `Direction::ALL` order.
    pub fn neighbors(&self) -> [LoopPos; 4] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// Encoded string key of this position.
    pub fn key(&self) -> String {
        position_to_key(self.x, self.y)
    }
}

impl From<IVec2> for LoopPos {
    fn from(v: IVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<LoopPos> for IVec2 {
    fn from(p: LoopPos) -> Self {
        IVec2::new(p.x, p.y)
    }
}

/// Encode a grid coordinate as a loop key.
pub fn position_to_key(x: i32, y: i32) -> String {
    format!("{x}x{y}")
}

/// Decode a loop key. Returns `None` for malformed keys.
pub fn key_to_position(key: &str) -> Option<(i32, i32)> {
    let (x, y) = key.split_once('x')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

impl fmt::Display for LoopPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Error returned when a loop key cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed loop key {0:?}")]
pub struct ParseLoopKeyError(pub String);

impl FromStr for LoopPos {
    type Err = ParseLoopKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_to_position(s)
            .map(|(x, y)| LoopPos { x, y })
            .ok_or_else(|| ParseLoopKeyError(s.to_string()))
    }
}

impl Serialize for LoopPos {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LoopPos {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed wall-clock seconds handed to the engine (unscaled).
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `delta` unscaled seconds.
    pub fn advance(&mut self, delta: f64) {
        self.tick += 1;
        self.elapsed_secs += delta;
    }
}
