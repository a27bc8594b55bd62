//! Rejections of player actions.
//!
//! None of these are fatal. The engine logs them and carries on as if the
//! action never happened.

use thiserror::Error;

use delooped_core::enums::{BuildingKind, GameState, UpgradeId};
use delooped_core::types::LoopPos;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("no run is in progress")]
    NoRunActive,
    #[error("action not allowed while the game is {0:?}")]
    InvalidState(GameState),
    #[error("no building or loop selected")]
    NothingSelected,
    #[error("loop {0} already has a building")]
    LoopOccupied(LoopPos),
    #[error("no loop at {0}")]
    NoSuchLoop(LoopPos),
    #[error("loop {0} has no building")]
    NoBuilding(LoopPos),
    #[error("{0:?} is not in the loadout")]
    NotInLoadout(BuildingKind),
    #[error("not enough resources")]
    InsufficientResources,
    #[error("{0:?} has no {1:?} upgrade")]
    UnknownUpgrade(BuildingKind, UpgradeId),
    #[error("{0:?} upgrade is maxed")]
    UpgradeMaxed(UpgradeId),
    #[error("{0:?} cannot be sold")]
    NotSellable(BuildingKind),
    #[error("selling is on cooldown for {0:.1}s")]
    SellOnCooldown(f64),
    #[error("game speed is locked")]
    SpeedLocked,
    #[error("speed {0} is not offered at this research level")]
    UnsupportedSpeed(f64),
}
