//! Hub errors. Menus show these to the player.

use thiserror::Error;

use delooped_core::enums::{BuildingKind, SpecialObjective};

use crate::hub::Feature;
use crate::objectives::ObjectiveId;
use crate::research::ResearchId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HubError {
    #[error("{0:?} is not unlocked yet")]
    FeatureLocked(Feature),
    #[error("{0:?} is already unlocked")]
    AlreadyUnlocked(Feature),
    #[error("not enough xp: need {need:.0}, have {have:.0}")]
    NotEnoughXp { need: f64, have: f64 },
    #[error("not enough capsules: need {need}, have {have}")]
    NotEnoughCapsules { need: u64, have: u64 },
    #[error("{0:?} research is at its limit")]
    ResearchMaxed(ResearchId),
    #[error("{0:?} is not unlocked")]
    BuildingLocked(BuildingKind),
    #[error("{0:?} is already equipped")]
    AlreadyEquipped(BuildingKind),
    #[error("{0:?} is not equipped")]
    NotEquipped(BuildingKind),
    #[error("loadout is full ({0} slots)")]
    LoadoutFull(usize),
    #[error("loadout has no damager affordable with the starting energy")]
    NoStartingDamager,
    #[error("{0:?} goal not reached")]
    GoalNotReached(ObjectiveId),
    #[error("{0:?} is not claimable")]
    SpecialNotClaimable(SpecialObjective),
    #[error("nothing to claim")]
    NothingToClaim,
}
