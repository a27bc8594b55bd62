//! Meta-progression for DELOOPED.
//!
//! `HubState` persists across runs: xp, best cycles, unlocked buildings, the
//! equipped loadout, repeatable research, objectives and capsules. It hands a
//! `RunSetup` to each new run and takes `RunStats` back when the run ends.

pub mod capsules;
pub mod error;
pub mod hub;
pub mod objectives;
pub mod research;

pub use error::HubError;
pub use hub::{Feature, HubState};
