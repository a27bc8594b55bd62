//! Systems that operate on the run state each tick.
//!
//! Systems are free functions over `&mut RunState` (or `&RunState` for
//! read-only). They do not own state: everything lives in the run.

pub mod combat;
pub mod economy;
pub mod lifecycle;
pub mod movement;
pub mod snapshot;
pub mod spawner;
