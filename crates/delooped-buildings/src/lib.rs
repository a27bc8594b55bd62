//! Building registry for DELOOPED.
//!
//! Static definitions of every building kind (cost, class, upgrades) and
//! their behaviour callbacks. Pure functions over plain data; the engine
//! lends each callback the building, the loop's enemies and a context.

pub mod behavior;
pub mod influence;
pub mod registry;

pub use delooped_core as core;

pub use behavior::BuildingContext;
pub use influence::Influence;
pub use registry::{get_def, BuildingDef, UpgradeDef};
