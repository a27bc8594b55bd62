//! Simulation engine for DELOOPED.
//!
//! Owns the run state, runs systems at a fixed tick rate and produces
//! `RunSnapshot`s for the frontend. Completely headless.

pub mod connections;
pub mod engine;
pub mod error;
pub mod grid;
pub mod run_state;
pub mod setup;
pub mod systems;

pub use delooped_core as core;
pub use engine::{SimConfig, Simulation};
pub use error::ActionError;
pub use run_state::RunState;

#[cfg(test)]
mod tests;
