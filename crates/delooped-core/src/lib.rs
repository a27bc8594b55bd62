//! Core types and definitions for the DELOOPED simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, state snapshots, events, constants, the resource
//! ledger and the enemy status-effect model.
//! It has no dependency on the engine or any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod effects;
pub mod enums;
pub mod events;
pub mod ledger;
pub mod state;
pub mod types;
