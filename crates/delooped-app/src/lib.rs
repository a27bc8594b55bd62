//! DELOOPED headless driver.
//!
//! Wires the hub and the simulation together, drives runs either as fast as
//! possible or paced on a game-loop thread, and can play them unattended.

pub mod autopilot;
pub mod config;
pub mod game_loop;
pub mod logging;
pub mod session;

pub use delooped_core as core;
pub use session::{Session, SessionError};
