//! Thrown-item projectile engine.
//!
//! Turns a completed throw into a projectile that flies, bounces back like a
//! boomerang, sticks into living targets and bleeds them, or gets caught.
//! Owns a hecs world of actors, runs systems at a fixed step rate and produces
//! a `StepSnapshot` per step.

pub mod aim_assist;
pub mod embed;
pub mod engine;
pub mod error;
pub mod intercept;
pub mod lifecycle;
pub mod scenario;
pub mod steering;
pub mod systems;
pub mod world_setup;

pub use engine::SimulationEngine;
pub use error::EngineError;
pub use throwing_core as core;
