//! Per-step systems run by the engine.
//!
//! Systems are plain functions over the actor world and the projectile table.
//! They hold no state of their own.

pub mod bleed;
pub mod cleanup;
pub mod damage;
pub mod movement;
pub mod projectiles;
pub mod snapshot;
