//! Core types and definitions for the thrown-item projectile engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! vector math, commands, events, the throw policy, and constants.
//! It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod math;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
