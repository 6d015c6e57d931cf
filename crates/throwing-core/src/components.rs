//! ECS components for actors in the simulated world.
//!
//! Actors are the things projectiles hit, lead and stick into. The engine's
//! world holds them as hecs entities built from these components; projectiles
//! themselves live outside the ECS.

use serde::{Deserialize, Serialize};

use crate::enums::TargetKind;
use crate::types::Vector3;

/// Shape and capability tag of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorBody {
    pub kind: TargetKind,
    pub bounding_radius: f64,
    pub height: f64,
}

impl Default for ActorBody {
    fn default() -> Self {
        Self {
            kind: TargetKind::Passive,
            bounding_radius: 0.3,
            height: 1.8,
        }
    }
}

/// Feet position and facing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3,
    pub body_yaw_degrees: f64,
    pub pitch_degrees: f64,
}

/// Scripted per-step motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Blocks per step.
    pub velocity: Vector3,
    /// Body yaw change per step (degrees).
    pub yaw_rate_degrees: f64,
}

/// Hit points. An actor at zero is dead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn new(max: f64) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn apply(&mut self, amount: f64) {
        self.current = (self.current - amount).max(0.0);
    }
}

/// Actor that throws or catches. Excluded from its own aim assist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thrower;
