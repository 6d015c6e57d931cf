//! Requests sent from the host (gesture detector, catch input) to the simulation.
//!
//! Commands are validated and queued for processing at the next step boundary.

use serde::{Deserialize, Serialize};

use crate::types::{ActorId, LaunchRequest, ProjectileId, ThrownItem, Vector3};

/// All possible external actions on projectiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ThrowCommand {
    // --- Throwing ---
    /// Create a new flying projectile from a completed gesture.
    Launch {
        request: LaunchRequest,
        item: ThrownItem,
        /// The throwing actor, excluded from aim assist candidates.
        #[serde(default)]
        thrower: Option<ActorId>,
        /// Blend the launch velocity toward the best target.
        #[serde(default)]
        aim_assist: bool,
    },

    // --- Catching ---
    /// Begin pulling a projectile toward a catcher.
    StartCatch {
        projectile: ProjectileId,
        catcher: ActorId,
    },
    /// Magnetism update computed by the catch input.
    UpdateCatch {
        projectile: ProjectileId,
        velocity: Vector3,
        hand_roll_degrees: f64,
    },
    /// The item reached the catcher's hand.
    CompleteCatch { projectile: ProjectileId },
    /// The catcher let go.
    CancelCatch { projectile: ProjectileId },
}

impl ThrowCommand {
    /// Projectile this command addresses. `None` for launches.
    pub fn projectile(&self) -> Option<ProjectileId> {
        match self {
            Self::Launch { .. } => None,
            Self::StartCatch { projectile, .. }
            | Self::UpdateCatch { projectile, .. }
            | Self::CompleteCatch { projectile }
            | Self::CancelCatch { projectile } => Some(*projectile),
        }
    }
}
