//! Events emitted by the simulation for the host world, renderer and sync layer.
//!
//! The engine never mutates the world itself. Damage, knockback, item drops and
//! deliveries are requests the host applies; cues and sync deltas are
//! fire-and-forget.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ActorId, ItemStack, ProjectileId, Vector3};

/// Damage for the host's damage pipeline (armor, resistances, enchantments).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRequest {
    pub base_amount: f64,
    pub source: ProjectileId,
    pub target: ActorId,
    pub cause: DamageCause,
}

/// A mutated field that clients mirror.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field")]
pub enum SyncField {
    HandRoll { degrees: f64 },
    Catching { active: bool },
    BounceActive { active: bool },
    EmbedRoll { degrees: f64 },
}

/// Everything a projectile reports to the outside world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProjectileEvent {
    /// A projectile entered the world.
    Launched {
        projectile: ProjectileId,
        origin: Vector3,
        velocity: Vector3,
        assisted: bool,
    },
    /// Lifecycle transition.
    PhaseChanged {
        projectile: ProjectileId,
        from: ProjectilePhase,
        to: ProjectilePhase,
    },
    DamageRequested(DamageRequest),
    KnockbackRequested { target: ActorId, impulse: Vector3 },
    /// Terminal side effect: the item lands in the world.
    SpawnDroppedItem {
        projectile: ProjectileId,
        position: Vector3,
        velocity: Vector3,
        stack: ItemStack,
        reason: TerminationReason,
    },
    /// Terminal side effect: the item goes to the catcher.
    DeliverToInventory {
        projectile: ProjectileId,
        catcher: ActorId,
        stack: ItemStack,
    },
    Cue {
        projectile: ProjectileId,
        kind: CueKind,
        position: Vector3,
    },
    SyncDelta {
        projectile: ProjectileId,
        field: SyncField,
    },
}

impl ProjectileEvent {
    /// Projectile this event originates from, if any.
    pub fn projectile(&self) -> Option<ProjectileId> {
        match self {
            Self::Launched { projectile, .. }
            | Self::PhaseChanged { projectile, .. }
            | Self::SpawnDroppedItem { projectile, .. }
            | Self::DeliverToInventory { projectile, .. }
            | Self::Cue { projectile, .. }
            | Self::SyncDelta { projectile, .. } => Some(*projectile),
            Self::DamageRequested(req) => Some(req.source),
            Self::KnockbackRequested { .. } => None,
        }
    }

    /// True for the drop/deliver side effect that ends a projectile.
    pub fn is_terminal_side_effect(&self) -> bool {
        matches!(
            self,
            Self::SpawnDroppedItem { .. } | Self::DeliverToInventory { .. }
        )
    }
}
