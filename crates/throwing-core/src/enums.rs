//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a projectile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectilePhase {
    /// Free ballistic flight.
    #[default]
    Flying,
    /// Being pulled toward a catcher's hand.
    Catching,
    /// Boomerang return toward the throw origin.
    Returning,
    /// Stuck in a living host.
    Embedded,
    /// Gone. The item has been dropped or delivered.
    Terminated,
}

/// Capability tag of an actor, used for aim assist weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Hostile,
    Player,
    #[default]
    Passive,
}

/// Why a damage request was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageCause {
    /// Direct hit of a thrown item.
    Impact,
    /// Periodic damage from embedded projectiles.
    Bleed,
}

/// Fire-and-forget presentation cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueKind {
    BounceStart,
    ReturnComplete,
    ReturnTimeout,
    EmbedStart,
    BleedTick,
    CatchStart,
    CatchCancel,
    /// Break particles at the point of a collision.
    ImpactBurst,
}

/// Why a projectile reached `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Hit something and no follow-up effect applied.
    Collision,
    /// Returning flight ran out of steps.
    ReturnTimeout,
    /// Embedded host died or disappeared.
    HostLost,
    /// Delivered to a catcher.
    Caught,
    /// Removed by the host world.
    Discarded,
}
