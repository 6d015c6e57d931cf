//! Step snapshot: the complete visible state after each simulation step.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::ProjectileEvent;
use crate::types::{ActorId, ProjectileId, SimTime, Vector3};

/// Everything a renderer or log consumer needs after one step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub time: SimTime,
    pub projectiles: Vec<ProjectileView>,
    pub actors: Vec<ActorView>,
    /// Events raised during this step, in emission order.
    pub events: Vec<ProjectileEvent>,
}

/// A live projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub phase: ProjectilePhase,
    pub item: String,
    pub count: u32,
    pub position: Vector3,
    pub velocity: Vector3,
    pub hand_roll_degrees: f64,
    /// Spin while flying, settle roll while embedded.
    pub roll_degrees: f64,
    pub bounce_active: bool,
    pub catching: bool,
    /// Host actor while embedded.
    pub embedded_in: Option<ActorId>,
    /// World yaw/pitch while embedded.
    pub embed_yaw_degrees: Option<f64>,
    pub embed_pitch_degrees: Option<f64>,
}

/// An actor in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorView {
    pub id: ActorId,
    pub kind: TargetKind,
    pub position: Vector3,
    pub body_yaw_degrees: f64,
    pub health: f64,
    pub alive: bool,
}
