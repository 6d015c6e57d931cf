//! Fundamental geometric and simulation types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::BARE_HAND_DAMAGE;
use crate::enums::TargetKind;

/// 3D vector in simulation space (blocks). y = Up.
pub type Vector3 = glam::DVec3;

/// Stable identifier of a world actor (target, thrower or catcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Identifier of a single projectile instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proj#{}", self.0)
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current step number (increments by 1 each step).
    pub step: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per step at the default step rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one step.
    pub fn advance(&mut self) {
        self.step += 1;
        self.elapsed_secs += self.dt();
    }
}

/// A completed throw gesture. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Hand position at release.
    pub origin: Vector3,
    /// Launch velocity (blocks/step).
    pub velocity: Vector3,
    /// Controller roll at release (degrees). Picks the return arc plane.
    #[serde(default)]
    pub hand_roll_degrees: f64,
    /// Step at which the throw was released.
    #[serde(default)]
    pub launched_at_step: u64,
}

/// Durability state of a damageable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durability {
    pub damage: u32,
    pub max_damage: u32,
}

/// An item stack as it leaves or re-enters the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Registry key of the item (e.g. `minecraft:iron_axe`).
    pub item: String,
    pub count: u32,
    #[serde(default)]
    pub durability: Option<Durability>,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
            durability: None,
        }
    }

    pub fn with_durability(mut self, damage: u32, max_damage: u32) -> Self {
        self.durability = Some(Durability { damage, max_damage });
        self
    }

    /// Copy of this stack with `amount` extra wear, clamped to the item's max.
    /// Non-damageable stacks are returned unchanged.
    pub fn worn_by(&self, amount: u32) -> Self {
        let mut worn = self.clone();
        if let Some(d) = worn.durability.as_mut() {
            d.damage = d.damage.saturating_add(amount).min(d.max_damage);
        }
        worn
    }
}

/// Supplies the attack bonus an item contributes, the way equipment
/// attribute modifiers do in melee.
pub trait DamageContributor {
    /// Sum of attack damage modifiers on top of a bare hand.
    fn attack_damage_bonus(&self) -> f64;

    /// Impact damage before the external pipeline applies armor and enchantments.
    fn base_damage(&self) -> f64 {
        BARE_HAND_DAMAGE + self.attack_damage_bonus()
    }
}

/// The stack carried by a projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrownItem {
    pub stack: ItemStack,
    /// Attack damage modifier of the item (0 for non-weapons).
    #[serde(default)]
    pub attack_bonus: f64,
}

impl ThrownItem {
    pub fn new(stack: ItemStack, attack_bonus: f64) -> Self {
        Self {
            stack,
            attack_bonus,
        }
    }

    pub fn item_key(&self) -> &str {
        &self.stack.item
    }
}

impl DamageContributor for ThrownItem {
    fn attack_damage_bonus(&self) -> f64 {
        self.attack_bonus
    }
}

/// Read-only view of a live actor that projectiles can hit, lead or stick into.
pub trait Target {
    fn id(&self) -> ActorId;
    fn position(&self) -> Vector3;
    fn velocity(&self) -> Vector3;
    fn is_alive(&self) -> bool;
    fn bounding_radius(&self) -> f64;
    fn height(&self) -> f64;
    fn body_yaw_degrees(&self) -> f64;
    fn pitch_degrees(&self) -> f64;
    fn kind(&self) -> TargetKind;

    /// Center of the bounding box.
    fn bounding_center(&self) -> Vector3 {
        self.position() + Vector3::new(0.0, self.height() * 0.5, 0.0)
    }
}

/// Per-step copy of an actor's state, taken from the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub id: ActorId,
    pub position: Vector3,
    pub velocity: Vector3,
    pub alive: bool,
    pub bounding_radius: f64,
    pub height: f64,
    pub body_yaw_degrees: f64,
    pub pitch_degrees: f64,
    pub kind: TargetKind,
}

impl Target for TargetSnapshot {
    fn id(&self) -> ActorId {
        self.id
    }

    fn position(&self) -> Vector3 {
        self.position
    }

    fn velocity(&self) -> Vector3 {
        self.velocity
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn body_yaw_degrees(&self) -> f64 {
        self.body_yaw_degrees
    }

    fn pitch_degrees(&self) -> f64 {
        self.pitch_degrees
    }

    fn kind(&self) -> TargetKind {
        self.kind
    }
}

/// Resolves actor ids against the current world. Returns `None` for actors
/// that were removed since the id was taken.
pub trait TargetLookup {
    fn lookup(&self, id: ActorId) -> Option<TargetSnapshot>;
}

impl TargetLookup for [TargetSnapshot] {
    fn lookup(&self, id: ActorId) -> Option<TargetSnapshot> {
        self.iter().find(|t| t.id == id).copied()
    }
}

impl TargetLookup for Vec<TargetSnapshot> {
    fn lookup(&self, id: ActorId) -> Option<TargetSnapshot> {
        self.as_slice().lookup(id)
    }
}

/// A collision reported by the host's physics for one projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Collision {
    /// The projectile touched an actor.
    Entity { target: ActorId, hit_point: Vector3 },
    /// The projectile touched terrain or static geometry.
    Terrain { hit_point: Vector3 },
}
