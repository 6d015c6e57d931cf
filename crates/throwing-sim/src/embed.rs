//! Embedding: projectiles stuck in a living host, and the shared bleed cycle.
//!
//! An [`EmbedAnchor`] freezes the projectile's offset in the host's body frame
//! so it follows the host as it moves and turns. All projectiles embedded in
//! the same host share one [`EmbedGroup`] in the [`EmbedRegistry`], which deals
//! their periodic damage together on a clock anchored to the first embed.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use throwing_core::config::EmbedTuning;
use throwing_core::math;
use throwing_core::types::{ActorId, ProjectileId, Target, Vector3};

/// Frozen attachment of one projectile to its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbedAnchor {
    pub host: ActorId,
    /// Offset from the host position in the host's body frame (yaw removed).
    pub local_offset: Vector3,
    /// Projectile yaw relative to the host body yaw, degrees.
    pub local_yaw: f64,
    /// Projectile pitch relative to the host pitch, degrees.
    pub local_pitch: f64,
    /// Visual hand tilt, the negated hand roll at release.
    pub tilt_degrees: f64,
    /// Current roll angle, animating toward the settle angle.
    pub roll_degrees: f64,
    pub embed_start_step: u64,
}

/// World-space pose of an embedded projectile for the current step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbedPose {
    pub position: Vector3,
    pub yaw_degrees: f64,
    pub pitch_degrees: f64,
}

/// Inputs captured from the projectile at the moment of impact.
#[derive(Debug, Clone, Copy)]
pub struct ImpactContext {
    pub position: Vector3,
    pub velocity: Vector3,
    pub hit_point: Vector3,
    pub hand_roll_degrees: f64,
    /// Steps since launch; sets the in-flight spin phase.
    pub age_steps: u64,
    pub step: u64,
}

impl EmbedAnchor {
    /// Attach a projectile to `host` at the point of impact.
    ///
    /// Returns the anchor and the world-space embed point.
    pub fn begin<T: Target + ?Sized>(
        host: &T,
        impact: &ImpactContext,
        tuning: &EmbedTuning,
        spin_degrees_per_step: f64,
    ) -> (Self, Vector3) {
        // Impact direction: velocity, then hit-to-projectile, then +X.
        let mut dir = impact.velocity;
        if dir.length_squared() < 1e-6 {
            dir = impact.hit_point - impact.position;
        }
        if dir.length_squared() < 1e-6 {
            dir = Vector3::X;
        }
        let dir = math::normalize_or(dir, Vector3::X);

        let yaw = dir.z.atan2(dir.x).to_degrees();
        let pitch = dir.y.atan2(math::horizontal_length(dir)).to_degrees();

        let embed_point = embed_position(host, impact.hit_point, tuning.center_pull);
        let world_offset = embed_point - host.position();
        let host_yaw = host.body_yaw_degrees();

        let anchor = Self {
            host: host.id(),
            local_offset: math::rotate_y_degrees(world_offset, -host_yaw),
            local_yaw: math::wrap_degrees(yaw - host_yaw),
            local_pitch: math::wrap_degrees(pitch - host.pitch_degrees()),
            tilt_degrees: -impact.hand_roll_degrees,
            roll_degrees: (impact.age_steps as f64 * spin_degrees_per_step) % 360.0,
            embed_start_step: impact.step,
        };
        (anchor, embed_point)
    }

    /// Where the projectile sits on the host this step.
    pub fn pose<T: Target + ?Sized>(&self, host: &T) -> EmbedPose {
        let host_yaw = host.body_yaw_degrees();
        EmbedPose {
            position: host.position() + math::rotate_y_degrees(self.local_offset, host_yaw),
            yaw_degrees: math::wrap_degrees(host_yaw + self.local_yaw),
            pitch_degrees: math::wrap_degrees(host.pitch_degrees() + self.local_pitch),
        }
    }

    /// Move the roll one step toward the nearest settle angle. Returns true
    /// when the roll changed.
    pub fn settle_roll(&mut self, tuning: &EmbedTuning) -> bool {
        let next = approach_settle_angle(
            self.roll_degrees,
            tuning.settle_roll_degrees,
            tuning.roll_approach_per_step,
        );
        let changed = next != self.roll_degrees;
        self.roll_degrees = next;
        changed
    }
}

/// Hit point pulled part of the way toward the host's bounding-box center,
/// keeping the hit height.
pub fn embed_position<T: Target + ?Sized>(host: &T, hit_point: Vector3, pull: f64) -> Vector3 {
    let center = host.bounding_center();
    let center_at_hit = Vector3::new(center.x, hit_point.y, center.z);
    hit_point + (center_at_hit - hit_point) * pull
}

/// Step `current` toward `settle + 360k` for the nearest `k`, never overshooting.
pub fn approach_settle_angle(current: f64, settle: f64, rate: f64) -> f64 {
    let nearest = settle + 360.0 * ((current - settle) / 360.0).round();
    let diff = nearest - current;
    if diff.abs() <= 0.01 {
        current
    } else if diff.abs() <= rate {
        nearest
    } else {
        current + rate.copysign(diff)
    }
}

/// All projectiles embedded in one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedGroup {
    /// Step of the first embed; the bleed clock counts from here.
    pub anchor_step: u64,
    pub members: BTreeSet<ProjectileId>,
    pub last_applied_step: Option<u64>,
}

/// One application of the shared bleed.
#[derive(Debug, Clone, PartialEq)]
pub struct BleedTick {
    pub host: ActorId,
    /// Per-embed damage times the number of valid members.
    pub total: f64,
    /// Members that counted, in id order.
    pub members: Vec<ProjectileId>,
}

/// Embed groups keyed by host. Groups are created on first registration and
/// torn down when their last member leaves or the host is evicted.
#[derive(Debug, Default)]
pub struct EmbedRegistry {
    groups: BTreeMap<ActorId, EmbedGroup>,
}

impl EmbedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `projectile` to the host's group, anchoring a new group at `step`.
    /// Returns true when this created the group.
    pub fn register(&mut self, host: ActorId, projectile: ProjectileId, step: u64) -> bool {
        let mut created = false;
        let group = self.groups.entry(host).or_insert_with(|| {
            created = true;
            EmbedGroup {
                anchor_step: step,
                members: BTreeSet::new(),
                last_applied_step: None,
            }
        });
        group.members.insert(projectile);
        if created {
            debug!(%host, anchor_step = step, "bleed group anchored");
        }
        debug!(%host, %projectile, count = group.members.len(), "embed registered");
        created
    }

    /// Remove `projectile` from the host's group. Unknown hosts and members are
    /// a no-op. Returns true when a member was removed.
    pub fn unregister(&mut self, host: ActorId, projectile: ProjectileId) -> bool {
        let Some(group) = self.groups.get_mut(&host) else {
            return false;
        };
        let removed = group.members.remove(&projectile);
        if group.members.is_empty() {
            self.groups.remove(&host);
            debug!(%host, "bleed group cleared");
        } else if removed {
            debug!(%host, %projectile, remaining = group.members.len(), "embed removed");
        }
        removed
    }

    /// Drop the host's group outright.
    pub fn evict_host(&mut self, host: ActorId) -> Option<EmbedGroup> {
        let group = self.groups.remove(&host);
        if group.is_some() {
            debug!(%host, "bleed group evicted");
        }
        group
    }

    pub fn group(&self, host: ActorId) -> Option<&EmbedGroup> {
        self.groups.get(&host)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Apply the host's bleed if `step` is on its cycle and it has not fired
    /// this step yet.
    ///
    /// Members are snapshotted and then filtered with `is_valid`, so members
    /// invalidated elsewhere this step simply do not count. A dead host or a
    /// group with no valid members is torn down.
    pub fn try_apply(
        &mut self,
        host: ActorId,
        step: u64,
        host_alive: bool,
        tuning: &EmbedTuning,
        is_valid: impl Fn(ProjectileId) -> bool,
    ) -> Option<BleedTick> {
        let group = self.groups.get_mut(&host)?;
        if !host_alive {
            self.evict_host(host);
            return None;
        }

        let interval = tuning.bleed_interval_steps.max(1);
        let delta = step.checked_sub(group.anchor_step)?;
        if delta < interval || delta % interval != 0 {
            return None;
        }
        if group.last_applied_step == Some(step) {
            return None;
        }
        group.last_applied_step = Some(step);

        let snapshot: Vec<ProjectileId> = group.members.iter().copied().collect();
        let active: Vec<ProjectileId> = snapshot.into_iter().filter(|&p| is_valid(p)).collect();
        if active.is_empty() {
            self.groups.remove(&host);
            return None;
        }

        let total = tuning.bleed_damage_per_embed * active.len() as f64;
        debug!(%host, step, total, embeds = active.len(), anchor = group.anchor_step, "bleed applied");
        Some(BleedTick {
            host,
            total,
            members: active,
        })
    }
}
