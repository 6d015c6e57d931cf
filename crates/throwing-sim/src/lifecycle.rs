//! Projectile lifecycle: the per-projectile state machine.
//!
//! ```text
//!            hit (bounce)           arrived
//!   Flying ─────────────▶ Returning ───────▶ Flying
//!     │  hit (embed)          │ hit / timeout
//!     ├──────────▶ Embedded   ▼
//!     │              │ host lost   Terminated ◀── complete catch ── Catching
//!     └── hit / terrain ─────────▶ (drop or deliver, exactly once)
//! ```
//!
//! Catching is entered by an external request from Flying, Returning or
//! Embedded (after releasing the embed) and exits on completion or
//! cancellation. Terminated is absorbing.
//!
//! Transitions are idempotent: every entry point checks the current phase,
//! and a projectile handles at most one collision per step.

use tracing::{debug, info};

use throwing_core::config::ThrowPolicy;
use throwing_core::constants::*;
use throwing_core::enums::{CueKind, DamageCause, ProjectilePhase, TerminationReason};
use throwing_core::events::{DamageRequest, ProjectileEvent, SyncField};
use throwing_core::math;
use throwing_core::types::*;

use crate::embed::{EmbedAnchor, EmbedPose, EmbedRegistry, ImpactContext};
use crate::steering::{self, ReturnProgress, ReturnState};

/// Motion a catch resumes when cancelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriorMotion {
    Flying,
    Returning(ReturnState),
}

/// Catching-phase state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchState {
    pub catcher: ActorId,
    pub prior: PriorMotion,
    /// Velocity when the catch started.
    pub stored_velocity: Vector3,
}

/// Phase with its phase-specific data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Flying,
    Catching(CatchState),
    Returning(ReturnState),
    Embedded(EmbedAnchor),
    Terminated(TerminationReason),
}

impl Phase {
    pub fn kind(&self) -> ProjectilePhase {
        match self {
            Self::Flying => ProjectilePhase::Flying,
            Self::Catching(_) => ProjectilePhase::Catching,
            Self::Returning(_) => ProjectilePhase::Returning,
            Self::Embedded(_) => ProjectilePhase::Embedded,
            Self::Terminated(_) => ProjectilePhase::Terminated,
        }
    }
}

/// Shared state handed to every projectile operation within one step.
pub struct StepContext<'a> {
    pub step: u64,
    pub policy: &'a ThrowPolicy,
    pub embeds: &'a mut EmbedRegistry,
    pub events: &'a mut Vec<ProjectileEvent>,
    /// Hosts whose bleed cycle should be checked after all projectiles step.
    pub bleed_checks: &'a mut Vec<ActorId>,
}

/// One thrown item in the world.
#[derive(Debug, Clone)]
pub struct Projectile {
    id: ProjectileId,
    item: ThrownItem,
    owner: Option<ActorId>,
    position: Vector3,
    velocity: Vector3,
    origin: Vector3,
    hand_roll_degrees: f64,
    launched_at_step: u64,
    phase: Phase,
    has_bounced_once: bool,
    reached_origin_once: bool,
    collided_at: Option<u64>,
    embed_pose: Option<EmbedPose>,
}

impl Projectile {
    /// A new Flying projectile. `velocity` may differ from the request's when
    /// aim assist adjusted it.
    pub fn launch(
        id: ProjectileId,
        request: &LaunchRequest,
        velocity: Vector3,
        item: ThrownItem,
        owner: Option<ActorId>,
    ) -> Self {
        Self {
            id,
            item,
            owner,
            position: request.origin,
            velocity,
            origin: request.origin,
            hand_roll_degrees: request.hand_roll_degrees,
            launched_at_step: request.launched_at_step,
            phase: Phase::Flying,
            has_bounced_once: false,
            reached_origin_once: false,
            collided_at: None,
            embed_pose: None,
        }
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn item(&self) -> &ThrownItem {
        &self.item
    }

    pub fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    /// Throw origin; the point a return flight steers to.
    pub fn origin(&self) -> Vector3 {
        self.origin
    }

    pub fn hand_roll_degrees(&self) -> f64 {
        self.hand_roll_degrees
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated(_))
    }

    pub fn has_bounced_once(&self) -> bool {
        self.has_bounced_once
    }

    pub fn reached_origin_once(&self) -> bool {
        self.reached_origin_once
    }

    /// World pose while embedded.
    pub fn embed_pose(&self) -> Option<EmbedPose> {
        self.embed_pose
    }

    /// Steps since launch.
    pub fn age(&self, step: u64) -> u64 {
        step.saturating_sub(self.launched_at_step)
    }

    /// Visual roll: in-flight spin, or the settle roll while embedded.
    pub fn roll_degrees(&self, step: u64, policy: &ThrowPolicy) -> f64 {
        match &self.phase {
            Phase::Embedded(anchor) => anchor.roll_degrees,
            _ => (self.age(step) as f64 * policy.physics.spin_degrees_per_step) % 360.0,
        }
    }

    #[cfg(test)]
    pub(crate) fn relocate_origin(&mut self, origin: Vector3) {
        self.origin = origin;
    }

    // --- Collisions ---

    /// Handle a collision reported for this step.
    ///
    /// Ignored while Catching, Embedded or Terminated, and after the first
    /// collision of a step.
    pub fn on_collision<L: TargetLookup + ?Sized>(
        &mut self,
        collision: &Collision,
        world: &L,
        ctx: &mut StepContext<'_>,
    ) {
        if self.collided_at == Some(ctx.step) {
            debug!(projectile = %self.id, step = ctx.step, "duplicate collision ignored");
            return;
        }
        let returning = match self.phase {
            Phase::Flying => false,
            Phase::Returning(_) => true,
            Phase::Catching(_) | Phase::Embedded(_) | Phase::Terminated(_) => return,
        };
        self.collided_at = Some(ctx.step);

        let pre_impact = self.position;
        let hit_point = match collision {
            Collision::Entity { hit_point, .. } | Collision::Terrain { hit_point } => *hit_point,
        };
        self.position = hit_point;
        self.cue(CueKind::ImpactBurst, ctx);

        let target_id = match collision {
            Collision::Terrain { .. } => {
                debug!(projectile = %self.id, returning, "hit terrain");
                self.terminate_with_drop(TerminationReason::Collision, ctx);
                return;
            }
            Collision::Entity { target, .. } => *target,
        };
        let Some(target) = world.lookup(target_id).filter(|t| t.is_alive()) else {
            debug!(projectile = %self.id, target = %target_id, "hit target no longer valid");
            self.terminate_with_drop(TerminationReason::Collision, ctx);
            return;
        };

        self.request_impact(&target, ctx);

        if returning || self.has_bounced_once {
            debug!(projectile = %self.id, target = %target_id, returning, "hit after bounce, dropping");
            self.terminate_with_drop(TerminationReason::Collision, ctx);
            return;
        }

        // Only items that hit harder than a bare hand bounce or stick.
        if self.item.base_damage() <= BARE_HAND_DAMAGE {
            self.terminate_with_drop(TerminationReason::Collision, ctx);
            return;
        }

        let policy = ctx.policy;
        let key = self.item.item_key();
        let bounce_ok = policy.boomerang_effect
            && policy.items.bounce.contains(key)
            && !self.reached_origin_once;
        let embed_ok = policy.items.embed.contains(key);

        if bounce_ok {
            self.begin_return(ctx);
        } else if embed_ok {
            self.begin_embed(&target, pre_impact, hit_point, ctx);
        } else {
            self.terminate_with_drop(TerminationReason::Collision, ctx);
        }
    }

    fn request_impact(&self, target: &TargetSnapshot, ctx: &mut StepContext<'_>) {
        let amount = self.item.base_damage();
        debug!(
            projectile = %self.id,
            target = %target.id,
            item = self.item.item_key(),
            amount,
            phase = ?self.phase.kind(),
            "impact damage"
        );
        ctx.events.push(ProjectileEvent::DamageRequested(DamageRequest {
            base_amount: amount,
            source: self.id,
            target: target.id,
            cause: DamageCause::Impact,
        }));
        let push = math::normalize_or(self.velocity, Vector3::ZERO) * KNOCKBACK_STRENGTH;
        ctx.events.push(ProjectileEvent::KnockbackRequested {
            target: target.id,
            impulse: push + Vector3::new(0.0, KNOCKBACK_LIFT, 0.0),
        });
    }

    fn begin_return(&mut self, ctx: &mut StepContext<'_>) {
        self.has_bounced_once = true;
        let Some(start) = steering::initiate(
            self.position,
            self.origin,
            self.hand_roll_degrees,
            &ctx.policy.returning,
        ) else {
            debug!(projectile = %self.id, "too close to origin, dropping normally");
            self.terminate_with_drop(TerminationReason::Collision, ctx);
            return;
        };

        self.velocity = start.velocity;
        debug!(
            projectile = %self.id,
            distance = start.distance,
            roll = self.hand_roll_degrees,
            speed = start.velocity.length(),
            arc = start.state.arc_magnitude,
            "started return"
        );
        self.sync(SyncField::BounceActive { active: true }, ctx);
        self.cue(CueKind::BounceStart, ctx);
        self.transition(Phase::Returning(start.state), ctx);
    }

    fn begin_embed(
        &mut self,
        host: &TargetSnapshot,
        pre_impact: Vector3,
        hit_point: Vector3,
        ctx: &mut StepContext<'_>,
    ) {
        let impact = ImpactContext {
            position: pre_impact,
            velocity: self.velocity,
            hit_point,
            hand_roll_degrees: self.hand_roll_degrees,
            age_steps: self.age(ctx.step),
            step: ctx.step,
        };
        let policy = ctx.policy;
        let (anchor, point) = EmbedAnchor::begin(
            host,
            &impact,
            &policy.embedding,
            policy.physics.spin_degrees_per_step,
        );
        self.position = point;
        self.velocity = Vector3::ZERO;
        self.embed_pose = Some(anchor.pose(host));
        ctx.embeds.register(host.id, self.id, ctx.step);

        debug!(
            projectile = %self.id,
            host = %host.id,
            depth = (point - hit_point).length(),
            yaw = anchor.local_yaw,
            pitch = anchor.local_pitch,
            tilt = anchor.tilt_degrees,
            roll = anchor.roll_degrees,
            "embedded"
        );
        self.sync(SyncField::EmbedRoll { degrees: anchor.roll_degrees }, ctx);
        self.cue(CueKind::EmbedStart, ctx);
        self.transition(Phase::Embedded(anchor), ctx);
    }

    // --- Per-step update ---

    /// Advance one step in the current phase.
    pub fn step<L: TargetLookup + ?Sized>(&mut self, world: &L, ctx: &mut StepContext<'_>) {
        match self.phase.kind() {
            ProjectilePhase::Terminated => {}
            ProjectilePhase::Flying => {
                let physics = &ctx.policy.physics;
                self.velocity.y -= physics.gravity;
                self.velocity *= physics.drag;
                self.position += self.velocity;
            }
            ProjectilePhase::Catching => {
                self.velocity *= CATCH_DAMPING;
                self.position += self.velocity;
            }
            ProjectilePhase::Returning => self.step_returning(ctx),
            ProjectilePhase::Embedded => self.step_embedded(world, ctx),
        }
    }

    fn step_returning(&mut self, ctx: &mut StepContext<'_>) {
        let policy = ctx.policy;
        let tuning = &policy.returning;
        let Phase::Returning(state) = &mut self.phase else {
            return;
        };
        state.steps += 1;
        self.position += self.velocity;

        let progress = steering::advance(state, self.position, self.velocity, self.origin, tuning);
        let steps = state.steps;
        let offset = state.curve_offset.length();

        match progress {
            ReturnProgress::Arrived { overshoot } => {
                // Keep the return velocity so the item falls naturally, but capped.
                self.velocity = math::clamp_length(self.velocity, RETURN_EXIT_MAX_SPEED);
                self.reached_origin_once = true;
                debug!(
                    projectile = %self.id,
                    steps,
                    overshoot,
                    velocity = ?self.velocity,
                    "completed return"
                );
                self.sync(SyncField::BounceActive { active: false }, ctx);
                self.cue(CueKind::ReturnComplete, ctx);
                self.transition(Phase::Flying, ctx);
            }
            ReturnProgress::Steering { velocity } => {
                self.velocity = velocity;
                if steps >= tuning.timeout_steps {
                    self.return_timeout(steps, ctx);
                } else if u64::from(steps) % DEBUG_TRACE_INTERVAL_STEPS == 0 {
                    debug!(
                        projectile = %self.id,
                        distance = (self.origin - self.position).length(),
                        speed = velocity.length(),
                        arc = offset,
                        "returning"
                    );
                }
            }
        }
    }

    /// Force a stuck return to end: slow to a gentle fall and drop.
    fn return_timeout(&mut self, steps: u32, ctx: &mut StepContext<'_>) {
        let v = self.velocity;
        let horizontal = math::horizontal_length(v);
        self.velocity = if horizontal > 0.5 {
            let factor = 0.3 / horizontal;
            Vector3::new(v.x * factor, -RETURN_TIMEOUT_FALL_SPEED, v.z * factor)
        } else {
            Vector3::new(v.x * 0.5, -RETURN_TIMEOUT_FALL_SPEED, v.z * 0.5)
        };
        info!(projectile = %self.id, steps, "return timed out, dropping");
        self.sync(SyncField::BounceActive { active: false }, ctx);
        self.cue(CueKind::ReturnTimeout, ctx);
        self.terminate_with_drop(TerminationReason::ReturnTimeout, ctx);
    }

    fn step_embedded<L: TargetLookup + ?Sized>(&mut self, world: &L, ctx: &mut StepContext<'_>) {
        let policy = ctx.policy;
        let tuning = &policy.embedding;
        let age = self.age(ctx.step);
        let Phase::Embedded(anchor) = &mut self.phase else {
            return;
        };
        let host_id = anchor.host;

        let Some(host) = world.lookup(host_id).filter(|t| t.is_alive()) else {
            debug!(projectile = %self.id, host = %host_id, "host lost, dropping");
            // Leave the group first so the bleed cycle cannot count this member again.
            ctx.embeds.unregister(host_id, self.id);
            self.embed_pose = None;
            self.terminate_with_drop(TerminationReason::HostLost, ctx);
            return;
        };

        let pose = anchor.pose(&host);
        let rolled = anchor.settle_roll(tuning);
        let roll = anchor.roll_degrees;

        self.position = pose.position;
        self.velocity = Vector3::ZERO;
        self.embed_pose = Some(pose);
        if rolled {
            self.sync(SyncField::EmbedRoll { degrees: roll }, ctx);
        }
        ctx.bleed_checks.push(host_id);

        if age % DEBUG_TRACE_INTERVAL_STEPS == 0 {
            debug!(
                projectile = %self.id,
                host_yaw = host.body_yaw_degrees,
                world_yaw = pose.yaw_degrees,
                position = ?pose.position,
                "following host"
            );
        }
    }

    // --- Catching ---

    /// Begin a catch. An embedded projectile is released from its host first.
    /// Returns false when the projectile cannot be caught right now.
    pub fn start_catch(&mut self, catcher: ActorId, ctx: &mut StepContext<'_>) -> bool {
        let prior = match self.phase {
            Phase::Flying => PriorMotion::Flying,
            Phase::Returning(state) => PriorMotion::Returning(state),
            Phase::Embedded(anchor) => {
                self.release_embed(anchor.host, ctx);
                PriorMotion::Flying
            }
            Phase::Catching(_) | Phase::Terminated(_) => return false,
        };

        debug!(projectile = %self.id, %catcher, "catch started");
        self.sync(SyncField::Catching { active: true }, ctx);
        self.cue(CueKind::CatchStart, ctx);
        self.transition(
            Phase::Catching(CatchState {
                catcher,
                prior,
                stored_velocity: self.velocity,
            }),
            ctx,
        );
        true
    }

    fn release_embed(&mut self, host: ActorId, ctx: &mut StepContext<'_>) {
        ctx.embeds.unregister(host, self.id);
        self.velocity = Vector3::ZERO;
        self.embed_pose = None;
        debug!(projectile = %self.id, %host, "released from embed for catching");
        self.transition(Phase::Flying, ctx);
    }

    /// Magnetism update from the catch input.
    pub fn update_catch(
        &mut self,
        velocity: Vector3,
        hand_roll_degrees: f64,
        ctx: &mut StepContext<'_>,
    ) -> bool {
        if !matches!(self.phase, Phase::Catching(_)) {
            return false;
        }
        self.velocity = velocity;
        if self.hand_roll_degrees != hand_roll_degrees {
            self.hand_roll_degrees = hand_roll_degrees;
            self.sync(SyncField::HandRoll { degrees: hand_roll_degrees }, ctx);
        }
        true
    }

    /// Deliver the item to the catcher.
    pub fn complete_catch(&mut self, ctx: &mut StepContext<'_>) -> bool {
        let Phase::Catching(held) = self.phase else {
            return false;
        };
        debug!(projectile = %self.id, catcher = %held.catcher, "catch completed");
        ctx.events.push(ProjectileEvent::DeliverToInventory {
            projectile: self.id,
            catcher: held.catcher,
            stack: self.item.stack.clone(),
        });
        self.transition(Phase::Terminated(TerminationReason::Caught), ctx);
        true
    }

    /// Let go: resume the prior motion with part of the stored velocity.
    pub fn cancel_catch(&mut self, ctx: &mut StepContext<'_>) -> bool {
        let Phase::Catching(held) = self.phase else {
            return false;
        };
        if held.stored_velocity.length() > CATCH_CANCEL_MIN_SPEED {
            self.velocity = held.stored_velocity * CATCH_CANCEL_VELOCITY_KEEP;
        }
        debug!(projectile = %self.id, catcher = %held.catcher, "catch cancelled");
        self.sync(SyncField::Catching { active: false }, ctx);
        self.cue(CueKind::CatchCancel, ctx);
        let next = match held.prior {
            PriorMotion::Flying => Phase::Flying,
            PriorMotion::Returning(state) => Phase::Returning(state),
        };
        self.transition(next, ctx);
        true
    }

    /// Removed by the host world: drop wherever it is.
    pub fn discard(&mut self, ctx: &mut StepContext<'_>) {
        if let Phase::Embedded(anchor) = self.phase {
            ctx.embeds.unregister(anchor.host, self.id);
            self.embed_pose = None;
        }
        self.terminate_with_drop(TerminationReason::Discarded, ctx);
    }

    // --- Termination ---

    /// Drop the carried stack into the world. Dropped tools take one point of
    /// wear per item thrown.
    fn terminate_with_drop(&mut self, reason: TerminationReason, ctx: &mut StepContext<'_>) {
        if self.is_terminated() {
            return;
        }
        let stack = self.item.stack.worn_by(self.item.stack.count);
        ctx.events.push(ProjectileEvent::SpawnDroppedItem {
            projectile: self.id,
            position: self.position,
            velocity: self.velocity,
            stack,
            reason,
        });
        self.transition(Phase::Terminated(reason), ctx);
    }

    fn transition(&mut self, next: Phase, ctx: &mut StepContext<'_>) {
        let from = self.phase.kind();
        let to = next.kind();
        self.phase = next;
        if from != to {
            debug!(projectile = %self.id, ?from, ?to, step = ctx.step, "phase change");
            ctx.events.push(ProjectileEvent::PhaseChanged {
                projectile: self.id,
                from,
                to,
            });
        }
    }

    fn cue(&self, kind: CueKind, ctx: &mut StepContext<'_>) {
        ctx.events.push(ProjectileEvent::Cue {
            projectile: self.id,
            kind,
            position: self.position,
        });
    }

    fn sync(&self, field: SyncField, ctx: &mut StepContext<'_>) {
        ctx.events.push(ProjectileEvent::SyncDelta {
            projectile: self.id,
            field,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throwing_core::enums::TargetKind;

    struct Harness {
        policy: ThrowPolicy,
        embeds: EmbedRegistry,
        events: Vec<ProjectileEvent>,
        bleed_checks: Vec<ActorId>,
        step: u64,
    }

    impl Harness {
        fn new(policy: ThrowPolicy) -> Self {
            Self {
                policy,
                embeds: EmbedRegistry::new(),
                events: Vec::new(),
                bleed_checks: Vec::new(),
                step: 0,
            }
        }

        fn ctx(&mut self) -> StepContext<'_> {
            StepContext {
                step: self.step,
                policy: &self.policy,
                embeds: &mut self.embeds,
                events: &mut self.events,
                bleed_checks: &mut self.bleed_checks,
            }
        }

        fn drops(&self) -> usize {
            self.events.iter().filter(|e| e.is_terminal_side_effect()).count()
        }

        fn damage_count(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, ProjectileEvent::DamageRequested(_)))
                .count()
        }
    }

    fn zombie(pos: Vector3) -> TargetSnapshot {
        TargetSnapshot {
            id: ActorId(1),
            position: pos,
            velocity: Vector3::ZERO,
            alive: true,
            bounding_radius: 0.3,
            height: 1.8,
            body_yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            kind: TargetKind::Hostile,
        }
    }

    fn axe() -> ThrownItem {
        ThrownItem::new(
            ItemStack::new("minecraft:iron_axe", 1).with_durability(10, 250),
            8.0,
        )
    }

    fn throw(item: ThrownItem, roll: f64) -> Projectile {
        let request = LaunchRequest {
            origin: Vector3::new(0.0, 1.5, 0.0),
            velocity: Vector3::new(0.0, 0.0, 1.0),
            hand_roll_degrees: roll,
            launched_at_step: 0,
        };
        Projectile::launch(ProjectileId(1), &request, request.velocity, item, Some(ActorId(99)))
    }

    fn entity_hit(at: Vector3) -> Collision {
        Collision::Entity {
            target: ActorId(1),
            hit_point: at,
        }
    }

    #[test]
    fn test_flying_integration_applies_gravity_then_drag() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world: Vec<TargetSnapshot> = vec![];
        p.step(&world, &mut h.ctx());
        let expected = Vector3::new(0.0, -FLIGHT_GRAVITY, 1.0) * FLIGHT_DRAG;
        assert!((p.velocity() - expected).length() < 1e-12);
        assert!((p.position() - (Vector3::new(0.0, 1.5, 0.0) + expected)).length() < 1e-12);
    }

    #[test]
    fn test_terrain_hit_drops_with_wear() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world: Vec<TargetSnapshot> = vec![];
        p.on_collision(&Collision::Terrain { hit_point: Vector3::new(0.0, 0.0, 4.0) }, &world, &mut h.ctx());
        assert!(p.is_terminated());
        assert_eq!(h.drops(), 1);
        let dropped = h
            .events
            .iter()
            .find_map(|e| match e {
                ProjectileEvent::SpawnDroppedItem { stack, reason, position, .. } => {
                    Some((stack.clone(), *reason, *position))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(dropped.0.durability.unwrap().damage, 11);
        assert_eq!(dropped.1, TerminationReason::Collision);
        assert_eq!(dropped.2, Vector3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_weak_item_never_bounces() {
        let mut h = Harness::new(ThrowPolicy::default());
        let stick = ThrownItem::new(ItemStack::new("minecraft:stick", 1), 0.0);
        let mut p = throw(stick, 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 5.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.0, 4.7)), &world, &mut h.ctx());
        assert!(p.is_terminated());
        assert_eq!(h.damage_count(), 1);
        assert_eq!(h.drops(), 1);
    }

    #[test]
    fn test_weapon_hit_starts_return_and_knocks_back() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 8.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.2, 7.7)), &world, &mut h.ctx());

        assert_eq!(p.phase().kind(), ProjectilePhase::Returning);
        assert!(p.has_bounced_once());
        assert!(p.velocity().z < 0.0, "should head back toward the thrower");
        assert_eq!(h.drops(), 0);
        let impulse = h
            .events
            .iter()
            .find_map(|e| match e {
                ProjectileEvent::KnockbackRequested { impulse, .. } => Some(*impulse),
                _ => None,
            })
            .unwrap();
        assert!((impulse - Vector3::new(0.0, 0.1, 0.5)).length() < 1e-12);
        assert!(h.events.contains(&ProjectileEvent::SyncDelta {
            projectile: ProjectileId(1),
            field: SyncField::BounceActive { active: true },
        }));
    }

    #[test]
    fn test_duplicate_collisions_in_one_step_are_ignored() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 8.0))];
        let hit = entity_hit(Vector3::new(0.0, 1.2, 7.7));
        p.on_collision(&hit, &world, &mut h.ctx());
        p.on_collision(&hit, &world, &mut h.ctx());
        p.on_collision(&Collision::Terrain { hit_point: Vector3::ZERO }, &world, &mut h.ctx());
        assert_eq!(p.phase().kind(), ProjectilePhase::Returning);
        assert_eq!(h.damage_count(), 1);
        assert_eq!(h.drops(), 0);
    }

    #[test]
    fn test_return_completes_then_never_bounces_or_embeds_again() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 30.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 12.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.2, 11.7)), &world, &mut h.ctx());

        let mut steps = 0;
        while p.phase().kind() == ProjectilePhase::Returning {
            p.step(&world, &mut h.ctx());
            h.step += 1;
            steps += 1;
            assert!(steps <= RETURN_TIMEOUT_STEPS, "return did not finish");
        }
        assert_eq!(p.phase().kind(), ProjectilePhase::Flying);
        assert!(p.reached_origin_once());
        assert!(p.velocity().length() <= RETURN_EXIT_MAX_SPEED + 1e-12);

        // A second hit still damages, then drops instead of bouncing or sticking.
        h.step += 1;
        p.on_collision(&entity_hit(p.position()), &world, &mut h.ctx());
        assert!(p.is_terminated());
        assert_eq!(p.phase().kind(), ProjectilePhase::Terminated);
        assert_eq!(h.damage_count(), 2);
        assert_eq!(h.drops(), 1);
    }

    #[test]
    fn test_hit_during_return_drops_immediately() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 8.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.2, 7.7)), &world, &mut h.ctx());
        h.step = 3;
        p.step(&world, &mut h.ctx());
        p.on_collision(&entity_hit(p.position()), &world, &mut h.ctx());
        assert!(p.is_terminated());
        assert_eq!(h.damage_count(), 2);
        assert_eq!(h.drops(), 1);
    }

    #[test]
    fn test_bounce_too_close_to_origin_drops() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 0.3))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.5, 0.05)), &world, &mut h.ctx());
        assert!(p.is_terminated());
        assert_eq!(h.drops(), 1);
    }

    #[test]
    fn test_return_timeout_after_exact_limit() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 20.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.5, 19.7)), &world, &mut h.ctx());
        assert_eq!(p.phase().kind(), ProjectilePhase::Returning);

        let mut steps = 0u32;
        while !p.is_terminated() {
            // Keep the origin out of reach.
            p.relocate_origin(p.position() + Vector3::new(20.0, 0.0, 0.0));
            p.step(&world, &mut h.ctx());
            h.step += 1;
            steps += 1;
            assert!(steps <= RETURN_TIMEOUT_STEPS, "ran past the timeout");
        }
        assert_eq!(steps, RETURN_TIMEOUT_STEPS);
        assert_eq!(h.drops(), 1);
        let (reason, velocity) = h
            .events
            .iter()
            .find_map(|e| match e {
                ProjectileEvent::SpawnDroppedItem { reason, velocity, .. } => Some((*reason, *velocity)),
                _ => None,
            })
            .unwrap();
        assert_eq!(reason, TerminationReason::ReturnTimeout);
        assert_eq!(velocity.y, -RETURN_TIMEOUT_FALL_SPEED);
        assert!(math::horizontal_length(velocity) <= 0.3 + 1e-9);
    }

    #[test]
    fn test_embed_when_bounce_disabled() {
        let mut policy = ThrowPolicy::default();
        policy.boomerang_effect = false;
        let mut h = Harness::new(policy);
        let mut p = throw(axe(), 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 5.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.2, 4.7)), &world, &mut h.ctx());
        assert_eq!(p.phase().kind(), ProjectilePhase::Embedded);
        assert_eq!(p.velocity(), Vector3::ZERO);
        assert_eq!(h.embeds.group(ActorId(1)).unwrap().members.len(), 1);

        p.step(&world, &mut h.ctx());
        assert_eq!(h.bleed_checks, vec![ActorId(1)]);
    }

    #[test]
    fn test_embedded_host_death_drops_once_and_clears_group() {
        let mut policy = ThrowPolicy::default();
        policy.boomerang_effect = false;
        let mut h = Harness::new(policy);
        let mut p = throw(axe(), 0.0);
        let mut world = vec![zombie(Vector3::new(0.0, 0.0, 5.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.2, 4.7)), &world, &mut h.ctx());

        world[0].alive = false;
        h.step = 1;
        p.step(&world, &mut h.ctx());
        p.step(&world, &mut h.ctx());
        assert!(p.is_terminated());
        assert_eq!(h.drops(), 1);
        assert!(h.embeds.is_empty());
    }

    #[test]
    fn test_catch_and_cancel_resumes_return() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 8.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.2, 7.7)), &world, &mut h.ctx());
        let before = p.velocity();

        h.step = 1;
        assert!(p.start_catch(ActorId(99), &mut h.ctx()));
        assert!(!p.start_catch(ActorId(99), &mut h.ctx()));
        assert_eq!(p.phase().kind(), ProjectilePhase::Catching);

        // Collisions are ignored while catching.
        p.on_collision(&Collision::Terrain { hit_point: Vector3::ZERO }, &world, &mut h.ctx());
        assert!(!p.is_terminated());

        assert!(p.update_catch(Vector3::new(0.0, 0.0, -0.4), 12.0, &mut h.ctx()));
        p.step(&world, &mut h.ctx());
        assert!((p.velocity().z - (-0.4 * CATCH_DAMPING)).abs() < 1e-12);

        assert!(p.cancel_catch(&mut h.ctx()));
        assert_eq!(p.phase().kind(), ProjectilePhase::Returning);
        assert!((p.velocity() - before * CATCH_CANCEL_VELOCITY_KEEP).length() < 1e-12);
        assert_eq!(p.hand_roll_degrees(), 12.0);
    }

    #[test]
    fn test_catch_embedded_releases_then_delivers_unworn() {
        let mut policy = ThrowPolicy::default();
        policy.boomerang_effect = false;
        let mut h = Harness::new(policy);
        let mut p = throw(axe(), 0.0);
        let world = vec![zombie(Vector3::new(0.0, 0.0, 5.0))];
        p.on_collision(&entity_hit(Vector3::new(0.0, 1.2, 4.7)), &world, &mut h.ctx());

        h.step = 10;
        assert!(p.start_catch(ActorId(99), &mut h.ctx()));
        assert!(h.embeds.is_empty(), "release must leave the bleed group");
        assert!(p.complete_catch(&mut h.ctx()));
        assert!(!p.complete_catch(&mut h.ctx()));
        assert!(p.is_terminated());

        let delivered: Vec<_> = h
            .events
            .iter()
            .filter_map(|e| match e {
                ProjectileEvent::DeliverToInventory { catcher, stack, .. } => Some((*catcher, stack.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, ActorId(99));
        assert_eq!(delivered[0].1.durability.unwrap().damage, 10);
        assert_eq!(h.drops(), 1);
    }

    #[test]
    fn test_terminated_is_absorbing() {
        let mut h = Harness::new(ThrowPolicy::default());
        let mut p = throw(axe(), 0.0);
        let world: Vec<TargetSnapshot> = vec![];
        p.on_collision(&Collision::Terrain { hit_point: Vector3::ZERO }, &world, &mut h.ctx());
        let events_after = h.events.len();

        for step in 1..4 {
            h.step = step;
            p.on_collision(&Collision::Terrain { hit_point: Vector3::ZERO }, &world, &mut h.ctx());
            p.step(&world, &mut h.ctx());
            p.discard(&mut h.ctx());
            assert!(!p.start_catch(ActorId(2), &mut h.ctx()));
            assert!(!p.cancel_catch(&mut h.ctx()));
        }
        assert_eq!(h.events.len(), events_after);
        assert_eq!(h.drops(), 1);
    }
}
