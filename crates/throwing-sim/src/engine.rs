//! Simulation engine: the thrown-item world.
//!
//! `SimulationEngine` owns the hecs world of actors, the table of live
//! projectiles and the embed registry. It processes queued throw and catch
//! commands, takes collision reports from the host physics, runs all systems
//! and produces a `StepSnapshot` per step. Headless and deterministic.

use std::collections::{BTreeMap, VecDeque};

use hecs::World;
use tracing::{debug, info, warn};

use throwing_core::commands::ThrowCommand;
use throwing_core::components::{Health, Motion, Thrower};
use throwing_core::config::ThrowPolicy;
use throwing_core::events::{ProjectileEvent, SyncField};
use throwing_core::state::StepSnapshot;
use throwing_core::types::*;

use crate::aim_assist;
use crate::embed::EmbedRegistry;
use crate::error::{EngineError, EngineResult};
use crate::lifecycle::{Projectile, StepContext};
use crate::systems;
use crate::world_setup::{self, ActorSpec, WorldTargets};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Default)]
pub struct SimConfig {
    pub policy: ThrowPolicy,
}

/// The simulation engine. Owns the actor world and all projectile state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    policy: ThrowPolicy,
    next_projectile_id: u32,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    embeds: EmbedRegistry,
    command_queue: VecDeque<ThrowCommand>,
    collision_queue: Vec<(ProjectileId, Collision)>,
    events: Vec<ProjectileEvent>,
    bleed_checks: Vec<ActorId>,
    despawn_buffer: Vec<ProjectileId>,
}

impl SimulationEngine {
    /// Create an engine. The policy is used as given; call
    /// [`ThrowPolicy::validate`] first if it came from outside.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            policy: config.policy,
            next_projectile_id: 1,
            projectiles: BTreeMap::new(),
            embeds: EmbedRegistry::new(),
            command_queue: VecDeque::new(),
            collision_queue: Vec::new(),
            events: Vec::new(),
            bleed_checks: Vec::new(),
            despawn_buffer: Vec::new(),
        }
    }

    pub fn policy(&self) -> &ThrowPolicy {
        &self.policy
    }

    /// Swap in a whole new policy. Projectiles already in flight pick it up
    /// on their next step.
    pub fn reload_policy(&mut self, policy: ThrowPolicy) -> EngineResult<()> {
        policy.validate()?;
        info!(
            boomerang = policy.boomerang_effect,
            step = self.time.step,
            "policy reloaded"
        );
        self.policy = policy;
        Ok(())
    }

    // --- Actors ---

    pub fn spawn_actor(&mut self, spec: &ActorSpec) -> ActorId {
        let id = world_setup::spawn_actor(&mut self.world, spec);
        debug!(actor = %id, kind = ?spec.kind, "actor spawned");
        id
    }

    /// Remove an actor from the world. Projectiles embedded in it drop on
    /// their next step.
    pub fn despawn_actor(&mut self, id: ActorId) -> EngineResult<()> {
        let entity = world_setup::entity_of(id).ok_or(EngineError::UnknownActor(id))?;
        self.world
            .despawn(entity)
            .map_err(|_| EngineError::UnknownActor(id))?;
        if self.embeds.evict_host(id).is_some() {
            debug!(host = %id, "embed group evicted with its host");
        }
        Ok(())
    }

    /// Bring an actor's health to zero.
    pub fn kill_actor(&mut self, id: ActorId) -> EngineResult<()> {
        let entity = world_setup::entity_of(id).ok_or(EngineError::UnknownActor(id))?;
        let mut health = self
            .world
            .get::<&mut Health>(entity)
            .map_err(|_| EngineError::UnknownActor(id))?;
        health.current = 0.0;
        Ok(())
    }

    pub fn set_motion(&mut self, id: ActorId, motion: Motion) -> EngineResult<()> {
        let entity = world_setup::entity_of(id).ok_or(EngineError::UnknownActor(id))?;
        let mut current = self
            .world
            .get::<&mut Motion>(entity)
            .map_err(|_| EngineError::UnknownActor(id))?;
        *current = motion;
        Ok(())
    }

    /// Current state of an actor, if it still exists.
    pub fn actor(&self, id: ActorId) -> Option<TargetSnapshot> {
        WorldTargets(&self.world).lookup(id)
    }

    // --- Commands and reports ---

    /// Queue a command for processing at the next step boundary.
    pub fn queue_command(&mut self, command: ThrowCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = ThrowCommand>) {
        self.command_queue.extend(commands);
    }

    /// Report a collision from the host physics. It is delivered during the
    /// next step; at most the first report per projectile per step counts.
    pub fn report_collision(&mut self, projectile: ProjectileId, collision: Collision) -> EngineResult<()> {
        let p = self
            .projectiles
            .get(&projectile)
            .ok_or(EngineError::UnknownProjectile(projectile))?;
        if p.is_terminated() {
            return Err(EngineError::AlreadyTerminated(projectile));
        }
        self.collision_queue.push((projectile, collision));
        Ok(())
    }

    /// Remove a projectile from the world right away, dropping its item where
    /// it is. The drop shows up in the next snapshot.
    pub fn discard_projectile(&mut self, id: ProjectileId) -> EngineResult<()> {
        self.with_projectile(id, |p, ctx| {
            p.discard(ctx);
            true
        })
    }

    // --- Stepping ---

    /// Advance the simulation by one step and return the resulting snapshot.
    pub fn tick(&mut self) -> StepSnapshot {
        self.process_commands();
        self.run_systems();
        self.time.advance();

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            &self.projectiles,
            &self.policy,
            events,
        )
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Live projectiles in id order.
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub fn embeds(&self) -> &EmbedRegistry {
        &self.embeds
    }

    /// Get a read-only reference to the actor world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Process all queued commands. Rejected commands are logged and skipped.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(&command) {
                warn!(step = self.time.step, ?command, %err, "command rejected");
            }
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: &ThrowCommand) -> EngineResult<()> {
        match command {
            ThrowCommand::Launch {
                request,
                item,
                thrower,
                aim_assist,
            } => {
                self.launch(request, item, *thrower, *aim_assist)?;
                Ok(())
            }
            ThrowCommand::StartCatch {
                projectile,
                catcher,
            } => {
                let actor = self
                    .actor(*catcher)
                    .ok_or(EngineError::UnknownActor(*catcher))?;
                if !actor.alive {
                    return Err(EngineError::DeadActor(*catcher));
                }
                if !self.has_hands(*catcher) {
                    return Err(EngineError::NotACatcher(*catcher));
                }
                let catcher = *catcher;
                self.with_projectile(*projectile, |p, ctx| p.start_catch(catcher, ctx))
            }
            ThrowCommand::UpdateCatch {
                projectile,
                velocity,
                hand_roll_degrees,
            } => {
                let (velocity, roll) = (*velocity, *hand_roll_degrees);
                self.with_projectile(*projectile, |p, ctx| p.update_catch(velocity, roll, ctx))
            }
            ThrowCommand::CompleteCatch { projectile } => {
                self.with_projectile(*projectile, |p, ctx| p.complete_catch(ctx))
            }
            ThrowCommand::CancelCatch { projectile } => {
                self.with_projectile(*projectile, |p, ctx| p.cancel_catch(ctx))
            }
        }
    }

    fn launch(
        &mut self,
        request: &LaunchRequest,
        item: &ThrownItem,
        thrower: Option<ActorId>,
        assist: bool,
    ) -> EngineResult<ProjectileId> {
        if item.stack.count == 0 {
            return Err(EngineError::EmptyStack);
        }
        if let Some(thrower) = thrower {
            if self.actor(thrower).is_none() {
                return Err(EngineError::UnknownActor(thrower));
            }
        }

        let mut request = *request;
        request.launched_at_step = self.time.step;
        let velocity = if assist {
            self.assisted_velocity(&request, thrower)
        } else {
            request.velocity
        };

        let id = ProjectileId(self.next_projectile_id);
        self.next_projectile_id += 1;
        let projectile = Projectile::launch(id, &request, velocity, item.clone(), thrower);

        debug!(
            projectile = %id,
            item = item.item_key(),
            count = item.stack.count,
            speed = velocity.length(),
            roll = request.hand_roll_degrees,
            "launched"
        );
        self.events.push(ProjectileEvent::Launched {
            projectile: id,
            origin: request.origin,
            velocity,
            assisted: velocity != request.velocity,
        });
        self.events.push(ProjectileEvent::SyncDelta {
            projectile: id,
            field: SyncField::HandRoll {
                degrees: request.hand_roll_degrees,
            },
        });
        self.projectiles.insert(id, projectile);
        Ok(id)
    }

    /// Raw throw blended toward the best live target other than the thrower.
    fn assisted_velocity(&self, request: &LaunchRequest, thrower: Option<ActorId>) -> Vector3 {
        let candidates: Vec<TargetSnapshot> = world_setup::all_targets(&self.world)
            .into_iter()
            .filter(|t| Some(t.id) != thrower)
            .collect();
        let tuning = &self.policy.aim_assist;
        match aim_assist::select_best(&candidates, request.origin, request.velocity, tuning) {
            Some(eval) => {
                debug!(
                    target = %eval.target,
                    distance = eval.distance,
                    angle = eval.angle_degrees,
                    confidence = eval.confidence,
                    "aim assist engaged"
                );
                aim_assist::blend(request.velocity, &eval, tuning)
            }
            None => request.velocity,
        }
    }

    fn has_hands(&self, id: ActorId) -> bool {
        world_setup::entity_of(id)
            .is_some_and(|entity| self.world.get::<&Thrower>(entity).is_ok())
    }

    /// Run `action` against a live projectile. `action` returns false when the
    /// projectile's phase does not allow it.
    fn with_projectile(
        &mut self,
        id: ProjectileId,
        action: impl FnOnce(&mut Projectile, &mut StepContext<'_>) -> bool,
    ) -> EngineResult<()> {
        let projectile = self
            .projectiles
            .get_mut(&id)
            .ok_or(EngineError::UnknownProjectile(id))?;
        if projectile.is_terminated() {
            return Err(EngineError::AlreadyTerminated(id));
        }
        let mut ctx = StepContext {
            step: self.time.step,
            policy: &self.policy,
            embeds: &mut self.embeds,
            events: &mut self.events,
            bleed_checks: &mut self.bleed_checks,
        };
        if action(projectile, &mut ctx) {
            Ok(())
        } else {
            Err(EngineError::WrongPhase(id))
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let step = self.time.step;

        // 1. Scripted actor motion
        systems::movement::run(&mut self.world);

        let mut ctx = StepContext {
            step,
            policy: &self.policy,
            embeds: &mut self.embeds,
            events: &mut self.events,
            bleed_checks: &mut self.bleed_checks,
        };
        // 2. Collisions reported since the last step
        systems::projectiles::resolve_collisions(
            &mut self.projectiles,
            &self.world,
            &mut self.collision_queue,
            &mut ctx,
        );
        // 3. Per-phase projectile update
        systems::projectiles::run(&mut self.projectiles, &self.world, &mut ctx);

        // 4. Bleed cycles of hosts with embedded projectiles
        systems::bleed::run(
            &self.world,
            &self.projectiles,
            &mut self.embeds,
            &mut self.bleed_checks,
            step,
            &self.policy.embedding,
            &mut self.events,
        );
        // 5. Damage and knockback on the actor world
        systems::damage::run(&mut self.world, &self.events);
        // 6. Cleanup (terminated projectiles)
        systems::cleanup::run(&mut self.projectiles, &mut self.despawn_buffer);
    }
}
