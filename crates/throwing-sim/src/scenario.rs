//! Scenario definitions: actors plus a step-indexed script of throws,
//! collisions and catches, runnable headless.
//!
//! Scenario files refer to actors by their index in `actors`, since actor
//! ids are only known once the world exists. Projectile ids are assigned in
//! launch order starting at 1.
//!
//! With `detect_collisions` on, a simple contact probe stands in for the host
//! physics: a flat ground at `ground_level` and upright cylinders for actors.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use throwing_core::commands::ThrowCommand;
use throwing_core::config::ThrowPolicy;
use throwing_core::constants::TICK_RATE;
use throwing_core::enums::{DamageCause, ProjectilePhase};
use throwing_core::events::ProjectileEvent;
use throwing_core::state::StepSnapshot;
use throwing_core::types::*;

use crate::engine::{SimConfig, SimulationEngine};
use crate::error::{EngineError, EngineResult};
use crate::world_setup::{self, ActorSpec};

/// Half-size of a thrown item for contact tests.
const ITEM_RADIUS: f64 = 0.25;

/// Sub-samples along each step's travel when probing for contacts.
const CONTACT_SAMPLES: usize = 8;

/// Hand height above the feet of a standing thrower.
const HAND_HEIGHT: f64 = 1.5;

fn default_true() -> bool {
    true
}

/// A complete scripted run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Policy for the run. Defaults apply when absent.
    #[serde(default)]
    pub policy: Option<ThrowPolicy>,
    #[serde(default)]
    pub actors: Vec<ActorSpec>,
    #[serde(default)]
    pub script: Vec<ScriptedEntry>,
    /// Number of steps to run.
    pub steps: u64,
    #[serde(default = "default_true")]
    pub detect_collisions: bool,
    #[serde(default)]
    pub ground_level: f64,
}

/// One scripted action, applied before the step with the given number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedEntry {
    pub step: u64,
    pub action: ScriptedAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptedAction {
    Throw {
        #[serde(default)]
        thrower: Option<usize>,
        origin: Vector3,
        velocity: Vector3,
        #[serde(default)]
        hand_roll_degrees: f64,
        item: ThrownItem,
        #[serde(default)]
        aim_assist: bool,
    },
    /// A collision report. No `target` means terrain.
    Collide {
        projectile: ProjectileId,
        #[serde(default)]
        target: Option<usize>,
        hit_point: Vector3,
    },
    StartCatch {
        projectile: ProjectileId,
        catcher: usize,
    },
    UpdateCatch {
        projectile: ProjectileId,
        velocity: Vector3,
        hand_roll_degrees: f64,
    },
    CompleteCatch {
        projectile: ProjectileId,
    },
    CancelCatch {
        projectile: ProjectileId,
    },
    Kill {
        actor: usize,
    },
    Despawn {
        actor: usize,
    },
}

/// Totals over a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub steps: u64,
    pub launched: u32,
    pub drops: u32,
    pub deliveries: u32,
    pub impact_damage: f64,
    pub bleed_damage: f64,
    pub actors_alive: u32,
}

impl ScenarioSummary {
    fn record(&mut self, snapshot: &StepSnapshot) {
        self.steps = snapshot.time.step;
        for event in &snapshot.events {
            match event {
                ProjectileEvent::Launched { .. } => self.launched += 1,
                ProjectileEvent::SpawnDroppedItem { .. } => self.drops += 1,
                ProjectileEvent::DeliverToInventory { .. } => self.deliveries += 1,
                ProjectileEvent::DamageRequested(req) => match req.cause {
                    DamageCause::Impact => self.impact_damage += req.base_amount,
                    DamageCause::Bleed => self.bleed_damage += req.base_amount,
                },
                _ => {}
            }
        }
        self.actors_alive = snapshot.actors.iter().filter(|a| a.alive).count() as u32;
    }
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// A seeded crowd around one thrower, who throws a random item at a
    /// random actor every second or two. Same seed, same scenario.
    pub fn random(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut actors = vec![ActorSpec::thrower(Vector3::ZERO)];
        actors.extend(world_setup::random_crowd(&mut rng, 6, Vector3::ZERO, 5.0, 15.0));

        let items = [
            ThrownItem::new(ItemStack::new("minecraft:iron_axe", 1).with_durability(0, 250), 8.0),
            ThrownItem::new(ItemStack::new("minecraft:diamond_sword", 1).with_durability(0, 1561), 6.0),
            ThrownItem::new(ItemStack::new("minecraft:trident", 1).with_durability(0, 250), 8.0),
            ThrownItem::new(ItemStack::new("minecraft:stick", 1), 0.0),
            ThrownItem::new(ItemStack::new("minecraft:cobblestone", 16), 0.0),
        ];

        let steps = 30 * u64::from(TICK_RATE);
        let hand = Vector3::new(0.0, HAND_HEIGHT, 0.0);
        let mut script = Vec::new();
        let mut step = rng.gen_range(10..30);
        while step < steps - u64::from(TICK_RATE) * 5 {
            let target = &actors[rng.gen_range(1..actors.len())];
            let aim = target.position + Vector3::new(0.0, target.height * 0.6, 0.0) - hand;
            let jitter = Vector3::new(
                rng.gen_range(-0.08..0.08),
                rng.gen_range(0.0..0.12),
                rng.gen_range(-0.08..0.08),
            );
            let speed = rng.gen_range(1.2..2.0);
            let item = items.choose(&mut rng).cloned().unwrap_or_else(|| items[0].clone());
            script.push(ScriptedEntry {
                step,
                action: ScriptedAction::Throw {
                    thrower: Some(0),
                    origin: hand,
                    velocity: aim.normalize_or_zero() * speed + jitter,
                    hand_roll_degrees: rng.gen_range(-90.0..90.0),
                    item,
                    aim_assist: rng.gen_bool(0.7),
                },
            });
            step += rng.gen_range(20..45);
        }

        Self {
            name: format!("random-{seed}"),
            policy: None,
            actors,
            script,
            steps,
            detect_collisions: true,
            ground_level: 0.0,
        }
    }

    /// Run to completion, handing every snapshot to `on_step`.
    pub fn run(&self, mut on_step: impl FnMut(&StepSnapshot)) -> EngineResult<ScenarioSummary> {
        let policy = self.policy.clone().unwrap_or_default();
        policy.validate()?;

        let mut engine = SimulationEngine::new(SimConfig { policy });
        let ids: Vec<ActorId> = self.actors.iter().map(|spec| engine.spawn_actor(spec)).collect();
        let actor = |index: usize| ids.get(index).copied().ok_or(EngineError::UnknownScenarioActor(index));

        let mut script: Vec<&ScriptedEntry> = self.script.iter().collect();
        script.sort_by_key(|entry| entry.step);
        let mut pending = script.into_iter().peekable();

        info!(name = %self.name, actors = ids.len(), steps = self.steps, "scenario started");
        let mut summary = ScenarioSummary::default();
        for _ in 0..self.steps {
            let step = engine.time().step;
            while let Some(entry) = pending.next_if(|entry| entry.step <= step) {
                self.apply(&mut engine, &entry.action, &actor)?;
            }
            if self.detect_collisions {
                for (projectile, collision) in detect_contacts(&engine, self.ground_level) {
                    engine.report_collision(projectile, collision)?;
                }
            }
            let snapshot = engine.tick();
            summary.record(&snapshot);
            on_step(&snapshot);
        }
        info!(
            name = %self.name,
            launched = summary.launched,
            drops = summary.drops,
            impact = summary.impact_damage,
            bleed = summary.bleed_damage,
            "scenario finished"
        );
        Ok(summary)
    }

    fn apply(
        &self,
        engine: &mut SimulationEngine,
        action: &ScriptedAction,
        actor: &impl Fn(usize) -> EngineResult<ActorId>,
    ) -> EngineResult<()> {
        let step = engine.time().step;
        let command = match action {
            ScriptedAction::Throw {
                thrower,
                origin,
                velocity,
                hand_roll_degrees,
                item,
                aim_assist,
            } => ThrowCommand::Launch {
                request: LaunchRequest {
                    origin: *origin,
                    velocity: *velocity,
                    hand_roll_degrees: *hand_roll_degrees,
                    launched_at_step: step,
                },
                item: item.clone(),
                thrower: thrower.map(actor).transpose()?,
                aim_assist: *aim_assist,
            },
            ScriptedAction::Collide {
                projectile,
                target,
                hit_point,
            } => {
                let collision = match target {
                    Some(index) => Collision::Entity {
                        target: actor(*index)?,
                        hit_point: *hit_point,
                    },
                    None => Collision::Terrain {
                        hit_point: *hit_point,
                    },
                };
                if let Err(err) = engine.report_collision(*projectile, collision) {
                    warn!(step, %err, "scripted collision skipped");
                }
                return Ok(());
            }
            ScriptedAction::StartCatch {
                projectile,
                catcher,
            } => ThrowCommand::StartCatch {
                projectile: *projectile,
                catcher: actor(*catcher)?,
            },
            ScriptedAction::UpdateCatch {
                projectile,
                velocity,
                hand_roll_degrees,
            } => ThrowCommand::UpdateCatch {
                projectile: *projectile,
                velocity: *velocity,
                hand_roll_degrees: *hand_roll_degrees,
            },
            ScriptedAction::CompleteCatch { projectile } => ThrowCommand::CompleteCatch {
                projectile: *projectile,
            },
            ScriptedAction::CancelCatch { projectile } => ThrowCommand::CancelCatch {
                projectile: *projectile,
            },
            ScriptedAction::Kill { actor: index } => {
                if let Err(err) = engine.kill_actor(actor(*index)?) {
                    warn!(step, %err, "scripted kill skipped");
                }
                return Ok(());
            }
            ScriptedAction::Despawn { actor: index } => {
                if let Err(err) = engine.despawn_actor(actor(*index)?) {
                    warn!(step, %err, "scripted despawn skipped");
                }
                return Ok(());
            }
        };
        engine.queue_command(command);
        Ok(())
    }
}

/// Contacts for every airborne projectile along its last step of travel.
/// The thrower is never hit by its own projectile.
pub fn detect_contacts(engine: &SimulationEngine, ground_level: f64) -> Vec<(ProjectileId, Collision)> {
    let targets: Vec<TargetSnapshot> = world_setup::all_targets(engine.world())
        .into_iter()
        .filter(|t| t.alive)
        .collect();
    engine
        .projectiles()
        .filter(|p| matches!(p.phase().kind(), ProjectilePhase::Flying | ProjectilePhase::Returning))
        .filter_map(|p| {
            let end = p.position();
            let start = end - p.velocity();
            first_contact(start, end, p.owner(), &targets, ground_level).map(|c| (p.id(), c))
        })
        .collect()
}

fn first_contact(
    start: Vector3,
    end: Vector3,
    owner: Option<ActorId>,
    targets: &[TargetSnapshot],
    ground_level: f64,
) -> Option<Collision> {
    for i in 1..=CONTACT_SAMPLES {
        let point = start.lerp(end, i as f64 / CONTACT_SAMPLES as f64);
        let hit = targets.iter().find(|t| {
            if Some(t.id) == owner {
                return false;
            }
            let dx = point.x - t.position.x;
            let dz = point.z - t.position.z;
            let within_radius = (dx * dx + dz * dz).sqrt() <= t.bounding_radius + ITEM_RADIUS;
            within_radius && point.y >= t.position.y && point.y <= t.position.y + t.height
        });
        if let Some(t) = hit {
            return Some(Collision::Entity {
                target: t.id,
                hit_point: point,
            });
        }
        if point.y <= ground_level {
            return Some(Collision::Terrain {
                hit_point: Vector3::new(point.x, ground_level, point.z),
            });
        }
    }
    None
}
