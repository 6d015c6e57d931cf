//! Snapshot system: builds the [`StepSnapshot`] handed out after each step.
//!
//! Read-only. Never modifies the world or the projectile table.

use std::collections::BTreeMap;

use hecs::World;

use throwing_core::components::{ActorBody, Health, Transform};
use throwing_core::config::ThrowPolicy;
use throwing_core::events::ProjectileEvent;
use throwing_core::state::*;
use throwing_core::types::{ProjectileId, SimTime};

use crate::lifecycle::{Phase, PriorMotion, Projectile};
use crate::world_setup::actor_id;

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    projectiles: &BTreeMap<ProjectileId, Projectile>,
    policy: &ThrowPolicy,
    events: Vec<ProjectileEvent>,
) -> StepSnapshot {
    StepSnapshot {
        time: *time,
        projectiles: projectiles
            .values()
            .map(|p| build_projectile(p, time.step, policy))
            .collect(),
        actors: build_actors(world),
        events,
    }
}

fn build_projectile(p: &Projectile, step: u64, policy: &ThrowPolicy) -> ProjectileView {
    let phase = p.phase();
    let bounce_active = match phase {
        Phase::Returning(_) => true,
        Phase::Catching(held) => matches!(held.prior, PriorMotion::Returning(_)),
        _ => false,
    };
    let embedded_in = match phase {
        Phase::Embedded(anchor) => Some(anchor.host),
        _ => None,
    };
    let pose = p.embed_pose();
    ProjectileView {
        id: p.id(),
        phase: phase.kind(),
        item: p.item().item_key().to_string(),
        count: p.item().stack.count,
        position: p.position(),
        velocity: p.velocity(),
        hand_roll_degrees: p.hand_roll_degrees(),
        roll_degrees: p.roll_degrees(step, policy),
        bounce_active,
        catching: matches!(phase, Phase::Catching(_)),
        embedded_in,
        embed_yaw_degrees: pose.map(|pose| pose.yaw_degrees),
        embed_pitch_degrees: pose.map(|pose| pose.pitch_degrees),
    }
}

fn build_actors(world: &World) -> Vec<ActorView> {
    let mut actors: Vec<ActorView> = world
        .query::<(&ActorBody, &Transform, &Health)>()
        .iter()
        .map(|(entity, (body, transform, health))| ActorView {
            id: actor_id(entity),
            kind: body.kind,
            position: transform.position,
            body_yaw_degrees: transform.body_yaw_degrees,
            health: health.current,
            alive: health.is_alive(),
        })
        .collect();
    actors.sort_by_key(|a| a.id);
    actors
}
