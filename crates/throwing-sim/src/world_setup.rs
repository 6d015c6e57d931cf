//! Actor spawn factories and the world-to-target adapter.
//!
//! Actors are hecs entities carrying [`ActorBody`], [`Transform`], [`Motion`]
//! and [`Health`]. Their [`ActorId`] is the entity's bit pattern, so ids of
//! despawned actors resolve to nothing instead of to a recycled slot.

use hecs::{Entity, EntityBuilder, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use throwing_core::components::*;
use throwing_core::enums::TargetKind;
use throwing_core::math;
use throwing_core::types::{ActorId, TargetLookup, TargetSnapshot, Vector3};

/// Description of an actor to spawn, as written in scenario files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    #[serde(default)]
    pub kind: TargetKind,
    pub position: Vector3,
    #[serde(default)]
    pub velocity: Vector3,
    #[serde(default)]
    pub body_yaw_degrees: f64,
    #[serde(default)]
    pub yaw_rate_degrees: f64,
    #[serde(default = "default_health")]
    pub health: f64,
    #[serde(default = "default_radius")]
    pub bounding_radius: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Throwers are never aim assist candidates for their own throws.
    #[serde(default)]
    pub thrower: bool,
}

fn default_health() -> f64 {
    20.0
}

fn default_radius() -> f64 {
    0.3
}

fn default_height() -> f64 {
    1.8
}

impl ActorSpec {
    pub fn new(kind: TargetKind, position: Vector3) -> Self {
        Self {
            kind,
            position,
            velocity: Vector3::ZERO,
            body_yaw_degrees: 0.0,
            yaw_rate_degrees: 0.0,
            health: default_health(),
            bounding_radius: default_radius(),
            height: default_height(),
            thrower: false,
        }
    }

    pub fn thrower(position: Vector3) -> Self {
        Self {
            thrower: true,
            ..Self::new(TargetKind::Player, position)
        }
    }
}

pub fn actor_id(entity: Entity) -> ActorId {
    ActorId(entity.to_bits().get())
}

pub fn entity_of(id: ActorId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

/// Spawn one actor.
pub fn spawn_actor(world: &mut World, spec: &ActorSpec) -> ActorId {
    let mut builder = EntityBuilder::new();
    builder.add_bundle((
        ActorBody {
            kind: spec.kind,
            bounding_radius: spec.bounding_radius,
            height: spec.height,
        },
        Transform {
            position: spec.position,
            body_yaw_degrees: spec.body_yaw_degrees,
            pitch_degrees: 0.0,
        },
        Motion {
            velocity: spec.velocity,
            yaw_rate_degrees: spec.yaw_rate_degrees,
        },
        Health::new(spec.health),
    ));
    if spec.thrower {
        builder.add(Thrower);
    }
    let entity = world.spawn(builder.build());
    actor_id(entity)
}

/// `count` actors scattered in a ring around `center`, mostly hostile, some
/// wandering.
pub fn random_crowd(
    rng: &mut ChaCha8Rng,
    count: usize,
    center: Vector3,
    min_radius: f64,
    max_radius: f64,
) -> Vec<ActorSpec> {
    (0..count)
        .map(|_| {
            let bearing: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let radius = rng.gen_range(min_radius..max_radius);
            let position = center + Vector3::new(bearing.sin() * radius, 0.0, bearing.cos() * radius);
            let kind = match rng.gen_range(0..10) {
                0..=5 => TargetKind::Hostile,
                6..=7 => TargetKind::Passive,
                _ => TargetKind::Player,
            };
            let mut spec = ActorSpec::new(kind, position);
            spec.body_yaw_degrees = rng.gen_range(-180.0..180.0);
            if rng.gen_bool(0.4) {
                let heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
                spec.velocity = Vector3::new(heading.sin(), 0.0, heading.cos()) * 0.05;
                spec.yaw_rate_degrees = rng.gen_range(-6.0..6.0);
            }
            spec
        })
        .collect()
}

/// Snapshot one actor. `None` for entities that are gone or are not actors.
pub fn target_snapshot(world: &World, entity: Entity) -> Option<TargetSnapshot> {
    let body = *world.get::<&ActorBody>(entity).ok()?;
    let transform = *world.get::<&Transform>(entity).ok()?;
    let velocity = world
        .get::<&Motion>(entity)
        .map(|m| m.velocity)
        .unwrap_or(Vector3::ZERO);
    let alive = world
        .get::<&Health>(entity)
        .map(|h| h.is_alive())
        .unwrap_or(true);
    Some(TargetSnapshot {
        id: actor_id(entity),
        position: transform.position,
        velocity,
        alive,
        bounding_radius: body.bounding_radius,
        height: body.height,
        body_yaw_degrees: math::wrap_degrees(transform.body_yaw_degrees),
        pitch_degrees: transform.pitch_degrees,
        kind: body.kind,
    })
}

/// Every actor in the world, ordered by id.
pub fn all_targets(world: &World) -> Vec<TargetSnapshot> {
    let mut targets: Vec<TargetSnapshot> = world
        .query::<&ActorBody>()
        .iter()
        .filter_map(|(entity, _)| target_snapshot(world, entity))
        .collect();
    targets.sort_by_key(|t| t.id);
    targets
}

/// Live view of the world for projectile lookups.
pub struct WorldTargets<'w>(pub &'w World);

impl TargetLookup for WorldTargets<'_> {
    fn lookup(&self, id: ActorId) -> Option<TargetSnapshot> {
        target_snapshot(self.0, entity_of(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_spawned_actor_resolves_by_id() {
        let mut world = World::new();
        let id = spawn_actor(&mut world, &ActorSpec::new(TargetKind::Hostile, Vector3::new(1.0, 0.0, 2.0)));
        let snap = WorldTargets(&world).lookup(id).unwrap();
        assert_eq!(snap.position, Vector3::new(1.0, 0.0, 2.0));
        assert_eq!(snap.kind, TargetKind::Hostile);
        assert!(snap.alive);
    }

    #[test]
    fn test_thrower_marker_spawned_with_body() {
        let mut world = World::new();
        let thrower = spawn_actor(&mut world, &ActorSpec::thrower(Vector3::ZERO));
        let other = spawn_actor(&mut world, &ActorSpec::new(TargetKind::Hostile, Vector3::Z));

        let e = entity_of(thrower).unwrap();
        assert!(world.get::<&Thrower>(e).is_ok());
        assert!(world.get::<&ActorBody>(e).is_ok());
        assert!(world.get::<&Health>(e).is_ok());
        assert!(world.get::<&Thrower>(entity_of(other).unwrap()).is_err());
    }

    #[test]
    fn test_despawned_actor_id_does_not_resolve() {
        let mut world = World::new();
        let id = spawn_actor(&mut world, &ActorSpec::new(TargetKind::Passive, Vector3::ZERO));
        let entity = entity_of(id).unwrap();
        world.despawn(entity).unwrap();
        // Reuse the slot.
        let other = spawn_actor(&mut world, &ActorSpec::new(TargetKind::Passive, Vector3::ZERO));
        assert_ne!(id, other);
        assert!(WorldTargets(&world).lookup(id).is_none());
    }

    #[test]
    fn test_random_crowd_is_deterministic() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(7);
        let mut rng_b = ChaCha8Rng::seed_from_u64(7);
        let a = random_crowd(&mut rng_a, 6, Vector3::ZERO, 4.0, 12.0);
        let b = random_crowd(&mut rng_b, 6, Vector3::ZERO, 4.0, 12.0);
        assert_eq!(a.len(), 6);
        assert_eq!(a, b);
        for spec in &a {
            let r = math::horizontal_length(spec.position);
            assert!((4.0..12.0).contains(&r), "radius {r:.2} outside ring");
        }

        let mut world = World::new();
        let ids: Vec<ActorId> = a.iter().map(|spec| spawn_actor(&mut world, spec)).collect();
        let targets = all_targets(&world);
        assert_eq!(targets.len(), 6);
        assert!(targets.iter().all(|t| ids.contains(&t.id)));
    }
}
