//! Host-side application of damage and knockback requests.
//!
//! The projectile machinery only requests damage. This system plays the part
//! of the host's damage pipeline for the simulated world: base amounts go
//! straight to [`Health`] and knockback impulses displace the actor once.

use hecs::World;
use tracing::debug;

use throwing_core::components::{Health, Transform};
use throwing_core::events::ProjectileEvent;

use crate::world_setup::entity_of;

pub fn run(world: &mut World, events: &[ProjectileEvent]) {
    for event in events {
        match event {
            ProjectileEvent::DamageRequested(request) => {
                let Some(entity) = entity_of(request.target) else {
                    continue;
                };
                let Ok(mut health) = world.get::<&mut Health>(entity) else {
                    continue;
                };
                let was_alive = health.is_alive();
                health.apply(request.base_amount);
                if was_alive && !health.is_alive() {
                    debug!(
                        target = %request.target,
                        source = %request.source,
                        cause = ?request.cause,
                        "actor killed"
                    );
                }
            }
            ProjectileEvent::KnockbackRequested { target, impulse } => {
                let Some(entity) = entity_of(*target) else {
                    continue;
                };
                if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
                    transform.position += *impulse;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throwing_core::enums::DamageCause;
    use throwing_core::events::DamageRequest;
    use throwing_core::types::{ActorId, ProjectileId, Vector3};

    use crate::world_setup::actor_id;

    #[test]
    fn test_damage_and_knockback_applied() {
        let mut world = World::new();
        let e = world.spawn((Transform::default(), Health::new(4.0)));
        let target = actor_id(e);
        let events = vec![
            ProjectileEvent::DamageRequested(DamageRequest {
                base_amount: 3.0,
                source: ProjectileId(1),
                target,
                cause: DamageCause::Impact,
            }),
            ProjectileEvent::KnockbackRequested {
                target,
                impulse: Vector3::new(0.0, 0.1, 0.5),
            },
            ProjectileEvent::DamageRequested(DamageRequest {
                base_amount: 3.0,
                source: ProjectileId(1),
                target,
                cause: DamageCause::Bleed,
            }),
        ];
        run(&mut world, &events);
        let health = *world.get::<&Health>(e).unwrap();
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());
        assert_eq!(
            world.get::<&Transform>(e).unwrap().position,
            Vector3::new(0.0, 0.1, 0.5)
        );
    }

    #[test]
    fn test_requests_for_missing_actors_are_ignored() {
        let mut world = World::new();
        let events = vec![ProjectileEvent::KnockbackRequested {
            target: ActorId(12345),
            impulse: Vector3::Y,
        }];
        run(&mut world, &events);
        assert_eq!(world.len(), 0);
    }
}
