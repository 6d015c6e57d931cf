//! Scripted actor motion.
//!
//! Moves every living actor by its per-step velocity and turns it by its yaw
//! rate. Dead actors stay where they fell.

use hecs::World;

use throwing_core::components::{Health, Motion, Transform};
use throwing_core::math;

pub fn run(world: &mut World) {
    for (_entity, (transform, motion, health)) in
        world.query_mut::<(&mut Transform, &Motion, &Health)>()
    {
        if !health.is_alive() {
            continue;
        }
        transform.position += motion.velocity;
        transform.body_yaw_degrees =
            math::wrap_degrees(transform.body_yaw_degrees + motion.yaw_rate_degrees);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throwing_core::types::Vector3;

    #[test]
    fn test_living_actor_moves_and_turns() {
        let mut world = World::new();
        let e = world.spawn((
            Transform {
                position: Vector3::ZERO,
                body_yaw_degrees: 175.0,
                pitch_degrees: 0.0,
            },
            Motion {
                velocity: Vector3::new(0.1, 0.0, -0.2),
                yaw_rate_degrees: 10.0,
            },
            Health::new(20.0),
        ));
        run(&mut world);
        let t = *world.get::<&Transform>(e).unwrap();
        assert!((t.position - Vector3::new(0.1, 0.0, -0.2)).length() < 1e-12);
        assert!((t.body_yaw_degrees - -175.0).abs() < 1e-9);
    }

    #[test]
    fn test_dead_actor_stays_put() {
        let mut world = World::new();
        let mut health = Health::new(5.0);
        health.apply(10.0);
        let e = world.spawn((
            Transform::default(),
            Motion {
                velocity: Vector3::X,
                yaw_rate_degrees: 5.0,
            },
            health,
        ));
        run(&mut world);
        assert_eq!(*world.get::<&Transform>(e).unwrap(), Transform::default());
    }
}
