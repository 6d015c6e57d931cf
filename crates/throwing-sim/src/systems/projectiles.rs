//! Projectile systems: collision delivery and per-phase stepping.

use std::collections::BTreeMap;

use hecs::World;
use tracing::debug;

use throwing_core::types::{Collision, ProjectileId};

use crate::lifecycle::{Projectile, StepContext};
use crate::world_setup::WorldTargets;

/// Deliver collisions reported since the last step, in report order. Reports
/// for projectiles that have gone away are dropped.
pub fn resolve_collisions(
    projectiles: &mut BTreeMap<ProjectileId, Projectile>,
    world: &World,
    collisions: &mut Vec<(ProjectileId, Collision)>,
    ctx: &mut StepContext<'_>,
) {
    let targets = WorldTargets(world);
    for (id, collision) in collisions.drain(..) {
        match projectiles.get_mut(&id) {
            Some(projectile) => projectile.on_collision(&collision, &targets, ctx),
            None => debug!(projectile = %id, "collision for removed projectile ignored"),
        }
    }
}

/// Advance every live projectile by one step, in id order.
pub fn run(
    projectiles: &mut BTreeMap<ProjectileId, Projectile>,
    world: &World,
    ctx: &mut StepContext<'_>,
) {
    let targets = WorldTargets(world);
    for projectile in projectiles.values_mut() {
        if !projectile.is_terminated() {
            projectile.step(&targets, ctx);
        }
    }
}
