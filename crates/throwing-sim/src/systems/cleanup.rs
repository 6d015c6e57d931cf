//! Cleanup system: removes projectiles that have terminated.

use std::collections::BTreeMap;

use throwing_core::types::ProjectileId;

use crate::lifecycle::Projectile;

/// Drop terminated projectiles from the table. Their terminal side effect has
/// already been emitted. Uses a caller-owned buffer to avoid per-step
/// allocation.
pub fn run(
    projectiles: &mut BTreeMap<ProjectileId, Projectile>,
    despawn_buffer: &mut Vec<ProjectileId>,
) {
    despawn_buffer.clear();
    despawn_buffer.extend(
        projectiles
            .iter()
            .filter(|(_, p)| p.is_terminated())
            .map(|(id, _)| *id),
    );
    for id in despawn_buffer.drain(..) {
        projectiles.remove(&id);
    }
}
