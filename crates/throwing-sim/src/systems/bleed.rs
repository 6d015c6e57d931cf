//! Bleed system: periodic damage from projectiles embedded in a host.
//!
//! Embedded projectiles ask for a check of their host's group every step. Each
//! host is checked once per step no matter how many members asked; the
//! registry decides whether the step is on the host's cycle.

use std::collections::BTreeMap;

use hecs::World;

use throwing_core::config::EmbedTuning;
use throwing_core::enums::{CueKind, DamageCause};
use throwing_core::events::{DamageRequest, ProjectileEvent};
use throwing_core::types::{ActorId, ProjectileId, TargetLookup};

use crate::embed::EmbedRegistry;
use crate::lifecycle::{Phase, Projectile};
use crate::world_setup::WorldTargets;

pub fn run(
    world: &World,
    projectiles: &BTreeMap<ProjectileId, Projectile>,
    embeds: &mut EmbedRegistry,
    checks: &mut Vec<ActorId>,
    step: u64,
    tuning: &EmbedTuning,
    events: &mut Vec<ProjectileEvent>,
) {
    checks.sort_unstable();
    checks.dedup();
    let targets = WorldTargets(world);

    for host in checks.drain(..) {
        let host_alive = targets.lookup(host).is_some_and(|t| t.alive);
        let is_valid = |id: ProjectileId| {
            projectiles
                .get(&id)
                .is_some_and(|p| matches!(p.phase(), Phase::Embedded(anchor) if anchor.host == host))
        };
        let Some(tick) = embeds.try_apply(host, step, host_alive, tuning, is_valid) else {
            continue;
        };
        let Some(&source) = tick.members.first() else {
            continue;
        };

        events.push(ProjectileEvent::DamageRequested(DamageRequest {
            base_amount: tick.total,
            source,
            target: host,
            cause: DamageCause::Bleed,
        }));
        for member in &tick.members {
            if let Some(p) = projectiles.get(member) {
                events.push(ProjectileEvent::Cue {
                    projectile: *member,
                    kind: CueKind::BleedTick,
                    position: p.position(),
                });
            }
        }
    }
}
