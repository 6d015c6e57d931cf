use crate::commands::ThrowCommand;
use crate::config::{ItemSet, ThrowPolicy};
use crate::constants::*;
use crate::enums::*;
use crate::error::ConfigError;
use crate::events::{DamageRequest, ProjectileEvent, SyncField};
use crate::types::*;

/// Verify all enums round-trip through serde_json.
#[test]
fn test_projectile_phase_serde() {
    let variants = vec![
        ProjectilePhase::Flying,
        ProjectilePhase::Catching,
        ProjectilePhase::Returning,
        ProjectilePhase::Embedded,
        ProjectilePhase::Terminated,
    ];
    for v in variants {
        let json = serde_json::to_string(&v).unwrap();
        let back: ProjectilePhase = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}

#[test]
fn test_target_kind_serde() {
    for v in [TargetKind::Hostile, TargetKind::Player, TargetKind::Passive] {
        let json = serde_json::to_string(&v).unwrap();
        let back: TargetKind = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}

#[test]
fn test_vector_serializes_as_array() {
    let json = serde_json::to_string(&Vector3::new(1.0, 2.5, -3.0)).unwrap();
    assert_eq!(json, "[1.0,2.5,-3.0]");
}

#[test]
fn test_launch_command_from_json() {
    let json = r#"{
        "type": "Launch",
        "request": { "origin": [0.0, 1.5, 0.0], "velocity": [0.0, 0.2, 1.2] },
        "item": { "stack": { "item": "minecraft:iron_axe", "count": 1 }, "attack_bonus": 8.0 },
        "aim_assist": true
    }"#;
    let cmd: ThrowCommand = serde_json::from_str(json).unwrap();
    match cmd {
        ThrowCommand::Launch {
            request,
            item,
            thrower,
            aim_assist,
        } => {
            assert_eq!(request.hand_roll_degrees, 0.0);
            assert_eq!(request.launched_at_step, 0);
            assert_eq!(item.item_key(), "minecraft:iron_axe");
            assert_eq!(item.stack.durability, None);
            assert_eq!(thrower, None);
            assert!(aim_assist);
        }
        other => panic!("expected Launch, got {other:?}"),
    }
}

#[test]
fn test_command_projectile_accessor() {
    let cancel = ThrowCommand::CancelCatch {
        projectile: ProjectileId(7),
    };
    assert_eq!(cancel.projectile(), Some(ProjectileId(7)));
}

#[test]
fn test_event_tagging() {
    let ev = ProjectileEvent::SyncDelta {
        projectile: ProjectileId(3),
        field: SyncField::Catching { active: true },
    };
    let value: serde_json::Value = serde_json::to_value(&ev).unwrap();
    assert_eq!(value["type"], "SyncDelta");
    assert_eq!(value["field"]["field"], "Catching");
    assert_eq!(value["field"]["active"], true);

    let back: ProjectileEvent = serde_json::from_value(value).unwrap();
    assert_eq!(back, ev);
}

#[test]
fn test_damage_event_reports_source() {
    let ev = ProjectileEvent::DamageRequested(DamageRequest {
        base_amount: 9.0,
        source: ProjectileId(2),
        target: ActorId(11),
        cause: DamageCause::Impact,
    });
    assert_eq!(ev.projectile(), Some(ProjectileId(2)));
    assert!(!ev.is_terminal_side_effect());
}

#[test]
fn test_base_damage_adds_bonus_to_bare_hand() {
    let axe = ThrownItem::new(ItemStack::new("minecraft:iron_axe", 1), 8.0);
    assert_eq!(axe.base_damage(), 9.0);
    let stick = ThrownItem::new(ItemStack::new("minecraft:stick", 1), 0.0);
    assert_eq!(stick.base_damage(), BARE_HAND_DAMAGE);
}

#[test]
fn test_stack_wear_clamps_to_max() {
    let stack = ItemStack::new("minecraft:iron_axe", 3).with_durability(248, 250);
    let worn = stack.worn_by(3);
    assert_eq!(worn.durability.unwrap().damage, 250);
    // Original stack is untouched.
    assert_eq!(stack.durability.unwrap().damage, 248);

    let plain = ItemStack::new("minecraft:snowball", 16);
    assert_eq!(plain.worn_by(16), plain);
}

#[test]
fn test_sim_time_advance() {
    let mut t = SimTime::default();
    for _ in 0..TICK_RATE {
        t.advance();
    }
    assert_eq!(t.step, TICK_RATE as u64);
    assert!((t.elapsed_secs - 1.0).abs() < 1e-9);
}

#[test]
fn test_target_lookup_on_slice() {
    let snap = TargetSnapshot {
        id: ActorId(4),
        position: Vector3::new(1.0, 0.0, 1.0),
        velocity: Vector3::ZERO,
        alive: true,
        bounding_radius: 0.3,
        height: 1.8,
        body_yaw_degrees: 0.0,
        pitch_degrees: 0.0,
        kind: TargetKind::Hostile,
    };
    let actors = vec![snap];
    assert_eq!(actors.lookup(ActorId(4)), Some(snap));
    assert_eq!(actors.lookup(ActorId(5)), None);
    assert!((snap.bounding_center().y - 0.9).abs() < 1e-12);
}

// --- Policy ---

#[test]
fn test_policy_defaults_match_constants() {
    let policy = ThrowPolicy::default();
    assert!(policy.boomerang_effect);
    assert_eq!(policy.physics.gravity, FLIGHT_GRAVITY);
    assert_eq!(policy.aim_assist.max_cone_degrees, AIM_MAX_CONE_DEGREES);
    assert_eq!(policy.returning.timeout_steps, RETURN_TIMEOUT_STEPS);
    assert_eq!(policy.embedding.bleed_interval_steps, BLEED_INTERVAL_STEPS);
    assert!(policy.validate().is_ok());
}

#[test]
fn test_policy_partial_json_fills_defaults() {
    let policy = ThrowPolicy::from_json_str(
        r#"{ "boomerang_effect": false, "returning": { "timeout_steps": 120 } }"#,
    )
    .unwrap();
    assert!(!policy.boomerang_effect);
    assert_eq!(policy.returning.timeout_steps, 120);
    assert_eq!(policy.returning.arc_decay, RETURN_ARC_DECAY);
    assert_eq!(policy.items.bounce, ItemSet::All);
}

#[test]
fn test_policy_item_sets() {
    let policy = ThrowPolicy::from_json_str(
        r#"{ "items": {
            "bounce": { "mode": "only", "items": ["minecraft:iron_axe"] },
            "embed": { "mode": "none" }
        } }"#,
    )
    .unwrap();
    assert!(policy.items.bounce.contains("minecraft:iron_axe"));
    assert!(!policy.items.bounce.contains("minecraft:stick"));
    assert!(!policy.items.embed.contains("minecraft:iron_axe"));
}

#[test]
fn test_policy_json_round_trip() {
    let mut policy = ThrowPolicy::default();
    policy.items.embed = ItemSet::only(["minecraft:trident", "minecraft:iron_sword"]);
    let json = policy.to_json_pretty().unwrap();
    let back = ThrowPolicy::from_json_str(&json).unwrap();
    assert_eq!(back, policy);
}

#[test]
fn test_policy_rejects_bad_values() {
    let err = ThrowPolicy::from_json_str(r#"{ "embedding": { "bleed_interval_steps": 0 } }"#)
        .unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { field: "embedding.bleed_interval_steps", .. }),
        "unexpected error: {err}"
    );

    let err =
        ThrowPolicy::from_json_str(r#"{ "returning": { "far_distance": 2.0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "returning.far_distance", .. }));

    let err = ThrowPolicy::from_json_str(r#"{ "physics": { "drag": 1.5 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "physics.drag", .. }));
}

#[test]
fn test_policy_parse_error() {
    let err = ThrowPolicy::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_policy_load_or_default_missing_file() {
    let policy =
        ThrowPolicy::load_or_default("/nonexistent/throw-policy-does-not-exist.json").unwrap();
    assert_eq!(policy, ThrowPolicy::default());
    assert!(matches!(
        ThrowPolicy::load("/nonexistent/throw-policy-does-not-exist.json"),
        Err(ConfigError::Io { .. })
    ));
}
