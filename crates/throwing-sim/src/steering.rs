//! Boomerang return steering.
//!
//! On a qualifying hit the projectile turns around and flies back to where it
//! was thrown from along a curved arc. The arc bulges toward a side picked by
//! the hand roll at release and collapses as the projectile closes in, so the
//! final approach is straight into the thrower's hand.

use throwing_core::config::ReturnTuning;
use throwing_core::constants::*;
use throwing_core::math;
use throwing_core::types::Vector3;

/// Returning-phase state. Lives inside the projectile's phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnState {
    /// Steering target offset from the origin; decays toward zero.
    pub curve_offset: Vector3,
    /// Normal of the arc plane, fixed at initiation.
    pub plane_normal: Vector3,
    pub arc_magnitude: f64,
    /// Negative hand roll mirrors the arc plane.
    pub inverse: bool,
    /// Returning steps taken so far.
    pub steps: u32,
}

/// Result of starting a return flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStart {
    pub state: ReturnState,
    /// Initial return velocity.
    pub velocity: Vector3,
    pub distance: f64,
}

/// Outcome of one steering update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnProgress {
    /// Reached the origin, or passed it while close.
    Arrived { overshoot: bool },
    /// Still returning with this new velocity.
    Steering { velocity: Vector3 },
}

/// Speed multiplier for a given distance to the origin.
///
/// Clamped to the close multiplier inside `close_distance` and the far
/// multiplier beyond `far_distance`; power-law eased in between.
pub fn speed_multiplier(distance: f64, tuning: &ReturnTuning) -> f64 {
    if distance <= tuning.close_distance {
        return tuning.close_speed_multiplier;
    }
    if distance >= tuning.far_distance {
        return tuning.far_speed_multiplier;
    }
    let t = (distance - tuning.close_distance) / (tuning.far_distance - tuning.close_distance);
    math::lerp_scalar(
        tuning.close_speed_multiplier,
        tuning.far_speed_multiplier,
        t.powf(tuning.speed_curve),
    )
}

/// Start a return flight from `position` back to `origin`.
///
/// Returns `None` when the projectile is already too close to the origin for
/// a return to make sense; the caller drops the item instead.
pub fn initiate(
    position: Vector3,
    origin: Vector3,
    hand_roll_degrees: f64,
    tuning: &ReturnTuning,
) -> Option<ReturnStart> {
    let to_origin = origin - position;
    let distance = to_origin.length();
    if distance < RETURN_MIN_START_DISTANCE {
        return None;
    }
    let dir = to_origin / distance;

    // Hand roll picks the curve plane around the return direction.
    let roll = hand_roll_degrees.to_radians();
    let up_rolled = math::rotate_around_axis(Vector3::Y, dir, roll);
    let up_perp = math::project_onto_plane(up_rolled, dir);
    let right = math::normalize_or(dir.cross(up_rolled), math::any_perpendicular(dir));
    let (sin_r, cos_r) = roll.sin_cos();
    let curve_dir = math::normalize_or(up_perp * cos_r + right * sin_r, up_perp);

    let inverse = hand_roll_degrees < 0.0;
    let mut plane_normal = math::normalize_or(dir.cross(curve_dir), math::any_perpendicular(dir));
    if inverse {
        plane_normal = -plane_normal;
    }

    let arc_magnitude = (distance * tuning.arc_gain).clamp(tuning.arc_min, tuning.arc_max);
    let speed = tuning.base_speed * speed_multiplier(distance, tuning);
    let velocity = dir * speed
        + curve_dir * (speed * tuning.lateral_boost)
        + Vector3::new(0.0, tuning.up_bias, 0.0);

    Some(ReturnStart {
        state: ReturnState {
            curve_offset: curve_dir * arc_magnitude,
            plane_normal,
            arc_magnitude,
            inverse,
            steps: 0,
        },
        velocity,
        distance,
    })
}

/// One steering update. Decays the arc offset in place.
pub fn advance(
    state: &mut ReturnState,
    position: Vector3,
    velocity: Vector3,
    origin: Vector3,
    tuning: &ReturnTuning,
) -> ReturnProgress {
    let to_origin = origin - position;
    let dist_sq = to_origin.length_squared();

    if dist_sq < RETURN_ARRIVAL_DIST_SQ {
        return ReturnProgress::Arrived { overshoot: false };
    }
    if velocity.length() > 0.01 && dist_sq < RETURN_OVERSHOOT_DIST_SQ {
        let dot = velocity.normalize().dot(math::normalize(to_origin));
        if dot < RETURN_OVERSHOOT_DOT {
            return ReturnProgress::Arrived { overshoot: true };
        }
    }

    let target = origin + state.curve_offset;
    let to_target = target - position;
    let distance = to_target.length();
    if distance < 1e-4 {
        return ReturnProgress::Steering { velocity };
    }
    let want_dir = to_target / distance;

    let target_speed = tuning.base_speed * speed_multiplier(dist_sq.sqrt(), tuning);

    let far_t = (distance / tuning.far_distance).clamp(0.0, 1.0);
    let turn_rate = math::lerp_scalar(
        tuning.turn_rate_near_degrees,
        tuning.turn_rate_far_degrees,
        far_t,
    )
    .to_radians();
    let turned = turn_towards(velocity, want_dir, turn_rate);

    let mut new_vel = turned * tuning.damping;
    let new_speed = new_vel.length();
    let max_speed = target_speed * tuning.max_over_target;
    let min_speed = target_speed * tuning.min_under_target;
    if new_speed > max_speed {
        new_vel = new_vel / new_speed * max_speed;
    } else if new_speed < min_speed && new_speed > 1e-4 {
        new_vel = new_vel / new_speed * min_speed;
    }

    // Collapse faster when near.
    let near_factor = (1.0 - distance / tuning.far_distance).clamp(0.0, 0.8);
    let decay = math::lerp_scalar(tuning.arc_decay, tuning.arc_decay * 0.75, near_factor);
    state.curve_offset *= decay;

    ReturnProgress::Steering { velocity: new_vel }
}

/// Rotate `current` toward `want_dir` by at most `max_angle` radians, keeping its speed.
pub fn turn_towards(current: Vector3, want_dir: Vector3, max_angle: f64) -> Vector3 {
    let speed = current.length();
    if speed < 1e-6 {
        return want_dir * speed;
    }
    let cur_dir = current / speed;
    let angle = cur_dir.dot(want_dir).clamp(-1.0, 1.0).acos();
    if angle <= max_angle {
        return want_dir * speed;
    }
    let axis = cur_dir.cross(want_dir);
    if axis.length_squared() < 1e-9 {
        // Anti-parallel: nudge off the singularity.
        let nudged = math::normalize_or(cur_dir * (1.0 - 1e-3) + want_dir * 1e-3, cur_dir);
        return nudged * speed;
    }
    math::normalize(math::rotate_around_axis(cur_dir, axis, max_angle)) * speed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fly_home(start: Vector3, origin: Vector3, roll: f64) -> (u32, Vec<f64>) {
        let tuning = ReturnTuning::default();
        let start_state = initiate(start, origin, roll, &tuning).expect("far enough to return");
        let mut state = start_state.state;
        let mut pos = start;
        let mut vel = start_state.velocity;
        let mut offsets = vec![state.curve_offset.length()];
        for step in 1..=tuning.timeout_steps {
            pos += vel;
            match advance(&mut state, pos, vel, origin, &tuning) {
                ReturnProgress::Arrived { .. } => return (step, offsets),
                ReturnProgress::Steering { velocity } => vel = velocity,
            }
            offsets.push(state.curve_offset.length());
        }
        panic!("did not arrive within {} steps, ended {:.2} away", tuning.timeout_steps, (origin - pos).length());
    }

    #[test]
    fn test_speed_multiplier_clamps_at_ends() {
        let tuning = ReturnTuning::default();
        assert_eq!(speed_multiplier(0.0, &tuning), tuning.close_speed_multiplier);
        assert_eq!(speed_multiplier(3.0, &tuning), tuning.close_speed_multiplier);
        assert_eq!(speed_multiplier(25.0, &tuning), tuning.far_speed_multiplier);
        assert_eq!(speed_multiplier(100.0, &tuning), tuning.far_speed_multiplier);
        let mid = speed_multiplier(14.0, &tuning);
        assert!(mid > tuning.close_speed_multiplier && mid < tuning.far_speed_multiplier);
    }

    #[test]
    fn test_speed_multiplier_monotonic() {
        let tuning = ReturnTuning::default();
        let mut prev = 0.0;
        for i in 0..60 {
            let m = speed_multiplier(i as f64 * 0.5, &tuning);
            assert!(m >= prev, "multiplier fell at distance {}", i as f64 * 0.5);
            prev = m;
        }
    }

    #[test]
    fn test_initiate_too_close_aborts() {
        let tuning = ReturnTuning::default();
        let origin = Vector3::new(1.0, 2.0, 3.0);
        assert!(initiate(origin + Vector3::new(0.05, 0.0, 0.0), origin, 0.0, &tuning).is_none());
    }

    #[test]
    fn test_initiate_heads_home_with_lateral_kick() {
        let tuning = ReturnTuning::default();
        let start = initiate(Vector3::new(0.0, 1.5, 20.0), Vector3::new(0.0, 1.5, 0.0), 0.0, &tuning)
            .unwrap();
        // Heading back toward -Z.
        assert!(start.velocity.z < 0.0);
        // Roll 0 bends the arc vertically.
        assert!(start.velocity.y > tuning.up_bias);
        assert_eq!(start.state.arc_magnitude, tuning.arc_max);
        assert!((start.state.curve_offset.length() - tuning.arc_max).abs() < 1e-9);
        assert!(!start.state.inverse);
    }

    #[test]
    fn test_negative_roll_mirrors_plane() {
        let tuning = ReturnTuning::default();
        let pos = Vector3::new(0.0, 1.5, 10.0);
        let origin = Vector3::new(0.0, 1.5, 0.0);
        let right = initiate(pos, origin, 45.0, &tuning).unwrap();
        let left = initiate(pos, origin, -45.0, &tuning).unwrap();
        assert!(left.state.inverse);
        assert!(right.state.plane_normal.is_finite() && left.state.plane_normal.is_finite());
        // Opposite rolls bulge to opposite sides.
        assert!(right.velocity.x * left.velocity.x < 0.0);
    }

    #[test]
    fn test_returns_home_from_twenty_blocks() {
        let origin = Vector3::new(0.0, 1.5, 0.0);
        for roll in [0.0, 45.0, -90.0, 170.0] {
            let (steps, _) = fly_home(Vector3::new(3.0, 2.0, 20.0), origin, roll);
            assert!(steps < 200, "roll {roll}: took {steps} steps");
        }
    }

    #[test]
    fn test_arc_offset_never_grows() {
        let (_, offsets) = fly_home(Vector3::new(-12.0, 4.0, 9.0), Vector3::ZERO, 30.0);
        for w in offsets.windows(2) {
            assert!(w[1] <= w[0] + 1e-12, "offset grew: {:.4} -> {:.4}", w[0], w[1]);
        }
    }

    #[test]
    fn test_turn_towards_caps_angle() {
        let v = Vector3::new(1.0, 0.0, 0.0) * 2.0;
        let out = turn_towards(v, Vector3::Z, 30f64.to_radians());
        assert!((out.length() - 2.0).abs() < 1e-9);
        let angle = math::angle_between_degrees(v, out);
        assert!((angle - 30.0).abs() < 1e-6, "turned {angle:.3} degrees");
    }

    #[test]
    fn test_turn_towards_antiparallel_is_finite() {
        let out = turn_towards(Vector3::X, -Vector3::X, 0.1);
        assert!(out.is_finite());
        assert!((out.length() - 1.0).abs() < 1e-9);
    }
}
