//! Ballistic intercept solver.
//!
//! Finds a flight time and launch velocity that put a projectile thrown at a
//! fixed speed onto a constant-velocity target under constant gravity. A
//! gravity-free closed-form guess seeds a bracketed bisection on the speed
//! error; both searches have fixed iteration caps.

use throwing_core::constants::*;
use throwing_core::types::Vector3;

/// A feasible intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptSolution {
    /// Flight time in steps.
    pub time_steps: f64,
    /// Launch velocity (blocks/step) that lands on the predicted point.
    pub required_velocity: Vector3,
    /// Where the target will be after `time_steps`.
    pub intercept_point: Vector3,
}

/// Velocity that carries a projectile from `origin` to `target` in exactly
/// `t` steps under a constant downward acceleration `gravity`.
///
/// Horizontal components are displacement over time; the vertical component
/// adds back what gravity takes away: `vy = (dy + g·t²/2) / t`.
pub fn required_ballistic_velocity(origin: Vector3, target: Vector3, t: f64, gravity: f64) -> Vector3 {
    let d = target - origin;
    Vector3::new(d.x / t, (d.y + 0.5 * gravity * t * t) / t, d.z / t)
}

/// Smallest positive `t` with `|Δ + v·t| = s·t`, ignoring gravity.
///
/// Falls back to a plain distance/speed estimate when the quadratic has no
/// positive root.
pub fn seed_time(delta: Vector3, target_vel: Vector3, launch_speed: f64) -> f64 {
    let a = target_vel.dot(target_vel) - launch_speed * launch_speed;
    let b = 2.0 * delta.dot(target_vel);
    let c = delta.dot(delta);
    let fallback = delta.length() / launch_speed;

    let root = if a.abs() < 1e-9 {
        // Target speed equals launch speed: linear in t.
        if b.abs() < 1e-12 {
            None
        } else {
            Some(-c / b)
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            None
        } else {
            let sq = disc.sqrt();
            let t1 = (-b - sq) / (2.0 * a);
            let t2 = (-b + sq) / (2.0 * a);
            match (t1 > 0.0, t2 > 0.0) {
                (true, true) => Some(t1.min(t2)),
                (true, false) => Some(t1),
                (false, true) => Some(t2),
                (false, false) => None,
            }
        }
    };

    match root {
        Some(t) if t.is_finite() && t > 0.0 => t,
        _ => fallback,
    }
}

/// Solve for a launch velocity of magnitude ≈ `launch_speed` that meets the
/// target. `gravity` is the downward acceleration in blocks/step².
///
/// Returns `None` when the launch speed is non-positive or no flight time in
/// `[SOLVER_MIN_TIME_STEPS, max_steps_ahead]` matches the speed closely enough.
pub fn solve(
    origin: Vector3,
    target_pos: Vector3,
    target_vel: Vector3,
    launch_speed: f64,
    gravity: f64,
    max_steps_ahead: f64,
) -> Option<InterceptSolution> {
    if !(launch_speed > 1e-6) || !(max_steps_ahead > SOLVER_MIN_TIME_STEPS) {
        return None;
    }

    let delta = target_pos - origin;
    let seed = seed_time(delta, target_vel, launch_speed);

    let predicted = |t: f64| target_pos + target_vel * t;
    let speed_error = |t: f64| {
        required_ballistic_velocity(origin, predicted(t), t, gravity).length() - launch_speed
    };
    let solution = |t: f64| InterceptSolution {
        time_steps: t,
        required_velocity: required_ballistic_velocity(origin, predicted(t), t, gravity),
        intercept_point: predicted(t),
    };

    // Bracket around the seed first; search the whole window if the seed is outside it.
    let mut lo = SOLVER_MIN_TIME_STEPS.max(0.5 * seed);
    let mut hi = max_steps_ahead.min(2.0 * seed);
    if !(lo < hi) {
        lo = SOLVER_MIN_TIME_STEPS;
        hi = max_steps_ahead;
    }

    let tolerance = SOLVER_ABS_TOLERANCE.max(SOLVER_REL_TOLERANCE * launch_speed);
    let samples = SOLVER_BRACKET_SAMPLES.max(2);
    let span = hi - lo;

    let mut prev_t = lo;
    let mut prev_err = speed_error(lo);
    for i in 1..samples {
        let t = lo + span * i as f64 / (samples - 1) as f64;
        let err = speed_error(t);
        if prev_err.signum() != err.signum() || err == 0.0 {
            return Some(solution(bisect(&speed_error, prev_t, prev_err, t, tolerance)));
        }
        prev_t = t;
        prev_err = err;
    }

    // No sign change: accept the closest candidate near the seed.
    let mut best: Option<(f64, f64)> = None;
    for factor in SOLVER_FALLBACK_FACTORS {
        let t = seed * factor;
        if t < SOLVER_MIN_TIME_STEPS || t > max_steps_ahead {
            continue;
        }
        let rel = speed_error(t).abs() / launch_speed;
        if best.map_or(true, |(_, b)| rel < b) {
            best = Some((t, rel));
        }
    }
    match best {
        Some((t, rel)) if rel <= SOLVER_FALLBACK_MAX_REL_ERROR => Some(solution(t)),
        _ => None,
    }
}

fn bisect(f: &impl Fn(f64) -> f64, mut lo: f64, mut lo_err: f64, mut hi: f64, tolerance: f64) -> f64 {
    let mut mid = 0.5 * (lo + hi);
    for _ in 0..SOLVER_BISECTION_ITERATIONS {
        mid = 0.5 * (lo + hi);
        let err = f(mid);
        if err.abs() <= tolerance {
            return mid;
        }
        if err.signum() == lo_err.signum() {
            lo = mid;
            lo_err = err;
        } else {
            hi = mid;
        }
    }
    mid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stationary_target_no_gravity() {
        let origin = Vector3::ZERO;
        let target = Vector3::new(10.0, 0.0, 0.0);
        let sol = solve(origin, target, Vector3::ZERO, 1.0, 0.0, 50.0).expect("should solve");
        let expected = 10.0;
        assert!(
            (sol.time_steps - expected).abs() / expected < 0.05,
            "flight time should be ≈ d/s, got {:.3}",
            sol.time_steps
        );
        assert!(sol.required_velocity.x > 0.0);
        assert!(sol.required_velocity.y.abs() < 1e-9);
    }

    #[test]
    fn test_seed_is_linear_for_stationary_target() {
        let t = seed_time(Vector3::new(0.0, 0.0, 6.0), Vector3::ZERO, 2.0);
        assert!((t - 3.0).abs() < 1e-9, "seed {t}");
    }

    #[test]
    fn test_seed_leads_crossing_target() {
        // Target moving perpendicular to the line of sight needs a longer time than d/s.
        let t = seed_time(Vector3::new(10.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.5), 1.0);
        assert!(t > 10.0, "lead time should exceed straight-line time, got {t:.2}");
    }

    #[test]
    fn test_moving_target_solution_hits_predicted_point() {
        let origin = Vector3::new(0.0, 1.5, 0.0);
        let target = Vector3::new(8.0, 1.0, 3.0);
        let vel = Vector3::new(-0.05, 0.0, 0.08);
        let g = 0.04;
        let sol = solve(origin, target, vel, 1.2, g, 50.0).expect("should solve");

        let predicted = target + vel * sol.time_steps;
        assert!((sol.intercept_point - predicted).length() < 1e-9);
        let tol = SOLVER_ABS_TOLERANCE.max(SOLVER_REL_TOLERANCE * 1.2);
        assert!(
            (sol.required_velocity.length() - 1.2).abs() <= tol * 1.0001,
            "speed {:.4}",
            sol.required_velocity.length()
        );
    }

    #[test]
    fn test_gravity_raises_launch_angle() {
        let origin = Vector3::ZERO;
        let target = Vector3::new(12.0, 0.0, 0.0);
        let sol = solve(origin, target, Vector3::ZERO, 1.5, 0.04, 50.0).expect("should solve");
        assert!(sol.required_velocity.y > 0.0, "must aim above a level target");
    }

    #[test]
    fn test_non_positive_speed_fails() {
        let target = Vector3::new(5.0, 0.0, 0.0);
        assert!(solve(Vector3::ZERO, target, Vector3::ZERO, 0.0, 0.0, 50.0).is_none());
        assert!(solve(Vector3::ZERO, target, Vector3::ZERO, -1.0, 0.0, 50.0).is_none());
    }

    #[test]
    fn test_target_out_of_time_window_fails() {
        // 100 blocks at 1 block/step cannot be reached within 20 steps.
        let target = Vector3::new(100.0, 0.0, 0.0);
        assert!(solve(Vector3::ZERO, target, Vector3::ZERO, 1.0, 0.0, 20.0).is_none());
    }

    #[test]
    fn test_fleeing_faster_target_fails() {
        let target = Vector3::new(5.0, 0.0, 0.0);
        let vel = Vector3::new(2.0, 0.0, 0.0);
        assert!(solve(Vector3::ZERO, target, vel, 1.0, 0.0, 50.0).is_none());
    }
}
