//! Aim assist: pick the best target in the throw cone and bend the throw toward it.
//!
//! Candidates are filtered by range, cone angle, intercept feasibility and
//! trajectory confidence, scored, and the winner's ideal velocity is blended
//! into the raw throw. The raw speed is preserved so assisted throws feel the
//! same as unassisted ones.

use throwing_core::config::AimAssistTuning;
use throwing_core::constants::TICK_RATE;
use throwing_core::enums::TargetKind;
use throwing_core::math;
use throwing_core::types::{ActorId, Target, Vector3};

use crate::intercept;

/// Per-candidate evaluation. Transient; never stored past one selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetEvaluation {
    pub target: ActorId,
    pub kind: TargetKind,
    /// Bounding-box center of the target now.
    pub current_aim_point: Vector3,
    /// Where the target will be when the projectile arrives.
    pub predicted_intercept_point: Vector3,
    pub distance: f64,
    pub angle_degrees: f64,
    pub intercept_time_secs: f64,
    /// `min(launch, required) / max(launch, required)`, in `[0, 1]`.
    pub confidence: f64,
    pub required_velocity: Vector3,
}

/// Weight for a target's capability tag.
pub fn kind_weight(kind: TargetKind, tuning: &AimAssistTuning) -> f64 {
    match kind {
        TargetKind::Hostile => tuning.weight_hostile,
        TargetKind::Player => tuning.weight_player,
        TargetKind::Passive => tuning.weight_passive,
    }
}

/// Evaluate one candidate. `None` when any filter rejects it.
pub fn evaluate<T: Target + ?Sized>(
    candidate: &T,
    origin: Vector3,
    raw_velocity: Vector3,
    tuning: &AimAssistTuning,
) -> Option<TargetEvaluation> {
    if !candidate.is_alive() {
        return None;
    }
    let raw_speed = raw_velocity.length();
    if raw_speed < 1e-6 {
        return None;
    }

    let aim_point = candidate.bounding_center();
    let to_target = aim_point - origin;
    let distance = to_target.length();
    if distance > tuning.max_range {
        return None;
    }
    let angle = math::angle_between_degrees(raw_velocity, to_target);
    if angle > tuning.max_cone_degrees {
        return None;
    }

    let max_steps = tuning.max_prediction_secs * TICK_RATE as f64;
    let solution = intercept::solve(
        origin,
        aim_point,
        candidate.velocity(),
        raw_speed,
        tuning.gravity,
        max_steps,
    )?;
    let intercept_time_secs = solution.time_steps / TICK_RATE as f64;
    if intercept_time_secs > tuning.max_prediction_secs {
        return None;
    }

    let required_speed = solution.required_velocity.length();
    let confidence = raw_speed.min(required_speed) / raw_speed.max(required_speed);
    if confidence < tuning.min_confidence {
        return None;
    }

    Some(TargetEvaluation {
        target: candidate.id(),
        kind: candidate.kind(),
        current_aim_point: aim_point,
        predicted_intercept_point: solution.intercept_point,
        distance,
        angle_degrees: angle,
        intercept_time_secs,
        confidence,
        required_velocity: solution.required_velocity,
    })
}

/// Score in `[0, weight]`: mean of confidence, closeness and centering.
pub fn score(eval: &TargetEvaluation, tuning: &AimAssistTuning) -> f64 {
    let closeness = 1.0 - eval.distance / tuning.max_range;
    let centering = 1.0 - eval.angle_degrees / tuning.max_cone_degrees;
    (eval.confidence + closeness + centering) / 3.0 * kind_weight(eval.kind, tuning)
}

/// Highest-scoring candidate. Ties go to the first one seen.
pub fn select_best<T: Target>(
    candidates: &[T],
    origin: Vector3,
    raw_velocity: Vector3,
    tuning: &AimAssistTuning,
) -> Option<TargetEvaluation> {
    let mut best: Option<(TargetEvaluation, f64)> = None;
    for candidate in candidates {
        let Some(eval) = evaluate(candidate, origin, raw_velocity, tuning) else {
            continue;
        };
        let s = score(&eval, tuning);
        if best.as_ref().map_or(true, |(_, b)| s > *b) {
            best = Some((eval, s));
        }
    }
    best.map(|(eval, _)| eval)
}

/// Blend the raw throw toward the winner's ideal velocity.
pub fn blend(raw_velocity: Vector3, eval: &TargetEvaluation, tuning: &AimAssistTuning) -> Vector3 {
    let raw_speed = raw_velocity.length();
    let ideal = math::normalize_or(eval.required_velocity, raw_velocity / raw_speed.max(1e-9))
        * raw_speed;
    let ideal = math::clamp_length(ideal, raw_speed * tuning.max_speed_ratio);
    let s = (tuning.blend_strength * eval.confidence).clamp(0.0, 1.0);
    math::lerp(raw_velocity, ideal, s)
}

/// Select the best candidate and blend toward it; the raw velocity comes back
/// unchanged when nothing qualifies.
pub fn select_and_blend<T: Target>(
    candidates: &[T],
    origin: Vector3,
    raw_velocity: Vector3,
    tuning: &AimAssistTuning,
) -> Vector3 {
    match select_best(candidates, origin, raw_velocity, tuning) {
        Some(eval) => blend(raw_velocity, &eval, tuning),
        None => raw_velocity,
    }
}
