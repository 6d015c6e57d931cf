//! Simulation constants and tuning parameters.
//!
//! Distances are in blocks, velocities in blocks per step, angles in degrees
//! unless a name says otherwise. These are the defaults baked into
//! [`ThrowPolicy`](crate::config::ThrowPolicy); a loaded policy may override them.

/// Simulation step rate (Hz).
pub const TICK_RATE: u32 = 20;

/// Seconds per step.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Free flight ---

/// Downward acceleration applied to a free-flying projectile (blocks/step²).
pub const FLIGHT_GRAVITY: f64 = 0.03;

/// Per-step velocity retention in free flight (air drag).
pub const FLIGHT_DRAG: f64 = 0.99;

/// Damage of a bare hand. Items add their attack bonus on top.
pub const BARE_HAND_DAMAGE: f64 = 1.0;

/// Knockback impulse magnitude along the flight direction on an entity hit.
pub const KNOCKBACK_STRENGTH: f64 = 0.5;

/// Extra upward knockback on an entity hit.
pub const KNOCKBACK_LIFT: f64 = 0.1;

// --- Vector math ---

/// Squared length below which a vector is treated as degenerate.
pub const DEGENERATE_LENGTH_SQ: f64 = 1e-8;

// --- Intercept solver ---

/// Number of samples used to bracket a sign change of the speed error.
pub const SOLVER_BRACKET_SAMPLES: usize = 12;

/// Maximum bisection iterations after a bracket is found.
pub const SOLVER_BISECTION_ITERATIONS: usize = 18;

/// Shortest flight time the solver will consider (steps).
pub const SOLVER_MIN_TIME_STEPS: f64 = 0.25;

/// Absolute floor of the bisection speed tolerance (blocks/step).
pub const SOLVER_ABS_TOLERANCE: f64 = 0.01;

/// Bisection speed tolerance as a fraction of launch speed.
pub const SOLVER_REL_TOLERANCE: f64 = 0.03;

/// Maximum relative speed error accepted from the fallback candidates.
pub const SOLVER_FALLBACK_MAX_REL_ERROR: f64 = 0.15;

/// Multipliers of the seed time tried when no bracket exists.
pub const SOLVER_FALLBACK_FACTORS: [f64; 5] = [0.5, 0.75, 1.0, 1.25, 1.5];

// --- Aim assist ---

/// Targets farther than this from the throw origin are ignored (blocks).
pub const AIM_MAX_RANGE: f64 = 25.0;

/// Half-angle of the assist cone around the throw direction (degrees).
pub const AIM_MAX_CONE_DEGREES: f64 = 35.0;

/// Blend strength at full trajectory confidence.
pub const AIM_BLEND_STRENGTH: f64 = 0.5;

/// Longest predicted flight the assist will lead a target for (seconds).
pub const AIM_MAX_PREDICTION_SECS: f64 = 2.5;

/// Gravity assumed by the aim assist ballistic model (blocks/step²).
pub const AIM_GRAVITY: f64 = 0.04;

/// Candidates below this trajectory confidence are skipped.
pub const AIM_MIN_CONFIDENCE: f64 = 0.3;

/// Ideal velocity is never allowed above this multiple of the raw throw speed.
pub const AIM_MAX_SPEED_RATIO: f64 = 1.6;

/// Score weight for hostile targets.
pub const AIM_WEIGHT_HOSTILE: f64 = 1.0;

/// Score weight for players.
pub const AIM_WEIGHT_PLAYER: f64 = 0.9;

/// Score weight for passive creatures.
pub const AIM_WEIGHT_PASSIVE: f64 = 0.7;

// --- Boomerang return ---

/// Base return speed before distance scaling (blocks/step).
pub const RETURN_BASE_SPEED: f64 = 1.0;

/// At or below this distance the close speed multiplier applies.
pub const RETURN_CLOSE_DISTANCE: f64 = 3.0;

/// At or above this distance the far speed multiplier applies.
pub const RETURN_FAR_DISTANCE: f64 = 25.0;

/// Speed multiplier close to the origin.
pub const RETURN_CLOSE_SPEED_MULTIPLIER: f64 = 0.3;

/// Speed multiplier far from the origin.
pub const RETURN_FAR_SPEED_MULTIPLIER: f64 = 2.0;

/// Power-law exponent of the speed curve.
pub const RETURN_SPEED_CURVE: f64 = 1.2;

/// Arc size per block of return distance.
pub const RETURN_ARC_GAIN: f64 = 0.6;

/// Smallest arc offset (blocks).
pub const RETURN_ARC_MIN: f64 = 0.8;

/// Largest arc offset (blocks).
pub const RETURN_ARC_MAX: f64 = 6.0;

/// Per-step arc decay when far. Lower collapses the arc faster.
pub const RETURN_ARC_DECAY: f64 = 0.80;

/// Turn-rate cap near the steering target (degrees/step).
pub const RETURN_TURN_RATE_NEAR_DEGREES: f64 = 30.0;

/// Turn-rate cap far from the steering target (degrees/step).
pub const RETURN_TURN_RATE_FAR_DEGREES: f64 = 55.0;

/// Fraction of the return speed injected sideways at bounce.
pub const RETURN_LATERAL_BOOST: f64 = 0.35;

/// Small upward bias added at bounce (blocks/step).
pub const RETURN_UP_BIAS: f64 = 0.02;

/// Per-step damping while returning.
pub const RETURN_DAMPING: f64 = 0.95;

/// Upper speed clamp as a multiple of the target return speed.
pub const RETURN_MAX_OVER_TARGET: f64 = 1.6;

/// Lower speed clamp as a multiple of the target return speed.
pub const RETURN_MIN_UNDER_TARGET: f64 = 0.45;

/// Below this distance to the origin a bounce is not started (blocks).
pub const RETURN_MIN_START_DISTANCE: f64 = 0.1;

/// Squared arrival radius around the origin.
pub const RETURN_ARRIVAL_DIST_SQ: f64 = 0.36;

/// Squared radius inside which a receding projectile counts as arrived.
pub const RETURN_OVERSHOOT_DIST_SQ: f64 = 4.0;

/// Heading-vs-origin dot product below which the projectile is receding.
pub const RETURN_OVERSHOOT_DOT: f64 = -0.8;

/// Hard step limit of the return flight (~10 s).
pub const RETURN_TIMEOUT_STEPS: u32 = 200;

/// Speed cap once the return completes and free flight resumes.
pub const RETURN_EXIT_MAX_SPEED: f64 = 1.0;

/// Downward speed of the gentle fall after a return timeout.
pub const RETURN_TIMEOUT_FALL_SPEED: f64 = 0.2;

// --- Catching ---

/// Per-step velocity retention while being caught.
pub const CATCH_DAMPING: f64 = 0.95;

/// Fraction of the pre-catch velocity restored on cancel.
pub const CATCH_CANCEL_VELOCITY_KEEP: f64 = 0.5;

/// Pre-catch speed below which cancel leaves velocity untouched.
pub const CATCH_CANCEL_MIN_SPEED: f64 = 0.1;

// --- Embedding ---

/// Roll angle an embedded projectile settles at (degrees).
pub const EMBED_SETTLE_ROLL_DEGREES: f64 = 15.0;

/// Roll approach speed once embedded (degrees/step).
pub const EMBED_ROLL_APPROACH_PER_STEP: f64 = 20.0;

/// In-flight spin speed, used to seed the embedded roll (degrees/step).
pub const FLIGHT_SPIN_DEGREES_PER_STEP: f64 = 15.0;

/// How far the embed point is pulled toward the host's center (0 = surface).
pub const EMBED_CENTER_PULL: f64 = 0.45;

/// Steps between synchronized bleed ticks.
pub const BLEED_INTERVAL_STEPS: u64 = 30;

/// Bleed damage per embedded projectile per bleed tick.
pub const BLEED_DAMAGE_PER_EMBED: f64 = 1.0;

// --- Diagnostics ---

/// Steps between periodic debug traces of long-running phases.
pub const DEBUG_TRACE_INTERVAL_STEPS: u64 = 20;
