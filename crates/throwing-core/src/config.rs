//! Throw policy: the immutable tuning and item-rule object injected into the
//! simulation at construction.
//!
//! Loaded once from JSON (missing fields take the defaults in
//! [`constants`](crate::constants)) and replaced wholesale on reload; never
//! mutated in place.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConfigError, ConfigResult};

/// Which items a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "items", rename_all = "snake_case")]
pub enum ItemSet {
    All,
    None,
    Only(BTreeSet<String>),
}

impl ItemSet {
    pub fn only<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(items.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, item: &str) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Only(set) => set.contains(item),
        }
    }
}

/// Item eligibility for the bounce and embed effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRules {
    pub bounce: ItemSet,
    pub embed: ItemSet,
}

impl Default for ItemRules {
    fn default() -> Self {
        Self {
            bounce: ItemSet::All,
            embed: ItemSet::All,
        }
    }
}

/// Free-flight integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f64,
    pub drag: f64,
    pub spin_degrees_per_step: f64,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: FLIGHT_GRAVITY,
            drag: FLIGHT_DRAG,
            spin_degrees_per_step: FLIGHT_SPIN_DEGREES_PER_STEP,
        }
    }
}

/// Aim assist selection and blending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimAssistTuning {
    pub max_range: f64,
    pub max_cone_degrees: f64,
    pub max_prediction_secs: f64,
    pub blend_strength: f64,
    pub gravity: f64,
    pub min_confidence: f64,
    pub max_speed_ratio: f64,
    pub weight_hostile: f64,
    pub weight_player: f64,
    pub weight_passive: f64,
}

impl Default for AimAssistTuning {
    fn default() -> Self {
        Self {
            max_range: AIM_MAX_RANGE,
            max_cone_degrees: AIM_MAX_CONE_DEGREES,
            max_prediction_secs: AIM_MAX_PREDICTION_SECS,
            blend_strength: AIM_BLEND_STRENGTH,
            gravity: AIM_GRAVITY,
            min_confidence: AIM_MIN_CONFIDENCE,
            max_speed_ratio: AIM_MAX_SPEED_RATIO,
            weight_hostile: AIM_WEIGHT_HOSTILE,
            weight_player: AIM_WEIGHT_PLAYER,
            weight_passive: AIM_WEIGHT_PASSIVE,
        }
    }
}

/// Boomerang return flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnTuning {
    pub base_speed: f64,
    pub close_distance: f64,
    pub far_distance: f64,
    pub close_speed_multiplier: f64,
    pub far_speed_multiplier: f64,
    pub speed_curve: f64,
    pub arc_gain: f64,
    pub arc_min: f64,
    pub arc_max: f64,
    pub arc_decay: f64,
    pub turn_rate_near_degrees: f64,
    pub turn_rate_far_degrees: f64,
    pub lateral_boost: f64,
    pub up_bias: f64,
    pub damping: f64,
    pub max_over_target: f64,
    pub min_under_target: f64,
    pub timeout_steps: u32,
}

impl Default for ReturnTuning {
    fn default() -> Self {
        Self {
            base_speed: RETURN_BASE_SPEED,
            close_distance: RETURN_CLOSE_DISTANCE,
            far_distance: RETURN_FAR_DISTANCE,
            close_speed_multiplier: RETURN_CLOSE_SPEED_MULTIPLIER,
            far_speed_multiplier: RETURN_FAR_SPEED_MULTIPLIER,
            speed_curve: RETURN_SPEED_CURVE,
            arc_gain: RETURN_ARC_GAIN,
            arc_min: RETURN_ARC_MIN,
            arc_max: RETURN_ARC_MAX,
            arc_decay: RETURN_ARC_DECAY,
            turn_rate_near_degrees: RETURN_TURN_RATE_NEAR_DEGREES,
            turn_rate_far_degrees: RETURN_TURN_RATE_FAR_DEGREES,
            lateral_boost: RETURN_LATERAL_BOOST,
            up_bias: RETURN_UP_BIAS,
            damping: RETURN_DAMPING,
            max_over_target: RETURN_MAX_OVER_TARGET,
            min_under_target: RETURN_MIN_UNDER_TARGET,
            timeout_steps: RETURN_TIMEOUT_STEPS,
        }
    }
}

/// Embedding and bleed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedTuning {
    pub settle_roll_degrees: f64,
    pub roll_approach_per_step: f64,
    pub center_pull: f64,
    pub bleed_interval_steps: u64,
    pub bleed_damage_per_embed: f64,
}

impl Default for EmbedTuning {
    fn default() -> Self {
        Self {
            settle_roll_degrees: EMBED_SETTLE_ROLL_DEGREES,
            roll_approach_per_step: EMBED_ROLL_APPROACH_PER_STEP,
            center_pull: EMBED_CENTER_PULL,
            bleed_interval_steps: BLEED_INTERVAL_STEPS,
            bleed_damage_per_embed: BLEED_DAMAGE_PER_EMBED,
        }
    }
}

/// Complete policy for one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowPolicy {
    /// Global switch for the boomerang return effect.
    pub boomerang_effect: bool,
    pub physics: PhysicsTuning,
    pub aim_assist: AimAssistTuning,
    pub returning: ReturnTuning,
    pub embedding: EmbedTuning,
    pub items: ItemRules,
}

impl Default for ThrowPolicy {
    fn default() -> Self {
        Self {
            boomerang_effect: true,
            physics: PhysicsTuning::default(),
            aim_assist: AimAssistTuning::default(),
            returning: ReturnTuning::default(),
            embedding: EmbedTuning::default(),
            items: ItemRules::default(),
        }
    }
}

impl ThrowPolicy {
    /// Parse and validate a policy from JSON.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load and validate a policy file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load a policy file, or fall back to defaults when it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        positive("physics.gravity", self.physics.gravity, true)?;
        fraction("physics.drag", self.physics.drag)?;

        let aim = &self.aim_assist;
        positive("aim_assist.max_range", aim.max_range, false)?;
        positive("aim_assist.max_cone_degrees", aim.max_cone_degrees, false)?;
        positive("aim_assist.max_prediction_secs", aim.max_prediction_secs, false)?;
        fraction("aim_assist.blend_strength", aim.blend_strength)?;
        positive("aim_assist.gravity", aim.gravity, true)?;
        fraction("aim_assist.min_confidence", aim.min_confidence)?;
        positive("aim_assist.max_speed_ratio", aim.max_speed_ratio, false)?;

        let ret = &self.returning;
        positive("returning.base_speed", ret.base_speed, false)?;
        positive("returning.close_distance", ret.close_distance, true)?;
        if ret.far_distance <= ret.close_distance {
            return Err(invalid(
                "returning.far_distance",
                format!(
                    "must exceed close_distance ({} <= {})",
                    ret.far_distance, ret.close_distance
                ),
            ));
        }
        positive("returning.speed_curve", ret.speed_curve, false)?;
        if !(ret.arc_min >= 0.0 && ret.arc_min <= ret.arc_max) {
            return Err(invalid(
                "returning.arc_min",
                format!("must lie in [0, arc_max], got {}", ret.arc_min),
            ));
        }
        fraction("returning.arc_decay", ret.arc_decay)?;
        fraction("returning.damping", ret.damping)?;
        if ret.min_under_target > ret.max_over_target {
            return Err(invalid(
                "returning.min_under_target",
                "must not exceed max_over_target".to_string(),
            ));
        }
        if ret.timeout_steps == 0 {
            return Err(invalid("returning.timeout_steps", "must be at least 1".to_string()));
        }

        let emb = &self.embedding;
        positive("embedding.roll_approach_per_step", emb.roll_approach_per_step, false)?;
        fraction("embedding.center_pull", emb.center_pull)?;
        if emb.bleed_interval_steps == 0 {
            return Err(invalid(
                "embedding.bleed_interval_steps",
                "must be at least 1".to_string(),
            ));
        }
        positive("embedding.bleed_damage_per_embed", emb.bleed_damage_per_embed, true)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn positive(field: &'static str, value: f64, allow_zero: bool) -> ConfigResult<()> {
    let ok = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if ok {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn fraction(field: &'static str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must lie in [0, 1], got {value}")))
    }
}
