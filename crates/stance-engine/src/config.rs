//! Engine configuration.
//!
//! Every threshold, vote count and weight used by the engine lives here with
//! its tuned default, so deployments can adjust them from a file or the
//! environment without touching code.

use serde::{Deserialize, Serialize};

use stance_core::{AngleName, Error, Result};

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Temporal smoothing of raw joints
    pub smoothing: SmoothingConfig,

    /// Body orientation voting heuristic
    pub orientation: OrientationConfig,

    /// Confidence gates for optional angles
    pub extraction: ExtractionConfig,

    /// Calibration window and reduction
    pub calibration: CalibrationConfig,

    /// Adaptive tolerance and scoring
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of raw frames averaged together
    pub window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Both shoulders below this confidence means no evidence
    pub min_shoulder_confidence: f32,

    /// Shoulder separation (px) above which, together with the hip
    /// separation, the view is frontal
    pub frontal_shoulder_separation: f64,

    /// Hip separation (px) for the frontal check
    pub frontal_hip_separation: f64,

    /// Confidence difference needed for a side to win a vote
    pub confidence_margin: f32,

    pub shoulder_votes: u32,
    pub elbow_votes: u32,
    pub hip_votes: u32,

    /// Maximum shoulder separation (px) for the forward-shoulder vote
    pub forward_shoulder_max_separation: f64,

    /// Both shoulders must exceed this confidence for the forward-shoulder vote
    pub forward_shoulder_min_confidence: f32,

    /// Votes given to the shoulder nearer the camera (larger x)
    pub forward_shoulder_votes: u32,

    /// Minimum votes for the leading side to win
    pub min_winning_votes: u32,

    /// Maximum shoulder separation (px) for the confidence tie-break
    pub tie_break_max_separation: f64,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            min_shoulder_confidence: 0.3,
            frontal_shoulder_separation: 100.0,
            frontal_hip_separation: 80.0,
            confidence_margin: 0.1,
            shoulder_votes: 2,
            elbow_votes: 1,
            hip_votes: 1,
            forward_shoulder_max_separation: 80.0,
            forward_shoulder_min_confidence: 0.4,
            forward_shoulder_votes: 1,
            min_winning_votes: 2,
            tie_break_max_separation: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Support-side arm is often occluded in profile, hence the lower gate
    pub support_arm_min_confidence: f32,
    pub knee_min_confidence: f32,
    pub head_min_confidence: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            support_arm_min_confidence: 0.15,
            knee_min_confidence: 0.3,
            head_min_confidence: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Length of the sampling window (seconds)
    pub duration_secs: f64,

    /// Fraction of samples in which an optional angle must appear to be
    /// calibrated
    pub optional_presence_ratio: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 5.0,
            optional_presence_ratio: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Tolerance is `std * tolerance_multiplier`...
    pub tolerance_multiplier: f64,

    /// ...but never below this many degrees
    pub tolerance_floor: f64,

    pub weights: AngleWeights,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            tolerance_multiplier: 2.5,
            tolerance_floor: 8.0,
            weights: AngleWeights::default(),
        }
    }
}

/// Contribution of each angle to the aggregate score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleWeights {
    pub arm: f64,
    pub torso: f64,
    pub elbow_shoulder_hip: f64,
    pub support_arm: f64,
    pub knee: f64,
    pub head: f64,
}

impl AngleWeights {
    pub fn get(&self, name: AngleName) -> f64 {
        match name {
            AngleName::Arm => self.arm,
            AngleName::Torso => self.torso,
            AngleName::ElbowShoulderHip => self.elbow_shoulder_hip,
            AngleName::SupportArm => self.support_arm,
            AngleName::Knee => self.knee,
            AngleName::Head => self.head,
        }
    }
}

impl Default for AngleWeights {
    fn default() -> Self {
        Self {
            arm: 3.0,
            torso: 2.0,
            elbow_shoulder_hip: 2.0,
            support_arm: 1.5,
            knee: 1.0,
            head: 1.5,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file, with `STANCE_` environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("STANCE").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("STANCE").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.smoothing.window == 0 {
            return Err(Error::Config("smoothing.window must be at least 1".into()));
        }

        if !(self.calibration.duration_secs > 0.0) {
            return Err(Error::Config("calibration.duration_secs must be positive".into()));
        }

        if !(0.0..=1.0).contains(&self.calibration.optional_presence_ratio) {
            return Err(Error::Config(
                "calibration.optional_presence_ratio must be within [0, 1]".into(),
            ));
        }

        if !(self.evaluation.tolerance_floor > 0.0) {
            return Err(Error::Config("evaluation.tolerance_floor must be positive".into()));
        }

        if self.evaluation.tolerance_multiplier < 0.0 {
            return Err(Error::Config(
                "evaluation.tolerance_multiplier must not be negative".into(),
            ));
        }

        for name in AngleName::ALL {
            if !(self.evaluation.weights.get(name) > 0.0) {
                return Err(Error::Config(format!("evaluation.weights.{name} must be positive")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.smoothing.window, 5);
        assert_eq!(config.calibration.duration_secs, 5.0);
        assert_eq!(config.evaluation.tolerance_floor, 8.0);
        assert_eq!(config.evaluation.weights.get(AngleName::Arm), 3.0);
        assert_eq!(config.evaluation.weights.get(AngleName::Head), 1.5);
        assert_eq!(config.orientation.shoulder_votes, 2);
        assert_eq!(config.orientation.forward_shoulder_votes, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"smoothing": {"window": 9}, "evaluation": {"tolerance_floor": 5.0}}"#)
                .unwrap();
        assert_eq!(config.smoothing.window, 9);
        assert_eq!(config.evaluation.tolerance_floor, 5.0);
        assert_eq!(config.evaluation.tolerance_multiplier, 2.5);
        assert_eq!(config.orientation, OrientationConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.smoothing.window = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = EngineConfig::default();
        config.calibration.optional_presence_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.evaluation.weights.knee = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.calibration.duration_secs = f64::NAN;
        assert!(config.validate().is_err());
    }
}
