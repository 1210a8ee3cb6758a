//! Adaptive-tolerance posture scoring.
//!
//! Each calibrated angle gets a tolerance derived from its calibration
//! spread:
//!
//! ```text
//! tolerance = max(std * multiplier, floor)
//! pass      = |current - mean| <= tolerance
//! score     = max(0, 1 - diff / (2 * tolerance))
//! aggregate = round(100 * Σ(score_i * w_i) / Σ(w_i))
//! ```

use serde::{Deserialize, Serialize};

use stance_core::{AngleName, AngleSet, Pattern};

use crate::config::EvaluationConfig;

/// Classification of one angle for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleVerdict {
    /// Within tolerance
    Pass,
    /// Outside tolerance
    Fail,
    /// Visible now but absent from the calibration; not scored
    Uncalibrated,
}

/// Evaluation of a single angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleEvaluation {
    pub name: AngleName,
    pub verdict: AngleVerdict,
    pub current: i32,
    /// Calibrated mean, if any
    pub reference: Option<i32>,
    pub tolerance: Option<f64>,
    /// Normalized closeness in [0, 1]; `None` when not scored
    pub score: Option<f64>,
}

/// Verdicts for every visible angle plus the weighted aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureEvaluation {
    pub angles: Vec<AngleEvaluation>,
    /// Aggregate score in [0, 100]
    pub score: u8,
}

impl PostureEvaluation {
    pub fn get(&self, name: AngleName) -> Option<&AngleEvaluation> {
        self.angles.iter().find(|a| a.name == name)
    }

    /// True when every scored angle is within tolerance
    pub fn all_pass(&self) -> bool {
        self.angles.iter().all(|a| a.verdict != AngleVerdict::Fail)
    }
}

/// Scores live angles against a calibrated pattern
pub struct PostureEvaluator {
    config: EvaluationConfig,
}

impl PostureEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn tolerance(&self, std: f64) -> f64 {
        (std * self.config.tolerance_multiplier).max(self.config.tolerance_floor)
    }

    pub fn evaluate(&self, angles: &AngleSet, pattern: &Pattern) -> PostureEvaluation {
        let mut evaluations = Vec::with_capacity(AngleName::ALL.len());
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for name in AngleName::ALL {
            let Some(current) = angles.get(name) else {
                continue;
            };

            let evaluation = match pattern.stats(name) {
                Some(stats) => {
                    let tolerance = self.tolerance(stats.std);
                    let diff = (f64::from(current) - f64::from(stats.mean)).abs();
                    let score = (1.0 - diff / (2.0 * tolerance)).max(0.0);

                    let weight = self.config.weights.get(name);
                    weighted_sum += score * weight;
                    weight_total += weight;

                    AngleEvaluation {
                        name,
                        verdict: if diff <= tolerance {
                            AngleVerdict::Pass
                        } else {
                            AngleVerdict::Fail
                        },
                        current,
                        reference: Some(stats.mean),
                        tolerance: Some(tolerance),
                        score: Some(score),
                    }
                }
                None => AngleEvaluation {
                    name,
                    verdict: AngleVerdict::Uncalibrated,
                    current,
                    reference: None,
                    tolerance: None,
                    score: None,
                },
            };

            evaluations.push(evaluation);
        }

        let score = if weight_total > 0.0 {
            (100.0 * weighted_sum / weight_total).round().clamp(0.0, 100.0) as u8
        } else {
            0
        };

        PostureEvaluation {
            angles: evaluations,
            score,
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }
}

impl Default for PostureEvaluator {
    fn default() -> Self {
        Self::new(EvaluationConfig::default())
    }
}
