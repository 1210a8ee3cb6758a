//! Anatomical angle sets and the calibrated reference patterns built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Orientation;

/// Named anatomical angle tracked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleName {
    /// Dominant shoulder → elbow → wrist
    Arm,
    /// Dominant shoulder → hip → knee
    Torso,
    /// Dominant elbow → shoulder → hip
    ElbowShoulderHip,
    /// Support shoulder → elbow → wrist
    SupportArm,
    /// Dominant hip → knee → ankle
    Knee,
    /// Nose → dominant shoulder → dominant hip
    Head,
}

impl AngleName {
    /// Always computed once the orientation is known
    pub const PRIMARY: [AngleName; 3] = [AngleName::Arm, AngleName::Torso, AngleName::ElbowShoulderHip];

    /// Computed only when their landmarks are confidently detected
    pub const OPTIONAL: [AngleName; 3] = [AngleName::SupportArm, AngleName::Knee, AngleName::Head];

    pub const ALL: [AngleName; 6] = [
        AngleName::Arm,
        AngleName::Torso,
        AngleName::ElbowShoulderHip,
        AngleName::SupportArm,
        AngleName::Knee,
        AngleName::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AngleName::Arm => "arm",
            AngleName::Torso => "torso",
            AngleName::ElbowShoulderHip => "elbow_shoulder_hip",
            AngleName::SupportArm => "support_arm",
            AngleName::Knee => "knee",
            AngleName::Head => "head",
        }
    }
}

impl fmt::Display for AngleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Angles measured on one frame, in whole degrees.
///
/// Optional angles are `None` when their landmarks were not confidently
/// detected; they are never filled with 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AngleSet {
    pub arm: i32,
    pub torso: i32,
    pub elbow_shoulder_hip: i32,
    pub support_arm: Option<i32>,
    pub knee: Option<i32>,
    pub head: Option<i32>,
}

impl AngleSet {
    /// Value of an angle; primary angles are always present
    pub fn get(&self, name: AngleName) -> Option<i32> {
        match name {
            AngleName::Arm => Some(self.arm),
            AngleName::Torso => Some(self.torso),
            AngleName::ElbowShoulderHip => Some(self.elbow_shoulder_hip),
            AngleName::SupportArm => self.support_arm,
            AngleName::Knee => self.knee,
            AngleName::Head => self.head,
        }
    }
}

/// Mean and population standard deviation of one calibrated angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleStats {
    pub mean: i32,
    pub std: f64,
}

impl AngleStats {
    pub fn new(mean: i32, std: f64) -> Self {
        Self { mean, std }
    }
}

/// Calibrated reference stance for one orientation.
///
/// Serialized flat (`arm`, `arm_std`, ...) so that uncalibrated optional
/// angles appear as a pair of nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(default)]
    pub calibrated: bool,
    #[serde(default)]
    pub arm: i32,
    #[serde(default)]
    pub arm_std: f64,
    #[serde(default)]
    pub torso: i32,
    #[serde(default)]
    pub torso_std: f64,
    #[serde(default)]
    pub elbow_shoulder_hip: i32,
    #[serde(default)]
    pub elbow_shoulder_hip_std: f64,
    #[serde(default)]
    pub support_arm: Option<i32>,
    #[serde(default)]
    pub support_arm_std: Option<f64>,
    #[serde(default)]
    pub knee: Option<i32>,
    #[serde(default)]
    pub knee_std: Option<f64>,
    #[serde(default)]
    pub head: Option<i32>,
    #[serde(default)]
    pub head_std: Option<f64>,
    /// Raw samples reduced into this pattern
    #[serde(default)]
    pub sample_count: usize,
}

impl Pattern {
    /// Uncalibrated pattern: zeroed primaries, null optionals
    pub fn empty() -> Self {
        Self {
            calibrated: false,
            arm: 0,
            arm_std: 0.0,
            torso: 0,
            torso_std: 0.0,
            elbow_shoulder_hip: 0,
            elbow_shoulder_hip_std: 0.0,
            support_arm: None,
            support_arm_std: None,
            knee: None,
            knee_std: None,
            head: None,
            head_std: None,
            sample_count: 0,
        }
    }

    /// Reference statistics for an angle; `None` if the angle was not calibrated
    pub fn stats(&self, name: AngleName) -> Option<AngleStats> {
        let (mean, std) = match name {
            AngleName::Arm => (Some(self.arm), Some(self.arm_std)),
            AngleName::Torso => (Some(self.torso), Some(self.torso_std)),
            AngleName::ElbowShoulderHip => {
                (Some(self.elbow_shoulder_hip), Some(self.elbow_shoulder_hip_std))
            }
            AngleName::SupportArm => (self.support_arm, self.support_arm_std),
            AngleName::Knee => (self.knee, self.knee_std),
            AngleName::Head => (self.head, self.head_std),
        };

        Some(AngleStats::new(mean?, std?))
    }

    /// Set or clear the statistics of an angle.
    ///
    /// Clearing a primary angle resets it to the zero-variance placeholder.
    pub fn set_stats(&mut self, name: AngleName, stats: Option<AngleStats>) {
        let mean = stats.map(|s| s.mean);
        let std = stats.map(|s| s.std);

        match name {
            AngleName::Arm => {
                self.arm = mean.unwrap_or(0);
                self.arm_std = std.unwrap_or(0.0);
            }
            AngleName::Torso => {
                self.torso = mean.unwrap_or(0);
                self.torso_std = std.unwrap_or(0.0);
            }
            AngleName::ElbowShoulderHip => {
                self.elbow_shoulder_hip = mean.unwrap_or(0);
                self.elbow_shoulder_hip_std = std.unwrap_or(0.0);
            }
            AngleName::SupportArm => {
                self.support_arm = mean;
                self.support_arm_std = std;
            }
            AngleName::Knee => {
                self.knee = mean;
                self.knee_std = std;
            }
            AngleName::Head => {
                self.head = mean;
                self.head_std = std;
            }
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reference patterns for both profile views of one named subject
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "RIGHT_PROFILE", default)]
    pub right_profile: Pattern,
    #[serde(rename = "LEFT_PROFILE", default)]
    pub left_profile: Pattern,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(&self, orientation: Orientation) -> Option<&Pattern> {
        match orientation {
            Orientation::RightProfile => Some(&self.right_profile),
            Orientation::LeftProfile => Some(&self.left_profile),
            Orientation::Unknown => None,
        }
    }

    /// Replace the pattern for a profile view; ignored for `Unknown`
    pub fn set_pattern(&mut self, orientation: Orientation, pattern: Pattern) {
        match orientation {
            Orientation::RightProfile => self.right_profile = pattern,
            Orientation::LeftProfile => self.left_profile = pattern,
            Orientation::Unknown => {}
        }
    }

    pub fn is_calibrated(&self, orientation: Orientation) -> bool {
        self.pattern(orientation).is_some_and(|p| p.calibrated)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
