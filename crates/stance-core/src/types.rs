//! Fundamental types for the stance engine.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Capture timestamp with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// 17-joint skeletal keypoint definition (COCO format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Keypoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Keypoint {
    pub const COUNT: usize = 17;

    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEye),
            2 => Some(Self::RightEye),
            3 => Some(Self::LeftEar),
            4 => Some(Self::RightEar),
            5 => Some(Self::LeftShoulder),
            6 => Some(Self::RightShoulder),
            7 => Some(Self::LeftElbow),
            8 => Some(Self::RightElbow),
            9 => Some(Self::LeftWrist),
            10 => Some(Self::RightWrist),
            11 => Some(Self::LeftHip),
            12 => Some(Self::RightHip),
            13 => Some(Self::LeftKnee),
            14 => Some(Self::RightKnee),
            15 => Some(Self::LeftAnkle),
            16 => Some(Self::RightAnkle),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Body side, used to pick dominant and support limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// The landmarks making up one side of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideKeypoints {
    pub shoulder: Keypoint,
    pub elbow: Keypoint,
    pub wrist: Keypoint,
    pub hip: Keypoint,
    pub knee: Keypoint,
    pub ankle: Keypoint,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn keypoints(self) -> SideKeypoints {
        match self {
            Side::Left => SideKeypoints {
                shoulder: Keypoint::LeftShoulder,
                elbow: Keypoint::LeftElbow,
                wrist: Keypoint::LeftWrist,
                hip: Keypoint::LeftHip,
                knee: Keypoint::LeftKnee,
                ankle: Keypoint::LeftAnkle,
            },
            Side::Right => SideKeypoints {
                shoulder: Keypoint::RightShoulder,
                elbow: Keypoint::RightElbow,
                wrist: Keypoint::RightWrist,
                hip: Keypoint::RightHip,
                knee: Keypoint::RightKnee,
                ankle: Keypoint::RightAnkle,
            },
        }
    }
}

/// Body-facing classification of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "RIGHT_PROFILE")]
    RightProfile,
    #[serde(rename = "LEFT_PROFILE")]
    LeftProfile,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::RightProfile => "RIGHT_PROFILE",
            Orientation::LeftProfile => "LEFT_PROFILE",
            Orientation::Unknown => "UNKNOWN",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Orientation::Unknown)
    }

    /// Side facing the camera, if the view is a profile
    pub fn dominant_side(&self) -> Option<Side> {
        match self {
            Orientation::RightProfile => Some(Side::Right),
            Orientation::LeftProfile => Some(Side::Left),
            Orientation::Unknown => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected landmark in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub position: Point2<f64>,
    pub confidence: f32,
}

impl Joint {
    pub fn new(x: f64, y: f64, confidence: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            confidence,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite() && self.confidence.is_finite()
    }
}

impl Default for Joint {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// All landmarks detected in one video frame.
///
/// A frame holds either exactly [`Keypoint::COUNT`] joints or none at all
/// (the pose model found nobody).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointFrame {
    pub timestamp: Timestamp,
    joints: Vec<Joint>,
}

impl JointFrame {
    pub fn new(timestamp: Timestamp, joints: Vec<Joint>) -> Result<Self> {
        if !joints.is_empty() && joints.len() != Keypoint::COUNT {
            return Err(Error::LandmarkCount {
                expected: Keypoint::COUNT,
                actual: joints.len(),
            });
        }
        Ok(Self { timestamp, joints })
    }

    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            joints: Vec::new(),
        }
    }

    /// Build a frame from the raw arrays emitted by a pose model
    pub fn from_arrays(timestamp: Timestamp, xy: &[[f64; 2]], conf: &[f32]) -> Result<Self> {
        if xy.len() != conf.len() {
            return Err(Error::InvalidInput(format!(
                "{} positions but {} confidences",
                xy.len(),
                conf.len()
            )));
        }

        let joints = xy
            .iter()
            .zip(conf)
            .map(|(p, &c)| Joint::new(p[0], p[1], c))
            .collect();

        Self::new(timestamp, joints)
    }

    /// Build a frame from pose-model arrays, stamped with the current time
    pub fn capture(xy: &[[f64; 2]], conf: &[f32]) -> Result<Self> {
        Self::from_arrays(Timestamp::now(), xy, conf)
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, keypoint: Keypoint) -> Option<&Joint> {
        self.joints.get(keypoint.index())
    }

    /// Position of a landmark; the origin for an empty frame
    pub fn position(&self, keypoint: Keypoint) -> Point2<f64> {
        self.joint(keypoint)
            .map(|j| j.position)
            .unwrap_or_else(Point2::origin)
    }

    /// Confidence of a landmark; zero for an empty frame
    pub fn confidence(&self, keypoint: Keypoint) -> f32 {
        self.joint(keypoint).map(|j| j.confidence).unwrap_or(0.0)
    }

    /// Reject malformed frames (wrong landmark count after deserialization)
    /// and frames carrying NaN or infinite values
    pub fn validate(&self) -> Result<()> {
        if !self.joints.is_empty() && self.joints.len() != Keypoint::COUNT {
            return Err(Error::LandmarkCount {
                expected: Keypoint::COUNT,
                actual: self.joints.len(),
            });
        }

        match self.joints.iter().position(|j| !j.is_finite()) {
            Some(index) => Err(Error::NonFiniteLandmark { index }),
            None => Ok(()),
        }
    }
}
