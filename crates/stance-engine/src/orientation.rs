//! Body orientation classification.
//!
//! A profile view is recognised by which side of the body the pose model is
//! more confident about. Several independent signals vote for the right or
//! left profile:
//!
//! | Signal                                  | Votes |
//! |-----------------------------------------|-------|
//! | Shoulder confidence gap > margin        | 2     |
//! | Elbow confidence gap > margin           | 1     |
//! | Hip confidence gap > margin             | 1     |
//! | Forward (larger x) shoulder, close pair | 1     |
//!
//! Frontal views (shoulders and hips both far apart) are rejected up front.

use stance_core::{horizontal_separation, JointFrame, Keypoint, Orientation};

use crate::config::OrientationConfig;

/// Tally of the votes cast for each profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrientationVotes {
    pub right: u32,
    pub left: u32,
}

/// Stateless, per-frame orientation classifier
pub struct OrientationClassifier {
    config: OrientationConfig,
}

impl OrientationClassifier {
    pub fn new(config: OrientationConfig) -> Self {
        Self { config }
    }

    /// Classify a single frame; identical frames always yield the same label
    pub fn classify(&self, frame: &JointFrame) -> Orientation {
        if frame.is_empty() {
            return Orientation::Unknown;
        }

        let cfg = &self.config;
        let conf_left = frame.confidence(Keypoint::LeftShoulder);
        let conf_right = frame.confidence(Keypoint::RightShoulder);

        if conf_left < cfg.min_shoulder_confidence && conf_right < cfg.min_shoulder_confidence {
            return Orientation::Unknown;
        }

        let shoulder_sep = horizontal_separation(
            frame.position(Keypoint::LeftShoulder),
            frame.position(Keypoint::RightShoulder),
        );
        let hip_sep = horizontal_separation(
            frame.position(Keypoint::LeftHip),
            frame.position(Keypoint::RightHip),
        );

        if shoulder_sep > cfg.frontal_shoulder_separation && hip_sep > cfg.frontal_hip_separation {
            return Orientation::Unknown;
        }

        let votes = self.count_votes(frame, shoulder_sep);

        if votes.right > votes.left && votes.right >= cfg.min_winning_votes {
            Orientation::RightProfile
        } else if votes.left > votes.right && votes.left >= cfg.min_winning_votes {
            Orientation::LeftProfile
        } else if shoulder_sep <= cfg.tie_break_max_separation {
            // Shoulders overlap: trust the raw confidence
            if conf_right >= conf_left {
                Orientation::RightProfile
            } else {
                Orientation::LeftProfile
            }
        } else {
            Orientation::Unknown
        }
    }

    /// Cast the per-signal votes for a non-frontal frame
    pub fn count_votes(&self, frame: &JointFrame, shoulder_sep: f64) -> OrientationVotes {
        let cfg = &self.config;
        let mut votes = OrientationVotes::default();

        let signals = [
            (Keypoint::RightShoulder, Keypoint::LeftShoulder, cfg.shoulder_votes),
            (Keypoint::RightElbow, Keypoint::LeftElbow, cfg.elbow_votes),
            (Keypoint::RightHip, Keypoint::LeftHip, cfg.hip_votes),
        ];

        for (right, left, weight) in signals {
            let conf_right = frame.confidence(right);
            let conf_left = frame.confidence(left);

            if conf_right > conf_left + cfg.confidence_margin {
                votes.right += weight;
            } else if conf_left > conf_right + cfg.confidence_margin {
                votes.left += weight;
            }
        }

        let conf_right = frame.confidence(Keypoint::RightShoulder);
        let conf_left = frame.confidence(Keypoint::LeftShoulder);

        if shoulder_sep <= cfg.forward_shoulder_max_separation
            && conf_right > cfg.forward_shoulder_min_confidence
            && conf_left > cfg.forward_shoulder_min_confidence
        {
            if frame.position(Keypoint::RightShoulder).x > frame.position(Keypoint::LeftShoulder).x {
                votes.right += cfg.forward_shoulder_votes;
            } else {
                votes.left += cfg.forward_shoulder_votes;
            }
        }

        votes
    }

    pub fn config(&self) -> &OrientationConfig {
        &self.config
    }
}

impl Default for OrientationClassifier {
    fn default() -> Self {
        Self::new(OrientationConfig::default())
    }
}
