//! Anatomical angle extraction from a joint frame.

use stance_core::{joint_angle, AngleSet, JointFrame, Keypoint, Orientation};

use crate::config::ExtractionConfig;

/// Computes the [`AngleSet`] of a frame for a known orientation
pub struct AngleExtractor {
    config: ExtractionConfig,
}

impl AngleExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract angles using the dominant side implied by `orientation`.
    ///
    /// Unknown orientation or an empty frame yields the zeroed default set.
    /// Optional angles are only filled when all three of their landmarks pass
    /// the configured confidence gate.
    pub fn extract(&self, frame: &JointFrame, orientation: Orientation) -> AngleSet {
        let dominant_side = match orientation.dominant_side() {
            Some(side) if !frame.is_empty() => side,
            _ => return AngleSet::default(),
        };

        let dom = dominant_side.keypoints();
        let sup = dominant_side.opposite().keypoints();
        let angle = |a: Keypoint, b: Keypoint, c: Keypoint| {
            joint_angle(frame.position(a), frame.position(b), frame.position(c))
        };
        let confident = |keypoints: [Keypoint; 3], threshold: f32| {
            keypoints.iter().all(|&kp| frame.confidence(kp) >= threshold)
        };

        let support_triple = [sup.shoulder, sup.elbow, sup.wrist];
        let knee_triple = [dom.hip, dom.knee, dom.ankle];
        let head_triple = [Keypoint::Nose, dom.shoulder, dom.hip];

        AngleSet {
            arm: angle(dom.shoulder, dom.elbow, dom.wrist),
            torso: angle(dom.shoulder, dom.hip, dom.knee),
            elbow_shoulder_hip: angle(dom.elbow, dom.shoulder, dom.hip),
            support_arm: confident(support_triple, self.config.support_arm_min_confidence)
                .then(|| angle(sup.shoulder, sup.elbow, sup.wrist)),
            knee: confident(knee_triple, self.config.knee_min_confidence)
                .then(|| angle(dom.hip, dom.knee, dom.ankle)),
            head: confident(head_triple, self.config.head_min_confidence)
                .then(|| angle(Keypoint::Nose, dom.shoulder, dom.hip)),
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }
}

impl Default for AngleExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::{Joint, Timestamp};

    /// Right-profile figure with a 90° dominant elbow and a straight leg
    fn right_profile_joints() -> Vec<Joint> {
        let mut joints = vec![Joint::new(0.0, 0.0, 0.9); Keypoint::COUNT];
        joints[Keypoint::Nose.index()] = Joint::new(100.0, 0.0, 0.9);
        joints[Keypoint::RightShoulder.index()] = Joint::new(100.0, 100.0, 0.9);
        joints[Keypoint::RightElbow.index()] = Joint::new(100.0, 200.0, 0.9);
        joints[Keypoint::RightWrist.index()] = Joint::new(200.0, 200.0, 0.9);
        joints[Keypoint::RightHip.index()] = Joint::new(100.0, 300.0, 0.9);
        joints[Keypoint::RightKnee.index()] = Joint::new(100.0, 400.0, 0.9);
        joints[Keypoint::RightAnkle.index()] = Joint::new(100.0, 500.0, 0.9);

        joints[Keypoint::LeftShoulder.index()] = Joint::new(90.0, 100.0, 0.2);
        joints[Keypoint::LeftElbow.index()] = Joint::new(90.0, 200.0, 0.2);
        joints[Keypoint::LeftWrist.index()] = Joint::new(90.0, 300.0, 0.2);
        joints
    }

    fn frame(joints: Vec<Joint>) -> JointFrame {
        JointFrame::new(Timestamp::from_nanos(0), joints).unwrap()
    }

    #[test]
    fn test_right_profile_angles() {
        let extractor = AngleExtractor::default();
        let angles = extractor.extract(&frame(right_profile_joints()), Orientation::RightProfile);

        assert_eq!(angles.arm, 90);
        assert_eq!(angles.torso, 180);
        assert_eq!(angles.elbow_shoulder_hip, 0);
        assert_eq!(angles.support_arm, Some(180));
        assert_eq!(angles.knee, Some(180));
        assert_eq!(angles.head, Some(180));
    }

    #[test]
    fn test_unknown_orientation_is_zeroed() {
        let extractor = AngleExtractor::default();
        let angles = extractor.extract(&frame(right_profile_joints()), Orientation::Unknown);
        assert_eq!(angles, AngleSet::default());
    }

    #[test]
    fn test_empty_frame_is_zeroed() {
        let extractor = AngleExtractor::default();
        let empty = JointFrame::empty(Timestamp::from_nanos(0));
        assert_eq!(extractor.extract(&empty, Orientation::LeftProfile), AngleSet::default());
    }

    #[test]
    fn test_low_confidence_optionals_are_absent() {
        let mut joints = right_profile_joints();
        joints[Keypoint::LeftElbow.index()].confidence = 0.1;
        joints[Keypoint::RightAnkle.index()].confidence = 0.29;
        joints[Keypoint::Nose.index()].confidence = 0.0;

        let extractor = AngleExtractor::default();
        let angles = extractor.extract(&frame(joints), Orientation::RightProfile);

        assert_eq!(angles.support_arm, None);
        assert_eq!(angles.knee, None);
        assert_eq!(angles.head, None);
        // Primary angles do not depend on confidence
        assert_eq!(angles.arm, 90);
    }

    #[test]
    fn test_support_arm_gate_is_inclusive() {
        let mut joints = right_profile_joints();
        for kp in [Keypoint::LeftShoulder, Keypoint::LeftElbow, Keypoint::LeftWrist] {
            joints[kp.index()].confidence = 0.15;
        }

        let extractor = AngleExtractor::default();
        let angles = extractor.extract(&frame(joints), Orientation::RightProfile);
        assert!(angles.support_arm.is_some());
    }

    #[test]
    fn test_left_profile_uses_left_side() {
        let mut joints = right_profile_joints();
        // Mirror the dominant arm onto the left side
        joints[Keypoint::LeftShoulder.index()] = Joint::new(100.0, 100.0, 0.9);
        joints[Keypoint::LeftElbow.index()] = Joint::new(100.0, 200.0, 0.9);
        joints[Keypoint::LeftWrist.index()] = Joint::new(0.0, 200.0, 0.9);
        joints[Keypoint::LeftHip.index()] = Joint::new(100.0, 300.0, 0.9);
        joints[Keypoint::LeftKnee.index()] = Joint::new(150.0, 400.0, 0.9);

        let extractor = AngleExtractor::default();
        let angles = extractor.extract(&frame(joints), Orientation::LeftProfile);

        assert_eq!(angles.arm, 90);
        assert!(angles.torso < 180);
        // Right arm becomes the support arm
        assert_eq!(angles.support_arm, Some(90));
    }
}
