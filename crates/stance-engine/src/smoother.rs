//! Sliding-window average over raw joint frames.

use std::collections::VecDeque;

use stance_core::{Joint, JointFrame, Keypoint};

/// Moving average of the last `window` non-empty frames
pub struct FrameSmoother {
    window: usize,
    history: VecDeque<JointFrame>,
}

impl FrameSmoother {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    /// Push a frame, evicting the oldest once the window is full.
    ///
    /// Empty frames carry nothing to average and are skipped.
    pub fn update(&mut self, frame: &JointFrame) {
        if frame.is_empty() {
            return;
        }

        if self.history.len() >= self.window {
            self.history.pop_front();
        }
        self.history.push_back(frame.clone());
    }

    /// Element-wise mean of the buffered frames, stamped with the newest
    /// timestamp
    pub fn current(&self) -> Option<JointFrame> {
        let newest = self.history.back()?;
        let n = self.history.len();

        let mut sum_x = [0.0f64; Keypoint::COUNT];
        let mut sum_y = [0.0f64; Keypoint::COUNT];
        let mut sum_conf = [0.0f32; Keypoint::COUNT];

        for frame in &self.history {
            for (i, joint) in frame.joints().iter().enumerate() {
                sum_x[i] += joint.position.x;
                sum_y[i] += joint.position.y;
                sum_conf[i] += joint.confidence;
            }
        }

        let joints = (0..Keypoint::COUNT)
            .map(|i| Joint::new(sum_x[i] / n as f64, sum_y[i] / n as f64, sum_conf[i] / n as f32))
            .collect();

        // Every buffered frame is non-empty, so the shape is always valid.
        JointFrame::new(newest.timestamp, joints).ok()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

impl Default for FrameSmoother {
    fn default() -> Self {
        Self::new(5)
    }
}
