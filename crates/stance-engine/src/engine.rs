//! The posture engine: one instance per subject session.
//!
//! Owns the selected profile, the smoothing history and the calibration
//! session, and turns every incoming [`JointFrame`] into a [`FrameReport`]
//! for the presentation layer.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use stance_core::{Error, JointFrame, Orientation, Pattern, Profile, Result, Timestamp};

use crate::angles::AngleExtractor;
use crate::calibration::{CalibrationOutcome, CalibrationSession};
use crate::config::EngineConfig;
use crate::evaluator::{PostureEvaluation, PostureEvaluator};
use crate::orientation::OrientationClassifier;
use crate::smoother::FrameSmoother;
use crate::store::ProfileStore;

/// What the engine is doing on a given frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineMode {
    Evaluating,
    /// Calibration countdown for the bound orientation
    Counting {
        orientation: Orientation,
        remaining_secs: u64,
    },
}

/// Per-frame output handed to the presentation sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub timestamp: Timestamp,
    pub orientation: Orientation,
    pub mode: EngineMode,
    /// Whether a calibrated pattern exists for `orientation`
    pub calibrated: bool,
    /// Present only while evaluating against a calibrated pattern
    pub evaluation: Option<PostureEvaluation>,
    /// Set on the frame where a calibration window closed
    pub calibration: Option<CalibrationOutcome>,
    /// The frame was rejected as malformed
    pub skipped: bool,
}

/// Calibration and evaluation engine for a single subject
pub struct PostureEngine {
    config: EngineConfig,
    store: Arc<dyn ProfileStore>,
    profile_name: Option<String>,
    profile: Profile,
    smoother: FrameSmoother,
    classifier: OrientationClassifier,
    extractor: AngleExtractor,
    calibration: CalibrationSession,
    evaluator: PostureEvaluator,
    orientation: Orientation,
}

impl PostureEngine {
    /// Build an engine with no profile selected.
    ///
    /// Without a selected profile calibrations are kept in memory only.
    pub fn new(config: EngineConfig, store: Arc<dyn ProfileStore>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            smoother: FrameSmoother::new(config.smoothing.window),
            classifier: OrientationClassifier::new(config.orientation.clone()),
            extractor: AngleExtractor::new(config.extraction.clone()),
            calibration: CalibrationSession::new(config.calibration.clone()),
            evaluator: PostureEvaluator::new(config.evaluation.clone()),
            config,
            store,
            profile_name: None,
            profile: Profile::new(),
            orientation: Orientation::Unknown,
        })
    }

    // ==================== Profiles ====================

    /// Names of every profile in the store
    pub fn list_profiles(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Load a stored profile and make it current
    pub fn select(&mut self, name: &str) -> Result<()> {
        let profile = self
            .store
            .load(name)?
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))?;

        self.activate(name, profile);
        tracing::info!("Selected profile '{}'", name);
        Ok(())
    }

    /// Store a new empty profile and make it current
    pub fn create(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("profile name must not be empty".into()));
        }
        if self.store.load(name)?.is_some() {
            return Err(Error::ProfileExists(name.to_string()));
        }

        let profile = Profile::new();
        self.store.save(name, &profile)?;

        self.activate(name, profile);
        tracing::info!("Created profile '{}'", name);
        Ok(())
    }

    fn activate(&mut self, name: &str, profile: Profile) {
        self.profile_name = Some(name.to_string());
        self.profile = profile;
        self.reset();
    }

    pub fn current_profile_name(&self) -> Option<&str> {
        self.profile_name.as_deref()
    }

    pub fn current_profile(&self) -> &Profile {
        &self.profile
    }

    pub fn pattern(&self, orientation: Orientation) -> Option<&Pattern> {
        self.profile.pattern(orientation)
    }

    pub fn is_calibrated(&self, orientation: Orientation) -> bool {
        self.profile.is_calibrated(orientation)
    }

    /// Forget both patterns of the current profile; the store is untouched
    pub fn reset_patterns(&mut self) {
        self.profile.reset();
    }

    // ==================== Calibration ====================

    /// Start calibrating the currently detected orientation
    pub fn start_calibration(&mut self) -> Result<()> {
        self.start_calibration_at(Instant::now())
    }

    pub fn start_calibration_at(&mut self, now: Instant) -> Result<()> {
        self.calibration.start(self.orientation, now)?;
        tracing::info!(
            "Calibration started for {} ({:.1}s window)",
            self.orientation,
            self.config.calibration.duration_secs
        );
        Ok(())
    }

    pub fn abort_calibration(&mut self) {
        if self.calibration.is_counting() {
            tracing::info!("Calibration aborted after {} samples", self.calibration.sample_count());
        }
        self.calibration.abort();
    }

    /// Clear the smoothing history and drop any running calibration
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.calibration.abort();
        self.orientation = Orientation::Unknown;
    }

    // ==================== Frames ====================

    pub fn process_frame(&mut self, frame: &JointFrame) -> FrameReport {
        self.process_frame_at(frame, Instant::now())
    }

    /// Process one frame against an explicit monotonic clock reading
    pub fn process_frame_at(&mut self, frame: &JointFrame, now: Instant) -> FrameReport {
        if let Err(e) = frame.validate() {
            tracing::warn!("Skipping frame at {}: {}", frame.timestamp, e);
            // Nothing was detected, so calibration must not start from a stale label
            self.orientation = Orientation::Unknown;
            let calibration = self.finish_calibration(now);
            return self.report(frame.timestamp, Orientation::Unknown, None, calibration, true, now);
        }

        let smoothed = if frame.is_empty() {
            None
        } else {
            self.smoother.update(frame);
            self.smoother.current()
        };

        let orientation = smoothed
            .as_ref()
            .map(|f| self.classifier.classify(f))
            .unwrap_or(Orientation::Unknown);

        if orientation != self.orientation {
            tracing::debug!("Orientation changed: {} -> {}", self.orientation, orientation);
            self.orientation = orientation;
        }

        if self.calibration.bound_orientation() == Some(orientation) {
            // Raw angles keep the true variance of the taught stance
            let raw = self.extractor.extract(frame, orientation);
            self.calibration.record(orientation, &raw);
        }

        let calibration = self.finish_calibration(now);

        let evaluation = match (&smoothed, self.profile.pattern(orientation)) {
            (Some(smoothed), Some(pattern)) if pattern.calibrated && !self.calibration.is_counting() => {
                let angles = self.extractor.extract(smoothed, orientation);
                Some(self.evaluator.evaluate(&angles, pattern))
            }
            _ => None,
        };

        self.report(frame.timestamp, orientation, evaluation, calibration, false, now)
    }

    /// Close the calibration window if it has elapsed and store the result
    fn finish_calibration(&mut self, now: Instant) -> Option<CalibrationOutcome> {
        let outcome = self.calibration.poll(now)?;

        match &outcome.pattern {
            Some(pattern) => {
                self.profile.set_pattern(outcome.orientation, pattern.clone());
                tracing::info!(
                    "Calibration complete for {}: {} samples",
                    outcome.orientation,
                    outcome.sample_count
                );
                self.persist();
            }
            None => {
                tracing::warn!("Calibration for {} finished without samples", outcome.orientation);
            }
        }

        Some(outcome)
    }

    fn persist(&self) {
        let Some(name) = &self.profile_name else {
            return;
        };

        if let Err(e) = self.store.save(name, &self.profile) {
            tracing::warn!("Failed to save profile '{}': {}", name, e);
        }
    }

    fn report(
        &self,
        timestamp: Timestamp,
        orientation: Orientation,
        evaluation: Option<PostureEvaluation>,
        calibration: Option<CalibrationOutcome>,
        skipped: bool,
        now: Instant,
    ) -> FrameReport {
        FrameReport {
            timestamp,
            orientation,
            mode: self.mode_at(now),
            calibrated: self.profile.is_calibrated(orientation),
            evaluation,
            calibration,
            skipped,
        }
    }

    // ==================== State ====================

    /// Orientation detected on the last processed frame
    pub fn current_orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn mode(&self) -> EngineMode {
        self.mode_at(Instant::now())
    }

    pub fn mode_at(&self, now: Instant) -> EngineMode {
        match self.calibration.bound_orientation() {
            Some(orientation) => EngineMode::Counting {
                orientation,
                remaining_secs: self.calibration.remaining_secs(now),
            },
            None => EngineMode::Evaluating,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
