//! Timed calibration of a reference pattern.
//!
//! ```text
//!              start(orientation)
//!  EVALUATING ───────────────────▶ COUNTING ──┐ record(raw angles)
//!      ▲                              │  ◀────┘ (bound orientation only)
//!      └──────────────────────────────┘
//!        elapsed >= duration: reduce samples
//!        abort(): discard samples
//! ```
//!
//! Samples are raw (unsmoothed) angle sets so the standard deviation
//! reflects the true variability of the taught stance.

use std::time::{Duration, Instant};

use serde::Serialize;

use stance_core::{AngleName, AngleSet, AngleStats, Error, Orientation, Pattern, Result};

use crate::config::CalibrationConfig;

/// Current phase of the calibration state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// Live evaluation, no samples collected
    Evaluating,
    /// Collecting samples for `orientation` since `started_at`
    Counting {
        orientation: Orientation,
        started_at: Instant,
    },
}

/// Result of a finished calibration window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationOutcome {
    pub orientation: Orientation,
    /// `None` when no sample matched the bound orientation
    pub pattern: Option<Pattern>,
    pub sample_count: usize,
}

/// Calibration state machine and its sample buffer
pub struct CalibrationSession {
    config: CalibrationConfig,
    state: CalibrationState,
    samples: Vec<AngleSet>,
}

impl CalibrationSession {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            state: CalibrationState::Evaluating,
            samples: Vec::new(),
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_counting(&self) -> bool {
        matches!(self.state, CalibrationState::Counting { .. })
    }

    /// Orientation bound to the running session
    pub fn bound_orientation(&self) -> Option<Orientation> {
        match self.state {
            CalibrationState::Counting { orientation, .. } => Some(orientation),
            CalibrationState::Evaluating => None,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.config.duration_secs).unwrap_or(Duration::ZERO)
    }

    /// Enter COUNTING for `orientation`
    pub fn start(&mut self, orientation: Orientation, now: Instant) -> Result<()> {
        if let CalibrationState::Counting { orientation, .. } = self.state {
            return Err(Error::CalibrationInProgress(orientation));
        }
        if !orientation.is_known() {
            return Err(Error::OrientationUnknown);
        }

        self.samples.clear();
        self.state = CalibrationState::Counting {
            orientation,
            started_at: now,
        };
        Ok(())
    }

    /// Buffer a raw angle set; frames of another orientation are dropped.
    ///
    /// Returns whether the sample was kept.
    pub fn record(&mut self, orientation: Orientation, angles: &AngleSet) -> bool {
        match self.state {
            CalibrationState::Counting { orientation: bound, .. } if bound == orientation => {
                self.samples.push(*angles);
                true
            }
            _ => false,
        }
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        match self.state {
            CalibrationState::Counting { started_at, .. } => {
                now.saturating_duration_since(started_at) >= self.duration()
            }
            CalibrationState::Evaluating => false,
        }
    }

    /// Whole seconds left for the countdown display
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        match self.state {
            CalibrationState::Counting { started_at, .. } => {
                let elapsed = now.saturating_duration_since(started_at).as_secs() as f64;
                (self.config.duration_secs - elapsed).max(0.0).ceil() as u64
            }
            CalibrationState::Evaluating => 0,
        }
    }

    /// Finish the session if its window has elapsed.
    ///
    /// Returns the outcome exactly once, after which the session is back in
    /// EVALUATING with an empty buffer.
    pub fn poll(&mut self, now: Instant) -> Option<CalibrationOutcome> {
        if !self.is_complete(now) {
            return None;
        }

        let orientation = self.bound_orientation()?;
        let samples = std::mem::take(&mut self.samples);
        self.state = CalibrationState::Evaluating;

        Some(CalibrationOutcome {
            orientation,
            pattern: reduce_samples(&samples, &self.config),
            sample_count: samples.len(),
        })
    }

    /// Drop the running session and its samples
    pub fn abort(&mut self) {
        self.samples.clear();
        self.state = CalibrationState::Evaluating;
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

/// Reduce raw samples to a calibrated pattern; `None` without samples.
///
/// Primary angles use their non-zero values (zero marks a frame where the
/// angle could not be measured). Optional angles are kept only when present
/// in at least `optional_presence_ratio` of the samples.
pub fn reduce_samples(samples: &[AngleSet], config: &CalibrationConfig) -> Option<Pattern> {
    if samples.is_empty() {
        return None;
    }

    let mut pattern = Pattern::empty();

    for name in AngleName::PRIMARY {
        let values: Vec<f64> = samples
            .iter()
            .filter_map(|s| s.get(name))
            .filter(|&v| v != 0)
            .map(f64::from)
            .collect();

        let stats = summarize(&values).unwrap_or(AngleStats::new(0, 0.0));
        pattern.set_stats(name, Some(stats));
    }

    for name in AngleName::OPTIONAL {
        let values: Vec<f64> = samples.iter().filter_map(|s| s.get(name)).map(f64::from).collect();

        let presence = values.len() as f64 / samples.len() as f64;
        let stats = if presence >= config.optional_presence_ratio {
            summarize(&values)
        } else {
            None
        };
        pattern.set_stats(name, stats);
    }

    pattern.calibrated = true;
    pattern.sample_count = samples.len();
    Some(pattern)
}

/// Truncated mean and population standard deviation rounded to 0.1°
fn summarize(values: &[f64]) -> Option<AngleStats> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = (variance.sqrt() * 10.0).round() / 10.0;

    Some(AngleStats::new(mean as i32, std))
}
