//! # Stance-Engine
//!
//! Live calibration and evaluation of a taught body stance from 2D pose
//! landmarks.
//!
//! ## Pipeline
//!
//! ```text
//! JointFrame ─▶ Smoother ─▶ OrientationClassifier ─▶ AngleExtractor
//!                                                        │
//!                        ┌───────────────────────────────┴─────────────┐
//!                        ▼                                             ▼
//!            CalibrationSession (raw angles)          PostureEvaluator (smoothed)
//!                        │                                             │
//!                        └──────────▶ Pattern ──────────▶ FrameReport ◀┘
//! ```
//!
//! 1. **Smoothing**: moving average over the last few non-empty frames
//! 2. **Orientation**: confidence voting between right and left profile
//! 3. **Angles**: arm, torso and elbow-shoulder-hip, plus optional support
//!    arm, knee and head angles when their landmarks are reliable
//! 4. **Calibration**: a timed window reduces raw samples to mean and
//!    standard deviation per angle
//! 5. **Evaluation**: adaptive tolerance per angle and a weighted 0-100 score
//!
//! [`PostureEngine`] ties the stages together; [`spawn_engine`] runs it
//! against any [`PoseSource`] inside a tokio task.

pub mod angles;
pub mod calibration;
pub mod config;
pub mod engine;
pub mod evaluator;
pub mod orientation;
pub mod smoother;
pub mod source;
pub mod store;
pub mod stream;

pub use angles::*;
pub use calibration::*;
pub use config::*;
pub use engine::*;
pub use evaluator::*;
pub use orientation::*;
pub use smoother::*;
pub use source::*;
pub use store::*;
pub use stream::*;
