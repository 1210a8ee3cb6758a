//! Error types for the stance engine.

use thiserror::Error;

use crate::types::Orientation;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid frame: expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Non-finite value for landmark {index}")]
    NonFiniteLandmark { index: usize },

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile already exists: {0}")]
    ProfileExists(String),

    #[error("Cannot start calibration without a known orientation")]
    OrientationUnknown,

    #[error("Calibration already in progress for {0}")]
    CalibrationInProgress(Orientation),

    #[error("Profile store error: {0}")]
    Store(String),

    #[error("Pose source error: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
